//! Prompt store: the agent's instruction templates.

use std::future::Future;

use oceandesk_api::{Api, Prompt, PromptId, Transport};

use super::editable::{EditableResource, EditableStore};

/// Editable fields of a prompt. The name is a stable key and is not editable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptField {
    /// Template text.
    Template,
    /// Description; empty clears it.
    Description,
}

/// Prompts as an [`EditableResource`].
#[derive(Debug, Clone, Copy)]
pub struct Prompts;

impl EditableResource for Prompts {
    type Id = PromptId;
    type Item = Prompt;
    type Field = PromptField;

    const KIND: &'static str = "prompt";

    fn id(item: &Prompt) -> PromptId {
        item.id
    }

    fn set_field(item: &mut Prompt, field: PromptField, value: String) {
        match field {
            PromptField::Template => item.template = value,
            PromptField::Description => {
                item.description = (!value.is_empty()).then_some(value);
            }
        }
    }

    fn list<T: Transport>(
        api: &Api<T>,
    ) -> impl Future<Output = oceandesk_api::Result<Vec<Prompt>>> + Send {
        api.list_prompts()
    }

    fn save<T: Transport>(
        api: &Api<T>,
        item: &Prompt,
    ) -> impl Future<Output = oceandesk_api::Result<Prompt>> + Send {
        api.upsert_prompt(item)
    }
}

/// Store of prompts.
pub type PromptStore<T> = EditableStore<Prompts, T>;

impl<T: Transport> EditableStore<Prompts, T> {
    /// The synced prompt with this key.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<Prompt> {
        self.find_synced(|p| p.name == name)
    }
}
