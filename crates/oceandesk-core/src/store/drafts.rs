//! Draft store: generated reply drafts the user reviews and edits.

use std::future::Future;

use oceandesk_api::{Ack, Api, Draft, DraftId, EmailId, Transport};

use super::editable::{DeletableResource, EditableResource, EditableStore};

/// Editable fields of a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    /// Subject line.
    Subject,
    /// Body text.
    Body,
}

/// Drafts as an [`EditableResource`].
#[derive(Debug, Clone, Copy)]
pub struct Drafts;

impl EditableResource for Drafts {
    type Id = DraftId;
    type Item = Draft;
    type Field = DraftField;

    const KIND: &'static str = "draft";

    fn id(item: &Draft) -> DraftId {
        item.id
    }

    fn set_field(item: &mut Draft, field: DraftField, value: String) {
        match field {
            DraftField::Subject => item.subject = value,
            DraftField::Body => item.body = value,
        }
    }

    fn list<T: Transport>(
        api: &Api<T>,
    ) -> impl Future<Output = oceandesk_api::Result<Vec<Draft>>> + Send {
        api.list_drafts()
    }

    fn save<T: Transport>(
        api: &Api<T>,
        item: &Draft,
    ) -> impl Future<Output = oceandesk_api::Result<Draft>> + Send {
        api.save_draft(item)
    }
}

impl DeletableResource for Drafts {
    fn delete<T: Transport>(
        api: &Api<T>,
        id: DraftId,
    ) -> impl Future<Output = oceandesk_api::Result<Ack>> + Send {
        api.delete_draft(id)
    }
}

/// Store of drafts.
pub type DraftStore<T> = EditableStore<Drafts, T>;

impl<T: Transport> EditableStore<Drafts, T> {
    /// The synced draft replying to this email, if any.
    #[must_use]
    pub fn for_email(&self, email: EmailId) -> Option<Draft> {
        self.find_synced(|d| d.email_id == Some(email))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::testing::{ScriptedTransport, draft};
    use oceandesk_api::Method;
    use serde_json::json;
    use std::sync::Arc;
    use tokio_test::{assert_pending, assert_ready, task};

    async fn loaded(transport: &Arc<ScriptedTransport>) -> DraftStore<ScriptedTransport> {
        transport.reply(
            Method::Get,
            "/drafts",
            json!([draft(1, "Re: Q4 report", "On it."), draft(2, "Re: Lunch", "Sure.")]),
        );
        let store = DraftStore::new(Api::from_shared(Arc::clone(transport)));
        store.fetch_all().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_selection() {
        let transport = ScriptedTransport::shared();
        let store = loaded(&transport).await;
        assert_eq!(store.selected(), None);

        store.select(DraftId(2)).unwrap();
        assert_eq!(store.selected_item().unwrap().synced.subject, "Re: Lunch");

        assert!(store.select(DraftId(9)).is_err());
        assert_eq!(store.selected(), Some(DraftId(2)));

        store.clear_selection();
        assert_eq!(store.selected(), None);
    }

    #[tokio::test]
    async fn test_save_sends_edited_draft() {
        let transport = ScriptedTransport::shared();
        let store = loaded(&transport).await;
        transport.reply(Method::Post, "/drafts", draft(1, "Re: Q4 report", "Done, attached."));

        store
            .begin_edit(DraftId(1), DraftField::Body, "Done, attached.")
            .unwrap();
        store.save(DraftId(1)).await.unwrap();

        let body = transport.requests()[1].body.clone().unwrap();
        assert_eq!(body["id"], 1);
        assert_eq!(body["email_id"], 10);
        assert_eq!(body["body"], "Done, attached.");
        assert!(!store.is_dirty(DraftId(1)));
    }

    #[tokio::test]
    async fn test_delete_removes_only_after_confirmation() {
        let transport = ScriptedTransport::shared();
        let store = loaded(&transport).await;
        store.select(DraftId(1)).unwrap();
        let gate = transport.gate(Method::Delete, "/drafts/1");

        let mut delete = task::spawn(store.delete(DraftId(1)));
        assert_pending!(delete.poll());
        assert!(store.item(DraftId(1)).unwrap().deleting);

        gate.send(Ok(json!({ "message": "deleted" }))).unwrap();
        assert_ready!(delete.poll()).unwrap();

        assert!(store.item(DraftId(1)).is_none());
        assert_eq!(store.len(), 1);
        assert_eq!(store.selected(), None);
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_draft() {
        let transport = ScriptedTransport::shared();
        let store = loaded(&transport).await;
        transport.fail(Method::Delete, "/drafts/2", 500);

        assert!(store.delete(DraftId(2)).await.is_err());

        let item = store.item(DraftId(2)).unwrap();
        assert!(!item.deleting);
        assert!(item.error.is_some());
    }

    #[tokio::test]
    async fn test_delete_rejected_while_saving() {
        let transport = ScriptedTransport::shared();
        let store = loaded(&transport).await;
        let _gate = transport.gate(Method::Post, "/drafts");

        let mut save = task::spawn(store.save(DraftId(1)));
        assert_pending!(save.poll());

        let err = store.delete(DraftId(1)).await.unwrap_err();
        assert!(matches!(err, Error::Busy { kind: "draft", .. }));
        assert_eq!(transport.calls(Method::Delete, "/drafts/1"), 0);
    }

    #[tokio::test]
    async fn test_for_email() {
        let transport = ScriptedTransport::shared();
        let store = loaded(&transport).await;

        assert_eq!(store.for_email(EmailId(20)).unwrap().id, DraftId(2));
        assert!(store.for_email(EmailId(30)).is_none());
    }
}
