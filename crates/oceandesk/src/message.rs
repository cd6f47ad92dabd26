//! Message types for application events.
//!
//! In the Elm architecture, Messages are events that trigger state changes.

use iced::widget::text_editor;
use oceandesk_api::{Category, DraftId, EmailId, PromptId};
use oceandesk_core::{DraftField, Flow, PromptField, TurnOutcome};

use crate::model::AppSettings;

/// Application messages (events).
#[derive(Debug, Clone)]
pub enum Message {
    // Navigation
    /// Switch to another screen.
    NavigateTo(Screen),
    /// Refetch whatever the current screen shows.
    Refresh,
    /// A store fetch settled (count of entities on success).
    Fetched(Screen, Result<usize, String>),

    // Inbox
    /// Show an email in the detail pane.
    SelectEmail(EmailId),
    /// Restrict the list to one category, or show all.
    FilterCategory(Option<Category>),
    /// Open the agent screen with an email as chat context.
    AskAbout(EmailId),
    /// Start a multi-step workflow.
    RunFlow(Flow),
    /// A workflow ran to completion.
    FlowFinished(Flow, Result<(), String>),

    /// Prompt Brain screen.
    Prompt(PromptMessage),
    /// Drafts screen.
    Draft(DraftMessage),
    /// Email Agent screen.
    Agent(AgentMessage),

    // Settings
    /// Flip between light and dark.
    ToggleTheme,
    /// Settings loaded from disk.
    SettingsLoaded(Result<AppSettings, String>),
    /// Settings written to disk.
    SettingsSaved(Result<(), String>),
    /// Hide the settings error notice.
    DismissNotice,

    /// Keyboard shortcut.
    KeyPressed(KeyboardAction),
    /// Event with no effect.
    Ignored,
}

/// Prompt Brain events.
#[derive(Debug, Clone)]
pub enum PromptMessage {
    /// Open a prompt in the editor.
    Select(PromptId),
    /// Edit in the template editor.
    TemplateAction(text_editor::Action),
    /// Edit a single-line field.
    Edit(PromptId, PromptField, String),
    /// Persist the buffer.
    Save(PromptId),
    /// Save finished.
    Saved(PromptId, Result<(), String>),
    /// Throw away local edits.
    Discard(PromptId),
}

/// Drafts screen events.
#[derive(Debug, Clone)]
pub enum DraftMessage {
    /// Open a draft in the editor.
    Select(DraftId),
    /// Edit in the body editor.
    BodyAction(text_editor::Action),
    /// Edit a single-line field.
    Edit(DraftId, DraftField, String),
    /// Persist the buffer.
    Save(DraftId),
    /// Save finished.
    Saved(DraftId, Result<(), String>),
    /// Throw away local edits.
    Discard(DraftId),
    /// Ask for confirmation before deleting.
    RequestDelete(DraftId),
    /// Abort the pending delete.
    CancelDelete,
    /// Delete on the server.
    ConfirmDelete(DraftId),
    /// Delete finished.
    Deleted(DraftId, Result<(), String>),
}

/// Email Agent screen events.
#[derive(Debug, Clone)]
pub enum AgentMessage {
    /// Composing text changed.
    InputChanged(String),
    /// Send the composing text.
    Submit,
    /// Stop referring to an email.
    ClearContext,
    /// A turn ended.
    TurnFinished(TurnOutcome),
}

/// Screens reachable from the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// Email list and detail.
    #[default]
    Inbox,
    /// Prompt templates.
    Prompts,
    /// Chat with the agent.
    Agent,
    /// Generated reply drafts.
    Drafts,
}

impl Screen {
    /// Sidebar order. Ctrl+1..4 follow it.
    pub const ALL: [Self; 4] = [Self::Inbox, Self::Prompts, Self::Agent, Self::Drafts];

    /// Sidebar label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Inbox => "Inbox",
            Self::Prompts => "Prompt Brain",
            Self::Agent => "Email Agent",
            Self::Drafts => "Drafts",
        }
    }

    /// Screen for a 1-based shortcut digit.
    pub fn from_digit(digit: &str) -> Option<Self> {
        let index: usize = digit.parse().ok()?;
        Self::ALL.get(index.checked_sub(1)?).copied()
    }
}

/// Keyboard shortcut actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardAction {
    /// F5.
    Refresh,
    /// Ctrl+1..4.
    SwitchTo(Screen),
    /// Ctrl+S.
    Save,
    /// Escape.
    Cancel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_map_to_sidebar_order() {
        assert_eq!(Screen::from_digit("1"), Some(Screen::Inbox));
        assert_eq!(Screen::from_digit("3"), Some(Screen::Agent));
        assert_eq!(Screen::from_digit("4"), Some(Screen::Drafts));
        assert_eq!(Screen::from_digit("0"), None);
        assert_eq!(Screen::from_digit("5"), None);
        assert_eq!(Screen::from_digit("s"), None);
    }
}
