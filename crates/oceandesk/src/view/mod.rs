//! View components for the application.

mod chat;
mod common;
mod drafts;
mod header;
mod inbox;
mod prompts;
mod sidebar;

pub use chat::{ChatView, view_chat};
pub use drafts::view_drafts;
pub use header::view_header;
pub use inbox::{FlowButton, InboxView, view_inbox};
pub use prompts::view_prompts;
pub use sidebar::{SidebarBadges, view_sidebar};
