//! # oceandesk-core
//!
//! Client-side state orchestration for the `OceanDesk` dashboard.
//!
//! This crate provides:
//! - **Resource stores** - inbox, prompts and drafts, each owning one
//!   server-backed collection and its request lifecycle
//! - **Edit buffers** - explicit synced/buffer pairs for prompts and drafts
//! - **Workflow orchestrator** - multi-step flows with per-flow busy flags
//! - **Chat session** - one-turn-at-a-time conversation with the agent
//! - **Dashboard** - the owned aggregate a view layer holds
//!
//! All state lives behind mutexes that are never held across an `.await`, and
//! every busy/loading flag is released by a guard on every exit path.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod chat;
mod dashboard;
mod error;
pub mod guard;
pub mod orchestrator;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use chat::{
    ChatMessage, ChatSession, FALLBACK_REPLY, GREETING, MessageId, Role, TurnOutcome, TurnState,
};
pub use dashboard::Dashboard;
pub use error::{Error, Result};
pub use guard::{Activity, ActivityGuard, BusyFlag, BusyGuard};
pub use orchestrator::{Flow, FlowReport, OnFailure, Orchestrator, Step, StepOutcome, StepRecord};
pub use store::drafts::{DraftField, DraftStore, Drafts};
pub use store::editable::{DeletableResource, EditableItem, EditableResource, EditableStore};
pub use store::inbox::InboxStore;
pub use store::prompts::{PromptField, PromptStore, Prompts};
pub use store::Status;

pub use oceandesk_api as api;
