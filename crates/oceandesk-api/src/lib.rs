//! # oceandesk-api
//!
//! HTTP transport and wire models for the `OceanDesk` agent backend.
//!
//! ## Features
//!
//! - **Transport**: a single configured HTTP client bound to one base origin
//! - **Typed endpoints**: emails, prompts, drafts, ingestion and chat
//! - **Wire models**: lenient decoding of the backend's JSON shapes
//!
//! ## Quick Start
//!
//! ```ignore
//! use oceandesk_api::{Api, ApiConfig, HttpTransport};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ApiConfig::from_env()?;
//!     let api = Api::new(HttpTransport::new(&config)?);
//!
//!     api.ingest_mock().await?;
//!     for email in api.list_emails().await? {
//!         println!("[{}] {}", email.category, email.subject);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod client;
pub mod config;
mod error;
pub mod model;
pub mod transport;

pub use client::Api;
pub use config::ApiConfig;
pub use error::{Result, TransportError};
pub use model::{
    Ack, ActionItem, Category, ChatRequest, ChatResponse, Draft, DraftId, DraftStatus, Email,
    EmailId, Prompt, PromptId,
};
pub use transport::{HttpTransport, Method, Transport};
