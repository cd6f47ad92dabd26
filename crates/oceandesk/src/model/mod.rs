//! UI-side models: persisted settings and inbox presentation helpers.

pub mod inbox;
pub mod settings;

pub use settings::{AppSettings, LiveSettings};
