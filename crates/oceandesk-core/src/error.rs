//! Error types for the core library.

use thiserror::Error;

use oceandesk_api::TransportError;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Backend request failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The entity is not (or no longer) in the store.
    #[error("{kind} {id} not found")]
    UnknownEntity {
        /// Kind of entity (`prompt`, `draft`).
        kind: &'static str,
        /// Identifier as displayed.
        id: String,
    },

    /// The entity already has a conflicting operation in flight.
    #[error("{kind} {id} is busy")]
    Busy {
        /// Kind of entity (`prompt`, `draft`).
        kind: &'static str,
        /// Identifier as displayed.
        id: String,
    },

    /// The server answered a save with a different entity than the one sent.
    #[error("{kind} {sent} was stored as {kind} {returned}")]
    Diverged {
        /// Kind of entity (`prompt`, `draft`).
        kind: &'static str,
        /// Identifier that was saved.
        sent: String,
        /// Identifier the server replied with.
        returned: String,
    },
}

impl Error {
    pub(crate) fn unknown(kind: &'static str, id: impl std::fmt::Display) -> Self {
        Self::UnknownEntity {
            kind,
            id: id.to_string(),
        }
    }

    pub(crate) fn busy(kind: &'static str, id: impl std::fmt::Display) -> Self {
        Self::Busy {
            kind,
            id: id.to_string(),
        }
    }

    pub(crate) fn diverged(
        kind: &'static str,
        sent: impl std::fmt::Display,
        returned: impl std::fmt::Display,
    ) -> Self {
        Self::Diverged {
            kind,
            sent: sent.to_string(),
            returned: returned.to_string(),
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
