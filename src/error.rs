//! Error taxonomy for resolution and dispatch.

use crate::catalog::identity::EntityId;
use thiserror::Error;

/// Errors surfaced by the engine to its callers.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Id absent from the entity directory; transports map this to not-found.
    #[error("unknown entity: {0}")]
    UnknownEntity(EntityId),

    /// A preset or caller referenced a provider id nobody registered.
    #[error("provider not registered: {0}")]
    ProviderNotRegistered(String),

    /// A provider's `run` failed; the whole resolution call is aborted.
    #[error("provider '{provider}' failed")]
    ProviderExecution {
        provider: String,
        #[source]
        source: anyhow::Error,
    },

    /// Icon lookup failed; never cached.
    #[error("icon for '{id}' unavailable")]
    IconResolution {
        id: EntityId,
        #[source]
        source: anyhow::Error,
    },

    /// The id resolved to an item that is not an action, or to an action
    /// entry without a registered handler.
    #[error("not an action: {0}")]
    NotAnAction(EntityId),

    /// The action declares indirect types but no indirect object was given.
    #[error("action '{action}' requires an indirect object")]
    MissingIndirect { action: EntityId },

    /// The action handler reported a failure.
    #[error("action '{action}' failed")]
    ActionExecution {
        action: EntityId,
        #[source]
        source: anyhow::Error,
    },
}

impl EngineError {
    /// Short machine-readable kind used by transports.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::UnknownEntity(_) => "not_found",
            EngineError::ProviderNotRegistered(_) => "provider_not_registered",
            EngineError::ProviderExecution { .. } => "provider_failed",
            EngineError::IconResolution { .. } => "icon_unavailable",
            EngineError::NotAnAction(_) => "not_an_action",
            EngineError::MissingIndirect { .. } => "missing_indirect",
            EngineError::ActionExecution { .. } => "action_failed",
        }
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

impl EngineError {
    /// Display the error followed by its source chain, `a: b: c`.
    pub fn report(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}
