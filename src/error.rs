//! Error taxonomy surfaced by actions and the machine driver.

use crate::core::{EventType, StateType};
use crate::provider::ProviderError;
use thiserror::Error;
use uuid::Uuid;

/// Errors produced while constructing or advancing a machine.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MachineError {
    /// A machine context or payload did not have the shape an action expects.
    #[error("context assertion failed: {0}")]
    ContextAssertion(String),

    /// The provider refused to store a credential. Nothing was persisted.
    #[error("unable to persist credential '{name}': {source}")]
    CredentialPersist {
        name: String,
        #[source]
        source: ProviderError,
    },

    /// The connection record could not be stored after the credential was.
    ///
    /// The credential identified by `credential_id` exists; the connection
    /// does not. No compensation is attempted.
    #[error("unable to persist connection '{name}' (credential {credential_id} was saved): {source}")]
    ConnectionPersist {
        name: String,
        credential_id: Uuid,
        #[source]
        source: ProviderError,
    },

    /// The current state declares no edge for the delivered event.
    #[error("no transition from state '{state}' on event '{event}'")]
    InvalidTransition { state: StateType, event: EventType },

    /// The state table has no definition for a state the machine reached.
    #[error("state '{0}' is not defined in the state table")]
    UnknownState(StateType),

    /// The instance identifier is not a UUID.
    #[error("invalid machine identifier '{id}': {reason}")]
    MachineInitialization { id: String, reason: String },

    /// No machine is registered under the identifier.
    #[error("no machine registered with id {0}")]
    MachineNotFound(Uuid),

    /// The caller's deadline passed before a blocking call could start.
    #[error("operation cancelled: {0}")]
    Cancelled(String),
}

impl MachineError {
    /// Errors that mean the machine's table is broken and the instance
    /// should not be driven further.
    pub fn is_fatal_to_machine(&self) -> bool {
        matches!(self, Self::UnknownState(_))
    }
}

/// Convenience result type for machine operations.
pub type MachineResult<T> = Result<T, MachineError>;
