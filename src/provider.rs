//! Persistence collaborator used by connect actions.
//!
//! The engine never talks to storage itself. Actions reach a [`Provider`]
//! through the [`ExecutionContext`](crate::action::ExecutionContext) of the
//! call and hand it credential and connection records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

/// Errors reported by a provider implementation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    #[error("no provider available: {0}")]
    Unavailable(String),

    #[error("provider rejected request: {0}")]
    Rejected(String),

    #[error("provider backend failure: {0}")]
    Backend(String),
}

/// Lifecycle status recorded on a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Discovered,
    Registered,
    Connected,
    Ignored,
    Maintenance,
    Disconnected,
    Deleted,
    #[serde(rename = "not found")]
    NotFound,
}

/// Credential record to be stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialSpec {
    pub name: String,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub credential_type: String,
    #[serde(default)]
    pub secret: Map<String, Value>,
}

/// A credential as stored by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub credential_type: String,
}

/// Connection record to be stored, referencing a saved credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSpec {
    pub kind: String,
    #[serde(rename = "type")]
    pub connection_type: String,
    pub sub_type: String,
    pub status: ConnectionStatus,
    pub name: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub credential_id: Uuid,
}

/// A connection as stored by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: Uuid,
    pub name: String,
    pub kind: String,
    pub status: ConnectionStatus,
    pub credential_id: Uuid,
}

/// Storage for credentials and connections.
///
/// Each call is treated as one atomic step. Implementations block the
/// caller; they should give up promptly once the caller's deadline passes.
pub trait Provider: Send + Sync {
    fn save_user_credential(
        &self,
        token: &str,
        credential: &CredentialSpec,
    ) -> Result<Credential, ProviderError>;

    fn save_connection(
        &self,
        connection: &ConnectionSpec,
        token: &str,
        upsert: bool,
    ) -> Result<Connection, ProviderError>;
}
