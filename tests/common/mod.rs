//! Shared fixtures for integration tests.

#![allow(dead_code)]

use lifecycle_machines::provider::{
    Connection, ConnectionSpec, Credential, CredentialSpec, Provider, ProviderError,
};
use parking_lot::Mutex;
use uuid::Uuid;

/// Provider that records every call and fails on demand.
#[derive(Default)]
pub struct RecordingProvider {
    pub fail_credential: bool,
    pub fail_connection: bool,
    pub credentials: Mutex<Vec<(String, CredentialSpec)>>,
    pub connections: Mutex<Vec<(ConnectionSpec, String, bool)>>,
}

impl RecordingProvider {
    pub fn failing_connection() -> Self {
        Self {
            fail_connection: true,
            ..Default::default()
        }
    }

    pub fn failing_credential() -> Self {
        Self {
            fail_credential: true,
            ..Default::default()
        }
    }

    pub fn credential_calls(&self) -> usize {
        self.credentials.lock().len()
    }

    pub fn connection_calls(&self) -> usize {
        self.connections.lock().len()
    }
}

impl Provider for RecordingProvider {
    fn save_user_credential(
        &self,
        token: &str,
        credential: &CredentialSpec,
    ) -> Result<Credential, ProviderError> {
        self.credentials
            .lock()
            .push((token.to_string(), credential.clone()));
        if self.fail_credential {
            return Err(ProviderError::Backend("credential store unavailable".into()));
        }
        Ok(Credential {
            id: Uuid::new_v4(),
            name: credential.name.clone(),
            user_id: credential.user_id,
            credential_type: credential.credential_type.clone(),
        })
    }

    fn save_connection(
        &self,
        connection: &ConnectionSpec,
        token: &str,
        upsert: bool,
    ) -> Result<Connection, ProviderError> {
        self.connections
            .lock()
            .push((connection.clone(), token.to_string(), upsert));
        if self.fail_connection {
            return Err(ProviderError::Backend("connection table locked".into()));
        }
        Ok(Connection {
            id: Uuid::new_v4(),
            name: connection.name.clone(),
            kind: connection.kind.clone(),
            status: connection.status,
            credential_id: connection.credential_id,
        })
    }
}
