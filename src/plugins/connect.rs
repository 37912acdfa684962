//! Persisting a credential and the connection that uses it.
//!
//! The two provider calls are separate atomic steps. If the connection
//! cannot be stored after the credential was, the failure says so
//! ([`MachineError::ConnectionPersist`]) and nothing is rolled back.

use crate::action::{Action, ExecutionContext, Failure, HookResult, Reply};
use crate::audit::{EventBuilder, Severity};
use crate::error::MachineError;
use crate::provider::{ConnectionSpec, ConnectionStatus, CredentialSpec, ProviderError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

/// Something that can describe the credential and connection to persist.
pub trait ConnectionSource {
    /// Credential record, owned by `user_id`.
    fn credential(&self, user_id: Uuid) -> CredentialSpec;

    /// Connection record referencing the stored credential.
    fn connection(&self, credential_id: Uuid) -> ConnectionSpec;
}

fn base_event(exec: &ExecutionContext) -> EventBuilder {
    EventBuilder::new()
        .acted_upon(exec.user_id())
        .with_category("connection")
        .with_action("update")
        .from_system(exec.system_id())
        .from_user(exec.user_id())
        .with_description("Failed to interact with the connection.")
}

fn cancelled(exec: &ExecutionContext, reason: String) -> Failure {
    let event = base_event(exec)
        .with_severity(Severity::Error)
        .with_meta("error", reason.clone())
        .build();
    Failure::new(MachineError::Cancelled(reason), event)
}

fn credential_failure(
    exec: &ExecutionContext,
    spec: &CredentialSpec,
    source: ProviderError,
) -> Failure {
    let event = base_event(exec)
        .with_description(format!(
            "Unable to persist credential information for the connection {}",
            spec.name
        ))
        .with_severity(Severity::Error)
        .with_meta("error", source.to_string())
        .with_meta("credential", spec.name.clone())
        .build();
    Failure::new(
        MachineError::CredentialPersist {
            name: spec.name.clone(),
            source,
        },
        event,
    )
}

/// Store the credential, then a `connected` connection referencing it.
///
/// Fails before touching the provider if the caller's deadline has already
/// passed, and does not start the second call once it has.
pub fn persist_connection<S>(exec: &ExecutionContext, source: &S) -> HookResult
where
    S: ConnectionSource + ?Sized,
{
    let credential_spec = source.credential(exec.user_id());

    if exec.is_expired() {
        return Err(cancelled(
            exec,
            format!(
                "deadline passed before saving credential '{}'",
                credential_spec.name
            ),
        ));
    }

    let (provider, saved) = match exec.provider() {
        Some(provider) => (
            provider,
            provider.save_user_credential(exec.token(), &credential_spec),
        ),
        None => {
            let source = ProviderError::Unavailable("execution context carries no provider".into());
            return Err(credential_failure(exec, &credential_spec, source));
        }
    };
    let credential = saved.map_err(|source| credential_failure(exec, &credential_spec, source))?;

    let mut connection_spec = source.connection(credential.id);
    connection_spec.status = ConnectionStatus::Connected;

    if exec.is_expired() {
        return Err(cancelled(
            exec,
            format!(
                "deadline passed before saving connection '{}' (credential {} was saved)",
                connection_spec.name, credential.id
            ),
        ));
    }

    let saved = provider.save_connection(&connection_spec, exec.token(), false);
    let connection = saved.map_err(|source| {
        let event = base_event(exec)
            .with_description(format!(
                "Unable to persist the \"{}\" connection details",
                connection_spec.name
            ))
            .with_severity(Severity::Error)
            .with_meta("error", source.to_string())
            .with_meta("connection", connection_spec.name.clone())
            .with_meta("credential_id", credential.id.to_string())
            .build();
        Failure::new(
            MachineError::ConnectionPersist {
                name: connection_spec.name.clone(),
                credential_id: credential.id,
                source,
            },
            event,
        )
    })?;

    debug!(
        connection = %connection.id,
        name = %connection.name,
        kind = %connection.kind,
        "connection persisted"
    );
    Ok(Reply::noop())
}

/// Credential half of a [`ConnectionRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialFields {
    pub name: String,
    /// Owner; defaults to the caller when absent.
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub credential_type: String,
    #[serde(default)]
    pub secret: Map<String, Value>,
}

/// Connection half of a [`ConnectionRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionFields {
    pub kind: String,
    #[serde(rename = "type")]
    pub connection_type: String,
    #[serde(default)]
    pub sub_type: String,
    pub name: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// The payload shape [`DefaultConnectAction`] expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRequest {
    pub credential: CredentialFields,
    pub connection: ConnectionFields,
}

impl ConnectionSource for ConnectionRequest {
    fn credential(&self, user_id: Uuid) -> CredentialSpec {
        CredentialSpec {
            name: self.credential.name.clone(),
            user_id: self.credential.user_id.unwrap_or(user_id),
            credential_type: self.credential.credential_type.clone(),
            secret: self.credential.secret.clone(),
        }
    }

    fn connection(&self, credential_id: Uuid) -> ConnectionSpec {
        ConnectionSpec {
            kind: self.connection.kind.clone(),
            connection_type: self.connection.connection_type.clone(),
            sub_type: self.connection.sub_type.clone(),
            status: ConnectionStatus::Connected,
            name: self.connection.name.clone(),
            metadata: self.connection.metadata.clone(),
            credential_id,
        }
    }
}

/// Connect action for integrations whose payload arrives as untyped JSON.
///
/// The payload must deserialize into a [`ConnectionRequest`]; otherwise the
/// action fails with [`MachineError::ContextAssertion`] without calling the
/// provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConnectAction;

impl<Ctx> Action<Ctx, Value> for DefaultConnectAction {
    fn execute(&self, exec: &ExecutionContext, _machine: &Ctx, payload: &Value) -> HookResult {
        let request = ConnectionRequest::deserialize(payload).map_err(|err| {
            let error = MachineError::ContextAssertion(format!(
                "payload is not a connection request: {err}"
            ));
            let event = base_event(exec)
                .with_severity(Severity::Error)
                .with_meta("error", error.to_string())
                .build();
            Failure::new(error, event)
        })?;

        persist_connection(exec, &request)
    }

    fn name(&self) -> &str {
        "default_connect"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{Connection, Credential, Provider};
    use chrono::Utc;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::Arc;

    #[derive(Default)]
    struct StubProvider {
        fail_credential: bool,
        fail_connection: bool,
        credentials: Mutex<Vec<CredentialSpec>>,
        connections: Mutex<Vec<(ConnectionSpec, String, bool)>>,
    }

    impl Provider for StubProvider {
        fn save_user_credential(
            &self,
            _token: &str,
            credential: &CredentialSpec,
        ) -> Result<Credential, ProviderError> {
            self.credentials.lock().push(credential.clone());
            if self.fail_credential {
                return Err(ProviderError::Backend("vault sealed".into()));
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
                return Err(ProviderError::Rejected("duplicate connection".into()));
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

    fn request() -> Value {
        json!({
            "credential": {"name": "prom-cred", "type": "prometheus", "secret": {"auth": "k"}},
            "connection": {
                "kind": "prometheus",
                "type": "observability",
                "sub_type": "monitoring",
                "name": "prom-1",
                "metadata": {"url": "http://prom:9090"}
            }
        })
    }

    fn exec(provider: &Arc<StubProvider>) -> ExecutionContext {
        ExecutionContext::new()
            .with_token("tok")
            .with_provider(Arc::clone(provider) as Arc<dyn Provider>)
    }

    #[test]
    fn wrong_payload_shape_never_reaches_provider() {
        let provider = Arc::new(StubProvider::default());
        let failure = DefaultConnectAction
            .execute(&exec(&provider), &(), &json!({"unexpected": true}))
            .unwrap_err();

        assert!(matches!(failure.error, MachineError::ContextAssertion(_)));
        let event = failure.event.unwrap();
        assert_eq!(event.severity, Severity::Error);
        assert!(event.cause().is_some());
        assert!(provider.credentials.lock().is_empty());
        assert!(provider.connections.lock().is_empty());
    }

    #[test]
    fn request_is_persisted_as_connected() {
        let provider = Arc::new(StubProvider::default());
        let reply = DefaultConnectAction
            .execute(&exec(&provider), &(), &request())
            .unwrap();

        assert!(reply.is_empty());
        let credentials = provider.credentials.lock();
        assert_eq!(credentials[0].name, "prom-cred");
        assert_eq!(credentials[0].secret["auth"], json!("k"));

        let connections = provider.connections.lock();
        let (spec, token, upsert) = &connections[0];
        assert_eq!(spec.status, ConnectionStatus::Connected);
        assert_eq!(spec.name, "prom-1");
        assert_eq!(token, "tok");
        assert!(!upsert);
    }

    #[test]
    fn credential_failure_skips_connection() {
        let provider = Arc::new(StubProvider {
            fail_credential: true,
            ..Default::default()
        });
        let failure = DefaultConnectAction
            .execute(&exec(&provider), &(), &request())
            .unwrap_err();

        assert!(matches!(
            failure.error,
            MachineError::CredentialPersist { ref name, .. } if name == "prom-cred"
        ));
        let event = failure.event.unwrap();
        assert!(event.description.contains("prom-cred"));
        assert_eq!(event.cause(), Some("provider backend failure: vault sealed"));
        assert!(provider.connections.lock().is_empty());
    }

    #[test]
    fn connection_failure_reports_saved_credential() {
        let provider = Arc::new(StubProvider {
            fail_connection: true,
            ..Default::default()
        });
        let failure = DefaultConnectAction
            .execute(&exec(&provider), &(), &request())
            .unwrap_err();

        let MachineError::ConnectionPersist {
            name,
            credential_id,
            ..
        } = &failure.error
        else {
            panic!("Expected ConnectionPersist, got {:?}", failure.error);
        };
        assert_eq!(name, "prom-1");

        let event = failure.event.as_ref().unwrap();
        assert_eq!(event.severity, Severity::Error);
        assert_eq!(event.description, "Unable to persist the \"prom-1\" connection details");
        assert_eq!(event.cause(), Some("provider rejected request: duplicate connection"));
        assert_eq!(event.metadata["credential_id"], json!(credential_id.to_string()));
    }

    #[test]
    fn missing_provider_surfaces_as_credential_failure() {
        let failure = DefaultConnectAction
            .execute(&ExecutionContext::new(), &(), &request())
            .unwrap_err();

        assert!(matches!(
            failure.error,
            MachineError::CredentialPersist {
                source: ProviderError::Unavailable(_),
                ..
            }
        ));
    }

    #[test]
    fn expired_deadline_stops_before_provider() {
        let provider = Arc::new(StubProvider::default());
        let exec = exec(&provider).with_deadline(Utc::now() - chrono::Duration::seconds(1));

        let failure = DefaultConnectAction
            .execute(&exec, &(), &request())
            .unwrap_err();

        assert!(matches!(failure.error, MachineError::Cancelled(_)));
        assert!(provider.credentials.lock().is_empty());
    }

    #[test]
    fn credential_owner_defaults_to_caller() {
        let user = Uuid::new_v4();
        let request: ConnectionRequest = serde_json::from_value(request()).unwrap();
        assert_eq!(request.credential(user).user_id, user);
    }
}
