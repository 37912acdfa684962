//! Grafana Lifecycle
//!
//! This example walks one Grafana instance through its whole lifecycle.
//!
//! Key concepts:
//! - Per-kind state tables shared by every machine of that kind
//! - Typed payloads delivered with each event
//! - An in-memory provider standing in for the credential store
//! - Audit events published through `TracingSink`
//!
//! Run with: RUST_LOG=debug cargo run --example grafana_lifecycle

use lifecycle_machines::action::ExecutionContext;
use lifecycle_machines::audit::{EventSink, TracingSink};
use lifecycle_machines::core::{EventType, StateType};
use lifecycle_machines::plugins::grafana::{self, GrafanaConn, GrafanaCred, GrafanaPayload};
use lifecycle_machines::provider::{
    Connection, ConnectionSpec, Credential, CredentialSpec, Provider, ProviderError,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// In-memory credential and connection store
#[derive(Default)]
struct MemoryProvider {
    credentials: Mutex<Vec<Credential>>,
    connections: Mutex<Vec<Connection>>,
}

impl Provider for MemoryProvider {
    fn save_user_credential(
        &self,
        _token: &str,
        credential: &CredentialSpec,
    ) -> Result<Credential, ProviderError> {
        let saved = Credential {
            id: Uuid::new_v4(),
            name: credential.name.clone(),
            user_id: credential.user_id,
            credential_type: credential.credential_type.clone(),
        };
        self.credentials.lock().push(saved.clone());
        Ok(saved)
    }

    fn save_connection(
        &self,
        connection: &ConnectionSpec,
        _token: &str,
        _upsert: bool,
    ) -> Result<Connection, ProviderError> {
        let saved = Connection {
            id: Uuid::new_v4(),
            name: connection.name.clone(),
            kind: connection.kind.clone(),
            status: connection.status,
            credential_id: connection.credential_id,
        };
        self.connections.lock().push(saved.clone());
        Ok(saved)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    println!("=== Grafana Lifecycle ===\n");

    let provider = Arc::new(MemoryProvider::default());
    let exec = ExecutionContext::new()
        .with_user(Uuid::new_v4())
        .with_system(Uuid::new_v4())
        .with_token("demo-token")
        .with_provider(Arc::clone(&provider) as Arc<dyn Provider>);

    let payload = GrafanaPayload {
        conn: GrafanaConn {
            url: "http://localhost:3000".into(),
            name: "grafana-local".into(),
        },
        cred: GrafanaCred {
            name: "grafana-local".into(),
            api_key: Some("glsa_demo".into()),
            basic_auth: None,
        },
    };

    let mut machine = grafana::new_machine(StateType::Initial, &Uuid::new_v4().to_string())
        .expect("freshly generated id is a valid uuid");
    let sink = TracingSink;

    println!("Machine {} starts in {}", machine.id(), machine.current_state());

    for event in [
        EventType::Discovery,
        EventType::Register,
        EventType::Connect,
        EventType::Disconnect,
    ] {
        match machine.advance(&exec, event, &payload) {
            Ok(reply) => {
                println!("  {event} -> {}", machine.current_state());
                if let Some(audit) = &reply.event {
                    sink.publish(audit);
                }
            }
            Err(failure) => {
                println!("  {event} failed: {failure}");
                if let Some(audit) = &failure.event {
                    sink.publish(audit);
                }
            }
        }
    }

    // Terminal states accept nothing
    if let Err(failure) = machine.advance(&exec, EventType::Connect, &payload) {
        println!("  connect after disconnect rejected: {failure}");
    }

    let path: Vec<String> = machine
        .history()
        .path()
        .iter()
        .map(ToString::to_string)
        .collect();
    println!("\nPath: {}", path.join(" -> "));
    println!(
        "Stored {} credential(s), {} connection(s)",
        provider.credentials.lock().len(),
        provider.connections.lock().len()
    );
}
