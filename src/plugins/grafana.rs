//! Grafana integration machine.
//!
//! Grafana connection details arrive with each event as a typed
//! [`GrafanaPayload`]; the machine context is unused.

use super::connect::{persist_connection, ConnectionSource};
use super::lifecycle_table;
use crate::action::{Action, ExecutionContext, HookResult, Reply};
use crate::audit::{EventBuilder, Severity};
use crate::core::{State, StateTable, StateType};
use crate::error::MachineResult;
use crate::machine::StateMachine;
use crate::provider::{ConnectionSpec, ConnectionStatus, CredentialSpec};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::{Arc, OnceLock};
use uuid::Uuid;

/// Integration kind, used as machine name, credential type and connection kind.
pub const GRAFANA: &str = "grafana";

/// Where the Grafana instance lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrafanaConn {
    pub url: String,
    pub name: String,
}

/// How to authenticate against it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GrafanaCred {
    pub name: String,
    /// Preferred strategy.
    #[serde(default)]
    pub api_key: Option<String>,
    /// `username:password`
    #[serde(default)]
    pub basic_auth: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrafanaPayload {
    pub conn: GrafanaConn,
    pub cred: GrafanaCred,
}

impl ConnectionSource for GrafanaPayload {
    fn credential(&self, user_id: Uuid) -> CredentialSpec {
        let mut secret = Map::new();
        if let Some(key) = &self.cred.api_key {
            secret.insert("auth".into(), Value::String(key.clone()));
        } else if let Some(basic) = &self.cred.basic_auth {
            secret.insert("basic_auth".into(), Value::String(basic.clone()));
        }
        CredentialSpec {
            name: self.cred.name.clone(),
            user_id,
            credential_type: GRAFANA.to_string(),
            secret,
        }
    }

    fn connection(&self, credential_id: Uuid) -> ConnectionSpec {
        let mut metadata = Map::new();
        metadata.insert("name".into(), json!(self.conn.name));
        metadata.insert("url".into(), json!(self.conn.url));
        ConnectionSpec {
            kind: GRAFANA.to_string(),
            connection_type: "observability".to_string(),
            sub_type: "monitoring".to_string(),
            status: ConnectionStatus::Connected,
            name: self.conn.name.clone(),
            metadata,
            credential_id,
        }
    }
}

/// Reports that a Grafana instance was registered. Touches no storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegisterAction;

impl Action<(), GrafanaPayload> for RegisterAction {
    fn execute(&self, exec: &ExecutionContext, _: &(), payload: &GrafanaPayload) -> HookResult {
        let event = EventBuilder::new()
            .acted_upon(exec.user_id())
            .from_user(exec.user_id())
            .from_system(exec.system_id())
            .with_category("connection")
            .with_action("register")
            .with_severity(Severity::Informational)
            .with_description(format!("Grafana connection {} registered", payload.conn.name))
            .with_meta("url", payload.conn.url.clone())
            .build();
        Ok(Reply::noop().with_event(event))
    }

    fn name(&self) -> &str {
        "grafana_register"
    }
}

/// Persists the credential and connection carried by the payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectAction;

impl Action<(), GrafanaPayload> for ConnectAction {
    fn execute(&self, exec: &ExecutionContext, _: &(), payload: &GrafanaPayload) -> HookResult {
        persist_connection(exec, payload)
    }

    fn name(&self) -> &str {
        "grafana_connect"
    }
}

pub type GrafanaMachine = StateMachine<(), GrafanaPayload>;

/// The Grafana state table, built once per process.
pub fn states() -> Arc<StateTable<(), GrafanaPayload>> {
    static TABLE: OnceLock<Arc<StateTable<(), GrafanaPayload>>> = OnceLock::new();
    let table = TABLE.get_or_init(|| {
        Arc::new(lifecycle_table(
            State::new().register_action(RegisterAction),
            State::new().register_action(ConnectAction),
        ))
    });
    Arc::clone(table)
}

/// Create the machine for Grafana connection `id`.
pub fn new_machine(initial_state: StateType, id: &str) -> MachineResult<GrafanaMachine> {
    StateMachine::new(GRAFANA, initial_state, id, states(), ())
}
