//! Prometheus integration machine.
//!
//! Unlike Grafana, connection and credential details are fixed when the
//! machine is created and live in its [`PrometheusContext`]. Events carry
//! no payload.

use super::connect::{persist_connection, ConnectionSource};
use super::lifecycle_table;
use crate::action::{Action, ExecutionContext, HookResult};
use crate::core::{State, StateTable, StateType};
use crate::error::MachineResult;
use crate::machine::StateMachine;
use crate::provider::{ConnectionSpec, ConnectionStatus, CredentialSpec};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map};
use std::sync::{Arc, OnceLock};
use uuid::Uuid;

pub const PROMETHEUS: &str = "prometheus";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrometheusConn {
    pub url: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrometheusCred {
    pub name: String,
    pub api_key: String,
}

/// Machine context of a Prometheus machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrometheusContext {
    pub conn: PrometheusConn,
    pub cred: PrometheusCred,
}

impl ConnectionSource for PrometheusContext {
    fn credential(&self, user_id: Uuid) -> CredentialSpec {
        let mut secret = Map::new();
        secret.insert("auth".into(), json!(self.cred.api_key));
        CredentialSpec {
            name: self.cred.name.clone(),
            user_id,
            credential_type: PROMETHEUS.to_string(),
            secret,
        }
    }

    fn connection(&self, credential_id: Uuid) -> ConnectionSpec {
        let mut metadata = Map::new();
        metadata.insert("name".into(), json!(self.conn.name));
        metadata.insert("url".into(), json!(self.conn.url));
        ConnectionSpec {
            kind: PROMETHEUS.to_string(),
            connection_type: "observability".to_string(),
            sub_type: "monitoring".to_string(),
            status: ConnectionStatus::Connected,
            name: self.conn.name.clone(),
            metadata,
            credential_id,
        }
    }
}

/// Persists the credential and connection held in the machine context.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectAction;

impl Action<PrometheusContext, ()> for ConnectAction {
    fn execute(&self, exec: &ExecutionContext, machine: &PrometheusContext, _: &()) -> HookResult {
        persist_connection(exec, machine)
    }

    fn name(&self) -> &str {
        "prometheus_connect"
    }
}

pub type PrometheusMachine = StateMachine<PrometheusContext, ()>;

pub fn states() -> Arc<StateTable<PrometheusContext, ()>> {
    static TABLE: OnceLock<Arc<StateTable<PrometheusContext, ()>>> = OnceLock::new();
    let table = TABLE.get_or_init(|| {
        Arc::new(lifecycle_table(
            State::new(),
            State::new().register_action(ConnectAction),
        ))
    });
    Arc::clone(table)
}

/// Create the machine for Prometheus connection `id`.
pub fn new_machine(
    initial_state: StateType,
    id: &str,
    context: PrometheusContext,
) -> MachineResult<PrometheusMachine> {
    StateMachine::new(PROMETHEUS, initial_state, id, states(), context)
}
