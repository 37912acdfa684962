//! Lifecycle Machines: a table-driven state machine engine for integrations
//!
//! Every external integration instance (a Grafana server, a Prometheus
//! endpoint, ...) is driven through its lifecycle by a [`StateMachine`].
//! A plugin supplies a [`StateTable`] and a few [`Action`] implementations;
//! the engine guarantees that only declared edges change state, that hooks
//! run in a fixed order, and that every failure comes back with an audit
//! [`Event`].
//!
//! # Core Concepts
//!
//! - **Vocabulary**: closed [`EventType`] and [`StateType`] enums
//! - **State**: outgoing edges plus ordered actions for one node
//! - **Action**: `on_exit` / `on_entry` / `execute` hooks, typed per plugin
//! - **Driver**: [`StateMachine::advance`] resolves, exits, mutates, enters
//! - **Audit**: [`Event`] values built with [`EventBuilder`]
//!
//! # Example
//!
//! ```rust
//! use lifecycle_machines::action::ExecutionContext;
//! use lifecycle_machines::core::{EventType, StateType};
//! use lifecycle_machines::error::MachineError;
//! use lifecycle_machines::plugins::prometheus::{self, PrometheusConn, PrometheusContext, PrometheusCred};
//!
//! let context = PrometheusContext {
//!     conn: PrometheusConn { url: "http://prometheus:9090".into(), name: "prom-1".into() },
//!     cred: PrometheusCred { name: "prom-1".into(), api_key: "key".into() },
//! };
//! let mut machine = prometheus::new_machine(
//!     StateType::Initial,
//!     "9b2e4c1a-7f3d-4e8b-a6c5-0d1f2e3a4b5c",
//!     context,
//! )
//! .unwrap();
//!
//! let exec = ExecutionContext::new();
//! machine.advance(&exec, EventType::Discovery, &()).unwrap();
//! assert_eq!(machine.current_state(), StateType::Discovered);
//!
//! let failure = machine.advance(&exec, EventType::Disconnect, &()).unwrap_err();
//! assert!(matches!(failure.error, MachineError::InvalidTransition { .. }));
//! assert_eq!(machine.current_state(), StateType::Discovered);
//! ```

pub mod action;
pub mod audit;
pub mod core;
pub mod error;
pub mod machine;
pub mod plugins;
pub mod provider;

// Re-export commonly used types
pub use action::{Action, ExecutionContext, Failure, HookResult, Reply};
pub use audit::{Event, EventBuilder, EventSink, Severity};
pub use crate::core::{EventType, State, StateTable, StateType};
pub use error::MachineError;
pub use machine::{DriverPolicy, MachineRegistry, StateMachine};
