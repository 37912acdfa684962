//! Driver configuration.

use serde::{Deserialize, Serialize};

/// What the driver does when an action hook fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionErrorPolicy {
    /// Stop at the first failing hook and return its failure.
    ///
    /// An exit-hook failure leaves the machine where it was. An entry or
    /// execute failure happens after the state mutation, so the new state
    /// is kept.
    #[default]
    Halt,

    /// Run every hook of the transition, apply the transition even if an
    /// exit hook failed, and return the last failure seen.
    Continue,
}

/// Tunables for [`StateMachine::advance`](super::StateMachine::advance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverPolicy {
    pub on_action_error: ActionErrorPolicy,
}

impl DriverPolicy {
    pub fn halting() -> Self {
        Self {
            on_action_error: ActionErrorPolicy::Halt,
        }
    }

    pub fn continuing() -> Self {
        Self {
            on_action_error: ActionErrorPolicy::Continue,
        }
    }

    pub(crate) fn halts(&self) -> bool {
        self.on_action_error == ActionErrorPolicy::Halt
    }
}
