//! The action contract bound to machine states.
//!
//! An [`Action`] runs when its state is left ([`Action::on_exit`]), entered
//! ([`Action::on_entry`]) and acted upon ([`Action::execute`]). Hooks are
//! synchronous: any blocking happens inside the action, on the caller's
//! thread.
//!
//! Actions hold configuration only. Identity and progress live in the
//! [`StateMachine`](crate::machine::StateMachine); external handles arrive
//! per call through the [`ExecutionContext`].

mod context;

pub use context::ExecutionContext;

use crate::audit::Event;
use crate::core::EventType;
use crate::error::MachineError;
use std::fmt;

/// Successful hook outcome.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reply {
    /// Follow-up event the action asks for; `NoOp` for none. The machine
    /// never delivers it on its own.
    pub next: EventType,
    /// Optional low-severity description of what happened.
    pub event: Option<Event>,
}

impl Reply {
    /// Nothing to report and nothing requested.
    pub fn noop() -> Self {
        Self::default()
    }

    /// Ask the caller to deliver `next` afterwards.
    pub fn request(next: EventType) -> Self {
        Self { next, event: None }
    }

    pub fn with_event(mut self, event: Event) -> Self {
        self.event = Some(event);
        self
    }

    /// True when the reply carries neither a request nor an event.
    pub fn is_empty(&self) -> bool {
        self.next.is_noop() && self.event.is_none()
    }
}

/// Failed hook or `advance` outcome: the error and the audit event
/// correlated with it.
///
/// Failures returned by actions always carry an event. Failures raised by
/// the driver itself (invalid transition, unknown state) carry none.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub error: MachineError,
    pub event: Option<Event>,
}

impl Failure {
    pub fn new(error: MachineError, event: Event) -> Self {
        Self {
            error,
            event: Some(event),
        }
    }

    /// A failure with no audit event attached.
    pub fn bare(error: MachineError) -> Self {
        Self { error, event: None }
    }
}

impl From<MachineError> for Failure {
    fn from(error: MachineError) -> Self {
        Self::bare(error)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl std::error::Error for Failure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Result of a single hook.
pub type HookResult = Result<Reply, Failure>;

/// Behavior bound to a state.
///
/// `Ctx` is the machine context owned by the machine, `P` the payload
/// delivered with each event. Both are fixed per integration kind, so an
/// action cannot be handed a value of the wrong shape.
///
/// All hooks default to [`Reply::noop`].
pub trait Action<Ctx, P>: Send + Sync {
    /// Guard or preparation work when the machine enters this action's state.
    fn on_entry(&self, exec: &ExecutionContext, machine: &Ctx, payload: &P) -> HookResult {
        let _ = (exec, machine, payload);
        Ok(Reply::noop())
    }

    /// Main work of the state; runs right after `on_entry`.
    fn execute(&self, exec: &ExecutionContext, machine: &Ctx, payload: &P) -> HookResult {
        let _ = (exec, machine, payload);
        Ok(Reply::noop())
    }

    /// Cleanup when the machine leaves this action's state.
    fn on_exit(&self, exec: &ExecutionContext, machine: &Ctx, payload: &P) -> HookResult {
        let _ = (exec, machine, payload);
        Ok(Reply::noop())
    }

    /// Label used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
