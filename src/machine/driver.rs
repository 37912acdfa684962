//! The machine driver: the only code that moves a machine between states.

use crate::action::{Action, ExecutionContext, Failure, Reply};
use crate::core::{EventType, StateTable, StateType, TransitionLog, TransitionRecord};
use crate::error::{MachineError, MachineResult};
use crate::machine::policy::DriverPolicy;
use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Span};
use uuid::Uuid;

/// Which hook of an action is being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hook {
    Exit,
    Entry,
    Execute,
}

impl Hook {
    fn name(self) -> &'static str {
        match self {
            Self::Exit => "on_exit",
            Self::Entry => "on_entry",
            Self::Execute => "execute",
        }
    }
}

/// What one `advance` call has produced so far.
#[derive(Default)]
struct Tally {
    reply: Reply,
    failure: Option<Failure>,
}

impl Tally {
    fn finish(self) -> Result<Reply, Failure> {
        match self.failure {
            Some(failure) => Err(failure),
            None => Ok(self.reply),
        }
    }
}

/// Lifecycle state of one integration instance.
///
/// `Ctx` is the integration's machine context, owned by the machine and
/// lent to every hook. `P` is the payload type delivered with events.
///
/// The machine is not internally synchronized: callers must serialize
/// `advance` calls per machine, for instance through
/// [`MachineRegistry`](super::MachineRegistry).
pub struct StateMachine<Ctx, P> {
    id: Uuid,
    name: String,
    previous_state: StateType,
    current_state: StateType,
    initial_state: StateType,
    states: Arc<StateTable<Ctx, P>>,
    context: Ctx,
    policy: DriverPolicy,
    history: TransitionLog,
    span: Span,
}

impl<Ctx, P> StateMachine<Ctx, P> {
    /// Create a machine for the integration instance `id` of kind `name`.
    ///
    /// Fails with [`MachineError::MachineInitialization`] if `id` is not a
    /// UUID. The machine's span is parented to the caller's current span.
    pub fn new(
        name: impl Into<String>,
        initial_state: StateType,
        id: &str,
        states: Arc<StateTable<Ctx, P>>,
        context: Ctx,
    ) -> MachineResult<Self> {
        let name = name.into();
        let id = Uuid::parse_str(id).map_err(|e| MachineError::MachineInitialization {
            id: id.to_string(),
            reason: e.to_string(),
        })?;

        let span = info_span!("machine", id = %id, name = %name);
        span.in_scope(|| info!(initial = %initial_state, "initialising machine"));

        Ok(Self {
            id,
            name,
            previous_state: StateType::Default,
            current_state: initial_state,
            initial_state,
            states,
            context,
            policy: DriverPolicy::default(),
            history: TransitionLog::new(),
            span,
        })
    }

    pub fn with_policy(mut self, policy: DriverPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn current_state(&self) -> StateType {
        self.current_state
    }

    /// `StateType::Default` until the first transition.
    pub fn previous_state(&self) -> StateType {
        self.previous_state
    }

    pub fn initial_state(&self) -> StateType {
        self.initial_state
    }

    pub fn states(&self) -> &Arc<StateTable<Ctx, P>> {
        &self.states
    }

    pub fn context(&self) -> &Ctx {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut Ctx {
        &mut self.context
    }

    pub fn policy(&self) -> DriverPolicy {
        self.policy
    }

    pub fn history(&self) -> &TransitionLog {
        &self.history
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// True when the current state accepts no event (or is undefined).
    pub fn is_terminal(&self) -> bool {
        self.states
            .get(self.current_state)
            .is_none_or(|state| state.is_terminal())
    }

    /// Put the machine back in its initial state without running actions.
    pub fn reset(&mut self) {
        let _entered = self.span.enter();
        info!(from = %self.current_state, to = %self.initial_state, "resetting machine");
        self.previous_state = StateType::Default;
        self.current_state = self.initial_state;
        self.history.clear();
    }

    /// Deliver `event` with `payload` and apply the resulting transition.
    ///
    /// In order: resolve the current state and its edge for `event`, run
    /// the exit hooks of the current state, resolve the target, move
    /// `current` to `previous` and the target to `current`, then run the
    /// entry hooks and the execute hooks of the new state. Actions within
    /// a hook run in registration order.
    ///
    /// An event with no edge fails with [`MachineError::InvalidTransition`]
    /// and leaves the machine untouched. Failures of entry or execute hooks
    /// are reported after the state has changed.
    ///
    /// The returned [`Reply`] is the last non-empty one produced by a hook.
    /// A requested follow-up event is never delivered automatically.
    pub fn advance(
        &mut self,
        exec: &ExecutionContext,
        event: EventType,
        payload: &P,
    ) -> Result<Reply, Failure> {
        let span = self.span.clone();
        let _entered = span.enter();

        let states = Arc::clone(&self.states);
        let from = self.current_state;

        let current = states.get(from).ok_or_else(|| {
            error!(state = %from, "current state missing from state table");
            Failure::bare(MachineError::UnknownState(from))
        })?;

        let Some(to) = current.next_state(event) else {
            warn!(state = %from, event = %event, "rejected event with no transition");
            return Err(Failure::bare(MachineError::InvalidTransition { state: from, event }));
        };

        let mut tally = Tally::default();
        self.run_hooks(Hook::Exit, current.actions(), exec, payload, &mut tally)?;

        let target = states.get(to).ok_or_else(|| {
            error!(state = %to, event = %event, "transition target missing from state table");
            Failure::bare(MachineError::UnknownState(to))
        })?;

        self.previous_state = from;
        self.current_state = to;
        self.history.record(TransitionRecord {
            from,
            to,
            event,
            timestamp: Utc::now(),
        });
        debug!(from = %from, to = %to, event = %event, "transition applied");

        self.run_hooks(Hook::Entry, target.actions(), exec, payload, &mut tally)?;
        self.run_hooks(Hook::Execute, target.actions(), exec, payload, &mut tally)?;

        tally.finish()
    }

    fn run_hooks(
        &self,
        hook: Hook,
        actions: &[Box<dyn Action<Ctx, P>>],
        exec: &ExecutionContext,
        payload: &P,
        tally: &mut Tally,
    ) -> Result<(), Failure> {
        for action in actions {
            let outcome = match hook {
                Hook::Exit => action.on_exit(exec, &self.context, payload),
                Hook::Entry => action.on_entry(exec, &self.context, payload),
                Hook::Execute => action.execute(exec, &self.context, payload),
            };

            match outcome {
                Ok(reply) if reply.is_empty() => {}
                Ok(reply) => tally.reply = reply,
                Err(failure) => {
                    warn!(
                        action = action.name(),
                        hook = hook.name(),
                        error = %failure.error,
                        "action failed"
                    );
                    if self.policy.halts() {
                        return Err(failure);
                    }
                    tally.failure = Some(failure);
                }
            }
        }
        Ok(())
    }
}

impl<Ctx: fmt::Debug, P> fmt::Debug for StateMachine<Ctx, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("previous_state", &self.previous_state)
            .field("current_state", &self.current_state)
            .field("initial_state", &self.initial_state)
            .field("context", &self.context)
            .field("policy", &self.policy)
            .finish()
    }
}
