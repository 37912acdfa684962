//! A single node of a machine: its outgoing edges and bound actions.

use super::vocabulary::{EventType, StateType};
use crate::action::Action;
use std::collections::HashMap;
use std::fmt;

/// One state of a machine.
///
/// Built once with the fluent methods below, then installed into a
/// [`StateTable`](super::StateTable) and never mutated again.
///
/// # Example
///
/// ```rust
/// use lifecycle_machines::core::{EventType, State, StateType};
///
/// let discovered: State<(), ()> = State::new()
///     .register_event(EventType::Register, StateType::Registered)
///     .register_event(EventType::Ignore, StateType::Ignored);
///
/// assert_eq!(discovered.next_state(EventType::Register), Some(StateType::Registered));
/// assert_eq!(discovered.next_state(EventType::Connect), None);
/// ```
pub struct State<Ctx, P> {
    transitions: HashMap<EventType, StateType>,
    actions: Vec<Box<dyn Action<Ctx, P>>>,
}

impl<Ctx, P> State<Ctx, P> {
    pub fn new() -> Self {
        Self {
            transitions: HashMap::new(),
            actions: Vec::new(),
        }
    }

    /// Declare that `event` moves the machine from this state to `next`.
    ///
    /// Registering the same event again replaces the earlier edge.
    pub fn register_event(mut self, event: EventType, next: StateType) -> Self {
        self.transitions.insert(event, next);
        self
    }

    /// Append an action. Actions run in registration order within a hook.
    pub fn register_action<A>(mut self, action: A) -> Self
    where
        A: Action<Ctx, P> + 'static,
    {
        self.actions.push(Box::new(action));
        self
    }

    /// Target of the edge for `event`, if this state declares one.
    pub fn next_state(&self, event: EventType) -> Option<StateType> {
        self.transitions.get(&event).copied()
    }

    /// All declared edges, in no particular order.
    pub fn edges(&self) -> impl Iterator<Item = (EventType, StateType)> + '_ {
        self.transitions.iter().map(|(event, next)| (*event, *next))
    }

    pub fn actions(&self) -> &[Box<dyn Action<Ctx, P>>] {
        &self.actions
    }

    /// A state with no edges accepts no event.
    pub fn is_terminal(&self) -> bool {
        self.transitions.is_empty()
    }
}

impl<Ctx, P> Default for State<Ctx, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ctx, P> fmt::Debug for State<Ctx, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let actions: Vec<&str> = self.actions.iter().map(|a| a.name()).collect();
        f.debug_struct("State")
            .field("transitions", &self.transitions)
            .field("actions", &actions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl Action<(), ()> for Named {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn last_registration_for_an_event_wins() {
        let state: State<(), ()> = State::new()
            .register_event(EventType::Connect, StateType::Registered)
            .register_event(EventType::Connect, StateType::Connected);

        assert_eq!(
            state.next_state(EventType::Connect),
            Some(StateType::Connected)
        );
        assert_eq!(state.edges().count(), 1);
    }

    #[test]
    fn unregistered_event_has_no_edge() {
        let state: State<(), ()> =
            State::new().register_event(EventType::Disconnect, StateType::Disconnected);
        assert_eq!(state.next_state(EventType::Connect), None);
    }

    #[test]
    fn actions_keep_registration_order() {
        let state = State::new()
            .register_action(Named("first"))
            .register_action(Named("second"))
            .register_action(Named("third"));

        let names: Vec<&str> = state.actions().iter().map(|a| a.name()).collect();
        assert_eq!(names, ["first", "second", "third"]);
    }

    #[test]
    fn state_without_edges_is_terminal() {
        let state: State<(), ()> = State::new();
        assert!(state.is_terminal());

        let state: State<(), ()> = State::new().register_event(EventType::Ignore, StateType::Ignored);
        assert!(!state.is_terminal());
    }
}
