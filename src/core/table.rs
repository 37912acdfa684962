//! The full set of states a machine kind can be in.

use super::state::State;
use super::vocabulary::{EventType, StateType};
use std::collections::HashMap;
use std::fmt;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// Structural problems in a [`StateTable`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TableViolation {
    #[error("edge '{event}' from '{from}' targets undefined state '{to}'")]
    DanglingEdge {
        from: StateType,
        event: EventType,
        to: StateType,
    },

    #[error("'{0}' is reserved and cannot be a transition target")]
    ReservedTarget(StateType),
}

/// Mapping from [`StateType`] to its [`State`] definition.
///
/// A table is read-only once built. Machines of the same kind share one
/// table behind an `Arc`.
pub struct StateTable<Ctx, P> {
    states: HashMap<StateType, State<Ctx, P>>,
}

impl<Ctx, P> StateTable<Ctx, P> {
    pub fn new() -> Self {
        Self {
            states: HashMap::new(),
        }
    }

    /// Install the definition for `state_type`, replacing any earlier one.
    pub fn with_state(mut self, state_type: StateType, state: State<Ctx, P>) -> Self {
        self.states.insert(state_type, state);
        self
    }

    pub fn get(&self, state_type: StateType) -> Option<&State<Ctx, P>> {
        self.states.get(&state_type)
    }

    pub fn contains(&self, state_type: StateType) -> bool {
        self.states.contains_key(&state_type)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Check every edge, accumulating all violations rather than stopping
    /// at the first.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<TableViolation>> {
        let mut edges: Vec<(StateType, EventType, StateType)> = self
            .states
            .iter()
            .flat_map(|(from, state)| state.edges().map(move |(event, to)| (*from, event, to)))
            .collect();
        edges.sort();

        let checks: Vec<Validation<(), NonEmptyVec<TableViolation>>> = edges
            .into_iter()
            .map(|(from, event, to)| {
                if to == StateType::Default {
                    Validation::fail(TableViolation::ReservedTarget(to))
                } else if !self.contains(to) {
                    Validation::fail(TableViolation::DanglingEdge { from, event, to })
                } else {
                    Validation::success(())
                }
            })
            .collect();

        Validation::all_vec(checks).map(|_| ())
    }
}

impl<Ctx, P> Default for StateTable<Ctx, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ctx, P> fmt::Debug for StateTable<Ctx, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.states.iter()).finish()
    }
}
