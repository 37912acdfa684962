//! Record of transitions a machine has applied.

use super::vocabulary::{EventType, StateType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One applied transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// The state being left
    pub from: StateType,
    /// The state being entered
    pub to: StateType,
    /// The event that triggered it
    pub event: EventType,
    /// When the state mutation happened
    pub timestamp: DateTime<Utc>,
}

/// Ordered log of transitions, oldest first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionLog {
    records: Vec<TransitionRecord>,
}

impl TransitionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: TransitionRecord) {
        self.records.push(record);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// States visited: the first `from`, then every `to`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use chrono::Utc;
    /// use lifecycle_machines::core::{EventType, StateType, TransitionLog, TransitionRecord};
    ///
    /// let mut log = TransitionLog::new();
    /// log.record(TransitionRecord {
    ///     from: StateType::Initial,
    ///     to: StateType::Discovered,
    ///     event: EventType::Discovery,
    ///     timestamp: Utc::now(),
    /// });
    ///
    /// assert_eq!(log.path(), [StateType::Initial, StateType::Discovered]);
    /// ```
    pub fn path(&self) -> Vec<StateType> {
        let mut path = Vec::with_capacity(self.records.len() + 1);
        if let Some(first) = self.records.first() {
            path.push(first.from);
        }
        path.extend(self.records.iter().map(|r| r.to));
        path
    }

    /// Time between the first and the last transition.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.records.first()?, self.records.last()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn records(&self) -> &[TransitionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
