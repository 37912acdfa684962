//! Audit event values and their fluent builder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// How serious an audited outcome is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Informational,
    Success,
    Warning,
    Error,
    Critical,
}

impl Default for Severity {
    fn default() -> Self {
        Self::Informational
    }
}

/// Immutable record describing the outcome of an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub user_id: Uuid,
    pub system_id: Uuid,
    pub acted_upon: Uuid,
    pub category: String,
    pub action: String,
    pub severity: Severity,
    pub description: String,
    pub metadata: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Start building a new event.
    pub fn builder() -> EventBuilder {
        EventBuilder::new()
    }

    pub fn is_error(&self) -> bool {
        self.severity >= Severity::Error
    }

    /// The recorded cause, if the event carries one under `"error"`.
    pub fn cause(&self) -> Option<&str> {
        self.metadata.get("error").and_then(Value::as_str)
    }
}

/// Builder for [`Event`].
///
/// Setters may be called in any order and repeatedly; the last call wins.
/// A builder is cheap to clone, so actions prepare a base builder once and
/// specialise it per outcome.
#[derive(Debug, Clone, Default)]
pub struct EventBuilder {
    user_id: Uuid,
    system_id: Uuid,
    acted_upon: Uuid,
    category: String,
    action: String,
    severity: Severity,
    description: String,
    metadata: Map<String, Value>,
}

impl EventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subject the event is about.
    pub fn acted_upon(mut self, id: Uuid) -> Self {
        self.acted_upon = id;
        self
    }

    pub fn from_user(mut self, id: Uuid) -> Self {
        self.user_id = id;
        self
    }

    pub fn from_system(mut self, id: Uuid) -> Self {
        self.system_id = id;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Replace the metadata mapping.
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Add a single metadata entry, keeping the others.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Event {
        Event {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            system_id: self.system_id,
            acted_upon: self.acted_upon,
            category: self.category,
            action: self.action,
            severity: self.severity,
            description: self.description,
            metadata: self.metadata,
            created_at: Utc::now(),
        }
    }
}
