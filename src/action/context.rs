//! Per-call execution context handed to every action hook.

use crate::provider::Provider;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Ambient values for one `advance` call.
///
/// Carries the caller's identity and auth token, the persistence provider,
/// and an optional deadline. Every field may be absent; actions treat a
/// missing token as empty and a missing provider as a persistence failure.
#[derive(Clone, Default)]
pub struct ExecutionContext {
    user_id: Uuid,
    system_id: Uuid,
    token: Option<String>,
    provider: Option<Arc<dyn Provider>>,
    deadline: Option<DateTime<Utc>>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn with_system(mut self, system_id: Uuid) -> Self {
        self.system_id = system_id;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn system_id(&self) -> Uuid {
        self.system_id
    }

    /// The auth token, or `""` when none was supplied.
    pub fn token(&self) -> &str {
        self.token.as_deref().unwrap_or_default()
    }

    pub fn provider(&self) -> Option<&Arc<dyn Provider>> {
        self.provider.as_ref()
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// Whether the caller's deadline has passed.
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|deadline| Utc::now() >= deadline)
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("user_id", &self.user_id)
            .field("system_id", &self.system_id)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("provider", &self.provider.is_some())
            .field("deadline", &self.deadline)
            .finish()
    }
}
