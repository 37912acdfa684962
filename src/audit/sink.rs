//! Destinations for audit events.

use crate::audit::event::{Event, Severity};
use tracing::{error, info, warn};

/// Receives audit events produced by machines and their actions.
///
/// Delivery is up to the implementation: a log stream, a message bus, an
/// HTTP call. The engine only hands events over.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: &Event);
}

/// Sink that writes every event as a structured `tracing` record.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn publish(&self, event: &Event) {
        let cause = event.cause().unwrap_or_default();
        match event.severity {
            Severity::Error | Severity::Critical => error!(
                event_id = %event.id,
                acted_upon = %event.acted_upon,
                category = %event.category,
                action = %event.action,
                cause,
                "{}",
                event.description
            ),
            Severity::Warning => warn!(
                event_id = %event.id,
                acted_upon = %event.acted_upon,
                category = %event.category,
                action = %event.action,
                "{}",
                event.description
            ),
            Severity::Informational | Severity::Success => info!(
                event_id = %event.id,
                acted_upon = %event.acted_upon,
                category = %event.category,
                action = %event.action,
                "{}",
                event.description
            ),
        }
    }
}

impl<S: EventSink + ?Sized> EventSink for std::sync::Arc<S> {
    fn publish(&self, event: &Event) {
        (**self).publish(event)
    }
}
