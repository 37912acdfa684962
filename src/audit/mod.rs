//! Structured audit reporting.
//!
//! Actions describe their outcome with an [`Event`] instead of writing to a
//! particular logging or alerting backend. Failures always come with an
//! [`Severity::Error`] event whose metadata carries the cause under
//! `"error"`; successes return no event or a low-severity one.

mod event;
mod sink;

pub use event::{Event, EventBuilder, Severity};
pub use sink::{EventSink, TracingSink};
