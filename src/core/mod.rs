//! Building blocks of a lifecycle machine.
//!
//! - The closed [`EventType`] and [`StateType`] vocabularies
//! - [`State`] nodes and the [`StateTable`] that holds them
//! - The [`TransitionLog`] a machine keeps of applied transitions
//!
//! Nothing in this module performs I/O.

mod history;
pub(crate) mod macros;
mod state;
mod table;
mod vocabulary;

pub use history::{TransitionLog, TransitionRecord};
pub use state::State;
pub use table::{StateTable, TableViolation};
pub use vocabulary::{EventType, StateType};
