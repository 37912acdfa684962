//! Driving machines through their lifecycle.
//!
//! - [`StateMachine`]: per-instance runtime and the `advance` entry point
//! - [`DriverPolicy`]: how hook failures are handled
//! - [`MachineRegistry`]: per-identity serialization for live machines

mod driver;
mod policy;
mod registry;

pub use driver::StateMachine;
pub use policy::{ActionErrorPolicy, DriverPolicy};
pub use registry::{MachineRegistry, SharedMachine};
