//! Integration plugins built on the engine.
//!
//! A plugin is a state table plus a few [`Action`](crate::action::Action)
//! implementations. All plugins here share the lifecycle shape produced by
//! [`lifecycle_table`].

pub mod connect;
pub mod grafana;
pub mod prometheus;

use crate::core::{EventType, State, StateTable, StateType};

/// Standard integration lifecycle.
///
/// ```text
/// Initial    --discovery--> Discovered
/// Initial    --register---> Registered
/// Initial    --connect----> Connected
/// Discovered --register---> Registered
/// Discovered --ignore-----> Ignored
/// Registered --connect----> Connected
/// Registered --ignore-----> Ignored
/// Connected  --disconnect-> Disconnected
/// ```
///
/// Disconnected and Ignored have no edges. `registered` and `connected`
/// carry the plugin's actions for those states.
pub fn lifecycle_table<Ctx, P>(
    registered: State<Ctx, P>,
    connected: State<Ctx, P>,
) -> StateTable<Ctx, P> {
    StateTable::new()
        .with_state(
            StateType::Initial,
            State::new()
                .register_event(EventType::Discovery, StateType::Discovered)
                .register_event(EventType::Register, StateType::Registered)
                .register_event(EventType::Connect, StateType::Connected),
        )
        .with_state(
            StateType::Discovered,
            State::new()
                .register_event(EventType::Register, StateType::Registered)
                .register_event(EventType::Ignore, StateType::Ignored),
        )
        .with_state(
            StateType::Registered,
            registered
                .register_event(EventType::Connect, StateType::Connected)
                .register_event(EventType::Ignore, StateType::Ignored),
        )
        .with_state(
            StateType::Connected,
            connected.register_event(EventType::Disconnect, StateType::Disconnected),
        )
        .with_state(StateType::Disconnected, State::new())
        .with_state(StateType::Ignored, State::new())
}
