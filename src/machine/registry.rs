//! In-memory ownership of live machines, one writer per machine at a time.

use crate::action::{ExecutionContext, Failure, Reply};
use crate::core::EventType;
use crate::error::MachineError;
use crate::machine::driver::StateMachine;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// A machine behind its own lock.
pub type SharedMachine<Ctx, P> = Arc<Mutex<StateMachine<Ctx, P>>>;

/// Live machines keyed by identifier.
///
/// Each machine has its own mutex, so deliveries for one identity are
/// serialized while different identities advance in parallel. Persisting
/// machines across restarts is left to the owner of the registry.
pub struct MachineRegistry<Ctx, P> {
    machines: RwLock<HashMap<Uuid, SharedMachine<Ctx, P>>>,
}

impl<Ctx, P> MachineRegistry<Ctx, P> {
    pub fn new() -> Self {
        Self {
            machines: RwLock::new(HashMap::new()),
        }
    }

    /// Register a machine under its own id, returning the one it replaced.
    pub fn insert(&self, machine: StateMachine<Ctx, P>) -> Option<SharedMachine<Ctx, P>> {
        let id = machine.id();
        debug!(%id, name = machine.name(), "registering machine");
        self.machines
            .write()
            .insert(id, Arc::new(Mutex::new(machine)))
    }

    pub fn get(&self, id: Uuid) -> Option<SharedMachine<Ctx, P>> {
        self.machines.read().get(&id).cloned()
    }

    pub fn remove(&self, id: Uuid) -> Option<SharedMachine<Ctx, P>> {
        debug!(%id, "removing machine");
        self.machines.write().remove(&id)
    }

    pub fn len(&self) -> usize {
        self.machines.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.read().is_empty()
    }

    /// Advance the machine `id`, holding its lock for the whole call.
    pub fn advance(
        &self,
        id: Uuid,
        exec: &ExecutionContext,
        event: EventType,
        payload: &P,
    ) -> Result<Reply, Failure> {
        let machine = self
            .get(id)
            .ok_or_else(|| Failure::bare(MachineError::MachineNotFound(id)))?;
        let mut machine = machine.lock();
        machine.advance(exec, event, payload)
    }
}

impl<Ctx, P> Default for MachineRegistry<Ctx, P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Action, HookResult};
    use crate::core::{State, StateTable, StateType};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    /// Fails if two executions ever overlap.
    struct Exclusive {
        active: Arc<AtomicUsize>,
        overlaps: Arc<AtomicUsize>,
    }

    impl Action<(), ()> for Exclusive {
        fn execute(&self, _: &ExecutionContext, _: &(), _: &()) -> HookResult {
            if self.active.fetch_add(1, Ordering::SeqCst) > 0 {
                self.overlaps.fetch_add(1, Ordering::SeqCst);
            }
            thread::sleep(std::time::Duration::from_millis(2));
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(Reply::noop())
        }
    }

    fn ping_pong(active: &Arc<AtomicUsize>, overlaps: &Arc<AtomicUsize>) -> StateTable<(), ()> {
        let exclusive = || Exclusive {
            active: Arc::clone(active),
            overlaps: Arc::clone(overlaps),
        };
        StateTable::new()
            .with_state(
                StateType::Initial,
                State::new()
                    .register_event(EventType::Connect, StateType::Connected)
                    .register_action(exclusive()),
            )
            .with_state(
                StateType::Connected,
                State::new()
                    .register_event(EventType::Disconnect, StateType::Initial)
                    .register_action(exclusive()),
            )
    }

    const ID: &str = "0b6c3f5e-2a41-4d8f-9e7a-1c2b3d4e5f60";

    #[test]
    fn unknown_id_is_reported() {
        let registry: MachineRegistry<(), ()> = MachineRegistry::new();
        let id = Uuid::new_v4();
        let failure = registry
            .advance(id, &ExecutionContext::new(), EventType::Connect, &())
            .unwrap_err();
        assert_eq!(failure.error, MachineError::MachineNotFound(id));
    }

    #[test]
    fn insert_get_remove() {
        let registry = MachineRegistry::new();
        let table = Arc::new(StateTable::<(), ()>::new());
        let machine = StateMachine::new("test", StateType::Initial, ID, table, ()).unwrap();
        let id = machine.id();

        assert!(registry.insert(machine).is_none());
        assert_eq!(registry.len(), 1);
        assert!(registry.get(id).is_some());
        assert!(registry.remove(id).is_some());
        assert!(registry.is_empty());
    }

    #[test]
    fn concurrent_deliveries_for_one_machine_are_serialized() {
        let active = Arc::new(AtomicUsize::new(0));
        let overlaps = Arc::new(AtomicUsize::new(0));
        let table = Arc::new(ping_pong(&active, &overlaps));
        let registry = Arc::new(MachineRegistry::new());
        let machine = StateMachine::new("test", StateType::Initial, ID, table, ()).unwrap();
        let id = machine.id();
        registry.insert(machine);

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    let exec = ExecutionContext::new();
                    for _ in 0..10 {
                        // Whichever event matches the current state succeeds.
                        let _ = registry.advance(id, &exec, EventType::Connect, &());
                        let _ = registry.advance(id, &exec, EventType::Disconnect, &());
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(overlaps.load(Ordering::SeqCst), 0);
        let machine = registry.get(id).unwrap();
        let history_len = machine.lock().history().len();
        assert!(history_len > 0);
    }
}
