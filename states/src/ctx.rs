use std::any::{Any, TypeId};
use std::collections::BTreeMap;

use crate::{
    Command, Compute, Dep, State, StateRuntime, StateSyncStatus, Updater, error::Error,
    graph::TopologyError, runtime::Update,
};

/// Owner of every registered state, compute and command.
///
/// Lives on the UI thread. A frame typically calls [`StateCtx::sync_computes`]
/// to apply results from background work, renders from [`StateCtx::state`] and
/// [`StateCtx::cached`], then calls [`StateCtx::run_computed`] to re-run what
/// the frame's edits made dirty.
#[derive(Default)]
pub struct StateCtx {
    runtime: StateRuntime,

    states: BTreeMap<TypeId, Box<dyn State>>,
    computes: BTreeMap<TypeId, Box<dyn Compute>>,
    commands: BTreeMap<TypeId, Box<dyn Command>>,
    status: BTreeMap<TypeId, StateSyncStatus>,
}

impl StateCtx {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn runtime(&self) -> &StateRuntime {
        &self.runtime
    }

    pub fn updater(&self) -> Updater {
        self.runtime.updater()
    }

    /// Registers (or replaces) a state. Computes reading it become dirty.
    pub fn add_state<T: State>(&mut self, state: T) {
        let id = TypeId::of::<T>();
        self.states.insert(id, Box::new(state));
        self.mark_dependents_dirty(id);
    }

    /// Registers (or replaces) a compute. It runs on the next [`Self::run_computed`].
    pub fn record_compute<T: Compute>(&mut self, compute: T) {
        let id = TypeId::of::<T>();
        if !self.computes.contains_key(&id) {
            self.runtime.record(id, &compute.deps());
        }
        self.computes.insert(id, Box::new(compute));
        self.status.insert(id, StateSyncStatus::BeforeInit);
        self.mark_dependents_dirty(id);
    }

    /// Registers (or replaces) a command instance for [`Self::dispatch`].
    pub fn record_command<T: Command>(&mut self, command: T) {
        self.commands.insert(TypeId::of::<T>(), Box::new(command));
    }

    pub fn state<T: State>(&self) -> Option<&T> {
        self.states
            .get(&TypeId::of::<T>())
            .and_then(|state| state.as_any().downcast_ref::<T>())
    }

    pub fn cached<T: Compute>(&self) -> Option<&T> {
        self.computes
            .get(&TypeId::of::<T>())
            .and_then(|compute| compute.as_any().downcast_ref::<T>())
    }

    pub fn status<T: Compute>(&self) -> Option<StateSyncStatus> {
        self.status.get(&TypeId::of::<T>()).copied()
    }

    /// Edits a state in place and marks its dependents dirty when `f` returns `true`.
    pub fn update<T: State>(&mut self, f: impl FnOnce(&mut T) -> bool) -> Result<bool, Error> {
        let id = TypeId::of::<T>();
        let state = self
            .states
            .get_mut(&id)
            .and_then(|state| state.as_any_mut().downcast_mut::<T>())
            .ok_or_else(Error::state_not_found::<T>)?;

        let changed = f(state);
        if changed {
            self.mark_dependents_dirty(id);
        }
        Ok(changed)
    }

    /// Runs the registered `T` against the current snapshot.
    pub fn dispatch<T: Command>(&self) -> Result<(), Error> {
        let command = self
            .commands
            .get(&TypeId::of::<T>())
            .ok_or_else(Error::command_not_found::<T>)?;

        command.run(Dep::new(&self.states, &self.computes), self.updater());
        Ok(())
    }

    /// Applies every pending update. Returns how many were applied.
    pub fn sync_computes(&mut self) -> usize {
        let pending: Vec<Update> = self.runtime.receiver().try_iter().collect();
        let applied = pending.len();
        for (id, value) in pending {
            self.apply(id, value);
        }
        applied
    }

    /// Waits for at least one update from background work, then applies
    /// everything pending.
    pub async fn wait_for_update(&mut self) -> usize {
        let first = self.runtime.receiver().recv_async().await;
        match first {
            Ok((id, value)) => {
                self.apply(id, value);
                1 + self.sync_computes()
            }
            // `self` owns a sender, so the channel never disconnects.
            Err(_) => 0,
        }
    }

    /// Re-runs every compute that is dirty or has never run, in dependency order.
    pub fn run_computed(&mut self) -> Result<usize, TopologyError<TypeId>> {
        let order = self.runtime.verify_deps()?;

        let mut due: Vec<TypeId> = order
            .iter()
            .filter(|id| self.needs_run(**id))
            .copied()
            .collect();
        // Computes without dependencies never appear in the graph.
        due.extend(
            self.computes
                .keys()
                .filter(|id| !order.contains(*id) && self.needs_run(**id))
                .copied(),
        );

        for id in &due {
            self.status.insert(*id, StateSyncStatus::Clean);
        }

        let updater = self.runtime.updater();
        for id in &due {
            if let Some(compute) = self.computes.get(id) {
                compute.compute(Dep::new(&self.states, &self.computes), updater.clone());
            }
        }

        Ok(due.len())
    }

    fn needs_run(&self, id: TypeId) -> bool {
        self.computes.contains_key(&id)
            && self
                .status
                .get(&id)
                .copied()
                .unwrap_or_default()
                .needs_run()
    }

    fn apply(&mut self, id: TypeId, value: Box<dyn Any + Send>) {
        if let Some(compute) = self.computes.get_mut(&id) {
            compute.assign_box(value);
        } else if let Some(state) = self.states.get_mut(&id) {
            state.assign_box(value);
        } else {
            log::warn!(
                target: "shareasqr::states",
                "update for unregistered type {id:?} dropped"
            );
            return;
        }
        self.mark_dependents_dirty(id);
    }

    fn mark_dependents_dirty(&mut self, id: TypeId) {
        for dependent in self.runtime.dependents(id) {
            if let Some(status) = self.status.get_mut(&dependent) {
                *status = StateSyncStatus::Dirty;
            }
        }
    }
}

impl std::fmt::Debug for StateCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateCtx")
            .field("states", &self.states.len())
            .field("computes", &self.computes.len())
            .field("commands", &self.commands.len())
            .field("runtime", &self.runtime)
            .finish()
    }
}
