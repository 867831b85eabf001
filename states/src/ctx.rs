use std::any::{TypeId, type_name};
use std::collections::{BTreeMap, HashMap};

use tokio_util::sync::CancellationToken;

use crate::command::{Command, LatestOnlyUpdater};
use crate::compute::{Compute, Dep, Updater};
use crate::error::Error;
use crate::runtime::{Runtime, Update};
use crate::snapshot::CommandSnapshot;
use crate::state::State;

/// Where a compute sits in the sync cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncStatus {
    /// Registered but never run.
    #[default]
    Init,
    /// Ran; waiting for its published value to be applied.
    Pending,
    /// A dependency changed since the last run.
    Dirty,
    /// Up to date.
    Clean,
}

pub(crate) struct ComputeSlot {
    pub value: Box<dyn Compute>,
    pub status: SyncStatus,
}

/// The single-threaded state world.
///
/// All reads and writes happen on the UI thread. Background command tasks
/// only ever see snapshots and talk back through the runtime channel, so no
/// locking is involved anywhere.
///
/// The per-frame cycle, driven by the app shell:
/// 1. [`sync_computes`](Self::sync_computes): apply results that arrived
///    since last frame (stale command results are dropped here),
/// 2. render, which may mutate states and enqueue commands,
/// 3. [`flush_commands`](Self::flush_commands) +
///    [`run_computed`](Self::run_computed): start async work and re-run
///    dirty derived computes.
#[derive(Default)]
pub struct StateCtx {
    states: BTreeMap<TypeId, Box<dyn State>>,
    computes: BTreeMap<TypeId, ComputeSlot>,
    runtime: Runtime,
    queued: Vec<(TypeId, Box<dyn Command>)>,
    /// Issue counter shared by every command type, so generations from
    /// different commands are comparable.
    next_generation: u64,
    /// Newest generation issued per command type.
    issued: HashMap<TypeId, u64>,
    /// Newest generation applied per target compute.
    newest_applied: HashMap<TypeId, u64>,
    /// Cancellation token of the newest in-flight task per command type.
    inflight: HashMap<TypeId, CancellationToken>,
}

impl StateCtx {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a plain state. Re-registering replaces the value.
    pub fn add_state<T: State>(&mut self, state: T) {
        self.states.insert(TypeId::of::<T>(), Box::new(state));
    }

    /// Registers a compute cache. It starts [`SyncStatus::Init`] and runs on
    /// the first `run_computed` pass.
    pub fn record_compute<T: Compute>(&mut self, compute: T) {
        self.computes.insert(
            TypeId::of::<T>(),
            ComputeSlot {
                value: Box::new(compute),
                status: SyncStatus::Init,
            },
        );
    }

    /// Reads a state.
    ///
    /// # Panics
    /// Panics when `T` was never registered.
    pub fn state<T: State>(&self) -> &T {
        self.try_state::<T>()
            .unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_state<T: State>(&self) -> Result<&T, Error> {
        self.states
            .get(&TypeId::of::<T>())
            .and_then(|slot| slot.as_any().downcast_ref::<T>())
            .ok_or(Error::StateNotFound {
                id: TypeId::of::<T>(),
                context: type_name::<T>(),
            })
    }

    /// Mutable access to a state, for synchronous UI writes (form fields,
    /// route changes, view preferences).
    ///
    /// # Panics
    /// Panics when `T` was never registered.
    pub fn state_mut<T: State>(&mut self) -> &mut T {
        self.states
            .get_mut(&TypeId::of::<T>())
            .and_then(|slot| slot.as_any_mut().downcast_mut::<T>())
            .unwrap_or_else(|| panic!("state {} is not registered", type_name::<T>()))
    }

    /// Reads a compute cache, `None` when not registered.
    pub fn cached<T: Compute>(&self) -> Option<&T> {
        self.computes
            .get(&TypeId::of::<T>())
            .and_then(|slot| slot.value.as_any().downcast_ref::<T>())
    }

    /// Like [`cached`](Self::cached) but with an error naming the missing
    /// type, for callers that treat an unregistered compute as a wiring bug.
    pub fn try_compute<T: Compute>(&self) -> Result<&T, Error> {
        self.cached::<T>().ok_or(Error::ComputeNotFound {
            id: TypeId::of::<T>(),
            context: type_name::<T>(),
        })
    }

    /// Marks a compute dirty so the next `run_computed` pass re-runs it.
    pub fn mark_dirty<T: Compute>(&mut self) {
        if let Some(slot) = self.computes.get_mut(&TypeId::of::<T>()) {
            slot.status = SyncStatus::Dirty;
        }
    }

    /// Marks every compute that lists the state `T` as a dependency dirty.
    /// Call after mutating `T` through [`state_mut`](Self::state_mut).
    pub fn touch<T: State>(&mut self) {
        self.mark_dependents_dirty(TypeId::of::<T>());
    }

    /// Queues a command for the next [`flush_commands`](Self::flush_commands).
    pub fn enqueue_command<C: Command + Default>(&mut self) {
        self.queued.push((TypeId::of::<C>(), Box::new(C::default())));
    }

    /// Starts every queued command on a background task.
    ///
    /// Each start takes the next issue generation and cancels the previous
    /// in-flight task of the same type, so at most one request per command
    /// type can still land.
    pub fn flush_commands(&mut self) {
        let queued = std::mem::take(&mut self.queued);
        for (id, cmd) in queued {
            self.next_generation += 1;
            let generation = self.next_generation;
            self.issued.insert(id, generation);
            if let Some(previous) = self.inflight.remove(&id) {
                previous.cancel();
            }
            let token = CancellationToken::new();
            self.inflight.insert(id, token.clone());

            let snap = self.snapshot();
            let updater = LatestOnlyUpdater::new(id, generation, self.runtime.sender());
            self.runtime.spawn(cmd.run(snap, updater, token));
        }
    }

    /// Applies results that background tasks and compute bodies published
    /// since the last call. Stale command results are dropped, never
    /// applied: both results superseded by a re-issue of the same command
    /// type and results outrun by a later-issued command that already wrote
    /// the same cache.
    pub fn sync_computes(&mut self) {
        let updates: Vec<Update> = self.runtime.receiver().try_iter().collect();
        let mut changed: Vec<TypeId> = Vec::new();

        for update in updates {
            if let Some(origin) = update.origin {
                let newest = self.issued.get(&origin).copied().unwrap_or(0);
                if update.generation < newest {
                    log::debug!(
                        "dropping stale update (generation {} < {newest})",
                        update.generation
                    );
                    continue;
                }
                let applied = self
                    .newest_applied
                    .get(&update.target)
                    .copied()
                    .unwrap_or(0);
                if update.generation < applied {
                    log::debug!(
                        "dropping update outrun by a later command (generation {} < {applied})",
                        update.generation
                    );
                    continue;
                }
                self.newest_applied.insert(update.target, update.generation);
            }
            match self.computes.get_mut(&update.target) {
                Some(slot) => {
                    slot.value.assign_box(update.value);
                    slot.status = SyncStatus::Clean;
                    changed.push(update.target);
                }
                None => log::error!("update for unregistered compute {:?}", update.target),
            }
        }

        for target in changed {
            self.mark_dependents_dirty(target);
        }
    }

    /// Runs every compute that is `Init` or `Dirty`. Published values are
    /// applied on the next [`sync_computes`](Self::sync_computes) pass.
    pub fn run_computed(&mut self) {
        let due: Vec<TypeId> = self
            .computes
            .iter()
            .filter(|(_, slot)| {
                matches!(slot.status, SyncStatus::Init | SyncStatus::Dirty)
            })
            .map(|(id, _)| *id)
            .collect();

        for id in &due {
            if let Some(slot) = self.computes.get(id) {
                let updater = Updater::new(self.runtime.sender());
                slot.value.compute(Dep::new(&self.states, &self.computes), updater);
            }
        }
        for id in &due {
            if let Some(slot) = self.computes.get_mut(id) {
                slot.status = SyncStatus::Pending;
            }
        }
    }

    fn mark_dependents_dirty(&mut self, changed: TypeId) {
        let dependents: Vec<TypeId> = self
            .computes
            .iter()
            .filter(|(id, slot)| {
                let (state_deps, compute_deps) = slot.value.deps();
                **id != changed
                    && (state_deps.contains(&changed) || compute_deps.contains(&changed))
            })
            .map(|(id, _)| *id)
            .collect();
        for id in dependents {
            if let Some(slot) = self.computes.get_mut(&id) {
                slot.status = SyncStatus::Dirty;
            }
        }
    }

    fn snapshot(&self) -> CommandSnapshot {
        let mut snap = CommandSnapshot::default();
        for (id, slot) in &self.states {
            if let Some(cloned) = slot.clone_boxed() {
                snap.insert_state(*id, cloned);
            }
        }
        for (id, slot) in &self.computes {
            if let Some(cloned) = slot.value.clone_boxed() {
                snap.insert_compute(*id, cloned);
            }
        }
        snap
    }
}

impl std::fmt::Debug for StateCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateCtx")
            .field("states", &self.states.len())
            .field("computes", &self.computes.len())
            .field("queued", &self.queued.len())
            .finish()
    }
}
