use std::any::{Any, TypeId};

use crate::runtime::Update;
use crate::{SnapshotClone, State};

/// Dependency lists for a [`Compute`]: `(state type ids, compute type ids)`.
///
/// When any listed type changes, the compute is marked dirty and re-run on
/// the next [`StateCtx::run_computed`] pass.
///
/// [`StateCtx::run_computed`]: crate::StateCtx::run_computed
pub type ComputeDeps = (&'static [TypeId], &'static [TypeId]);

/// A derived/cached value held by the [`StateCtx`].
///
/// Two flavors exist in practice:
/// - *derived* computes with a real [`compute`](Compute::compute) body that
///   recalculates from dependencies,
/// - *command-backed* caches with a no-op body, filled asynchronously through
///   a [`LatestOnlyUpdater`](crate::LatestOnlyUpdater).
///
/// [`StateCtx`]: crate::StateCtx
pub trait Compute: Any + Send + SnapshotClone {
    /// Types this compute derives from. Empty for command-backed caches.
    fn deps(&self) -> ComputeDeps;

    /// Recalculates the cached value from `deps`, publishing the result
    /// through `updater`. The new value is applied on the next
    /// `sync_computes` pass, not in place.
    fn compute(&self, deps: Dep<'_>, updater: Updater);

    fn as_any(&self) -> &dyn Any;

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>);
}

/// Default `assign_box` body for [`Compute`] implementations.
pub fn assign_impl<T: Compute + Sized>(slot: &mut T, new_self: Box<dyn Any + Send>) {
    if let Ok(value) = new_self.downcast::<T>() {
        *slot = *value;
    } else {
        log::error!(
            "assign_box: dropped value of unexpected type for {}",
            std::any::type_name::<T>()
        );
    }
}

/// Read-only view of the state world handed to [`Compute::compute`].
pub struct Dep<'a> {
    states: &'a std::collections::BTreeMap<TypeId, Box<dyn State>>,
    computes: &'a std::collections::BTreeMap<TypeId, crate::ctx::ComputeSlot>,
}

impl<'a> Dep<'a> {
    pub(crate) fn new(
        states: &'a std::collections::BTreeMap<TypeId, Box<dyn State>>,
        computes: &'a std::collections::BTreeMap<TypeId, crate::ctx::ComputeSlot>,
    ) -> Self {
        Self { states, computes }
    }

    /// Reads a dependency state.
    ///
    /// # Panics
    /// Panics when `T` was never registered; that is a wiring bug caught by
    /// the first frame of any debug run.
    pub fn state<T: State>(&self) -> &'a T {
        self.states
            .get(&TypeId::of::<T>())
            .and_then(|slot| slot.as_any().downcast_ref::<T>())
            .unwrap_or_else(|| panic!("state {} is not registered", std::any::type_name::<T>()))
    }

    /// Reads a dependency compute.
    ///
    /// # Panics
    /// Panics when `T` was never registered.
    pub fn compute<T: Compute>(&self) -> &'a T {
        self.computes
            .get(&TypeId::of::<T>())
            .and_then(|slot| slot.value.as_any().downcast_ref::<T>())
            .unwrap_or_else(|| panic!("compute {} is not registered", std::any::type_name::<T>()))
    }
}

/// Synchronous updater handed to [`Compute::compute`].
///
/// Results are queued on the runtime channel and applied by the next
/// `sync_computes` pass; derived results are never considered stale.
#[derive(Clone)]
pub struct Updater {
    send: flume::Sender<Update>,
}

impl Updater {
    pub(crate) fn new(send: flume::Sender<Update>) -> Self {
        Self { send }
    }

    /// Publishes a new value for the compute `T`.
    pub fn set<T: Compute>(&self, value: T) {
        let _ = self.send.send(Update::derived(TypeId::of::<T>(), Box::new(value)));
    }
}
