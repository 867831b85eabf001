use std::any::{Any, TypeId};
use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use crate::Compute;
use crate::runtime::Update;
use crate::snapshot::CommandSnapshot;

/// An asynchronous unit of work, usually a single REST call.
///
/// Commands are enqueued on the [`StateCtx`](crate::StateCtx), capture a
/// [`CommandSnapshot`] of the state world at flush time, run on a background
/// task, and publish results through a [`LatestOnlyUpdater`]. Re-enqueueing
/// the same command type cancels the previous in-flight task and invalidates
/// its pending results.
pub trait Command: Any + Send {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        cancel: CancellationToken,
    ) -> Pin<Box<dyn Future<Output = ()> + Send>>;
}

/// Updater handed to a [`Command`], tagged with the command's issue
/// generation.
///
/// `sync_computes` drops any update whose generation is older than the
/// newest issued for the same command type, so a slow response from a
/// superseded request can never overwrite the result of a newer one.
#[derive(Clone)]
pub struct LatestOnlyUpdater {
    origin: TypeId,
    generation: u64,
    send: flume::Sender<Update>,
}

impl LatestOnlyUpdater {
    pub(crate) fn new(origin: TypeId, generation: u64, send: flume::Sender<Update>) -> Self {
        Self {
            origin,
            generation,
            send,
        }
    }

    /// Publishes a new value for the compute cache `T`.
    pub fn set<T: Compute>(&self, value: T) {
        let _ = self.send.send(Update::guarded(
            self.origin,
            self.generation,
            TypeId::of::<T>(),
            Box::new(value),
        ));
    }
}
