use std::any::{Any, TypeId};
use std::future::Future;

use flume::{Receiver, Sender};

/// A pending value published by a compute body or a command task.
pub(crate) struct Update {
    /// Compute type the value is destined for.
    pub target: TypeId,
    /// Command type that produced the value, for generation checking.
    /// `None` for synchronously derived values, which are never stale.
    pub origin: Option<TypeId>,
    pub generation: u64,
    pub value: Box<dyn Any + Send>,
}

impl Update {
    pub(crate) fn derived(target: TypeId, value: Box<dyn Any + Send>) -> Self {
        Self {
            target,
            origin: None,
            generation: 0,
            value,
        }
    }

    pub(crate) fn guarded(
        origin: TypeId,
        generation: u64,
        target: TypeId,
        value: Box<dyn Any + Send>,
    ) -> Self {
        Self {
            target,
            origin: Some(origin),
            generation,
            value,
        }
    }
}

/// Channel plumbing between background tasks and the single-threaded
/// [`StateCtx`](crate::StateCtx).
///
/// On native targets commands run on a shared background tokio runtime (or
/// the ambient runtime inside `#[tokio::test]`); on wasm they run on the JS
/// microtask queue. Either way results come home through the flume channel.
pub(crate) struct Runtime {
    send: Sender<Update>,
    recv: Receiver<Update>,
}

impl Default for Runtime {
    fn default() -> Self {
        let (send, recv) = flume::unbounded();
        Self { send, recv }
    }
}

impl Runtime {
    pub(crate) fn sender(&self) -> Sender<Update> {
        self.send.clone()
    }

    pub(crate) fn receiver(&self) -> &Receiver<Update> {
        &self.recv
    }

    pub(crate) fn spawn(&self, fut: impl Future<Output = ()> + Send + 'static) {
        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(fut);
            } else {
                background_runtime().spawn(fut);
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            wasm_bindgen_futures::spawn_local(fut);
        }
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("pending", &self.recv.len())
            .finish()
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn background_runtime() -> &'static tokio::runtime::Runtime {
    use std::sync::OnceLock;
    static RUNTIME: OnceLock<tokio::runtime::Runtime> = OnceLock::new();
    RUNTIME.get_or_init(|| {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("failed to start background runtime")
    })
}
