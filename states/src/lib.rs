//! Minimal reactive state framework for the SyncTime UI.
//!
//! The model has three kinds of participants:
//! - [`State`]: plain values written synchronously on the UI thread,
//! - [`Compute`]: derived or command-backed caches read by widgets,
//! - [`Command`]: async work (REST calls) that captures a [`CommandSnapshot`]
//!   and publishes results through a [`LatestOnlyUpdater`].
//!
//! Everything is applied on the UI thread inside `sync_computes`, so widgets
//! never observe a half-updated world. Command results carry an issue
//! generation drawn from a single counter: when a command type is re-issued,
//! results from the superseded run are dropped even if they resolve later,
//! and a slow result is also dropped once a later-issued command of any type
//! has written the same cache. UI state is therefore last-*issued*-wins,
//! regardless of network reordering.

mod command;
mod compute;
mod ctx;
mod error;
mod runtime;
mod snapshot;
mod state;

pub use command::{Command, LatestOnlyUpdater};
pub use compute::{Compute, ComputeDeps, Dep, Updater, assign_impl};
pub use ctx::{StateCtx, SyncStatus};
pub use error::Error;
pub use snapshot::CommandSnapshot;
pub use state::{SnapshotClone, State, state_assign_impl};

#[cfg(test)]
mod ctx_tests {
    use super::*;
    use std::any::Any;
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    use tokio_util::sync::CancellationToken;

    #[derive(Debug, Clone, Default)]
    struct FetchInput {
        delay_ms: u64,
        value: i32,
    }

    impl SnapshotClone for FetchInput {
        fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
            Some(Box::new(self.clone()))
        }
    }

    impl State for FetchInput {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }

        fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
            state_assign_impl(self, new_self);
        }
    }

    #[derive(Debug, Clone, Default)]
    struct FetchCompute {
        value: Option<i32>,
    }

    impl SnapshotClone for FetchCompute {
        fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
            Some(Box::new(self.clone()))
        }
    }

    impl Compute for FetchCompute {
        fn deps(&self) -> ComputeDeps {
            (&[], &[])
        }

        fn compute(&self, _deps: Dep<'_>, _updater: Updater) {
            // Command-backed cache.
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
            assign_impl(self, new_self);
        }
    }

    #[derive(Debug, Default)]
    struct FetchCommand;

    impl Command for FetchCommand {
        fn run(
            &self,
            snap: CommandSnapshot,
            updater: LatestOnlyUpdater,
            _cancel: CancellationToken,
        ) -> Pin<Box<dyn Future<Output = ()> + Send>> {
            let input = snap.state::<FetchInput>().clone();
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(input.delay_ms)).await;
                updater.set(FetchCompute {
                    value: Some(input.value),
                });
            })
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn command_fills_compute_cache() {
        let mut ctx = StateCtx::new();
        ctx.add_state(FetchInput {
            delay_ms: 0,
            value: 11,
        });
        ctx.record_compute(FetchCompute::default());

        ctx.enqueue_command::<FetchCommand>();
        ctx.flush_commands();

        tokio::time::sleep(Duration::from_millis(50)).await;
        ctx.sync_computes();

        assert_eq!(ctx.cached::<FetchCompute>().and_then(|c| c.value), Some(11));
    }

    /// A slow superseded request must never overwrite the newer result,
    /// even though it resolves last.
    #[tokio::test(flavor = "multi_thread")]
    async fn stale_command_result_is_dropped() {
        let mut ctx = StateCtx::new();
        ctx.add_state(FetchInput {
            delay_ms: 150,
            value: 1,
        });
        ctx.record_compute(FetchCompute::default());

        ctx.enqueue_command::<FetchCommand>();
        ctx.flush_commands();

        // Re-issue with a fast request before the slow one lands.
        *ctx.state_mut::<FetchInput>() = FetchInput {
            delay_ms: 0,
            value: 2,
        };
        ctx.enqueue_command::<FetchCommand>();
        ctx.flush_commands();

        tokio::time::sleep(Duration::from_millis(300)).await;
        ctx.sync_computes();

        assert_eq!(ctx.cached::<FetchCompute>().and_then(|c| c.value), Some(2));
    }

    #[derive(Debug, Default)]
    struct ResetCommand;

    impl Command for ResetCommand {
        fn run(
            &self,
            _snap: CommandSnapshot,
            updater: LatestOnlyUpdater,
            _cancel: CancellationToken,
        ) -> Pin<Box<dyn Future<Output = ()> + Send>> {
            Box::pin(async move {
                updater.set(FetchCompute { value: Some(0) });
            })
        }
    }

    /// A slow result must not overwrite what a different, later-issued
    /// command already wrote to the same cache.
    #[tokio::test(flavor = "multi_thread")]
    async fn slow_result_cannot_overwrite_a_later_command_type() {
        let mut ctx = StateCtx::new();
        ctx.add_state(FetchInput {
            delay_ms: 150,
            value: 1,
        });
        ctx.record_compute(FetchCompute::default());

        ctx.enqueue_command::<FetchCommand>();
        ctx.flush_commands();
        ctx.enqueue_command::<ResetCommand>();
        ctx.flush_commands();

        // The reset lands first and must stick.
        tokio::time::sleep(Duration::from_millis(50)).await;
        ctx.sync_computes();
        tokio::time::sleep(Duration::from_millis(250)).await;
        ctx.sync_computes();

        assert_eq!(ctx.cached::<FetchCompute>().and_then(|c| c.value), Some(0));
    }

    #[test]
    fn missing_registrations_are_reported_by_type_name() {
        let ctx = StateCtx::new();
        let err = ctx.try_state::<FetchInput>().expect_err("unregistered");
        assert!(err.to_string().contains("FetchInput"));
        let err = ctx.try_compute::<FetchCompute>().expect_err("unregistered");
        assert!(err.to_string().contains("FetchCompute"));
    }

    #[derive(Debug, Clone, Default)]
    struct DoubledCompute {
        doubled: Option<i32>,
    }

    impl SnapshotClone for DoubledCompute {
        fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
            Some(Box::new(self.clone()))
        }
    }

    impl Compute for DoubledCompute {
        fn deps(&self) -> ComputeDeps {
            static COMPUTE_DEPS: [std::any::TypeId; 1] =
                [std::any::TypeId::of::<FetchCompute>()];
            (&[], &COMPUTE_DEPS)
        }

        fn compute(&self, deps: Dep<'_>, updater: Updater) {
            let fetched = deps.compute::<FetchCompute>();
            updater.set(DoubledCompute {
                doubled: fetched.value.map(|v| v * 2),
            });
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
            assign_impl(self, new_self);
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn derived_compute_reruns_when_dependency_changes() {
        let mut ctx = StateCtx::new();
        ctx.add_state(FetchInput {
            delay_ms: 0,
            value: 21,
        });
        ctx.record_compute(FetchCompute::default());
        ctx.record_compute(DoubledCompute::default());

        ctx.enqueue_command::<FetchCommand>();
        ctx.flush_commands();
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Frame 1: fetch result lands, marking the derived compute dirty.
        ctx.sync_computes();
        ctx.run_computed();
        // Frame 2: the derived result lands.
        ctx.sync_computes();

        assert_eq!(
            ctx.cached::<DoubledCompute>().and_then(|c| c.doubled),
            Some(42)
        );
    }
}
