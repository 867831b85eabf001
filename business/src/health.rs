//! Backend health probe shown in the top bar.

use std::any::Any;

use log::warn;
use synctime_states::{
    Command, CommandSnapshot, Compute, ComputeDeps, Dep, LatestOnlyUpdater, SnapshotClone,
    Updater, assign_impl,
};
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::http::Client;

/// Observed health of the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiHealth {
    #[default]
    Unknown,
    Checking,
    Up,
    Down,
}

/// Compute cache for the health probe.
#[derive(Default, Debug, Clone)]
pub struct HealthCompute {
    pub health: ApiHealth,
}

impl SnapshotClone for HealthCompute {
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }
}

impl Compute for HealthCompute {
    fn deps(&self) -> ComputeDeps {
        (&[], &[])
    }

    fn compute(&self, _deps: Dep<'_>, _updater: Updater) {
        // Updated by CheckHealthCommand.
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}

/// Command pinging the unauthenticated health endpoint.
#[derive(Default, Debug)]
pub struct CheckHealthCommand;

impl Command for CheckHealthCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: CancellationToken,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>> {
        let config: AppConfig = snap.state::<AppConfig>().clone();

        Box::pin(async move {
            updater.set(HealthCompute {
                health: ApiHealth::Checking,
            });

            let url = format!("{}/v1/health", config.api_url());
            match Client::get(&url).send().await {
                Ok(response) if response.is_success() => {
                    updater.set(HealthCompute {
                        health: ApiHealth::Up,
                    });
                }
                Ok(response) => {
                    warn!("health check returned {}", response.status);
                    updater.set(HealthCompute {
                        health: ApiHealth::Down,
                    });
                }
                Err(e) => {
                    warn!("health check failed: {e}");
                    updater.set(HealthCompute {
                        health: ApiHealth::Down,
                    });
                }
            }
        })
    }
}
