//! System settings: currency, week start and notification toggle.

use std::any::Any;

use log::error;
use serde::{Deserialize, Serialize};
use synctime_states::{
    Command, CommandSnapshot, Compute, ComputeDeps, Dep, LatestOnlyUpdater, SnapshotClone, State,
    Updater, assign_impl, state_assign_impl,
};
use tokio_util::sync::CancellationToken;
use ustr::Ustr;

use crate::auth::AuthCompute;
use crate::config::AppConfig;
use crate::http::Client;

/// Server-side user settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSettings {
    /// ISO 4217 code, e.g. `USD`.
    pub currency: Ustr,
    /// `monday` or `sunday`.
    pub week_start: Ustr,
    pub notifications_enabled: bool,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            currency: Ustr::from("USD"),
            week_start: Ustr::from("monday"),
            notifications_enabled: true,
        }
    }
}

/// Editable settings form, decoupled from the loaded settings so edits can
/// be discarded.
#[derive(Default, Debug, Clone)]
pub struct SettingsDraft {
    pub currency: String,
    pub week_start_monday: bool,
    pub notifications_enabled: bool,
}

impl SettingsDraft {
    pub fn from_settings(settings: &SystemSettings) -> Self {
        Self {
            currency: settings.currency.to_string(),
            week_start_monday: settings.week_start.as_str() != "sunday",
            notifications_enabled: settings.notifications_enabled,
        }
    }

    pub fn to_settings(&self) -> SystemSettings {
        SystemSettings {
            currency: Ustr::from(self.currency.trim()),
            week_start: Ustr::from(if self.week_start_monday {
                "monday"
            } else {
                "sunday"
            }),
            notifications_enabled: self.notifications_enabled,
        }
    }
}

impl SnapshotClone for SettingsDraft {
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }
}

impl State for SettingsDraft {
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

/// Status of settings load/save.
#[derive(Debug, Clone, Default)]
pub enum SettingsStatus {
    #[default]
    Idle,
    Loading,
    Success(SystemSettings),
    Saved(SystemSettings),
    Error(String),
}

/// Compute cache for settings.
#[derive(Default, Debug, Clone)]
pub struct SettingsCompute {
    pub status: SettingsStatus,
}

impl SettingsCompute {
    pub fn settings(&self) -> Option<&SystemSettings> {
        match &self.status {
            SettingsStatus::Success(s) | SettingsStatus::Saved(s) => Some(s),
            _ => None,
        }
    }
}

impl SnapshotClone for SettingsCompute {
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }
}

impl Compute for SettingsCompute {
    fn deps(&self) -> ComputeDeps {
        (&[], &[])
    }

    fn compute(&self, _deps: Dep<'_>, _updater: Updater) {
        // Updated by the settings commands.
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}

/// Command loading the current settings.
#[derive(Default, Debug)]
pub struct LoadSettingsCommand;

impl Command for LoadSettingsCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: CancellationToken,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>> {
        let config: AppConfig = snap.state::<AppConfig>().clone();
        let auth: AuthCompute = snap.compute::<AuthCompute>().clone();

        Box::pin(async move {
            let Some(token) = auth.token().map(str::to_owned) else {
                updater.set(SettingsCompute {
                    status: SettingsStatus::Error("Not authenticated".to_owned()),
                });
                return;
            };

            updater.set(SettingsCompute {
                status: SettingsStatus::Loading,
            });

            let url = format!("{}/v1/settings", config.api_url());
            match Client::get(&url).bearer(&token).send().await {
                Ok(response) if response.is_success() => {
                    match response.json::<SystemSettings>() {
                        Ok(settings) => {
                            updater.set(SettingsCompute {
                                status: SettingsStatus::Success(settings),
                            });
                        }
                        Err(e) => {
                            updater.set(SettingsCompute {
                                status: SettingsStatus::Error(format!(
                                    "Failed to parse response: {e}"
                                )),
                            });
                        }
                    }
                }
                Ok(response) => {
                    let error = response.text().unwrap_or_else(|_| "Unknown error".to_owned());
                    updater.set(SettingsCompute {
                        status: SettingsStatus::Error(error),
                    });
                }
                Err(e) => {
                    error!("load settings failed: {e}");
                    updater.set(SettingsCompute {
                        status: SettingsStatus::Error(e.to_string()),
                    });
                }
            }
        })
    }
}

/// Command persisting the drafted settings.
#[derive(Default, Debug)]
pub struct UpdateSettingsCommand;

impl Command for UpdateSettingsCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: CancellationToken,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>> {
        let draft: SettingsDraft = snap.state::<SettingsDraft>().clone();
        let config: AppConfig = snap.state::<AppConfig>().clone();
        let auth: AuthCompute = snap.compute::<AuthCompute>().clone();

        Box::pin(async move {
            let Some(token) = auth.token().map(str::to_owned) else {
                updater.set(SettingsCompute {
                    status: SettingsStatus::Error("Not authenticated".to_owned()),
                });
                return;
            };

            let settings = draft.to_settings();
            if settings.currency.is_empty() {
                updater.set(SettingsCompute {
                    status: SettingsStatus::Error("Currency is required".to_owned()),
                });
                return;
            }

            updater.set(SettingsCompute {
                status: SettingsStatus::Loading,
            });

            let url = format!("{}/v1/settings", config.api_url());
            let request = match Client::put(&url).bearer(&token).json(&settings) {
                Ok(r) => r,
                Err(e) => {
                    updater.set(SettingsCompute {
                        status: SettingsStatus::Error(format!("Failed to build request: {e}")),
                    });
                    return;
                }
            };

            match request.send().await {
                Ok(response) if response.is_success() => {
                    updater.set(SettingsCompute {
                        status: SettingsStatus::Saved(settings),
                    });
                }
                Ok(response) => {
                    let error = response.text().unwrap_or_else(|_| "Unknown error".to_owned());
                    updater.set(SettingsCompute {
                        status: SettingsStatus::Error(error),
                    });
                }
                Err(e) => {
                    error!("update settings failed: {e}");
                    updater.set(SettingsCompute {
                        status: SettingsStatus::Error(e.to_string()),
                    });
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_round_trips_through_settings() {
        let settings = SystemSettings {
            currency: Ustr::from("EUR"),
            week_start: Ustr::from("sunday"),
            notifications_enabled: false,
        };
        let draft = SettingsDraft::from_settings(&settings);
        assert_eq!(draft.currency, "EUR");
        assert!(!draft.week_start_monday);

        let back = draft.to_settings();
        assert_eq!(back.currency, settings.currency);
        assert_eq!(back.week_start, settings.week_start);
        assert_eq!(back.notifications_enabled, false);
    }

    #[test]
    fn draft_trims_currency() {
        let draft = SettingsDraft {
            currency: " USD ".to_owned(),
            week_start_monday: true,
            notifications_enabled: true,
        };
        assert_eq!(draft.to_settings().currency.as_str(), "USD");
    }
}
