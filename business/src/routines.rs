//! Routines (calendar notes): month-scoped listing, creation and completion
//! toggling. These feed the calendar page's day-grouped month view.

use std::any::Any;

use chrono::NaiveDate;
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

/// A routine or note pinned to a calendar day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Routine {
    pub id: Ustr,
    pub title: Ustr,
    #[serde(default)]
    pub note: Option<Ustr>,
    /// `YYYY-MM-DD`.
    pub date: Ustr,
    pub done: bool,
}

impl Routine {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.as_str(), "%Y-%m-%d").ok()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ListRoutinesResponse {
    items: Vec<Routine>,
}

/// Month/year scope for the routines listing.
#[derive(Debug, Clone)]
pub struct RoutinesQuery {
    pub month: u32,
    pub year: i32,
}

impl Default for RoutinesQuery {
    fn default() -> Self {
        use chrono::Datelike;
        let today = chrono::Local::now().date_naive();
        Self {
            month: today.month(),
            year: today.year(),
        }
    }
}

impl SnapshotClone for RoutinesQuery {
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }
}

impl State for RoutinesQuery {
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

/// Status of the routines listing.
#[derive(Debug, Clone, Default)]
pub enum RoutinesStatus {
    #[default]
    Idle,
    Loading,
    Success(Vec<Routine>),
    Error(String),
}

/// Compute cache for the routines listing.
#[derive(Default, Debug, Clone)]
pub struct RoutinesCompute {
    pub status: RoutinesStatus,
}

impl RoutinesCompute {
    pub fn routines(&self) -> &[Routine] {
        match &self.status {
            RoutinesStatus::Success(items) => items,
            _ => &[],
        }
    }
}

impl SnapshotClone for RoutinesCompute {
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }
}

impl Compute for RoutinesCompute {
    fn deps(&self) -> ComputeDeps {
        (&[], &[])
    }

    fn compute(&self, _deps: Dep<'_>, _updater: Updater) {
        // Updated by ListRoutinesCommand.
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}

/// Command listing routines for the query month.
#[derive(Default, Debug)]
pub struct ListRoutinesCommand;

impl Command for ListRoutinesCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: CancellationToken,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>> {
        let query: RoutinesQuery = snap.state::<RoutinesQuery>().clone();
        let config: AppConfig = snap.state::<AppConfig>().clone();
        let auth: AuthCompute = snap.compute::<AuthCompute>().clone();

        Box::pin(async move {
            let Some(token) = auth.token().map(str::to_owned) else {
                updater.set(RoutinesCompute {
                    status: RoutinesStatus::Error("Not authenticated".to_owned()),
                });
                return;
            };

            updater.set(RoutinesCompute {
                status: RoutinesStatus::Loading,
            });

            let url = format!(
                "{}/v1/routines?month={}&year={}",
                config.api_url(),
                query.month,
                query.year
            );

            match Client::get(&url).bearer(&token).send().await {
                Ok(response) if response.is_success() => {
                    match response.json::<ListRoutinesResponse>() {
                        Ok(resp) => {
                            updater.set(RoutinesCompute {
                                status: RoutinesStatus::Success(resp.items),
                            });
                        }
                        Err(e) => {
                            updater.set(RoutinesCompute {
                                status: RoutinesStatus::Error(format!(
                                    "Failed to parse response: {e}"
                                )),
                            });
                        }
                    }
                }
                Ok(response) => {
                    let error = response.text().unwrap_or_else(|_| "Unknown error".to_owned());
                    updater.set(RoutinesCompute {
                        status: RoutinesStatus::Error(error),
                    });
                }
                Err(e) => {
                    error!("list routines failed: {e}");
                    updater.set(RoutinesCompute {
                        status: RoutinesStatus::Error(e.to_string()),
                    });
                }
            }
        })
    }
}

/// Editable form state for a new routine.
#[derive(Default, Debug, Clone)]
pub struct RoutineDraft {
    pub title: String,
    pub note: String,
    /// `YYYY-MM-DD`.
    pub date: String,
}

/// Wire payload for routine creation.
#[derive(Debug, Clone, Serialize)]
pub struct RoutinePayload {
    pub title: String,
    pub note: Option<String>,
    pub date: String,
}

impl RoutineDraft {
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date: date.format("%Y-%m-%d").to_string(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<RoutinePayload, String> {
        if self.title.trim().is_empty() {
            return Err("Title is required".to_owned());
        }
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| "Date must be YYYY-MM-DD".to_owned())?;
        Ok(RoutinePayload {
            title: self.title.trim().to_owned(),
            note: if self.note.trim().is_empty() {
                None
            } else {
                Some(self.note.trim().to_owned())
            },
            date: self.date.trim().to_owned(),
        })
    }
}

impl SnapshotClone for RoutineDraft {
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }
}

impl State for RoutineDraft {
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

/// Status of the latest routine mutation.
#[derive(Debug, Clone, Default)]
pub enum RoutineMutationStatus {
    #[default]
    Idle,
    Busy,
    Done,
    Error(String),
}

/// Compute cache tracking routine mutations; the calendar page re-lists
/// when this reaches `Done`.
#[derive(Default, Debug, Clone)]
pub struct RoutineMutationCompute {
    pub status: RoutineMutationStatus,
}

impl SnapshotClone for RoutineMutationCompute {
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }
}

impl Compute for RoutineMutationCompute {
    fn deps(&self) -> ComputeDeps {
        (&[], &[])
    }

    fn compute(&self, _deps: Dep<'_>, _updater: Updater) {
        // Updated by the mutation commands.
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}

/// Command creating the drafted routine.
#[derive(Default, Debug)]
pub struct SaveRoutineCommand;

impl Command for SaveRoutineCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: CancellationToken,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>> {
        let draft: RoutineDraft = snap.state::<RoutineDraft>().clone();
        let config: AppConfig = snap.state::<AppConfig>().clone();
        let auth: AuthCompute = snap.compute::<AuthCompute>().clone();

        Box::pin(async move {
            let Some(token) = auth.token().map(str::to_owned) else {
                updater.set(RoutineMutationCompute {
                    status: RoutineMutationStatus::Error("Not authenticated".to_owned()),
                });
                return;
            };

            let payload = match draft.validate() {
                Ok(payload) => payload,
                Err(message) => {
                    updater.set(RoutineMutationCompute {
                        status: RoutineMutationStatus::Error(message),
                    });
                    return;
                }
            };

            updater.set(RoutineMutationCompute {
                status: RoutineMutationStatus::Busy,
            });

            let url = format!("{}/v1/routines", config.api_url());
            let request = match Client::post(&url).bearer(&token).json(&payload) {
                Ok(r) => r,
                Err(e) => {
                    updater.set(RoutineMutationCompute {
                        status: RoutineMutationStatus::Error(format!(
                            "Failed to build request: {e}"
                        )),
                    });
                    return;
                }
            };

            match request.send().await {
                Ok(response) if response.is_success() => {
                    updater.set(RoutineMutationCompute {
                        status: RoutineMutationStatus::Done,
                    });
                }
                Ok(response) => {
                    let error = response.text().unwrap_or_else(|_| "Unknown error".to_owned());
                    updater.set(RoutineMutationCompute {
                        status: RoutineMutationStatus::Error(error),
                    });
                }
                Err(e) => {
                    error!("save routine failed: {e}");
                    updater.set(RoutineMutationCompute {
                        status: RoutineMutationStatus::Error(e.to_string()),
                    });
                }
            }
        })
    }
}

/// Target of a done/undone toggle.
#[derive(Default, Debug, Clone)]
pub struct ToggleRoutineInput {
    pub id: Ustr,
}

impl SnapshotClone for ToggleRoutineInput {
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }
}

impl State for ToggleRoutineInput {
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

/// Command flipping a routine between done and not done.
#[derive(Default, Debug)]
pub struct ToggleRoutineCommand;

impl Command for ToggleRoutineCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: CancellationToken,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>> {
        let input: ToggleRoutineInput = snap.state::<ToggleRoutineInput>().clone();
        let config: AppConfig = snap.state::<AppConfig>().clone();
        let auth: AuthCompute = snap.compute::<AuthCompute>().clone();

        Box::pin(async move {
            let Some(token) = auth.token().map(str::to_owned) else {
                updater.set(RoutineMutationCompute {
                    status: RoutineMutationStatus::Error("Not authenticated".to_owned()),
                });
                return;
            };
            if input.id.is_empty() {
                updater.set(RoutineMutationCompute {
                    status: RoutineMutationStatus::Error("Routine id is required".to_owned()),
                });
                return;
            }

            updater.set(RoutineMutationCompute {
                status: RoutineMutationStatus::Busy,
            });

            let url = format!("{}/v1/routines/{}/done", config.api_url(), input.id);
            match Client::put(&url).bearer(&token).send().await {
                Ok(response) if response.is_success() => {
                    updater.set(RoutineMutationCompute {
                        status: RoutineMutationStatus::Done,
                    });
                }
                Ok(response) => {
                    let error = response.text().unwrap_or_else(|_| "Unknown error".to_owned());
                    updater.set(RoutineMutationCompute {
                        status: RoutineMutationStatus::Error(error),
                    });
                }
                Err(e) => {
                    error!("toggle routine failed: {e}");
                    updater.set(RoutineMutationCompute {
                        status: RoutineMutationStatus::Error(e.to_string()),
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
    fn draft_requires_title_and_valid_date() {
        let mut draft = RoutineDraft {
            title: "Water plants".to_owned(),
            note: String::new(),
            date: "2025-10-03".to_owned(),
        };
        assert!(draft.validate().is_ok());

        draft.title = "  ".to_owned();
        assert_eq!(draft.validate().unwrap_err(), "Title is required");

        draft.title = "Water plants".to_owned();
        draft.date = "03-10-2025".to_owned();
        assert_eq!(draft.validate().unwrap_err(), "Date must be YYYY-MM-DD");
    }

    #[test]
    fn routine_date_parsing_tolerates_garbage() {
        let routine = Routine {
            id: Ustr::from("r1"),
            title: Ustr::from("t"),
            note: None,
            date: Ustr::from("not a date"),
            done: false,
        };
        assert!(routine.parsed_date().is_none());
    }
}
