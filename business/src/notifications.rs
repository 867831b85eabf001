//! In-app notifications: unread listing and mark-as-read.

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

/// A single notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Ustr,
    pub message: String,
    /// RFC 3339 creation timestamp.
    pub created_at: Ustr,
    pub read: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct ListNotificationsResponse {
    items: Vec<Notification>,
}

/// Status of the notifications listing.
#[derive(Debug, Clone, Default)]
pub enum NotificationsStatus {
    #[default]
    Idle,
    Loading,
    Success(Vec<Notification>),
    Error(String),
}

/// Compute cache for notifications.
#[derive(Default, Debug, Clone)]
pub struct NotificationsCompute {
    pub status: NotificationsStatus,
}

impl NotificationsCompute {
    pub fn notifications(&self) -> &[Notification] {
        match &self.status {
            NotificationsStatus::Success(items) => items,
            _ => &[],
        }
    }

    pub fn unread_count(&self) -> usize {
        self.notifications().iter().filter(|n| !n.read).count()
    }
}

impl SnapshotClone for NotificationsCompute {
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }
}

impl Compute for NotificationsCompute {
    fn deps(&self) -> ComputeDeps {
        (&[], &[])
    }

    fn compute(&self, _deps: Dep<'_>, _updater: Updater) {
        // Updated by the notification commands.
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}

/// Command listing notifications for the signed-in user.
#[derive(Default, Debug)]
pub struct ListNotificationsCommand;

impl Command for ListNotificationsCommand {
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
                updater.set(NotificationsCompute {
                    status: NotificationsStatus::Error("Not authenticated".to_owned()),
                });
                return;
            };

            updater.set(NotificationsCompute {
                status: NotificationsStatus::Loading,
            });

            let url = format!("{}/v1/notifications", config.api_url());
            match Client::get(&url).bearer(&token).send().await {
                Ok(response) if response.is_success() => {
                    match response.json::<ListNotificationsResponse>() {
                        Ok(resp) => {
                            updater.set(NotificationsCompute {
                                status: NotificationsStatus::Success(resp.items),
                            });
                        }
                        Err(e) => {
                            updater.set(NotificationsCompute {
                                status: NotificationsStatus::Error(format!(
                                    "Failed to parse response: {e}"
                                )),
                            });
                        }
                    }
                }
                Ok(response) => {
                    let error = response.text().unwrap_or_else(|_| "Unknown error".to_owned());
                    updater.set(NotificationsCompute {
                        status: NotificationsStatus::Error(error),
                    });
                }
                Err(e) => {
                    error!("list notifications failed: {e}");
                    updater.set(NotificationsCompute {
                        status: NotificationsStatus::Error(e.to_string()),
                    });
                }
            }
        })
    }
}

/// Notification targeted by the next mark-as-read command.
#[derive(Default, Debug, Clone)]
pub struct MarkReadInput {
    pub id: Ustr,
}

impl SnapshotClone for MarkReadInput {
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }
}

impl State for MarkReadInput {
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

/// Command marking one notification as read, then re-listing.
#[derive(Default, Debug)]
pub struct MarkNotificationReadCommand;

impl Command for MarkNotificationReadCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: CancellationToken,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>> {
        let input: MarkReadInput = snap.state::<MarkReadInput>().clone();
        let config: AppConfig = snap.state::<AppConfig>().clone();
        let auth: AuthCompute = snap.compute::<AuthCompute>().clone();
        let current: NotificationsCompute = snap.compute::<NotificationsCompute>().clone();

        Box::pin(async move {
            let Some(token) = auth.token().map(str::to_owned) else {
                updater.set(NotificationsCompute {
                    status: NotificationsStatus::Error("Not authenticated".to_owned()),
                });
                return;
            };
            if input.id.is_empty() {
                return;
            }

            let url = format!("{}/v1/notifications/{}/read", config.api_url(), input.id);
            match Client::put(&url).bearer(&token).send().await {
                Ok(response) if response.is_success() => {
                    // Flip the local copy instead of waiting on a round trip.
                    let mut items = current.notifications().to_vec();
                    for item in &mut items {
                        if item.id == input.id {
                            item.read = true;
                        }
                    }
                    updater.set(NotificationsCompute {
                        status: NotificationsStatus::Success(items),
                    });
                }
                Ok(response) => {
                    let error = response.text().unwrap_or_else(|_| "Unknown error".to_owned());
                    updater.set(NotificationsCompute {
                        status: NotificationsStatus::Error(error),
                    });
                }
                Err(e) => {
                    error!("mark notification read failed: {e}");
                    updater.set(NotificationsCompute {
                        status: NotificationsStatus::Error(e.to_string()),
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
    fn unread_count_ignores_read_notifications() {
        let compute = NotificationsCompute {
            status: NotificationsStatus::Success(vec![
                Notification {
                    id: Ustr::from("n1"),
                    message: "a".to_owned(),
                    created_at: Ustr::from("2025-10-01T00:00:00Z"),
                    read: true,
                },
                Notification {
                    id: Ustr::from("n2"),
                    message: "b".to_owned(),
                    created_at: Ustr::from("2025-10-02T00:00:00Z"),
                    read: false,
                },
            ]),
        };
        assert_eq!(compute.unread_count(), 1);
    }

    #[test]
    fn empty_states_have_no_unread() {
        assert_eq!(NotificationsCompute::default().unread_count(), 0);
    }
}
