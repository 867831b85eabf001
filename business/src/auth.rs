//! Authentication state and login/logout flow.
//!
//! Tracks the login form input, the authentication status (including the
//! session token used by every other command), and the commands that talk to
//! the `/auth` endpoints.

use std::any::Any;

use log::{error, info};
use serde::{Deserialize, Serialize};
use synctime_states::{
    Command, CommandSnapshot, Compute, ComputeDeps, Dep, LatestOnlyUpdater, SnapshotClone, State,
    Updater, assign_impl, state_assign_impl,
};
use tokio_util::sync::CancellationToken;

use crate::AppConfig;
use crate::http::Client;

/// Request payload for login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response from the login endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Session token for authenticated API calls.
    pub token: String,
    /// Canonical username as stored on the backend.
    pub username: String,
}

/// Editable login form fields.
#[derive(Default, Debug, Clone)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

impl SnapshotClone for LoginInput {
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }
}

impl State for LoginInput {
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

/// Result of the authentication flow.
#[derive(Debug, Clone, Default)]
pub enum AuthStatus {
    #[default]
    NotAuthenticated,
    Authenticating,
    Authenticated {
        username: String,
        token: String,
    },
    Failed(String),
}

impl AuthStatus {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Authenticated { username, .. } => Some(username.as_str()),
            _ => None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Authenticated { token, .. } => Some(token.as_str()),
            _ => None,
        }
    }
}

/// Compute-shaped cache for authentication status.
///
/// Intentionally a `Compute` with a no-op body so it can be read through the
/// normal caching path and updated via `LatestOnlyUpdater` from commands.
#[derive(Default, Debug, Clone)]
pub struct AuthCompute {
    pub status: AuthStatus,
}

impl AuthCompute {
    pub fn is_authenticated(&self) -> bool {
        self.status.is_authenticated()
    }

    pub fn username(&self) -> Option<&str> {
        self.status.username()
    }

    pub fn token(&self) -> Option<&str> {
        self.status.token()
    }
}

impl SnapshotClone for AuthCompute {
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }
}

impl Compute for AuthCompute {
    fn deps(&self) -> ComputeDeps {
        (&[], &[])
    }

    fn compute(&self, _deps: Dep<'_>, _updater: Updater) {
        // Updated by LoginCommand / LogoutCommand.
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}

/// Command that exchanges the login form for a session token.
#[derive(Default, Debug)]
pub struct LoginCommand;

impl Command for LoginCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: CancellationToken,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>> {
        let input: LoginInput = snap.state::<LoginInput>().clone();
        let config: AppConfig = snap.state::<AppConfig>().clone();

        Box::pin(async move {
            if input.username.is_empty() || input.password.is_empty() {
                updater.set(AuthCompute {
                    status: AuthStatus::Failed("Username and password are required".to_owned()),
                });
                return;
            }

            updater.set(AuthCompute {
                status: AuthStatus::Authenticating,
            });

            let url = format!("{}/v1/auth/login", config.api_url());
            let request = match Client::post(&url).json(&LoginRequest {
                username: input.username.clone(),
                password: input.password,
            }) {
                Ok(r) => r,
                Err(e) => {
                    updater.set(AuthCompute {
                        status: AuthStatus::Failed(format!("Failed to build request: {e}")),
                    });
                    return;
                }
            };

            match request.send().await {
                Ok(response) if response.is_success() => match response.json::<LoginResponse>() {
                    Ok(login) => {
                        info!("signed in as {}", login.username);
                        updater.set(AuthCompute {
                            status: AuthStatus::Authenticated {
                                username: login.username,
                                token: login.token,
                            },
                        });
                    }
                    Err(e) => {
                        updater.set(AuthCompute {
                            status: AuthStatus::Failed(format!("Failed to parse response: {e}")),
                        });
                    }
                },
                Ok(response) if response.status == 401 => {
                    updater.set(AuthCompute {
                        status: AuthStatus::Failed("Invalid username or password".to_owned()),
                    });
                }
                Ok(response) => {
                    let error = response.text().unwrap_or_else(|_| "Unknown error".to_owned());
                    updater.set(AuthCompute {
                        status: AuthStatus::Failed(error),
                    });
                }
                Err(e) => {
                    error!("login request failed: {e}");
                    updater.set(AuthCompute {
                        status: AuthStatus::Failed(e.to_string()),
                    });
                }
            }
        })
    }
}

/// Command that ends the session.
///
/// The local session is dropped even when the backend call fails; the token
/// simply expires server-side in that case.
#[derive(Default, Debug)]
pub struct LogoutCommand;

impl Command for LogoutCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: CancellationToken,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>> {
        let config: AppConfig = snap.state::<AppConfig>().clone();
        let auth: AuthCompute = snap.compute::<AuthCompute>().clone();

        Box::pin(async move {
            if let Some(token) = auth.token() {
                let url = format!("{}/v1/auth/logout", config.api_url());
                if let Err(e) = Client::post(&url).bearer(token).send().await {
                    error!("logout request failed: {e}");
                }
            }
            updater.set(AuthCompute {
                status: AuthStatus::NotAuthenticated,
            });
        })
    }
}
