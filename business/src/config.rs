use std::any::Any;

use synctime_states::{SnapshotClone, State, state_assign_impl};
use ustr::Ustr;

/// Application configuration shared with every command through snapshots.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
}

impl AppConfig {
    /// Configuration pointed at an explicit base URL, used by tests to talk
    /// to a mock server.
    pub fn new(base_url: String) -> Self {
        Self {
            api_base_url: base_url,
        }
    }

    /// Base URL of the REST API, including the `/api` prefix.
    pub fn api_url(&self) -> Ustr {
        if self.api_base_url.is_empty() {
            Ustr::from("/api")
        } else {
            Ustr::from(&format!("{}/api", self.api_base_url))
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: if cfg!(target_arch = "wasm32") {
                // Same-origin on web deployments.
                String::new()
            } else if cfg!(feature = "env_test") {
                "https://synctime-test.lqxclqxc.com".to_owned()
            } else if cfg!(feature = "env_nightly") {
                "https://synctime-nightly.lqxclqxc.com".to_owned()
            } else {
                "https://synctime.lqxclqxc.com".to_owned()
            },
        }
    }
}

impl SnapshotClone for AppConfig {
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }
}

impl State for AppConfig {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url_appends_api_prefix() {
        let config = AppConfig::new("http://127.0.0.1:9000".to_owned());
        assert_eq!(config.api_url(), Ustr::from("http://127.0.0.1:9000/api"));
    }

    #[test]
    fn empty_base_url_is_same_origin() {
        let config = AppConfig::new(String::new());
        assert_eq!(config.api_url(), Ustr::from("/api"));
    }
}
