//! Client-side route, a plain state the page dispatcher switches on.

use std::any::Any;

use synctime_states::{SnapshotClone, State, state_assign_impl};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Login,
    Records,
    Calendar,
    Settings,
}

impl Route {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Login => "Sign in",
            Self::Records => "Records",
            Self::Calendar => "Calendar",
            Self::Settings => "Settings",
        }
    }

    /// Routes reachable from the navigation bar once signed in.
    pub fn navigable() -> &'static [Route] {
        &[Self::Records, Self::Calendar, Self::Settings]
    }
}

impl SnapshotClone for Route {
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(*self))
    }
}

impl State for Route {
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
    fn login_is_the_default_route() {
        assert_eq!(Route::default(), Route::Login);
    }

    #[test]
    fn navigation_excludes_login() {
        assert!(!Route::navigable().contains(&Route::Login));
    }
}
