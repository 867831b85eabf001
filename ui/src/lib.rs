//! SyncTime UI: the eframe application shell, pages and widgets, including
//! the generic data table component.

pub mod app;
pub mod pages;
pub mod state;
pub mod widgets;

pub use app::SyncTimeApp;
