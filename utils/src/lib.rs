//! Shared utilities for the SyncTime workspace.
//!
//! Build/version info for the top-bar label, and the calendar math used by
//! both the business layer (month-scoped queries) and the data table's
//! group-by engine.

pub mod dates;
pub mod version_info;
