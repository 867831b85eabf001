//! Generic, reorderable, groupable data table with persisted column
//! configuration.
//!
//! The table is caller-driven: it receives column definitions and opaque
//! rows, renders them according to its transient view state (sort,
//! selection, drag, expanded groups) and persisted column configuration,
//! and reports every interaction back as a [`TableEvent`]. It never calls
//! the backend and never raises a domain error; malformed rows degrade to
//! placeholder cells.

pub mod column;
pub mod config;
pub mod drag;
pub mod group;
pub mod selection;
pub mod sort;
pub mod table;

pub use column::{CellValue, ColumnDef, TableId, TableRow};
pub use config::{ColumnConfig, ColumnConfigStore, EguiConfigStore, MemoryConfigStore};
pub use drag::DragState;
pub use group::{Group, GroupBy, GroupContext};
pub use selection::Selection;
pub use sort::{SortDirection, SortState};
pub use table::{DataTable, TableEvent, TableState};
