//! Column definitions and the row abstraction the table renders over.

use chrono::NaiveDate;
use ustr::Ustr;

/// Identifies a logical table so persisted column configuration cannot
/// collide between tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TableId {
    Records,
    CalendarRoutines,
}

impl TableId {
    /// Storage key for the persisted column configuration.
    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Records => "synctime-records-table",
            Self::CalendarRoutines => "synctime-calendar-table",
        }
    }
}

/// A single displayable cell value.
///
/// `Empty` renders as `-`; a row missing a field degrades to a placeholder
/// instead of failing the render.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Bool(bool),
}

impl CellValue {
    pub fn display(&self) -> String {
        match self {
            Self::Empty => "-".to_owned(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => {
                if n.fract() == 0.0 {
                    format!("{n:.0}")
                } else {
                    format!("{n:.2}")
                }
            }
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
            Self::Bool(b) => if *b { "yes" } else { "no" }.to_owned(),
        }
    }

    /// The date carried by this value, parsing `YYYY-MM-DD` text.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            Self::Text(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").ok(),
            _ => None,
        }
    }
}

/// A row the table can display. Rows are opaque to the table: it only ever
/// reorders, filters and groups references to them.
///
/// Dynamic columns use the `custom_<name>` key convention: `field` is
/// expected to map such keys into the row's custom-fields mapping and to
/// return [`CellValue::Empty`] for anything unknown.
pub trait TableRow {
    /// Stable identifier; selection is keyed by it so it must survive
    /// re-fetches of the same logical row.
    fn row_id(&self) -> Ustr;

    fn field(&self, key: &str) -> CellValue;
}

/// Renders one cell for rows that need more than a text label. Receives the
/// row and its display index; the default rendering is a label of
/// `row.field(key).display()`.
pub type CellRenderer<R> = fn(&mut egui::Ui, &R, usize);

/// One column of a table, supplied by the caller and immutable per table
/// instance.
pub struct ColumnDef<R> {
    pub key: String,
    pub label: String,
    pub sortable: bool,
    pub render: Option<CellRenderer<R>>,
}

impl<R> ColumnDef<R> {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            sortable: true,
            render: None,
        }
    }

    pub fn not_sortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn with_renderer(mut self, render: CellRenderer<R>) -> Self {
        self.render = Some(render);
        self
    }
}
