//! Sort state and the stable sort over row references.

use std::cmp::Ordering;

use super::column::{CellValue, TableRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Transient sort state: at most one sorted column. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SortState {
    #[default]
    None,
    Sorted(String, SortDirection),
}

impl SortState {
    pub fn direction_for(&self, key: &str) -> Option<SortDirection> {
        match self {
            Self::Sorted(k, dir) if k == key => Some(*dir),
            _ => None,
        }
    }

    /// Click on the ascending indicator: activates ascending sort, or clears
    /// it when this column is already sorted ascending.
    pub fn click_ascending(&mut self, key: &str) {
        *self = if self.direction_for(key) == Some(SortDirection::Ascending) {
            Self::None
        } else {
            Self::Sorted(key.to_owned(), SortDirection::Ascending)
        };
    }

    /// Click on the descending indicator, mirroring `click_ascending`.
    pub fn click_descending(&mut self, key: &str) {
        *self = if self.direction_for(key) == Some(SortDirection::Descending) {
            Self::None
        } else {
            Self::Sorted(key.to_owned(), SortDirection::Descending)
        };
    }

    /// Click on the header label: cycles asc -> desc -> none.
    pub fn click_header(&mut self, key: &str) {
        *self = match self.direction_for(key) {
            None => Self::Sorted(key.to_owned(), SortDirection::Ascending),
            Some(SortDirection::Ascending) => {
                Self::Sorted(key.to_owned(), SortDirection::Descending)
            }
            Some(SortDirection::Descending) => Self::None,
        };
    }
}

/// Compares two cell values. Missing values normalize to empty text; mixed
/// types fall back to case-insensitive text comparison of their display
/// forms.
fn compare_cells(a: &CellValue, b: &CellValue) -> Ordering {
    match (a, b) {
        (CellValue::Number(x), CellValue::Number(y)) => {
            x.partial_cmp(y).unwrap_or(Ordering::Equal)
        }
        (CellValue::Date(x), CellValue::Date(y)) => x.cmp(y),
        (CellValue::Bool(x), CellValue::Bool(y)) => x.cmp(y),
        _ => {
            let x = normalize(a);
            let y = normalize(b);
            x.to_lowercase().cmp(&y.to_lowercase())
        }
    }
}

fn normalize(value: &CellValue) -> String {
    match value {
        CellValue::Empty => String::new(),
        other => other.display(),
    }
}

/// Returns the rows reordered by the sort state. The input order is
/// preserved when unsorted, and ties keep their relative input order.
pub fn sort_rows<'r, R: TableRow>(rows: &'r [R], sort: &SortState) -> Vec<&'r R> {
    let mut refs: Vec<&R> = rows.iter().collect();
    if let SortState::Sorted(key, direction) = sort {
        refs.sort_by(|a, b| {
            let ordering = compare_cells(&a.field(key), &b.field(key));
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }
    refs
}

#[cfg(test)]
mod tests {
    use super::*;
    use ustr::Ustr;

    struct Row {
        id: &'static str,
        title: &'static str,
        amount: Option<f64>,
    }

    impl TableRow for Row {
        fn row_id(&self) -> Ustr {
            Ustr::from(self.id)
        }

        fn field(&self, key: &str) -> CellValue {
            match key {
                "title" => CellValue::Text(self.title.to_owned()),
                "amount" => self.amount.map_or(CellValue::Empty, CellValue::Number),
                _ => CellValue::Empty,
            }
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { id: "a", title: "banana", amount: Some(3.0) },
            Row { id: "b", title: "apple", amount: None },
            Row { id: "c", title: "cherry", amount: Some(1.0) },
            Row { id: "d", title: "apple", amount: None },
        ]
    }

    fn ids<R: TableRow>(rows: &[&R]) -> Vec<Ustr> {
        rows.iter().map(|r| r.row_id()).collect()
    }

    #[test]
    fn unsorted_preserves_input_order() {
        let data = rows();
        assert_eq!(ids(&sort_rows(&data, &SortState::None)), ["a", "b", "c", "d"].map(Ustr::from));
    }

    #[test]
    fn descending_reverses_distinct_values_and_keeps_ties_stable() {
        let data = rows();
        let asc = sort_rows(
            &data,
            &SortState::Sorted("title".to_owned(), SortDirection::Ascending),
        );
        // Ties ("apple" twice) keep input order in both directions.
        assert_eq!(ids(&asc), ["b", "d", "a", "c"].map(Ustr::from));

        let desc = sort_rows(
            &data,
            &SortState::Sorted("title".to_owned(), SortDirection::Descending),
        );
        assert_eq!(ids(&desc), ["c", "a", "b", "d"].map(Ustr::from));
    }

    #[test]
    fn missing_values_sort_as_empty_text() {
        let data = rows();
        let asc = sort_rows(
            &data,
            &SortState::Sorted("amount".to_owned(), SortDirection::Ascending),
        );
        // Empty normalizes to "" which sorts before any number's text form,
        // and the two empty rows keep their relative order.
        assert_eq!(ids(&asc), ["b", "d", "c", "a"].map(Ustr::from));
    }

    #[test]
    fn ascending_indicator_cycles_to_clear() {
        let mut sort = SortState::default();
        sort.click_ascending("title");
        assert_eq!(sort.direction_for("title"), Some(SortDirection::Ascending));
        sort.click_ascending("title");
        assert_eq!(sort, SortState::None);
    }

    #[test]
    fn header_click_cycles_through_all_three_states() {
        let mut sort = SortState::default();
        sort.click_header("title");
        assert_eq!(sort.direction_for("title"), Some(SortDirection::Ascending));
        sort.click_header("title");
        assert_eq!(sort.direction_for("title"), Some(SortDirection::Descending));
        sort.click_header("title");
        assert_eq!(sort, SortState::None);
    }

    #[test]
    fn sorting_another_column_replaces_the_state() {
        let mut sort = SortState::default();
        sort.click_descending("title");
        sort.click_ascending("amount");
        assert_eq!(sort.direction_for("title"), None);
        assert_eq!(sort.direction_for("amount"), Some(SortDirection::Ascending));
    }
}
