//! Harness tests rendering the data table headless.

use egui::accesskit::Role;
use egui_kittest::Harness;
use egui_kittest::kittest::Queryable as _;
use synctime_ui::widgets::data_table::{
    CellValue, ColumnDef, DataTable, GroupBy, MemoryConfigStore, TableId, TableRow, TableState,
};
use ustr::Ustr;

struct Row {
    id: &'static str,
    title: &'static str,
    date: &'static str,
}

impl TableRow for Row {
    fn row_id(&self) -> Ustr {
        Ustr::from(self.id)
    }

    fn field(&self, key: &str) -> CellValue {
        match key {
            "title" => CellValue::Text(self.title.to_owned()),
            "date" => CellValue::Text(self.date.to_owned()),
            _ => CellValue::Empty,
        }
    }
}

fn columns() -> Vec<ColumnDef<Row>> {
    vec![ColumnDef::new("title", "Title"), ColumnDef::new("date", "Date")]
}

#[test]
fn flat_table_renders_headers_and_cells() {
    let columns = columns();
    let rows = vec![
        Row { id: "a", title: "Groceries", date: "2025-10-03" },
        Row { id: "b", title: "Rent", date: "2025-10-01" },
    ];
    let mut state = TableState::new();
    let mut store = MemoryConfigStore::default();

    let mut harness = Harness::new_ui(move |ui| {
        let table = DataTable::builder()
            .id(TableId::Records)
            .columns(&columns)
            .rows(&rows)
            .month(10)
            .year(2025)
            .build();
        table.show(ui, &mut state, &mut store);
    });
    harness.run();

    harness.get_by_label("Title");
    harness.get_by_label("Groceries");
    harness.get_by_label("Rent");
}

#[test]
fn header_checkbox_clears_a_partial_selection_first() {
    let columns = columns();
    let rows = vec![
        Row { id: "a", title: "Groceries", date: "2025-10-03" },
        Row { id: "b", title: "Rent", date: "2025-10-01" },
        Row { id: "c", title: "Coffee", date: "2025-10-02" },
    ];
    let mut state = TableState::new();
    state.selection.toggle(Ustr::from("a"));
    state.selection.toggle(Ustr::from("b"));
    let mut store = MemoryConfigStore::default();

    let mut harness = Harness::new_ui_state(
        move |ui, state: &mut TableState| {
            let table = DataTable::builder()
                .id(TableId::Records)
                .columns(&columns)
                .rows(&rows)
                .selectable(true)
                .month(10)
                .year(2025)
                .build();
            table.show(ui, state, &mut store);
        },
        state,
    );
    harness.run();

    // Two of three rows selected: the header checkbox renders unchecked,
    // but the first click clears rather than selecting everything.
    harness
        .get_all_by_role(Role::CheckBox)
        .next()
        .expect("header checkbox")
        .click();
    harness.run();
    assert!(harness.state().selection.is_empty());

    // The next click selects every row.
    harness
        .get_all_by_role(Role::CheckBox)
        .next()
        .expect("header checkbox")
        .click();
    harness.run();
    assert!(harness.state().selection.all_selected(3));
}

#[test]
fn grouped_view_shows_empty_buckets() {
    let columns = columns();
    let rows: Vec<Row> = Vec::new();
    let mut state = TableState::new();
    let mut store = MemoryConfigStore::default();

    let mut harness = Harness::new_ui(move |ui| {
        let table = DataTable::builder()
            .id(TableId::Records)
            .columns(&columns)
            .rows(&rows)
            .group_by(GroupBy::Week)
            .month(10)
            .year(2025)
            .build();
        table.show(ui, &mut state, &mut store);
    });
    harness.run();

    // 31-day month: five fixed windows, all empty.
    harness.get_by_label("▶ Week 1 (Oct 1 to Oct 7) (no records)");
    harness.get_by_label("▶ Week 5 (Oct 29 to Oct 31) (no records)");
}
