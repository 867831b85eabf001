//! Monthly financial records: month navigation, category filter, the data
//! table (with dynamic custom field columns) and the record editor.

use std::collections::BTreeMap;

use synctime_business::{
    CatalogCompute, Category, CustomFieldDef, CustomFieldValue, DeleteRecordCommand,
    DeleteRecordInput, FinancialRecord, ListRecordsCommand, LoadCatalogCommand, MonthSummaryCompute,
    MutationStatus, RecordDraft, RecordMutationCompute, RecordType, RecordsCompute, RecordsQuery,
    SaveRecordCommand, ToggleRecordStatusCommand, ToggleStatusInput,
};
use synctime_states::StateCtx;
use synctime_utils::dates::{month_name, next_month, previous_month};
use ustr::Ustr;

use crate::widgets::data_table::{
    CellValue, ColumnDef, DataTable, EguiConfigStore, GroupBy, TableEvent, TableId, TableRow,
    TableState,
};

/// A record enriched with its resolved category name, shaped for the table.
pub struct RecordRow {
    pub record: FinancialRecord,
    pub category_name: Ustr,
}

impl TableRow for RecordRow {
    fn row_id(&self) -> Ustr {
        self.record.id
    }

    fn field(&self, key: &str) -> CellValue {
        if let Some(name) = key.strip_prefix("custom_") {
            return match self.record.custom_field(name) {
                Some(CustomFieldValue::Number(n)) => CellValue::Number(*n),
                Some(value) => CellValue::Text(value.display()),
                None => CellValue::Empty,
            };
        }
        match key {
            "title" => CellValue::Text(self.record.title.to_string()),
            "description" => self
                .record
                .description
                .map_or(CellValue::Empty, |d| CellValue::Text(d.to_string())),
            "amount" => CellValue::Number(self.record.amount),
            "date" => CellValue::Text(self.record.date.to_string()),
            "type" => CellValue::Text(self.record.record_type.to_string()),
            "category" => CellValue::Text(self.category_name.to_string()),
            "status" => CellValue::Text(self.record.status.to_string()),
            _ => CellValue::Empty,
        }
    }
}

/// View state the records page keeps across frames.
pub struct RecordsPageState {
    pub table: TableState,
    pub group_by: GroupBy,
    editor_open: bool,
    awaiting_mutation: bool,
    initialized: bool,
}

impl Default for RecordsPageState {
    fn default() -> Self {
        Self {
            table: TableState::new(),
            group_by: GroupBy::None,
            editor_open: false,
            awaiting_mutation: false,
            initialized: false,
        }
    }
}

fn base_columns() -> Vec<ColumnDef<RecordRow>> {
    vec![
        ColumnDef::new("title", "Title"),
        ColumnDef::new("description", "Description"),
        ColumnDef::new("amount", "Amount"),
        ColumnDef::new("date", "Date"),
        ColumnDef::new("type", "Type"),
        ColumnDef::new("category", "Category"),
        ColumnDef::new("status", "Status").with_renderer(|ui, row, _index| {
            let active = row.record.is_active();
            let color = if active {
                egui::Color32::GREEN
            } else {
                egui::Color32::GRAY
            };
            ui.colored_label(color, row.record.status.as_str());
        }),
    ]
}

pub fn records_page(ctx: &mut StateCtx, ui: &mut egui::Ui, page: &mut RecordsPageState) {
    if !page.initialized {
        ctx.enqueue_command::<ListRecordsCommand>();
        ctx.enqueue_command::<LoadCatalogCommand>();
        page.initialized = true;
    }

    let query = ctx.state::<RecordsQuery>().clone();
    let categories: Vec<Category> = ctx
        .cached::<CatalogCompute>()
        .map(|c| c.categories().to_vec())
        .unwrap_or_default();
    let record_types: Vec<RecordType> = ctx
        .cached::<CatalogCompute>()
        .map(|c| c.record_types().to_vec())
        .unwrap_or_default();
    let custom_fields: Vec<CustomFieldDef> = ctx
        .cached::<CatalogCompute>()
        .map(|c| c.custom_fields().to_vec())
        .unwrap_or_default();

    toolbar(ctx, ui, page, &query, &categories);
    summary_strip(ctx, ui);
    ui.separator();

    let category_names: BTreeMap<Ustr, Ustr> = categories
        .iter()
        .map(|c| (c.id, c.name))
        .collect();
    let rows: Vec<RecordRow> = ctx
        .cached::<RecordsCompute>()
        .map(|r| r.records().to_vec())
        .unwrap_or_default()
        .into_iter()
        .map(|record| {
            let category_name = category_names
                .get(&record.category_id)
                .copied()
                .unwrap_or_default();
            RecordRow {
                record,
                category_name,
            }
        })
        .collect();

    let mut columns = base_columns();
    for field in &custom_fields {
        columns.push(ColumnDef::new(field.column_key(), field.name.as_str()));
    }

    let table = DataTable::builder()
        .id(TableId::Records)
        .columns(&columns)
        .rows(&rows)
        .selectable(true)
        .reorderable(true)
        .row_actions(true)
        .group_by(page.group_by)
        .month(query.month)
        .year(query.year)
        .build();

    let mut store = EguiConfigStore::new(ui.ctx().clone());
    let events = table.show(ui, &mut page.table, &mut store);

    for event in events {
        match event {
            TableEvent::Edit(id) => {
                if let Some(row) = rows.iter().find(|r| r.record.id == id) {
                    *ctx.state_mut::<RecordDraft>() = RecordDraft::from_record(&row.record);
                    page.editor_open = true;
                }
            }
            TableEvent::Delete(id) => {
                ctx.state_mut::<DeleteRecordInput>().id = id;
                ctx.enqueue_command::<DeleteRecordCommand>();
                page.awaiting_mutation = true;
            }
            TableEvent::ToggleStatus(id) => {
                ctx.state_mut::<ToggleStatusInput>().id = id;
                ctx.enqueue_command::<ToggleRecordStatusCommand>();
                page.awaiting_mutation = true;
            }
            TableEvent::CreateRecord(context) => {
                if let Some(date) = context.first_date() {
                    *ctx.state_mut::<RecordDraft>() = RecordDraft::for_date(date);
                    page.editor_open = true;
                }
            }
            TableEvent::SelectionChanged(_)
            | TableEvent::SortChanged(_)
            | TableEvent::ConfigChanged(_) => {}
        }
    }

    editor_window(ctx, ui, page, &categories, &record_types);

    // A finished mutation invalidates the listing.
    if page.awaiting_mutation {
        let status = ctx
            .cached::<RecordMutationCompute>()
            .map(|m| m.status.clone())
            .unwrap_or_default();
        match status {
            MutationStatus::Done => {
                page.awaiting_mutation = false;
                page.editor_open = false;
                ctx.enqueue_command::<ListRecordsCommand>();
            }
            MutationStatus::Error(_) => {
                page.awaiting_mutation = false;
            }
            MutationStatus::Idle | MutationStatus::Busy => {}
        }
    }
}

fn toolbar(
    ctx: &mut StateCtx,
    ui: &mut egui::Ui,
    page: &mut RecordsPageState,
    query: &RecordsQuery,
    categories: &[Category],
) {
    let mut changed_query = false;
    let mut month = query.month;
    let mut year = query.year;
    let mut category = query.category;

    ui.horizontal(|ui| {
        if ui.button("◀").clicked() {
            (year, month) = previous_month(year, month);
            changed_query = true;
        }
        ui.label(format!("{} {year}", month_name(month)));
        if ui.button("▶").clicked() {
            (year, month) = next_month(year, month);
            changed_query = true;
        }

        ui.separator();

        let selected_name = category
            .and_then(|id| categories.iter().find(|c| c.id == id))
            .map_or("All categories", |c| c.name.as_str());
        egui::ComboBox::from_id_salt("category-filter")
            .selected_text(selected_name)
            .show_ui(ui, |ui| {
                if ui.selectable_label(category.is_none(), "All categories").clicked() {
                    category = None;
                    changed_query = true;
                }
                for c in categories {
                    if ui
                        .selectable_label(category == Some(c.id), c.name.as_str())
                        .clicked()
                    {
                        category = Some(c.id);
                        changed_query = true;
                    }
                }
            });

        ui.separator();

        ui.label("Group:");
        ui.selectable_value(&mut page.group_by, GroupBy::None, "Flat");
        ui.selectable_value(&mut page.group_by, GroupBy::Day, "By day");
        ui.selectable_value(&mut page.group_by, GroupBy::Week, "By week");

        ui.separator();

        if ui.button("Add record").clicked() {
            let today = chrono::Local::now().date_naive();
            *ctx.state_mut::<RecordDraft>() = RecordDraft::for_date(today);
            page.editor_open = true;
        }
    });

    if changed_query {
        let state = ctx.state_mut::<RecordsQuery>();
        state.month = month;
        state.year = year;
        state.category = category;
        ctx.touch::<RecordsQuery>();
        ctx.enqueue_command::<ListRecordsCommand>();
    }
}

fn summary_strip(ctx: &StateCtx, ui: &mut egui::Ui) {
    let summary = ctx
        .cached::<MonthSummaryCompute>()
        .map(|s| s.summary)
        .unwrap_or_default();
    ui.horizontal(|ui| {
        ui.label(format!("Income: {:.2}", summary.income));
        ui.label(format!("Expense: {:.2}", summary.expense));
        ui.label(format!("Balance: {:.2}", summary.balance()));
        ui.weak(format!("{} active records", summary.count));
    });
}

fn editor_window(
    ctx: &mut StateCtx,
    ui: &mut egui::Ui,
    page: &mut RecordsPageState,
    categories: &[Category],
    record_types: &[RecordType],
) {
    if !page.editor_open {
        return;
    }

    let mutation = ctx
        .cached::<RecordMutationCompute>()
        .map(|m| m.status.clone())
        .unwrap_or_default();

    let mut open = page.editor_open;
    let mut save = false;
    let mut cancel = false;

    egui::Window::new("Record")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .show(ui.ctx(), |ui| {
            let draft = ctx.state_mut::<RecordDraft>();
            let is_new = draft.id.is_none();

            ui.label("Title");
            ui.text_edit_singleline(&mut draft.title);
            ui.label("Description");
            ui.text_edit_singleline(&mut draft.description);
            ui.label("Amount");
            ui.text_edit_singleline(&mut draft.amount);
            ui.label("Date (YYYY-MM-DD)");
            ui.text_edit_singleline(&mut draft.date);

            let type_name = record_types
                .iter()
                .find(|t| t.id == draft.record_type)
                .map_or("Select type", |t| t.name.as_str());
            egui::ComboBox::from_id_salt("record-type")
                .selected_text(type_name)
                .show_ui(ui, |ui| {
                    for t in record_types {
                        ui.selectable_value(&mut draft.record_type, t.id, t.name.as_str());
                    }
                });

            let category_name = categories
                .iter()
                .find(|c| c.id == draft.category_id)
                .map_or("Select category", |c| c.name.as_str());
            egui::ComboBox::from_id_salt("record-category")
                .selected_text(category_name)
                .show_ui(ui, |ui| {
                    for c in categories {
                        ui.selectable_value(&mut draft.category_id, c.id, c.name.as_str());
                    }
                });

            if let MutationStatus::Error(message) = &mutation {
                ui.colored_label(egui::Color32::RED, message);
            }

            ui.horizontal(|ui| {
                let busy = matches!(mutation, MutationStatus::Busy);
                ui.add_enabled_ui(!busy, |ui| {
                    let label = if is_new { "Create" } else { "Save" };
                    if ui.button(label).clicked() {
                        save = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                });
                if busy {
                    ui.spinner();
                }
            });
        });

    page.editor_open = open && !cancel;
    if save {
        ctx.enqueue_command::<SaveRecordCommand>();
        page.awaiting_mutation = true;
    }
}
