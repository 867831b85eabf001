//! Calendar month view: routines grouped by day with per-day creation.

use synctime_business::{
    ListRoutinesCommand, Routine, RoutineDraft, RoutineMutationCompute, RoutineMutationStatus,
    RoutinesCompute, RoutinesQuery, SaveRoutineCommand, ToggleRoutineCommand, ToggleRoutineInput,
};
use synctime_states::StateCtx;
use synctime_utils::dates::{month_name, next_month, previous_month};
use ustr::Ustr;

use crate::widgets::data_table::{
    CellValue, ColumnDef, DataTable, EguiConfigStore, GroupBy, TableEvent, TableId, TableRow,
    TableState,
};

impl TableRow for Routine {
    fn row_id(&self) -> Ustr {
        self.id
    }

    fn field(&self, key: &str) -> CellValue {
        match key {
            "title" => CellValue::Text(self.title.to_string()),
            "note" => self
                .note
                .map_or(CellValue::Empty, |n| CellValue::Text(n.to_string())),
            "date" => CellValue::Text(self.date.to_string()),
            "done" => CellValue::Bool(self.done),
            _ => CellValue::Empty,
        }
    }
}

/// View state the calendar page keeps across frames.
#[derive(Default)]
pub struct CalendarPageState {
    pub table: TableState,
    editor_open: bool,
    awaiting_mutation: bool,
    initialized: bool,
}

fn columns() -> Vec<ColumnDef<Routine>> {
    vec![
        ColumnDef::new("done", "Done").with_renderer(|ui, routine, _index| {
            let mark = if routine.done { "☑" } else { "☐" };
            ui.label(mark);
        }),
        ColumnDef::new("title", "Title"),
        ColumnDef::new("note", "Note"),
    ]
}

pub fn calendar_page(ctx: &mut StateCtx, ui: &mut egui::Ui, page: &mut CalendarPageState) {
    if !page.initialized {
        ctx.enqueue_command::<ListRoutinesCommand>();
        page.initialized = true;
    }

    let query = ctx.state::<RoutinesQuery>().clone();

    let mut changed_query = false;
    let mut month = query.month;
    let mut year = query.year;
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
    });
    if changed_query {
        let state = ctx.state_mut::<RoutinesQuery>();
        state.month = month;
        state.year = year;
        ctx.touch::<RoutinesQuery>();
        ctx.enqueue_command::<ListRoutinesCommand>();
    }
    ui.separator();

    let routines: Vec<Routine> = ctx
        .cached::<RoutinesCompute>()
        .map(|r| r.routines().to_vec())
        .unwrap_or_default();
    let columns = columns();

    let table = DataTable::builder()
        .id(TableId::CalendarRoutines)
        .columns(&columns)
        .rows(&routines)
        .row_actions(true)
        .group_by(GroupBy::Day)
        .month(month)
        .year(year)
        .build();

    let mut store = EguiConfigStore::new(ui.ctx().clone());
    let events = table.show(ui, &mut page.table, &mut store);

    for event in events {
        match event {
            TableEvent::ToggleStatus(id) | TableEvent::Edit(id) => {
                ctx.state_mut::<ToggleRoutineInput>().id = id;
                ctx.enqueue_command::<ToggleRoutineCommand>();
                page.awaiting_mutation = true;
            }
            TableEvent::CreateRecord(context) => {
                if let Some(date) = context.first_date() {
                    *ctx.state_mut::<RoutineDraft>() = RoutineDraft::for_date(date);
                    page.editor_open = true;
                }
            }
            TableEvent::Delete(_)
            | TableEvent::SelectionChanged(_)
            | TableEvent::SortChanged(_)
            | TableEvent::ConfigChanged(_) => {}
        }
    }

    editor_window(ctx, ui, page);

    if page.awaiting_mutation {
        let status = ctx
            .cached::<RoutineMutationCompute>()
            .map(|m| m.status.clone())
            .unwrap_or_default();
        match status {
            RoutineMutationStatus::Done => {
                page.awaiting_mutation = false;
                page.editor_open = false;
                ctx.enqueue_command::<ListRoutinesCommand>();
            }
            RoutineMutationStatus::Error(_) => {
                page.awaiting_mutation = false;
            }
            RoutineMutationStatus::Idle | RoutineMutationStatus::Busy => {}
        }
    }
}

fn editor_window(ctx: &mut StateCtx, ui: &mut egui::Ui, page: &mut CalendarPageState) {
    if !page.editor_open {
        return;
    }

    let mutation = ctx
        .cached::<RoutineMutationCompute>()
        .map(|m| m.status.clone())
        .unwrap_or_default();

    let mut open = page.editor_open;
    let mut save = false;
    let mut cancel = false;

    egui::Window::new("Routine")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .show(ui.ctx(), |ui| {
            let draft = ctx.state_mut::<RoutineDraft>();
            ui.label("Title");
            ui.text_edit_singleline(&mut draft.title);
            ui.label("Note");
            ui.text_edit_singleline(&mut draft.note);
            ui.label("Date (YYYY-MM-DD)");
            ui.text_edit_singleline(&mut draft.date);

            if let RoutineMutationStatus::Error(message) = &mutation {
                ui.colored_label(egui::Color32::RED, message);
            }

            ui.horizontal(|ui| {
                let busy = matches!(mutation, RoutineMutationStatus::Busy);
                ui.add_enabled_ui(!busy, |ui| {
                    if ui.button("Create").clicked() {
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
        ctx.enqueue_command::<SaveRoutineCommand>();
        page.awaiting_mutation = true;
    }
}
