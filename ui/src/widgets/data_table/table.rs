//! The render composer: visible/ordered columns plus sorted, optionally
//! grouped rows, drawn as an egui table.

use std::collections::BTreeSet;

use bon::Builder;
use ustr::Ustr;

use super::column::{ColumnDef, TableId, TableRow};
use super::config::{ColumnConfig, ColumnConfigStore, reconcile};
use super::drag::DragState;
use super::group::{GroupBy, GroupContext, group_rows};
use super::selection::Selection;
use super::sort::{SortDirection, SortState, sort_rows};

/// Interactions the table hands back to the caller. The table itself never
/// mutates rows or talks to the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    SelectionChanged(Vec<Ustr>),
    Edit(Ustr),
    Delete(Ustr),
    ToggleStatus(Ustr),
    SortChanged(SortState),
    /// The "add record" affordance of an expanded group, carrying the
    /// group's day/week context.
    CreateRecord(GroupContext),
    ConfigChanged(ColumnConfig),
}

/// Per-table transient view state, owned by the page across frames.
#[derive(Debug, Default)]
pub struct TableState {
    pub sort: SortState,
    pub drag: DragState,
    pub selection: Selection,
    pub expanded: BTreeSet<u32>,
    config: Option<ColumnConfig>,
}

impl TableState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<&ColumnConfig> {
        self.config.as_ref()
    }
}

/// One frame's worth of table. Configure with the builder, then call
/// [`show`](Self::show).
#[derive(Builder)]
pub struct DataTable<'a, R: TableRow> {
    id: TableId,
    columns: &'a [ColumnDef<R>],
    rows: &'a [R],
    #[builder(default)]
    selectable: bool,
    #[builder(default)]
    reorderable: bool,
    #[builder(default)]
    row_actions: bool,
    #[builder(default)]
    group_by: GroupBy,
    /// Column key holding the `YYYY-MM-DD` date used for grouping.
    #[builder(default = String::from("date"))]
    date_key: String,
    month: u32,
    year: i32,
}

impl<R: TableRow> DataTable<'_, R> {
    /// Renders the table and returns the interactions of this frame.
    pub fn show(
        &self,
        ui: &mut egui::Ui,
        state: &mut TableState,
        store: &mut dyn ColumnConfigStore,
    ) -> Vec<TableEvent> {
        let keys: Vec<String> = self.columns.iter().map(|c| c.key.clone()).collect();
        let mut config = match state.config.take() {
            // Already loaded; re-reconcile so columns that appeared since
            // (async custom field definitions) get picked up.
            Some(config) => reconcile(Some(config), &keys),
            None => reconcile(store.load(self.id), &keys),
        };
        let mut config_dirty = false;
        let mut events = Vec::new();

        self.toolbar(ui, &mut config, &mut config_dirty);

        let visible: Vec<&ColumnDef<R>> = config
            .column_order
            .iter()
            .filter(|key| config.is_visible(key))
            .filter_map(|key| self.columns.iter().find(|c| c.key == *key))
            .collect();
        let sorted = sort_rows(self.rows, &state.sort);

        match self.group_by {
            GroupBy::None => {
                self.flat_table(ui, state, &visible, &sorted, &mut config, &mut config_dirty, &mut events);
            }
            GroupBy::Day | GroupBy::Week => {
                self.grouped_view(ui, state, &visible, &sorted, &mut events);
            }
        }

        if config_dirty {
            store.save(self.id, &config);
            events.push(TableEvent::ConfigChanged(config.clone()));
        }
        state.config = Some(config);
        events
    }

    fn toolbar(&self, ui: &mut egui::Ui, config: &mut ColumnConfig, config_dirty: &mut bool) {
        ui.horizontal(|ui| {
            ui.menu_button("Columns", |ui| {
                for column in self.columns {
                    let mut visible = config.is_visible(&column.key);
                    if ui.checkbox(&mut visible, &column.label).changed() {
                        config.toggle_visible(&column.key);
                        *config_dirty = true;
                    }
                }
            });
        });
    }

    #[expect(clippy::too_many_arguments, reason = "internal render helper")]
    fn flat_table(
        &self,
        ui: &mut egui::Ui,
        state: &mut TableState,
        visible: &[&ColumnDef<R>],
        sorted: &[&R],
        config: &mut ColumnConfig,
        config_dirty: &mut bool,
        events: &mut Vec<TableEvent>,
    ) {
        use egui_extras::{Column, TableBuilder};

        let all_ids: Vec<Ustr> = sorted.iter().map(|r| r.row_id()).collect();
        let pointer_released = ui.input(|i| i.pointer.any_released());

        let mut builder = TableBuilder::new(ui).striped(true);
        if self.selectable {
            builder = builder.column(Column::auto());
        }
        builder = builder.columns(Column::remainder().at_least(60.0), visible.len());
        if self.row_actions {
            builder = builder.column(Column::auto());
        }

        builder
            .header(22.0, |mut header| {
                if self.selectable {
                    header.col(|ui| {
                        let mut checked = state.selection.all_selected(sorted.len());
                        if ui.checkbox(&mut checked, "").changed() {
                            state.selection.toggle_all(all_ids.iter().copied());
                            events.push(TableEvent::SelectionChanged(
                                state.selection.ids().to_vec(),
                            ));
                        }
                    });
                }
                for column in visible {
                    header.col(|ui| {
                        self.header_cell(ui, column, state, events);
                        // Drop target: releasing a dragged column over this
                        // header reinserts it before this column.
                        if pointer_released
                            && ui.rect_contains_pointer(ui.min_rect())
                            && state.drag.dragging().is_some()
                            && state.drag.drop_on(&column.key, &mut config.column_order)
                        {
                            *config_dirty = true;
                        }
                    });
                }
                if self.row_actions {
                    header.col(|ui| {
                        ui.label("Actions");
                    });
                }
            })
            .body(|body| {
                body.rows(20.0, sorted.len(), |mut row| {
                    let index = row.index();
                    let data = sorted[index];
                    if self.selectable {
                        row.col(|ui| {
                            let mut checked = state.selection.contains(data.row_id());
                            if ui.checkbox(&mut checked, "").changed() {
                                state.selection.toggle(data.row_id());
                                events.push(TableEvent::SelectionChanged(
                                    state.selection.ids().to_vec(),
                                ));
                            }
                        });
                    }
                    for column in visible {
                        row.col(|ui| match column.render {
                            Some(render) => render(ui, data, index),
                            None => {
                                ui.label(data.field(&column.key).display());
                            }
                        });
                    }
                    if self.row_actions {
                        row.col(|ui| {
                            row_action_buttons(ui, data.row_id(), events);
                        });
                    }
                });
            });

        // A release anywhere that was not a header drop ends the drag.
        if pointer_released {
            state.drag.cancel();
        }
    }

    fn header_cell(
        &self,
        ui: &mut egui::Ui,
        column: &ColumnDef<R>,
        state: &mut TableState,
        events: &mut Vec<TableEvent>,
    ) {
        ui.horizontal(|ui| {
            if self.reorderable {
                let handle = ui.add(egui::Label::new("⠿").sense(egui::Sense::drag()));
                if handle.drag_started() {
                    state.drag.begin(&column.key);
                }
            }
            if column.sortable {
                if ui.button(&column.label).clicked() {
                    state.sort.click_header(&column.key);
                    events.push(TableEvent::SortChanged(state.sort.clone()));
                }
                let direction = state.sort.direction_for(&column.key);
                if ui
                    .selectable_label(direction == Some(SortDirection::Ascending), "▲")
                    .clicked()
                {
                    state.sort.click_ascending(&column.key);
                    events.push(TableEvent::SortChanged(state.sort.clone()));
                }
                if ui
                    .selectable_label(direction == Some(SortDirection::Descending), "▼")
                    .clicked()
                {
                    state.sort.click_descending(&column.key);
                    events.push(TableEvent::SortChanged(state.sort.clone()));
                }
            } else {
                ui.label(&column.label);
            }
        });
    }

    fn grouped_view(
        &self,
        ui: &mut egui::Ui,
        state: &mut TableState,
        visible: &[&ColumnDef<R>],
        sorted: &[&R],
        events: &mut Vec<TableEvent>,
    ) {
        let groups = group_rows(sorted, &self.date_key, self.group_by, self.month, self.year);

        egui::ScrollArea::vertical().show(ui, |ui| {
            for group in &groups {
                let bucket = group.context.bucket;
                let expanded = state.expanded.contains(&bucket);
                let count = match group.rows.len() {
                    0 => "no records".to_owned(),
                    1 => "1 record".to_owned(),
                    n => format!("{n} records"),
                };
                let arrow = if expanded { "▼" } else { "▶" };
                if ui
                    .selectable_label(expanded, format!("{arrow} {} ({count})", group.label))
                    .clicked()
                {
                    if expanded {
                        state.expanded.remove(&bucket);
                    } else {
                        state.expanded.insert(bucket);
                    }
                }
                if !expanded {
                    continue;
                }

                ui.indent(("group", bucket), |ui| {
                    for (index, row) in group.rows.iter().enumerate() {
                        ui.horizontal(|ui| {
                            for column in visible {
                                match column.render {
                                    Some(render) => render(ui, row, index),
                                    None => {
                                        ui.label(row.field(&column.key).display());
                                    }
                                }
                            }
                            if self.row_actions {
                                row_action_buttons(ui, row.row_id(), events);
                            }
                        });
                    }
                    if ui.button("+ Add record").clicked() {
                        events.push(TableEvent::CreateRecord(group.context));
                    }
                });
                ui.separator();
            }
        });
    }
}

fn row_action_buttons(ui: &mut egui::Ui, id: Ustr, events: &mut Vec<TableEvent>) {
    if ui.small_button("Edit").clicked() {
        events.push(TableEvent::Edit(id));
    }
    if ui.small_button("Delete").clicked() {
        events.push(TableEvent::Delete(id));
    }
    if ui.small_button("Toggle").clicked() {
        events.push(TableEvent::ToggleStatus(id));
    }
}
