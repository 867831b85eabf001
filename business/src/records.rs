//! Financial records: month-scoped listing plus create/update/delete and
//! status toggling.
//!
//! Records carry a dynamic `custom_fields` map next to their fixed columns;
//! the table widget surfaces those through the `custom_<name>` key
//! convention.

use std::any::{Any, TypeId};
use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::error;
use serde::{Deserialize, Serialize};
use synctime_states::{
    Command, CommandSnapshot, Compute, ComputeDeps, Dep, LatestOnlyUpdater, SnapshotClone, State,
    Updater, assign_impl, state_assign_impl,
};
use tokio_util::sync::CancellationToken;
use ustr::Ustr;

use crate::auth::AuthCompute;
use crate::config::AppConfig;
use crate::http::Client;

/// A dynamically-typed custom field value.
///
/// The backend stores custom fields as loose JSON; dates arrive as
/// `YYYY-MM-DD` text and multi-choice fields as string arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CustomFieldValue {
    Number(f64),
    Text(String),
    Choices(Vec<String>),
}

impl CustomFieldValue {
    /// Human-readable form; multi-choice values are comma-joined.
    pub fn display(&self) -> String {
        match self {
            Self::Number(n) => {
                if n.fract() == 0.0 {
                    format!("{n:.0}")
                } else {
                    n.to_string()
                }
            }
            Self::Text(s) => s.clone(),
            Self::Choices(options) => options.join(", "),
        }
    }
}

/// A financial record from the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialRecord {
    /// Unique identifier (UUID).
    pub id: Ustr,
    /// Record title.
    pub title: Ustr,
    /// Optional description.
    #[serde(default)]
    pub description: Option<Ustr>,
    /// Signed amount in the configured currency.
    pub amount: f64,
    /// Record date in `YYYY-MM-DD` form.
    pub date: Ustr,
    /// Record type identifier ("income" or "expense").
    pub record_type: Ustr,
    /// Owning category identifier.
    pub category_id: Ustr,
    /// Record status ("active" or "inactive").
    pub status: Ustr,
    /// Dynamic custom field values, keyed by field name.
    #[serde(default)]
    pub custom_fields: BTreeMap<String, CustomFieldValue>,
    /// Timestamp when the record was created (ISO 8601 format).
    pub created_at: Ustr,
    /// Timestamp when the record was last updated (ISO 8601 format).
    pub updated_at: Ustr,
}

impl FinancialRecord {
    pub fn is_income(&self) -> bool {
        self.record_type == "income"
    }

    pub fn is_active(&self) -> bool {
        self.status == "active"
    }

    /// Parsed record date, `None` when the backend sent something malformed.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.as_str(), "%Y-%m-%d").ok()
    }

    pub fn custom_field(&self, name: &str) -> Option<&CustomFieldValue> {
        self.custom_fields.get(name)
    }
}

/// Response from listing records.
#[derive(Debug, Clone, Deserialize)]
pub struct ListRecordsResponse {
    pub items: Vec<FinancialRecord>,
    pub total: usize,
}

/// Month/year/category scope for the records listing.
#[derive(Debug, Clone)]
pub struct RecordsQuery {
    /// 1-based month.
    pub month: u32,
    pub year: i32,
    /// Restrict to one category; `None` lists all.
    pub category: Option<Ustr>,
}

impl Default for RecordsQuery {
    fn default() -> Self {
        let today = chrono::Local::now().date_naive();
        use chrono::Datelike;
        Self {
            month: today.month(),
            year: today.year(),
            category: None,
        }
    }
}

impl SnapshotClone for RecordsQuery {
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }
}

impl State for RecordsQuery {
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

/// Status of the records listing.
#[derive(Debug, Clone, Default)]
pub enum RecordsStatus {
    #[default]
    Idle,
    Loading,
    Success(Vec<FinancialRecord>),
    Error(String),
}

/// Compute cache for the records listing.
#[derive(Default, Debug, Clone)]
pub struct RecordsCompute {
    pub status: RecordsStatus,
}

impl RecordsCompute {
    /// The listed records, empty while loading or failed.
    pub fn records(&self) -> &[FinancialRecord] {
        match &self.status {
            RecordsStatus::Success(items) => items,
            _ => &[],
        }
    }
}

impl SnapshotClone for RecordsCompute {
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }
}

impl Compute for RecordsCompute {
    fn deps(&self) -> ComputeDeps {
        (&[], &[])
    }

    fn compute(&self, _deps: Dep<'_>, _updater: Updater) {
        // Updated by ListRecordsCommand.
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}

/// Command to list records for the current query scope.
#[derive(Default, Debug)]
pub struct ListRecordsCommand;

impl Command for ListRecordsCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: CancellationToken,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>> {
        let query: RecordsQuery = snap.state::<RecordsQuery>().clone();
        let config: AppConfig = snap.state::<AppConfig>().clone();
        let auth: AuthCompute = snap.compute::<AuthCompute>().clone();

        Box::pin(async move {
            let Some(token) = auth.token().map(str::to_owned) else {
                updater.set(RecordsCompute {
                    status: RecordsStatus::Error("Not authenticated".to_owned()),
                });
                return;
            };

            updater.set(RecordsCompute {
                status: RecordsStatus::Loading,
            });

            let mut params = vec![
                format!("month={}", query.month),
                format!("year={}", query.year),
            ];
            if let Some(category) = &query.category {
                params.push(format!("category={category}"));
            }
            let url = format!("{}/v1/records?{}", config.api_url(), params.join("&"));

            match Client::get(&url).bearer(&token).send().await {
                Ok(response) if response.is_success() => {
                    match response.json::<ListRecordsResponse>() {
                        Ok(resp) => {
                            updater.set(RecordsCompute {
                                status: RecordsStatus::Success(resp.items),
                            });
                        }
                        Err(e) => {
                            updater.set(RecordsCompute {
                                status: RecordsStatus::Error(format!(
                                    "Failed to parse response: {e}"
                                )),
                            });
                        }
                    }
                }
                Ok(response) => {
                    let error = response.text().unwrap_or_else(|_| "Unknown error".to_owned());
                    updater.set(RecordsCompute {
                        status: RecordsStatus::Error(error),
                    });
                }
                Err(e) => {
                    error!("list records failed: {e}");
                    updater.set(RecordsCompute {
                        status: RecordsStatus::Error(e.to_string()),
                    });
                }
            }
        })
    }
}

/// Editable form state for creating or updating a record.
///
/// `id` is `None` for a new record. Amount and date are kept as text while
/// editing and validated on save.
#[derive(Default, Debug, Clone)]
pub struct RecordDraft {
    pub id: Option<Ustr>,
    pub title: String,
    pub description: String,
    pub amount: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    pub record_type: Ustr,
    pub category_id: Ustr,
    pub custom_fields: BTreeMap<String, CustomFieldValue>,
}

/// Wire payload for create/update.
#[derive(Debug, Clone, Serialize)]
pub struct RecordPayload {
    pub title: String,
    pub description: Option<String>,
    pub amount: f64,
    pub date: String,
    pub record_type: Ustr,
    pub category_id: Ustr,
    pub custom_fields: BTreeMap<String, CustomFieldValue>,
}

impl RecordDraft {
    /// Pre-filled draft for the "add record" affordance of a day group.
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date: date.format("%Y-%m-%d").to_string(),
            ..Self::default()
        }
    }

    /// Draft populated from an existing record, for editing.
    pub fn from_record(record: &FinancialRecord) -> Self {
        Self {
            id: Some(record.id),
            title: record.title.to_string(),
            description: record
                .description
                .map(|d| d.to_string())
                .unwrap_or_default(),
            amount: record.amount.to_string(),
            date: record.date.to_string(),
            record_type: record.record_type,
            category_id: record.category_id,
            custom_fields: record.custom_fields.clone(),
        }
    }

    /// Validates the draft into a wire payload.
    pub fn validate(&self) -> Result<RecordPayload, String> {
        if self.title.trim().is_empty() {
            return Err("Title is required".to_owned());
        }
        let amount: f64 = self
            .amount
            .trim()
            .parse()
            .map_err(|_| "Amount must be a number".to_owned())?;
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| "Date must be YYYY-MM-DD".to_owned())?;
        if self.category_id.is_empty() {
            return Err("Category is required".to_owned());
        }
        Ok(RecordPayload {
            title: self.title.trim().to_owned(),
            description: if self.description.trim().is_empty() {
                None
            } else {
                Some(self.description.trim().to_owned())
            },
            amount,
            date: self.date.trim().to_owned(),
            record_type: self.record_type,
            category_id: self.category_id,
            custom_fields: self.custom_fields.clone(),
        })
    }
}

impl SnapshotClone for RecordDraft {
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }
}

impl State for RecordDraft {
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

/// Status of the latest record mutation (save, delete, toggle).
#[derive(Debug, Clone, Default)]
pub enum MutationStatus {
    #[default]
    Idle,
    Busy,
    Done,
    Error(String),
}

/// Compute cache tracking record mutations; the records page re-lists when
/// this reaches `Done`.
#[derive(Default, Debug, Clone)]
pub struct RecordMutationCompute {
    pub status: MutationStatus,
}

impl SnapshotClone for RecordMutationCompute {
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }
}

impl Compute for RecordMutationCompute {
    fn deps(&self) -> ComputeDeps {
        (&[], &[])
    }

    fn compute(&self, _deps: Dep<'_>, _updater: Updater) {
        // Updated by the mutation commands.
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}

/// Command that creates (`POST`) or updates (`PUT`) the drafted record.
#[derive(Default, Debug)]
pub struct SaveRecordCommand;

impl Command for SaveRecordCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: CancellationToken,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>> {
        let draft: RecordDraft = snap.state::<RecordDraft>().clone();
        let config: AppConfig = snap.state::<AppConfig>().clone();
        let auth: AuthCompute = snap.compute::<AuthCompute>().clone();

        Box::pin(async move {
            let Some(token) = auth.token().map(str::to_owned) else {
                updater.set(RecordMutationCompute {
                    status: MutationStatus::Error("Not authenticated".to_owned()),
                });
                return;
            };

            let payload = match draft.validate() {
                Ok(payload) => payload,
                Err(message) => {
                    updater.set(RecordMutationCompute {
                        status: MutationStatus::Error(message),
                    });
                    return;
                }
            };

            updater.set(RecordMutationCompute {
                status: MutationStatus::Busy,
            });

            let request = match draft.id {
                Some(id) => Client::put(format!("{}/v1/records/{id}", config.api_url())),
                None => Client::post(format!("{}/v1/records", config.api_url())),
            };
            let request = match request.bearer(&token).json(&payload) {
                Ok(r) => r,
                Err(e) => {
                    updater.set(RecordMutationCompute {
                        status: MutationStatus::Error(format!("Failed to build request: {e}")),
                    });
                    return;
                }
            };

            match request.send().await {
                Ok(response) if response.is_success() => {
                    updater.set(RecordMutationCompute {
                        status: MutationStatus::Done,
                    });
                }
                Ok(response) => {
                    let error = response.text().unwrap_or_else(|_| "Unknown error".to_owned());
                    updater.set(RecordMutationCompute {
                        status: MutationStatus::Error(error),
                    });
                }
                Err(e) => {
                    error!("save record failed: {e}");
                    updater.set(RecordMutationCompute {
                        status: MutationStatus::Error(e.to_string()),
                    });
                }
            }
        })
    }
}

/// Target of a delete or toggle, written by the table's row actions.
#[derive(Default, Debug, Clone)]
pub struct DeleteRecordInput {
    pub id: Ustr,
}

impl SnapshotClone for DeleteRecordInput {
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }
}

impl State for DeleteRecordInput {
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

/// Command to delete a record by id.
#[derive(Default, Debug)]
pub struct DeleteRecordCommand;

impl Command for DeleteRecordCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: CancellationToken,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>> {
        let input: DeleteRecordInput = snap.state::<DeleteRecordInput>().clone();
        let config: AppConfig = snap.state::<AppConfig>().clone();
        let auth: AuthCompute = snap.compute::<AuthCompute>().clone();

        Box::pin(async move {
            let Some(token) = auth.token().map(str::to_owned) else {
                updater.set(RecordMutationCompute {
                    status: MutationStatus::Error("Not authenticated".to_owned()),
                });
                return;
            };
            if input.id.is_empty() {
                updater.set(RecordMutationCompute {
                    status: MutationStatus::Error("Record id is required".to_owned()),
                });
                return;
            }

            updater.set(RecordMutationCompute {
                status: MutationStatus::Busy,
            });

            let url = format!("{}/v1/records/{}", config.api_url(), input.id);
            match Client::delete(&url).bearer(&token).send().await {
                Ok(response) if response.is_success() => {
                    updater.set(RecordMutationCompute {
                        status: MutationStatus::Done,
                    });
                }
                Ok(response) => {
                    let error = response.text().unwrap_or_else(|_| "Unknown error".to_owned());
                    updater.set(RecordMutationCompute {
                        status: MutationStatus::Error(error),
                    });
                }
                Err(e) => {
                    error!("delete record failed: {e}");
                    updater.set(RecordMutationCompute {
                        status: MutationStatus::Error(e.to_string()),
                    });
                }
            }
        })
    }
}

/// Target of a status toggle.
#[derive(Default, Debug, Clone)]
pub struct ToggleStatusInput {
    pub id: Ustr,
}

impl SnapshotClone for ToggleStatusInput {
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }
}

impl State for ToggleStatusInput {
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

/// Command to flip a record between active and inactive.
#[derive(Default, Debug)]
pub struct ToggleRecordStatusCommand;

impl Command for ToggleRecordStatusCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: CancellationToken,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>> {
        let input: ToggleStatusInput = snap.state::<ToggleStatusInput>().clone();
        let config: AppConfig = snap.state::<AppConfig>().clone();
        let auth: AuthCompute = snap.compute::<AuthCompute>().clone();

        Box::pin(async move {
            let Some(token) = auth.token().map(str::to_owned) else {
                updater.set(RecordMutationCompute {
                    status: MutationStatus::Error("Not authenticated".to_owned()),
                });
                return;
            };
            if input.id.is_empty() {
                updater.set(RecordMutationCompute {
                    status: MutationStatus::Error("Record id is required".to_owned()),
                });
                return;
            }

            updater.set(RecordMutationCompute {
                status: MutationStatus::Busy,
            });

            let url = format!("{}/v1/records/{}/status", config.api_url(), input.id);
            match Client::put(&url).bearer(&token).send().await {
                Ok(response) if response.is_success() => {
                    updater.set(RecordMutationCompute {
                        status: MutationStatus::Done,
                    });
                }
                Ok(response) => {
                    let error = response.text().unwrap_or_else(|_| "Unknown error".to_owned());
                    updater.set(RecordMutationCompute {
                        status: MutationStatus::Error(error),
                    });
                }
                Err(e) => {
                    error!("toggle record status failed: {e}");
                    updater.set(RecordMutationCompute {
                        status: MutationStatus::Error(e.to_string()),
                    });
                }
            }
        })
    }
}

/// Month totals derived from the current listing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MonthSummary {
    pub income: f64,
    pub expense: f64,
    pub count: usize,
}

impl MonthSummary {
    pub fn balance(&self) -> f64 {
        self.income - self.expense
    }
}

/// Derived compute: recalculated whenever the records listing changes.
#[derive(Default, Debug, Clone)]
pub struct MonthSummaryCompute {
    pub summary: MonthSummary,
}

impl SnapshotClone for MonthSummaryCompute {
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }
}

impl Compute for MonthSummaryCompute {
    fn deps(&self) -> ComputeDeps {
        static COMPUTE_DEPS: [TypeId; 1] = [TypeId::of::<RecordsCompute>()];
        (&[], &COMPUTE_DEPS)
    }

    fn compute(&self, deps: Dep<'_>, updater: Updater) {
        let records = deps.compute::<RecordsCompute>();
        let mut summary = MonthSummary::default();
        for record in records.records() {
            if !record.is_active() {
                continue;
            }
            if record.is_income() {
                summary.income += record.amount;
            } else {
                summary.expense += record.amount;
            }
            summary.count += 1;
        }
        updater.set(MonthSummaryCompute { summary });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}
