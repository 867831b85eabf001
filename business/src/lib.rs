//! Business layer for SyncTime: thin wrappers around the REST backend,
//! expressed as states, commands and compute caches.
//!
//! Nothing here retries, caches or reconciles; every module is a direct
//! mapping from an endpoint group to a command plus a status cache the UI
//! reads each frame.

pub mod auth;
pub mod categories;
pub mod config;
pub mod health;
pub mod http;
pub mod notifications;
pub mod records;
pub mod route;
pub mod routines;
pub mod settings;

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests;

pub use auth::{
    AuthCompute, AuthStatus, LoginCommand, LoginInput, LogoutCommand,
};
pub use categories::{
    Catalog, CatalogCompute, CatalogStatus, Category, CustomFieldDef, CustomFieldKind,
    LoadCatalogCommand, RecordType,
};
pub use config::AppConfig;
pub use health::{ApiHealth, CheckHealthCommand, HealthCompute};
pub use notifications::{
    ListNotificationsCommand, MarkNotificationReadCommand, MarkReadInput, Notification,
    NotificationsCompute, NotificationsStatus,
};
pub use records::{
    CustomFieldValue, DeleteRecordCommand, DeleteRecordInput, FinancialRecord, ListRecordsCommand,
    MonthSummary, MonthSummaryCompute, MutationStatus, RecordDraft, RecordMutationCompute,
    RecordsCompute, RecordsQuery, RecordsStatus, SaveRecordCommand, ToggleRecordStatusCommand,
    ToggleStatusInput,
};
pub use route::Route;
pub use routines::{
    ListRoutinesCommand, Routine, RoutineDraft, RoutineMutationCompute, RoutineMutationStatus,
    RoutinesCompute, RoutinesQuery, RoutinesStatus, SaveRoutineCommand, ToggleRoutineCommand,
    ToggleRoutineInput,
};
pub use settings::{
    LoadSettingsCommand, SettingsCompute, SettingsDraft, SettingsStatus, SystemSettings,
    UpdateSettingsCommand,
};
