use synctime_business::{
    AppConfig, AuthCompute, CatalogCompute, DeleteRecordInput, HealthCompute, LoginInput,
    MarkReadInput, MonthSummaryCompute, NotificationsCompute, RecordDraft, RecordMutationCompute,
    RecordsCompute, RecordsQuery, Route, RoutineDraft, RoutineMutationCompute, RoutinesCompute,
    RoutinesQuery, SettingsCompute, SettingsDraft, ToggleRoutineInput, ToggleStatusInput,
};
use synctime_states::StateCtx;

/// The main application state: the state world every page reads and writes.
pub struct State {
    pub ctx: StateCtx,
}

impl Default for State {
    fn default() -> Self {
        Self::with_config(AppConfig::default())
    }
}

impl State {
    /// State pointed at an explicit API base URL, used by tests to talk to
    /// a mock server.
    pub fn test(base_url: String) -> Self {
        Self::with_config(AppConfig::new(base_url))
    }

    fn with_config(config: AppConfig) -> Self {
        let mut ctx = StateCtx::new();

        ctx.add_state(config);
        ctx.add_state(Route::default());
        ctx.add_state(LoginInput::default());
        ctx.add_state(RecordsQuery::default());
        ctx.add_state(RecordDraft::default());
        ctx.add_state(DeleteRecordInput::default());
        ctx.add_state(ToggleStatusInput::default());
        ctx.add_state(RoutinesQuery::default());
        ctx.add_state(RoutineDraft::default());
        ctx.add_state(ToggleRoutineInput::default());
        ctx.add_state(MarkReadInput::default());
        ctx.add_state(SettingsDraft::default());

        ctx.record_compute(AuthCompute::default());
        ctx.record_compute(HealthCompute::default());
        ctx.record_compute(RecordsCompute::default());
        ctx.record_compute(RecordMutationCompute::default());
        ctx.record_compute(MonthSummaryCompute::default());
        ctx.record_compute(CatalogCompute::default());
        ctx.record_compute(RoutinesCompute::default());
        ctx.record_compute(RoutineMutationCompute::default());
        ctx.record_compute(NotificationsCompute::default());
        ctx.record_compute(SettingsCompute::default());

        Self { ctx }
    }
}
