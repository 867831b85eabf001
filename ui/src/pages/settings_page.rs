//! System settings form.

use synctime_business::{
    LoadSettingsCommand, SettingsCompute, SettingsDraft, SettingsStatus, UpdateSettingsCommand,
};
use synctime_states::StateCtx;

/// View state the settings page keeps across frames.
#[derive(Default)]
pub struct SettingsPageState {
    initialized: bool,
    draft_synced: bool,
}

pub fn settings_page(ctx: &mut StateCtx, ui: &mut egui::Ui, page: &mut SettingsPageState) {
    if !page.initialized {
        ctx.enqueue_command::<LoadSettingsCommand>();
        page.initialized = true;
    }

    let status = ctx
        .cached::<SettingsCompute>()
        .map(|s| s.status.clone())
        .unwrap_or_default();

    // Seed the draft once the load lands.
    if !page.draft_synced {
        if let SettingsStatus::Success(settings) | SettingsStatus::Saved(settings) = &status {
            *ctx.state_mut::<SettingsDraft>() = SettingsDraft::from_settings(settings);
            page.draft_synced = true;
        }
    }

    ui.heading("Settings");
    ui.add_space(8.0);

    let mut save = false;
    {
        let draft = ctx.state_mut::<SettingsDraft>();
        ui.label("Currency code");
        ui.text_edit_singleline(&mut draft.currency);
        ui.checkbox(&mut draft.week_start_monday, "Week starts on Monday");
        ui.checkbox(&mut draft.notifications_enabled, "Enable notifications");
        ui.add_space(8.0);
        if ui.button("Save").clicked() {
            save = true;
        }
    }
    if save {
        ctx.enqueue_command::<UpdateSettingsCommand>();
    }

    match &status {
        SettingsStatus::Loading => {
            ui.spinner();
        }
        SettingsStatus::Saved(_) => {
            ui.colored_label(egui::Color32::GREEN, "Saved");
        }
        SettingsStatus::Error(message) => {
            ui.colored_label(egui::Color32::RED, message);
        }
        SettingsStatus::Idle | SettingsStatus::Success(_) => {}
    }
}
