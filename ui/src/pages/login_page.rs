//! Sign-in form.

use synctime_business::{AuthCompute, AuthStatus, LoginCommand, LoginInput};
use synctime_states::StateCtx;

pub fn login_page(ctx: &mut StateCtx, ui: &mut egui::Ui) {
    ui.vertical_centered(|ui| {
        ui.add_space(48.0);
        ui.heading("SyncTime");
        ui.add_space(16.0);

        let status = ctx
            .cached::<AuthCompute>()
            .map(|a| a.status.clone())
            .unwrap_or_default();
        let busy = matches!(status, AuthStatus::Authenticating);

        let mut submit = false;
        {
            let input = ctx.state_mut::<LoginInput>();
            ui.add_enabled_ui(!busy, |ui| {
                ui.label("Username");
                ui.text_edit_singleline(&mut input.username);
                ui.label("Password");
                let password = ui.add(
                    egui::TextEdit::singleline(&mut input.password).password(true),
                );
                if password.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    submit = true;
                }
                ui.add_space(8.0);
                if ui.button("Sign in").clicked() {
                    submit = true;
                }
            });
        }
        if submit && !busy {
            ctx.enqueue_command::<LoginCommand>();
        }

        match status {
            AuthStatus::Authenticating => {
                ui.add_space(8.0);
                ui.spinner();
            }
            AuthStatus::Failed(message) => {
                ui.add_space(8.0);
                ui.colored_label(egui::Color32::RED, message);
            }
            AuthStatus::NotAuthenticated | AuthStatus::Authenticated { .. } => {}
        }
    });
}
