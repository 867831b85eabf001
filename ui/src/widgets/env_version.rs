//! Build/environment label shown at the right edge of the top bar.

use synctime_utils::version_info::format_env_version;

pub fn env_version(ui: &mut egui::Ui) {
    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
        ui.weak(format_env_version());
    });
}
