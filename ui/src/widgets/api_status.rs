//! Backend health indicator for the top bar.

use synctime_business::{ApiHealth, HealthCompute};
use synctime_states::StateCtx;

pub fn api_status(ctx: &StateCtx, ui: &mut egui::Ui) {
    let health = ctx
        .cached::<HealthCompute>()
        .map(|h| h.health)
        .unwrap_or_default();
    let (color, text) = match health {
        ApiHealth::Up => (egui::Color32::GREEN, "API online"),
        ApiHealth::Down => (egui::Color32::RED, "API offline"),
        ApiHealth::Checking => (egui::Color32::YELLOW, "Checking API"),
        ApiHealth::Unknown => (egui::Color32::GRAY, "API status unknown"),
    };
    ui.colored_label(color, "●").on_hover_text(text);
}
