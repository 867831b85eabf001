//! Notification bell with an unread badge and a dropdown list.

use synctime_business::{
    ListNotificationsCommand, MarkNotificationReadCommand, MarkReadInput, NotificationsCompute,
};
use synctime_states::StateCtx;

pub fn notifications_bell(ctx: &mut StateCtx, ui: &mut egui::Ui) {
    let unread = ctx
        .cached::<NotificationsCompute>()
        .map(|n| n.unread_count())
        .unwrap_or(0);
    let label = if unread > 0 {
        format!("🔔 {unread}")
    } else {
        "🔔".to_owned()
    };

    let response = ui.menu_button(label, |ui| {
        let notifications = ctx
            .cached::<NotificationsCompute>()
            .map(|n| n.notifications().to_vec())
            .unwrap_or_default();
        if notifications.is_empty() {
            ui.label("No notifications");
            return;
        }
        for notification in &notifications {
            ui.horizontal(|ui| {
                if notification.read {
                    ui.weak(&notification.message);
                } else {
                    ui.label(&notification.message);
                    if ui.small_button("Mark read").clicked() {
                        ctx.state_mut::<MarkReadInput>().id = notification.id;
                        ctx.enqueue_command::<MarkNotificationReadCommand>();
                    }
                }
            });
        }
    });

    // Refresh the list when the dropdown opens.
    if response.response.clicked() {
        ctx.enqueue_command::<ListNotificationsCommand>();
    }
}
