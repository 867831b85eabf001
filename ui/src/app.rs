use synctime_business::{AuthCompute, CheckHealthCommand, LogoutCommand, Route};

use crate::pages;
use crate::state::State;
use crate::widgets;

/// The eframe application shell: top bar plus the route-switched central
/// panel.
pub struct SyncTimeApp {
    state: State,
    records_page: pages::RecordsPageState,
    calendar_page: pages::CalendarPageState,
    settings_page: pages::SettingsPageState,
    checked_health: bool,
}

impl SyncTimeApp {
    /// Called once before the first frame.
    pub fn new(state: State) -> Self {
        Self {
            state,
            records_page: pages::RecordsPageState::default(),
            calendar_page: pages::CalendarPageState::default(),
            settings_page: pages::SettingsPageState::default(),
            checked_health: false,
        }
    }
}

impl eframe::App for SyncTimeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply results that arrived since last frame.
        self.state.ctx.sync_computes();

        if !self.checked_health {
            self.state.ctx.enqueue_command::<CheckHealthCommand>();
            self.checked_health = true;
        }

        let authenticated = self
            .state
            .ctx
            .cached::<AuthCompute>()
            .is_some_and(|a| a.is_authenticated());
        let username = self
            .state
            .ctx
            .cached::<AuthCompute>()
            .and_then(|a| a.username().map(str::to_owned));

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                widgets::api_status(&self.state.ctx, ui);
                ui.separator();

                if authenticated {
                    let current = *self.state.ctx.state::<Route>();
                    for route in Route::navigable() {
                        if ui
                            .selectable_label(current == *route, route.title())
                            .clicked()
                        {
                            *self.state.ctx.state_mut::<Route>() = *route;
                        }
                    }
                    ui.separator();

                    widgets::notifications_bell(&mut self.state.ctx, ui);
                    if let Some(username) = &username {
                        ui.weak(username);
                    }
                    if ui.button("Sign out").clicked() {
                        self.state.ctx.enqueue_command::<LogoutCommand>();
                        *self.state.ctx.state_mut::<Route>() = Route::Login;
                    }
                }

                widgets::env_version(ui);
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if !authenticated {
                pages::login_page(&mut self.state.ctx, ui);
                return;
            }
            // Move past the login route on the first authenticated frame.
            if *self.state.ctx.state::<Route>() == Route::Login {
                *self.state.ctx.state_mut::<Route>() = Route::Records;
            }

            let route = *self.state.ctx.state::<Route>();
            match route {
                Route::Login | Route::Records => {
                    pages::records_page(&mut self.state.ctx, ui, &mut self.records_page);
                }
                Route::Calendar => {
                    pages::calendar_page(&mut self.state.ctx, ui, &mut self.calendar_page);
                }
                Route::Settings => {
                    pages::settings_page(&mut self.state.ctx, ui, &mut self.settings_page);
                }
            }
        });

        // Start queued async work and re-run dirty derived computes.
        self.state.ctx.flush_commands();
        self.state.ctx.run_computed();
    }
}
