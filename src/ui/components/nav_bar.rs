use eframe::egui;

use crate::common::Theme;

#[derive(Debug, Default)]
pub struct NavActions {
    pub toggle_theme: bool,
    pub logout: bool,
    pub open_chat: bool,
}

pub fn render(ui: &mut egui::Ui, username: Option<&str>, theme: Theme) -> NavActions {
    let mut actions = NavActions::default();

    ui.horizontal(|ui| {
        ui.heading("Home");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Logout").clicked() {
                actions.logout = true;
            }
            let theme_label = match theme {
                Theme::Light => "Dark Mode",
                Theme::Dark => "Light Mode",
            };
            if ui.button(theme_label).clicked() {
                actions.toggle_theme = true;
            }
            if ui.button("Chat").clicked() {
                actions.open_chat = true;
            }
            ui.label(format!("Welcome, {}", username.unwrap_or_default()));
        });
    });

    actions
}
