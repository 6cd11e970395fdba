use eframe::egui;

use crate::ui::state::LoginForm;

/// Returns `true` when the form was submitted.
pub fn render(ui: &mut egui::Ui, form: &mut LoginForm) -> bool {
    let mut submit = false;

    ui.vertical_centered(|ui| {
        ui.add_space(80.0);
        ui.heading("Login");
        ui.add_space(16.0);

        ui.add(
            egui::TextEdit::singleline(&mut form.username)
                .hint_text("Username")
                .desired_width(240.0),
        );
        let password = ui.add(
            egui::TextEdit::singleline(&mut form.password)
                .hint_text("Password")
                .password(true)
                .desired_width(240.0),
        );
        if password.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            submit = true;
        }

        if let Some(error) = &form.error {
            ui.colored_label(egui::Color32::RED, error);
        }

        ui.add_space(8.0);
        let label = if form.submitting {
            "Logging in..."
        } else {
            "Login"
        };
        if ui
            .add_enabled(!form.submitting, egui::Button::new(label))
            .clicked()
        {
            submit = true;
        }
    });

    submit && !form.submitting
}
