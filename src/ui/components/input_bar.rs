use eframe::egui;

/// Single-line input with a Send button. Returns `true` when the user asked to
/// send. While `can_send` is false the draft can be edited but not sent.
pub fn render(ui: &mut egui::Ui, input_text: &mut String, can_send: bool) -> bool {
    let mut send = false;
    ui.horizontal(|ui| {
        let response = ui.add(
            egui::TextEdit::singleline(input_text)
                .hint_text("Type a message...")
                .desired_width(ui.available_width() - 60.0),
        );
        if ui.add_enabled(can_send, egui::Button::new("Send")).clicked() {
            send = true;
        }

        if can_send && response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            send = true;
            response.request_focus();
        }
    });
    send
}
