use eframe::egui;

use crate::common::{ChannelState, Origin};
use crate::network::RealtimeChannel;

use super::input_bar;

#[derive(Debug, Default)]
pub struct ChatActions {
    pub send: bool,
    pub close: bool,
    pub reopen: bool,
}

pub fn render(
    ui: &mut egui::Ui,
    channel: &RealtimeChannel,
    input_text: &mut String,
    send_error: Option<&str>,
) -> ChatActions {
    let mut actions = ChatActions::default();

    ui.horizontal(|ui| {
        ui.heading("Chat");
        ui.label(egui::RichText::new(channel.state().to_string()).weak());
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Close").clicked() {
                actions.close = true;
            }
            if channel.state() == ChannelState::Failed && ui.button("Reconnect").clicked() {
                actions.reopen = true;
            }
        });
    });
    ui.separator();

    let transcript_height = (ui.available_height() - 40.0).max(0.0);
    egui::ScrollArea::vertical()
        .max_height(transcript_height)
        .auto_shrink([false; 2])
        .stick_to_bottom(true)
        .show(ui, |ui| {
            for message in channel.transcript() {
                let (layout, color) = match message.origin {
                    Origin::Local => (
                        egui::Layout::right_to_left(egui::Align::TOP),
                        egui::Color32::from_rgb(37, 99, 235),
                    ),
                    Origin::Remote => (
                        egui::Layout::left_to_right(egui::Align::TOP),
                        ui.visuals().text_color(),
                    ),
                };
                ui.with_layout(layout, |ui| {
                    ui.colored_label(color, &message.text);
                });
            }
        });

    ui.separator();
    let open = channel.state() == ChannelState::Open;
    if let Some(error) = send_error {
        ui.colored_label(egui::Color32::RED, error);
    } else if !open {
        ui.weak(format!("Not connected ({})", channel.state()));
    }
    actions.send = input_bar::render(ui, input_text, open);
    actions
}
