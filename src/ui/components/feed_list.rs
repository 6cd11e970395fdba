use eframe::egui;

use crate::feed::{FeedPhase, FeedState, Viewport};

#[derive(Debug)]
pub struct FeedView {
    pub viewport: Viewport,
    pub retry: bool,
}

/// Renders the feed and reports the scroll position it ended up at.
pub fn render(ui: &mut egui::Ui, state: &FeedState) -> FeedView {
    let mut retry = false;

    let output = egui::ScrollArea::vertical()
        .auto_shrink([false; 2])
        .show(ui, |ui| {
            for post in &state.items {
                ui.group(|ui| {
                    ui.set_width(ui.available_width());
                    ui.label(egui::RichText::new(&post.title).strong().size(16.0));
                    ui.label(&post.body);
                });
                ui.add_space(8.0);
            }

            match &state.phase {
                FeedPhase::Loading { .. } => {
                    ui.vertical_centered(|ui| {
                        ui.spinner();
                        ui.label("Loading...");
                    });
                }
                FeedPhase::Failed(err) => {
                    ui.vertical_centered(|ui| {
                        ui.colored_label(egui::Color32::RED, err.to_string());
                        retry = ui.button("Retry").clicked();
                    });
                }
                FeedPhase::Exhausted => {
                    ui.vertical_centered(|ui| ui.weak("No more posts"));
                }
                FeedPhase::Idle => {}
            }
        });

    FeedView {
        viewport: Viewport {
            offset: output.state.offset.y,
            visible_height: output.inner_rect.height(),
            content_height: output.content_size.y,
        },
        retry,
    }
}
