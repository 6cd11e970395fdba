use eframe::egui;

use crate::common::Theme;
use crate::storage::LocalStore;
use crate::storage::local_store::THEME_KEY;

pub fn load_theme(storage: &LocalStore) -> Theme {
    match storage.get(THEME_KEY) {
        Ok(Some(value)) => Theme::parse(&value).unwrap_or_else(|| {
            log::warn!("Ignoring unknown stored theme `{value}`");
            Theme::default()
        }),
        Ok(None) => Theme::default(),
        Err(err) => {
            log::warn!("Failed to read theme preference: {err}");
            Theme::default()
        }
    }
}

pub fn save_theme(storage: &LocalStore, theme: Theme) {
    if let Err(err) = storage.set(THEME_KEY, theme.as_str()) {
        log::warn!("Failed to persist theme preference: {err}");
    }
}

pub fn apply(ctx: &egui::Context, theme: Theme) {
    let visuals = match theme {
        Theme::Light => egui::Visuals::light(),
        Theme::Dark => egui::Visuals::dark(),
    };
    ctx.set_visuals(visuals);
}
