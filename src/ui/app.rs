use std::sync::Arc;

use eframe::egui;
use tokio::sync::mpsc;

use crate::common::error::GENERIC_LOGIN_FAILURE;
use crate::common::{NetworkCommand, NetworkEvent, Theme};
use crate::config::AppConfig;
use crate::network::ApiClient;
use crate::session::{NavigationGate, Route, SessionStore};
use crate::workspace::Workspace;

use super::components::{chat_panel, feed_list, login_form, nav_bar};
use super::state::AppState;
use super::theme;

pub struct FeedApp {
    state: AppState,
    login_expires_in_mins: u32,
    workspace: Workspace<ApiClient>,
    command_sender: mpsc::Sender<NetworkCommand>,
    event_receiver: mpsc::Receiver<NetworkEvent>,
    applied_theme: Option<Theme>,
}

impl FeedApp {
    pub fn new(
        config: AppConfig,
        session: SessionStore,
        api: Arc<ApiClient>,
        command_sender: mpsc::Sender<NetworkCommand>,
        event_receiver: mpsc::Receiver<NetworkEvent>,
    ) -> Self {
        let theme = theme::load_theme(session.storage());
        let route = NavigationGate::new(&session).resolve(Route::Home);
        Self {
            state: AppState::new(route, theme),
            login_expires_in_mins: config.login_expires_in_mins,
            workspace: Workspace::new(session, api, &config),
            command_sender,
            event_receiver,
            applied_theme: None,
        }
    }

    fn handle_network_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            match event {
                NetworkEvent::LoggedIn(credential) => match self.workspace.sign_in(credential) {
                    Ok(()) => {
                        self.state.login.succeeded();
                        self.state.route = Route::Home;
                    }
                    Err(err) => {
                        log::error!("Failed to persist credential: {err}");
                        self.state.login.failed(err.to_string());
                    }
                },
                NetworkEvent::LoginFailed(message) => self.state.login.failed(message),
            }
        }
    }

    fn submit_login(&mut self) {
        let Some(command) = self.state.login.submit(self.login_expires_in_mins) else {
            return;
        };
        if let Err(err) = self.command_sender.try_send(command) {
            log::warn!("Failed to send login command to network: {err}");
            self.state.login.failed(GENERIC_LOGIN_FAILURE.to_string());
        }
    }

    fn logout(&mut self) {
        if let Err(err) = self.workspace.logout() {
            log::error!("Failed to clear credential: {err}");
            return;
        }
        self.state.close_chat();
        self.state.route = Route::Login;
    }

    fn toggle_theme(&mut self) {
        self.state.theme = self.state.theme.toggled();
        theme::save_theme(self.workspace.session().storage(), self.state.theme);
    }

    fn open_chat(&mut self) {
        self.state.chat_open = true;
        self.state.chat_error = None;
        self.workspace.open_chat();
    }

    fn close_chat(&mut self) {
        self.state.close_chat();
        self.workspace.close_chat();
    }

    fn send_chat(&mut self) {
        match self.workspace.send_chat(&mut self.state.chat_input) {
            Ok(_) => self.state.chat_error = None,
            Err(err) => {
                log::warn!("Chat send failed: {err}");
                self.state.chat_error = Some(err.to_string());
            }
        }
    }

    fn render_home(&mut self, ctx: &egui::Context) {
        self.workspace.ensure_feed_started();

        let username = self.workspace.session().username().map(str::to_owned);
        let nav = egui::TopBottomPanel::top("nav_bar")
            .show(ctx, |ui| nav_bar::render(ui, username.as_deref(), self.state.theme))
            .inner;
        if nav.logout {
            self.logout();
            return;
        }
        if nav.toggle_theme {
            self.toggle_theme();
        }
        if nav.open_chat {
            self.open_chat();
        }

        if self.state.chat_open {
            if let Some(channel) = self.workspace.chat() {
                let actions = egui::SidePanel::right("chat_panel")
                    .resizable(true)
                    .default_width(360.0)
                    .show(ctx, |ui| {
                        chat_panel::render(
                            ui,
                            channel,
                            &mut self.state.chat_input,
                            self.state.chat_error.as_deref(),
                        )
                    })
                    .inner;
                if actions.send {
                    self.send_chat();
                }
                if actions.reopen {
                    self.open_chat();
                }
                if actions.close {
                    self.close_chat();
                }
            }
        }

        let view = egui::CentralPanel::default()
            .show(ctx, |ui| feed_list::render(ui, self.workspace.feed().state()))
            .inner;
        if view.retry {
            self.workspace.feed_mut().load_next();
        } else {
            self.workspace.observe_viewport(view.viewport);
        }
    }
}

impl eframe::App for FeedApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_network_events();
        self.workspace.poll();

        if self.applied_theme != Some(self.state.theme) {
            theme::apply(ctx, self.state.theme);
            self.applied_theme = Some(self.state.theme);
        }

        self.state.route = NavigationGate::new(self.workspace.session()).resolve(self.state.route);
        match self.state.route {
            Route::Login => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    if login_form::render(ui, &mut self.state.login) {
                        self.submit_login();
                    }
                });
            }
            Route::Home => self.render_home(ctx),
        }

        ctx.request_repaint();
    }
}
