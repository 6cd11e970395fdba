use tokio::sync::mpsc;

use crate::common::{NetworkCommand, NetworkEvent};

use super::api::ApiClient;

/// Background worker that executes UI commands against the remote API and
/// reports results as [`NetworkEvent`]s.
pub struct NetworkClient {
    api: ApiClient,
    event_sender: mpsc::Sender<NetworkEvent>,
    command_receiver: mpsc::Receiver<NetworkCommand>,
}

impl NetworkClient {
    pub fn new(
        api: ApiClient,
        event_sender: mpsc::Sender<NetworkEvent>,
        command_receiver: mpsc::Receiver<NetworkCommand>,
    ) -> Self {
        Self {
            api,
            event_sender,
            command_receiver,
        }
    }

    /// Runs until every command sender is dropped.
    pub async fn run(mut self) {
        log::info!("Network worker started");
        while let Some(command) = self.command_receiver.recv().await {
            self.handle_command(command).await;
        }
        log::info!("Network worker stopped");
    }

    async fn handle_command(&mut self, command: NetworkCommand) {
        match command {
            NetworkCommand::Login {
                username,
                password,
                expires_in_mins,
            } => {
                let event = match self.api.login(&username, &password, expires_in_mins).await {
                    Ok(credential) => {
                        log::info!("Logged in as {}", credential.username);
                        NetworkEvent::LoggedIn(credential)
                    }
                    Err(err) => NetworkEvent::LoginFailed(err.to_string()),
                };

                if let Err(err) = self.event_sender.send(event).await {
                    log::warn!("Failed to notify UI about login result: {err}");
                }
            }
        }
    }
}
