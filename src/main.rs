use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use tokio::sync::mpsc;

use feed_chat_client::common::StorageError;
use feed_chat_client::config;
use feed_chat_client::network::{ApiClient, NetworkClient};
use feed_chat_client::session::SessionStore;
use feed_chat_client::storage::{self, LocalStore};
use feed_chat_client::ui::FeedApp;

#[derive(Parser)]
#[command(
    name = "feed_chat_client",
    version,
    about = "Authenticated post feed with a realtime chat panel"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    /// Directory holding the durable client storage (overrides the config file)
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let mut app_config = config::load_config(&cli.config);
    if let Some(data_dir) = cli.data_dir {
        app_config.data_dir = data_dir;
    }

    let (session, storage_path) = open_session(&app_config.data_dir)
        .inspect_err(|err| log::error!("Failed to open client storage: {err}"))?;
    let api = Arc::new(
        ApiClient::from_config(&app_config)
            .inspect_err(|err| log::error!("Invalid endpoint URL in config: {err}"))?,
    );

    // UI -> Network
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    // Network -> UI
    let (event_tx, event_rx) = mpsc::channel(16);

    let worker = NetworkClient::new(ApiClient::clone(&api), event_tx, cmd_rx);
    tokio::spawn(worker.run());

    log::info!(
        "Client started (storage: {}, authenticated: {})",
        storage_path.display(),
        session.is_authenticated()
    );

    let app = FeedApp::new(app_config, session, api, cmd_tx, event_rx);
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Feed Chat Client",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )?;

    Ok(())
}

fn open_session(data_dir: &Path) -> Result<(SessionStore, PathBuf), StorageError> {
    let storage_path = storage::ensure_data_dir(data_dir)?;
    let session = SessionStore::load(LocalStore::open(&storage_path)?)?;
    Ok((session, storage_path))
}
