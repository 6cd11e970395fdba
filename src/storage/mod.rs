pub mod database;
pub mod local_store;

pub use local_store::LocalStore;

use std::fs;
use std::path::{Path, PathBuf};

pub const STORAGE_FILE: &str = "client.db";

/// Ensure the data directory exists and return the storage file path inside it.
pub fn ensure_data_dir(dir: &Path) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    Ok(dir.join(STORAGE_FILE))
}
