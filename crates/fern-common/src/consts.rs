use std::path::PathBuf;

use eyre::{Context as _, Result};
use once_cell::sync::Lazy;
use tracing::debug;

pub static ROOT_DATA_DIR: Lazy<PathBuf> = Lazy::new(data_dir_init);

fn data_dir_init() -> PathBuf {
    let dir = dirs::home_dir()
        .expect("failed to get home document directory")
        .join("Library/Application Support/.fern");

    init_dir(dir).expect("failed to create the root data directory")
}

fn init_dir(dir: PathBuf) -> Result<PathBuf> {
    if !dir.exists() {
        debug!("creating data directory at {}", dir.display());

        std::fs::create_dir_all(&dir).wrap_err_with(|| {
            format!("failed to create data directory at {}", dir.to_string_lossy())
        })?;
    };

    Ok(dir)
}
