mod config;
pub mod database;

pub use config::{
    CelebrationConfig, Config, CountdownConfig, ShortcutsConfig, SiteConfig,
};
pub use database::{CountdownOutcome, CountdownRecord, Database};

use std::path::PathBuf;

/// Returns `~/.config/launchgate[-dev]/` based on LAUNCHGATE_ENV.
///
/// Set LAUNCHGATE_ENV=dev to use the development data directory, or
/// LAUNCHGATE_DATA_DIR to override the location outright (tests do this
/// to stay isolated).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var("LAUNCHGATE_DATA_DIR") {
        Ok(explicit) => PathBuf::from(explicit),
        Err(_) => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("LAUNCHGATE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("launchgate-dev")
            } else {
                base_dir.join("launchgate")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
