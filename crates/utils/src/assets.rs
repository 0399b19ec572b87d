use std::path::PathBuf;

use directories::ProjectDirs;

const DATABASE_FILE: &str = "alphalink.sqlite";

/// Per-user data directory, falling back to `./.alphalink` when the platform
/// reports no home directory.
pub fn asset_dir() -> PathBuf {
    match ProjectDirs::from("app", "alphalink", "alphalink") {
        Some(dirs) => dirs.data_dir().to_path_buf(),
        None => {
            tracing::warn!("No platform data directory, using ./.alphalink");
            PathBuf::from(".alphalink")
        }
    }
}

pub fn default_database_path() -> PathBuf {
    asset_dir().join(DATABASE_FILE)
}
