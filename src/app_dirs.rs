use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "kwiz";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// State directory: `$HOME/.local/state/kwiz`, falling back to the platform data dir
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join(APP_NAME),
            )
        } else {
            ProjectDirs::from("", "", APP_NAME).map(|pd| pd.data_local_dir().to_path_buf())
        }
    }

    pub fn db_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("kwiz.db"))
    }

    pub fn log_dir() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("logs"))
    }

    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|pd| pd.config_dir().join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_share_state_dir() {
        if let (Some(state), Some(db), Some(logs)) =
            (AppDirs::state_dir(), AppDirs::db_path(), AppDirs::log_dir())
        {
            assert!(db.starts_with(&state));
            assert!(logs.starts_with(&state));
            assert_eq!(db.file_name().and_then(|n| n.to_str()), Some("kwiz.db"));
        }
    }
}
