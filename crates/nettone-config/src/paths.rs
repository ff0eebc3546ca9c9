//! Platform-specific configuration paths.
//!
//! - Linux: `~/.config/nettone/config.toml`
//! - macOS: `~/Library/Application Support/nettone/config.toml`
//! - Windows: `%APPDATA%\nettone\config.toml`

use std::path::PathBuf;

/// Application name used for directory paths.
const APP_NAME: &str = "nettone";

/// File name of the main configuration file.
const CONFIG_FILE: &str = "config.toml";

/// Returns the user-specific configuration directory.
///
/// Falls back to the current directory if the platform directory cannot be
/// determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the default configuration file path.
pub fn default_config_path() -> PathBuf {
    user_config_dir().join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_file_lives_in_app_dir() {
        let path = default_config_path();
        assert!(path.ends_with("nettone/config.toml"));
        assert_eq!(path.parent(), Some(user_config_dir().as_path()));
    }
}
