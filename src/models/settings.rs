use crate::models::LaunchScheme;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Launcher settings from `hutao-install.yaml`
///
/// Every field has a default so a missing or partial file still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherSettings {
    /// Path of the game executable (`YuanShen.exe` or `GenshinImpact.exe`)
    pub game_path: Option<Utf8PathBuf>,

    /// Scheme used for fresh installs and configuration repairs
    pub scheme: Option<LaunchScheme>,

    pub log_dir: Utf8PathBuf,

    pub debug_mode: bool,

    /// Extra command line arguments passed to the game
    pub launch_arguments: Vec<String>,

    /// Seconds to wait for the game to exit; 0 waits forever
    pub launch_timeout: u64,
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            game_path: None,
            scheme: None,
            log_dir: Utf8PathBuf::from("logs"),
            debug_mode: false,
            launch_arguments: Vec::new(),
            launch_timeout: 0,
        }
    }
}
