// hutao-install - installation lock, config.ini codec and launch hand-off
// for Genshin Impact game clients.
//
// This is the library crate containing the core logic and data structures.
// The binary crate (main.rs) provides the command line entry point.

pub mod config;
pub mod logging;
pub mod models;
pub mod services;

// Re-export commonly used types for convenience
pub use config::SettingsManager;
pub use models::{IniElement, KnownLaunchSchemes, LaunchScheme, LauncherSettings};
pub use services::{AcquireResult, GameFileSystem, GameInstallPrerequisite};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
