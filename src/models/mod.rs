//! Data models shared by the services.
//!
//! - [`IniElement`]: one line of a `config.ini` file
//! - [`LaunchScheme`] / [`KnownLaunchSchemes`]: channel, sub-channel and region of a game distribution
//! - [`ChannelOptions`]: channel values read back from an installation
//! - [`LauncherSettings`]: launcher settings loaded by [`SettingsManager`](crate::config::SettingsManager)

pub mod ini;
pub mod scheme;
pub mod settings;

pub use ini::IniElement;
pub use scheme::{
    ChannelOptions, ChannelType, KnownLaunchSchemes, LaunchScheme, SubChannelType, constants,
    executable_is_oversea,
};
pub use settings::LauncherSettings;
