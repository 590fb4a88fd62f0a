//! Reading channel options back out of an installation's `config.ini` and
//! repairing a missing configuration file.

use crate::models::{ChannelOptions, KnownLaunchSchemes, LaunchScheme};
use crate::services::game_file_system::{GameFileSystem, GameFileSystemError};
use crate::services::ini::{self, IniError};
use crate::services::install_prerequisite::INSTALLING_SENTINEL;
use camino::Utf8Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChannelOptionsError {
    #[error("Game path is not configured")]
    GamePathNullOrEmpty,

    #[error("Configuration file not found: {0}")]
    ConfigurationFileNotFound(String),

    #[error("Parameter {key} in {path} is missing or not a number")]
    InvalidParameter { path: String, key: &'static str },

    #[error("Launch scheme is for the {scheme} client but the installation is the {installation} client")]
    SchemeVariantMismatch {
        scheme: &'static str,
        installation: &'static str,
    },

    #[error("Configuration file already exists: {0}")]
    ConfigurationFileExists(String),

    #[error("An installation is in progress, {0} carries the installing sentinel")]
    InstallationInProgress(String),

    #[error("No game version could be read from {0}")]
    VersionUnavailable(String),

    #[error(transparent)]
    Ini(#[from] IniError),

    #[error(transparent)]
    GameFileSystem(#[from] GameFileSystemError),
}

fn variant_name(is_oversea: bool) -> &'static str {
    if is_oversea { "Overseas" } else { "CN" }
}

impl ChannelOptionsError {
    /// Returns true for the states a user can fix by setting the game path or
    /// repairing the configuration file
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::GamePathNullOrEmpty | Self::ConfigurationFileNotFound(_)
        )
    }
}

/// Reads `channel` and `sub_channel` from the `config.ini` next to the game
/// executable at `game_path`.
pub fn read_channel_options(game_path: Option<&Utf8Path>) -> Result<ChannelOptions, ChannelOptionsError> {
    let game_path = match game_path {
        Some(path) if !path.as_str().trim().is_empty() => path,
        _ => return Err(ChannelOptionsError::GamePathNullOrEmpty),
    };

    let game_file_system = GameFileSystem::from_executable(game_path)?;
    let config_file_path = game_file_system.game_config_file_path();
    if !config_file_path.exists() {
        return Err(ChannelOptionsError::ConfigurationFileNotFound(
            config_file_path.to_string(),
        ));
    }

    let elements = ini::deserialize_from_file(&config_file_path)?;
    let parameters = ini::parameters(&elements);

    let number = |key: &'static str| -> Result<u32, ChannelOptionsError> {
        parameters
            .get(key)
            .and_then(|value| value.trim().parse().ok())
            .ok_or_else(|| ChannelOptionsError::InvalidParameter {
                path: config_file_path.to_string(),
                key,
            })
    };

    let options = ChannelOptions {
        channel: number("channel")?,
        sub_channel: number("sub_channel")?,
        is_oversea: game_file_system.is_oversea(),
        config_file_path: config_file_path.clone(),
    };

    tracing::debug!(
        "Read channel options from {}: channel={}, sub_channel={}",
        config_file_path,
        options.channel,
        options.sub_channel
    );
    Ok(options)
}

/// Resolves the launch scheme of the installation at `game_path`.
///
/// `Ok(None)` means the configuration file is readable but describes a
/// channel combination this launcher does not know.
pub fn current_launch_scheme(
    game_path: Option<&Utf8Path>,
) -> Result<Option<&'static LaunchScheme>, ChannelOptionsError> {
    let options = read_channel_options(game_path)?;
    let scheme = KnownLaunchSchemes::find(&options);
    if scheme.is_none() {
        tracing::warn!(
            "Unsupported channel options in {}: channel={}, sub_channel={}",
            options.config_file_path,
            options.channel,
            options.sub_channel
        );
    }
    Ok(scheme)
}

/// Regenerates a missing `config.ini` for an existing installation using the
/// version found in its `ScriptVersion` marker.
///
/// Refuses to touch a configuration file that is already there, and in
/// particular one claimed by an installation. Returns the version that was
/// written.
pub fn repair_configuration_file(
    game_file_system: &GameFileSystem,
    scheme: &LaunchScheme,
) -> Result<String, ChannelOptionsError> {
    if scheme.is_oversea != game_file_system.is_oversea() {
        return Err(ChannelOptionsError::SchemeVariantMismatch {
            scheme: variant_name(scheme.is_oversea),
            installation: variant_name(game_file_system.is_oversea()),
        });
    }

    let config_file_path = game_file_system.game_config_file_path();
    if config_file_path.exists() {
        let claimed = ini::deserialize_from_file(&config_file_path)
            .map(|elements| ini::contains_parameter(&elements, INSTALLING_SENTINEL))
            .unwrap_or(false);
        if claimed {
            tracing::warn!("Not repairing {}: installation in progress", config_file_path);
            return Err(ChannelOptionsError::InstallationInProgress(
                config_file_path.to_string(),
            ));
        }
        return Err(ChannelOptionsError::ConfigurationFileExists(
            config_file_path.to_string(),
        ));
    }

    let version = game_file_system.read_script_version()?.ok_or_else(|| {
        ChannelOptionsError::VersionUnavailable(game_file_system.script_version_file_path().to_string())
    })?;

    game_file_system.generate_configuration_file(&version, scheme)?;
    tracing::info!(
        "Repaired {} with version {}",
        game_file_system.game_config_file_path(),
        version
    );
    Ok(version)
}
