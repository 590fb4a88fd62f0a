//! Path resolution for a single game installation.
//!
//! A [`GameFileSystem`] is resolved once, either from the game executable's
//! path or from an install root plus a [`LaunchScheme`], and then only hands
//! out derived paths. The only writes it performs are
//! [`GameFileSystem::generate_configuration_file`], which goes through the
//! `config.ini` codec.
//!
//! # Layout
//!
//! ```text
//! <root>/
//!   YuanShen.exe | GenshinImpact.exe
//!   config.ini
//!   pkg_version
//!   YuanShen_Data | GenshinImpact_Data/
//!     Persistent/
//!       ScriptVersion
//! ```

use crate::models::constants;
use crate::models::{IniElement, LaunchScheme, executable_is_oversea};
use crate::services::ini::{self, IniError};
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use std::fs;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameFileSystemError {
    #[error("Game executable path has no parent directory or file name: {0}")]
    InvalidGamePath(Utf8PathBuf),

    #[error("Game version must not be empty")]
    InvalidVersion,

    #[error("Configuration file already exists: {0}")]
    ConfigurationFileExists(Utf8PathBuf),

    #[error("Failed to create game directory {path}: {source}")]
    CreateDirectory {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read version file {path}: {source}")]
    ReadVersion {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Ini(#[from] IniError),
}

/// Resolved on-disk layout of one game installation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameFileSystem {
    game_directory: Utf8PathBuf,
    game_file_name: String,
    is_oversea: bool,
}

impl GameFileSystem {
    /// Resolves the layout from the path of the game executable.
    ///
    /// The variant is decided by the executable's file name alone.
    pub fn from_executable<P: AsRef<Utf8Path>>(game_file_path: P) -> Result<Self, GameFileSystemError> {
        let game_file_path = game_file_path.as_ref();
        let invalid = || GameFileSystemError::InvalidGamePath(game_file_path.to_path_buf());

        let game_file_name = game_file_path.file_name().ok_or_else(invalid)?;
        let game_directory = game_file_path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .ok_or_else(invalid)?;

        Ok(Self {
            game_directory: game_directory.to_path_buf(),
            game_file_name: game_file_name.to_string(),
            is_oversea: executable_is_oversea(game_file_name),
        })
    }

    /// Resolves the layout of an install root for the variant the scheme
    /// distributes. Used for fresh installs, where no executable exists yet.
    pub fn new<P: AsRef<Utf8Path>>(game_directory: P, scheme: &LaunchScheme) -> Self {
        Self {
            game_directory: game_directory.as_ref().to_path_buf(),
            game_file_name: scheme.game_file_name().to_string(),
            is_oversea: scheme.is_oversea,
        }
    }

    pub fn game_directory(&self) -> &Utf8Path {
        &self.game_directory
    }

    pub fn game_file_name(&self) -> &str {
        &self.game_file_name
    }

    pub fn game_file_path(&self) -> Utf8PathBuf {
        self.game_directory.join(&self.game_file_name)
    }

    pub fn is_oversea(&self) -> bool {
        self.is_oversea
    }

    /// `YuanShen_Data` or `GenshinImpact_Data`
    pub fn data_folder_name(&self) -> &'static str {
        if self.is_oversea {
            constants::GENSHIN_IMPACT_DATA
        } else {
            constants::YUAN_SHEN_DATA
        }
    }

    pub fn data_directory(&self) -> Utf8PathBuf {
        self.game_directory.join(self.data_folder_name())
    }

    pub fn game_config_file_path(&self) -> Utf8PathBuf {
        self.game_directory.join(constants::CONFIG_FILE_NAME)
    }

    pub fn script_version_file_path(&self) -> Utf8PathBuf {
        self.data_directory().join("Persistent").join("ScriptVersion")
    }

    pub fn pkg_version_file_path(&self) -> Utf8PathBuf {
        self.game_directory.join(constants::PKG_VERSION_FILE_NAME)
    }

    /// Writes a minimal `config.ini` describing `version` and `scheme`.
    /// The install root is created if needed.
    ///
    /// An existing `config.ini` is never replaced; it may carry the
    /// installing sentinel or settings the launcher does not know about.
    pub fn generate_configuration_file(
        &self,
        version: &str,
        scheme: &LaunchScheme,
    ) -> Result<(), GameFileSystemError> {
        let version = version.trim();
        if version.is_empty() {
            return Err(GameFileSystemError::InvalidVersion);
        }

        let path = self.game_config_file_path();
        if path.exists() {
            tracing::warn!("Not generating {}: file already exists", path);
            return Err(GameFileSystemError::ConfigurationFileExists(path));
        }

        if !self.game_directory.exists() {
            fs::create_dir_all(&self.game_directory).map_err(|source| {
                GameFileSystemError::CreateDirectory {
                    path: self.game_directory.clone(),
                    source,
                }
            })?;
        }

        let elements = vec![
            IniElement::section("General"),
            IniElement::parameter("channel", scheme.channel.value().to_string()),
            IniElement::parameter("cps", "mihoyo"),
            IniElement::parameter("game_version", version),
            IniElement::parameter("sub_channel", scheme.sub_channel.value().to_string()),
            IniElement::parameter("sdk_version", ""),
            IniElement::parameter("game_biz", scheme.game_biz()),
        ];

        ini::serialize_to_file(&path, &elements)?;

        tracing::info!("Generated {} for version {} ({})", path, version, scheme);
        Ok(())
    }

    /// Reads the game version from `Persistent/ScriptVersion`.
    ///
    /// Returns `Ok(None)` if the marker file does not exist or holds no
    /// recognizable `major.minor.patch` version.
    pub fn read_script_version(&self) -> Result<Option<String>, GameFileSystemError> {
        let path = self.script_version_file_path();
        if !path.exists() {
            tracing::debug!("Version marker not found: {}", path);
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .map_err(|source| GameFileSystemError::ReadVersion { path, source })?;

        Ok(version_pattern()
            .find(&content)
            .map(|m| m.as_str().to_string()))
    }
}

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+\.\d+\.\d+").expect("Invalid version regex"))
}
