use crate::models::LauncherSettings;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use ::config::{Config, Environment, File, FileFormat};
use std::fs;

/// Prefix of environment variables that override settings
/// (`HUTAO_DEBUG_MODE=true`, `HUTAO_GAME_PATH=...`)
pub const ENV_PREFIX: &str = "HUTAO";

/// Settings manager for loading and saving the launcher settings file.
///
/// Settings are layered: built-in defaults, then `hutao-install.yaml` in the
/// settings directory, then environment variables.
#[derive(Debug, Clone)]
pub struct SettingsManager {
    settings_dir: Utf8PathBuf,
    settings_path: Utf8PathBuf,
    env_prefix: String,
}

impl SettingsManager {
    /// Create a new SettingsManager with the specified settings directory.
    ///
    /// # Arguments
    /// * `settings_dir` - Directory containing the settings file, created if missing
    pub fn new<P: AsRef<Utf8Path>>(settings_dir: P) -> Result<Self> {
        Self::with_env_prefix(settings_dir, ENV_PREFIX)
    }

    /// Like [`new`](Self::new), reading overrides from `<env_prefix>_*` variables.
    pub fn with_env_prefix<P: AsRef<Utf8Path>>(settings_dir: P, env_prefix: &str) -> Result<Self> {
        let settings_dir = settings_dir.as_ref().to_path_buf();

        if !settings_dir.exists() {
            fs::create_dir_all(&settings_dir)
                .with_context(|| format!("Failed to create settings directory: {}", settings_dir))?;
        }

        Ok(Self {
            settings_path: settings_dir.join("hutao-install.yaml"),
            settings_dir,
            env_prefix: env_prefix.to_string(),
        })
    }

    /// Load the launcher settings.
    ///
    /// # Returns
    /// The merged settings; defaults for anything neither the file nor the
    /// environment sets
    pub fn load(&self) -> Result<LauncherSettings> {
        if !self.settings_path.exists() {
            tracing::warn!(
                "Settings file not found at {}, using defaults",
                self.settings_path
            );
        }

        let merged = Config::builder()
            .add_source(File::new(self.settings_path.as_str(), FileFormat::Yaml).required(false))
            .add_source(Environment::with_prefix(&self.env_prefix).try_parsing(true))
            .build()
            .with_context(|| format!("Failed to read settings: {}", self.settings_path))?;

        let settings: LauncherSettings = merged
            .try_deserialize()
            .with_context(|| format!("Failed to parse settings: {}", self.settings_path))?;

        tracing::info!("Loaded settings from {}", self.settings_path);
        Ok(settings)
    }

    /// Save the launcher settings.
    ///
    /// # Arguments
    /// * `settings` - The LauncherSettings to save
    pub fn save(&self, settings: &LauncherSettings) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(settings).context("Failed to serialize settings to YAML")?;

        fs::write(&self.settings_path, yaml_string)
            .with_context(|| format!("Failed to write settings: {}", self.settings_path))?;

        tracing::info!("Saved settings to {}", self.settings_path);
        Ok(())
    }

    /// Get the settings directory path.
    pub fn settings_dir(&self) -> &Utf8Path {
        &self.settings_dir
    }

    pub fn settings_path(&self) -> &Utf8Path {
        &self.settings_path
    }
}
