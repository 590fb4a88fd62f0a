//! Installation lock backed by a sentinel parameter in the game's own
//! `config.ini`.
//!
//! The presence of `snap_hutao_installing=` in the configuration file marks
//! the directory as "being installed". The file itself is the token: the
//! claim survives crashes and restarts, and an interrupted install is
//! detected on the next attempt simply by finding the sentinel again.
//!
//! Exclusivity is advisory. A second launcher that observes the sentinel
//! must treat the directory as busy instead of writing into it.
//!
//! # Acquisition
//!
//! | Directory | `config.ini` | Sentinel | Result |
//! |---|---|---|---|
//! | missing / empty | - | - | generate config, add sentinel, [`AcquireKind::Fresh`] |
//! | non-empty | absent | - | [`AcquireFailure::AmbiguousInstallState`] |
//! | non-empty | present | absent | [`AcquireFailure::AlreadyInstalledUnclaimed`] |
//! | non-empty | present | present | [`AcquireKind::Resumed`], file untouched |

use crate::models::{IniElement, LaunchScheme};
use crate::services::game_file_system::{GameFileSystem, GameFileSystemError};
use crate::services::ini::{self, IniError};
use camino::Utf8Path;
use std::fmt;
use std::fs;
use thiserror::Error;

/// Parameter key whose presence marks an installation in progress
pub const INSTALLING_SENTINEL: &str = "snap_hutao_installing";

/// Errors raised while acquiring or releasing the installation lock.
///
/// Expected outcomes of acquisition (an already installed directory, an
/// unrecognizable one) are reported through [`AcquireResult::Failed`]
/// instead.
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("Sentinel snap_hutao_installing expected once in {path}, found {found}")]
    InconsistentState { path: String, found: usize },

    #[error("Installation lock for {0} was already released")]
    Fatal(String),

    #[error("Failed to inspect game directory {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Ini(#[from] IniError),

    #[error(transparent)]
    GameFileSystem(#[from] GameFileSystemError),
}

/// Why a lock could not be acquired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireFailure {
    /// The directory has content but no `config.ini`
    AmbiguousInstallState,

    /// `config.ini` exists without the sentinel: a complete installation
    /// that nobody is installing into
    AlreadyInstalledUnclaimed,
}

impl fmt::Display for AcquireFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AmbiguousInstallState => {
                f.write_str("directory is not empty and holds no recognizable game installation")
            }
            Self::AlreadyInstalledUnclaimed => {
                f.write_str("directory holds an installation that is not being installed")
            }
        }
    }
}

/// How a lock came to be held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireKind {
    /// A new configuration file was generated for an empty directory
    Fresh,

    /// The sentinel of an earlier, unfinished installation was found
    Resumed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LockState {
    Claimed,
    Released,
}

/// Outcome of [`GameInstallPrerequisite::try_acquire`]
#[derive(Debug)]
pub enum AcquireResult<'a> {
    Acquired(GameInstallPrerequisite<'a>),
    Failed(AcquireFailure),
}

impl<'a> AcquireResult<'a> {
    pub fn is_acquired(&self) -> bool {
        matches!(self, Self::Acquired(_))
    }

    pub fn into_lock(self) -> Option<GameInstallPrerequisite<'a>> {
        match self {
            Self::Acquired(lock) => Some(lock),
            Self::Failed(_) => None,
        }
    }
}

/// A claim on a game directory for the duration of an install or update.
///
/// Only [`try_acquire`](Self::try_acquire) creates one. Call
/// [`release`](Self::release) on every successful exit path; dropping the
/// lock without releasing deliberately leaves the sentinel behind so the
/// next attempt resumes.
#[derive(Debug)]
pub struct GameInstallPrerequisite<'a> {
    game_file_system: &'a GameFileSystem,
    kind: AcquireKind,
    state: LockState,
}

impl<'a> GameInstallPrerequisite<'a> {
    /// Tests whether an installation may proceed in the directory of
    /// `game_file_system` and claims it if so.
    ///
    /// `version` and `scheme` are only used when the directory is empty and
    /// a configuration file has to be generated.
    pub fn try_acquire(
        game_file_system: &'a GameFileSystem,
        version: &str,
        scheme: &LaunchScheme,
    ) -> Result<AcquireResult<'a>, InstallError> {
        let game_directory = game_file_system.game_directory();
        let config_path = game_file_system.game_config_file_path();

        if directory_has_entries(game_directory)? {
            if !config_path.exists() {
                tracing::warn!(
                    "Refusing to install into {}: directory is not empty and has no {}",
                    game_directory,
                    config_path
                );
                return Ok(AcquireResult::Failed(AcquireFailure::AmbiguousInstallState));
            }

            let elements = ini::deserialize_from_file(&config_path)?;
            if !ini::contains_parameter(&elements, INSTALLING_SENTINEL) {
                tracing::info!("{} holds an unclaimed installation", game_directory);
                return Ok(AcquireResult::Failed(
                    AcquireFailure::AlreadyInstalledUnclaimed,
                ));
            }

            tracing::warn!(
                "Resuming unfinished installation in {}",
                game_directory
            );
            return Ok(AcquireResult::Acquired(Self::claimed(
                game_file_system,
                AcquireKind::Resumed,
            )));
        }

        game_file_system.generate_configuration_file(version, scheme)?;

        let mut elements = ini::deserialize_from_file(&config_path)?;
        elements.push(IniElement::parameter(INSTALLING_SENTINEL, ""));
        ini::serialize_to_file(&config_path, &elements)?;

        tracing::info!("Claimed {} for installing version {}", game_directory, version);
        Ok(AcquireResult::Acquired(Self::claimed(
            game_file_system,
            AcquireKind::Fresh,
        )))
    }

    fn claimed(game_file_system: &'a GameFileSystem, kind: AcquireKind) -> Self {
        Self {
            game_file_system,
            kind,
            state: LockState::Claimed,
        }
    }

    pub fn kind(&self) -> AcquireKind {
        self.kind
    }

    pub fn game_file_system(&self) -> &'a GameFileSystem {
        self.game_file_system
    }

    pub fn is_released(&self) -> bool {
        self.state == LockState::Released
    }

    /// Removes the sentinel from `config.ini`, ending the claim.
    ///
    /// Fails with [`InstallError::InconsistentState`] (file untouched) unless
    /// exactly one sentinel is present, and with [`InstallError::Fatal`] if
    /// this lock was already released.
    pub fn release(&mut self) -> Result<(), InstallError> {
        let game_directory = self.game_file_system.game_directory();
        if self.state == LockState::Released {
            tracing::error!("Installation lock for {} released twice", game_directory);
            return Err(InstallError::Fatal(game_directory.to_string()));
        }

        let config_path = self.game_file_system.game_config_file_path();
        let mut elements = ini::deserialize_from_file(&config_path)?;

        let found = ini::count_parameter(&elements, INSTALLING_SENTINEL);
        if found != 1 {
            tracing::error!(
                "Cannot release {}: sentinel found {} times",
                config_path,
                found
            );
            return Err(InstallError::InconsistentState {
                path: config_path.to_string(),
                found,
            });
        }

        elements.retain(|e| !e.is_parameter(INSTALLING_SENTINEL));
        ini::serialize_to_file(&config_path, &elements)?;

        self.state = LockState::Released;
        tracing::info!("Released installation lock for {}", game_directory);
        Ok(())
    }
}

/// Returns true if `game_file_system`'s configuration file carries the
/// installing sentinel. A missing configuration file means no.
pub fn is_installing(game_file_system: &GameFileSystem) -> Result<bool, InstallError> {
    let config_path = game_file_system.game_config_file_path();
    if !config_path.exists() {
        return Ok(false);
    }

    let elements = ini::deserialize_from_file(&config_path)?;
    Ok(ini::contains_parameter(&elements, INSTALLING_SENTINEL))
}

fn directory_has_entries(dir: &Utf8Path) -> Result<bool, InstallError> {
    if !dir.exists() {
        return Ok(false);
    }

    let mut entries = fs::read_dir(dir).map_err(|source| InstallError::Io {
        path: dir.to_string(),
        source,
    })?;
    Ok(entries.next().is_some())
}
