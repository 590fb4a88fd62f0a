//! Services module - installation coordination for a game directory.
//!
//! Everything here is synchronous file-system work except the launcher,
//! which hands off to the game process with tokio.
//!
//! # Components
//!
//! - [`ini`]: ordered, lossless codec for the game's `config.ini`, with
//!   atomic writes
//! - [`GameFileSystem`]: resolves install root, executable, `config.ini` and
//!   version marker paths for the CN or Overseas client, and generates a
//!   fresh `config.ini`
//! - [`GameInstallPrerequisite`]: the installation lock. Claims a directory by
//!   writing the `snap_hutao_installing` sentinel into `config.ini`:
//!   - [`AcquireResult::Acquired`] with [`AcquireKind::Fresh`] for an empty
//!     directory, [`AcquireKind::Resumed`] when the sentinel is already there
//!   - [`AcquireResult::Failed`] for a directory that holds an unclaimed
//!     installation or something unrecognizable
//! - [`channel_options`]: reads the channel back, matches it against the known
//!   launch schemes and repairs a missing `config.ini`
//! - [`GameLauncher`]: spawns the game, refusing while an installation is in
//!   progress
//!
//! # Usage Example
//!
//! ```ignore
//! use hutao_install::services::{AcquireResult, GameFileSystem, GameInstallPrerequisite};
//! use hutao_install::models::KnownLaunchSchemes;
//!
//! let scheme = KnownLaunchSchemes::default_for_variant(false);
//! let game = GameFileSystem::new("D:/Genshin Impact Game", scheme);
//!
//! match GameInstallPrerequisite::try_acquire(&game, "5.0.0", scheme)? {
//!     AcquireResult::Acquired(mut lock) => {
//!         // copy / patch files ...
//!         lock.release()?;
//!     }
//!     AcquireResult::Failed(reason) => eprintln!("cannot install: {reason}"),
//! }
//! ```

pub mod channel_options;
pub mod game_file_system;
pub mod ini;
pub mod install_prerequisite;
pub mod launcher;

pub use channel_options::{
    ChannelOptionsError, current_launch_scheme, read_channel_options, repair_configuration_file,
};
pub use game_file_system::{GameFileSystem, GameFileSystemError};
pub use ini::IniError;
pub use install_prerequisite::{
    AcquireFailure, AcquireKind, AcquireResult, GameInstallPrerequisite, INSTALLING_SENTINEL,
    InstallError, is_installing,
};
pub use launcher::{GameLauncher, LaunchError};
