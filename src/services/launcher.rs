use crate::services::game_file_system::GameFileSystem;
use crate::services::install_prerequisite::{self, InstallError};
use camino::Utf8PathBuf;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::{Child, Command};
use tokio::time::timeout;

/// Errors that can occur while handing off to the game process
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("An installation is in progress in {0}")]
    InstallationInProgress(Utf8PathBuf),

    #[error("Game executable not found: {0}")]
    ExecutableNotFound(Utf8PathBuf),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Process error: {0}")]
    ProcessError(#[from] std::io::Error),

    #[error(transparent)]
    Install(#[from] InstallError),
}

/// Starts the game client of a [`GameFileSystem`].
///
/// The launcher never starts a game whose directory is claimed by an
/// installation lock; the install may be running in another process or may
/// have been interrupted, and in both cases the files are not trustworthy.
#[derive(Debug, Clone, Default)]
pub struct GameLauncher {
    arguments: Vec<String>,
}

impl GameLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_arguments<I, S>(arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            arguments: arguments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Builds the command without checking any precondition
    pub fn command(&self, game_file_system: &GameFileSystem) -> Command {
        let mut command = Command::new(game_file_system.game_file_path());
        command
            .args(&self.arguments)
            .current_dir(game_file_system.game_directory());
        command
    }

    /// Spawns the game process. Must be called from within a tokio runtime.
    pub fn launch(&self, game_file_system: &GameFileSystem) -> Result<Child, LaunchError> {
        if install_prerequisite::is_installing(game_file_system)? {
            tracing::warn!(
                "Not launching {}: installation in progress",
                game_file_system.game_file_path()
            );
            return Err(LaunchError::InstallationInProgress(
                game_file_system.game_directory().to_path_buf(),
            ));
        }

        let game_file_path = game_file_system.game_file_path();
        if !game_file_path.is_file() {
            return Err(LaunchError::ExecutableNotFound(game_file_path));
        }

        tracing::info!("Launching {} {:?}", game_file_path, self.arguments);
        let child = self.command(game_file_system).spawn()?;
        Ok(child)
    }

    /// Waits for the game to exit, returning its exit code (-1 when killed
    /// by a signal).
    pub async fn wait(&self, mut child: Child, limit: Option<Duration>) -> Result<i32, LaunchError> {
        let start = Instant::now();

        let status = match limit {
            Some(limit) => timeout(limit, child.wait()).await.map_err(|_| {
                tracing::warn!("Game process still running after {:?}", limit);
                LaunchError::Timeout(limit)
            })??,
            None => child.wait().await?,
        };

        let exit_code = status.code().unwrap_or(-1);
        tracing::info!(
            "Game process exited after {:.2}s with exit code {}",
            start.elapsed().as_secs_f32(),
            exit_code
        );
        Ok(exit_code)
    }
}
