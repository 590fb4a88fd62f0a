//! hutao-install - command line front end
//!
//! # Overview
//!
//! Thin operator surface over the library:
//! - `status`: variant, paths, installation lock and channel of an install
//! - `acquire` / `release`: claim or free a directory around an install
//! - `generate-config` / `repair`: write a fresh `config.ini`
//! - `channel`: show the launch scheme an installation uses
//! - `launch`: start the game unless an installation is in progress
//!
//! # Execution Flow
//!
//! 1. Parse arguments
//! 2. Load settings from `<settings-dir>/hutao-install.yaml` (+ `HUTAO_*` env)
//! 3. Initialize logging → `<log_dir>/hutao-install.<date>`
//! 4. Run the command; failures are logged and mapped to a non-zero exit code

use anyhow::{Context, Result, anyhow, bail};
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use hutao_install::models::{KnownLaunchSchemes, LaunchScheme};
use hutao_install::services::{
    self, AcquireResult, GameFileSystem, GameInstallPrerequisite, GameLauncher,
};
use hutao_install::{APP_NAME, LauncherSettings, SettingsManager, VERSION};
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "hutao-install",
    author,
    version,
    about = "Installation lock, config.ini and launch helper for Genshin Impact"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true, help = "Enable debug logging")]
    verbose: bool,

    #[arg(long, global = true, default_value = "settings", help = "Directory of hutao-install.yaml")]
    settings_dir: Utf8PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Show the state of a game installation")]
    Status {
        #[arg(long, help = "Path of YuanShen.exe or GenshinImpact.exe")]
        game: Option<Utf8PathBuf>,
    },

    #[command(about = "Claim a directory before installing into it")]
    Acquire {
        #[arg(help = "Install root directory")]
        dir: Utf8PathBuf,

        #[arg(long, help = "Game version written to a fresh config.ini")]
        version: String,

        #[command(flatten)]
        scheme: SchemeArgs,
    },

    #[command(about = "Remove the installation sentinel from a directory")]
    Release {
        #[arg(help = "Install root directory")]
        dir: Utf8PathBuf,

        #[command(flatten)]
        scheme: SchemeArgs,
    },

    #[command(about = "Write a fresh config.ini into a directory that has none")]
    GenerateConfig {
        #[arg(help = "Install root directory")]
        dir: Utf8PathBuf,

        #[arg(long, help = "Game version")]
        version: String,

        #[command(flatten)]
        scheme: SchemeArgs,
    },

    #[command(about = "Show the launch scheme an installation is configured for")]
    Channel {
        #[arg(long, help = "Path of YuanShen.exe or GenshinImpact.exe")]
        game: Option<Utf8PathBuf>,
    },

    #[command(about = "Regenerate a missing config.ini from the installed version")]
    Repair {
        #[arg(long, help = "Path of YuanShen.exe or GenshinImpact.exe")]
        game: Option<Utf8PathBuf>,

        #[command(flatten)]
        scheme: SchemeArgs,
    },

    #[command(about = "Launch the game")]
    Launch {
        #[arg(long, help = "Path of YuanShen.exe or GenshinImpact.exe")]
        game: Option<Utf8PathBuf>,

        #[arg(last = true, help = "Arguments passed to the game")]
        args: Vec<String>,
    },
}

#[derive(Args, Clone, Copy, Default)]
struct SchemeArgs {
    #[arg(long, help = "Global (Overseas) client instead of CN")]
    oversea: bool,

    #[arg(long, requires = "sub_channel", help = "channel value, e.g. 1 or 14")]
    channel: Option<u32>,

    #[arg(long, requires = "channel", help = "sub_channel value, e.g. 0, 1, 3")]
    sub_channel: Option<u32>,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let settings_manager = SettingsManager::new(&cli.settings_dir)?;
    let settings = settings_manager.load()?;

    let _guard = hutao_install::logging::setup_logging_with_console(
        &settings.log_dir,
        "hutao-install",
        settings.debug_mode || cli.verbose,
        true,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    match run(cli.command, &settings) {
        Ok(code) => Ok(code),
        Err(e) => {
            tracing::error!("{:#}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run(command: Commands, settings: &LauncherSettings) -> Result<ExitCode> {
    match command {
        Commands::Status { game } => status(&game_file_system(game, settings)?),
        Commands::Acquire {
            dir,
            version,
            scheme,
        } => {
            let scheme = select_scheme(scheme, settings)?;
            let game = GameFileSystem::new(&dir, &scheme);
            match GameInstallPrerequisite::try_acquire(&game, &version, &scheme)? {
                AcquireResult::Acquired(lock) => {
                    println!("acquired ({:?}): {}", lock.kind(), dir);
                    Ok(ExitCode::SUCCESS)
                }
                AcquireResult::Failed(reason) => {
                    println!("not acquired: {}", reason);
                    Ok(ExitCode::from(2))
                }
            }
        }
        Commands::Release { dir, scheme } => {
            let scheme = select_scheme(scheme, settings)?;
            let game = GameFileSystem::new(&dir, &scheme);
            if !services::is_installing(&game)? {
                bail!("No installation in progress in {}", dir);
            }

            // A directory carrying the sentinel always resumes
            let mut lock = GameInstallPrerequisite::try_acquire(&game, "", &scheme)?
                .into_lock()
                .ok_or_else(|| anyhow!("Installation lock for {} could not be resumed", dir))?;
            lock.release()?;
            println!("released: {}", dir);
            Ok(ExitCode::SUCCESS)
        }
        Commands::GenerateConfig {
            dir,
            version,
            scheme,
        } => {
            let scheme = select_scheme(scheme, settings)?;
            let game = GameFileSystem::new(&dir, &scheme);
            game.generate_configuration_file(&version, &scheme)?;
            println!("{}", game.game_config_file_path());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Channel { game } => {
            let game_path = game.or_else(|| settings.game_path.clone());
            match services::current_launch_scheme(game_path.as_deref()) {
                Ok(Some(scheme)) => {
                    println!("{}", scheme);
                    Ok(ExitCode::SUCCESS)
                }
                Ok(None) => {
                    println!("unsupported channel combination");
                    Ok(ExitCode::from(2))
                }
                Err(e) if e.is_recoverable() => {
                    println!("{}", e);
                    Ok(ExitCode::from(2))
                }
                Err(e) => Err(e.into()),
            }
        }
        Commands::Repair { game, scheme } => {
            let game = game_file_system(game, settings)?;
            let scheme = if scheme.channel.is_some() {
                select_scheme(scheme, settings)?
            } else {
                select_scheme(
                    SchemeArgs {
                        oversea: game.is_oversea(),
                        ..scheme
                    },
                    settings,
                )?
            };
            let version = services::repair_configuration_file(&game, &scheme)?;
            println!("{} written for version {}", game.game_config_file_path(), version);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Launch { game, args } => {
            let game = game_file_system(game, settings)?;
            let mut arguments = settings.launch_arguments.clone();
            arguments.extend(args);
            let timeout = (settings.launch_timeout > 0)
                .then(|| Duration::from_secs(settings.launch_timeout));
            launch(&game, GameLauncher::with_arguments(arguments), timeout)
        }
    }
}

fn launch(game: &GameFileSystem, launcher: GameLauncher, timeout: Option<Duration>) -> Result<ExitCode> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .thread_name("hutao-worker")
        .build()?;

    let exit_code = runtime.block_on(async {
        let child = launcher.launch(game)?;
        launcher.wait(child, timeout).await
    })?;

    runtime.shutdown_timeout(Duration::from_secs(5));
    Ok(if exit_code == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn status(game: &GameFileSystem) -> Result<ExitCode> {
    println!("game:        {}", game.game_file_path());
    println!("variant:     {}", if game.is_oversea() { "Overseas" } else { "CN" });
    println!("config:      {}", game.game_config_file_path());
    println!("installing:  {}", services::is_installing(game)?);

    let version = game.read_script_version()?;
    println!("version:     {}", version.as_deref().unwrap_or("unknown"));

    let game_path = game.game_file_path();
    match services::current_launch_scheme(Some(game_path.as_path())) {
        Ok(Some(scheme)) => println!("scheme:      {}", scheme),
        Ok(None) => println!("scheme:      unsupported"),
        Err(e) => println!("scheme:      {}", e),
    }
    Ok(ExitCode::SUCCESS)
}

fn game_file_system(game: Option<Utf8PathBuf>, settings: &LauncherSettings) -> Result<GameFileSystem> {
    let game_path = game
        .or_else(|| settings.game_path.clone())
        .context("No game path given and none configured in settings")?;
    Ok(GameFileSystem::from_executable(&game_path)?)
}

/// Picks the scheme from explicit channel values, then the settings file,
/// then the default for the requested variant.
fn select_scheme(args: SchemeArgs, settings: &LauncherSettings) -> Result<LaunchScheme> {
    if let (Some(channel), Some(sub_channel)) = (args.channel, args.sub_channel) {
        return KnownLaunchSchemes::for_variant(args.oversea)
            .find(|s| s.channel.value() == channel && s.sub_channel.value() == sub_channel)
            .copied()
            .ok_or_else(|| {
                anyhow!(
                    "Unknown launch scheme: channel={}, sub_channel={}, oversea={}",
                    channel,
                    sub_channel,
                    args.oversea
                )
            });
    }

    if let Some(scheme) = settings.scheme.filter(|s| s.is_oversea == args.oversea) {
        return Ok(scheme);
    }

    Ok(*KnownLaunchSchemes::default_for_variant(args.oversea))
}
