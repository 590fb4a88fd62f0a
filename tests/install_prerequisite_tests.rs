//! Integration tests for the installation lock
//!
//! These tests verify:
//! - Fresh directories get a generated config.ini with one sentinel
//! - Acquisition on a claimed directory is idempotent
//! - Unclaimed and unrecognizable directories are refused without writes
//! - Release removes exactly the sentinel and double release is detected

use camino::Utf8PathBuf;
use hutao_install::models::{IniElement, KnownLaunchSchemes, LaunchScheme};
use hutao_install::services::ini;
use hutao_install::services::{
    AcquireFailure, AcquireKind, AcquireResult, GameFileSystem, GameInstallPrerequisite,
    INSTALLING_SENTINEL, InstallError, is_installing,
};
use std::fs;
use tempfile::TempDir;

fn cn_scheme() -> &'static LaunchScheme {
    KnownLaunchSchemes::default_for_variant(false)
}

fn create_game_dir() -> (TempDir, GameFileSystem) {
    let temp_dir = TempDir::new().unwrap();
    let root = Utf8PathBuf::try_from(temp_dir.path().join("Genshin Impact Game")).unwrap();
    let game = GameFileSystem::new(root, cn_scheme());
    (temp_dir, game)
}

fn acquire<'a>(game: &'a GameFileSystem) -> GameInstallPrerequisite<'a> {
    match GameInstallPrerequisite::try_acquire(game, "5.0.0", cn_scheme()).unwrap() {
        AcquireResult::Acquired(lock) => lock,
        AcquireResult::Failed(reason) => panic!("expected lock, got {reason}"),
    }
}

fn read_config(game: &GameFileSystem) -> Vec<IniElement> {
    ini::deserialize_from_file(&game.game_config_file_path()).unwrap()
}

#[test]
fn test_fresh_directory_gets_version_scheme_and_sentinel() {
    let (_temp_dir, game) = create_game_dir();

    let lock = acquire(&game);
    assert_eq!(lock.kind(), AcquireKind::Fresh);

    let elements = read_config(&game);
    let params = ini::parameters(&elements);
    assert_eq!(params.get("game_version"), Some(&"5.0.0"));
    assert_eq!(params.get("channel"), Some(&"1"));
    assert_eq!(params.get("sub_channel"), Some(&"1"));
    assert_eq!(params.get("game_biz"), Some(&"hk4e_cn"));
    assert_eq!(ini::count_parameter(&elements, INSTALLING_SENTINEL), 1);
}

#[test]
fn test_oversea_fresh_directory() {
    let temp_dir = TempDir::new().unwrap();
    let root = Utf8PathBuf::try_from(temp_dir.path().join("game")).unwrap();
    let scheme = KnownLaunchSchemes::default_for_variant(true);
    let game = GameFileSystem::new(root, scheme);

    let result = GameInstallPrerequisite::try_acquire(&game, "5.0.0", scheme).unwrap();
    assert!(result.is_acquired());

    let elements = read_config(&game);
    assert_eq!(ini::parameters(&elements).get("game_biz"), Some(&"hk4e_global"));
}

#[test]
fn test_acquire_twice_is_idempotent() {
    let (_temp_dir, game) = create_game_dir();

    let first = acquire(&game);
    let after_first = fs::read(game.game_config_file_path()).unwrap();

    let second = acquire(&game);
    assert_eq!(first.kind(), AcquireKind::Fresh);
    assert_eq!(second.kind(), AcquireKind::Resumed);

    assert_eq!(fs::read(game.game_config_file_path()).unwrap(), after_first);
    assert_eq!(
        ini::count_parameter(&read_config(&game), INSTALLING_SENTINEL),
        1
    );
}

#[test]
fn test_unclaimed_installation_is_refused_and_untouched() {
    let (_temp_dir, game) = create_game_dir();
    fs::create_dir_all(game.game_directory()).unwrap();
    let content = "[General]\r\nchannel=1\r\ncps=mihoyo\r\n\r\ngame_version=4.8.0\r\n";
    fs::write(game.game_config_file_path(), content).unwrap();

    let result = GameInstallPrerequisite::try_acquire(&game, "5.0.0", cn_scheme()).unwrap();
    assert!(matches!(
        result,
        AcquireResult::Failed(AcquireFailure::AlreadyInstalledUnclaimed)
    ));
    assert_eq!(fs::read_to_string(game.game_config_file_path()).unwrap(), content);
}

#[test]
fn test_non_empty_directory_without_config_is_ambiguous() {
    let (_temp_dir, game) = create_game_dir();
    fs::create_dir_all(game.game_directory()).unwrap();
    fs::write(game.game_directory().join("readme.txt"), "hello").unwrap();

    let result = GameInstallPrerequisite::try_acquire(&game, "5.0.0", cn_scheme()).unwrap();
    assert!(matches!(
        result,
        AcquireResult::Failed(AcquireFailure::AmbiguousInstallState)
    ));
    assert!(!game.game_config_file_path().exists());
}

#[test]
fn test_release_removes_only_the_sentinel() {
    let (_temp_dir, game) = create_game_dir();
    fs::create_dir_all(game.game_directory()).unwrap();
    fs::write(
        game.game_config_file_path(),
        "; written by launcher\n[General]\nchannel=1\nsnap_hutao_installing=\nsub_channel=1\n[Extra]\nkey=value\n",
    )
    .unwrap();

    let mut lock = acquire(&game);
    assert_eq!(lock.kind(), AcquireKind::Resumed);
    lock.release().unwrap();

    assert_eq!(
        read_config(&game),
        vec![
            IniElement::comment(" written by launcher"),
            IniElement::section("General"),
            IniElement::parameter("channel", "1"),
            IniElement::parameter("sub_channel", "1"),
            IniElement::section("Extra"),
            IniElement::parameter("key", "value"),
        ]
    );
    assert!(!is_installing(&game).unwrap());
}

#[test]
fn test_double_release_is_inconsistent_and_leaves_file() {
    let (_temp_dir, game) = create_game_dir();

    let mut first = acquire(&game);
    let mut second = acquire(&game);

    first.release().unwrap();
    let after_release = fs::read(game.game_config_file_path()).unwrap();

    let err = second.release().unwrap_err();
    assert!(matches!(err, InstallError::InconsistentState { found: 0, .. }));
    assert!(!second.is_released());
    assert_eq!(fs::read(game.game_config_file_path()).unwrap(), after_release);
}

#[test]
fn test_released_directory_is_an_unclaimed_installation() {
    let (_temp_dir, game) = create_game_dir();

    let mut lock = acquire(&game);
    lock.release().unwrap();

    let result = GameInstallPrerequisite::try_acquire(&game, "5.0.0", cn_scheme()).unwrap();
    assert!(matches!(
        result,
        AcquireResult::Failed(AcquireFailure::AlreadyInstalledUnclaimed)
    ));
}

#[test]
fn test_lock_survives_new_game_file_system_instance() {
    let (_temp_dir, game) = create_game_dir();
    drop(acquire(&game));

    // A later process resolves the same directory from scratch
    let reopened = GameFileSystem::from_executable(game.game_file_path()).unwrap();
    assert!(is_installing(&reopened).unwrap());

    let mut lock = acquire(&reopened);
    assert_eq!(lock.kind(), AcquireKind::Resumed);
    lock.release().unwrap();
    assert!(!is_installing(&game).unwrap());
}
