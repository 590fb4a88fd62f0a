use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Well-known file and directory names inside a game installation.
pub mod constants {
    pub const YUAN_SHEN_FILE_NAME: &str = "YuanShen.exe";
    pub const GENSHIN_IMPACT_FILE_NAME: &str = "GenshinImpact.exe";
    pub const YUAN_SHEN_DATA: &str = "YuanShen_Data";
    pub const GENSHIN_IMPACT_DATA: &str = "GenshinImpact_Data";
    pub const CONFIG_FILE_NAME: &str = "config.ini";
    pub const PKG_VERSION_FILE_NAME: &str = "pkg_version";
    pub const GAME_BIZ_CN: &str = "hk4e_cn";
    pub const GAME_BIZ_GLOBAL: &str = "hk4e_global";
}

/// Returns true if the executable file name belongs to the Overseas client.
///
/// Comparison is case-insensitive; anything other than `GenshinImpact.exe`
/// (including `YuanShen.exe`) is treated as the CN client.
pub fn executable_is_oversea(game_file_name: &str) -> bool {
    game_file_name.eq_ignore_ascii_case(constants::GENSHIN_IMPACT_FILE_NAME)
}

/// Distribution channel written as `channel=` in `config.ini`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelType {
    Default,
    Official,
    Bili,
}

impl ChannelType {
    pub fn value(self) -> u32 {
        match self {
            Self::Default => 0,
            Self::Official => 1,
            Self::Bili => 14,
        }
    }
}

/// Sub-channel written as `sub_channel=` in `config.ini`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubChannelType {
    Default,
    Official,
    NoTapTap,
    Epic,
    Google,
}

impl SubChannelType {
    pub fn value(self) -> u32 {
        match self {
            Self::Default => 0,
            Self::Official => 1,
            Self::NoTapTap => 2,
            Self::Epic => 3,
            Self::Google => 6,
        }
    }
}

/// Channel/sub-channel/region descriptor of a specific game distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LaunchScheme {
    pub channel: ChannelType,
    pub sub_channel: SubChannelType,
    pub is_oversea: bool,

    /// Accepted when found in an existing `config.ini`, never offered for new installs
    #[serde(default)]
    pub compat_only: bool,
}

impl LaunchScheme {
    const fn new(
        channel: ChannelType,
        sub_channel: SubChannelType,
        is_oversea: bool,
        compat_only: bool,
    ) -> Self {
        Self {
            channel,
            sub_channel,
            is_oversea,
            compat_only,
        }
    }

    /// Region identifier written as `game_biz=`
    pub fn game_biz(&self) -> &'static str {
        if self.is_oversea {
            constants::GAME_BIZ_GLOBAL
        } else {
            constants::GAME_BIZ_CN
        }
    }

    /// Executable name of the client this scheme distributes
    pub fn game_file_name(&self) -> &'static str {
        if self.is_oversea {
            constants::GENSHIN_IMPACT_FILE_NAME
        } else {
            constants::YUAN_SHEN_FILE_NAME
        }
    }

    /// Returns true if the channel options read from disk describe this scheme
    pub fn matches(&self, options: &ChannelOptions) -> bool {
        self.channel.value() == options.channel
            && self.sub_channel.value() == options.sub_channel
            && self.is_oversea == options.is_oversea
    }
}

impl fmt::Display for LaunchScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let server = if self.is_oversea { "Global" } else { "Chinese" };
        write!(
            f,
            "{} server, channel {:?} ({}), sub-channel {:?} ({})",
            server,
            self.channel,
            self.channel.value(),
            self.sub_channel,
            self.sub_channel.value()
        )?;
        if self.compat_only {
            f.write_str(" [compat only]")?;
        }
        Ok(())
    }
}

/// Channel values as found in an existing installation's `config.ini`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelOptions {
    pub channel: u32,
    pub sub_channel: u32,
    pub is_oversea: bool,
    pub config_file_path: Utf8PathBuf,
}

use ChannelType as C;
use SubChannelType as S;

static KNOWN_LAUNCH_SCHEMES: [LaunchScheme; 9] = [
    // Chinese server
    LaunchScheme::new(C::Official, S::Official, false, false),
    LaunchScheme::new(C::Official, S::NoTapTap, false, false),
    LaunchScheme::new(C::Bili, S::Default, false, false),
    LaunchScheme::new(C::Default, S::Default, false, true),
    LaunchScheme::new(C::Official, S::Default, false, true),
    // Global server
    LaunchScheme::new(C::Official, S::Default, true, false),
    LaunchScheme::new(C::Official, S::Epic, true, false),
    LaunchScheme::new(C::Official, S::Google, true, false),
    LaunchScheme::new(C::Default, S::Default, true, true),
];

/// Catalogue of the launch schemes the launcher knows how to install and run.
pub struct KnownLaunchSchemes;

impl KnownLaunchSchemes {
    pub fn all() -> &'static [LaunchScheme] {
        &KNOWN_LAUNCH_SCHEMES
    }

    /// Looks up the scheme described by `options`. `None` means the
    /// installation uses a channel combination this launcher does not know.
    pub fn find(options: &ChannelOptions) -> Option<&'static LaunchScheme> {
        KNOWN_LAUNCH_SCHEMES.iter().find(|scheme| scheme.matches(options))
    }

    pub fn for_variant(is_oversea: bool) -> impl Iterator<Item = &'static LaunchScheme> {
        KNOWN_LAUNCH_SCHEMES
            .iter()
            .filter(move |scheme| scheme.is_oversea == is_oversea)
    }

    /// The scheme offered by default for a fresh install of the given variant
    pub fn default_for_variant(is_oversea: bool) -> &'static LaunchScheme {
        Self::for_variant(is_oversea)
            .find(|scheme| !scheme.compat_only)
            .unwrap_or(&KNOWN_LAUNCH_SCHEMES[0])
    }
}
