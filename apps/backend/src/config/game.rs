//! Game settings loaded from the environment.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::pairing::DEFAULT_RESAMPLE_CAP;
use crate::domain::ChannelId;
use crate::error::AppError;

pub const DEFAULT_MIN_PLAYERS: usize = 20;
pub const DEFAULT_TRIALS: u32 = 5;
pub const DEFAULT_NEIGHBOR_SIZE: usize = 4;
pub const DEFAULT_ROUND_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_SEED: u64 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Channel membership that triggers an automatic start.
    pub min_players: usize,
    pub trials: u32,
    pub neighbor_size: usize,
    pub round_timeout: Duration,
    pub seed: u64,
    pub resample_cap: u32,
    /// Channel watched for membership changes. No auto-start when unset.
    pub game_channel: Option<ChannelId>,
    pub export_dir: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_players: DEFAULT_MIN_PLAYERS,
            trials: DEFAULT_TRIALS,
            neighbor_size: DEFAULT_NEIGHBOR_SIZE,
            round_timeout: DEFAULT_ROUND_TIMEOUT,
            seed: DEFAULT_SEED,
            resample_cap: DEFAULT_RESAMPLE_CAP,
            game_channel: None,
            export_dir: PathBuf::from("."),
        }
    }
}

impl GameConfig {
    /// Read `HASHTAG_*` variables (and `GAME_CHANNEL_ID`), falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`GameConfig::from_env`] with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();
        let config = Self {
            min_players: parse_var(&lookup, "HASHTAG_MIN_PLAYERS", defaults.min_players)?,
            trials: parse_var(&lookup, "HASHTAG_TRIALS", defaults.trials)?,
            neighbor_size: parse_var(&lookup, "HASHTAG_NEIGHBOR_SIZE", defaults.neighbor_size)?,
            round_timeout: Duration::from_secs(parse_var(
                &lookup,
                "HASHTAG_ROUND_TIMEOUT_SECS",
                defaults.round_timeout.as_secs(),
            )?),
            seed: parse_var(&lookup, "HASHTAG_SEED", defaults.seed)?,
            resample_cap: parse_var(&lookup, "HASHTAG_RESAMPLE_CAP", defaults.resample_cap)?,
            game_channel: non_empty(&lookup, "GAME_CHANNEL_ID").map(ChannelId::new),
            export_dir: non_empty(&lookup, "HASHTAG_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.export_dir),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.trials == 0 {
            return Err(AppError::config("HASHTAG_TRIALS must be at least 1"));
        }
        if self.neighbor_size == 0 {
            return Err(AppError::config("HASHTAG_NEIGHBOR_SIZE must be at least 1"));
        }
        if self.round_timeout.is_zero() {
            return Err(AppError::config(
                "HASHTAG_ROUND_TIMEOUT_SECS must be at least 1",
            ));
        }
        if self.resample_cap == 0 {
            return Err(AppError::config("HASHTAG_RESAMPLE_CAP must be at least 1"));
        }
        Ok(())
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, AppError> {
    match non_empty(lookup, name) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| AppError::config(format!("Invalid value for '{name}': '{raw}'"))),
    }
}
