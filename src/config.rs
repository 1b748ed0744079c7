//! Command-line options and where files live.

use crate::error::{GameError, Result};
use crate::rounds::guessing::DEFAULT_COUNTDOWN;
use crate::rounds::memory::Difficulty;
use directories::ProjectDirs;
use std::env;
use std::path::PathBuf;

pub const DATA_DIR_ENV: &str = "PICTURE_GAMES_DATA";
pub const LOG_FILTER_ENV: &str = "PICTURE_GAMES_LOG";

const MIN_COUNTDOWN: u32 = 5;
const MAX_COUNTDOWN: u32 = 300;

/// Options every game understands.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommonOptions
{
    pub seed: Option<u64>,
    pub mute: bool,
}

impl CommonOptions
{
    /// Consumes `arg` if it is a shared option. `Ok(false)` means it
    /// belongs to the game.
    fn take(&mut self, arg: &str, rest: &mut impl Iterator<Item = String>) -> Result<bool>
    {
        if arg == "--mute" {
            self.mute = true;
            return Ok(true);
        }
        if let Some(value) = option_value(arg, "--seed", rest)? {
            let seed = value
                .parse::<u64>()
                .map_err(|_| usage("Seed must be a non-negative integer"))?;
            self.seed = Some(seed);
            return Ok(true);
        }
        Ok(false)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DifferenceConfig
{
    pub common: CommonOptions,
}

impl DifferenceConfig
{
    pub fn from_args(args: &[String]) -> Result<Self>
    {
        let mut config = Self::default();
        let mut iter = args.iter().cloned();
        while let Some(arg) = iter.next() {
            if !config.common.take(&arg, &mut iter)? {
                return Err(usage(&format!("Unknown difference option '{arg}'")));
            }
        }
        Ok(config)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuessingConfig
{
    pub common: CommonOptions,
    pub countdown: u32,
}

impl Default for GuessingConfig
{
    fn default() -> Self
    {
        Self {
            common: CommonOptions::default(),
            countdown: DEFAULT_COUNTDOWN,
        }
    }
}

impl GuessingConfig
{
    pub fn from_args(args: &[String]) -> Result<Self>
    {
        let mut config = Self::default();
        let mut iter = args.iter().cloned();
        while let Some(arg) = iter.next() {
            if config.common.take(&arg, &mut iter)? {
                continue;
            }
            if let Some(value) = option_value(&arg, "--seconds", &mut iter)? {
                config.countdown = parse_countdown(&value)?;
            } else {
                return Err(usage(&format!("Unknown guessing option '{arg}'")));
            }
        }
        Ok(config)
    }
}

fn parse_countdown(value: &str) -> Result<u32>
{
    let seconds = value
        .parse::<u32>()
        .map_err(|_| usage("Seconds must be a whole number"))?;
    if !(MIN_COUNTDOWN..=MAX_COUNTDOWN).contains(&seconds) {
        return Err(usage(&format!(
            "Seconds must be between {MIN_COUNTDOWN} and {MAX_COUNTDOWN}"
        )));
    }
    Ok(seconds)
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryConfig
{
    pub common: CommonOptions,
    pub difficulty: Difficulty,
}

impl MemoryConfig
{
    pub fn from_args(args: &[String]) -> Result<Self>
    {
        let mut config = Self::default();
        let mut iter = args.iter().cloned();
        while let Some(arg) = iter.next() {
            if config.common.take(&arg, &mut iter)? {
                continue;
            }
            if let Some(value) = option_value(&arg, "--difficulty", &mut iter)? {
                config.difficulty = Difficulty::from_name(&value).ok_or_else(|| {
                    usage(&format!("Unknown difficulty '{value}' (easy, medium, hard)"))
                })?;
            } else {
                return Err(usage(&format!("Unknown memory option '{arg}'")));
            }
        }
        Ok(config)
    }
}

/// Accepts both `--name=value` and `--name value`.
fn option_value(
    arg: &str,
    name: &str,
    rest: &mut impl Iterator<Item = String>,
) -> Result<Option<String>>
{
    if arg == name {
        return rest
            .next()
            .map(Some)
            .ok_or_else(|| usage(&format!("Expected value after {name}")));
    }
    Ok(arg
        .strip_prefix(name)
        .and_then(|tail| tail.strip_prefix('='))
        .map(str::to_string))
}

fn usage(message: &str) -> GameError
{
    GameError::Usage(message.to_string())
}

/// Scores and logs go in one directory: `$PICTURE_GAMES_DATA` if set, the
/// platform data directory otherwise.
#[derive(Clone, Debug)]
pub struct AppPaths
{
    pub dir: PathBuf,
}

impl AppPaths
{
    pub fn resolve() -> Self
    {
        if let Some(dir) = env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            return Self { dir: dir.into() };
        }
        let dir = ProjectDirs::from("com", "picture-games", "PictureGames")
            .map(|proj| proj.data_local_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        Self { dir }
    }

    pub fn scores(&self) -> PathBuf
    {
        self.dir.join("scores.json")
    }

    pub fn log(&self) -> PathBuf
    {
        self.dir.join("picture-games.log")
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn args(list: &[&str]) -> Vec<String>
    {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn common_options_parse_both_forms()
    {
        let config = DifferenceConfig::from_args(&args(&["--seed", "42", "--mute"])).unwrap();
        assert_eq!(config.common.seed, Some(42));
        assert!(config.common.mute);

        let config = DifferenceConfig::from_args(&args(&["--seed=7"])).unwrap();
        assert_eq!(config.common.seed, Some(7));
    }

    #[test]
    fn guessing_seconds_are_bounded()
    {
        let config = GuessingConfig::from_args(&args(&["--seconds=45"])).unwrap();
        assert_eq!(config.countdown, 45);
        assert_eq!(GuessingConfig::default().countdown, 30);
        assert!(GuessingConfig::from_args(&args(&["--seconds=1"])).is_err());
        assert!(GuessingConfig::from_args(&args(&["--seconds", "lots"])).is_err());
    }

    #[test]
    fn memory_difficulty()
    {
        let config = MemoryConfig::from_args(&args(&["--difficulty", "medium"])).unwrap();
        assert_eq!(config.difficulty, Difficulty::Medium);
        assert_eq!(MemoryConfig::default().difficulty, Difficulty::Easy);
        assert!(MemoryConfig::from_args(&args(&["--difficulty=insane"])).is_err());
    }

    #[test]
    fn unknown_and_dangling_options_fail()
    {
        assert!(matches!(
            DifferenceConfig::from_args(&args(&["--wpm=20"])),
            Err(GameError::Usage(_))
        ));
        assert!(MemoryConfig::from_args(&args(&["--seed"])).is_err());
        // Prefix alone is not the option.
        assert!(MemoryConfig::from_args(&args(&["--seedling=3"])).is_err());
    }

    #[test]
    fn files_share_the_data_dir()
    {
        let paths = AppPaths {
            dir: PathBuf::from("/tmp/pg"),
        };
        assert_eq!(paths.scores(), PathBuf::from("/tmp/pg/scores.json"));
        assert_eq!(paths.log(), PathBuf::from("/tmp/pg/picture-games.log"));
    }
}
