use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::games::memory::Difficulty;
use crate::games::snake::SnakeSettings;
use crate::games::tictactoe::Opponent;

#[derive(Parser, Debug, Default)]
#[command(name = "festplay")]
#[command(about = "Snake, Flappy Bird, Tic-Tac-Toe and Memory in your terminal", long_about = None)]
pub struct Cli {
    /// Config file (defaults to <config dir>/festplay/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Seed for food, pipes, AI moves and shuffles
    #[arg(long)]
    pub seed: Option<u64>,

    /// Where best scores are stored
    #[arg(long)]
    pub scores: Option<PathBuf>,

    /// Keep best scores for this session only
    #[arg(long)]
    pub no_persist: bool,

    /// Snake tick in milliseconds (100-150)
    #[arg(long)]
    pub snake_tick_ms: Option<u64>,

    /// Default log level when RUST_LOG is unset
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SnakeConfig {
    pub tick_ms: u64,
    pub grid: u64,
    pub points_per_food: u32,
}

impl Default for SnakeConfig {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            grid: 20,
            points_per_food: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct FlappyConfig {
    pub frame_ms: u64,
}

impl Default for FlappyConfig {
    fn default() -> Self {
        Self { frame_ms: 16 }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct MemoryConfig {
    pub mismatch_delay_ms: u64,
    pub difficulty: Difficulty,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            mismatch_delay_ms: 1000,
            difficulty: Difficulty::Easy,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TicTacToeConfig {
    pub ai_delay_ms: u64,
    pub vs_ai: bool,
}

impl Default for TicTacToeConfig {
    fn default() -> Self {
        Self {
            ai_delay_ms: 500,
            vs_ai: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub frame_ms: u64,
    pub log_level: String,
    pub scores_path: Option<PathBuf>,
    pub persist: bool,
    pub seed: Option<u64>,
    pub snake: SnakeConfig,
    pub flappy: FlappyConfig,
    pub memory: MemoryConfig,
    pub tictactoe: TicTacToeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frame_ms: 16,
            log_level: "info".to_string(),
            scores_path: None,
            persist: true,
            seed: None,
            snake: SnakeConfig::default(),
            flappy: FlappyConfig::default(),
            memory: MemoryConfig::default(),
            tictactoe: TicTacToeConfig::default(),
        }
    }
}

fn check(field: &'static str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value, min, max })
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("festplay").join("config.toml"))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// File (explicit or default location) overlaid with CLI flags, then validated.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if cli.seed.is_some() {
            self.seed = cli.seed;
        }
        if cli.scores.is_some() {
            self.scores_path = cli.scores.clone();
        }
        if cli.no_persist {
            self.persist = false;
        }
        if let Some(ms) = cli.snake_tick_ms {
            self.snake.tick_ms = ms;
        }
        if let Some(level) = &cli.log_level {
            self.log_level = level.clone();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check("frame_ms", self.frame_ms, 1, 100)?;
        check("snake.tick_ms", self.snake.tick_ms, 100, 150)?;
        check("snake.grid", self.snake.grid, 5, 40)?;
        check("snake.points_per_food", u64::from(self.snake.points_per_food), 1, 1000)?;
        check("flappy.frame_ms", self.flappy.frame_ms, 8, 50)?;
        check("memory.mismatch_delay_ms", self.memory.mismatch_delay_ms, 100, 10_000)?;
        check("tictactoe.ai_delay_ms", self.tictactoe.ai_delay_ms, 0, 10_000)?;
        Ok(())
    }

    pub fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }

    pub fn snake_settings(&self) -> SnakeSettings {
        SnakeSettings {
            grid: self.snake.grid as i32,
            tick: Duration::from_millis(self.snake.tick_ms),
            points_per_food: self.snake.points_per_food,
        }
    }

    pub fn flappy_frame(&self) -> Duration {
        Duration::from_millis(self.flappy.frame_ms)
    }

    pub fn mismatch_delay(&self) -> Duration {
        Duration::from_millis(self.memory.mismatch_delay_ms)
    }

    pub fn ai_delay(&self) -> Duration {
        Duration::from_millis(self.tictactoe.ai_delay_ms)
    }

    pub fn opponent(&self) -> Opponent {
        if self.tictactoe.vs_ai {
            Opponent::Ai { delay: self.ai_delay() }
        } else {
            Opponent::Human
        }
    }
}
