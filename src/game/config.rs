use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Most players a single round can seat
pub const MAX_PLAYERS: usize = 4;

/// Colors offered to player slots 1..=4 when none are chosen
pub const DEFAULT_PLAYER_COLORS: [PlayerColor; MAX_PLAYERS] = [
    PlayerColor::new(0x1a, 0xbc, 0x9c),
    PlayerColor::new(0xe7, 0x4c, 0x3c),
    PlayerColor::new(0x34, 0x98, 0xdb),
    PlayerColor::new(0xf1, 0xc4, 0x0f),
];

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game grid
    pub grid_width: usize,
    /// Height of the game grid
    pub grid_height: usize,
    /// Initial length of every snake (all segments stacked on the spawn cell)
    pub initial_snake_length: usize,

    /// How often the stepping loop polls actor deadlines
    pub tick_interval_ms: u64,
    /// Floor for the per-snake step interval after speed-ups
    pub min_step_interval_ms: u64,
    /// Multiplier applied to a snake's step interval each time it eats
    pub speedup_factor: f64,
    /// Random cells the food spawner tries before giving up
    pub food_spawn_attempts: u32,

    /// Fixed RNG seed, random when absent
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 33,
            grid_height: 30,
            initial_snake_length: 4,
            tick_interval_ms: 10,
            min_step_interval_ms: 60,
            speedup_factor: 0.94,
            food_spawn_attempts: 5000,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    /// Create a large grid
    pub fn large() -> Self {
        Self::new(48, 40)
    }

    /// Pin the RNG so food placement is reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: GameConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot run
    pub fn validate(&self) -> Result<()> {
        if self.grid_width < 4 || self.grid_height < 4 {
            bail!(
                "grid must be at least 4x4, got {}x{}",
                self.grid_width,
                self.grid_height
            );
        }
        if self.grid_width > i32::MAX as usize || self.grid_height > i32::MAX as usize {
            bail!("grid dimensions overflow cell coordinates");
        }
        if self.initial_snake_length == 0 {
            bail!("initial_snake_length must be positive");
        }
        if self.tick_interval_ms == 0 || self.min_step_interval_ms == 0 {
            bail!("tick and step intervals must be positive");
        }
        if !(self.speedup_factor > 0.0 && self.speedup_factor <= 1.0) {
            bail!(
                "speedup_factor must be in (0, 1], got {}",
                self.speedup_factor
            );
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn acceleration(&self) -> Acceleration {
        Acceleration {
            factor: self.speedup_factor,
            floor: Duration::from_millis(self.min_step_interval_ms),
        }
    }
}

/// How a snake's step interval shrinks when it eats
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Acceleration {
    pub factor: f64,
    pub floor: Duration,
}

impl Acceleration {
    /// Next interval after one meal, truncated to whole milliseconds
    pub fn apply(&self, interval: Duration) -> Duration {
        let scaled = (interval.as_millis() as f64 * self.factor) as u64;
        Duration::from_millis(scaled).max(self.floor)
    }
}

/// Difficulty picks the base step interval every snake starts with
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Insane,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Insane,
    ];

    pub fn base_step_interval(&self) -> Duration {
        let millis = match self {
            Difficulty::Easy => 160,
            Difficulty::Normal => 120,
            Difficulty::Hard => 90,
            Difficulty::Insane => 70,
        };
        Duration::from_millis(millis)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Normal => "NORMAL",
            Difficulty::Hard => "HARD",
            Difficulty::Insane => "INSANE",
        }
    }
}

/// Display color for a player; the simulation never looks at it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl PlayerColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Default color for a zero-based player slot
    pub fn for_slot(slot: usize) -> Self {
        DEFAULT_PLAYER_COLORS[slot % MAX_PLAYERS]
    }
}

impl fmt::Display for PlayerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for PlayerColor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            bail!("expected a color like #1abc9c, got {s:?}");
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .with_context(|| format!("invalid hex digits in color {s:?}"))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

/// Everything a start command carries
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSetup {
    pub players: usize,
    pub difficulty: Difficulty,
    pub colors: Vec<PlayerColor>,
}

impl RoundSetup {
    pub fn new(players: usize, difficulty: Difficulty) -> Self {
        Self {
            players,
            difficulty,
            colors: Vec::new(),
        }
    }

    pub fn with_colors(mut self, colors: Vec<PlayerColor>) -> Self {
        self.colors = colors;
        self
    }

    /// Player count clamped to the seats a round has
    pub fn player_count(&self) -> usize {
        self.players.clamp(1, MAX_PLAYERS)
    }

    /// Color for a zero-based slot, falling back to the default palette
    pub fn color_for(&self, slot: usize) -> PlayerColor {
        self.colors
            .get(slot)
            .copied()
            .unwrap_or_else(|| PlayerColor::for_slot(slot))
    }
}

impl Default for RoundSetup {
    fn default() -> Self {
        Self::new(2, Difficulty::Normal)
    }
}
