use anyhow::{Context, Result};
use clap::Parser;
use snake_arena::game::{Difficulty, GameConfig, PlayerColor, RoundSetup};
use snake_arena::modes::HumanMode;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "snake_arena")]
#[command(version, about = "Local multiplayer snake, up to four players on one keyboard")]
struct Cli {
    /// Number of players (1-4); can also be changed on the setup screen
    #[arg(long, default_value = "2", value_parser = clap::value_parser!(u8).range(1..=4))]
    players: u8,

    /// Starting speed of every snake
    #[arg(long, value_enum, default_value = "normal")]
    difficulty: Difficulty,

    /// Grid width (overrides the config file)
    #[arg(long)]
    width: Option<usize>,

    /// Grid height (overrides the config file)
    #[arg(long)]
    height: Option<usize>,

    /// Seed for food placement
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file with game settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Player color as #rrggbb; repeat once per player
    #[arg(long = "color")]
    colors: Vec<PlayerColor>,

    /// Write logs to this file (the terminal is taken by the game)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log verbosity
    #[arg(long, default_value = "info")]
    log_level: Level,
}

impl Cli {
    /// Config file first, then command-line overrides
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)?,
            None => GameConfig::default(),
        };
        if let Some(width) = self.width {
            config.grid_width = width;
        }
        if let Some(height) = self.height {
            config.grid_height = height;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        Ok(config)
    }

    fn round_setup(&self) -> RoundSetup {
        RoundSetup::new(self.players as usize, self.difficulty)
            .with_colors(self.colors.clone())
    }
}

fn init_logging(cli: &Cli) -> Result<()> {
    let Some(path) = &cli.log_file else {
        return Ok(());
    };

    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install log subscriber")?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config = cli.game_config()?;
    let setup = cli.round_setup();
    info!(
        width = config.grid_width,
        height = config.grid_height,
        players = setup.player_count(),
        "starting snake_arena"
    );

    let mut human_mode = HumanMode::new(config, setup)?;
    human_mode.run().await?;

    Ok(())
}
