use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::Duration;
use tokio::time::interval;
use tracing::info;

use crate::game::{Action, Difficulty, GameConfig, RoundSetup, RoundSnapshot};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::Renderer;
use crate::runtime::Simulation;

/// Local multiplayer at one keyboard
pub struct HumanMode {
    simulation: Simulation,
    setup: RoundSetup,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
}

impl HumanMode {
    pub fn new(config: GameConfig, setup: RoundSetup) -> Result<Self> {
        Ok(Self::with_simulation(Simulation::new(config)?, setup))
    }

    pub fn with_simulation(simulation: Simulation, setup: RoundSetup) -> Self {
        Self {
            simulation,
            setup,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Stop stepping before the terminal is handed back
        self.simulation.reset().await;
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        // Render at 30 FPS (33ms per frame); stepping runs on its own task
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event).await?,
                        Some(Err(e)) => return Err(e).context("Failed to read terminal event"),
                        None => self.should_quit = true,
                    }
                }

                // Render frame
                _ = render_timer.tick() => {
                    let snapshot = self.simulation.snapshot();
                    self.metrics.update(&snapshot);
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &snapshot, &self.setup, &self.metrics);
                    }).context("Failed to draw frame")?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    async fn handle_event(&mut self, event: Event) -> Result<()> {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }

            let action = self.input_handler.handle_key_event(key);
            self.handle_action(action).await;
        }

        Ok(())
    }

    async fn handle_action(&mut self, action: KeyAction) {
        let running = self.simulation.is_running();

        match action {
            KeyAction::GameAction(Action::Reset) => {
                self.simulation.reset().await;
                self.metrics.on_reset();
            }
            // Steering and pause only mean something inside a round
            KeyAction::GameAction(game_action) if running => {
                self.simulation.apply(game_action).await;
            }
            KeyAction::Start if !running => self.start_round().await,
            KeyAction::SetPlayers(players) if !running => {
                self.setup.players = players;
            }
            KeyAction::CycleDifficulty if !running => {
                self.setup.difficulty = next_difficulty(self.setup.difficulty);
            }
            KeyAction::Quit => {
                self.should_quit = true;
            }
            _ => {}
        }
    }

    async fn start_round(&mut self) {
        self.simulation.start(self.setup.clone()).await;
        self.metrics.on_round_start();
        info!(players = self.setup.player_count(), "round launched from keyboard");
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        self.simulation.snapshot()
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

fn next_difficulty(current: Difficulty) -> Difficulty {
    let i = Difficulty::ALL
        .iter()
        .position(|d| *d == current)
        .unwrap_or(0);
    Difficulty::ALL[(i + 1) % Difficulty::ALL.len()]
}
