//! Shared handle around a [`GameEngine`] plus the task that steps it.
//!
//! The engine sits behind a read/write lock. The stepping task takes the
//! write lock once per tick, so a whole pass over the snakes is applied
//! atomically with respect to `snapshot()` readers. Input goes through the
//! same lock for the brief moment a heading is updated.

use anyhow::Result;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, warn};

use crate::game::{
    Action, Clock, Direction, GameConfig, GameEngine, PlayerId, RoundSetup, RoundSnapshot,
    RoundState, SystemClock,
};

struct Stepper {
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Round controller handle shared by the input and render paths
pub struct Simulation {
    engine: Arc<RwLock<GameEngine>>,
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
    stepper: Option<Stepper>,
}

impl Simulation {
    /// Create a simulation driven by the wall clock
    pub fn new(config: GameConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock::new()))
    }

    pub fn with_clock(config: GameConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let tick_interval = config.tick_interval();
        let engine = GameEngine::new(config)?;
        Ok(Self {
            engine: Arc::new(RwLock::new(engine)),
            clock,
            tick_interval,
            stepper: None,
        })
    }

    /// Start a new round. Any round in progress is stopped and discarded first.
    pub async fn start(&mut self, setup: RoundSetup) {
        self.stop_stepper().await;

        let now = self.clock.now();
        write_engine(&self.engine).start(&setup, now);

        let (stop, stop_rx) = oneshot::channel();
        let task = tokio::spawn(run_stepper(
            Arc::clone(&self.engine),
            Arc::clone(&self.clock),
            self.tick_interval,
            stop_rx,
        ));
        self.stepper = Some(Stepper { stop, task });
    }

    pub fn toggle_pause(&self) -> RoundState {
        write_engine(&self.engine).toggle_pause(self.clock.now())
    }

    /// Halt the stepping task and drop the round
    pub async fn reset(&mut self) {
        self.stop_stepper().await;
        write_engine(&self.engine).reset();
    }

    /// True while a round exists, including paused and finished rounds
    pub fn is_running(&self) -> bool {
        read_engine(&self.engine).is_running()
    }

    /// Whether the stepping task is still alive
    pub fn is_stepping(&self) -> bool {
        self.stepper
            .as_ref()
            .is_some_and(|stepper| !stepper.task.is_finished())
    }

    pub fn set_heading(&self, player: PlayerId, direction: Direction) -> bool {
        write_engine(&self.engine).set_heading(player, direction)
    }

    /// Apply an input command and report the resulting round state
    pub async fn apply(&mut self, action: Action) -> RoundState {
        match action {
            Action::Turn { player, direction } => {
                self.set_heading(player, direction);
            }
            Action::TogglePause => {
                self.toggle_pause();
            }
            Action::Reset => self.reset().await,
        }
        self.state()
    }

    pub fn state(&self) -> RoundState {
        read_engine(&self.engine).state()
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        read_engine(&self.engine).snapshot()
    }

    async fn stop_stepper(&mut self) {
        let Some(Stepper { stop, task }) = self.stepper.take() else {
            return;
        };
        // The task may already have exited on game over
        let _ = stop.send(());
        if let Err(e) = task.await {
            warn!(error = %e, "stepping task ended abnormally");
        }
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        if let Some(stepper) = self.stepper.take() {
            stepper.task.abort();
        }
    }
}

async fn run_stepper(
    engine: Arc<RwLock<GameEngine>>,
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
    mut stop: oneshot::Receiver<()>,
) {
    let mut ticker = interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    debug!(tick_ms = tick_interval.as_millis() as u64, "stepping loop started");

    loop {
        tokio::select! {
            _ = &mut stop => {
                debug!("stepping loop stopped");
                break;
            }
            _ = ticker.tick() => {
                let result = write_engine(&engine).tick(clock.now());
                if result.terminated() {
                    debug!("stepping loop finished with the round");
                    break;
                }
            }
        }
    }
}

fn read_engine(engine: &RwLock<GameEngine>) -> RwLockReadGuard<'_, GameEngine> {
    engine.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_engine(engine: &RwLock<GameEngine>) -> RwLockWriteGuard<'_, GameEngine> {
    engine.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Difficulty, ManualClock, Position};

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn simulation(config: GameConfig) -> (Simulation, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let sim = Simulation::with_clock(config.with_seed(3), clock.clone()).unwrap();
        (sim, clock)
    }

    #[tokio::test(start_paused = true)]
    async fn test_stepper_moves_snake_on_deadline() {
        let (mut sim, clock) = simulation(GameConfig::default());
        sim.start(RoundSetup::new(1, Difficulty::Normal)).await;
        assert!(sim.is_stepping());

        tokio::time::sleep(ms(50)).await;
        assert_eq!(sim.snapshot().snakes[0].head(), Some(Position::new(8, 15)));

        clock.advance(ms(120));
        tokio::time::sleep(ms(50)).await;
        assert_eq!(sim.snapshot().snakes[0].head(), Some(Position::new(9, 15)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_stops_stepper_and_clears_round() {
        let (mut sim, _clock) = simulation(GameConfig::default());
        sim.start(RoundSetup::new(2, Difficulty::Hard)).await;
        tokio::time::sleep(ms(30)).await;

        sim.reset().await;

        assert!(!sim.is_stepping());
        assert!(!sim.is_running());
        let snapshot = sim.snapshot();
        assert_eq!(snapshot.state, RoundState::NotStarted);
        assert!(snapshot.snakes.is_empty());
        assert!(snapshot.food.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stepper_exits_on_game_over() {
        let (mut sim, clock) = simulation(GameConfig::small());
        sim.start(RoundSetup::new(1, Difficulty::Insane)).await;

        for _ in 0..20 {
            clock.advance(ms(70));
            tokio::time::sleep(ms(20)).await;
        }

        let snapshot = sim.snapshot();
        assert!(snapshot.is_game_over());
        assert!(!snapshot.snakes[0].alive);
        assert!(sim.is_running());
        assert!(!sim.is_stepping());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_holds_snakes_in_place() {
        let (mut sim, clock) = simulation(GameConfig::default());
        sim.start(RoundSetup::new(2, Difficulty::Normal)).await;

        assert_eq!(sim.apply(Action::TogglePause).await, RoundState::Paused);
        clock.advance(ms(1000));
        tokio::time::sleep(ms(50)).await;
        let paused = sim.snapshot();
        assert!(paused.is_paused());
        assert_eq!(paused.snakes[0].head(), Some(Position::new(8, 15)));

        assert_eq!(sim.apply(Action::TogglePause).await, RoundState::Running);
        clock.advance(ms(120));
        tokio::time::sleep(ms(50)).await;
        assert_eq!(sim.snapshot().snakes[0].head(), Some(Position::new(9, 15)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_turn_applies_on_next_step() {
        let (mut sim, clock) = simulation(GameConfig::default());
        sim.start(RoundSetup::new(1, Difficulty::Normal)).await;

        sim.apply(Action::turn(1, Direction::Left)).await;
        sim.apply(Action::turn(1, Direction::Up)).await;
        sim.apply(Action::turn(4, Direction::Up)).await;

        clock.advance(ms(120));
        tokio::time::sleep(ms(50)).await;
        let snake = &sim.snapshot().snakes[0];
        assert_eq!(snake.direction, Direction::Up);
        assert_eq!(snake.head(), Some(Position::new(8, 14)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_round() {
        let (mut sim, _clock) = simulation(GameConfig::default());
        sim.start(RoundSetup::new(4, Difficulty::Easy)).await;
        sim.start(RoundSetup::new(1, Difficulty::Normal)).await;

        let snapshot = sim.snapshot();
        assert_eq!(snapshot.snakes.len(), 1);
        assert_eq!(snapshot.difficulty, Difficulty::Normal);
        assert!(sim.is_stepping());

        assert_eq!(sim.apply(Action::Reset).await, RoundState::NotStarted);
        assert!(!sim.is_stepping());
    }
}
