use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::game::{PlayerId, RoundSnapshot};

/// Session statistics kept in memory for the HUD
pub struct GameMetrics {
    pub start_time: Instant,
    pub elapsed_time: Duration,
    pub high_score: u32,
    pub rounds_played: u32,
    pub wins: HashMap<PlayerId, u32>,
    round_live: bool,
    paused_since: Option<Instant>,
    paused_total: Duration,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            elapsed_time: Duration::ZERO,
            high_score: 0,
            rounds_played: 0,
            wins: HashMap::new(),
            round_live: false,
            paused_since: None,
            paused_total: Duration::ZERO,
        }
    }

    /// Refresh the round timer; it stops once the round is over or paused
    pub fn update(&mut self, snapshot: &RoundSnapshot) {
        self.update_at(snapshot, Instant::now());
    }

    fn update_at(&mut self, snapshot: &RoundSnapshot, now: Instant) {
        if !self.round_live {
            return;
        }
        if snapshot.is_game_over() {
            self.on_round_over(snapshot);
            return;
        }
        if snapshot.is_paused() {
            self.paused_since.get_or_insert(now);
            return;
        }

        // Paused spans are cut out of the clock, like the step deadlines
        if let Some(since) = self.paused_since.take() {
            self.paused_total += now.saturating_duration_since(since);
        }
        self.elapsed_time = now
            .saturating_duration_since(self.start_time)
            .saturating_sub(self.paused_total);
    }

    pub fn on_round_start(&mut self) {
        self.start_time = Instant::now();
        self.elapsed_time = Duration::ZERO;
        self.paused_since = None;
        self.paused_total = Duration::ZERO;
        self.round_live = true;
    }

    /// Close out a round; only the first call per round counts
    pub fn on_round_over(&mut self, snapshot: &RoundSnapshot) {
        if !self.round_live {
            return;
        }
        self.round_live = false;
        self.rounds_played += 1;
        self.high_score = self.high_score.max(snapshot.best_score());

        // A multiplayer round is won by the last snake standing
        if snapshot.snakes.len() > 1 {
            if let Some(winner) = snapshot.snakes.iter().find(|s| s.alive) {
                *self.wins.entry(winner.id).or_default() += 1;
            }
        }
    }

    /// Abandon a round without recording it
    pub fn on_reset(&mut self) {
        self.round_live = false;
        self.elapsed_time = Duration::ZERO;
        self.paused_since = None;
        self.paused_total = Duration::ZERO;
    }

    pub fn wins_for(&self, player: PlayerId) -> u32 {
        self.wins.get(&player).copied().unwrap_or(0)
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}
