use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use std::collections::HashMap;

use crate::game::{PlayerColor, Position, RoundSetup, RoundSnapshot};
use crate::metrics::GameMetrics;

/// Key hints per player slot, in slot order
const PLAYER_CONTROLS: [&str; 4] = ["↑←↓→", "W A S D", "T F G H", "I J K L"];

enum Cell {
    Empty,
    Food,
    Head(Color),
    Body(Color),
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        snapshot: &RoundSnapshot,
        setup: &RoundSetup,
        metrics: &GameMetrics,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        let stats = self.render_stats(snapshot, setup, metrics);
        frame.render_widget(stats, chunks[0]);

        // Board on the left, scoreboard on the right
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(28)])
            .split(chunks[1]);

        if snapshot.state.is_active() {
            let grid = self.render_grid(snapshot);
            frame.render_widget(grid, body[0]);
            frame.render_widget(self.render_scores(snapshot, metrics), body[1]);

            if snapshot.is_paused() {
                let area = centered(body[0], 30, 4);
                let banner = self.render_banner("PAUSED", "Space to resume", Color::Yellow);
                frame.render_widget(Clear, area);
                frame.render_widget(banner, area);
            } else if snapshot.is_game_over() {
                let area = centered(body[0], 48, 8);
                frame.render_widget(Clear, area);
                frame.render_widget(self.render_game_over(snapshot), area);
            }
        } else {
            frame.render_widget(self.render_setup(setup), body[0]);
            frame.render_widget(self.render_scores(snapshot, metrics), body[1]);
        }

        let controls = self.render_controls(snapshot);
        frame.render_widget(controls, chunks[2]);
    }

    fn render_grid(&self, snapshot: &RoundSnapshot) -> Paragraph<'_> {
        let mut cells: HashMap<Position, Cell> = HashMap::new();
        if let Some(food) = snapshot.food {
            cells.insert(food, Cell::Food);
        }
        for snake in &snapshot.snakes {
            let color = to_color(snake.color);
            for (i, segment) in snake.body.iter().enumerate() {
                let cell = if i == 0 && snake.alive {
                    Cell::Head(color)
                } else {
                    Cell::Body(color)
                };
                // Heads win over stacked segments underneath them
                if i == 0 || !matches!(cells.get(segment), Some(Cell::Head(_))) {
                    cells.insert(*segment, cell);
                }
            }
        }

        let mut lines = Vec::with_capacity(snapshot.grid_height);
        for y in 0..snapshot.grid_height {
            let mut spans = Vec::with_capacity(snapshot.grid_width);

            for x in 0..snapshot.grid_width {
                let pos = Position::new(x as i32, y as i32);

                let span = match cells.get(&pos).unwrap_or(&Cell::Empty) {
                    Cell::Head(color) => Span::styled(
                        "■ ",
                        Style::default().fg(*color).add_modifier(Modifier::BOLD),
                    ),
                    Cell::Body(color) => Span::styled("□ ", Style::default().fg(*color)),
                    Cell::Food => Span::styled(
                        "O ",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ),
                    Cell::Empty => Span::styled(". ", Style::default().fg(Color::DarkGray)),
                };

                spans.push(span);
            }

            lines.push(Line::from(spans));
        }

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::White))
                    .title(" Snake Arena "),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(
        &self,
        snapshot: &RoundSnapshot,
        setup: &RoundSetup,
        metrics: &GameMetrics,
    ) -> Paragraph<'_> {
        let difficulty = if snapshot.state.is_active() {
            snapshot.difficulty
        } else {
            setup.difficulty
        };

        let text = vec![Line::from(vec![
            Span::styled("Level: ", Style::default().fg(Color::Yellow)),
            Span::styled(difficulty.label(), Style::default().fg(Color::White)),
            Span::raw("    "),
            Span::styled("Time: ", Style::default().fg(Color::Yellow)),
            Span::styled(metrics.format_time(), Style::default().fg(Color::White)),
            Span::raw("    "),
            Span::styled("Best: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                metrics.high_score.to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Rounds: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                metrics.rounds_played.to_string(),
                Style::default().fg(Color::White),
            ),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_scores(&self, snapshot: &RoundSnapshot, metrics: &GameMetrics) -> Paragraph<'_> {
        let mut lines = Vec::new();

        for snake in &snapshot.snakes {
            let mut spans = vec![
                Span::styled(
                    format!("P{} ", snake.id),
                    Style::default()
                        .fg(to_color(snake.color))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("score: ", Style::default().fg(Color::Gray)),
                Span::styled(snake.score.to_string(), Style::default().fg(Color::White)),
            ];
            if !snake.alive {
                spans.push(Span::styled(" (dead)", Style::default().fg(Color::Red)));
            }
            lines.push(Line::from(spans));
            lines.push(Line::from(Span::styled(
                format!(
                    "   {} ms/step, wins {}",
                    snake.step_interval.as_millis(),
                    metrics.wins_for(snake.id)
                ),
                Style::default().fg(Color::DarkGray),
            )));
        }

        if lines.is_empty() {
            lines.push(Line::from(Span::styled(
                "No round in progress",
                Style::default().fg(Color::DarkGray),
            )));
        }

        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Players "),
        )
    }

    fn render_setup(&self, setup: &RoundSetup) -> Paragraph<'_> {
        let mut text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Each player steers a snake. Eat food to grow and speed up,",
                Style::default().fg(Color::Gray),
            )),
            Line::from(Span::styled(
                "avoid walls and every body on the board. Last snake alive wins.",
                Style::default().fg(Color::Gray),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("Players: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    setup.player_count().to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("  (1-4 to change)", Style::default().fg(Color::DarkGray)),
            ]),
            Line::from(vec![
                Span::styled("Difficulty: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    setup.difficulty.label(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("  (Tab to change)", Style::default().fg(Color::DarkGray)),
            ]),
            Line::from(""),
        ];

        for (slot, keys) in PLAYER_CONTROLS.iter().enumerate().take(setup.player_count()) {
            let color = setup.color_for(slot);
            text.push(Line::from(vec![
                Span::styled(
                    format!("Player {} ", slot + 1),
                    Style::default()
                        .fg(to_color(color))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("{color}  "), Style::default().fg(Color::DarkGray)),
                Span::styled(*keys, Style::default().fg(Color::Cyan)),
            ]));
        }

        text.push(Line::from(""));
        text.push(Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::Gray)),
            Span::styled(
                "Enter",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to start", Style::default().fg(Color::Gray)),
        ]));

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(Color::White))
                .title(" New Round "),
        )
    }

    fn render_banner(
        &self,
        title: &'static str,
        hint: &'static str,
        color: Color,
    ) -> Paragraph<'_> {
        let text = vec![
            Line::from(Span::styled(
                title,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(hint, Style::default().fg(Color::Gray))),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        )
    }

    fn render_game_over(&self, snapshot: &RoundSnapshot) -> Paragraph<'_> {
        let outcome = match snapshot.leader() {
            Some(leader) if snapshot.snakes.len() > 1 && leader.alive => {
                format!("Player {} survives!", leader.id)
            }
            Some(leader) if snapshot.snakes.len() > 1 => {
                format!("No survivors - Player {} led on score", leader.id)
            }
            _ => format!("Final Score: {}", snapshot.best_score()),
        };

        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(Span::styled(
                outcome,
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "R",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to reset or ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Q",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to quit", Style::default().fg(Color::Gray)),
            ]),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_controls(&self, snapshot: &RoundSnapshot) -> Paragraph<'_> {
        let text = if snapshot.state.is_active() {
            vec![Line::from(vec![
                Span::styled("Space", Style::default().fg(Color::Cyan)),
                Span::raw(" pause | "),
                Span::styled("R", Style::default().fg(Color::Cyan)),
                Span::raw(" reset | "),
                Span::styled("Q", Style::default().fg(Color::Red)),
                Span::raw(" to quit"),
            ])]
        } else {
            vec![Line::from(vec![
                Span::styled("Enter", Style::default().fg(Color::Cyan)),
                Span::raw(" start | "),
                Span::styled("1-4", Style::default().fg(Color::Cyan)),
                Span::raw(" players | "),
                Span::styled("Tab", Style::default().fg(Color::Cyan)),
                Span::raw(" difficulty | "),
                Span::styled("Q", Style::default().fg(Color::Red)),
                Span::raw(" to quit"),
            ])]
        };

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn to_color(color: PlayerColor) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

/// Rectangle of at most `width` x `height` centered in `area`
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Difficulty, GameConfig, GameEngine};
    use ratatui::{Terminal, backend::TestBackend};
    use std::time::Duration;

    fn draw(snapshot: &RoundSnapshot, setup: &RoundSetup) -> String {
        let backend = TestBackend::new(120, 45);
        let mut terminal = Terminal::new(backend).unwrap();
        let metrics = GameMetrics::new();
        terminal
            .draw(|frame| Renderer::new().render(frame, snapshot, setup, &metrics))
            .unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_setup_screen_lists_players() {
        let setup = RoundSetup::new(3, Difficulty::Hard);
        let screen = draw(&RoundSnapshot::default(), &setup);
        assert!(screen.contains("New Round"));
        assert!(screen.contains("Player 3"));
        assert!(!screen.contains("Player 4"));
        assert!(screen.contains("HARD"));
    }

    #[test]
    fn test_running_round_shows_board_and_scores() {
        let setup = RoundSetup::new(2, Difficulty::Normal);
        let mut engine = GameEngine::new(GameConfig::default().with_seed(1)).unwrap();
        engine.start(&setup, Duration::ZERO);
        let screen = draw(&engine.snapshot(), &setup);
        assert!(screen.contains("Snake Arena"));
        assert!(screen.contains("P1"));
        assert!(screen.contains("P2"));
        assert!(screen.contains('■'));
        assert!(!screen.contains("GAME OVER"));
    }

    #[test]
    fn test_pause_banner() {
        let setup = RoundSetup::new(1, Difficulty::Normal);
        let mut engine = GameEngine::new(GameConfig::default().with_seed(1)).unwrap();
        engine.start(&setup, Duration::ZERO);
        engine.toggle_pause(Duration::ZERO);
        assert!(draw(&engine.snapshot(), &setup).contains("PAUSED"));
    }

    #[test]
    fn test_centered_rect_clamps() {
        let area = Rect::new(0, 0, 20, 10);
        assert_eq!(centered(area, 10, 4), Rect::new(5, 3, 10, 4));
        assert_eq!(centered(area, 50, 50), area);
    }
}
