use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::game::{Action, Direction, PlayerId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    GameAction(Action),
    Start,
    /// Choose how many players the next round seats
    SetPlayers(usize),
    CycleDifficulty,
    Quit,
    None,
}

/// Key groups, one per player slot: up, down, left, right
const PLAYER_KEYS: [(PlayerId, [char; 4]); 3] = [
    (2, ['w', 's', 'a', 'd']),
    (3, ['t', 'g', 'f', 'h']),
    (4, ['i', 'k', 'j', 'l']),
];

const DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];

pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key_event(&self, key: KeyEvent) -> KeyAction {
        // Handle Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        match key.code {
            // Player 1 - Arrow keys
            KeyCode::Up => KeyAction::GameAction(Action::turn(1, Direction::Up)),
            KeyCode::Down => KeyAction::GameAction(Action::turn(1, Direction::Down)),
            KeyCode::Left => KeyAction::GameAction(Action::turn(1, Direction::Left)),
            KeyCode::Right => KeyAction::GameAction(Action::turn(1, Direction::Right)),

            // Controls
            KeyCode::Char(' ') => KeyAction::GameAction(Action::TogglePause),
            KeyCode::Enter => KeyAction::Start,
            KeyCode::Tab => KeyAction::CycleDifficulty,
            KeyCode::Esc => KeyAction::Quit,
            KeyCode::Char(c @ '1'..='4') => KeyAction::SetPlayers(c as usize - '0' as usize),

            KeyCode::Char(c) => Self::map_char(c.to_ascii_lowercase()),

            _ => KeyAction::None,
        }
    }

    fn map_char(c: char) -> KeyAction {
        match c {
            'q' => return KeyAction::Quit,
            'r' => return KeyAction::GameAction(Action::Reset),
            _ => {}
        }

        // Players 2-4 - WASD, TFGH, IJKL
        for (player, keys) in PLAYER_KEYS {
            if let Some(i) = keys.iter().position(|k| *k == c) {
                return KeyAction::GameAction(Action::turn(player, DIRECTIONS[i]));
            }
        }

        KeyAction::None
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
