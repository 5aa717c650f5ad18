pub mod flappy;
pub mod memory;
pub mod snake;
pub mod tictactoe;

pub const GAME_NAMES: [&str; 4] = ["Snake", "Tic-Tac-Toe", "Memory", "Flappy Bird"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameId {
    Snake,
    TicTacToe,
    Memory,
    Flappy,
}

impl GameId {
    pub fn all() -> &'static [GameId] {
        &[GameId::Snake, GameId::TicTacToe, GameId::Memory, GameId::Flappy]
    }

    pub fn index(&self) -> usize {
        match self {
            GameId::Snake => 0,
            GameId::TicTacToe => 1,
            GameId::Memory => 2,
            GameId::Flappy => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        GAME_NAMES[self.index()]
    }

    /// Store key of the persisted best score, for games that keep one.
    pub fn best_key(&self) -> Option<&'static str> {
        match self {
            GameId::Snake => Some("snakeHighScore"),
            GameId::Flappy => Some("flappyBirdHighScore"),
            GameId::TicTacToe | GameId::Memory => None,
        }
    }
}
