use std::time::Duration;

use crossterm::event::KeyCode;

use crate::engine::{Action, Cadence, Deferred, Game, Keymap, RandomSource, Step};

#[cfg(test)]
pub const AI_DELAY: Duration = Duration::from_millis(500);

/// Rows, columns, diagonals.
pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn other(&self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Mark::X => 'X',
            Mark::O => 'O',
        }
    }
}

pub type Board = [Option<Mark>; 9];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Winner { mark: Mark, line: [usize; 3] },
    Draw,
}

/// Winner if any line is complete, draw if the board is full, otherwise `None`.
pub fn evaluate(board: &Board) -> Option<Outcome> {
    for line in LINES {
        let [a, b, c] = line;
        if let Some(mark) = board[a] {
            if board[b] == Some(mark) && board[c] == Some(mark) {
                return Some(Outcome::Winner { mark, line });
            }
        }
    }
    if board.iter().all(Option::is_some) {
        return Some(Outcome::Draw);
    }
    None
}

/// The AI plays O and picks uniformly among empty cells. No lookahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opponent {
    Human,
    Ai { delay: Duration },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub x: u32,
    pub o: u32,
    pub draws: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicTacToeCommand {
    Mark(usize),
    AiMove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicTacToeEvent {
    Marked { cell: usize, mark: Mark },
    AiThinking,
    Finished(Outcome),
}

#[derive(Debug, Clone)]
pub struct TicTacToe {
    board: Board,
    turn: Mark,
    outcome: Option<Outcome>,
    opponent: Opponent,
    tally: Tally,
}

impl TicTacToe {
    pub fn new(opponent: Opponent) -> Self {
        Self {
            board: [None; 9],
            turn: Mark::X,
            outcome: None,
            opponent,
            tally: Tally::default(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Mark {
        self.turn
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    #[cfg(test)]
    pub fn opponent(&self) -> Opponent {
        self.opponent
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }

    pub fn vs_ai(&self) -> bool {
        matches!(self.opponent, Opponent::Ai { .. })
    }

    pub fn with_opponent(&self, opponent: Opponent) -> Self {
        Self {
            opponent,
            ..self.clone()
        }
    }

    pub fn with_tally_cleared(&self) -> Self {
        Self {
            tally: Tally::default(),
            ..self.clone()
        }
    }

    fn ai_to_move(&self) -> bool {
        self.vs_ai() && self.turn == Mark::O && self.outcome.is_none()
    }

    fn place(mut self, cell: usize, events: &mut Vec<TicTacToeEvent>) -> Self {
        let mark = self.turn;
        self.board[cell] = Some(mark);
        self.turn = mark.other();
        events.push(TicTacToeEvent::Marked { cell, mark });

        self.outcome = evaluate(&self.board);
        match self.outcome {
            Some(outcome) => {
                match outcome {
                    Outcome::Winner { mark: Mark::X, .. } => self.tally.x += 1,
                    Outcome::Winner { mark: Mark::O, .. } => self.tally.o += 1,
                    Outcome::Draw => self.tally.draws += 1,
                }
                events.push(TicTacToeEvent::Finished(outcome));
            }
            None if self.ai_to_move() => events.push(TicTacToeEvent::AiThinking),
            None => {}
        }
        self
    }
}

impl Game for TicTacToe {
    type Command = TicTacToeCommand;
    type Event = TicTacToeEvent;

    const NAME: &'static str = "tictactoe";

    fn cadence(&self) -> Cadence {
        Cadence::OnInput
    }

    fn step(&self, command: Option<TicTacToeCommand>, rng: &mut dyn RandomSource) -> Step<Self> {
        let mut events = Vec::new();
        let next = match command {
            // Marked cells stay put; the human cannot play the AI's turn.
            Some(TicTacToeCommand::Mark(cell)) if cell < 9 && self.board[cell].is_none() && !self.ai_to_move() => {
                self.clone().place(cell, &mut events)
            }
            Some(TicTacToeCommand::AiMove) if self.ai_to_move() => {
                let empty: Vec<usize> = (0..9).filter(|&i| self.board[i].is_none()).collect();
                if empty.is_empty() {
                    return Step::quiet(self.clone());
                }
                let cell = empty[rng.below(empty.len() as u32) as usize];
                self.clone().place(cell, &mut events)
            }
            _ => return Step::quiet(self.clone()),
        };
        Step { next, events }
    }

    fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }

    fn score(&self) -> u32 {
        self.tally.x
    }

    fn restart(&self, _rng: &mut dyn RandomSource) -> Self {
        Self {
            tally: self.tally,
            ..TicTacToe::new(self.opponent)
        }
    }

    fn defer(&self, event: &TicTacToeEvent) -> Option<Deferred<TicTacToeCommand>> {
        match (event, self.opponent) {
            (TicTacToeEvent::AiThinking, Opponent::Ai { delay }) => Some(Deferred {
                delay,
                command: TicTacToeCommand::AiMove,
            }),
            _ => None,
        }
    }
}

/// Cursor over the 3x3 board plus direct cell keys 1-9.
#[derive(Debug, Default)]
pub struct TicTacToeKeys {
    cursor: usize,
}

impl TicTacToeKeys {
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl Keymap for TicTacToeKeys {
    type Command = TicTacToeCommand;

    fn key(&mut self, code: KeyCode) -> Option<Action<TicTacToeCommand>> {
        let (row, col) = (self.cursor / 3, self.cursor % 3);
        match code {
            KeyCode::Up => self.cursor = ((row + 2) % 3) * 3 + col,
            KeyCode::Down => self.cursor = ((row + 1) % 3) * 3 + col,
            KeyCode::Left => self.cursor = row * 3 + (col + 2) % 3,
            KeyCode::Right => self.cursor = row * 3 + (col + 1) % 3,
            KeyCode::Enter | KeyCode::Char(' ') => {
                return Some(Action::Play(TicTacToeCommand::Mark(self.cursor)))
            }
            KeyCode::Char(c @ '1'..='9') => {
                self.cursor = c as usize - '1' as usize;
                return Some(Action::Play(TicTacToeCommand::Mark(self.cursor)));
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Char('r') | KeyCode::Char('R') => {
                return Some(Action::Reset)
            }
            _ => {}
        }
        None
    }

    fn pointer(&mut self, target: Option<usize>) -> Option<Action<TicTacToeCommand>> {
        let cell = target.filter(|&c| c < 9)?;
        self.cursor = cell;
        Some(Action::Play(TicTacToeCommand::Mark(cell)))
    }

    fn repeats(&self, code: KeyCode) -> bool {
        matches!(code, KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::random::Scripted;
    use crate::engine::{Phase, Session};

    use Mark::{O, X};

    fn mark(cell: usize) -> Action<TicTacToeCommand> {
        Action::Play(TicTacToeCommand::Mark(cell))
    }

    #[test]
    fn detects_top_row_winner() {
        let board = [Some(X), Some(X), Some(X), None, None, None, None, None, None];
        assert_eq!(
            evaluate(&board),
            Some(Outcome::Winner {
                mark: X,
                line: [0, 1, 2]
            })
        );
    }

    #[test]
    fn detects_draw() {
        #[rustfmt::skip]
        let board = [
            Some(X), Some(O), Some(X),
            Some(X), Some(O), Some(O),
            Some(O), Some(X), Some(X),
        ];
        assert_eq!(evaluate(&board), Some(Outcome::Draw));
        assert_eq!(evaluate(&[None; 9]), None);
    }

    #[test]
    fn marked_cell_is_immutable() {
        let game = TicTacToe::new(Opponent::Human);
        let mut rng = Scripted::default();
        let first = game.step(Some(TicTacToeCommand::Mark(0)), &mut rng).next;
        let second = first.step(Some(TicTacToeCommand::Mark(0)), &mut rng);
        assert_eq!(second.next.board(), first.board());
        assert_eq!(second.next.turn(), O);
        assert!(second.events.is_empty());
    }

    #[test]
    fn turns_alternate() {
        let mut game = TicTacToe::new(Opponent::Human);
        let mut rng = Scripted::default();
        for (i, expected) in [X, O, X, O].into_iter().enumerate() {
            assert_eq!(game.turn(), expected);
            game = game.step(Some(TicTacToeCommand::Mark(i)), &mut rng).next;
        }
    }

    #[test]
    fn x_wins_on_fifth_move_and_board_freezes() {
        let mut session = Session::new(TicTacToe::new(Opponent::Human), Box::new(Scripted::default()));
        let mut finished = None;
        for cell in [0, 4, 1, 5, 2] {
            finished = session.dispatch(mark(cell));
        }
        assert!(finished.is_some());
        assert_eq!(
            session.game().outcome(),
            Some(Outcome::Winner {
                mark: X,
                line: [0, 1, 2]
            })
        );
        assert_eq!(session.phase(), Phase::GameOver);

        let frozen = *session.game().board();
        session.dispatch(mark(8));
        assert_eq!(session.game().board(), &frozen);
        assert_eq!(session.game().tally().x, 1);
    }

    #[test]
    fn tally_survives_reset() {
        let mut session = Session::new(TicTacToe::new(Opponent::Human), Box::new(Scripted::default()));
        for cell in [0, 4, 1, 5, 2] {
            session.dispatch(mark(cell));
        }
        session.dispatch(Action::Reset);
        assert_eq!(session.game().board(), &[None; 9]);
        assert_eq!(session.game().tally().x, 1);
        let cleared = session.game().with_tally_cleared();
        session.replace(cleared);
        assert_eq!(session.game().tally(), Tally::default());
    }

    #[test]
    fn ai_replies_after_delay() {
        let opponent = Opponent::Ai { delay: AI_DELAY };
        let mut session = Session::new(TicTacToe::new(opponent), Box::new(Scripted::new(vec![3])));
        session.dispatch(mark(4));
        assert_eq!(session.game().turn(), O);

        // The human cannot move for O.
        session.dispatch(mark(0));
        assert_eq!(session.game().board()[0], None);

        session.update(Duration::from_millis(499));
        assert_eq!(session.game().turn(), O);
        session.update(Duration::from_millis(1));
        // Empty cells are [0,1,2,3,5,6,7,8]; index 3 is cell 3.
        assert_eq!(session.game().board()[3], Some(O));
        assert_eq!(session.game().turn(), X);
    }

    #[test]
    fn stray_ai_move_is_ignored() {
        let game = TicTacToe::new(Opponent::Ai { delay: AI_DELAY });
        let step = game.step(Some(TicTacToeCommand::AiMove), &mut Scripted::default());
        assert_eq!(step.next.board(), &[None; 9]);
        let human = TicTacToe::new(Opponent::Human).step(Some(TicTacToeCommand::Mark(0)), &mut Scripted::default());
        let after = human.next.step(Some(TicTacToeCommand::AiMove), &mut Scripted::default());
        assert_eq!(after.next.turn(), O);
    }

    #[test]
    fn keys_move_cursor_and_mark() {
        let mut keys = TicTacToeKeys::default();
        assert_eq!(keys.key(KeyCode::Right), None);
        assert_eq!(keys.key(KeyCode::Down), None);
        assert_eq!(keys.cursor(), 4);
        assert_eq!(keys.key(KeyCode::Enter), Some(mark(4)));
        assert_eq!(keys.key(KeyCode::Char('9')), Some(mark(8)));
        assert_eq!(keys.key(KeyCode::Left), None);
        assert_eq!(keys.cursor(), 7);
        assert_eq!(keys.pointer(Some(2)), Some(mark(2)));
        assert_eq!(keys.pointer(None), None);
    }
}
