use std::time::Duration;

use crossterm::event::KeyCode;
use rand::seq::SliceRandom;

use crate::engine::{Action, Cadence, Deferred, Game, Keymap, RandomSource, Step};

#[cfg(test)]
pub const MISMATCH_DELAY: Duration = Duration::from_millis(1000);
pub const COLUMNS: usize = 4;

pub const SYMBOLS: [&str; 16] = [
    "🎮", "🎯", "🎲", "🎳", "🎨", "🎭", "🎪", "🎰", "🚀", "🌙", "⭐", "🌈", "🍎", "🍕", "⚽", "🎸",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn pairs(&self) -> usize {
        match self {
            Difficulty::Easy => 4,
            Difficulty::Medium => 6,
            Difficulty::Hard => 8,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    pub id: usize,
    pub symbol: &'static str,
    pub flipped: bool,
    pub matched: bool,
}

impl Card {
    #[cfg(test)]
    pub fn face_up(&self) -> bool {
        self.flipped || self.matched
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryCommand {
    /// Flip the card at this board position.
    Flip(usize),
    /// Turn a mismatched pair back face-down, if it is still pending.
    Conceal(usize, usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryEvent {
    Flipped(usize),
    Matched(usize, usize),
    Mismatched(usize, usize),
    Concealed(usize, usize),
    Cleared,
}

#[derive(Debug, Clone)]
pub struct Memory {
    cards: Vec<Card>,
    pending: Vec<usize>,
    moves: u32,
    difficulty: Difficulty,
    mismatch_delay: Duration,
}

/// Two cards per symbol, ids in deal order, positions shuffled.
pub fn deal(difficulty: Difficulty, rng: &mut dyn RandomSource) -> Vec<Card> {
    let symbols = &SYMBOLS[..difficulty.pairs()];
    let mut cards: Vec<Card> = symbols
        .iter()
        .chain(symbols.iter())
        .enumerate()
        .map(|(id, &symbol)| Card {
            id,
            symbol,
            flipped: false,
            matched: false,
        })
        .collect();
    cards.shuffle(rng);
    cards
}

impl Memory {
    pub fn new(difficulty: Difficulty, mismatch_delay: Duration, rng: &mut dyn RandomSource) -> Self {
        Self::with_cards(deal(difficulty, rng), difficulty, mismatch_delay)
    }

    pub fn with_cards(cards: Vec<Card>, difficulty: Difficulty, mismatch_delay: Duration) -> Self {
        Self {
            cards,
            pending: Vec::with_capacity(2),
            moves: 0,
            difficulty,
            mismatch_delay,
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    #[cfg(test)]
    pub fn pending(&self) -> &[usize] {
        &self.pending
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn matched_pairs(&self) -> usize {
        self.cards.iter().filter(|c| c.matched).count() / 2
    }

    pub fn with_difficulty(&self, difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..self.clone()
        }
    }

    fn flip(&self, pos: usize) -> Step<Self> {
        let Some(card) = self.cards.get(pos) else {
            return Step::quiet(self.clone());
        };
        if card.matched || card.flipped || self.pending.len() == 2 {
            return Step::quiet(self.clone());
        }

        let mut next = self.clone();
        let mut events = vec![MemoryEvent::Flipped(pos)];
        next.cards[pos].flipped = true;
        next.pending.push(pos);

        if let [a, b] = next.pending[..] {
            next.moves += 1;
            if next.cards[a].symbol == next.cards[b].symbol {
                next.cards[a].matched = true;
                next.cards[b].matched = true;
                next.pending.clear();
                events.push(MemoryEvent::Matched(a, b));
                if next.cards.iter().all(|c| c.matched) {
                    events.push(MemoryEvent::Cleared);
                }
            } else {
                events.push(MemoryEvent::Mismatched(a, b));
            }
        }
        Step { next, events }
    }

    fn conceal(&self, a: usize, b: usize) -> Step<Self> {
        let still_pending = self.pending[..] == [a, b]
            && [a, b].iter().all(|&i| self.cards.get(i).is_some_and(|c| c.flipped && !c.matched));
        if !still_pending {
            return Step::quiet(self.clone());
        }
        let mut next = self.clone();
        next.cards[a].flipped = false;
        next.cards[b].flipped = false;
        next.pending.clear();
        Step {
            next,
            events: vec![MemoryEvent::Concealed(a, b)],
        }
    }
}

impl Game for Memory {
    type Command = MemoryCommand;
    type Event = MemoryEvent;

    const NAME: &'static str = "memory";

    fn cadence(&self) -> Cadence {
        Cadence::OnInput
    }

    fn step(&self, command: Option<MemoryCommand>, _rng: &mut dyn RandomSource) -> Step<Self> {
        match command {
            Some(MemoryCommand::Flip(pos)) => self.flip(pos),
            Some(MemoryCommand::Conceal(a, b)) => self.conceal(a, b),
            None => Step::quiet(self.clone()),
        }
    }

    fn is_terminal(&self) -> bool {
        !self.cards.is_empty() && self.cards.iter().all(|c| c.matched)
    }

    fn score(&self) -> u32 {
        self.matched_pairs() as u32
    }

    fn restart(&self, rng: &mut dyn RandomSource) -> Self {
        Memory::new(self.difficulty, self.mismatch_delay, rng)
    }

    fn defer(&self, event: &MemoryEvent) -> Option<Deferred<MemoryCommand>> {
        match *event {
            MemoryEvent::Mismatched(a, b) => Some(Deferred {
                delay: self.mismatch_delay,
                command: MemoryCommand::Conceal(a, b),
            }),
            _ => None,
        }
    }
}

/// Cursor over a `COLUMNS`-wide grid of `cards` positions.
#[derive(Debug)]
pub struct MemoryKeys {
    cursor: usize,
    cards: usize,
}

impl MemoryKeys {
    pub fn new(cards: usize) -> Self {
        Self { cursor: 0, cards }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cards(&mut self, cards: usize) {
        self.cards = cards;
        self.cursor = self.cursor.min(cards.saturating_sub(1));
    }
}

impl Keymap for MemoryKeys {
    type Command = MemoryCommand;

    fn key(&mut self, code: KeyCode) -> Option<Action<MemoryCommand>> {
        if self.cards == 0 {
            return None;
        }
        let n = self.cards;
        match code {
            KeyCode::Up => self.cursor = (self.cursor + n - COLUMNS % n) % n,
            KeyCode::Down => self.cursor = (self.cursor + COLUMNS) % n,
            KeyCode::Left => self.cursor = (self.cursor + n - 1) % n,
            KeyCode::Right => self.cursor = (self.cursor + 1) % n,
            KeyCode::Enter | KeyCode::Char(' ') => {
                return Some(Action::Play(MemoryCommand::Flip(self.cursor)))
            }
            KeyCode::Char('r') | KeyCode::Char('R') => return Some(Action::Reset),
            _ => {}
        }
        None
    }

    fn pointer(&mut self, target: Option<usize>) -> Option<Action<MemoryCommand>> {
        let pos = target.filter(|&p| p < self.cards)?;
        self.cursor = pos;
        Some(Action::Play(MemoryCommand::Flip(pos)))
    }

    fn repeats(&self, code: KeyCode) -> bool {
        matches!(code, KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::engine::random::{Scripted, SystemRandom};
    use crate::engine::{Phase, Session};

    /// Unshuffled easy deck: positions 0-3 and 4-7 hold the same symbols.
    fn ordered() -> Memory {
        let symbols = &SYMBOLS[..4];
        let cards = symbols
            .iter()
            .chain(symbols.iter())
            .enumerate()
            .map(|(id, &symbol)| Card {
                id,
                symbol,
                flipped: false,
                matched: false,
            })
            .collect();
        Memory::with_cards(cards, Difficulty::Easy, MISMATCH_DELAY)
    }

    fn flip(pos: usize) -> Action<MemoryCommand> {
        Action::Play(MemoryCommand::Flip(pos))
    }

    fn session() -> Session<Memory> {
        Session::new(ordered(), Box::new(Scripted::default()))
    }

    #[test]
    fn every_symbol_appears_exactly_twice() {
        let mut rng = SystemRandom::seeded(5);
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            let cards = deal(difficulty, &mut rng);
            assert_eq!(cards.len(), difficulty.pairs() * 2);
            let mut counts: HashMap<&str, usize> = HashMap::new();
            for card in &cards {
                *counts.entry(card.symbol).or_default() += 1;
            }
            assert!(counts.values().all(|&n| n == 2));
        }
    }

    #[test]
    fn matching_pair_stays_face_up() {
        let mut s = session();
        s.dispatch(flip(0));
        s.dispatch(flip(4));
        let game = s.game();
        assert!(game.cards()[0].matched && game.cards()[4].matched);
        assert!(game.pending().is_empty());
        assert_eq!(game.moves(), 1);
        s.update(MISMATCH_DELAY * 3);
        assert!(s.game().cards()[0].face_up() && s.game().cards()[4].face_up());
    }

    #[test]
    fn mismatched_pair_flips_back_after_delay() {
        let mut s = session();
        s.dispatch(flip(0));
        s.dispatch(flip(1));
        assert!(s.awaiting_timer());
        s.update(Duration::from_millis(999));
        assert!(s.game().cards()[0].flipped);
        s.update(Duration::from_millis(1));
        assert!(!s.game().cards()[0].flipped);
        assert!(!s.game().cards()[1].flipped);
        assert!(s.game().pending().is_empty());
    }

    #[test]
    fn third_flip_waits_for_pending_pair() {
        let mut s = session();
        s.dispatch(flip(0));
        s.dispatch(flip(1));
        let before = s.game().cards().to_vec();
        s.dispatch(flip(2));
        assert_eq!(s.game().cards(), &before[..]);
        assert_eq!(s.game().moves(), 1);
    }

    #[test]
    fn resolved_or_face_up_cards_ignore_clicks() {
        let mut s = session();
        s.dispatch(flip(0));
        s.dispatch(flip(0));
        assert_eq!(s.game().pending(), &[0]);
        s.dispatch(flip(4));
        s.dispatch(flip(4));
        assert!(s.game().pending().is_empty());
        assert_eq!(s.game().moves(), 1);
        s.dispatch(flip(99));
        assert_eq!(s.game().moves(), 1);
    }

    #[test]
    fn stale_conceal_is_a_no_op() {
        let game = ordered();
        let mut rng = Scripted::default();
        let pair = game.step(Some(MemoryCommand::Flip(0)), &mut rng).next;
        let pair = pair.step(Some(MemoryCommand::Flip(1)), &mut rng).next;
        let wrong = pair.step(Some(MemoryCommand::Conceal(1, 2)), &mut rng);
        assert!(wrong.events.is_empty());
        assert!(wrong.next.cards()[0].flipped);

        let fresh = game.step(Some(MemoryCommand::Conceal(0, 1)), &mut rng);
        assert!(fresh.events.is_empty());
    }

    #[test]
    fn reset_during_delay_cancels_the_flip_back() {
        let mut s = session();
        s.dispatch(flip(0));
        s.dispatch(flip(1));
        s.dispatch(Action::Reset);
        assert!(!s.awaiting_timer());
        s.dispatch(flip(2));
        s.update(MISMATCH_DELAY * 2);
        assert_eq!(s.game().pending().len(), 1);
    }

    #[test]
    fn clearing_the_board_ends_the_run() {
        let mut s = session();
        let mut finished = None;
        for pos in 0..4 {
            s.dispatch(flip(pos));
            finished = s.dispatch(flip(pos + 4));
        }
        assert_eq!(finished.map(|f| f.score), Some(4));
        assert_eq!(s.phase(), Phase::GameOver);
        assert_eq!(s.game().moves(), 4);
    }

    #[test]
    fn keys_wrap_around_the_grid() {
        let mut keys = MemoryKeys::new(8);
        keys.key(KeyCode::Left);
        assert_eq!(keys.cursor(), 7);
        keys.key(KeyCode::Down);
        assert_eq!(keys.cursor(), 3);
        keys.key(KeyCode::Up);
        assert_eq!(keys.cursor(), 7);
        assert_eq!(keys.key(KeyCode::Enter), Some(flip(7)));
        assert_eq!(keys.pointer(Some(8)), None);
        keys.set_cards(4);
        assert_eq!(keys.cursor(), 3);
    }

    #[test]
    fn turn_based_board_has_no_pause_key() {
        let mut keys = MemoryKeys::new(8);
        assert!(keys.key(KeyCode::Char('p')).is_none());
        assert!(matches!(keys.key(KeyCode::Char(' ')), Some(Action::Play(MemoryCommand::Flip(0)))));
    }
}
