use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent};
use ratatui::layout::{Position, Rect};
use tracing::{debug, info};

use crate::config::Config;
use crate::engine::{Finished, Game, InputMapper, Keymap, Phase, Session, SystemRandom};
use crate::games::flappy::{Flappy, FlappyKeys};
use crate::games::memory::{Difficulty, Memory, MemoryKeys};
use crate::games::snake::{Snake, SnakeKeys};
use crate::games::tictactoe::{Opponent, TicTacToe, TicTacToeKeys};
use crate::games::GameId;
use crate::scores::BestScores;

/// Longest frame fed to a session; anything beyond is treated as a stall.
const MAX_FRAME: Duration = Duration::from_millis(250);

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Tab {
    Home,
    Snake,
    TicTacToe,
    Memory,
    Flappy,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[Tab::Home, Tab::Snake, Tab::TicTacToe, Tab::Memory, Tab::Flappy]
    }

    pub fn title(&self) -> &str {
        match self {
            Tab::Home => " Home ",
            Tab::Snake => " Snake ",
            Tab::TicTacToe => " Tic-Tac-Toe ",
            Tab::Memory => " Memory ",
            Tab::Flappy => " Flappy ",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Tab::Home => 0,
            Tab::Snake => 1,
            Tab::TicTacToe => 2,
            Tab::Memory => 3,
            Tab::Flappy => 4,
        }
    }

    pub fn game(&self) -> Option<GameId> {
        match self {
            Tab::Home => None,
            Tab::Snake => Some(GameId::Snake),
            Tab::TicTacToe => Some(GameId::TicTacToe),
            Tab::Memory => Some(GameId::Memory),
            Tab::Flappy => Some(GameId::Flappy),
        }
    }

    fn for_game(game: GameId) -> Tab {
        match game {
            GameId::Snake => Tab::Snake,
            GameId::TicTacToe => Tab::TicTacToe,
            GameId::Memory => Tab::Memory,
            GameId::Flappy => Tab::Flappy,
        }
    }
}

/// A session together with the input mapper that feeds it.
pub struct Cabinet<G: Game, K: Keymap<Command = G::Command>> {
    pub session: Session<G>,
    pub input: InputMapper<K>,
}

impl<G: Game, K: Keymap<Command = G::Command>> Cabinet<G, K> {
    fn new(session: Session<G>, keymap: K, tracks_release: bool) -> Self {
        Self {
            session,
            input: InputMapper::new(keymap, tracks_release),
        }
    }

    fn key_down(&mut self, code: KeyCode) -> Option<Finished> {
        let action = self.input.on_key_down(code)?;
        self.session.dispatch(action)
    }

    fn key_up(&mut self, code: KeyCode) {
        self.input.on_key_up(code);
    }

    fn pointer(&mut self, target: Option<usize>) -> Option<Finished> {
        let action = self.input.on_pointer_down(target)?;
        self.session.dispatch(action)
    }

    fn update(&mut self, dt: Duration) -> Option<Finished> {
        self.session.update(dt)
    }
}

pub struct App {
    pub should_quit: bool,
    pub current_tab: Tab,
    pub selected_game: usize,
    pub snake: Cabinet<Snake, SnakeKeys>,
    pub tictactoe: Cabinet<TicTacToe, TicTacToeKeys>,
    pub memory: Cabinet<Memory, MemoryKeys>,
    pub flappy: Cabinet<Flappy, FlappyKeys>,
    pub scores: BestScores,
    /// Set when the last finished run beat the stored best.
    pub new_best: Option<GameId>,
    /// Clickable cells of the active game, filled in by the renderer.
    pub hit_regions: Vec<(Rect, usize)>,
    ai_delay: Duration,
    last_frame: Instant,
}

fn rng(seed: Option<u64>, salt: u64) -> SystemRandom {
    SystemRandom::from_config(seed.map(|s| s.wrapping_add(salt)))
}

impl App {
    pub fn new(config: &Config, mut scores: BestScores, tracks_release: bool) -> Self {
        for game in GameId::all() {
            scores.load_best(*game);
        }

        let snake = Session::new(Snake::new(config.snake_settings()), Box::new(rng(config.seed, 1)));
        let tictactoe = Session::new(TicTacToe::new(config.opponent()), Box::new(rng(config.seed, 2)));
        let mut memory_rng = rng(config.seed, 3);
        let memory_game = Memory::new(config.memory.difficulty, config.mismatch_delay(), &mut memory_rng);
        let cards = memory_game.cards().len();
        let memory = Session::new(memory_game, Box::new(memory_rng));
        let flappy = Session::new(Flappy::new(config.flappy_frame()), Box::new(rng(config.seed, 4)));

        Self {
            should_quit: false,
            current_tab: Tab::Home,
            selected_game: 0,
            snake: Cabinet::new(snake, SnakeKeys, tracks_release),
            tictactoe: Cabinet::new(tictactoe, TicTacToeKeys::default(), tracks_release),
            memory: Cabinet::new(memory, MemoryKeys::new(cards), tracks_release),
            flappy: Cabinet::new(flappy, FlappyKeys, tracks_release),
            scores,
            new_best: None,
            hit_regions: Vec::new(),
            ai_delay: config.ai_delay(),
            last_frame: Instant::now(),
        }
    }

    /// Advances the active game by the wall time since the previous call.
    pub fn on_tick(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).min(MAX_FRAME);
        self.last_frame = now;

        let finished = match self.current_tab {
            Tab::Home => None,
            Tab::Snake => self.snake.update(dt),
            Tab::TicTacToe => self.tictactoe.update(dt),
            Tab::Memory => self.memory.update(dt),
            Tab::Flappy => self.flappy.update(dt),
        };
        self.record(finished);
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            self.release(key.code);
            return;
        }

        // Ctrl+C always quits
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if key.kind == KeyEventKind::Press && self.handle_global(key) {
            return;
        }

        let finished = match self.current_tab {
            Tab::Home => None,
            Tab::Snake => self.snake.key_down(key.code),
            Tab::TicTacToe => self.tictactoe.key_down(key.code),
            Tab::Memory => self.memory.key_down(key.code),
            Tab::Flappy => self.flappy.key_down(key.code),
        };
        self.record(finished);
    }

    pub fn on_mouse(&mut self, mouse: MouseEvent) {
        let at = Position::new(mouse.column, mouse.row);
        let target = self
            .hit_regions
            .iter()
            .find(|(rect, _)| rect.contains(at))
            .map(|(_, index)| *index);

        let finished = match self.current_tab {
            Tab::Home => None,
            Tab::Snake => self.snake.pointer(target),
            Tab::TicTacToe => self.tictactoe.pointer(target),
            Tab::Memory => self.memory.pointer(target),
            Tab::Flappy => self.flappy.pointer(target),
        };
        self.record(finished);
    }

    pub fn best(&self, game: GameId) -> u32 {
        self.scores.best(game)
    }

    /// Lifecycle phase behind a tab; `None` for Home.
    pub fn phase(&self, tab: Tab) -> Option<Phase> {
        match tab {
            Tab::Home => None,
            Tab::Snake => Some(self.snake.session.phase()),
            Tab::TicTacToe => Some(self.tictactoe.session.phase()),
            Tab::Memory => Some(self.memory.session.phase()),
            Tab::Flappy => Some(self.flappy.session.phase()),
        }
    }

    /// Returns true when the key was consumed by navigation or settings.
    fn handle_global(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') if self.current_tab == Tab::Home => {
                self.should_quit = true;
                return true;
            }
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.prev_tab();
                } else {
                    self.next_tab();
                }
                return true;
            }
            KeyCode::BackTab => {
                self.prev_tab();
                return true;
            }
            KeyCode::Esc if self.current_tab != Tab::Home => {
                self.switch_to(Tab::Home);
                return true;
            }
            _ => {}
        }

        match self.current_tab {
            Tab::Home => self.handle_home(key.code),
            Tab::TicTacToe => self.handle_tictactoe_settings(key.code),
            Tab::Memory => self.handle_memory_settings(key.code),
            Tab::Snake | Tab::Flappy => false,
        }
    }

    fn handle_home(&mut self, code: KeyCode) -> bool {
        let count = GameId::all().len();
        match code {
            KeyCode::Char(c @ '1'..='4') => {
                let game = GameId::all()[c as usize - '1' as usize];
                self.switch_to(Tab::for_game(game));
            }
            KeyCode::Right | KeyCode::Down => self.selected_game = (self.selected_game + 1) % count,
            KeyCode::Left | KeyCode::Up => self.selected_game = (self.selected_game + count - 1) % count,
            KeyCode::Enter => {
                let game = GameId::all()[self.selected_game];
                self.switch_to(Tab::for_game(game));
            }
            _ => return false,
        }
        true
    }

    fn handle_tictactoe_settings(&mut self, code: KeyCode) -> bool {
        let game = self.tictactoe.session.game();
        let next = match code {
            KeyCode::Char('m') | KeyCode::Char('M') => {
                let opponent = if game.vs_ai() {
                    Opponent::Human
                } else {
                    Opponent::Ai { delay: self.ai_delay }
                };
                info!(?opponent, "tic-tac-toe mode changed");
                game.with_opponent(opponent)
            }
            KeyCode::Char('x') | KeyCode::Char('X') => game.with_tally_cleared(),
            _ => return false,
        };
        self.tictactoe.session.replace(next);
        true
    }

    fn handle_memory_settings(&mut self, code: KeyCode) -> bool {
        let difficulty = match code {
            KeyCode::Char('1') => Difficulty::Easy,
            KeyCode::Char('2') => Difficulty::Medium,
            KeyCode::Char('3') => Difficulty::Hard,
            _ => return false,
        };
        let next = self.memory.session.game().with_difficulty(difficulty);
        self.memory.session.replace(next);
        let cards = self.memory.session.game().cards().len();
        self.memory.input.keymap_mut().set_cards(cards);
        info!(difficulty = difficulty.label(), "memory difficulty changed");
        true
    }

    fn release(&mut self, code: KeyCode) {
        match self.current_tab {
            Tab::Home => {}
            Tab::Snake => self.snake.key_up(code),
            Tab::TicTacToe => self.tictactoe.key_up(code),
            Tab::Memory => self.memory.key_up(code),
            Tab::Flappy => self.flappy.key_up(code),
        }
    }

    fn record(&mut self, finished: Option<Finished>) {
        let (Some(finished), Some(game)) = (finished, self.current_tab.game()) else {
            return;
        };
        debug!(game = game.name(), score = finished.score, "run finished");
        self.new_best = self.scores.save_best(game, finished.score).then_some(game);
    }

    fn switch_to(&mut self, tab: Tab) {
        self.snake.input.release_all();
        self.tictactoe.input.release_all();
        self.memory.input.release_all();
        self.flappy.input.release_all();
        self.hit_regions.clear();
        self.current_tab = tab;
        if let Some(game) = tab.game() {
            self.selected_game = game.index();
        }
    }

    fn next_tab(&mut self) {
        let tabs = Tab::all();
        let idx = self.current_tab.index();
        self.switch_to(tabs[(idx + 1) % tabs.len()]);
    }

    fn prev_tab(&mut self) {
        let tabs = Tab::all();
        let idx = self.current_tab.index();
        self.switch_to(tabs[(idx + tabs.len() - 1) % tabs.len()]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scores::MemoryStore;

    fn app() -> App {
        let config = Config {
            seed: Some(1),
            ..Config::default()
        };
        App::new(&config, BestScores::new(Box::new(MemoryStore::default())), true)
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn release(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Release)
    }

    #[test]
    fn home_navigation_opens_games() {
        let mut app = app();
        app.on_key(press(KeyCode::Char('2')));
        assert_eq!(app.current_tab, Tab::TicTacToe);
        app.on_key(press(KeyCode::Esc));
        assert_eq!(app.current_tab, Tab::Home);
        // Leaving a game keeps it selected on Home.
        assert_eq!(app.selected_game, GameId::TicTacToe.index());
        app.on_key(press(KeyCode::Right));
        app.on_key(press(KeyCode::Enter));
        assert_eq!(app.current_tab, Tab::Memory);
        app.on_key(press(KeyCode::Tab));
        assert_eq!(app.current_tab, Tab::Flappy);
        app.on_key(press(KeyCode::Tab));
        assert_eq!(app.current_tab, Tab::Home);
        app.on_key(press(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn flappy_jump_needs_a_release_between_presses() {
        let mut app = app();
        app.on_key(press(KeyCode::Char('4')));
        app.on_key(press(KeyCode::Char(' ')));
        assert_eq!(app.flappy.session.phase(), Phase::Running);
        assert!(app.flappy.input.on_key_down(KeyCode::Char(' ')).is_none());
        app.on_key(release(KeyCode::Char(' ')));
        assert!(app.flappy.input.on_key_down(KeyCode::Char(' ')).is_some());
    }

    #[test]
    fn tictactoe_mode_toggle_starts_a_new_round() {
        let mut app = app();
        app.on_key(press(KeyCode::Char('2')));
        app.on_key(press(KeyCode::Char('1')));
        assert_eq!(app.tictactoe.session.game().board()[0], Some(crate::games::tictactoe::Mark::X));
        app.on_key(press(KeyCode::Char('m')));
        assert!(app.tictactoe.session.game().vs_ai());
        assert_eq!(app.tictactoe.session.game().board()[0], None);
        assert_eq!(app.tictactoe.session.phase(), Phase::Idle);
    }

    #[test]
    fn memory_difficulty_reshapes_the_deck() {
        let mut app = app();
        app.on_key(press(KeyCode::Char('3')));
        assert_eq!(app.current_tab, Tab::Memory);
        app.on_key(press(KeyCode::Char('3')));
        assert_eq!(app.memory.session.game().cards().len(), 16);
        app.on_key(press(KeyCode::Char('1')));
        assert_eq!(app.memory.session.game().cards().len(), 8);
    }

    #[test]
    fn pointer_hits_the_cell_under_it() {
        let mut app = app();
        app.on_key(press(KeyCode::Char('2')));
        app.hit_regions = vec![(Rect::new(10, 5, 7, 3), 4)];
        app.on_mouse(MouseEvent {
            kind: crossterm::event::MouseEventKind::Down(crossterm::event::MouseButton::Left),
            column: 12,
            row: 6,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(app.tictactoe.session.game().board()[4], Some(crate::games::tictactoe::Mark::X));
    }

    #[test]
    fn finished_runs_update_best_scores() {
        let mut app = app();
        app.current_tab = Tab::Flappy;
        app.record(Some(Finished { score: 6, ticks: 900 }));
        assert_eq!(app.best(GameId::Flappy), 6);
        assert_eq!(app.new_best, Some(GameId::Flappy));
        app.record(Some(Finished { score: 2, ticks: 100 }));
        assert_eq!(app.best(GameId::Flappy), 6);
        assert_eq!(app.new_best, None);
    }
}
