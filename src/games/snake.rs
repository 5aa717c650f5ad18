use std::time::Duration;

use crossterm::event::KeyCode;

use crate::engine::{Action, Cadence, Game, Keymap, RandomSource, Step};

pub const GRID_SIZE: i32 = 20;
pub const TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    fn shifted(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self::new(self.x + dx, self.y + dy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crash {
    Wall,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnakeEnd {
    Crashed(Crash),
    /// No free cell left for food.
    BoardFilled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnakeEvent {
    Turned(Direction),
    Ate { at: Cell },
    Crashed(Crash),
    BoardFilled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnakeSettings {
    pub grid: i32,
    pub tick: Duration,
    pub points_per_food: u32,
}

impl Default for SnakeSettings {
    fn default() -> Self {
        Self {
            grid: GRID_SIZE,
            tick: TICK,
            points_per_food: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Snake {
    settings: SnakeSettings,
    body: Vec<Cell>,
    direction: Direction,
    food: Option<Cell>,
    food_eaten: u32,
    score: u32,
    end: Option<SnakeEnd>,
}

impl Snake {
    pub fn new(settings: SnakeSettings) -> Self {
        let mid = settings.grid / 2;
        let quarter = settings.grid / 4;
        Self {
            body: vec![Cell::new(mid, mid)],
            direction: Direction::Right,
            food: Some(Cell::new(quarter, quarter)),
            food_eaten: 0,
            score: 0,
            end: None,
            settings,
        }
    }

    /// Starts from an arbitrary layout, head first.
    #[cfg(test)]
    pub fn with_layout(settings: SnakeSettings, body: Vec<Cell>, direction: Direction, food: Cell) -> Self {
        Self {
            body,
            direction,
            food: Some(food),
            ..Self::new(settings)
        }
    }

    pub fn settings(&self) -> &SnakeSettings {
        &self.settings
    }

    pub fn body(&self) -> &[Cell] {
        &self.body
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    #[cfg(test)]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn food(&self) -> Option<Cell> {
        self.food
    }

    #[cfg(test)]
    pub fn food_eaten(&self) -> u32 {
        self.food_eaten
    }

    pub fn end(&self) -> Option<SnakeEnd> {
        self.end
    }

    fn in_bounds(&self, cell: Cell) -> bool {
        (0..self.settings.grid).contains(&cell.x) && (0..self.settings.grid).contains(&cell.y)
    }

    /// Uniform over cells the body does not cover.
    fn place_food(&self, rng: &mut dyn RandomSource) -> Option<Cell> {
        let n = self.settings.grid;
        let free: Vec<Cell> = (0..n)
            .flat_map(|y| (0..n).map(move |x| Cell::new(x, y)))
            .filter(|c| !self.body.contains(c))
            .collect();
        if free.is_empty() {
            return None;
        }
        Some(free[rng.below(free.len() as u32) as usize])
    }
}

impl Game for Snake {
    type Command = Direction;
    type Event = SnakeEvent;

    const NAME: &'static str = "snake";

    fn cadence(&self) -> Cadence {
        Cadence::Fixed(self.settings.tick)
    }

    fn step(&self, command: Option<Direction>, rng: &mut dyn RandomSource) -> Step<Self> {
        let mut next = self.clone();
        let mut events = Vec::new();

        if let Some(dir) = command {
            if dir != next.direction && dir != next.direction.opposite() {
                next.direction = dir;
                events.push(SnakeEvent::Turned(dir));
            }
        }

        let head = next.head().shifted(next.direction);
        // The tail still occupies its cell while the move is evaluated.
        let crash = if !next.in_bounds(head) {
            Some(Crash::Wall)
        } else if next.body.contains(&head) {
            Some(Crash::Body)
        } else {
            None
        };
        if let Some(crash) = crash {
            next.end = Some(SnakeEnd::Crashed(crash));
            events.push(SnakeEvent::Crashed(crash));
            return Step { next, events };
        }

        next.body.insert(0, head);
        if next.food == Some(head) {
            next.food_eaten += 1;
            next.score = next.score.saturating_add(next.settings.points_per_food);
            events.push(SnakeEvent::Ate { at: head });
            next.food = next.place_food(rng);
            if next.food.is_none() {
                next.end = Some(SnakeEnd::BoardFilled);
                events.push(SnakeEvent::BoardFilled);
            }
        } else {
            next.body.pop();
        }

        Step { next, events }
    }

    fn is_terminal(&self) -> bool {
        self.end.is_some()
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn restart(&self, _rng: &mut dyn RandomSource) -> Self {
        Snake::new(self.settings.clone())
    }

    fn admit(&self, last_queued: Option<&Direction>, command: &Direction) -> bool {
        let heading = last_queued.copied().unwrap_or(self.direction);
        *command != heading && *command != heading.opposite()
    }
}

#[derive(Debug, Default)]
pub struct SnakeKeys;

impl Keymap for SnakeKeys {
    type Command = Direction;

    fn key(&mut self, code: KeyCode) -> Option<Action<Direction>> {
        let action = match code {
            KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Action::Play(Direction::Up),
            KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Action::Play(Direction::Down),
            KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Action::Play(Direction::Left),
            KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Action::Play(Direction::Right),
            KeyCode::Char(' ') | KeyCode::Char('p') | KeyCode::Char('P') => Action::TogglePause,
            KeyCode::Enter => Action::Start,
            KeyCode::Char('r') | KeyCode::Char('R') => Action::Reset,
            _ => return None,
        };
        Some(action)
    }
}
