use std::time::Duration;

use crossterm::event::KeyCode;

use crate::engine::{Action, Cadence, Game, Keymap, RandomSource, Step};

pub const FIELD_WIDTH: f32 = 400.0;
pub const FIELD_HEIGHT: f32 = 600.0;
pub const GROUND_HEIGHT: f32 = 40.0;
pub const GRAVITY: f32 = 0.5;
pub const JUMP_VELOCITY: f32 = -10.0;
pub const PIPE_WIDTH: f32 = 80.0;
pub const PIPE_GAP: f32 = 150.0;
pub const PIPE_FREQUENCY: u64 = 100; // frames
pub const PIPE_SPEED: f32 = 2.0;
pub const MIN_PIPE_HEIGHT: f32 = 50.0;
pub const BIRD_SIZE: f32 = 30.0;
pub const BIRD_X: f32 = 100.0;
pub const BIRD_START_Y: f32 = 250.0;
#[cfg(test)]
pub const FRAME: Duration = Duration::from_millis(16);

const BIRD_RADIUS: f32 = BIRD_SIZE / 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bird {
    pub y: f32,
    pub velocity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pipe {
    pub x: f32,
    pub top_height: f32,
    pub scored: bool,
}

impl Pipe {
    pub fn gap_bottom(&self) -> f32 {
        self.top_height + PIPE_GAP
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crash {
    Ceiling,
    Floor,
    Pipe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlappyCommand {
    Jump,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlappyEvent {
    Flapped,
    Spawned { top_height: f32 },
    Passed { score: u32 },
    Crashed(Crash),
}

#[derive(Debug, Clone)]
pub struct Flappy {
    bird: Bird,
    pipes: Vec<Pipe>,
    frame: u64,
    score: u32,
    crash: Option<Crash>,
    frame_interval: Duration,
}

impl Flappy {
    pub fn new(frame_interval: Duration) -> Self {
        Self {
            bird: Bird {
                y: BIRD_START_Y,
                velocity: 0.0,
            },
            pipes: Vec::new(),
            frame: 0,
            score: 0,
            crash: None,
            frame_interval,
        }
    }

    #[cfg(test)]
    pub fn with_bird(bird: Bird, pipes: Vec<Pipe>, frame: u64) -> Self {
        Self {
            bird,
            pipes,
            frame,
            ..Self::new(FRAME)
        }
    }

    pub fn bird(&self) -> Bird {
        self.bird
    }

    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    #[cfg(test)]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn crash(&self) -> Option<Crash> {
        self.crash
    }

    /// Bounds are the bird's center plus or minus its radius. Touching the
    /// edge exactly is still alive; crossing it is not.
    pub fn collision(&self) -> Option<Crash> {
        let top = self.bird.y - BIRD_RADIUS;
        let bottom = self.bird.y + BIRD_RADIUS;
        if top < 0.0 {
            return Some(Crash::Ceiling);
        }
        if bottom > FIELD_HEIGHT {
            return Some(Crash::Floor);
        }
        let hit = self.pipes.iter().any(|pipe| {
            let overlaps_x = BIRD_X + BIRD_RADIUS > pipe.x && BIRD_X - BIRD_RADIUS < pipe.x + PIPE_WIDTH;
            overlaps_x && (top < pipe.top_height || bottom > pipe.gap_bottom())
        });
        hit.then_some(Crash::Pipe)
    }

    fn spawn_height(rng: &mut dyn RandomSource) -> f32 {
        let max = FIELD_HEIGHT - PIPE_GAP - MIN_PIPE_HEIGHT - GROUND_HEIGHT;
        rng.below((max - MIN_PIPE_HEIGHT) as u32) as f32 + MIN_PIPE_HEIGHT
    }
}

impl Game for Flappy {
    type Command = FlappyCommand;
    type Event = FlappyEvent;

    const NAME: &'static str = "flappy";

    fn cadence(&self) -> Cadence {
        Cadence::Fixed(self.frame_interval)
    }

    fn step(&self, command: Option<FlappyCommand>, rng: &mut dyn RandomSource) -> Step<Self> {
        let mut next = self.clone();
        let mut events = Vec::new();

        // The impulse replaces the current velocity rather than adding to it.
        if let Some(FlappyCommand::Jump) = command {
            next.bird.velocity = JUMP_VELOCITY;
            events.push(FlappyEvent::Flapped);
        }
        next.bird.velocity += GRAVITY;
        next.bird.y += next.bird.velocity;

        if next.frame % PIPE_FREQUENCY == 0 {
            let top_height = Self::spawn_height(rng);
            next.pipes.push(Pipe {
                x: FIELD_WIDTH,
                top_height,
                scored: false,
            });
            events.push(FlappyEvent::Spawned { top_height });
        }

        for pipe in &mut next.pipes {
            pipe.x -= PIPE_SPEED;
            if !pipe.scored && pipe.x + PIPE_WIDTH < BIRD_X {
                pipe.scored = true;
                next.score += 1;
                events.push(FlappyEvent::Passed { score: next.score });
            }
        }
        next.pipes.retain(|pipe| pipe.x > -PIPE_WIDTH);

        if let Some(crash) = next.collision() {
            next.crash = Some(crash);
            events.push(FlappyEvent::Crashed(crash));
            return Step { next, events };
        }

        next.frame += 1;
        Step { next, events }
    }

    fn is_terminal(&self) -> bool {
        self.crash.is_some()
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn restart(&self, _rng: &mut dyn RandomSource) -> Self {
        Flappy::new(self.frame_interval)
    }
}

#[derive(Debug, Default)]
pub struct FlappyKeys;

impl Keymap for FlappyKeys {
    type Command = FlappyCommand;

    fn key(&mut self, code: KeyCode) -> Option<Action<FlappyCommand>> {
        let action = match code {
            KeyCode::Char(' ') | KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => {
                Action::Play(FlappyCommand::Jump)
            }
            KeyCode::Char('p') | KeyCode::Char('P') => Action::TogglePause,
            KeyCode::Enter => Action::Start,
            KeyCode::Char('r') | KeyCode::Char('R') => Action::Reset,
            _ => return None,
        };
        Some(action)
    }

    fn pointer(&mut self, _target: Option<usize>) -> Option<Action<FlappyCommand>> {
        Some(Action::Play(FlappyCommand::Jump))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::random::{Scripted, SystemRandom};
    use crate::engine::{InputMapper, Phase, Session};

    fn bird_at(y: f32) -> Flappy {
        Flappy::with_bird(Bird { y, velocity: 0.0 }, Vec::new(), 1)
    }

    #[test]
    fn ceiling_margin_uses_the_radius() {
        assert_eq!(bird_at(0.0 - BIRD_SIZE / 2.0 - 1.0).collision(), Some(Crash::Ceiling));
        assert_eq!(bird_at(BIRD_SIZE / 2.0).collision(), None);
        assert_eq!(bird_at(BIRD_SIZE / 2.0 - 0.5).collision(), Some(Crash::Ceiling));
    }

    #[test]
    fn floor_margin_uses_the_radius() {
        assert_eq!(bird_at(FIELD_HEIGHT - BIRD_SIZE / 2.0).collision(), None);
        assert_eq!(bird_at(FIELD_HEIGHT - BIRD_SIZE / 2.0 + 1.0).collision(), Some(Crash::Floor));
    }

    #[test]
    fn pipe_collision_only_outside_the_gap() {
        let pipe = Pipe {
            x: BIRD_X - 10.0,
            top_height: 200.0,
            scored: false,
        };
        let inside = Flappy::with_bird(Bird { y: 275.0, velocity: 0.0 }, vec![pipe], 1);
        assert_eq!(inside.collision(), None);
        let above = Flappy::with_bird(Bird { y: 210.0, velocity: 0.0 }, vec![pipe], 1);
        assert_eq!(above.collision(), Some(Crash::Pipe));
        let below = Flappy::with_bird(Bird { y: 340.0, velocity: 0.0 }, vec![pipe], 1);
        assert_eq!(below.collision(), Some(Crash::Pipe));

        let far = Pipe { x: BIRD_X + BIRD_RADIUS, ..pipe };
        let clear = Flappy::with_bird(Bird { y: 210.0, velocity: 0.0 }, vec![far], 1);
        assert_eq!(clear.collision(), None);
    }

    #[test]
    fn jump_overrides_velocity() {
        let falling = Flappy::with_bird(Bird { y: 300.0, velocity: 7.5 }, Vec::new(), 1);
        let next = falling.step(Some(FlappyCommand::Jump), &mut Scripted::default()).next;
        assert_eq!(next.bird().velocity, JUMP_VELOCITY + GRAVITY);
        assert_eq!(next.bird().y, 300.0 + JUMP_VELOCITY + GRAVITY);
    }

    #[test]
    fn gravity_accumulates() {
        let mut game = Flappy::with_bird(Bird { y: 300.0, velocity: 0.0 }, Vec::new(), 1);
        let mut rng = Scripted::default();
        game = game.step(None, &mut rng).next;
        game = game.step(None, &mut rng).next;
        assert_eq!(game.bird().velocity, 1.0);
        assert_eq!(game.bird().y, 301.5);
    }

    #[test]
    fn pipes_spawn_on_schedule_within_range() {
        let mut rng = SystemRandom::seeded(3);
        let mut game = Flappy::with_bird(Bird { y: 300.0, velocity: 0.0 }, Vec::new(), 0);
        let step = game.step(None, &mut rng);
        game = step.next;
        assert_eq!(game.pipes().len(), 1);
        let top = game.pipes()[0].top_height;
        assert!((MIN_PIPE_HEIGHT..360.0).contains(&top));
        assert_eq!(game.pipes()[0].x, FIELD_WIDTH - PIPE_SPEED);

        let mut scripted = Scripted::new(vec![0, 309]);
        let low = Flappy::with_bird(Bird { y: 300.0, velocity: 0.0 }, Vec::new(), 0);
        assert_eq!(low.step(None, &mut scripted).next.pipes()[0].top_height, 50.0);
        let high = Flappy::with_bird(Bird { y: 300.0, velocity: 0.0 }, Vec::new(), 0);
        assert_eq!(high.step(None, &mut scripted).next.pipes()[0].top_height, 359.0);
    }

    #[test]
    fn each_pipe_scores_once() {
        let passed = Pipe {
            x: BIRD_X - PIPE_WIDTH - 1.0,
            top_height: 200.0,
            scored: false,
        };
        let mut game = Flappy::with_bird(Bird { y: 300.0, velocity: -3.0 }, vec![passed], 1);
        let mut rng = Scripted::default();
        for _ in 0..12 {
            game = game.step(None, &mut rng).next;
            assert!(!game.is_terminal());
        }
        assert_eq!(game.score(), 1);
    }

    #[test]
    fn off_screen_pipes_are_dropped() {
        let leaving = Pipe {
            x: -PIPE_WIDTH + 1.0,
            top_height: 200.0,
            scored: true,
        };
        let game = Flappy::with_bird(Bird { y: 300.0, velocity: 0.0 }, vec![leaving], 1);
        assert!(game.step(None, &mut Scripted::default()).next.pipes().is_empty());
    }

    #[test]
    fn free_fall_ends_on_the_floor() {
        let mut session = Session::new(Flappy::new(FRAME), Box::new(SystemRandom::seeded(9)));
        session.dispatch(Action::Start);
        let mut finished = None;
        for _ in 0..200 {
            if let Some(f) = session.update(FRAME) {
                finished = Some(f);
                break;
            }
        }
        assert!(finished.is_some());
        assert_eq!(session.phase(), Phase::GameOver);
        assert_eq!(session.game().crash(), Some(Crash::Floor));
    }

    #[test]
    fn held_space_jumps_once() {
        let mut input = InputMapper::new(FlappyKeys, true);
        let mut session = Session::new(Flappy::new(FRAME), Box::new(Scripted::default()));
        for _ in 0..3 {
            if let Some(action) = input.on_key_down(KeyCode::Char(' ')) {
                session.dispatch(action);
            }
        }
        session.update(FRAME);
        session.update(FRAME);
        // One flap then one free frame: -10 + 0.5 + 0.5.
        assert_eq!(session.game().bird().velocity, -9.0);
    }
}
