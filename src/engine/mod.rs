//! Game-agnostic core: tick scheduling, one-shot timers, the lifecycle
//! state machine, input edge detection and the `Session` that ties a
//! game's rules to all of them.
//!
//! Nothing here knows how a game is drawn. Renderers read a `Snapshot`.

pub mod clock;
pub mod input;
pub mod lifecycle;
pub mod random;
pub mod scheduler;
pub mod session;
pub mod timers;

use std::fmt::Debug;
use std::time::Duration;

pub use input::{Action, InputMapper, Keymap};
pub use lifecycle::Phase;
pub use random::{RandomSource, SystemRandom};
pub use session::{Finished, Session, Snapshot};

/// How a game's simulation advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// One step per fixed interval; commands queue up and one is drained per tick.
    Fixed(Duration),
    /// One step per command; no recurring tick.
    OnInput,
}

/// Result of one pure rules step.
pub struct Step<G: Game> {
    pub next: G,
    pub events: Vec<G::Event>,
}

impl<G: Game> Step<G> {
    pub fn quiet(next: G) -> Self {
        Self {
            next,
            events: Vec::new(),
        }
    }
}

/// A command the session should feed back into the game after `delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deferred<C> {
    pub delay: Duration,
    pub command: C,
}

/// The rules of one game as a value plus a pure transition function.
pub trait Game: Clone {
    type Command: Copy + Debug;
    type Event: Clone + Debug;

    const NAME: &'static str;

    fn cadence(&self) -> Cadence;

    /// Computes the next state. Real-time games are stepped once per tick
    /// with at most one drained command; turn-based games once per command.
    fn step(&self, command: Option<Self::Command>, rng: &mut dyn RandomSource) -> Step<Self>;

    fn is_terminal(&self) -> bool;

    fn score(&self) -> u32;

    /// Fresh round with the same settings (and any cross-round tallies).
    fn restart(&self, rng: &mut dyn RandomSource) -> Self;

    /// Whether a command may join the pending queue behind `last_queued`.
    fn admit(&self, last_queued: Option<&Self::Command>, command: &Self::Command) -> bool {
        let _ = (last_queued, command);
        true
    }

    /// Events that schedule a delayed follow-up command.
    fn defer(&self, event: &Self::Event) -> Option<Deferred<Self::Command>> {
        let _ = event;
        None
    }
}
