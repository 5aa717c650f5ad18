use std::collections::VecDeque;
use std::time::Duration;

use tracing::{debug, info, trace};

use super::clock::SimClock;
use super::input::Action;
use super::lifecycle::{Lifecycle, Phase, Transition};
use super::random::RandomSource;
use super::scheduler::TickScheduler;
use super::timers::Timers;
use super::{Cadence, Game, Step};

/// Pending commands beyond this are dropped rather than buffered.
const MAX_QUEUED: usize = 3;

/// Reported once when a run reaches its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Finished {
    pub score: u32,
    pub ticks: u64,
}

/// Read-only view handed to renderers.
pub struct Snapshot<'a, G: Game> {
    pub phase: Phase,
    pub elapsed: Duration,
    pub score: u32,
    pub game: &'a G,
}

/// One running instance of a game: its state plus the scheduler, timers,
/// lifecycle and random source it exclusively owns.
pub struct Session<G: Game> {
    game: G,
    lifecycle: Lifecycle,
    clock: SimClock,
    scheduler: Option<TickScheduler>,
    timers: Timers<G::Command>,
    queue: VecDeque<G::Command>,
    rng: Box<dyn RandomSource>,
}

impl<G: Game> Session<G> {
    pub fn new(game: G, rng: Box<dyn RandomSource>) -> Self {
        let scheduler = match game.cadence() {
            Cadence::Fixed(interval) => Some(TickScheduler::new(interval)),
            Cadence::OnInput => None,
        };
        Self {
            game,
            lifecycle: Lifecycle::default(),
            clock: SimClock::new(),
            scheduler,
            timers: Timers::default(),
            queue: VecDeque::new(),
            rng,
        }
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn phase(&self) -> Phase {
        self.lifecycle.phase()
    }

    /// A deferred command (AI move, card flip-back) is still due.
    pub fn awaiting_timer(&self) -> bool {
        !self.timers.is_empty()
    }

    pub fn snapshot(&self) -> Snapshot<'_, G> {
        Snapshot {
            phase: self.lifecycle.phase(),
            elapsed: self.clock.elapsed(),
            score: self.game.score(),
            game: &self.game,
        }
    }

    pub fn dispatch(&mut self, action: Action<G::Command>) -> Option<Finished> {
        match action {
            Action::Play(command) => self.play(command),
            Action::Start => {
                if self.phase() == Phase::GameOver {
                    self.reset();
                }
                self.start();
                None
            }
            Action::TogglePause => {
                match self.phase() {
                    Phase::Running => self.pause(),
                    Phase::Paused => self.resume(),
                    phase => debug!(game = G::NAME, ?phase, "pause toggle ignored"),
                }
                None
            }
            Action::Reset => {
                self.reset();
                None
            }
        }
    }

    /// Feeds host frame time. Delivers due ticks and expired timers while running.
    pub fn update(&mut self, dt: Duration) -> Option<Finished> {
        if self.phase() != Phase::Running {
            return None;
        }
        self.clock.add_time(dt);

        for command in self.timers.advance(dt) {
            if let Some(finished) = self.apply(Some(command)) {
                return Some(finished);
            }
        }

        let due = self.scheduler.as_mut().map_or(0, |s| s.advance(dt));
        for _ in 0..due {
            let command = self.queue.pop_front();
            if let Some(finished) = self.apply(command) {
                return Some(finished);
            }
        }
        None
    }

    pub fn start(&mut self) {
        if let Err(err) = self.lifecycle.apply(Transition::Start) {
            debug!(game = G::NAME, %err, "start ignored");
            return;
        }
        if let Some(scheduler) = self.scheduler.as_mut() {
            if let Err(err) = scheduler.start() {
                debug!(game = G::NAME, %err, "scheduler already running");
            }
        }
        info!(game = G::NAME, "run started");
    }

    pub fn pause(&mut self) {
        if let Err(err) = self.lifecycle.apply(Transition::Pause) {
            debug!(game = G::NAME, %err, "pause ignored");
            return;
        }
        if let Some(scheduler) = self.scheduler.as_mut() {
            let _ = scheduler.pause();
        }
    }

    pub fn resume(&mut self) {
        if let Err(err) = self.lifecycle.apply(Transition::Resume) {
            debug!(game = G::NAME, %err, "resume ignored");
            return;
        }
        if let Some(scheduler) = self.scheduler.as_mut() {
            let _ = scheduler.resume();
        }
    }

    /// Back to Idle with fresh entity state, a zeroed clock and no pending work.
    pub fn reset(&mut self) {
        let _ = self.lifecycle.apply(Transition::Reset);
        self.halt();
        self.clock.reset();
        self.game = self.game.restart(self.rng.as_mut());
        debug!(game = G::NAME, "reset");
    }

    /// Swaps in a game with different settings and resets around it.
    pub fn replace(&mut self, game: G) {
        if let (Some(scheduler), Cadence::Fixed(interval)) = (self.scheduler.as_mut(), game.cadence()) {
            if scheduler.interval() != interval {
                *scheduler = TickScheduler::new(interval);
            }
        }
        self.game = game;
        self.reset();
    }

    fn play(&mut self, command: G::Command) -> Option<Finished> {
        if !self.lifecycle.accepts_play() {
            debug!(game = G::NAME, ?command, phase = ?self.phase(), "command rejected");
            return None;
        }
        if self.phase() == Phase::Idle {
            self.start();
        }
        match self.game.cadence() {
            Cadence::Fixed(_) => {
                if self.queue.len() >= MAX_QUEUED || !self.game.admit(self.queue.back(), &command) {
                    trace!(game = G::NAME, ?command, "command discarded");
                    return None;
                }
                self.queue.push_back(command);
                None
            }
            Cadence::OnInput => self.apply(Some(command)),
        }
    }

    fn apply(&mut self, command: Option<G::Command>) -> Option<Finished> {
        let Step { next, events } = self.game.step(command, self.rng.as_mut());
        self.clock.advance();
        self.game = next;
        for event in &events {
            if let Some(deferred) = self.game.defer(event) {
                self.timers.schedule(deferred.delay, deferred.command);
            }
        }

        if self.game.is_terminal() {
            return self.finish();
        }
        None
    }

    fn finish(&mut self) -> Option<Finished> {
        if let Err(err) = self.lifecycle.apply(Transition::Finish) {
            debug!(game = G::NAME, %err, "terminal state outside a run");
            return None;
        }
        self.halt();
        let finished = Finished {
            score: self.game.score(),
            ticks: self.clock.tick(),
        };
        info!(game = G::NAME, score = finished.score, ticks = finished.ticks, "game over");
        Some(finished)
    }

    fn halt(&mut self) {
        if let Some(scheduler) = self.scheduler.as_mut() {
            scheduler.stop();
        }
        self.timers.cancel_all();
        self.queue.clear();
    }
}
