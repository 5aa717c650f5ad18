use thiserror::Error;

use super::scheduler::SchedulerState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    Running,
    Paused,
    GameOver,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Idle => "ready",
            Phase::Running => "playing",
            Phase::Paused => "paused",
            Phase::GameOver => "game over",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Start,
    Pause,
    Resume,
    Finish,
    Reset,
}

/// A transition that does not apply in the current state. Callers treat it
/// as a no-op; it exists so the refusal can be logged and tested.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cannot {action} while {state}")]
pub struct InvalidTransition {
    action: &'static str,
    state: &'static str,
}

impl InvalidTransition {
    pub(crate) fn scheduler(action: &'static str, state: SchedulerState) -> Self {
        let state = match state {
            SchedulerState::Stopped => "stopped",
            SchedulerState::Running => "running",
            SchedulerState::Paused => "paused",
        };
        Self { action, state }
    }

    fn lifecycle(transition: Transition, phase: Phase) -> Self {
        let action = match transition {
            Transition::Start => "start",
            Transition::Pause => "pause",
            Transition::Resume => "resume",
            Transition::Finish => "finish",
            Transition::Reset => "reset",
        };
        Self {
            action,
            state: phase.label(),
        }
    }
}

/// Idle -> Running <-> Paused, Running -> GameOver, any -> Idle on reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifecycle {
    phase: Phase,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self { phase: Phase::Idle }
    }
}

impl Lifecycle {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether game commands may mutate state right now.
    pub fn accepts_play(&self) -> bool {
        matches!(self.phase, Phase::Idle | Phase::Running)
    }

    pub fn apply(&mut self, transition: Transition) -> Result<Phase, InvalidTransition> {
        let next = match (self.phase, transition) {
            (Phase::Idle, Transition::Start) => Phase::Running,
            (Phase::Running, Transition::Pause) => Phase::Paused,
            (Phase::Paused, Transition::Resume) => Phase::Running,
            (Phase::Running, Transition::Finish) => Phase::GameOver,
            (_, Transition::Reset) => Phase::Idle,
            (phase, transition) => return Err(InvalidTransition::lifecycle(transition, phase)),
        };
        self.phase = next;
        Ok(next)
    }
}
