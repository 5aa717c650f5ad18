use std::time::Duration;

use tracing::trace;

use super::lifecycle::InvalidTransition;

/// Upper bound on ticks delivered for a single host frame. A stalled host
/// (suspended terminal, debugger) drops the backlog instead of fast-forwarding.
const MAX_CATCH_UP: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running,
    Paused,
}

/// Fixed-cadence tick source driven by host frame time.
///
/// The host calls `advance` with the wall time since its last frame; the
/// scheduler answers how many simulation ticks are due. Paused and stopped
/// schedulers never report ticks.
#[derive(Debug, Clone)]
pub struct TickScheduler {
    interval: Duration,
    accumulator: Duration,
    state: SchedulerState,
}

impl TickScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            accumulator: Duration::ZERO,
            state: SchedulerState::Stopped,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[cfg(test)]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn start(&mut self) -> Result<(), InvalidTransition> {
        match self.state {
            SchedulerState::Stopped => {
                self.accumulator = Duration::ZERO;
                self.state = SchedulerState::Running;
                Ok(())
            }
            other => Err(InvalidTransition::scheduler("start", other)),
        }
    }

    pub fn pause(&mut self) -> Result<(), InvalidTransition> {
        match self.state {
            SchedulerState::Running => {
                self.state = SchedulerState::Paused;
                Ok(())
            }
            other => Err(InvalidTransition::scheduler("pause", other)),
        }
    }

    pub fn resume(&mut self) -> Result<(), InvalidTransition> {
        match self.state {
            SchedulerState::Paused => {
                self.state = SchedulerState::Running;
                Ok(())
            }
            other => Err(InvalidTransition::scheduler("resume", other)),
        }
    }

    /// Cancels all future ticks. Safe to call in any state.
    pub fn stop(&mut self) {
        self.state = SchedulerState::Stopped;
        self.accumulator = Duration::ZERO;
    }

    /// Feeds host frame time and returns the number of ticks now due.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        if self.state != SchedulerState::Running {
            return 0;
        }
        self.accumulator += dt;
        let mut due = 0;
        while self.accumulator >= self.interval {
            self.accumulator -= self.interval;
            due += 1;
            if due == MAX_CATCH_UP {
                trace!(dropped = ?self.accumulator, "tick backlog dropped");
                self.accumulator = Duration::ZERO;
                break;
            }
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn delivers_ticks_at_cadence() {
        let mut s = TickScheduler::new(ms(100));
        s.start().unwrap();
        assert_eq!(s.advance(ms(60)), 0);
        assert_eq!(s.advance(ms(60)), 1);
        assert_eq!(s.advance(ms(80)), 1);
        assert_eq!(s.advance(ms(200)), 2);
    }

    #[test]
    fn stopped_scheduler_is_silent() {
        let mut s = TickScheduler::new(ms(10));
        assert_eq!(s.advance(ms(100)), 0);
    }

    #[test]
    fn pause_keeps_accumulated_time() {
        let mut s = TickScheduler::new(ms(100));
        s.start().unwrap();
        assert_eq!(s.advance(ms(70)), 0);
        s.pause().unwrap();
        assert_eq!(s.advance(ms(500)), 0);
        s.resume().unwrap();
        assert_eq!(s.advance(ms(30)), 1);
    }

    #[test]
    fn misuse_is_reported_not_fatal() {
        let mut s = TickScheduler::new(ms(100));
        assert!(s.resume().is_err());
        assert!(s.pause().is_err());
        s.start().unwrap();
        assert!(s.start().is_err());
        assert_eq!(s.state(), SchedulerState::Running);
    }

    #[test]
    fn stop_is_idempotent_and_clears_backlog() {
        let mut s = TickScheduler::new(ms(100));
        s.start().unwrap();
        s.advance(ms(90));
        s.stop();
        s.stop();
        assert_eq!(s.state(), SchedulerState::Stopped);
        s.start().unwrap();
        assert_eq!(s.advance(ms(20)), 0);
    }

    #[test]
    fn backlog_is_capped() {
        let mut s = TickScheduler::new(ms(10));
        s.start().unwrap();
        assert_eq!(s.advance(Duration::from_secs(10)), MAX_CATCH_UP);
        assert_eq!(s.advance(ms(5)), 0);
    }
}
