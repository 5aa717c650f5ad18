use std::time::Duration;

/// Monotonic simulation clock.
///
/// Counts steps and accumulated running time. Nothing but `reset` ever
/// moves it backwards; pausing simply stops calling `advance`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimClock {
    tick: u64,
    elapsed: Duration,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn advance(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    pub fn add_time(&mut self, dt: Duration) {
        self.elapsed += dt;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_monotonically() {
        let mut clock = SimClock::new();
        let mut last = clock.tick();
        for _ in 0..50 {
            let t = clock.advance();
            assert!(t > last);
            last = t;
        }
        clock.add_time(Duration::from_millis(30));
        clock.add_time(Duration::from_millis(20));
        assert_eq!(clock.elapsed(), Duration::from_millis(50));
    }

    #[test]
    fn reset_returns_to_zero() {
        let mut clock = SimClock::new();
        clock.advance();
        clock.add_time(Duration::from_secs(1));
        clock.reset();
        assert_eq!(clock, SimClock::default());
    }
}
