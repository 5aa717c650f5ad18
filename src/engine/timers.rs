use std::time::Duration;

#[derive(Debug, Clone)]
struct Pending<T> {
    seq: u64,
    remaining: Duration,
    payload: T,
}

/// One-shot timers measured in simulation time.
///
/// Each timer fires at most once; `cancel_all` guarantees none of the
/// currently scheduled payloads is ever returned.
#[derive(Debug, Clone)]
pub struct Timers<T> {
    pending: Vec<Pending<T>>,
    next_seq: u64,
}

impl<T> Default for Timers<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<T> Timers<T> {
    pub fn schedule(&mut self, delay: Duration, payload: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Pending {
            seq,
            remaining: delay,
            payload,
        });
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Moves time forward and returns the payloads that came due, earliest first.
    pub fn advance(&mut self, dt: Duration) -> Vec<T> {
        let mut due = Vec::new();
        let mut kept = Vec::with_capacity(self.pending.len());
        for mut p in self.pending.drain(..) {
            if p.remaining <= dt {
                due.push((p.remaining, p.seq, p.payload));
            } else {
                p.remaining -= dt;
                kept.push(p);
            }
        }
        self.pending = kept;
        due.sort_by_key(|(remaining, seq, _)| (*remaining, *seq));
        due.into_iter().map(|(_, _, payload)| payload).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn fires_once_after_delay() {
        let mut timers = Timers::default();
        timers.schedule(ms(1000), "flip back");
        assert!(timers.advance(ms(600)).is_empty());
        assert_eq!(timers.advance(ms(400)), vec!["flip back"]);
        assert!(timers.advance(ms(5000)).is_empty());
        assert!(timers.is_empty());
    }

    #[test]
    fn due_in_order() {
        let mut timers = Timers::default();
        timers.schedule(ms(300), 3);
        timers.schedule(ms(100), 1);
        timers.schedule(ms(200), 2);
        assert_eq!(timers.advance(ms(1000)), vec![1, 2, 3]);
    }

    #[test]
    fn same_deadline_fires_in_schedule_order() {
        let mut timers = Timers::default();
        timers.schedule(ms(100), 'a');
        timers.schedule(ms(100), 'b');
        assert_eq!(timers.advance(ms(100)), vec!['a', 'b']);
    }

    #[test]
    fn cancelled_timers_never_fire() {
        let mut timers = Timers::default();
        timers.schedule(ms(50), 'c');
        timers.schedule(ms(500), 'd');
        timers.cancel_all();
        assert!(timers.is_empty());
        assert!(timers.advance(ms(1000)).is_empty());
    }
}
