use std::io;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self as term, KeyEvent, MouseEvent, MouseEventKind};
use tracing::{debug, error, warn};

/// Consecutive `poll` failures before the input thread gives up.
const MAX_POLL_FAILURES: u32 = 10;
const MAX_BACKOFF: Duration = Duration::from_secs(1);

pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// No input within one frame, or the terminal was resized.
    Tick,
}

/// Which terminal events the app cares about. Key presses, repeats and
/// releases all pass; the input mapper sorts them out.
fn translate(raw: term::Event) -> Option<Event> {
    match raw {
        term::Event::Key(key) => Some(Event::Key(key)),
        term::Event::Mouse(mouse) if matches!(mouse.kind, MouseEventKind::Down(_)) => Some(Event::Mouse(mouse)),
        term::Event::Resize(..) => Some(Event::Tick),
        _ => None,
    }
}

/// Wait after the `failures`-th poll error in a row: doubles from one frame, capped.
fn backoff(frame: Duration, failures: u32) -> Duration {
    let factor = 1u32 << failures.saturating_sub(1).min(10);
    frame.saturating_mul(factor).min(MAX_BACKOFF)
}

/// Terminal input on a background thread, with a tick whenever a frame passes quietly.
///
/// If the terminal keeps failing to poll, the thread stops and `next` reports
/// the closed channel.
pub struct EventHandler {
    rx: mpsc::Receiver<Event>,
}

impl EventHandler {
    pub fn new(frame: Duration) -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let mut failures = 0u32;
            loop {
                let event = match term::poll(frame) {
                    Ok(true) => {
                        failures = 0;
                        match term::read() {
                            Ok(raw) => translate(raw),
                            Err(err) => {
                                debug!(%err, "terminal read failed");
                                None
                            }
                        }
                    }
                    Ok(false) => {
                        failures = 0;
                        Some(Event::Tick)
                    }
                    Err(err) => {
                        failures += 1;
                        if failures >= MAX_POLL_FAILURES {
                            error!(%err, failures, "terminal input lost, stopping event thread");
                            return;
                        }
                        warn!(%err, failures, "terminal poll failed");
                        thread::sleep(backoff(frame, failures));
                        Some(Event::Tick)
                    }
                };
                if let Some(event) = event {
                    if tx.send(event).is_err() {
                        return;
                    }
                }
            }
        });

        Self { rx }
    }

    pub fn next(&self) -> io::Result<Event> {
        self.rx.recv().map_err(io::Error::other)
    }
}
