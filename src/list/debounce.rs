//! Replace-on-arm timer for search input.

use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// At most one pending deadline. Arming again replaces it; nothing stacks up per keystroke.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn arm(&mut self) {
        self.deadline = Some(Instant::now() + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Sleep until the pending deadline and consume it. Returns `false` right away when
    /// nothing is armed. Dropping the future early leaves the deadline in place.
    pub async fn wait(&mut self) -> bool {
        let Some(deadline) = self.deadline else {
            return false;
        };
        sleep_until(deadline).await;
        self.deadline = None;
        true
    }
}
