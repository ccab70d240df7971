use std::{future, pin::Pin, time::Duration};

use tokio::time::{sleep_until, Instant, Sleep};

/// Cancel-and-reschedule timer. Holds at most one pending deadline.
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    pending: Option<Pin<Box<Sleep>>>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self { quiet, pending: None }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Pushes the deadline to `now + quiet`, arming the timer if idle.
    pub fn schedule(&mut self) {
        let deadline = Instant::now() + self.quiet;
        match self.pending.as_mut() {
            Some(sleep) => sleep.as_mut().reset(deadline),
            None => self.pending = Some(Box::pin(sleep_until(deadline))),
        }
    }

    /// Returns whether a deadline was dropped.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Resolves once the pending deadline passes, never when idle. Cancel safe: dropping the
    /// future keeps the deadline armed.
    pub async fn expired(&mut self) {
        match self.pending.as_mut() {
            Some(sleep) => {
                sleep.as_mut().await;
                self.pending = None;
            }
            None => future::pending().await,
        }
    }
}
