//! Search debouncing
//!
//! Collapses keystroke bursts into a single search term: each call to
//! `schedule` restarts the timer, and only the last scheduled term is
//! delivered once the delay elapses without another keystroke.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Single-slot restartable delay timer
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<String>,
    rx: mpsc::UnboundedReceiver<String>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            delay,
            pending: None,
            tx,
            rx,
        }
    }

    /// Restart the timer for `term`, cancelling any term still pending.
    pub fn schedule(&mut self, term: impl Into<String>) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        let term = term.into();
        let tx = self.tx.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(term);
        }));
    }

    /// Wait for the next term to fire. When several fired while nobody was
    /// listening, only the most recent one is returned. Waits indefinitely
    /// when nothing was scheduled, so only await this after `schedule`.
    pub async fn fired(&mut self) -> Option<String> {
        let mut term = self.rx.recv().await?;
        while let Ok(newer) = self.rx.try_recv() {
            term = newer;
        }
        Some(term)
    }

    /// Whether a timer is currently armed
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
