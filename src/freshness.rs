//! Request generation counter.
//! Keeps a slow response from overwriting the result of a newer request.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

/// Tag handed out for each issued request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Issues increasing tickets; only the most recent one is current
#[derive(Debug, Default)]
pub struct RequestGeneration {
    latest: AtomicU64,
}

impl RequestGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new generation, superseding every earlier ticket
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Runs `request` under a ticket issued now, when the call is made, not
    /// when the returned future is first polled.
    /// Resolves to `None` if another request was issued before this one finished.
    pub fn run<'a, F>(&'a self, request: F) -> impl Future<Output = Option<F::Output>> + 'a
    where
        F: Future + 'a,
    {
        let ticket = self.issue();
        async move {
            let output = request.await;
            if self.is_current(ticket) {
                Some(output)
            } else {
                tracing::debug!("Discarding stale response for request #{}", ticket.0);
                None
            }
        }
    }
}
