//! Last-request-wins rendering for overlapping catalog queries.
//!
//! Every query takes a `Ticket` before it starts. When it finishes, its
//! result is rendered only if no newer ticket has been issued since.
//! A failure marks the state with an error but leaves the last good
//! products in place.

use catalog_data::Product;
use serde::Serialize;
use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Issue order of one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Products replaced.
    Applied,
    /// Error recorded, products kept.
    Failed,
    /// A newer ticket was issued; result dropped.
    Stale,
}

/// What is currently on screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderedState {
    /// Ticket generation that produced this state, 0 before any result
    pub generation: u64,
    pub products: Vec<Product>,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
pub struct LatestQuery {
    issued: AtomicU64,
    state: Mutex<RenderedState>,
}

impl LatestQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `ticket` is the most recently issued one.
    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }

    fn lock(&self) -> MutexGuard<'_, RenderedState> {
        // The state is replaced wholesale, so a poisoned guard still holds a
        // consistent value.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn complete<E: Display>(
        &self,
        ticket: Ticket,
        result: std::result::Result<Vec<Product>, E>,
    ) -> Outcome {
        let mut state = self.lock();
        if ticket.0 <= state.generation || !self.is_latest(ticket) {
            debug!(
                "Dropping stale result for ticket {} (issued: {}, rendered: {})",
                ticket.0,
                self.issued.load(Ordering::SeqCst),
                state.generation
            );
            return Outcome::Stale;
        }

        state.generation = ticket.0;
        match result {
            Ok(products) => {
                state.products = products;
                state.error = None;
                Outcome::Applied
            }
            Err(err) => {
                state.error = Some(err.to_string());
                Outcome::Failed
            }
        }
    }

    pub fn snapshot(&self) -> RenderedState {
        self.lock().clone()
    }
}
