//! Single-writer state store for a task-management session.
//!
//! [`TodoState::apply_at`] is the pure transition function; [`Store`] owns
//! the current snapshot and is the only place new snapshots come from.

use std::sync::Arc;

use shared::protocol::StoreEvent;
use tracing::info;

mod clock;
pub mod query;
mod state;

pub use clock::{Clock, FixedClock, SystemClock};
pub use query::{Progress, VisibleTodos};
pub use state::{IdCounters, Rejection, TodoState};

/// Owns the session state. Snapshots handed out by [`Store::snapshot`] are
/// immutable and stay valid after later dispatches.
pub struct Store {
    state: Arc<TodoState>,
    clock: Arc<dyn Clock>,
    revision: u64,
}

impl Store {
    pub fn new(initial: TodoState) -> Self {
        Self::with_clock(initial, Arc::new(SystemClock))
    }

    pub fn with_clock(initial: TodoState, clock: Arc<dyn Clock>) -> Self {
        info!(
            todos = initial.todos().len(),
            notifications = initial.notifications().len(),
            "task store initialized"
        );
        Self {
            state: Arc::new(initial),
            clock,
            revision: 0,
        }
    }

    /// Store holding the fixed seed, timestamped by `clock`.
    pub fn seeded(clock: Arc<dyn Clock>) -> Self {
        let initial = TodoState::seeded(clock.now());
        Self::with_clock(initial, clock)
    }

    pub fn snapshot(&self) -> Arc<TodoState> {
        Arc::clone(&self.state)
    }

    /// Incremented once per dispatched event, including events that leave
    /// the state unchanged, so observers know to re-derive presentation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn dispatch(&mut self, event: StoreEvent) -> Arc<TodoState> {
        let next = self.state.apply_at(event, self.clock.now());
        self.state = Arc::new(next);
        self.revision += 1;
        self.snapshot()
    }

    pub fn dispatch_all(&mut self, events: impl IntoIterator<Item = StoreEvent>) -> Arc<TodoState> {
        for event in events {
            self.dispatch(event);
        }
        self.snapshot()
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
