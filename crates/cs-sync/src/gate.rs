//! `Gate` — counting rendezvous with FIFO wake-up order.
//!
//! # Semantics
//!
//! - `acquire` takes a permit if one is available, otherwise parks the caller
//!   at the back of the wait queue.
//! - `release` hands its permit directly to the front waiter if there is one,
//!   otherwise banks it.  A permit handed over is never observable in the
//!   count, so at all times
//!
//!   ```text
//!   permits == releases - satisfied acquires
//!   ```
//!
//! - `close` tears the gate down: every parked waiter and every later
//!   `acquire` fails with [`GateError::InvalidState`].
//!
//! All state lives behind one `parking_lot::Mutex`; the `Condvar` is only a
//! doorbell.  Each waiter holds a ticket and is released only when
//! `release` moves that exact ticket into the granted set, so spurious or
//! broadcast wake-ups can never let a later waiter overtake an earlier one.

use std::collections::{HashSet, VecDeque};

use parking_lot::{Condvar, Mutex};

use crate::{GateError, GateResult};

#[derive(Default)]
struct GateState {
    permits:     u64,
    waiters:     VecDeque<u64>,
    granted:     HashSet<u64>,
    next_ticket: u64,
    closed:      bool,
}

/// A counting rendezvous gate.
pub struct Gate {
    label: &'static str,
    state: Mutex<GateState>,
    bell:  Condvar,
}

impl Gate {
    /// A gate with zero permits: the first `acquire` blocks until a `release`.
    pub fn new(label: &'static str) -> Self {
        Self::with_permits(label, 0)
    }

    pub fn with_permits(label: &'static str, permits: u64) -> Self {
        Self {
            label,
            state: Mutex::new(GateState { permits, ..GateState::default() }),
            bell:  Condvar::new(),
        }
    }

    /// Take one permit, parking the calling thread until one is handed over.
    pub fn acquire(&self) -> GateResult<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(GateError::InvalidState(self.label));
        }
        if state.permits > 0 {
            state.permits -= 1;
            return Ok(());
        }

        let ticket = state.next_ticket;
        state.next_ticket += 1;
        state.waiters.push_back(ticket);

        loop {
            self.bell.wait(&mut state);
            // A grant wins over a concurrent close: the permit was already
            // consumed on this waiter's behalf.
            if state.granted.remove(&ticket) {
                return Ok(());
            }
            if state.closed {
                state.waiters.retain(|&t| t != ticket);
                return Err(GateError::InvalidState(self.label));
            }
        }
    }

    /// Take a permit only if one is banked.  Never parks.
    pub fn try_acquire(&self) -> GateResult<bool> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(GateError::InvalidState(self.label));
        }
        if state.permits > 0 {
            state.permits -= 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Wake the earliest waiter, or bank a permit if nobody waits.  Never blocks.
    pub fn release(&self) {
        let mut state = self.state.lock();
        match state.waiters.pop_front() {
            Some(ticket) => {
                state.granted.insert(ticket);
                drop(state);
                self.bell.notify_all();
            }
            None => state.permits += 1,
        }
    }

    /// Tear the gate down and fail every parked waiter.  Idempotent.
    pub fn close(&self) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        let parked = state.waiters.len();
        drop(state);
        if parked > 0 {
            tracing::trace!(gate = self.label, parked, "closing gate with parked waiters");
        }
        self.bell.notify_all();
    }

    /// Banked permits.
    pub fn permits(&self) -> u64 {
        self.state.lock().permits
    }

    /// Threads currently parked in `acquire`.
    pub fn waiting(&self) -> usize {
        self.state.lock().waiters.len()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl std::fmt::Debug for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Gate")
            .field("label", &self.label)
            .field("permits", &state.permits)
            .field("waiting", &state.waiters.len())
            .field("closed", &state.closed)
            .finish()
    }
}
