//! Unit tests for cs-sync.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::{Gate, GateError};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Spin until `n` threads are parked on `gate`.  Parking is the only way to
/// observe that a spawned thread has reached `acquire`.
fn wait_for_parked(gate: &Gate, n: usize) {
    while gate.waiting() < n {
        thread::sleep(Duration::from_millis(1));
    }
}

// ── Permit accounting ─────────────────────────────────────────────────────────

#[cfg(test)]
mod permits {
    use super::*;

    #[test]
    fn new_gate_is_empty() {
        let gate = Gate::new("start");
        assert_eq!(gate.permits(), 0);
        assert_eq!(gate.waiting(), 0);
        assert!(!gate.is_closed());
        assert_eq!(gate.label(), "start");
    }

    #[test]
    fn release_before_acquire_banks_permit() {
        let gate = Gate::new("g");
        gate.release();
        assert_eq!(gate.permits(), 1);
        gate.acquire().unwrap();
        assert_eq!(gate.permits(), 0);
    }

    #[test]
    fn try_acquire_never_parks() {
        let gate = Gate::new("g");
        assert!(!gate.try_acquire().unwrap());
        gate.release();
        assert!(gate.try_acquire().unwrap());
        assert!(!gate.try_acquire().unwrap());
    }

    #[test]
    fn initial_permits_are_honoured() {
        let gate = Gate::with_permits("g", 2);
        gate.acquire().unwrap();
        gate.acquire().unwrap();
        assert_eq!(gate.permits(), 0);
    }
}

// ── Blocking and wake-up order ────────────────────────────────────────────────

#[cfg(test)]
mod rendezvous {
    use super::*;

    #[test]
    fn first_acquire_blocks_until_release() {
        let gate = Arc::new(Gate::new("g"));
        let g = Arc::clone(&gate);
        let waiter = thread::spawn(move || g.acquire());

        wait_for_parked(&gate, 1);
        assert!(!waiter.is_finished());

        gate.release();
        assert_eq!(waiter.join().unwrap(), Ok(()));
        // The permit went straight to the waiter; nothing was banked.
        assert_eq!(gate.permits(), 0);
        assert_eq!(gate.waiting(), 0);
    }

    #[test]
    fn waiters_wake_in_fifo_order() {
        let gate = Arc::new(Gate::new("g"));
        let (tx, rx) = std::sync::mpsc::channel();

        let mut handles = Vec::new();
        for i in 0..4 {
            let g = Arc::clone(&gate);
            let tx = tx.clone();
            handles.push(thread::spawn(move || {
                g.acquire().unwrap();
                tx.send(i).unwrap();
            }));
            // Enqueue strictly one after the other.
            wait_for_parked(&gate, i + 1);
        }

        let mut order = Vec::new();
        for _ in 0..4 {
            gate.release();
            order.push(rx.recv().unwrap());
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(order, vec![0, 1, 2, 3]);
    }
}

// ── Teardown ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod teardown {
    use super::*;

    #[test]
    fn close_fails_parked_waiter() {
        let gate = Arc::new(Gate::new("done"));
        let g = Arc::clone(&gate);
        let waiter = thread::spawn(move || g.acquire());

        wait_for_parked(&gate, 1);
        gate.close();

        assert_eq!(waiter.join().unwrap(), Err(GateError::InvalidState("done")));
        assert_eq!(gate.waiting(), 0);
    }

    #[test]
    fn acquire_after_close_fails_even_with_permits() {
        let gate = Gate::with_permits("g", 1);
        gate.close();
        assert!(gate.is_closed());
        assert!(gate.acquire().is_err());
        assert!(gate.try_acquire().is_err());
    }

    #[test]
    fn close_is_idempotent_and_release_never_blocks() {
        let gate = Gate::new("g");
        gate.close();
        gate.close();
        gate.release();
        assert_eq!(gate.permits(), 1);
    }
}

// ── Properties ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod properties {
    use proptest::prelude::*;

    use crate::Gate;

    proptest! {
        /// With no parked waiters, the count is exactly releases minus
        /// successful acquires, and never goes negative.
        #[test]
        fn permits_track_releases_minus_acquires(ops in proptest::collection::vec(any::<bool>(), 0..200)) {
            let gate = Gate::new("g");
            let mut releases = 0u64;
            let mut acquired = 0u64;
            for release in ops {
                if release {
                    gate.release();
                    releases += 1;
                } else if gate.try_acquire().unwrap() {
                    acquired += 1;
                }
                prop_assert_eq!(gate.permits(), releases - acquired);
            }
        }
    }
}
