//! `cs-sync` — the synchronization primitive under the scheduling handshake.
//!
//! A [`Gate`] is a counting semaphore with an explicit FIFO wait queue.  Each
//! simulated process owns two of them; see `cs-process` for the protocol
//! built on top.
//!
//! | Module     | Contents                          |
//! |------------|-----------------------------------|
//! | [`gate`]   | `Gate`                            |
//! | [`error`]  | `GateError`, `GateResult<T>`      |

pub mod error;
pub mod gate;

#[cfg(test)]
mod tests;

pub use error::{GateError, GateResult};
pub use gate::Gate;
