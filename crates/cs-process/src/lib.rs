//! `cs-process` — simulated processes and the handshake that serializes them.
//!
//! # The handshake
//!
//! Every [`ProcessControlBlock`] owns two [`Gate`][cs_sync::Gate]s, both
//! created with zero permits.  Its body runs on a dedicated OS thread but only
//! ever does user work while holding the start permit:
//!
//! ```text
//!   driver (Scheduler::schedule)        body task
//!   ─────────────────────────────       ──────────────────────────────
//!                                       start.acquire()   BLOCKED_START
//!   start.release() ──────────────────▶ RUNNING: main(ctx)
//!   done.acquire()  … parked …
//!                                       ctx.unschedule():
//!                   ◀────────────────── done.release()    BLOCKED_YIELD
//!   returns Yielded                     start.acquire()
//!   …
//!   start.release() ──────────────────▶ RUNNING (resumes after unschedule)
//!   done.acquire()                      main returns / fails / panics
//!                   ◀────────────────── done.release()    TERMINATED
//!   returns Terminated(status)
//! ```
//!
//! `schedule` refuses to run while another `schedule` is in flight, so at
//! most one body is RUNNING at any instant.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                 |
//! |---------------|----------------------------------------------------------|
//! | [`state`]     | `ProcessState`                                           |
//! | [`pcb`]       | `ProcessControlBlock`                                    |
//! | [`table`]     | `ProcessTable` — id allocation and lookup                |
//! | [`body`]      | `ProcessBody`, `FunctionRegistry`                        |
//! | [`context`]   | `ProcessContext` — what a running body can do            |
//! | [`handshake`] | `admit`, `Scheduler`, `ScheduleOutcome`                  |
//! | [`error`]     | `ProcessError`, `BodyError`, `ProcessResult<T>`          |

pub mod body;
pub mod context;
pub mod error;
pub mod handshake;
pub mod pcb;
pub mod state;
pub mod table;


pub use body::{FunctionRegistry, ProcessBody};
pub use context::ProcessContext;
pub use error::{BodyError, BodyResult, ProcessError, ProcessResult};
pub use handshake::{ScheduleOutcome, Scheduler, admit};
pub use pcb::ProcessControlBlock;
pub use state::ProcessState;
pub use table::ProcessTable;
