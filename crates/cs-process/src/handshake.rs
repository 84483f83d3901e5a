//! Admission and scheduling — the driver's half of the handshake.
//!
//! The body's half is [`ProcessContext::unschedule`] plus the task wrapper in
//! this module, which guarantees the done gate is released however the main
//! routine ends.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use cs_core::{Engine, ExitStatus};

use crate::{
    BodyError, ProcessBody, ProcessContext, ProcessControlBlock, ProcessError, ProcessResult,
    ProcessState,
};

// ── Admission ─────────────────────────────────────────────────────────────────

/// Start a CREATED process's body task.
///
/// The task parks on the start gate before touching user code, so on return
/// the process is BLOCKED_START and nothing has run yet.  A process is
/// admitted once; its single task carries it through every later
/// schedule/unschedule pair.
pub fn admit(
    pcb:    &Arc<ProcessControlBlock>,
    body:   Box<dyn ProcessBody>,
    engine: Arc<dyn Engine>,
) -> ProcessResult<()> {
    let id = pcb.id();
    {
        let mut inner = pcb.inner.lock();
        if inner.state != ProcessState::Created {
            return Err(ProcessError::SchedulingContract { id, state: inner.state, op: "admit" });
        }
        inner.state = ProcessState::BlockedStart;
    }

    let task_pcb = Arc::clone(pcb);
    let spawned = std::thread::Builder::new()
        .name(format!("{}-{}", pcb.name(), id.get()))
        .spawn(move || run_body(task_pcb, body, engine));

    match spawned {
        Ok(handle) => {
            pcb.attach_task(handle);
            tracing::info!(pid = %id, name = %pcb.name(), host = %pcb.host(), "process admitted");
            Ok(())
        }
        Err(e) => {
            pcb.set_state(ProcessState::Created);
            Err(ProcessError::Spawn(e))
        }
    }
}

/// The body task.  Every path out of here after the first start permit goes
/// through `terminate`, which releases the done gate.
fn run_body(pcb: Arc<ProcessControlBlock>, mut body: Box<dyn ProcessBody>, engine: Arc<dyn Engine>) {
    let id = pcb.id();
    if pcb.start_gate.acquire().is_err() {
        // Torn down before it was ever scheduled; no driver is waiting.
        pcb.set_state(ProcessState::Terminated);
        tracing::debug!(pid = %id, "torn down before start");
        return;
    }

    if pcb.is_killed() {
        pcb.terminate(ExitStatus::Killed);
        return;
    }

    pcb.set_state(ProcessState::Running);
    tracing::debug!(pid = %id, "running");

    let mut ctx = ProcessContext::new(Arc::clone(&pcb), engine);
    let status = match catch_unwind(AssertUnwindSafe(|| body.main(&mut ctx))) {
        Ok(Ok(())) => ExitStatus::Completed,
        Ok(Err(BodyError::Process(ProcessError::Killed(_)))) => ExitStatus::Killed,
        Ok(Err(e)) => ExitStatus::Failed(e.to_string()),
        Err(payload) => ExitStatus::Panicked(panic_message(payload.as_ref())),
    };
    drop(ctx);

    if status.is_failure() {
        tracing::warn!(pid = %id, name = %pcb.name(), %status, "process ended abnormally");
    } else {
        tracing::debug!(pid = %id, "main routine returned");
    }
    pcb.terminate(status);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

// ── Scheduling ────────────────────────────────────────────────────────────────

/// What a `schedule` call observed when the body handed control back.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ScheduleOutcome {
    /// The body called `unschedule` and is now BLOCKED_YIELD.
    Yielded,
    /// The body's main routine is over.
    Terminated(ExitStatus),
}

/// The driver side of the handshake.
///
/// One `Scheduler` serves a whole run.  It admits a single `schedule` call at
/// a time; overlapping calls are a contract violation, not something to
/// queue.
#[derive(Default)]
pub struct Scheduler {
    in_flight: AtomicBool,
}

/// Clears the in-flight flag on every exit path of `schedule`.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `pcb` until it yields or terminates.
    ///
    /// Releases the start gate, then parks on the done gate.  Returns only
    /// after the body has released the done gate, so everything the body did
    /// happens-before the return.  `pcb` must be BLOCKED_START or
    /// BLOCKED_YIELD; anything else fails fast with `SchedulingContract`.
    pub fn schedule(&self, pcb: &ProcessControlBlock) -> ProcessResult<ScheduleOutcome> {
        let id = pcb.id();
        if self.in_flight.swap(true, Ordering::AcqRel) {
            return Err(ProcessError::SchedulingContract {
                id,
                state: pcb.state(),
                op:    "schedule while another schedule is in flight",
            });
        }
        let _in_flight = InFlight(&self.in_flight);

        let state = pcb.state();
        if !state.is_schedulable() {
            return Err(ProcessError::SchedulingContract { id, state, op: "schedule" });
        }

        tracing::trace!(pid = %id, from = %state, "schedule");
        pcb.start_gate.release();
        pcb.done_gate.acquire()?;

        let inner = pcb.inner.lock();
        match (inner.state, &inner.exit) {
            (ProcessState::BlockedYield, _) => Ok(ScheduleOutcome::Yielded),
            (ProcessState::Terminated, Some(status)) => Ok(ScheduleOutcome::Terminated(status.clone())),
            (state, _) => Err(ProcessError::SchedulingContract {
                id,
                state,
                op: "hand back control",
            }),
        }
    }

    /// `true` while a `schedule` call is parked on a done gate.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}
