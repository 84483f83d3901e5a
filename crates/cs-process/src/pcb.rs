//! The process control block.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use parking_lot::Mutex;

use cs_core::{ExitStatus, HostBinding, ProcessId, SimTime};
use cs_sync::Gate;

use crate::ProcessState;

/// Mutable part of a PCB.  Guarded by one lock so that a state change and the
/// exit status it carries are always observed together.
#[derive(Debug)]
pub(crate) struct PcbInner {
    pub(crate) state:   ProcessState,
    pub(crate) exit:    Option<ExitStatus>,
    pub(crate) wake_at: Option<SimTime>,
}

/// Everything the core knows about one simulated process.
///
/// Identity, host binding, arguments, and properties are fixed at
/// construction.  Construction is pure data: nothing runs until the PCB is
/// handed to [`admit`][crate::admit].  PCBs are shared as
/// `Arc<ProcessControlBlock>` between the process table, the driver, and the
/// body task.
pub struct ProcessControlBlock {
    id:         ProcessId,
    name:       String,
    host:       HostBinding,
    args:       Vec<String>,
    properties: BTreeMap<String, String>,

    pub(crate) start_gate: Gate,
    pub(crate) done_gate:  Gate,

    pub(crate) inner: Mutex<PcbInner>,
    killed:           AtomicBool,
    paused:           AtomicBool,
    task:             Mutex<Option<JoinHandle<()>>>,
}

impl ProcessControlBlock {
    pub(crate) fn new(
        id:         ProcessId,
        name:       String,
        host:       HostBinding,
        args:       Vec<String>,
        properties: BTreeMap<String, String>,
    ) -> Self {
        Self {
            id,
            name,
            host,
            args,
            properties,
            start_gate: Gate::new("start"),
            done_gate:  Gate::new("done"),
            inner: Mutex::new(PcbInner {
                state:   ProcessState::Created,
                exit:    None,
                wake_at: None,
            }),
            killed: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            task:   Mutex::new(None),
        }
    }

    // ── Identity ──────────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> ProcessId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn host(&self) -> &HostBinding {
        &self.host
    }

    #[inline]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    #[inline]
    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    // ── Handshake state ───────────────────────────────────────────────────

    pub fn state(&self) -> ProcessState {
        self.inner.lock().state
    }

    /// The exit status, once the process is TERMINATED.
    pub fn exit_status(&self) -> Option<ExitStatus> {
        self.inner.lock().exit.clone()
    }

    /// Simulated time before which the run loop should not schedule this
    /// process.  Set by `ProcessContext::wait_for`.
    pub fn wake_at(&self) -> Option<SimTime> {
        self.inner.lock().wake_at
    }

    /// `true` if the process is parked, not paused, and its wake deadline
    /// (if any) has passed.
    pub fn is_ready(&self, now: SimTime) -> bool {
        if self.is_paused() {
            return false;
        }
        let inner = self.inner.lock();
        inner.state.is_schedulable() && inner.wake_at.is_none_or(|t| now >= t)
    }

    // ── Kill ──────────────────────────────────────────────────────────────

    /// Ask the process to die.
    ///
    /// Takes effect the next time the body is scheduled: a body that never
    /// started skips its main routine, a parked body sees `unschedule` fail
    /// with `ProcessError::Killed`.  Either way it ends with
    /// [`ExitStatus::Killed`].
    pub fn kill(&self) {
        if !self.killed.swap(true, Ordering::AcqRel) {
            tracing::info!(pid = %self.id, name = %self.name, "process will be killed");
        }
    }

    #[inline]
    pub fn is_killed(&self) -> bool {
        self.killed.load(Ordering::Acquire)
    }

    // ── Pause ─────────────────────────────────────────────────────────────

    /// Hold the process out of scheduling until [`resume`][Self::resume].
    ///
    /// Pausing is driver-side bookkeeping: the body keeps its place in the
    /// handshake (BLOCKED_START or BLOCKED_YIELD) and is simply not picked.
    /// Returns `false` if it was already paused.
    pub fn pause(&self) -> bool {
        let fresh = !self.paused.swap(true, Ordering::AcqRel);
        if fresh {
            tracing::debug!(pid = %self.id, "process paused");
        }
        fresh
    }

    /// Make a paused process schedulable again.  Returns `false` if it was
    /// not paused.
    pub fn resume(&self) -> bool {
        let was = self.paused.swap(false, Ordering::AcqRel);
        if was {
            tracing::debug!(pid = %self.id, "process resumed");
        }
        was
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    // ── Internal transitions ──────────────────────────────────────────────

    pub(crate) fn set_state(&self, state: ProcessState) {
        self.inner.lock().state = state;
    }

    pub(crate) fn set_wake_at(&self, t: Option<SimTime>) {
        self.inner.lock().wake_at = t;
    }

    /// Record the exit status, enter TERMINATED, and wake the driver.
    pub(crate) fn terminate(&self, status: ExitStatus) {
        {
            let mut inner = self.inner.lock();
            inner.state = ProcessState::Terminated;
            inner.wake_at = None;
            inner.exit = Some(status);
        }
        self.done_gate.release();
    }

    pub(crate) fn attach_task(&self, handle: JoinHandle<()>) {
        *self.task.lock() = Some(handle);
    }

    /// Tear down both gates so a parked body task unwinds.
    pub(crate) fn close_gates(&self) {
        self.start_gate.close();
        self.done_gate.close();
    }

    /// Wait for the body task to exit.  Only call once the process is
    /// TERMINATED or its gates are closed, otherwise this blocks forever.
    pub fn join(&self) {
        let handle = self.task.lock().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::warn!(pid = %self.id, "process task ended abnormally");
            }
        }
    }
}

impl std::fmt::Debug for ProcessControlBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessControlBlock")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("host", &self.host)
            .field("args", &self.args)
            .field("state", &self.state())
            .field("paused", &self.is_paused())
            .finish()
    }
}
