//! `ProcessContext` — the handle a running body uses to talk to the core.

use std::collections::BTreeMap;
use std::sync::Arc;

use cs_core::{Engine, HostBinding, ProcessId, SimTime};

use crate::{ProcessControlBlock, ProcessError, ProcessResult, ProcessState};

/// Passed to [`ProcessBody::main`][crate::ProcessBody::main].
///
/// A context only exists on the body's own task, for the duration of its main
/// routine, so everything here runs while the process is RUNNING.
pub struct ProcessContext {
    pcb:    Arc<ProcessControlBlock>,
    engine: Arc<dyn Engine>,
}

impl ProcessContext {
    pub(crate) fn new(pcb: Arc<ProcessControlBlock>, engine: Arc<dyn Engine>) -> Self {
        Self { pcb, engine }
    }

    #[inline]
    pub fn pid(&self) -> ProcessId {
        self.pcb.id()
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.pcb.name()
    }

    #[inline]
    pub fn host(&self) -> &HostBinding {
        self.pcb.host()
    }

    #[inline]
    pub fn args(&self) -> &[String] {
        self.pcb.args()
    }

    #[inline]
    pub fn properties(&self) -> &BTreeMap<String, String> {
        self.pcb.properties()
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.pcb.property(key)
    }

    /// The engine's simulated clock.
    pub fn now(&self) -> SimTime {
        self.engine.current_clock()
    }

    /// Hand control back to the driver and park until scheduled again.
    ///
    /// Returns once a later `schedule` resumes this process.  Fails with
    /// [`ProcessError::Killed`] if the process was killed while parked, and
    /// with a gate error if the simulation was torn down; bodies should
    /// propagate both with `?`.
    pub fn unschedule(&mut self) -> ProcessResult<()> {
        let id = self.pcb.id();
        {
            let mut inner = self.pcb.inner.lock();
            if inner.state != ProcessState::Running {
                return Err(ProcessError::SchedulingContract {
                    id,
                    state: inner.state,
                    op:    "unschedule",
                });
            }
            inner.state = ProcessState::BlockedYield;
        }
        tracing::trace!(pid = %id, "yield");

        self.pcb.done_gate.release();
        self.pcb.start_gate.acquire()?;

        self.pcb.set_state(ProcessState::Running);
        tracing::trace!(pid = %id, "resume");

        if self.pcb.is_killed() {
            return Err(ProcessError::Killed(id));
        }
        Ok(())
    }

    /// Yield until the simulated clock has moved `secs` seconds past now.
    pub fn wait_for(&mut self, secs: f64) -> ProcessResult<()> {
        if !secs.is_finite() || secs < 0.0 {
            return Err(ProcessError::InvalidDuration(secs));
        }
        let deadline = self.now() + secs;
        self.pcb.set_wake_at(Some(deadline));
        let result = self.sleep_until(deadline);
        self.pcb.set_wake_at(None);
        result
    }

    fn sleep_until(&mut self, deadline: SimTime) -> ProcessResult<()> {
        while self.now() < deadline {
            self.unschedule()?;
        }
        Ok(())
    }

    /// Log the argument vector, one event per argument.
    pub fn show_args(&self) {
        let host = self.host().name();
        tracing::info!(pid = %self.pid(), name = %self.name(), host, argc = self.args().len(), "arguments");
        for (i, arg) in self.args().iter().enumerate() {
            tracing::info!(pid = %self.pid(), name = %self.name(), host, index = i, arg = %arg, "argument");
        }
    }
}
