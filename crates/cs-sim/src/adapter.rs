//! `EngineAdapter` — the inbound half of the engine boundary.
//!
//! The external kernel drives the core only through these calls.  The adapter
//! owns the process table, the function registry, and the single
//! [`Scheduler`], and forwards yields and exits back to the kernel through
//! its [`Engine`] implementation.

use std::collections::BTreeMap;
use std::sync::Arc;

use cs_core::{Engine, ProcessId};
use cs_deploy::DeploymentBuilder;
use cs_process::{
    FunctionRegistry, ProcessControlBlock, ProcessError, ProcessState, ProcessTable,
    ScheduleOutcome, Scheduler, admit,
};

use crate::SimResult;

pub struct EngineAdapter<E: Engine> {
    engine:    Arc<E>,
    table:     ProcessTable,
    registry:  FunctionRegistry,
    scheduler: Scheduler,
}

impl<E: Engine> EngineAdapter<E> {
    pub fn new(engine: Arc<E>, registry: FunctionRegistry) -> Self {
        Self {
            engine,
            table: ProcessTable::new(),
            registry,
            scheduler: Scheduler::new(),
        }
    }

    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    pub fn table(&self) -> &ProcessTable {
        &self.table
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// A deployment builder that allocates into this adapter's table.
    pub fn deployment(&self) -> DeploymentBuilder<'_> {
        DeploymentBuilder::new(&*self.engine, &self.table)
    }

    // ── Inbound calls ─────────────────────────────────────────────────────

    /// Create and admit a process in one step.
    ///
    /// The host and the function are both checked before anything is
    /// allocated, so a failure leaves the table unchanged.
    pub fn create_pcb(
        &self,
        function:   &str,
        host_name:  &str,
        args:       Vec<String>,
        properties: BTreeMap<String, String>,
    ) -> SimResult<ProcessId> {
        let host = self.engine.require_host(host_name)?;
        let body = self.registry.instantiate(function)?;
        let pcb = self.table.allocate(function, host, args, properties)?;
        admit(&pcb, body, self.dyn_engine())?;
        Ok(pcb.id())
    }

    /// Admit a process that was allocated but not yet started, e.g. by a
    /// deployment.
    pub fn admit(&self, pid: ProcessId) -> SimResult<()> {
        let pcb = self.table.lookup(pid)?;
        let body = self.registry.instantiate(pcb.name())?;
        admit(&pcb, body, self.dyn_engine())?;
        Ok(())
    }

    /// Admit every CREATED process, in id order.  Returns how many started.
    pub fn admit_all(&self) -> SimResult<usize> {
        let mut admitted = 0;
        for pcb in self.table.snapshot() {
            if pcb.state() == ProcessState::Created {
                self.admit(pcb.id())?;
                admitted += 1;
            }
        }
        Ok(admitted)
    }

    /// Drive one RUNNING episode of `pid`.
    ///
    /// A yield is reported with `notify_process_suspended`.  Termination,
    /// including a failed or panicked body, is reported with
    /// `notify_process_exit`; the body task is then joined and the process
    /// removed from the table.  Errors here are contract or teardown
    /// violations and should abort the run: scheduling a process that has
    /// already exited, or one that is paused, is a `SchedulingContract`
    /// error.
    pub fn schedule(&self, pid: ProcessId) -> SimResult<ScheduleOutcome> {
        let pcb = self.table.lookup_for(pid, "schedule")?;
        if pcb.is_paused() {
            return Err(ProcessError::SchedulingContract {
                id:    pid,
                state: pcb.state(),
                op:    "schedule a paused process",
            }
            .into());
        }
        let outcome = self.scheduler.schedule(&pcb)?;
        match &outcome {
            ScheduleOutcome::Yielded => {
                self.engine.notify_process_suspended(pid);
            }
            ScheduleOutcome::Terminated(status) => {
                self.engine.notify_process_exit(pid, status);
                pcb.join();
                self.table.remove(pid)?;
                tracing::info!(%pid, name = %pcb.name(), %status, "process exited");
            }
        }
        Ok(outcome)
    }

    /// `true` if `pid` is parked at a yield point.
    pub fn is_suspended(&self, pid: ProcessId) -> SimResult<bool> {
        Ok(self.table.lookup(pid)?.state() == ProcessState::BlockedYield)
    }

    // ── Pause / resume ────────────────────────────────────────────────────

    /// Hold `pid` out of the run loop until [`resume`][Self::resume].
    ///
    /// This is independent of [`is_suspended`][Self::is_suspended], which
    /// reports the handshake state: a paused process stays BLOCKED_START or
    /// BLOCKED_YIELD and is simply never picked.  Pausing twice is a no-op.
    pub fn pause(&self, pid: ProcessId) -> SimResult<()> {
        self.table.lookup_for(pid, "pause")?.pause();
        Ok(())
    }

    /// Let a paused process be scheduled again.  Resuming a process that is
    /// not paused is a no-op.
    pub fn resume(&self, pid: ProcessId) -> SimResult<()> {
        self.table.lookup_for(pid, "resume")?.resume();
        Ok(())
    }

    pub fn is_paused(&self, pid: ProcessId) -> SimResult<bool> {
        Ok(self.table.lookup(pid)?.is_paused())
    }

    // ── Kill ──────────────────────────────────────────────────────────────

    /// Mark `pid` for death.  It terminates the next time it is scheduled.
    /// A paused process is resumed so that it can be.
    pub fn kill(&self, pid: ProcessId) -> SimResult<()> {
        let pcb = self.table.lookup_for(pid, "kill")?;
        pcb.kill();
        pcb.resume();
        Ok(())
    }

    /// Kill every process and drive each one to termination.
    ///
    /// Processes that were never admitted are simply dropped.  If
    /// `reset_next_id` is given, the id counter is moved to it afterwards;
    /// it may not move backwards.  Returns the id the next process will get.
    pub fn kill_all(&self, reset_next_id: Option<ProcessId>) -> SimResult<ProcessId> {
        for pcb in self.table.snapshot() {
            match pcb.state() {
                ProcessState::Created => {
                    self.table.remove(pcb.id())?;
                }
                ProcessState::Terminated => {}
                _ => self.kill_now(&pcb)?,
            }
        }
        if let Some(next) = reset_next_id {
            self.table.reset_next_id(next)?;
        }
        Ok(self.table.next_id())
    }

    fn kill_now(&self, pcb: &ProcessControlBlock) -> SimResult<()> {
        pcb.kill();
        pcb.resume();
        if let ScheduleOutcome::Yielded = self.schedule(pcb.id())? {
            tracing::warn!(pid = %pcb.id(), "process ignored its kill and yielded again");
        }
        Ok(())
    }

    // ── Teardown ──────────────────────────────────────────────────────────

    /// Close every remaining process's gates and join its task.
    pub fn teardown(&self) {
        for pcb in self.table.clear() {
            pcb.join();
        }
    }

    fn dyn_engine(&self) -> Arc<dyn Engine> {
        Arc::clone(&self.engine) as Arc<dyn Engine>
    }
}

impl<E: Engine> Drop for EngineAdapter<E> {
    fn drop(&mut self) {
        self.teardown();
    }
}
