//! `ProcessTable` — the registry of every process in a run.
//!
//! Id allocation, insertion, lookup, and removal all happen under one
//! `parking_lot::Mutex`, so two concurrent `allocate` calls can never hand
//! out the same id.  Ids start at [`ProcessId::FIRST`] and are never reused
//! within a run; `BTreeMap` storage keeps iteration in ascending id order,
//! which the run loop relies on for deterministic rounds.
//!
//! Removed ids are remembered as retired, so a late `schedule` of a process
//! that already exited is reported as a contract violation rather than as an
//! id nobody ever issued.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use parking_lot::Mutex;

use cs_core::{CoreError, HostBinding, ProcessId};

use crate::{ProcessControlBlock, ProcessError, ProcessResult, ProcessState};

struct TableInner {
    /// `INVALID` once the id space is used up.
    next_id:   ProcessId,
    processes: BTreeMap<ProcessId, Arc<ProcessControlBlock>>,
    retired:   BTreeSet<ProcessId>,
}

pub struct ProcessTable {
    inner: Mutex<TableInner>,
}

impl Default for ProcessTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTable {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(TableInner {
                next_id:   ProcessId::FIRST,
                processes: BTreeMap::new(),
                retired:   BTreeSet::new(),
            }),
        }
    }

    /// Construct a PCB under the next id and register it.  Both of its gates
    /// start with zero permits; the PCB is CREATED and nothing runs yet.
    ///
    /// Fails with `CoreError::IdsExhausted` once every valid id has been issued.
    pub fn allocate(
        &self,
        name:       impl Into<String>,
        host:       HostBinding,
        args:       Vec<String>,
        properties: BTreeMap<String, String>,
    ) -> ProcessResult<Arc<ProcessControlBlock>> {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        if !id.is_valid() {
            return Err(CoreError::IdsExhausted.into());
        }
        inner.next_id = id.next().unwrap_or(ProcessId::INVALID);

        let pcb = Arc::new(ProcessControlBlock::new(id, name.into(), host, args, properties));
        inner.processes.insert(id, Arc::clone(&pcb));
        drop(inner);

        tracing::debug!(pid = %id, name = %pcb.name(), host = %pcb.host(), "process allocated");
        Ok(pcb)
    }

    pub fn lookup(&self, id: ProcessId) -> ProcessResult<Arc<ProcessControlBlock>> {
        self.inner
            .lock()
            .processes
            .get(&id)
            .cloned()
            .ok_or(ProcessError::UnknownProcess(id))
    }

    /// Like [`lookup`][Self::lookup], but an id that was issued and has since
    /// been removed fails with `SchedulingContract { state: Terminated, op }`.
    pub fn lookup_for(&self, id: ProcessId, op: &'static str) -> ProcessResult<Arc<ProcessControlBlock>> {
        let inner = self.inner.lock();
        if let Some(pcb) = inner.processes.get(&id) {
            return Ok(Arc::clone(pcb));
        }
        if inner.retired.contains(&id) {
            return Err(ProcessError::SchedulingContract { id, state: ProcessState::Terminated, op });
        }
        Err(ProcessError::UnknownProcess(id))
    }

    /// `true` if `id` was issued and has since been removed.
    pub fn is_retired(&self, id: ProcessId) -> bool {
        self.inner.lock().retired.contains(&id)
    }

    /// Drop a process from the table.
    ///
    /// Only TERMINATED processes (or CREATED ones that were never admitted)
    /// may be removed; anything else still has a live body task.
    pub fn remove(&self, id: ProcessId) -> ProcessResult<Arc<ProcessControlBlock>> {
        let mut inner = self.inner.lock();
        let pcb = inner.processes.get(&id).ok_or(ProcessError::UnknownProcess(id))?;
        let state = pcb.state();
        if !matches!(state, ProcessState::Terminated | ProcessState::Created) {
            return Err(ProcessError::SchedulingContract { id, state, op: "remove" });
        }
        let pcb = inner.processes.remove(&id).ok_or(ProcessError::UnknownProcess(id))?;
        inner.retired.insert(id);
        tracing::debug!(pid = %id, "process removed");
        Ok(pcb)
    }

    pub fn contains(&self, id: ProcessId) -> bool {
        self.inner.lock().processes.contains_key(&id)
    }

    /// Registered ids in ascending order.
    pub fn ids(&self) -> Vec<ProcessId> {
        self.inner.lock().processes.keys().copied().collect()
    }

    /// Registered PCBs in ascending id order.
    pub fn snapshot(&self) -> Vec<Arc<ProcessControlBlock>> {
        self.inner.lock().processes.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().processes.is_empty()
    }

    /// The id the next `allocate` will issue, or `INVALID` if none is left.
    pub fn next_id(&self) -> ProcessId {
        self.inner.lock().next_id
    }

    /// Move the id counter forward to `next`.  Moving it backwards would let
    /// an id be issued twice, so that is refused, as is the `INVALID`
    /// sentinel.
    pub fn reset_next_id(&self, next: ProcessId) -> ProcessResult<()> {
        if !next.is_valid() {
            return Err(CoreError::InvalidId(next).into());
        }
        let mut inner = self.inner.lock();
        if next < inner.next_id {
            return Err(CoreError::IdReused(next).into());
        }
        inner.next_id = next;
        Ok(())
    }

    /// Simulation teardown: empty the table and close every PCB's gates so
    /// any body task still parked unwinds.  The id counter is left alone.
    ///
    /// Returns the removed PCBs so the caller can join their tasks.
    pub fn clear(&self) -> Vec<Arc<ProcessControlBlock>> {
        let drained: Vec<_> = {
            let mut inner = self.inner.lock();
            let processes = std::mem::take(&mut inner.processes);
            inner.retired.extend(processes.keys().copied());
            processes.into_values().collect()
        };
        for pcb in &drained {
            pcb.close_gates();
        }
        if !drained.is_empty() {
            tracing::debug!(count = drained.len(), "process table cleared");
        }
        drained
    }
}
