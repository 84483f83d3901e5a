//! `DeploymentBuilder` — streaming consumer of deployment events.

use std::sync::Arc;

use cs_core::Engine;
use cs_process::{ProcessControlBlock, ProcessTable};

use crate::{DeployError, DeployResult, DeploymentEvent, DeploymentRecord};

/// Builds PCBs from a begin/property/arg/end event stream.
///
/// Holds at most one open [`DeploymentRecord`].  Each bracket is independent:
/// once `end_process` returns, nothing about that process is remembered here.
/// A bracketing error leaves the process table untouched.
pub struct DeploymentBuilder<'a> {
    engine: &'a dyn Engine,
    table:  &'a ProcessTable,
    open:   Option<DeploymentRecord>,
}

impl<'a> DeploymentBuilder<'a> {
    pub fn new(engine: &'a dyn Engine, table: &'a ProcessTable) -> Self {
        Self { engine, table, open: None }
    }

    /// Open a new process bracket.
    pub fn begin_process(&mut self, host: &str, function: &str) -> DeployResult<()> {
        if let Some(open) = &self.open {
            return Err(DeployError::Malformed(format!(
                "begin_process({host}, {function}) while {}@{} is still open",
                open.function, open.host_name
            )));
        }
        self.open = Some(DeploymentRecord::new(host, function));
        Ok(())
    }

    /// Set a property on the open process.  A repeated key keeps the last value.
    pub fn property(&mut self, key: &str, value: &str) -> DeployResult<()> {
        let record = self.open_record("property")?;
        if let Some(old) = record.properties.insert(key.to_owned(), value.to_owned()) {
            tracing::debug!(key, old = %old, new = value, "deployment property overridden");
        }
        Ok(())
    }

    /// Append an argument to the open process.
    pub fn process_arg(&mut self, value: &str) -> DeployResult<()> {
        self.open_record("process_arg")?.args.push(value.to_owned());
        Ok(())
    }

    /// Close the bracket: resolve the host, allocate the PCB, forget the record.
    ///
    /// The record is discarded even if host resolution fails.
    pub fn end_process(&mut self) -> DeployResult<Arc<ProcessControlBlock>> {
        let record = self
            .open
            .take()
            .ok_or_else(|| DeployError::Malformed("end_process without begin_process".into()))?;

        let host = self.engine.require_host(&record.host_name)?;
        let pcb = self.table.allocate(record.function, host, record.args, record.properties)?;
        tracing::debug!(pid = %pcb.id(), name = %pcb.name(), host = %pcb.host(), argc = pcb.args().len(), "deployed");
        Ok(pcb)
    }

    /// Feed one event.  Returns the new PCB for `EndProcess`.
    pub fn apply(&mut self, event: &DeploymentEvent) -> DeployResult<Option<Arc<ProcessControlBlock>>> {
        match event {
            DeploymentEvent::BeginProcess { host, function } => self.begin_process(host, function)?,
            DeploymentEvent::Property { key, value }         => self.property(key, value)?,
            DeploymentEvent::ProcessArg(value)               => self.process_arg(value)?,
            DeploymentEvent::EndProcess                      => return self.end_process().map(Some),
        }
        Ok(None)
    }

    /// Check that the stream ended outside of any bracket.
    pub fn finish(self) -> DeployResult<()> {
        match self.open {
            None => Ok(()),
            Some(open) => Err(DeployError::Malformed(format!(
                "deployment ended inside {}@{}",
                open.function, open.host_name
            ))),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// The record being accumulated, if a bracket is open.
    pub fn current(&self) -> Option<&DeploymentRecord> {
        self.open.as_ref()
    }

    fn open_record(&mut self, what: &str) -> DeployResult<&mut DeploymentRecord> {
        self.open
            .as_mut()
            .ok_or_else(|| DeployError::Malformed(format!("{what} outside of a process")))
    }
}
