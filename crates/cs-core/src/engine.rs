//! The outbound half of the engine boundary.
//!
//! The core reaches the external simulation kernel through this trait and
//! nothing else.  The inbound half (`schedule`, `create_pcb`,
//! `is_suspended`) lives on `cs_sim::EngineAdapter`.

use crate::{CoreError, CoreResult, ExitStatus, HostBinding, ProcessId, SimTime};

/// Calls the core makes into the simulation kernel.
///
/// Implementations are shared between the driver and every process body
/// task, so they must be `Send + Sync`.  Only one body runs at a time, but
/// which OS thread it runs on changes from call to call.
pub trait Engine: Send + Sync + 'static {
    /// Look up a host by name.  `None` if the platform has no such host.
    fn resolve_host(&self, name: &str) -> Option<HostBinding>;

    /// A process reached TERMINATED.  Called exactly once per process.
    fn notify_process_exit(&self, pid: ProcessId, status: &ExitStatus);

    /// A scheduled process yielded back to the driver.
    fn notify_process_suspended(&self, pid: ProcessId);

    /// The current simulated clock.
    fn current_clock(&self) -> SimTime;

    /// Like [`resolve_host`][Self::resolve_host] but unknown names are an error.
    fn require_host(&self, name: &str) -> CoreResult<HostBinding> {
        self.resolve_host(name)
            .ok_or_else(|| CoreError::UnknownHost(name.to_owned()))
    }
}
