//! `LocalKernel` — an in-process stand-in for the native simulation kernel.
//!
//! It knows a flat list of host names, owns the simulated clock, and records
//! every notification the core sends it.  It has no platform model: no
//! routing, no link costs, no host speeds.

use std::sync::Arc;

use parking_lot::Mutex;

use cs_core::{Engine, ExitStatus, HostBinding, HostId, ProcessId, SimClock, SimTime};

/// A notification received from the core, stamped with the clock at the time.
#[derive(Clone, PartialEq, Debug)]
pub enum KernelEvent {
    Suspended { pid: ProcessId, at: SimTime },
    Exited { pid: ProcessId, status: ExitStatus, at: SimTime },
}

pub struct LocalKernel {
    hosts:  Vec<Arc<str>>,
    clock:  Mutex<SimClock>,
    events: Mutex<Vec<KernelEvent>>,
}

impl LocalKernel {
    /// A kernel whose hosts get `HostId`s in the order given.
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        Self {
            hosts:  hosts.into_iter().map(Into::into).collect(),
            clock:  Mutex::new(SimClock::new()),
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.hosts.iter().map(|h| &**h)
    }

    pub fn now(&self) -> SimTime {
        self.clock.lock().now()
    }

    pub fn advance(&self, secs: f64) {
        self.clock.lock().advance(secs);
    }

    pub fn advance_to(&self, t: SimTime) {
        self.clock.lock().advance_to(t);
    }

    /// Every notification so far, oldest first.
    pub fn events(&self) -> Vec<KernelEvent> {
        self.events.lock().clone()
    }

    /// Exit notifications so far, in the order they arrived.
    pub fn exits(&self) -> Vec<(ProcessId, ExitStatus)> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                KernelEvent::Exited { pid, status, .. } => Some((*pid, status.clone())),
                KernelEvent::Suspended { .. } => None,
            })
            .collect()
    }

    fn record(&self, event: KernelEvent) {
        self.events.lock().push(event);
    }
}

impl Engine for LocalKernel {
    fn resolve_host(&self, name: &str) -> Option<HostBinding> {
        self.hosts
            .iter()
            .position(|h| &**h == name)
            .map(|i| HostBinding::new(HostId(i as u32), Arc::clone(&self.hosts[i])))
    }

    fn notify_process_exit(&self, pid: ProcessId, status: &ExitStatus) {
        let at = self.now();
        self.record(KernelEvent::Exited { pid, status: status.clone(), at });
    }

    fn notify_process_suspended(&self, pid: ProcessId) {
        let at = self.now();
        self.record(KernelEvent::Suspended { pid, at });
    }

    fn current_clock(&self) -> SimTime {
        self.now()
    }
}
