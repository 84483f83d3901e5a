//! Per-process handshake state.

use std::fmt;

/// Where a process is in the scheduling handshake.
///
/// ```text
/// CREATED ──admit──▶ BLOCKED_START ──schedule──▶ RUNNING ──unschedule──▶ BLOCKED_YIELD
///                                                  │  ▲                        │
///                                                  │  └────────schedule────────┘
///                                                  └──return / fail──▶ TERMINATED
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum ProcessState {
    /// Constructed, body task not started.
    Created,
    /// Body task started and parked before its main routine.
    BlockedStart,
    /// Executing user code.  At most one process is here at a time.
    Running,
    /// Parked inside `unschedule`, waiting for the next `schedule`.
    BlockedYield,
    /// Main routine finished; the body task will never run again.
    Terminated,
}

impl ProcessState {
    /// `true` for the two parked states a `schedule` call may resume.
    #[inline]
    pub fn is_schedulable(self) -> bool {
        matches!(self, ProcessState::BlockedStart | ProcessState::BlockedYield)
    }

    #[inline]
    pub fn is_terminated(self) -> bool {
        self == ProcessState::Terminated
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProcessState::Created      => "CREATED",
            ProcessState::BlockedStart => "BLOCKED_START",
            ProcessState::Running      => "RUNNING",
            ProcessState::BlockedYield => "BLOCKED_YIELD",
            ProcessState::Terminated   => "TERMINATED",
        };
        f.write_str(s)
    }
}
