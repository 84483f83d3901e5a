//! How a simulated process ended.

use std::fmt;

/// Terminal status of a process body, reported to the engine through
/// [`Engine::notify_process_exit`][crate::Engine::notify_process_exit].
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ExitStatus {
    /// The main routine returned `Ok`.
    Completed,
    /// The main routine returned an error.
    Failed(String),
    /// The main routine panicked; the payload message is kept when it is a string.
    Panicked(String),
    /// The process was killed before or while it was parked.
    Killed,
}

impl ExitStatus {
    /// `true` for every status except [`ExitStatus::Completed`].
    #[inline]
    pub fn is_failure(&self) -> bool {
        !matches!(self, ExitStatus::Completed)
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitStatus::Completed   => write!(f, "completed"),
            ExitStatus::Failed(m)   => write!(f, "failed: {m}"),
            ExitStatus::Panicked(m) => write!(f, "panicked: {m}"),
            ExitStatus::Killed      => write!(f, "killed"),
        }
    }
}
