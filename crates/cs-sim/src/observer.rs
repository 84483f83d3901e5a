//! Simulation observer trait for progress reporting and data collection.

use cs_core::{ProcessId, SimTime};
use cs_process::ScheduleOutcome;

use crate::RunSummary;

/// Callbacks invoked by [`Simulation::run`][crate::Simulation::run] at key
/// points in the round loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example — exit logger
///
/// ```rust,ignore
/// struct ExitLogger;
///
/// impl SimObserver for ExitLogger {
///     fn on_scheduled(&mut self, pid: ProcessId, outcome: &ScheduleOutcome) {
///         if let ScheduleOutcome::Terminated(status) = outcome {
///             tracing::info!(%pid, %status, "exited");
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the start of each round, before anything is scheduled.
    fn on_round_start(&mut self, _round: u64, _now: SimTime) {}

    /// Called after every `schedule` call returns.
    fn on_scheduled(&mut self, _pid: ProcessId, _outcome: &ScheduleOutcome) {}

    /// Called at the end of each round, before the clock advances.
    ///
    /// `scheduled` is the number of processes that ran this round.
    fn on_round_end(&mut self, _round: u64, _now: SimTime, _scheduled: usize) {}

    /// Called once after the final round.
    fn on_sim_end(&mut self, _summary: &RunSummary) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
