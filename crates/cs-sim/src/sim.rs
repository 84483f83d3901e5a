//! The `Simulation` struct and its round loop.

use std::sync::Arc;

use cs_core::{ExitStatus, RunConfig, SimTime};
use cs_process::ScheduleOutcome;

use crate::{EngineAdapter, LocalKernel, SimObserver, SimResult};

/// What a run did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunSummary {
    /// Rounds executed.
    pub rounds:      u64,
    /// Simulated clock when the run stopped.
    pub final_clock: SimTime,
    /// Scheduling episodes across all rounds.
    pub episodes:    u64,
    pub completed:   usize,
    pub failed:      usize,
    pub killed:      usize,
    /// Processes still alive when the run stopped (budget or round cap hit).
    pub remaining:   usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &ScheduleOutcome) {
        self.episodes += 1;
        if let ScheduleOutcome::Terminated(status) = outcome {
            match status {
                ExitStatus::Completed => self.completed += 1,
                ExitStatus::Killed    => self.killed += 1,
                ExitStatus::Failed(_) | ExitStatus::Panicked(_) => self.failed += 1,
            }
        }
    }
}

/// The main simulation runner.
///
/// Owns the reference kernel and the engine adapter, and plays the part of
/// the external kernel: it decides each round which processes run, then
/// advances the clock.
///
/// Create via [`SimulationBuilder`][crate::SimulationBuilder].
pub struct Simulation {
    pub config: RunConfig,
    kernel:     Arc<LocalKernel>,
    adapter:    EngineAdapter<LocalKernel>,
    round:      u64,
    summary:    RunSummary,
}

impl Simulation {
    pub(crate) fn new(config: RunConfig, kernel: Arc<LocalKernel>, adapter: EngineAdapter<LocalKernel>) -> Self {
        Self {
            config,
            kernel,
            adapter,
            round:   0,
            summary: RunSummary::default(),
        }
    }

    pub fn kernel(&self) -> &LocalKernel {
        &self.kernel
    }

    pub fn adapter(&self) -> &EngineAdapter<LocalKernel> {
        &self.adapter
    }

    pub fn now(&self) -> SimTime {
        self.kernel.now()
    }

    /// Rounds executed so far.
    pub fn round(&self) -> u64 {
        self.round
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Run until every process has exited, the time budget is spent, or
    /// `max_rounds` is reached.
    ///
    /// A failing process body does not stop the run; it is counted in the
    /// summary.  An `Err` means the handshake itself broke.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<RunSummary> {
        tracing::info!(processes = self.adapter.table().len(), "simulation starting");
        loop {
            if self.adapter.table().is_empty() {
                break;
            }
            if self.config.budget_exhausted(self.now()) {
                tracing::info!(now = %self.now(), "time budget exhausted");
                break;
            }
            if self.config.max_rounds.is_some_and(|cap| self.round >= cap) {
                tracing::info!(rounds = self.round, "round cap reached");
                break;
            }
            if !self.step(observer)? {
                tracing::warn!(
                    remaining = self.adapter.table().len(),
                    "no process can ever become runnable; stopping"
                );
                break;
            }
        }

        let summary = self.summary();
        observer.on_sim_end(&summary);
        tracing::info!(
            rounds = summary.rounds,
            clock = %summary.final_clock,
            completed = summary.completed,
            failed = summary.failed,
            killed = summary.killed,
            "simulation finished"
        );
        Ok(summary)
    }

    /// Run exactly `n` rounds from the current position, ignoring the budget
    /// and the round cap.  Useful for tests and incremental stepping.
    pub fn run_rounds<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step(observer)?;
        }
        Ok(())
    }

    /// The summary so far.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            rounds:      self.round,
            final_clock: self.now(),
            remaining:   self.adapter.table().len(),
            ..self.summary.clone()
        }
    }

    // ── Core round processing ─────────────────────────────────────────────

    /// One round plus the clock advance.  Returns `false` if nothing ran and
    /// nothing is waiting on the clock, i.e. the run can make no progress.
    fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<bool> {
        let now = self.now();
        observer.on_round_start(self.round, now);
        let scheduled = self.process_round(now, observer)?;
        observer.on_round_end(self.round, now, scheduled);
        tracing::debug!(round = self.round, %now, scheduled, "round complete");
        self.round += 1;

        self.kernel.advance(self.config.round_duration);
        if scheduled > 0 {
            return Ok(true);
        }
        // Idle round: jump straight to the earliest sleeper.
        match self.next_wake() {
            Some(t) => {
                self.kernel.advance_to(t);
                Ok(true)
            }
            None => Ok(self.adapter.table().is_empty()),
        }
    }

    fn process_round<O: SimObserver>(&mut self, now: SimTime, observer: &mut O) -> SimResult<usize> {
        // Ascending id order makes each round deterministic.
        let ready: Vec<_> = self
            .adapter
            .table()
            .snapshot()
            .into_iter()
            .filter(|pcb| pcb.is_ready(now))
            .map(|pcb| pcb.id())
            .collect();

        for &pid in &ready {
            let outcome = self.adapter.schedule(pid)?;
            self.summary.record(&outcome);
            observer.on_scheduled(pid, &outcome);
        }
        Ok(ready.len())
    }

    fn next_wake(&self) -> Option<SimTime> {
        self.adapter
            .table()
            .snapshot()
            .iter()
            .filter(|pcb| pcb.state().is_schedulable() && !pcb.is_paused())
            .filter_map(|pcb| pcb.wake_at())
            .reduce(SimTime::min)
    }
}
