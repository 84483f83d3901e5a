//! Simulated time model.
//!
//! # Design
//!
//! Simulated time is a non-negative `f64` count of seconds held in
//! [`SimTime`].  Only the engine advances it, and only between scheduling
//! rounds; a process body never observes the clock moving while it runs.
//! Wall-clock time plays no part anywhere in the core.

use std::fmt;

use crate::{CoreError, CoreResult};

// ── SimTime ───────────────────────────────────────────────────────────────────

/// An absolute point on the simulated clock, in seconds since the run began.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(pub f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);

    #[inline]
    pub fn as_secs(self) -> f64 {
        self.0
    }

    /// The later of `self` and `other`.
    #[inline]
    pub fn max(self, other: SimTime) -> SimTime {
        if other.0 > self.0 { other } else { self }
    }

    /// The earlier of `self` and `other`.
    #[inline]
    pub fn min(self, other: SimTime) -> SimTime {
        if other.0 < self.0 { other } else { self }
    }
}

impl std::ops::Add<f64> for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: f64) -> SimTime {
        SimTime(self.0 + rhs)
    }
}

impl std::ops::Sub for SimTime {
    type Output = f64;
    #[inline]
    fn sub(self, rhs: SimTime) -> f64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}s", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// The engine's simulated clock.
///
/// `SimClock` is cheap to copy and intentionally holds no heap data.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    now: SimTime,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Move the clock forward by `secs` simulated seconds.
    ///
    /// Non-finite or negative steps are ignored; the clock is monotonic.
    #[inline]
    pub fn advance(&mut self, secs: f64) {
        if secs.is_finite() && secs > 0.0 {
            self.now = self.now + secs;
        }
    }

    /// Jump straight to `t` if it lies in the future.
    #[inline]
    pub fn advance_to(&mut self, t: SimTime) {
        self.now = self.now.max(t);
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}", self.now)
    }
}

// ── RunConfig ─────────────────────────────────────────────────────────────────

/// Top-level run configuration.
///
/// Typically chosen by the host program that picks the deployment file and
/// the simulated-time budget, then passed to the simulation runner.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunConfig {
    /// Stop once the simulated clock reaches this many seconds.  `None` runs
    /// until every process has terminated.
    pub time_budget: Option<f64>,

    /// Simulated seconds the clock advances between two scheduling rounds.
    pub round_duration: f64,

    /// Hard cap on the number of scheduling rounds.  `None` means no cap.
    pub max_rounds: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            time_budget:    None,
            round_duration: 1.0,
            max_rounds:     None,
        }
    }
}

impl RunConfig {
    /// Check the configuration before a run starts.
    pub fn validate(&self) -> CoreResult<()> {
        if !self.round_duration.is_finite() || self.round_duration <= 0.0 {
            return Err(CoreError::Config(format!(
                "round_duration must be a positive number of seconds, got {}",
                self.round_duration
            )));
        }
        if let Some(budget) = self.time_budget {
            if !budget.is_finite() || budget < 0.0 {
                return Err(CoreError::Config(format!(
                    "time_budget must be a non-negative number of seconds, got {budget}"
                )));
            }
        }
        Ok(())
    }

    /// `true` once `now` has used up the time budget.
    #[inline]
    pub fn budget_exhausted(&self, now: SimTime) -> bool {
        self.time_budget.is_some_and(|b| now.0 >= b)
    }
}
