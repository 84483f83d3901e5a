//! Unit tests for cs-core primitives.

#[cfg(test)]
mod ids {
    use crate::{HostId, ProcessId};

    #[test]
    fn ordering() {
        assert!(ProcessId(1) < ProcessId(2));
        assert!(HostId(100) > HostId(99));
    }

    #[test]
    fn first_and_next() {
        assert_eq!(ProcessId::FIRST, ProcessId(1));
        assert_eq!(ProcessId::FIRST.next(), Some(ProcessId(2)));
    }

    #[test]
    fn next_stops_short_of_the_sentinel() {
        assert_eq!(ProcessId(u64::MAX - 2).next(), Some(ProcessId(u64::MAX - 1)));
        assert_eq!(ProcessId(u64::MAX - 1).next(), None);
        assert_eq!(ProcessId::INVALID.next(), None);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(ProcessId::INVALID.get(), u64::MAX);
        assert_eq!(HostId::INVALID.get(), u32::MAX);
        assert!(!ProcessId::default().is_valid());
    }

    #[test]
    fn display() {
        assert_eq!(ProcessId(7).to_string(), "ProcessId(7)");
    }
}

#[cfg(test)]
mod host {
    use crate::{HostBinding, HostId};

    #[test]
    fn accessors_and_display() {
        let h = HostBinding::new(HostId(3), "Tremblay");
        assert_eq!(h.id(), HostId(3));
        assert_eq!(h.name(), "Tremblay");
        assert_eq!(h.to_string(), "Tremblay#3");
    }

    #[test]
    fn clones_compare_equal() {
        let h = HostBinding::new(HostId(0), "Jupiter");
        assert_eq!(h.clone(), h);
    }
}

#[cfg(test)]
mod time {
    use crate::{RunConfig, SimClock, SimTime};

    #[test]
    fn sim_time_arithmetic() {
        let t = SimTime(1.5);
        assert_eq!(t + 2.0, SimTime(3.5));
        assert_eq!(SimTime(4.0) - SimTime(1.0), 3.0);
        assert_eq!(SimTime(1.0).max(SimTime(2.0)), SimTime(2.0));
        assert_eq!(SimTime(1.0).min(SimTime(2.0)), SimTime(1.0));
    }

    #[test]
    fn clock_advances_monotonically() {
        let mut clock = SimClock::new();
        assert_eq!(clock.now(), SimTime::ZERO);
        clock.advance(0.5);
        clock.advance(-3.0);
        clock.advance(f64::NAN);
        assert_eq!(clock.now(), SimTime(0.5));
        clock.advance_to(SimTime(0.25));
        assert_eq!(clock.now(), SimTime(0.5));
        clock.advance_to(SimTime(2.0));
        assert_eq!(clock.now(), SimTime(2.0));
    }

    #[test]
    fn default_config_is_valid() {
        assert!(RunConfig::default().validate().is_ok());
    }

    #[test]
    fn bad_round_duration_rejected() {
        let cfg = RunConfig { round_duration: 0.0, ..RunConfig::default() };
        assert!(cfg.validate().is_err());
        let cfg = RunConfig { round_duration: f64::INFINITY, ..RunConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn negative_budget_rejected() {
        let cfg = RunConfig { time_budget: Some(-1.0), ..RunConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn budget_exhaustion() {
        let cfg = RunConfig { time_budget: Some(10.0), ..RunConfig::default() };
        assert!(!cfg.budget_exhausted(SimTime(9.9)));
        assert!(cfg.budget_exhausted(SimTime(10.0)));
        assert!(!RunConfig::default().budget_exhausted(SimTime(1e12)));
    }
}

#[cfg(test)]
mod exit {
    use crate::ExitStatus;

    #[test]
    fn failure_flag() {
        assert!(!ExitStatus::Completed.is_failure());
        assert!(ExitStatus::Failed("x".into()).is_failure());
        assert!(ExitStatus::Panicked("x".into()).is_failure());
        assert!(ExitStatus::Killed.is_failure());
    }

    #[test]
    fn display() {
        assert_eq!(ExitStatus::Completed.to_string(), "completed");
        assert_eq!(ExitStatus::Failed("boom".into()).to_string(), "failed: boom");
    }
}
