//! Integration tests for cs-sim.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use cs_core::{CoreError, ExitStatus, ProcessId, RunConfig, SimTime};
use cs_deploy::DeploymentEvent;
use cs_process::{
    BodyError, FunctionRegistry, ProcessContext, ProcessError, ProcessState, ScheduleOutcome,
};

use crate::{
    EngineAdapter, KernelEvent, LocalKernel, NoopObserver, SimError, SimObserver, SimulationBuilder,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn kernel() -> LocalKernel {
    LocalKernel::new(["Tremblay", "Jupiter", "Fafard"])
}

fn adapter(registry: FunctionRegistry) -> EngineAdapter<LocalKernel> {
    EngineAdapter::new(Arc::new(kernel()), registry)
}

fn config(round_duration: f64) -> RunConfig {
    RunConfig { round_duration, ..RunConfig::default() }
}

type Trace = Arc<Mutex<Vec<String>>>;

fn trace() -> Trace {
    Arc::new(Mutex::new(Vec::new()))
}

/// A body that yields `n` times and then returns.
fn yielder(n: usize) -> impl FnMut(&mut ProcessContext) -> cs_process::BodyResult + Clone + Send + Sync + 'static {
    move |ctx: &mut ProcessContext| {
        for _ in 0..n {
            ctx.unschedule()?;
        }
        Ok(())
    }
}

fn deploy(host: &str, function: &str, args: &[&str]) -> Vec<DeploymentEvent> {
    let mut events = vec![DeploymentEvent::begin(host, function)];
    events.extend(args.iter().map(|a| DeploymentEvent::arg(*a)));
    events.push(DeploymentEvent::EndProcess);
    events
}

// ── EngineAdapter ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod adapter_tests {
    use super::*;

    #[test]
    fn create_and_schedule_notifies_kernel() {
        let a = adapter(FunctionRegistry::new().with_fn("w", yielder(1)));
        let pid = a.create_pcb("w", "Jupiter", vec![], BTreeMap::new()).unwrap();
        assert_eq!(pid, ProcessId(1));
        assert!(!a.is_suspended(pid).unwrap());

        assert_eq!(a.schedule(pid).unwrap(), ScheduleOutcome::Yielded);
        assert!(a.is_suspended(pid).unwrap());

        assert_eq!(a.schedule(pid).unwrap(), ScheduleOutcome::Terminated(ExitStatus::Completed));
        assert!(!a.table().contains(pid));
        assert!(matches!(
            a.is_suspended(pid),
            Err(SimError::Process(ProcessError::UnknownProcess(_)))
        ));

        let events = a.engine().events();
        assert!(matches!(events[0], KernelEvent::Suspended { pid: p, .. } if p == pid));
        assert!(matches!(
            &events[1],
            KernelEvent::Exited { pid: p, status: ExitStatus::Completed, .. } if *p == pid
        ));
    }

    #[test]
    fn body_sees_its_arguments_and_host() {
        let seen = trace();
        let s = Arc::clone(&seen);
        let registry = FunctionRegistry::new().with_fn("w", move |ctx: &mut ProcessContext| {
            s.lock().unwrap().push(format!("{}@{} {:?}", ctx.name(), ctx.host().name(), ctx.args()));
            ctx.show_args();
            Ok(())
        });
        let a = adapter(registry);
        let pid = a
            .create_pcb("w", "Fafard", vec!["4".into(), "10000".into(), "1000".into()], BTreeMap::new())
            .unwrap();
        a.schedule(pid).unwrap();
        assert_eq!(seen.lock().unwrap().clone(), vec![r#"w@Fafard ["4", "10000", "1000"]"#]);
    }

    #[test]
    fn unknown_function_leaves_table_unchanged() {
        let a = adapter(FunctionRegistry::new());
        let err = a.create_pcb("ghost", "Tremblay", vec![], BTreeMap::new()).unwrap_err();
        assert!(matches!(err, SimError::Process(ProcessError::UnknownFunction(_))));
        assert!(a.table().is_empty());
        assert_eq!(a.table().next_id(), ProcessId::FIRST);
    }

    #[test]
    fn unknown_host_is_rejected() {
        let a = adapter(FunctionRegistry::new().with_fn("w", yielder(0)));
        assert!(matches!(
            a.create_pcb("w", "Nowhere", vec![], BTreeMap::new()),
            Err(SimError::Core(_))
        ));
        assert!(a.table().is_empty());
    }

    #[test]
    fn schedule_after_exit_is_a_contract_violation() {
        let a = adapter(FunctionRegistry::new().with_fn("w", yielder(0)));
        let pid = a.create_pcb("w", "Tremblay", vec![], BTreeMap::new()).unwrap();
        assert_eq!(a.schedule(pid).unwrap(), ScheduleOutcome::Terminated(ExitStatus::Completed));
        assert!(matches!(
            a.schedule(pid),
            Err(SimError::Process(ProcessError::SchedulingContract {
                id,
                state: ProcessState::Terminated,
                op: "schedule",
            })) if id == pid
        ));
        assert_eq!(a.engine().exits().len(), 1, "no second exit notification");
    }

    #[test]
    fn reset_to_invalid_id_is_refused() {
        let a = adapter(FunctionRegistry::new().with_fn("w", yielder(0)));
        assert!(matches!(
            a.kill_all(Some(ProcessId::INVALID)),
            Err(SimError::Process(ProcessError::Core(CoreError::InvalidId(_))))
        ));
        let pid = a.create_pcb("w", "Tremblay", vec![], BTreeMap::new()).unwrap();
        assert_eq!(pid, ProcessId::FIRST);
    }

    #[test]
    fn paused_process_cannot_be_scheduled_until_resumed() {
        let a = adapter(FunctionRegistry::new().with_fn("w", yielder(1)));
        let pid = a.create_pcb("w", "Tremblay", vec![], BTreeMap::new()).unwrap();
        a.schedule(pid).unwrap();

        a.pause(pid).unwrap();
        assert!(a.is_paused(pid).unwrap());
        // Pausing does not move the process in the handshake.
        assert!(a.is_suspended(pid).unwrap());
        assert!(matches!(
            a.schedule(pid),
            Err(SimError::Process(ProcessError::SchedulingContract { .. }))
        ));

        a.resume(pid).unwrap();
        assert!(!a.is_paused(pid).unwrap());
        assert_eq!(a.schedule(pid).unwrap(), ScheduleOutcome::Terminated(ExitStatus::Completed));
        assert!(matches!(
            a.pause(pid),
            Err(SimError::Process(ProcessError::SchedulingContract { state: ProcessState::Terminated, .. }))
        ));
    }

    #[test]
    fn killing_a_paused_process_still_terminates_it() {
        let a = adapter(FunctionRegistry::new().with_fn("w", yielder(10)));
        let one = a.create_pcb("w", "Tremblay", vec![], BTreeMap::new()).unwrap();
        let two = a.create_pcb("w", "Jupiter", vec![], BTreeMap::new()).unwrap();
        a.schedule(one).unwrap();
        a.pause(one).unwrap();
        a.pause(two).unwrap();

        a.kill(one).unwrap();
        assert_eq!(a.schedule(one).unwrap(), ScheduleOutcome::Terminated(ExitStatus::Killed));
        a.kill_all(None).unwrap();
        assert!(a.table().is_empty());
        assert_eq!(a.engine().exits().len(), 2);
    }

    #[test]
    fn schedule_unknown_pid_fails() {
        let a = adapter(FunctionRegistry::new());
        assert!(matches!(
            a.schedule(ProcessId(42)),
            Err(SimError::Process(ProcessError::UnknownProcess(ProcessId(42))))
        ));
    }

    #[test]
    fn failing_body_is_contained() {
        let registry = FunctionRegistry::new()
            .with_fn("bad", |_ctx: &mut ProcessContext| Err(BodyError::msg("boom")))
            .with_fn("good", yielder(0));
        let a = adapter(registry);
        let bad = a.create_pcb("bad", "Tremblay", vec![], BTreeMap::new()).unwrap();
        let good = a.create_pcb("good", "Tremblay", vec![], BTreeMap::new()).unwrap();

        let outcome = a.schedule(bad).unwrap();
        assert_eq!(outcome, ScheduleOutcome::Terminated(ExitStatus::Failed("boom".into())));
        assert_eq!(a.schedule(good).unwrap(), ScheduleOutcome::Terminated(ExitStatus::Completed));

        let exits = a.engine().exits();
        assert!(exits[0].1.is_failure());
        assert!(!exits[1].1.is_failure());
    }

    #[test]
    fn deployed_process_is_admitted_later() {
        let a = adapter(FunctionRegistry::new().with_fn("w", yielder(0)));
        let pcb = {
            let mut d = a.deployment();
            d.begin_process("Tremblay", "w").unwrap();
            d.end_process().unwrap()
        };
        assert!(matches!(
            a.schedule(pcb.id()),
            Err(SimError::Process(ProcessError::SchedulingContract { .. }))
        ));
        assert_eq!(a.admit_all().unwrap(), 1);
        assert_eq!(a.schedule(pcb.id()).unwrap(), ScheduleOutcome::Terminated(ExitStatus::Completed));
    }

    #[test]
    fn kill_takes_effect_on_next_schedule() {
        let a = adapter(FunctionRegistry::new().with_fn("w", yielder(10)));
        let pid = a.create_pcb("w", "Tremblay", vec![], BTreeMap::new()).unwrap();
        a.schedule(pid).unwrap();
        a.kill(pid).unwrap();
        assert_eq!(a.schedule(pid).unwrap(), ScheduleOutcome::Terminated(ExitStatus::Killed));
    }

    #[test]
    fn kill_all_terminates_everything_and_resets_ids() {
        let a = adapter(FunctionRegistry::new().with_fn("w", yielder(10)));
        let started = a.create_pcb("w", "Tremblay", vec![], BTreeMap::new()).unwrap();
        a.create_pcb("w", "Jupiter", vec![], BTreeMap::new()).unwrap();
        a.schedule(started).unwrap();

        let next = a.kill_all(Some(ProcessId(10))).unwrap();
        assert_eq!(next, ProcessId(10));
        assert!(a.table().is_empty());
        let exits = a.engine().exits();
        assert_eq!(exits.len(), 2);
        assert!(exits.iter().all(|(_, s)| *s == ExitStatus::Killed));

        assert!(a.kill_all(Some(ProcessId(1))).is_err(), "ids may not move backwards");
        let pid = a.create_pcb("w", "Tremblay", vec![], BTreeMap::new()).unwrap();
        assert_eq!(pid, ProcessId(10));
    }

    #[test]
    fn drop_tears_down_parked_bodies() {
        let a = adapter(FunctionRegistry::new().with_fn("w", yielder(10)));
        let pid = a.create_pcb("w", "Tremblay", vec![], BTreeMap::new()).unwrap();
        a.create_pcb("w", "Tremblay", vec![], BTreeMap::new()).unwrap();
        a.schedule(pid).unwrap();
        // Joins both body tasks; would hang if either stayed parked.
        drop(a);
    }
}

// ── Simulation run loop ───────────────────────────────────────────────────────

#[cfg(test)]
mod run_tests {
    use super::*;

    #[test]
    fn runs_until_every_process_exits() {
        let registry = FunctionRegistry::new().with_fn("w", yielder(2));
        let mut events = deploy("Tremblay", "w", &[]);
        events.extend(deploy("Jupiter", "w", &[]));
        let mut sim = SimulationBuilder::new(config(1.0), kernel(), registry)
            .events(events)
            .build()
            .unwrap();

        let summary = sim.run(&mut NoopObserver).unwrap();
        assert_eq!(summary.rounds, 3);
        assert_eq!(summary.episodes, 6);
        assert_eq!(summary.completed, 2);
        assert_eq!(summary.remaining, 0);
        assert_eq!(summary.final_clock, SimTime(3.0));
    }

    #[test]
    fn rounds_schedule_in_ascending_id_order() {
        let order = trace();
        let o = Arc::clone(&order);
        let registry = FunctionRegistry::new().with_fn("w", move |ctx: &mut ProcessContext| {
            for _ in 0..2 {
                o.lock().unwrap().push(ctx.pid().to_string());
                ctx.unschedule()?;
            }
            Ok(())
        });
        let mut events = Vec::new();
        for host in ["Fafard", "Tremblay", "Jupiter"] {
            events.extend(deploy(host, "w", &[]));
        }
        let mut sim = SimulationBuilder::new(config(1.0), kernel(), registry)
            .events(events)
            .build()
            .unwrap();
        sim.run(&mut NoopObserver).unwrap();

        let ids = ["ProcessId(1)", "ProcessId(2)", "ProcessId(3)"];
        let expected: Vec<String> = ids.iter().chain(ids.iter()).map(|s| s.to_string()).collect();
        assert_eq!(order.lock().unwrap().clone(), expected);
    }

    #[test]
    fn failed_body_does_not_stop_the_run() {
        let registry = FunctionRegistry::new()
            .with_fn("bad", |ctx: &mut ProcessContext| {
                ctx.unschedule()?;
                panic!("bad worker");
            })
            .with_fn("good", yielder(3));
        let mut events = deploy("Tremblay", "bad", &[]);
        events.extend(deploy("Jupiter", "good", &[]));
        let mut sim = SimulationBuilder::new(config(1.0), kernel(), registry)
            .events(events)
            .build()
            .unwrap();

        let summary = sim.run(&mut NoopObserver).unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.completed, 1);
        assert!(matches!(sim.kernel().exits()[0].1, ExitStatus::Panicked(_)));
    }

    #[test]
    fn sleeping_process_wakes_on_time() {
        let woke = Arc::new(Mutex::new(None));
        let w = Arc::clone(&woke);
        let registry = FunctionRegistry::new().with_fn("sleeper", move |ctx: &mut ProcessContext| {
            ctx.wait_for(10.0)?;
            *w.lock().unwrap() = Some(ctx.now());
            Ok(())
        });
        let mut sim = SimulationBuilder::new(config(1.0), kernel(), registry)
            .events(deploy("Tremblay", "sleeper", &[]))
            .build()
            .unwrap();

        let summary = sim.run(&mut NoopObserver).unwrap();
        assert_eq!(summary.completed, 1);
        assert_eq!(*woke.lock().unwrap(), Some(SimTime(10.0)));
        // Round 0 parks it, round 1 is idle and jumps the clock, round 2 wakes it.
        assert_eq!(summary.rounds, 3);
    }

    #[test]
    fn time_budget_stops_the_run() {
        let registry = FunctionRegistry::new().with_fn("forever", |ctx: &mut ProcessContext| loop {
            ctx.unschedule()?;
        });
        let cfg = RunConfig { time_budget: Some(5.0), round_duration: 1.0, max_rounds: None };
        let mut sim = SimulationBuilder::new(cfg, kernel(), registry)
            .events(deploy("Tremblay", "forever", &[]))
            .build()
            .unwrap();

        let summary = sim.run(&mut NoopObserver).unwrap();
        assert_eq!(summary.rounds, 5);
        assert_eq!(summary.remaining, 1);
        assert_eq!(summary.final_clock, SimTime(5.0));
    }

    #[test]
    fn round_cap_stops_the_run() {
        let registry = FunctionRegistry::new().with_fn("w", yielder(100));
        let cfg = RunConfig { max_rounds: Some(4), ..config(0.5) };
        let mut sim = SimulationBuilder::new(cfg, kernel(), registry)
            .events(deploy("Tremblay", "w", &[]))
            .build()
            .unwrap();
        let summary = sim.run(&mut NoopObserver).unwrap();
        assert_eq!(summary.rounds, 4);
        assert_eq!(summary.remaining, 1);
    }

    #[test]
    fn run_rounds_steps_incrementally() {
        let registry = FunctionRegistry::new().with_fn("w", yielder(5));
        let mut sim = SimulationBuilder::new(config(1.0), kernel(), registry)
            .events(deploy("Tremblay", "w", &[]))
            .build()
            .unwrap();
        sim.run_rounds(2, &mut NoopObserver).unwrap();
        assert_eq!(sim.round(), 2);
        assert_eq!(sim.now(), SimTime(2.0));
        assert!(sim.adapter().is_suspended(ProcessId(1)).unwrap());
    }

    #[test]
    fn paused_process_sits_out_rounds() {
        let order = trace();
        let o = Arc::clone(&order);
        let registry = FunctionRegistry::new().with_fn("w", move |ctx: &mut ProcessContext| {
            for _ in 0..3 {
                o.lock().unwrap().push(format!("{}@{}", ctx.pid().get(), ctx.now().as_secs()));
                ctx.unschedule()?;
            }
            Ok(())
        });
        let mut events = deploy("Tremblay", "w", &[]);
        events.extend(deploy("Jupiter", "w", &[]));
        let mut sim = SimulationBuilder::new(config(1.0), kernel(), registry)
            .events(events)
            .build()
            .unwrap();

        sim.adapter().pause(ProcessId(2)).unwrap();
        sim.run_rounds(2, &mut NoopObserver).unwrap();
        sim.adapter().resume(ProcessId(2)).unwrap();
        let summary = sim.run(&mut NoopObserver).unwrap();

        assert_eq!(summary.completed, 2);
        let seen = order.lock().unwrap().clone();
        assert_eq!(&seen[..2], ["1@0", "1@1"]);
        assert_eq!(seen[2..].iter().filter(|s| s.starts_with("2@")).count(), 3);
        assert!(seen.contains(&"2@2".to_string()));
    }

    #[test]
    fn run_stops_when_everything_left_is_paused() {
        let registry = FunctionRegistry::new().with_fn("w", yielder(5));
        let mut sim = SimulationBuilder::new(config(1.0), kernel(), registry)
            .events(deploy("Tremblay", "w", &[]))
            .build()
            .unwrap();
        sim.adapter().pause(ProcessId(1)).unwrap();
        let summary = sim.run(&mut NoopObserver).unwrap();
        assert_eq!(summary.episodes, 0);
        assert_eq!(summary.remaining, 1);
    }

    /// Observer that counts callbacks.
    #[derive(Default)]
    struct Counter {
        starts:    usize,
        ends:      usize,
        yields:    usize,
        exits:     usize,
        finished:  bool,
    }

    impl SimObserver for Counter {
        fn on_round_start(&mut self, _r: u64, _t: SimTime) { self.starts += 1; }
        fn on_round_end(&mut self, _r: u64, _t: SimTime, _n: usize) { self.ends += 1; }
        fn on_scheduled(&mut self, _pid: ProcessId, outcome: &ScheduleOutcome) {
            match outcome {
                ScheduleOutcome::Yielded => self.yields += 1,
                ScheduleOutcome::Terminated(_) => self.exits += 1,
            }
        }
        fn on_sim_end(&mut self, _s: &crate::RunSummary) { self.finished = true; }
    }

    #[test]
    fn observer_called_correct_number_of_times() {
        let registry = FunctionRegistry::new().with_fn("w", yielder(2));
        let mut sim = SimulationBuilder::new(config(1.0), kernel(), registry)
            .events(deploy("Tremblay", "w", &[]))
            .build()
            .unwrap();
        let mut obs = Counter::default();
        sim.run(&mut obs).unwrap();
        assert_eq!(obs.starts, 3);
        assert_eq!(obs.ends, 3);
        assert_eq!(obs.yields, 2);
        assert_eq!(obs.exits, 1);
        assert!(obs.finished);
    }
}

// ── SimulationBuilder validation ──────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn builds_with_no_processes() {
        let mut sim = SimulationBuilder::new(RunConfig::default(), kernel(), FunctionRegistry::new())
            .build()
            .unwrap();
        let summary = sim.run(&mut NoopObserver).unwrap();
        assert_eq!(summary.rounds, 0);
    }

    #[test]
    fn invalid_config_errors() {
        let result = SimulationBuilder::new(config(-1.0), kernel(), FunctionRegistry::new()).build();
        assert!(matches!(result, Err(SimError::Core(_))));
    }

    #[test]
    fn unregistered_function_errors_before_run() {
        let result = SimulationBuilder::new(RunConfig::default(), kernel(), FunctionRegistry::new())
            .events(deploy("Tremblay", "ghost", &[]))
            .build();
        assert!(matches!(
            result,
            Err(SimError::Process(ProcessError::UnknownFunction(name))) if name == "ghost"
        ));
    }

    #[test]
    fn csv_deployment_is_loaded() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "event,host,function,key,value").unwrap();
        writeln!(file, "begin,Tremblay,w,,").unwrap();
        writeln!(file, "arg,,,,42").unwrap();
        writeln!(file, "end,,,,").unwrap();
        writeln!(file, "begin,Jupiter,w,,").unwrap();
        writeln!(file, "end,,,,").unwrap();
        file.flush().unwrap();

        let sim = SimulationBuilder::new(RunConfig::default(), kernel(), FunctionRegistry::new().with_fn("w", yielder(0)))
            .deployment_csv(file.path())
            .build()
            .unwrap();
        let pcbs = sim.adapter().table().snapshot();
        assert_eq!(pcbs.len(), 2);
        assert_eq!(pcbs[0].args(), ["42".to_string()]);
        assert_eq!(pcbs[1].host().name(), "Jupiter");
    }

    #[test]
    fn malformed_events_error() {
        let result = SimulationBuilder::new(RunConfig::default(), kernel(), FunctionRegistry::new())
            .events(vec![DeploymentEvent::EndProcess])
            .build();
        assert!(matches!(result, Err(SimError::Deploy(_))));
    }

    #[test]
    fn unterminated_events_error() {
        let result = SimulationBuilder::new(RunConfig::default(), kernel(), FunctionRegistry::new())
            .events(vec![DeploymentEvent::begin("Tremblay", "w")])
            .build();
        assert!(matches!(result, Err(SimError::Deploy(_))));
    }
}
