//! master_worker — the classic master/worker deployment on the coopsim core.
//!
//! One master on `Tremblay` hands out compute tasks round-robin to three
//! workers.  Each worker "computes" by sleeping `flops / speed` simulated
//! seconds, where `speed` comes from its deployment properties.  Every body
//! runs on its own thread but only one of them is ever running.
//!
//! Set `RUST_LOG=debug` (or `trace`) to watch the individual rounds and
//! handshakes.

use std::collections::VecDeque;
use std::io::Cursor;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use parking_lot::Mutex;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use cs_core::{ExitStatus, ProcessId, RunConfig, SimTime};
use cs_deploy::load_events_reader;
use cs_process::{BodyError, FunctionRegistry, ProcessContext, ScheduleOutcome};
use cs_sim::{LocalKernel, RunSummary, SimObserver, SimulationBuilder};

// ── Constants ─────────────────────────────────────────────────────────────────

const HOSTS:          [&str; 4] = ["Tremblay", "Jupiter", "Fafard", "Ginette"];
const BANDWIDTH:      f64       = 1.25e8; // bytes per simulated second
const ROUND_DURATION: f64       = 0.01;
const TIME_BUDGET:    f64       = 3_600.0;

// ── Deployment CSV ────────────────────────────────────────────────────────────

// master args: task count, flops per task, bytes per task, worker count.
// worker args: mailbox index.
const DEPLOYMENT_CSV: &str = "\
event,host,function,key,value\n\
begin,Tremblay,master,,\n\
arg,,,,20\n\
arg,,,,50000000\n\
arg,,,,1000000\n\
arg,,,,3\n\
end,,,,\n\
begin,Jupiter,worker,,\n\
property,,,speed,76296000\n\
arg,,,,0\n\
end,,,,\n\
begin,Fafard,worker,,\n\
property,,,speed,76296000\n\
arg,,,,1\n\
end,,,,\n\
begin,Ginette,worker,,\n\
property,,,speed,48492000\n\
arg,,,,2\n\
end,,,,\n\
";

// ── Mailboxes ─────────────────────────────────────────────────────────────────

enum Message {
    Task { name: String, flops: f64 },
    Finalize,
}

/// One FIFO per worker, indexed by the worker's first argument.
#[derive(Clone, Default)]
struct Mailboxes(Arc<Mutex<Vec<VecDeque<Message>>>>);

impl Mailboxes {
    fn put(&self, index: usize, message: Message) {
        let mut boxes = self.0.lock();
        if boxes.len() <= index {
            boxes.resize_with(index + 1, VecDeque::new);
        }
        boxes[index].push_back(message);
    }

    fn take(&self, index: usize) -> Option<Message> {
        self.0.lock().get_mut(index).and_then(VecDeque::pop_front)
    }
}

fn arg<T: FromStr>(ctx: &ProcessContext, index: usize) -> Result<T, BodyError> {
    ctx.args()
        .get(index)
        .and_then(|a| a.parse().ok())
        .ok_or_else(|| BodyError::msg(format!("{}: bad or missing argument {index}", ctx.name())))
}

// ── Bodies ────────────────────────────────────────────────────────────────────

fn registry(mailboxes: &Mailboxes) -> FunctionRegistry {
    let outbox = mailboxes.clone();
    let master = move |ctx: &mut ProcessContext| {
        ctx.show_args();
        let tasks:   usize = arg(ctx, 0)?;
        let flops:   f64   = arg(ctx, 1)?;
        let bytes:   f64   = arg(ctx, 2)?;
        let workers: usize = arg(ctx, 3)?;
        if workers == 0 {
            return Err(BodyError::msg("master needs at least one worker"));
        }

        for i in 0..tasks {
            let name = format!("task_{i}");
            tracing::debug!(task = %name, worker = i % workers, now = %ctx.now(), "sending");
            outbox.put(i % workers, Message::Task { name, flops });
            ctx.wait_for(bytes / BANDWIDTH)?;
        }
        for w in 0..workers {
            outbox.put(w, Message::Finalize);
        }
        tracing::info!(tasks, "all tasks dispatched");
        Ok(())
    };

    let inbox = mailboxes.clone();
    let worker = move |ctx: &mut ProcessContext| {
        let index: usize = arg(ctx, 0)?;
        let speed: f64 = ctx
            .property("speed")
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| BodyError::msg("worker needs a numeric speed property"))?;

        let mut done = 0;
        loop {
            match inbox.take(index) {
                Some(Message::Task { name, flops }) => {
                    ctx.wait_for(flops / speed)?;
                    tracing::debug!(task = %name, host = ctx.host().name(), now = %ctx.now(), "computed");
                    done += 1;
                }
                Some(Message::Finalize) => break,
                None => ctx.unschedule()?,
            }
        }
        tracing::info!(host = ctx.host().name(), done, "worker finished");
        Ok(())
    };

    FunctionRegistry::new()
        .with_fn("master", master)
        .with_fn("worker", worker)
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct ExitTable {
    rows: Vec<(ProcessId, ExitStatus)>,
}

impl SimObserver for ExitTable {
    fn on_scheduled(&mut self, pid: ProcessId, outcome: &ScheduleOutcome) {
        if let ScheduleOutcome::Terminated(status) = outcome {
            self.rows.push((pid, status.clone()));
        }
    }

    fn on_sim_end(&mut self, summary: &RunSummary) {
        tracing::info!(rounds = summary.rounds, clock = %summary.final_clock, "run ended");
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    println!("=== master_worker — coopsim ===");
    println!("Hosts: {}", HOSTS.join(", "));
    println!();

    // 1. Deployment.
    let events = load_events_reader(Cursor::new(DEPLOYMENT_CSV))?;
    println!("Loaded {} deployment events", events.len());

    // 2. Bodies.
    let mailboxes = Mailboxes::default();
    let registry = registry(&mailboxes);
    println!("Registered functions: {}", registry.names().join(", "));

    // 3. Config.
    let config = RunConfig {
        time_budget:    Some(TIME_BUDGET),
        round_duration: ROUND_DURATION,
        max_rounds:     None,
    };

    // 4. Build and run.
    let mut sim = SimulationBuilder::new(config, LocalKernel::new(HOSTS), registry)
        .events(events)
        .build()?;

    let mut obs = ExitTable::default();
    let t0 = Instant::now();
    let summary = sim.run(&mut obs)?;
    let elapsed = t0.elapsed();

    // 5. Summary.
    println!();
    println!("Simulation complete in {:.3} s (wall)", elapsed.as_secs_f64());
    println!("  rounds      : {}", summary.rounds);
    println!("  sim clock   : {}", summary.final_clock);
    println!("  episodes    : {}", summary.episodes);
    println!(
        "  exits       : {} completed, {} failed, {} killed, {} still running",
        summary.completed, summary.failed, summary.killed, summary.remaining
    );
    println!();

    println!("{:<16} {:<12}", "Process", "Exit");
    println!("{}", "-".repeat(28));
    for (pid, status) in &obs.rows {
        println!("{:<16} {:<12}", pid.to_string(), status.to_string());
    }

    if summary.final_clock >= SimTime(TIME_BUDGET) {
        println!("(time budget reached)");
    }
    Ok(())
}
