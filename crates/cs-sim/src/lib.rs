//! `cs-sim` — the engine boundary and the round-based run loop.
//!
//! # Round loop
//!
//! ```text
//! until no process is left, the time budget is spent, or max_rounds:
//!   ① Round start — observer hook.
//!   ② Schedule    — for each live process in ascending ProcessId order
//!                   that is parked, not paused, and whose wake
//!                   deadline has passed:
//!                     EngineAdapter::schedule(pid)
//!                       Yielded        → kernel notified, process stays
//!                       Terminated(st) → kernel notified, task joined,
//!                                        process removed
//!   ③ Advance     — clock += round_duration (or jump to the next wake
//!                   deadline if nobody was runnable).
//! ```
//!
//! Exactly one `schedule` call is ever in flight, so exactly one process body
//! runs at a time even though every body has its own OS thread.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use cs_core::RunConfig;
//! use cs_deploy::DeploymentEvent;
//! use cs_process::FunctionRegistry;
//! use cs_sim::{LocalKernel, NoopObserver, SimulationBuilder};
//!
//! let registry = FunctionRegistry::new().with_fn("hello", |ctx| {
//!     ctx.show_args();
//!     Ok(())
//! });
//! let mut sim = SimulationBuilder::new(RunConfig::default(), LocalKernel::new(["Tremblay"]), registry)
//!     .events(vec![
//!         DeploymentEvent::begin("Tremblay", "hello"),
//!         DeploymentEvent::arg("world"),
//!         DeploymentEvent::EndProcess,
//!     ])
//!     .build()?;
//! let summary = sim.run(&mut NoopObserver)?;
//! ```

pub mod adapter;
pub mod builder;
pub mod error;
pub mod kernel;
pub mod observer;
pub mod sim;

#[cfg(test)]
mod tests;

pub use adapter::EngineAdapter;
pub use builder::SimulationBuilder;
pub use error::{SimError, SimResult};
pub use kernel::{KernelEvent, LocalKernel};
pub use observer::{NoopObserver, SimObserver};
pub use sim::{RunSummary, Simulation};
