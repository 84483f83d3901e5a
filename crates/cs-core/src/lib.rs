//! `cs-core` — foundational types for the `coopsim` cooperative simulation
//! framework.
//!
//! This crate is a dependency of every other `cs-*` crate.  It intentionally
//! has no `cs-*` dependencies and minimal external ones (only `thiserror`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`ids`]     | `ProcessId`, `HostId`                                     |
//! | [`host`]    | `HostBinding` — opaque handle to an engine-side host      |
//! | [`time`]    | `SimTime`, `SimClock`, `RunConfig`                        |
//! | [`exit`]    | `ExitStatus` — how a simulated process ended              |
//! | [`engine`]  | `Engine` — outbound calls into the simulation kernel      |
//! | [`error`]   | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids, time, and config.   |

pub mod engine;
pub mod error;
pub mod exit;
pub mod host;
pub mod ids;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use engine::Engine;
pub use error::{CoreError, CoreResult};
pub use exit::ExitStatus;
pub use host::HostBinding;
pub use ids::{HostId, ProcessId};
pub use time::{RunConfig, SimClock, SimTime};
