//! `cs-deploy` — turning a deployment description into processes.
//!
//! An external descriptor parser walks the deployment document and emits four
//! events in document order:
//!
//! ```text
//! begin_process(host, function)
//!   property(key, value)     *
//!   process_arg(value)       *
//! end_process()
//! ```
//!
//! [`DeploymentBuilder`] consumes that stream and allocates one PCB per
//! bracket in the process table.  It does not admit them: starting body tasks
//! is a separate step owned by the engine adapter.
//!
//! # Crate layout
//!
//! | Module      | Contents                                              |
//! |-------------|-------------------------------------------------------|
//! | [`event`]   | `DeploymentEvent`                                     |
//! | [`record`]  | `DeploymentRecord` — the bracket being accumulated    |
//! | [`builder`] | `DeploymentBuilder`                                   |
//! | [`loader`]  | `load_events_csv`, `load_events_reader`, `deploy_reader` |
//! | [`error`]   | `DeployError`, `DeployResult<T>`                      |

pub mod builder;
pub mod error;
pub mod event;
pub mod loader;
pub mod record;


pub use builder::DeploymentBuilder;
pub use error::{DeployError, DeployResult};
pub use event::DeploymentEvent;
pub use loader::{deploy_csv, deploy_reader, load_events_csv, load_events_reader};
pub use record::DeploymentRecord;
