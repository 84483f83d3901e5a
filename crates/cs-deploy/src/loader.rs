//! CSV deployment loader.
//!
//! # CSV format
//!
//! One row per deployment event, in document order.  Columns that do not
//! apply to an event are left empty.
//!
//! ```csv
//! event,host,function,key,value
//! begin,Tremblay,master,,
//! property,,,rank,0
//! arg,,,,20
//! arg,,,,50000
//! end,,,,
//! begin,Jupiter,worker,,
//! end,,,,
//! ```
//!
//! | `event`    | Required columns    |
//! |------------|---------------------|
//! | `begin`    | `host`, `function`  |
//! | `property` | `key`, `value`      |
//! | `arg`      | `value`             |
//! | `end`      | —                   |

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use cs_process::ProcessControlBlock;

use crate::{DeployError, DeployResult, DeploymentBuilder, DeploymentEvent};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct EventRecord {
    event:    String,
    host:     Option<String>,
    function: Option<String>,
    key:      Option<String>,
    value:    Option<String>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Read a deployment event stream from a CSV file.
pub fn load_events_csv(path: &Path) -> DeployResult<Vec<DeploymentEvent>> {
    let file = std::fs::File::open(path)?;
    load_events_reader(file)
}

/// Like [`load_events_csv`] but accepts any `Read` source.
pub fn load_events_reader<R: Read>(reader: R) -> DeployResult<Vec<DeploymentEvent>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers().map_err(parse_error)?.clone();
    let mut events = Vec::new();

    for result in csv_reader.records() {
        let record = result.map_err(parse_error)?;
        // Quoted fields may span lines, so ask the reader rather than count rows.
        let line = record.position().map_or(0, |p| p.line());
        let row: EventRecord = record
            .deserialize(Some(&headers))
            .map_err(|e| DeployError::Parse(format!("line {line}: {e}")))?;
        events.push(parse_event(row, line)?);
    }
    Ok(events)
}

/// Load a CSV deployment and build every process it describes.
pub fn deploy_csv(path: &Path, builder: DeploymentBuilder<'_>) -> DeployResult<Vec<Arc<ProcessControlBlock>>> {
    let file = std::fs::File::open(path)?;
    deploy_reader(file, builder)
}

/// Like [`deploy_csv`] but accepts any `Read` source.
///
/// The whole file is parsed before any process is built, so a parse error
/// leaves the process table untouched.  A bracketing error stops the load at
/// the offending event.
pub fn deploy_reader<R: Read>(
    reader: R,
    mut builder: DeploymentBuilder<'_>,
) -> DeployResult<Vec<Arc<ProcessControlBlock>>> {
    let events = load_events_reader(reader)?;
    let mut built = Vec::new();
    for event in &events {
        if let Some(pcb) = builder.apply(event)? {
            built.push(pcb);
        }
    }
    builder.finish()?;
    tracing::info!(processes = built.len(), "deployment loaded");
    Ok(built)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_error(e: csv::Error) -> DeployError {
    DeployError::Parse(e.to_string())
}

fn parse_event(row: EventRecord, line: u64) -> DeployResult<DeploymentEvent> {
    let need = |field: Option<String>, name: &str| {
        field.ok_or_else(|| {
            DeployError::Parse(format!("line {line}: {:?} event needs a {name} column", row.event))
        })
    };
    match row.event.trim() {
        "begin"    => Ok(DeploymentEvent::BeginProcess {
            host:     need(row.host.clone(), "host")?,
            function: need(row.function.clone(), "function")?,
        }),
        "property" => Ok(DeploymentEvent::Property {
            key:   need(row.key.clone(), "key")?,
            value: row.value.clone().unwrap_or_default(),
        }),
        "arg"      => Ok(DeploymentEvent::ProcessArg(row.value.clone().unwrap_or_default())),
        "end"      => Ok(DeploymentEvent::EndProcess),
        other      => Err(DeployError::Parse(format!(
            "line {line}: unknown event {other:?}: expected begin, property, arg, or end"
        ))),
    }
}
