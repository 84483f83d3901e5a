//! `DeploymentRecord` — what the builder has seen since the last
//! `begin_process`.

use std::collections::BTreeMap;

/// The process currently being described.  Lives from `begin_process` to
/// `end_process` and is discarded afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeploymentRecord {
    pub host_name:  String,
    pub function:   String,
    pub args:       Vec<String>,
    pub properties: BTreeMap<String, String>,
}

impl DeploymentRecord {
    pub fn new(host_name: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            host_name: host_name.into(),
            function:  function.into(),
            ..Self::default()
        }
    }
}
