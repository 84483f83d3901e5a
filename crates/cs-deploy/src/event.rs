//! The deployment event stream.

use std::fmt;

/// One event from a deployment descriptor, in document order.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum DeploymentEvent {
    BeginProcess { host: String, function: String },
    Property { key: String, value: String },
    ProcessArg(String),
    EndProcess,
}

impl DeploymentEvent {
    pub fn begin(host: impl Into<String>, function: impl Into<String>) -> Self {
        DeploymentEvent::BeginProcess { host: host.into(), function: function.into() }
    }

    pub fn property(key: impl Into<String>, value: impl Into<String>) -> Self {
        DeploymentEvent::Property { key: key.into(), value: value.into() }
    }

    pub fn arg(value: impl Into<String>) -> Self {
        DeploymentEvent::ProcessArg(value.into())
    }
}

impl fmt::Display for DeploymentEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentEvent::BeginProcess { host, function } => write!(f, "begin {function}@{host}"),
            DeploymentEvent::Property { key, value }         => write!(f, "property {key}={value}"),
            DeploymentEvent::ProcessArg(value)               => write!(f, "arg {value}"),
            DeploymentEvent::EndProcess                      => write!(f, "end"),
        }
    }
}
