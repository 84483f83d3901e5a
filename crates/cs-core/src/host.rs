//! Opaque reference to a host owned by the simulation engine.

use std::fmt;
use std::sync::Arc;

use crate::HostId;

/// A process's binding to the host it runs on.
///
/// The core never interprets a binding beyond its id and name; both are
/// resolved once by [`Engine::resolve_host`][crate::Engine::resolve_host] and
/// are immutable for the lifetime of the process.  Cloning is cheap.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct HostBinding {
    id:   HostId,
    name: Arc<str>,
}

impl HostBinding {
    pub fn new(id: HostId, name: impl Into<Arc<str>>) -> Self {
        Self { id, name: name.into() }
    }

    #[inline]
    pub fn id(&self) -> HostId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for HostBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.id.0)
    }
}
