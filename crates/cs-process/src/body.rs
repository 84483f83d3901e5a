//! The `ProcessBody` trait, which is the user code a simulated process runs, and the
//! registry that maps deployment function names to bodies.

use std::collections::HashMap;
use std::sync::Arc;

use crate::{BodyResult, ProcessContext, ProcessError, ProcessResult};

/// The main routine of a simulated process.
///
/// `main` runs on the process's own task, but only while the driver has
/// scheduled it.  The one place it may give control back is
/// [`ProcessContext::unschedule`] (or `wait_for`, which is built on it);
/// blocking on anything else stalls the whole simulation.
///
/// Returning `Err` or panicking ends the process with a failure status.  The
/// driver is never left waiting either way.
///
/// Closures `FnMut(&mut ProcessContext) -> BodyResult` implement this trait.
pub trait ProcessBody: Send + 'static {
    fn main(&mut self, ctx: &mut ProcessContext) -> BodyResult;
}

impl<F> ProcessBody for F
where
    F: FnMut(&mut ProcessContext) -> BodyResult + Send + 'static,
{
    fn main(&mut self, ctx: &mut ProcessContext) -> BodyResult {
        self(ctx)
    }
}

type Factory = Arc<dyn Fn() -> Box<dyn ProcessBody> + Send + Sync>;

/// Function name → body factory.
///
/// A deployment names the function each process runs; admission asks the
/// registry for a fresh body under the PCB's name.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Factory>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory that builds a new body for every process.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn ProcessBody> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(factory));
        self
    }

    /// Register a closure body.  Each process gets its own clone.
    pub fn register_fn<F>(&mut self, name: impl Into<String>, body: F) -> &mut Self
    where
        F: FnMut(&mut ProcessContext) -> BodyResult + Clone + Send + Sync + 'static,
    {
        self.register(name, move || Box::new(body.clone()) as Box<dyn ProcessBody>)
    }

    /// Builder-style [`register_fn`][Self::register_fn].
    pub fn with_fn<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: FnMut(&mut ProcessContext) -> BodyResult + Clone + Send + Sync + 'static,
    {
        self.register_fn(name, body);
        self
    }

    pub fn instantiate(&self, name: &str) -> ProcessResult<Box<dyn ProcessBody>> {
        self.functions
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| ProcessError::UnknownFunction(name.to_owned()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
