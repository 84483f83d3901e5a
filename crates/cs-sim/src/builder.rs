//! Fluent builder for constructing a [`Simulation`].

use std::path::PathBuf;
use std::sync::Arc;

use cs_core::RunConfig;
use cs_deploy::{DeploymentEvent, deploy_csv};
use cs_process::{FunctionRegistry, ProcessError};

use crate::{EngineAdapter, LocalKernel, SimResult, Simulation};

/// Fluent builder for [`Simulation`].
///
/// # Required inputs
///
/// - [`RunConfig`] — time budget, round length, round cap
/// - [`LocalKernel`] — hosts and the simulated clock
/// - [`FunctionRegistry`] — the bodies deployment function names refer to
///
/// # Optional inputs
///
/// | Method              | Default          |
/// |---------------------|------------------|
/// | `.events(v)`        | no processes     |
/// | `.deployment_csv(p)`| no processes     |
///
/// Both deployment sources may be given; events are applied first.
pub struct SimulationBuilder {
    config:   RunConfig,
    kernel:   LocalKernel,
    registry: FunctionRegistry,
    events:   Vec<DeploymentEvent>,
    csv:      Option<PathBuf>,
}

impl SimulationBuilder {
    pub fn new(config: RunConfig, kernel: LocalKernel, registry: FunctionRegistry) -> Self {
        Self {
            config,
            kernel,
            registry,
            events: Vec::new(),
            csv:    None,
        }
    }

    /// Deployment events to apply, in document order.
    pub fn events(mut self, events: Vec<DeploymentEvent>) -> Self {
        self.events.extend(events);
        self
    }

    /// A CSV deployment file (see `cs_deploy::loader`).
    pub fn deployment_csv(mut self, path: impl Into<PathBuf>) -> Self {
        self.csv = Some(path.into());
        self
    }

    /// Validate the config, build every deployed process, check each names a
    /// registered function, and admit them all.
    ///
    /// Function names are checked before any body task starts, so a typo in
    /// the deployment fails the build instead of the run.
    pub fn build(self) -> SimResult<Simulation> {
        self.config.validate()?;

        let kernel = Arc::new(self.kernel);
        let adapter = EngineAdapter::new(Arc::clone(&kernel), self.registry);

        let mut deployment = adapter.deployment();
        for event in &self.events {
            deployment.apply(event)?;
        }
        deployment.finish()?;
        if let Some(path) = &self.csv {
            deploy_csv(path, adapter.deployment())?;
        }

        for pcb in adapter.table().snapshot() {
            if !adapter.registry().contains(pcb.name()) {
                return Err(ProcessError::UnknownFunction(pcb.name().to_owned()).into());
            }
        }
        let admitted = adapter.admit_all()?;
        tracing::info!(processes = admitted, "simulation built");

        Ok(Simulation::new(self.config, kernel, adapter))
    }
}
