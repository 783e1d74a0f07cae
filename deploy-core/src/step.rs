//! The definition of a deployment step

use async_trait::async_trait;
use deploy_common::errors::DeployError;

use crate::env::DeployEnv;

/// The static description of a step: its name, the tags it advertises, the
/// tags it depends on and whether it is deferred to the end of the pass
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepDescriptor {
    /// The unique name of the step
    pub name: String,
    /// The tags the step advertises
    pub tags: Vec<String>,
    /// The tags the step depends on
    pub dependencies: Vec<String>,
    /// Whether the step runs in the second pass, after every other step
    pub run_at_end: bool,
}

impl StepDescriptor {
    /// A step with the given name, advertising no tags
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), ..Default::default() }
    }

    /// Set the tags the step advertises
    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(ToString::to_string).collect();
        self
    }

    /// Set the tags the step depends on
    pub fn dependencies(mut self, dependencies: &[&str]) -> Self {
        self.dependencies = dependencies.iter().map(ToString::to_string).collect();
        self
    }

    /// Defer the step to the end of the pass
    pub fn run_at_end(mut self) -> Self {
        self.run_at_end = true;
        self
    }

    /// Whether the step advertises the given tag
    pub fn provides(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// A unit of deployment work, run by the scheduler
#[async_trait]
pub trait DeploymentStep: Send + Sync {
    /// The step's descriptor
    fn descriptor(&self) -> StepDescriptor;

    /// Whether the step should be skipped in this pass. Evaluated once per
    /// step per pass, immediately before the step would run.
    async fn skip(&self, _env: &DeployEnv<'_>) -> Result<bool, DeployError> {
        Ok(false)
    }

    /// Run the step
    async fn run(&self, env: &mut DeployEnv<'_>) -> Result<(), DeployError>;
}
