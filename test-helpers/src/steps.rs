//! Scriptable deployment steps that record when they run

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use deploy_common::errors::DeployError;
use deploy_core::{
    env::DeployEnv,
    step::{DeploymentStep, StepDescriptor},
};

/// A shared log of the steps that ran
#[derive(Clone, Debug, Default)]
pub struct StepLog(Arc<Mutex<Vec<String>>>);

impl StepLog {
    /// Record an entry
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().expect("step log poisoned").push(entry.into());
    }

    /// The recorded entries, in order
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().expect("step log poisoned").clone()
    }
}

/// A step that logs its name when it runs, and optionally skips or fails
pub struct TestStep {
    /// The step's descriptor
    descriptor: StepDescriptor,
    /// The log the step writes to
    log: StepLog,
    /// Whether the step's skip predicate holds
    skip: bool,
    /// Whether the step fails when run
    fail: bool,
}

impl TestStep {
    /// A step with the given descriptor, logging to `log`
    pub fn new(descriptor: StepDescriptor, log: &StepLog) -> Self {
        Self { descriptor, log: log.clone(), skip: false, fail: false }
    }

    /// Make the step's skip predicate hold
    pub fn skipping(mut self) -> Self {
        self.skip = true;
        self
    }

    /// Make the step fail when run
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl DeploymentStep for TestStep {
    fn descriptor(&self) -> StepDescriptor {
        self.descriptor.clone()
    }

    async fn skip(&self, _env: &DeployEnv<'_>) -> Result<bool, DeployError> {
        self.log.push(format!("skip?{}", self.descriptor.name));
        Ok(self.skip)
    }

    async fn run(&self, _env: &mut DeployEnv<'_>) -> Result<(), DeployError> {
        if self.fail {
            return Err(DeployError::Config(format!("{} failed", self.descriptor.name)));
        }

        self.log.push(self.descriptor.name.clone());
        Ok(())
    }
}
