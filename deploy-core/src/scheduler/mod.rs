//! The step scheduler: runs the registered deployment steps selected by tag,
//! in dependency order

mod graph;

use deploy_common::{errors::SchedulerError, types::PendingSignature};
use thiserror::Error;
use tracing::{info, info_span, Instrument};

use crate::{
    env::DeployEnv,
    step::{DeploymentStep, StepDescriptor},
};

/// The outcome of a single step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepStatus {
    /// The step ran to completion
    Executed,
    /// The step's skip predicate held
    Skipped,
    /// The step ran, but deferred the given number of transactions to
    /// non-local signers
    Deferred(usize),
}

/// A step's name along with its outcome
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepReport {
    /// The name of the step
    pub name: String,
    /// The outcome of the step
    pub status: StepStatus,
}

/// The result of a scheduler run
#[derive(Clone, Debug, Default)]
pub struct RunReport {
    /// The outcome of each step, in execution order
    pub steps: Vec<StepReport>,
    /// The transactions awaiting signature by non-local accounts
    pub pending: Vec<PendingSignature>,
}

impl RunReport {
    /// The outcome of the named step, if it was scheduled
    pub fn status(&self, step: &str) -> Option<StepStatus> {
        self.steps.iter().find(|s| s.name == step).map(|s| s.status)
    }

    /// The names of the steps in execution order
    pub fn order(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }
}

/// A run halted before completing, along with what it achieved up to then
#[derive(Debug, Error)]
#[error("deployment halted after {} step(s)", .report.steps.len())]
pub struct RunError {
    /// The outcome of the steps that completed, and the signatures deferred
    /// by every step that ran
    pub report: RunReport,
    /// The error that halted the run
    #[source]
    pub source: SchedulerError,
}

/// Runs registered deployment steps
#[derive(Default)]
pub struct Scheduler {
    /// The registered steps, in registration order
    steps: Vec<Box<dyn DeploymentStep>>,
}

impl Scheduler {
    /// Create a scheduler with no steps
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a step
    pub fn register<S: DeploymentStep + 'static>(&mut self, step: S) -> &mut Self {
        self.register_boxed(Box::new(step))
    }

    /// Register a boxed step
    pub fn register_boxed(&mut self, step: Box<dyn DeploymentStep>) -> &mut Self {
        self.steps.push(step);
        self
    }

    /// The descriptors of the registered steps, in registration order
    pub fn descriptors(&self) -> Vec<StepDescriptor> {
        self.steps.iter().map(|s| s.descriptor()).collect()
    }

    /// The steps that a run with the given tags would execute, in order
    pub fn plan(&self, tags: &[String]) -> Result<Vec<StepDescriptor>, SchedulerError> {
        let descriptors = self.descriptors();
        let plan = graph::plan(&descriptors, tags)?;
        Ok(plan.ordered().map(|i| descriptors[i].clone()).collect())
    }

    /// Run the steps selected by `tags`, or every step if `tags` is empty.
    ///
    /// The whole plan is validated before any step runs. The first step to
    /// fail halts the run; the returned error carries the report of the
    /// steps that ran before it, along with every signature deferred so far.
    pub async fn run(
        &self,
        tags: &[String],
        env: &mut DeployEnv<'_>,
    ) -> Result<RunReport, RunError> {
        let mut report = RunReport::default();
        let descriptors = self.descriptors();
        let plan = match graph::plan(&descriptors, tags) {
            Ok(plan) => plan,
            Err(source) => return Err(RunError { report, source }),
        };

        info!(
            network = %env.network().network_name,
            steps = plan.main.len() + plan.end.len(),
            deferred_to_end = plan.end.len(),
            "running deployment"
        );

        for i in plan.ordered() {
            let name = descriptors[i].name.as_str();
            let step = &self.steps[i];

            let span = info_span!("step", name);
            let status = async {
                env.begin_step(name);
                let skip =
                    step.skip(env).await.map_err(|e| SchedulerError::step_execution(name, e))?;
                if skip {
                    info!("skipped");
                    return Ok(StepStatus::Skipped);
                }

                step.run(env).await.map_err(|e| SchedulerError::step_execution(name, e))?;
                let status = match env.pending().len() {
                    0 => StepStatus::Executed,
                    n => StepStatus::Deferred(n),
                };

                info!(?status, "done");
                Ok::<_, SchedulerError>(status)
            }
            .instrument(span)
            .await;

            // Signatures deferred by a failing step are still owed
            report.pending.extend(env.take_pending());
            match status {
                Ok(status) => report.steps.push(StepReport { name: name.to_string(), status }),
                Err(source) => return Err(RunError { report, source }),
            }
        }

        Ok(report)
    }
}
