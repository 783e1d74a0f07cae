//! Selection, validation & ordering of steps by their tags and dependencies

use std::collections::{BTreeSet, HashSet};

use deploy_common::errors::SchedulerError;

use crate::step::StepDescriptor;

/// The execution order of the selected steps, as indices in registration order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Plan {
    /// The steps of the main pass
    pub main: Vec<usize>,
    /// The steps deferred to the end pass
    pub end: Vec<usize>,
}

impl Plan {
    /// All planned steps, main pass first
    pub fn ordered(&self) -> impl Iterator<Item = usize> + '_ {
        self.main.iter().chain(self.end.iter()).copied()
    }
}

/// Plan the execution of the steps selected by `tags`, or of every step if
/// `tags` is empty
pub(crate) fn plan(steps: &[StepDescriptor], tags: &[String]) -> Result<Plan, SchedulerError> {
    check_unique(steps)?;
    let deps = resolve_dependencies(steps)?;
    let selected = select(steps, &deps, tags)?;

    // A main-pass step's dependency must be provided by some main-pass step
    for &i in selected.iter().filter(|&&i| !steps[i].run_at_end) {
        for tag in &steps[i].dependencies {
            let tag_providers = providers(steps, tag).filter(|&j| j != i).collect::<Vec<_>>();
            if tag_providers.iter().all(|&j| steps[j].run_at_end) {
                return Err(SchedulerError::DeferredDependency {
                    step: steps[i].name.clone(),
                    dependency: steps[tag_providers[0]].name.clone(),
                });
            }
        }
    }

    let (end, main): (BTreeSet<usize>, BTreeSet<usize>) =
        selected.into_iter().partition(|&i| steps[i].run_at_end);

    Ok(Plan { main: sort(steps, &deps, &main)?, end: sort(steps, &deps, &end)? })
}

/// Check that no two steps share a name
fn check_unique(steps: &[StepDescriptor]) -> Result<(), SchedulerError> {
    let mut seen = HashSet::new();
    for step in steps {
        if !seen.insert(step.name.as_str()) {
            return Err(SchedulerError::DuplicateStep(step.name.clone()));
        }
    }

    Ok(())
}

/// For each step, the steps it depends on: every other step advertising one
/// of its dependency tags
fn resolve_dependencies(steps: &[StepDescriptor]) -> Result<Vec<BTreeSet<usize>>, SchedulerError> {
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            let mut deps = BTreeSet::new();
            for tag in &step.dependencies {
                let providers = providers(steps, tag).filter(|&j| j != i).collect::<Vec<_>>();
                if providers.is_empty() {
                    return Err(SchedulerError::UnresolvedDependency {
                        step: step.name.clone(),
                        tag: tag.clone(),
                    });
                }

                deps.extend(providers);
            }

            Ok(deps)
        })
        .collect()
}

/// The steps advertising the given tag
fn providers<'a>(steps: &'a [StepDescriptor], tag: &'a str) -> impl Iterator<Item = usize> + 'a {
    steps.iter().enumerate().filter(move |(_, s)| s.provides(tag)).map(|(i, _)| i)
}

/// The steps advertising a requested tag, closed over their dependencies
fn select(
    steps: &[StepDescriptor],
    deps: &[BTreeSet<usize>],
    tags: &[String],
) -> Result<BTreeSet<usize>, SchedulerError> {
    if tags.is_empty() {
        return Ok((0..steps.len()).collect());
    }

    let mut frontier = Vec::new();
    for tag in tags {
        let len = frontier.len();
        frontier.extend(providers(steps, tag));
        if frontier.len() == len {
            return Err(SchedulerError::UnknownTag(tag.clone()));
        }
    }

    let mut selected = BTreeSet::new();
    while let Some(i) = frontier.pop() {
        if selected.insert(i) {
            frontier.extend(deps[i].iter().copied());
        }
    }

    Ok(selected)
}

/// Topologically sort a pass with Kahn's algorithm, always taking the
/// earliest-registered ready step. Dependencies outside the pass are ignored.
fn sort(
    steps: &[StepDescriptor],
    deps: &[BTreeSet<usize>],
    pass: &BTreeSet<usize>,
) -> Result<Vec<usize>, SchedulerError> {
    let pass_deps = |i: usize| deps[i].iter().copied().filter(|j| pass.contains(j));

    let mut remaining: Vec<usize> = vec![0; steps.len()];
    for &i in pass {
        remaining[i] = pass_deps(i).count();
    }

    let mut ready: BTreeSet<usize> = pass.iter().copied().filter(|&i| remaining[i] == 0).collect();
    let mut order = Vec::with_capacity(pass.len());
    while let Some(i) = ready.pop_first() {
        order.push(i);
        for &dependent in pass.iter().filter(|&&d| deps[d].contains(&i)) {
            remaining[dependent] -= 1;
            if remaining[dependent] == 0 {
                ready.insert(dependent);
            }
        }
    }

    if order.len() < pass.len() {
        let blocked: BTreeSet<usize> =
            pass.iter().copied().filter(|&i| remaining[i] > 0).collect();
        return Err(find_cycle(steps, deps, &blocked));
    }

    Ok(order)
}

/// Extract a cycle from the steps Kahn's algorithm could not order. Each of
/// them has at least one unordered dependency, so following those from any
/// of them must revisit a step.
fn find_cycle(
    steps: &[StepDescriptor],
    deps: &[BTreeSet<usize>],
    blocked: &BTreeSet<usize>,
) -> SchedulerError {
    let mut path: Vec<usize> = Vec::new();
    let mut current = blocked.first().copied();

    while let Some(i) = current {
        if let Some(start) = path.iter().position(|&p| p == i) {
            let cycle = path[start..]
                .iter()
                .chain(std::iter::once(&i))
                .map(|&j| steps[j].name.clone())
                .collect();
            return SchedulerError::CyclicDependency { cycle };
        }

        path.push(i);
        current = deps[i].iter().copied().find(|j| blocked.contains(j));
    }

    SchedulerError::CyclicDependency {
        cycle: path.into_iter().map(|j| steps[j].name.clone()).collect(),
    }
}
