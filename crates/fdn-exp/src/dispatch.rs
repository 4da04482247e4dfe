use std::collections::BTreeMap;

use fdn_core::{ConfigParser, PopulateError, SkeletonAndCandidates};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};

use crate::derive::{derive_scoring_config, PAIRS_FILEPATH_KEY, POPULATED_FILEPATH_KEY};
use crate::grid::HyperparameterSpace;
use crate::hash::stable_hash_string;

/// Configuration flag selecting a grid search over a single run.
pub const GRID_SEARCH_KEY: &str = "grid_search";

/// A single population iteration over a fixed skeleton.
pub trait ScoreRunner {
    /// Performs the iteration, persisting its own artifacts.
    fn run_iteration(&mut self) -> Result<(), PopulateError>;
}

/// Builds a fresh [`ScoreRunner`] for each dispatched run.
pub trait RunnerFactory {
    /// Creates a runner that borrows the shared `inputs` for its lifetime.
    fn build<'a>(
        &mut self,
        inputs: &'a SkeletonAndCandidates,
        preprocess_config: &str,
        scoring: ConfigParser,
    ) -> Result<Box<dyn ScoreRunner + 'a>, PopulateError>;
}

/// What a dispatch executes: the base configuration once, or a full grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RunPlan {
    Single,
    Grid { space: HyperparameterSpace },
}

impl RunPlan {
    /// Reads `grid_search` and, when set, the hyperparameter lists.
    pub fn from_config(config: &ConfigParser) -> Result<Self, PopulateError> {
        if config.getbool(GRID_SEARCH_KEY)? {
            Ok(RunPlan::Grid {
                space: HyperparameterSpace::from_config(config)?,
            })
        } else {
            Ok(RunPlan::Single)
        }
    }

    pub fn total_runs(&self) -> usize {
        match self {
            RunPlan::Single => 1,
            RunPlan::Grid { space } => space.total_runs(),
        }
    }
}

/// Lifecycle of a [`RunDispatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchState {
    Idle,
    Dispatching,
    /// Run `index` (1-based) is executing.
    Running { index: usize },
    /// Run `index` (1-based) failed; later runs were not attempted.
    Failed { index: usize },
}

/// Summary of one completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub index: usize,
    pub params: BTreeMap<String, String>,
    pub pairs_filepath: Option<String>,
    pub populated_filepath: Option<String>,
}

/// Report returned once every run of a plan has completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub plan_hash: String,
    pub total_runs: usize,
    pub runs: Vec<RunRecord>,
}

/// Feeds the shared skeleton and candidates to one runner per planned run.
///
/// Runs execute sequentially in plan order. The first failure stops the
/// dispatch and is returned unchanged.
#[derive(Debug)]
pub struct RunDispatcher<'a> {
    inputs: &'a SkeletonAndCandidates,
    preprocess_config: String,
    base: &'a ConfigParser,
    state: DispatchState,
}

impl<'a> RunDispatcher<'a> {
    pub fn new(
        inputs: &'a SkeletonAndCandidates,
        preprocess_config: impl Into<String>,
        base: &'a ConfigParser,
    ) -> Self {
        Self {
            inputs,
            preprocess_config: preprocess_config.into(),
            base,
            state: DispatchState::Idle,
        }
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// Executes every run of `plan`, building each runner from `factory`.
    pub fn dispatch<F>(
        &mut self,
        plan: &RunPlan,
        factory: &mut F,
    ) -> Result<SweepReport, PopulateError>
    where
        F: RunnerFactory + ?Sized,
    {
        let plan_hash = stable_hash_string(&(plan, self.base))?;
        debug!("dispatching plan {plan_hash}");
        self.state = DispatchState::Dispatching;
        let runs = match plan {
            RunPlan::Single => self.run_single(factory)?,
            RunPlan::Grid { space } => self.run_grid(space, factory)?,
        };
        self.state = DispatchState::Idle;
        Ok(SweepReport {
            plan_hash,
            total_runs: plan.total_runs(),
            runs,
        })
    }

    fn run_single<F>(&mut self, factory: &mut F) -> Result<Vec<RunRecord>, PopulateError>
    where
        F: RunnerFactory + ?Sized,
    {
        info!("Running a single population iteration.");
        let record = run_record(1, BTreeMap::new(), self.base).map_err(|err| self.fail(1, err))?;
        let scoring = self.base.clone();
        self.execute(1, scoring, factory)?;
        Ok(vec![record])
    }

    fn run_grid<F>(
        &mut self,
        space: &HyperparameterSpace,
        factory: &mut F,
    ) -> Result<Vec<RunRecord>, PopulateError>
    where
        F: RunnerFactory + ?Sized,
    {
        info!("Performing grid search.");
        let total = space.total_runs();
        let mut runs = Vec::with_capacity(total);
        for (offset, point) in space.points().enumerate() {
            let index = offset + 1;
            info!(
                "Running grid search {}/{}: (alpha: {:.6}, N: {})",
                index, total, point.alpha, point.num_mapping
            );
            let scoring =
                derive_scoring_config(self.base, &point).map_err(|err| self.fail(index, err))?;
            let params = point
                .params()
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect();
            let record = run_record(index, params, &scoring).map_err(|err| self.fail(index, err))?;
            self.execute(index, scoring, factory)?;
            runs.push(record);
        }
        Ok(runs)
    }

    fn execute<F>(
        &mut self,
        index: usize,
        scoring: ConfigParser,
        factory: &mut F,
    ) -> Result<(), PopulateError>
    where
        F: RunnerFactory + ?Sized,
    {
        self.state = DispatchState::Running { index };
        let mut runner = factory
            .build(self.inputs, &self.preprocess_config, scoring)
            .map_err(|err| self.fail(index, err))?;
        runner.run_iteration().map_err(|err| self.fail(index, err))?;
        self.state = DispatchState::Dispatching;
        Ok(())
    }

    fn fail(&mut self, index: usize, err: PopulateError) -> PopulateError {
        error!("run {index} failed: {err}");
        self.state = DispatchState::Failed { index };
        err
    }
}

fn run_record(
    index: usize,
    params: BTreeMap<String, String>,
    scoring: &ConfigParser,
) -> Result<RunRecord, PopulateError> {
    Ok(RunRecord {
        index,
        params,
        pairs_filepath: scoring.get_opt_str(PAIRS_FILEPATH_KEY)?,
        populated_filepath: scoring.get_opt_str(POPULATED_FILEPATH_KEY)?,
    })
}
