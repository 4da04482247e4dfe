//! Hyperparameter grid expansion and sequential run dispatch for FoodOn
//! population experiments.

mod derive;
mod dispatch;
mod grid;
mod hash;
mod serde;
mod template;

pub use derive::{
    derive_scoring_config, INITIAL_PARENTS_KEY, INITIAL_SIBLINGS_KEY, PAIRS_FILEPATH_KEY,
    POPULATED_FILEPATH_KEY,
};
pub use dispatch::{
    DispatchState, RunDispatcher, RunPlan, RunRecord, RunnerFactory, ScoreRunner, SweepReport,
    GRID_SEARCH_KEY,
};
pub use grid::{GridPoint, GridPoints, HyperparameterSpace, ALPHA_KEY, NUM_MAPPING_KEY};
pub use hash::stable_hash_string;
pub use template::{derive_path, encode_suffix};

pub use crate::serde::{from_json_slice, to_canonical_json_bytes};
