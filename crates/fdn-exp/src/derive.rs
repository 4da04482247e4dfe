use fdn_core::{ConfigParser, PopulateError};

use crate::grid::{GridPoint, ALPHA_KEY, NUM_MAPPING_KEY};
use crate::template::derive_path;

/// Scoring key naming the pairs output template.
pub const PAIRS_FILEPATH_KEY: &str = "pairs_filepath";
/// Scoring key naming the populated ontology output template.
pub const POPULATED_FILEPATH_KEY: &str = "populated_filepath";
/// Scoring key naming the initial sibling scores source.
pub const INITIAL_SIBLINGS_KEY: &str = "initial_siblings_scores";
/// Scoring key naming the initial parent scores source.
pub const INITIAL_PARENTS_KEY: &str = "initial_parents_scores";

/// Derives the scoring configuration for a single grid point.
///
/// The result copies `base` and overwrites both hyperparameters and both
/// output templates; the initial score references are carried over
/// explicitly and must be present. `base` is never modified.
pub fn derive_scoring_config(
    base: &ConfigParser,
    point: &GridPoint,
) -> Result<ConfigParser, PopulateError> {
    let params = point.params();
    let siblings = base.getstr(INITIAL_SIBLINGS_KEY)?;
    let parents = base.getstr(INITIAL_PARENTS_KEY)?;
    let pairs = derive_path(base.getstr(PAIRS_FILEPATH_KEY)?, &params);
    let populated = derive_path(base.getstr(POPULATED_FILEPATH_KEY)?, &params);
    let [(_, alpha), (_, num_mapping)] = params;

    Ok(base.with_overrides([
        (ALPHA_KEY, alpha),
        (NUM_MAPPING_KEY, num_mapping),
        (INITIAL_SIBLINGS_KEY, siblings),
        (INITIAL_PARENTS_KEY, parents),
        (PAIRS_FILEPATH_KEY, pairs.to_string_lossy().into_owned()),
        (POPULATED_FILEPATH_KEY, populated.to_string_lossy().into_owned()),
    ]))
}
