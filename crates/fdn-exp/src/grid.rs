use fdn_core::{render_float, ConfigParser, ErrorInfo, PopulateError};
use serde::{Deserialize, Serialize};

use crate::template::encode_suffix;

/// Configuration key holding the candidate `alpha` values.
pub const ALPHA_KEY: &str = "alpha";
/// Configuration key holding the candidate mappings-per-iteration counts.
pub const NUM_MAPPING_KEY: &str = "num_mapping_per_iteration";

/// Typed hyperparameter lists swept by a grid search.
///
/// Both lists are non-empty. Duplicates are kept and yield repeated grid
/// points. Deserialized spaces go through [`HyperparameterSpace::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSpace")]
pub struct HyperparameterSpace {
    alpha: Vec<f64>,
    num_mapping: Vec<usize>,
}

#[derive(Deserialize)]
struct RawSpace {
    alpha: Vec<f64>,
    num_mapping: Vec<usize>,
}

impl TryFrom<RawSpace> for HyperparameterSpace {
    type Error = PopulateError;

    fn try_from(raw: RawSpace) -> Result<Self, Self::Error> {
        Self::new(raw.alpha, raw.num_mapping)
    }
}

impl HyperparameterSpace {
    /// Builds a space from already typed value lists.
    pub fn new(alpha: Vec<f64>, num_mapping: Vec<usize>) -> Result<Self, PopulateError> {
        if alpha.is_empty() {
            return Err(empty_list(ALPHA_KEY));
        }
        if num_mapping.is_empty() {
            return Err(empty_list(NUM_MAPPING_KEY));
        }
        Ok(Self { alpha, num_mapping })
    }

    /// Reads and parses both hyperparameter lists from `config`.
    pub fn from_config(config: &ConfigParser) -> Result<Self, PopulateError> {
        let alpha = parse_list(
            config,
            ALPHA_KEY,
            "float",
            "use decimal numbers such as 0.1",
            |raw| raw.parse::<f64>().ok(),
        )?;
        let num_mapping = parse_list(
            config,
            NUM_MAPPING_KEY,
            "non-negative integer",
            "only non-negative whole numbers are allowed",
            |raw| raw.parse::<usize>().ok(),
        )?;
        Self::new(alpha, num_mapping)
    }

    pub fn alpha(&self) -> &[f64] {
        &self.alpha
    }

    pub fn num_mapping(&self) -> &[usize] {
        &self.num_mapping
    }

    /// Number of grid points, the product of both list lengths.
    pub fn total_runs(&self) -> usize {
        self.alpha.len() * self.num_mapping.len()
    }

    /// Iterates over the grid in row-major order: `alpha` varies slowest.
    ///
    /// Each call starts a fresh pass over the grid.
    pub fn points(&self) -> GridPoints<'_> {
        GridPoints {
            space: self,
            cursor: 0,
        }
    }
}

/// One concrete `(alpha, num_mapping)` assignment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    pub alpha: f64,
    pub num_mapping: usize,
}

impl GridPoint {
    /// Ordered `(name, rendered value)` pairs used for path suffixes and
    /// configuration overrides.
    pub fn params(&self) -> [(&'static str, String); 2] {
        [
            ("alpha", render_float(self.alpha)),
            ("N", self.num_mapping.to_string()),
        ]
    }

    /// Path suffix encoding this point, e.g. `_alpha0.1_N10`.
    pub fn suffix(&self) -> String {
        encode_suffix(&self.params())
    }
}

/// Lazy iterator over the points of a [`HyperparameterSpace`].
#[derive(Debug, Clone)]
pub struct GridPoints<'a> {
    space: &'a HyperparameterSpace,
    cursor: usize,
}

impl Iterator for GridPoints<'_> {
    type Item = GridPoint;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.space.total_runs() {
            return None;
        }
        let inner = self.space.num_mapping.len();
        let point = GridPoint {
            alpha: self.space.alpha[self.cursor / inner],
            num_mapping: self.space.num_mapping[self.cursor % inner],
        };
        self.cursor += 1;
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.space.total_runs().saturating_sub(self.cursor);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for GridPoints<'_> {}

fn parse_list<T>(
    config: &ConfigParser,
    key: &str,
    expected: &str,
    hint: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Vec<T>, PopulateError> {
    config
        .get_str_list(key)?
        .iter()
        .map(|raw| {
            parse(raw).ok_or_else(|| {
                PopulateError::Config(
                    ErrorInfo::new(
                        "hyperparameter-parse",
                        format!("hyperparameter value is not a valid {expected}"),
                    )
                    .with_context("key", key)
                    .with_context("value", raw.as_str())
                    .with_hint(hint),
                )
            })
        })
        .collect()
}

fn empty_list(key: &str) -> PopulateError {
    PopulateError::Config(
        ErrorInfo::new(
            "hyperparameter-empty",
            "grid search needs at least one value per hyperparameter",
        )
        .with_context("key", key),
    )
}
