//! Ontology data shared by every run of a population sweep.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::PopulateError;

/// Data attached to a single ontology class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ClassData {
    /// Human readable label of the class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Identifiers of the direct parent classes.
    #[serde(default)]
    pub parents: Vec<String>,
    /// Entities currently assigned to the class.
    #[serde(default)]
    pub entities: Vec<String>,
}

/// Mapping from class identifier to class data, ordered by identifier.
pub type ClassesDict = BTreeMap<String, ClassData>;

/// Seeded skeleton hierarchy plus the pool of entities still to place.
///
/// Produced once per process and lent immutably to every run. A runner that
/// needs to mutate either part must work on its own copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SkeletonAndCandidates {
    skeleton: ClassesDict,
    candidates: Vec<String>,
}

impl SkeletonAndCandidates {
    /// Bundles a seeded skeleton with its candidate entities.
    pub fn new(skeleton: ClassesDict, candidates: Vec<String>) -> Self {
        Self {
            skeleton,
            candidates,
        }
    }

    /// The seeded class hierarchy.
    pub fn skeleton(&self) -> &ClassesDict {
        &self.skeleton
    }

    /// Entities eligible for placement into the skeleton.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }
}

/// Produces the skeleton and candidate set consumed by scoring runs.
pub trait OntologyParser {
    /// Returns every class that may receive candidate entities.
    fn get_candidate_classes(&self) -> Result<ClassesDict, PopulateError>;

    /// Seeds a skeleton from `classes` and returns it with the candidates.
    fn get_seeded_skeleton(
        &self,
        classes: &ClassesDict,
    ) -> Result<SkeletonAndCandidates, PopulateError>;
}
