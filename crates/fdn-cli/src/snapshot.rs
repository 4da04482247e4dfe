//! Ontology adapter backed by the persisted output of an upstream parse.

use std::fs;
use std::path::{Path, PathBuf};

use fdn_core::{
    ClassesDict, ConfigParser, ErrorInfo, OntologyParser, PopulateError, SkeletonAndCandidates,
};
use log::info;
use serde::de::DeserializeOwned;

const CLASSES_KEY: &str = "candidate_classes_filepath";
const SKELETON_KEY: &str = "skeleton_filepath";
const CANDIDATES_KEY: &str = "candidate_entities_filepath";

/// Loads candidate classes, skeleton and candidate entities from JSON files
/// named in the ontology parse configuration.
#[derive(Debug, Clone)]
pub struct SnapshotOntology {
    classes_path: PathBuf,
    skeleton_path: PathBuf,
    candidates_path: PathBuf,
}

impl SnapshotOntology {
    pub fn from_config(config: &ConfigParser) -> Result<Self, PopulateError> {
        Ok(Self {
            classes_path: config.getstr(CLASSES_KEY)?.into(),
            skeleton_path: config.getstr(SKELETON_KEY)?.into(),
            candidates_path: config.getstr(CANDIDATES_KEY)?.into(),
        })
    }
}

impl OntologyParser for SnapshotOntology {
    fn get_candidate_classes(&self) -> Result<ClassesDict, PopulateError> {
        let classes: ClassesDict = read_json(&self.classes_path)?;
        info!("Loaded {} candidate classes", classes.len());
        Ok(classes)
    }

    fn get_seeded_skeleton(
        &self,
        classes: &ClassesDict,
    ) -> Result<SkeletonAndCandidates, PopulateError> {
        let skeleton: ClassesDict = read_json(&self.skeleton_path)?;
        if let Some(unknown) = skeleton.keys().find(|id| !classes.contains_key(*id)) {
            return Err(PopulateError::Ontology(
                ErrorInfo::new(
                    "skeleton-unknown-class",
                    "skeleton names a class that is not a candidate",
                )
                .with_context("class", unknown.as_str())
                .with_context("path", self.skeleton_path.display().to_string()),
            ));
        }
        let candidates: Vec<String> = read_json(&self.candidates_path)?;
        info!(
            "Seeded skeleton with {} classes and {} candidate entities",
            skeleton.len(),
            candidates.len()
        );
        Ok(SkeletonAndCandidates::new(skeleton, candidates))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PopulateError> {
    let bytes = fs::read(path).map_err(|err| {
        PopulateError::Ontology(
            ErrorInfo::new("ontology-read", "failed to read ontology snapshot")
                .with_context("path", path.display().to_string())
                .with_hint(err.to_string()),
        )
    })?;
    serde_json::from_slice(&bytes).map_err(|err| {
        PopulateError::Ontology(
            ErrorInfo::new("ontology-parse", "ontology snapshot is malformed")
                .with_context("path", path.display().to_string())
                .with_hint(err.to_string()),
        )
    })
}
