#![deny(missing_docs)]
#![doc = "Core types, configuration and errors shared by the FoodOn population crates."]

pub mod config;
pub mod errors;
pub mod ontology;

pub use config::{render_float, ConfigParser};
pub use errors::{ErrorInfo, PopulateError};
pub use ontology::{ClassData, ClassesDict, OntologyParser, SkeletonAndCandidates};
