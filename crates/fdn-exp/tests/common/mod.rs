#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use fdn_core::{
    ClassData, ClassesDict, ConfigParser, ErrorInfo, PopulateError, SkeletonAndCandidates,
};
use fdn_exp::{RunnerFactory, ScoreRunner};

pub const SCORING: &str = r#"
[scoring]
alpha = 0.8
num_mapping_per_iteration = 50
pairs_filepath = "./output/pairs.pkl"
populated_filepath = "./output/populated.pkl"
initial_siblings_scores = "./data/siblings_scores.pkl"
initial_parents_scores = "./data/parents_scores.pkl"
"#;

pub fn base_scoring() -> ConfigParser {
    ConfigParser::parse(SCORING).expect("scoring config")
}

pub fn inputs() -> SkeletonAndCandidates {
    let mut skeleton = ClassesDict::new();
    skeleton.insert(
        "FOODON_00001002".to_string(),
        ClassData {
            label: Some("plant food product".to_string()),
            parents: vec![],
            entities: vec!["apple".to_string()],
        },
    );
    SkeletonAndCandidates::new(skeleton, vec!["pear".to_string(), "plum".to_string()])
}

/// What a recorded runner saw when it was built.
#[derive(Debug, Clone)]
pub struct Dispatched {
    pub preprocess_config: String,
    pub scoring: ConfigParser,
    pub inputs_addr: usize,
}

/// Factory recording every build and run, optionally failing one run.
#[derive(Default)]
pub struct RecordingFactory {
    pub built: Vec<Dispatched>,
    pub executed: Rc<RefCell<Vec<usize>>>,
    pub fail_on: Option<usize>,
}

impl RecordingFactory {
    pub fn failing_on(index: usize) -> Self {
        Self {
            fail_on: Some(index),
            ..Self::default()
        }
    }
}

struct RecordingRunner {
    index: usize,
    fail: bool,
    executed: Rc<RefCell<Vec<usize>>>,
}

impl ScoreRunner for RecordingRunner {
    fn run_iteration(&mut self) -> Result<(), PopulateError> {
        self.executed.borrow_mut().push(self.index);
        if self.fail {
            return Err(PopulateError::Run(
                ErrorInfo::new("run-test-failure", "scorer failed")
                    .with_context("index", self.index.to_string()),
            ));
        }
        Ok(())
    }
}

impl RunnerFactory for RecordingFactory {
    fn build<'a>(
        &mut self,
        inputs: &'a SkeletonAndCandidates,
        preprocess_config: &str,
        scoring: ConfigParser,
    ) -> Result<Box<dyn ScoreRunner + 'a>, PopulateError> {
        self.built.push(Dispatched {
            preprocess_config: preprocess_config.to_string(),
            scoring,
            inputs_addr: inputs as *const SkeletonAndCandidates as usize,
        });
        let index = self.built.len();
        Ok(Box::new(RecordingRunner {
            index,
            fail: self.fail_on == Some(index),
            executed: Rc::clone(&self.executed),
        }))
    }
}
