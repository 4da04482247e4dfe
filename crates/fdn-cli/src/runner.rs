//! Score runner that hands each run to an external scoring command.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use fdn_core::{ClassesDict, ConfigParser, ErrorInfo, PopulateError, SkeletonAndCandidates};
use fdn_exp::{to_canonical_json_bytes, RunnerFactory, ScoreRunner, POPULATED_FILEPATH_KEY};
use log::{debug, info};
use serde::Serialize;

/// Scoring key holding the command line of the external scorer.
pub const SCORE_COMMAND_KEY: &str = "score_command";

/// Builds a [`CommandRunner`] per dispatched run.
#[derive(Debug, Default)]
pub struct CommandRunnerFactory;

impl RunnerFactory for CommandRunnerFactory {
    fn build<'a>(
        &mut self,
        inputs: &'a SkeletonAndCandidates,
        preprocess_config: &str,
        scoring: ConfigParser,
    ) -> Result<Box<dyn ScoreRunner + 'a>, PopulateError> {
        let command_line = scoring.getstr(SCORE_COMMAND_KEY)?;
        let mut words = command_line.split_whitespace().map(str::to_string);
        let program = words.next().ok_or_else(|| {
            PopulateError::Config(
                ErrorInfo::new("score-command-empty", "score command is empty")
                    .with_context("key", SCORE_COMMAND_KEY),
            )
        })?;
        let request_path = request_path(&scoring.getstr(POPULATED_FILEPATH_KEY)?);
        Ok(Box::new(CommandRunner {
            inputs,
            preprocess_config: preprocess_config.to_string(),
            scoring,
            program,
            args: words.collect(),
            request_path,
        }))
    }
}

/// Writes a run request next to the populated output and runs the scorer
/// with the request path as its final argument.
#[derive(Debug)]
pub struct CommandRunner<'a> {
    inputs: &'a SkeletonAndCandidates,
    preprocess_config: String,
    scoring: ConfigParser,
    program: String,
    args: Vec<String>,
    request_path: PathBuf,
}

#[derive(Serialize)]
struct RunRequest<'a> {
    preprocess_config: &'a str,
    scoring: BTreeMap<String, String>,
    skeleton: &'a ClassesDict,
    candidates: &'a [String],
}

impl CommandRunner<'_> {
    fn write_request(&self) -> Result<(), PopulateError> {
        let request = RunRequest {
            preprocess_config: &self.preprocess_config,
            scoring: self.scoring.to_string_map(),
            skeleton: self.inputs.skeleton(),
            candidates: self.inputs.candidates(),
        };
        let bytes = to_canonical_json_bytes(&request)?;
        if let Some(parent) = self.request_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|err| self.error("run-request-dir", err.to_string()))?;
        }
        fs::write(&self.request_path, bytes)
            .map_err(|err| self.error("run-request-write", err.to_string()))
    }

    fn error(&self, code: &str, hint: String) -> PopulateError {
        PopulateError::Run(
            ErrorInfo::new(code, "scoring run failed")
                .with_context("command", self.program.as_str())
                .with_context("request", self.request_path.display().to_string())
                .with_hint(hint),
        )
    }
}

impl ScoreRunner for CommandRunner<'_> {
    fn run_iteration(&mut self) -> Result<(), PopulateError> {
        self.write_request()?;
        debug!("wrote run request {}", self.request_path.display());
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(&self.request_path)
            .status()
            .map_err(|err| self.error("run-spawn", err.to_string()))?;
        if !status.success() {
            return Err(self.error("run-exit-status", format!("scorer exited with {status}")));
        }
        info!("Scoring run finished: {}", self.request_path.display());
        Ok(())
    }
}

/// Location of the request file for a populated output path.
pub fn request_path(populated_filepath: &str) -> PathBuf {
    Path::new(populated_filepath).with_extension("request.json")
}
