use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use fdn_core::{ConfigParser, ErrorInfo, OntologyParser, PopulateError};
use fdn_exp::{to_canonical_json_bytes, RunDispatcher, RunPlan, SweepReport};
use log::info;

mod logging;
mod runner;
mod snapshot;

use runner::CommandRunnerFactory;
use snapshot::SnapshotOntology;

const DEFAULT_CONFIG_FILE: &str = "./config/populate_foodon.ini";

#[derive(Parser, Debug)]
#[command(name = "populate-foodon", about = "Populate FoodOn.")]
struct Cli {
    /// Path to the .ini configuration file.
    #[arg(long = "config_file", default_value = DEFAULT_CONFIG_FILE)]
    config_file: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    run(&cli)?;
    Ok(())
}

fn run(cli: &Cli) -> Result<(), PopulateError> {
    let config = ConfigParser::from_path(&cli.config_file)?;
    logging::init(Path::new(&config.getstr("logfile")?))?;
    info!("Loaded configuration from {}", cli.config_file.display());

    let plan = RunPlan::from_config(&config)?;
    let scoring = ConfigParser::from_path(config.getstr("scoring_config")?)?;
    let preprocess_config = config.getstr("preprocess_config")?;

    let parse_config = ConfigParser::from_path(config.getstr("foodon_parse_config")?)?;
    let ontology = SnapshotOntology::from_config(&parse_config)?;
    let classes = ontology.get_candidate_classes()?;
    let inputs = ontology.get_seeded_skeleton(&classes)?;

    let mut factory = CommandRunnerFactory;
    let report = RunDispatcher::new(&inputs, preprocess_config, &scoring)
        .dispatch(&plan, &mut factory)?;
    info!("Completed {} of {} runs", report.runs.len(), report.total_runs);

    if let Some(path) = config.get_opt_str("sweep_report_filepath")? {
        persist_report(Path::new(&path), &report)?;
    }
    Ok(())
}

fn persist_report(path: &Path, report: &SweepReport) -> Result<(), PopulateError> {
    let bytes = to_canonical_json_bytes(report)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| report_error(path, err))?;
    }
    fs::write(path, bytes).map_err(|err| report_error(path, err))?;
    info!("Wrote sweep report to {}", path.display());
    Ok(())
}

fn report_error(path: &Path, err: std::io::Error) -> PopulateError {
    PopulateError::Io(
        ErrorInfo::new("report-write", "failed to write sweep report")
            .with_context("path", path.display().to_string())
            .with_hint(err.to_string()),
    )
}
