use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use env_logger::{Builder, Env, Target};
use fdn_core::{ErrorInfo, PopulateError};

/// Copies every log record to stderr and to the run's log file.
struct Tee {
    file: File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write_all(buf)?;
        io::stderr().write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()?;
        io::stderr().flush()
    }
}

/// Installs the global logger, appending to `logfile`.
///
/// The filter defaults to `info` and honours `RUST_LOG`.
pub fn init(logfile: &Path) -> Result<(), PopulateError> {
    if let Some(parent) = logfile.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| {
            PopulateError::Io(
                ErrorInfo::new("log-create", "failed to create log directory")
                    .with_context("path", parent.display().to_string())
                    .with_hint(err.to_string()),
            )
        })?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(logfile)
        .map_err(|err| {
            PopulateError::Io(
                ErrorInfo::new("log-open", "failed to open log file")
                    .with_context("path", logfile.display().to_string())
                    .with_hint(err.to_string()),
            )
        })?;
    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(Tee { file })))
        .try_init()
        .map_err(|err| PopulateError::Io(ErrorInfo::new("log-init", err.to_string())))
}
