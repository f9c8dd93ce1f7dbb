//! Logger setup for planning executables
//!
//! Records go to stdout and to the session's log file. Each line carries the elapsed session
//! time so that log lines can be matched against the timestamped data saved into the session.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use colored::{ColoredString, Colorize};
use log::{self, info, Level, Record};
use std::fmt;
use thiserror::Error;

use crate::session::{self, Session};

pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Module which traces every generated candidate.
const CANDIDATE_TRACE_MODULE: &str = "plan_lib::auto::nav::generator";

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level of at least `INFO`, found `{0}`")]
    InvalidMinLogLevel(LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// # Notes
///
/// - `min_level` must be at least `log::Level::Info`, so that cycle warnings are never hidden.
/// - Per-candidate tracing is capped at `DEBUG` whatever `min_level` is.
///
/// # Safety
///
/// - This function must only be called once to prevent corrupting logs.
pub fn logger_init(min_level: LevelFilter, session: &Session) -> Result<(), LoggerInitError> {
    if min_level < Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level));
    }

    let log_file =
        fern::log_file(session.log_file_path.clone()).map_err(LoggerInitError::LogFileInitError)?;

    let mut dispatch = fern::Dispatch::new()
        .format(format_record)
        .level(min_level);

    for (module, level) in module_levels(min_level) {
        dispatch = dispatch.level_for(module, level);
    }

    dispatch
        .chain(std::io::stdout())
        .chain(log_file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    if let Some(epoch) = session::get_epoch() {
        info!("    Session epoch: {}", epoch);
    }
    info!("    Log level: {:?}", min_level);
    for (module, level) in module_levels(min_level) {
        info!("    Log level for {}: {:?}", module, level);
    }
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Per-module overrides of `min_level`.
fn module_levels(min_level: LevelFilter) -> Vec<(&'static str, LevelFilter)> {
    vec![(CANDIDATE_TRACE_MODULE, min_level.min(LevelFilter::Debug))]
}

/// Debug and trace lines include the module they came from.
fn format_record(out: fern::FormatCallback, message: &fmt::Arguments, record: &Record) {
    if record.level() > Level::Info {
        out.finish(format_args!(
            "[{:10.6} {}] {}: {}",
            session::get_elapsed_seconds(),
            level_tag(record.level()),
            record.target(),
            message
        ))
    } else {
        out.finish(format_args!(
            "[{:10.6} {}] {}",
            session::get_elapsed_seconds(),
            level_tag(record.level()),
            message
        ))
    }
}

fn level_tag(level: Level) -> ColoredString {
    match level {
        Level::Trace => "TRC".dimmed().italic(),
        Level::Debug => "DBG".dimmed(),
        Level::Info => "INF".normal(),
        Level::Warn => "WRN".yellow(),
        Level::Error => "ERR".red().bold(),
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_module_levels() {
        assert_eq!(
            module_levels(LevelFilter::Trace),
            vec![(CANDIDATE_TRACE_MODULE, LevelFilter::Debug)]
        );

        // Below DEBUG the candidate module follows the default level
        assert_eq!(module_levels(LevelFilter::Info)[0].1, LevelFilter::Info);
    }

    #[test]
    fn test_level_tags() {
        assert_eq!(&*level_tag(Level::Trace), "TRC");
        assert_eq!(&*level_tag(Level::Warn), "WRN");
        assert_eq!(&*level_tag(Level::Error), "ERR");
    }
}
