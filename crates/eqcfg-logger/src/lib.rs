//! User-facing console output for the eqcfg CLI
//!
//! A [`Logger`] is created once by the binary from the global flags and
//! handed to each command. Console messages go to stderr; when a log file is
//! configured every message is also appended there with a timestamp.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Failed to create log file {}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug)]
struct LogFile {
    path: PathBuf,
    file: File,
}

pub struct Logger {
    verbosity: u8,
    no_stdout: bool,
    log_file: Option<LogFile>,
    spinner: Mutex<Option<ProgressBar>>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("verbosity", &self.verbosity)
            .field("no_stdout", &self.no_stdout)
            .field("log_file", &self.log_path())
            .finish_non_exhaustive()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Logger {
            verbosity: 0,
            no_stdout: false,
            log_file: None,
            spinner: Mutex::new(None),
        }
    }
}

impl Logger {
    /// Create a logger.
    ///
    /// Verbosity 0 shows warnings and errors, 1 adds debug output and 2 adds
    /// trace steps. `no_stdout` silences everything but warnings and errors.
    /// An existing log file is truncated.
    pub fn new(verbosity: u8, no_stdout: bool, log_file: Option<&Path>) -> Result<Self, LoggerError> {
        let log_file = match log_file {
            Some(path) => Some(open_log_file(path)?),
            None => None,
        };
        Ok(Logger {
            verbosity,
            no_stdout,
            log_file,
            spinner: Mutex::new(None),
        })
    }

    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }

    pub fn no_stdout(&self) -> bool {
        self.no_stdout
    }

    /// Default `tracing` filter directive for this verbosity
    pub fn filter_directive(&self) -> &'static str {
        if self.no_stdout {
            return "error";
        }
        match self.verbosity {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.log_file.as_ref().map(|log| log.path.as_path())
    }

    fn write_to_log(&self, level: &str, message: &str) {
        if let Some(ref log) = self.log_file {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
            let mut out = &log.file;
            let _ = writeln!(out, "[{}] {} {}", timestamp, level, message);
        }
    }

    fn console_enabled(&self, min_verbosity: u8) -> bool {
        !self.no_stdout && self.verbosity >= min_verbosity
    }

    /// Informational message (console at verbosity >= 1)
    pub fn info(&self, message: &str) {
        self.write_to_log("INFO", message);
        if self.console_enabled(1) {
            eprintln!("{}", message);
        }
    }

    pub fn debug(&self, message: &str) {
        self.write_to_log("DEBUG", message);
        if self.console_enabled(1) {
            eprintln!("{} {}", "DEBUG:".blue().bold(), message);
        }
    }

    /// Warnings always reach the console.
    pub fn warn(&self, message: &str) {
        self.write_to_log("WARN", message);
        eprintln!("{} {}", "warning:".yellow().bold(), message);
    }

    /// Errors always reach the console.
    pub fn error(&self, message: &str) {
        self.write_to_log("ERROR", message);
        eprintln!("{} {}", "Error:".red().bold(), message);
    }

    pub fn success(&self, message: &str) {
        self.write_to_log("SUCCESS", message);
        if self.console_enabled(0) {
            eprintln!("{} {}", "\u{2714}".green().bold(), message);
        }
    }

    /// Progress step, shown at verbosity >= 2
    pub fn step(&self, message: &str) {
        self.write_to_log("STEP", message);
        if self.console_enabled(2) {
            eprintln!("TRACE: {}", message);
        }
    }

    pub fn show_log_path(&self) {
        match self.log_path() {
            Some(path) => eprintln!("Log file: {}", path.display()),
            None => eprintln!("No log file configured"),
        }
    }

    /// Start a spinner; skipped when verbose or silenced.
    pub fn spinner_start(&self, message: &str) {
        self.write_to_log("STEP", message);
        if !self.console_enabled(0) || self.verbosity > 0 {
            return;
        }

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner.set_message(message.to_string());

        if let Ok(mut guard) = self.spinner.lock() {
            if let Some(previous) = guard.replace(spinner) {
                previous.finish_and_clear();
            }
        }
    }

    /// Clear the spinner and report success.
    pub fn spinner_success(&self, message: &str) {
        self.spinner_stop();
        self.success(message);
    }

    /// Clear the spinner and report a failure.
    pub fn spinner_error(&self, message: &str) {
        self.spinner_stop();
        self.write_to_log("ERROR", message);
        eprintln!("  {} {}", "✗".red().bold(), message);
    }

    pub fn spinner_stop(&self) {
        if let Ok(mut guard) = self.spinner.lock() {
            if let Some(spinner) = guard.take() {
                spinner.finish_and_clear();
            }
        }
    }

    #[cfg(test)]
    fn spinner_active(&self) -> bool {
        self.spinner.lock().map(|g| g.is_some()).unwrap_or(false)
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.spinner_stop();
    }
}

fn open_log_file(path: &Path) -> Result<LogFile, LoggerError> {
    let log_error = |source| LoggerError::LogFile {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(log_error)?;
    }
    let file = File::create(path).map_err(log_error)?;
    Ok(LogFile {
        path: path.to_path_buf(),
        file,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_filter_directive() {
        let directive = |verbosity, quiet| {
            Logger::new(verbosity, quiet, None)
                .unwrap()
                .filter_directive()
        };
        assert_eq!(directive(0, false), "warn");
        assert_eq!(directive(1, false), "debug");
        assert_eq!(directive(2, false), "trace");
        assert_eq!(directive(5, false), "trace");
        assert_eq!(directive(2, true), "error");
    }

    #[test]
    fn test_log_file_is_truncated() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("eqcfg.log");
        fs::write(&path, "stale content\n").unwrap();

        let logger = Logger::new(0, true, Some(path.as_path())).unwrap();
        assert_eq!(logger.log_path(), Some(path.as_path()));
        drop(logger);

        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_every_level_reaches_log_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("logs").join("eqcfg.log");
        let logger = Logger::new(0, true, Some(path.as_path())).unwrap();

        logger.info("scanning plugins");
        logger.debug("found 2 bundles");
        logger.warn("no start levels");
        logger.error("write failed");
        logger.success("done");
        logger.step("rendering");

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("INFO scanning plugins"));
        assert!(lines[1].ends_with("DEBUG found 2 bundles"));
        assert!(lines[2].ends_with("WARN no start levels"));
        assert!(lines[3].ends_with("ERROR write failed"));
        assert!(lines[4].ends_with("SUCCESS done"));
        assert!(lines[5].ends_with("STEP rendering"));
    }

    #[test]
    fn test_log_file_error_names_path() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("file");
        fs::write(&blocker, "").unwrap();
        let err = Logger::new(0, false, Some(blocker.join("eqcfg.log").as_path())).unwrap_err();
        assert!(err.to_string().contains("Failed to create log file"));
    }

    #[test]
    fn test_spinner_skipped_when_verbose_or_quiet() {
        let verbose = Logger::new(1, false, None).unwrap();
        verbose.spinner_start("working");
        assert!(!verbose.spinner_active());

        let quiet = Logger::new(0, true, None).unwrap();
        quiet.spinner_start("working");
        assert!(!quiet.spinner_active());
    }

    #[test]
    fn test_spinner_lifecycle() {
        let logger = Logger::default();
        logger.spinner_start("Scanning plugins");
        assert!(logger.spinner_active());
        logger.spinner_success("Scanned");
        assert!(!logger.spinner_active());

        logger.spinner_start("Writing");
        logger.spinner_error("Failed");
        assert!(!logger.spinner_active());
    }
}
