//! Leveled logging for the server.
//!
//! The server never reaches for a global logger: it is handed an
//! `Arc<dyn LogSink>` at construction. [`Logger`] is the stock sink, writing
//! timestamped lines to the console or appending them to a file. It also
//! implements [`log::Log`] so a binary can route the `log` facade through the
//! same output.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const RESET: &str = "\x1b[0m";

/// Severity attached to each message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    None,
    Error,
    Warn,
    Info,
    Debug,
    Success,
}

impl LogLevel {
    pub fn label(&self) -> &'static str {
        match *self {
            LogLevel::None => "NONE",
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Success => "SUCCESS",
        }
    }

    /// ANSI foreground color for console output
    fn color(&self) -> &'static str {
        match *self {
            LogLevel::None => "\x1b[39m",
            LogLevel::Error => "\x1b[31m",
            LogLevel::Warn => "\x1b[33m",
            LogLevel::Info => "\x1b[36m",
            LogLevel::Debug => "\x1b[35m",
            LogLevel::Success => "\x1b[32m",
        }
    }
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => LogLevel::Error,
            log::Level::Warn => LogLevel::Warn,
            log::Level::Info => LogLevel::Info,
            log::Level::Debug | log::Level::Trace => LogLevel::Debug,
        }
    }
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Console,
    File,
}

/// Anything that accepts `(message, level)` pairs.
pub trait LogSink: Send + Sync {
    fn log(&self, message: &str, level: LogLevel);
}

enum LogTarget {
    Console,
    File { file: File, path: PathBuf },
}

struct LoggerState {
    level: LogLevel,
    target: LogTarget,
}

/// Console or file logger. Clones share the same output.
#[derive(Clone)]
pub struct Logger {
    state: Arc<Mutex<LoggerState>>,
}

impl Logger {
    /// A console logger whose default level is `level`.
    pub fn console(level: LogLevel) -> Self {
        Self {
            state: Arc::new(Mutex::new(LoggerState {
                level,
                target: LogTarget::Console,
            })),
        }
    }

    pub fn new(level: LogLevel, output: LogOutput, path: Option<&Path>) -> Self {
        let logger = Self::console(level);
        logger.set_preferences(level, output, path);
        logger
    }

    /// Change the default level and the output target.
    ///
    /// If the log file cannot be opened (or none was given for
    /// `LogOutput::File`) the logger keeps writing to the console.
    pub fn set_preferences(&self, level: LogLevel, output: LogOutput, path: Option<&Path>) {
        let target = match (output, path) {
            (LogOutput::Console, _) => LogTarget::Console,
            (LogOutput::File, Some(path)) => match open_log_file(path) {
                Ok(file) => LogTarget::File {
                    file,
                    path: path.to_path_buf(),
                },
                Err(e) => {
                    eprintln!("Cannot open log file {}: {}", path.display(), e);
                    eprintln!("Changing default logging to console.");
                    LogTarget::Console
                }
            },
            (LogOutput::File, None) => {
                eprintln!("No log file given, logging to console.");
                LogTarget::Console
            }
        };

        let mut state = self.state.lock();
        state.level = level;
        state.target = target;
    }

    /// Current output kind
    pub fn output(&self) -> LogOutput {
        match self.state.lock().target {
            LogTarget::Console => LogOutput::Console,
            LogTarget::File { .. } => LogOutput::File,
        }
    }

    /// Path of the log file, when logging to one
    pub fn file_path(&self) -> Option<PathBuf> {
        match &self.state.lock().target {
            LogTarget::Console => None,
            LogTarget::File { path, .. } => Some(path.clone()),
        }
    }

    /// The level used by [`Logger::log_default`]
    pub fn level(&self) -> LogLevel {
        self.state.lock().level
    }

    /// Log at the configured default level
    pub fn log_default(&self, message: &str) {
        let level = self.level();
        self.write(message, level);
    }

    fn write(&self, message: &str, level: LogLevel) {
        let time = chrono::Local::now().format("%d/%m/%Y %H:%M:%S");
        let mut state = self.state.lock();

        match &mut state.target {
            LogTarget::Console => {
                println!(
                    "[{}][{}{} : {}]{}",
                    time,
                    level.color(),
                    level.label(),
                    RESET,
                    message
                );
            }
            LogTarget::File { file, .. } => {
                let line = format!("[{}][{} : ]{}\n", time, level.label(), message);
                if let Err(e) = file.write_all(line.as_bytes()) {
                    eprintln!("Failed to write log line: {}", e);
                }
            }
        }
    }
}

impl LogSink for Logger {
    fn log(&self, message: &str, level: LogLevel) {
        self.write(message, level);
    }
}

impl log::Log for Logger {
    fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        self.write(&record.args().to_string(), record.level().into());
    }

    fn flush(&self) {
        if let LogTarget::File { file, .. } = &mut self.state.lock().target {
            let _ = file.flush();
        }
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_file(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("dinoscale-logger-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn test_file_output_appends_plain_lines() {
        let path = scratch_file("append.log");
        let logger = Logger::new(LogLevel::Info, LogOutput::File, Some(path.as_path()));
        assert_eq!(logger.output(), LogOutput::File);

        logger.log("first", LogLevel::Error);
        logger.log_default("second");

        let again = Logger::new(LogLevel::Info, LogOutput::File, Some(path.as_path()));
        again.log("third", LogLevel::Success);

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("[ERROR : ]first"));
        assert!(lines[1].ends_with("[INFO : ]second"));
        assert!(lines[2].ends_with("[SUCCESS : ]third"));
        assert!(!contents.contains('\x1b'));
    }

    #[test]
    fn test_unopenable_file_falls_back_to_console() {
        let blocker = scratch_file("not-a-dir");
        fs::write(&blocker, "plain file").unwrap();

        let logger = Logger::new(LogLevel::Warn, LogOutput::File, Some(blocker.join("server.log").as_path()));
        assert_eq!(logger.output(), LogOutput::Console);
        assert_eq!(logger.file_path(), None);
        assert_eq!(logger.level(), LogLevel::Warn);
    }

    #[test]
    fn test_file_output_without_path_uses_console() {
        let logger = Logger::new(LogLevel::Debug, LogOutput::File, None);
        assert_eq!(logger.output(), LogOutput::Console);
    }

    #[test]
    fn test_log_facade_levels_map_onto_log_levels() {
        assert_eq!(LogLevel::from(log::Level::Error), LogLevel::Error);
        assert_eq!(LogLevel::from(log::Level::Info), LogLevel::Info);
        assert_eq!(LogLevel::from(log::Level::Trace), LogLevel::Debug);
    }

    #[test]
    fn test_level_deserializes_from_lowercase() {
        let level: LogLevel = serde_json::from_str("\"success\"").unwrap();
        assert_eq!(level, LogLevel::Success);
    }
}
