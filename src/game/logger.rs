//! Match logger
//!
//! Messages go to stdout or to an in-memory buffer. The buffer lets tests
//! inspect what happened during a call without scraping stdout.

use std::cell::{Ref, RefCell};
use std::ops::Deref;

/// Verbosity level for match output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum VerbosityLevel {
    /// No output
    Silent = 0,
    /// Only match outcomes
    Minimal = 1,
    /// Turns, phases and key actions (default)
    #[default]
    Normal = 2,
    /// Every action and state change
    Verbose = 3,
}

/// Output destination for log messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Stdout,
    /// Capture only to the in-memory buffer
    Memory,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: VerbosityLevel,
    pub message: String,
    /// Optional category (e.g. "opponent_choice")
    pub category: Option<String>,
}

/// Read-only view of the captured entries
pub struct LogGuard<'a> {
    guard: Ref<'a, Vec<LogEntry>>,
}

impl<'a> Deref for LogGuard<'a> {
    type Target = [LogEntry];

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

pub struct GameLogger {
    verbosity: VerbosityLevel,
    output_mode: OutputMode,
    log_buffer: RefCell<Vec<LogEntry>>,
}

impl GameLogger {
    /// Create a new logger with default verbosity (Normal)
    pub fn new() -> Self {
        Self::with_verbosity(VerbosityLevel::default())
    }

    pub fn with_verbosity(verbosity: VerbosityLevel) -> Self {
        GameLogger {
            verbosity,
            output_mode: OutputMode::default(),
            log_buffer: RefCell::new(Vec::new()),
        }
    }

    /// Logger that records everything in memory and prints nothing
    pub fn capturing() -> Self {
        GameLogger {
            output_mode: OutputMode::Memory,
            ..Self::with_verbosity(VerbosityLevel::Verbose)
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.output_mode == OutputMode::Memory
    }

    pub fn logs(&self) -> LogGuard<'_> {
        LogGuard {
            guard: self.log_buffer.borrow(),
        }
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    #[inline]
    fn log_to_stdout(level: VerbosityLevel, message: &str) {
        if level == VerbosityLevel::Minimal {
            println!("{message}");
        } else {
            println!("  {message}");
        }
    }

    fn log(&self, level: VerbosityLevel, category: Option<&str>, message: &str) {
        if level > self.verbosity {
            return;
        }

        match self.output_mode {
            OutputMode::Memory => self.log_buffer.borrow_mut().push(LogEntry {
                level,
                message: message.to_string(),
                category: category.map(str::to_string),
            }),
            OutputMode::Stdout => Self::log_to_stdout(level, message),
        }
    }

    #[inline]
    pub fn minimal(&self, message: &str) {
        self.log(VerbosityLevel::Minimal, None, message);
    }

    #[inline]
    pub fn normal(&self, message: &str) {
        self.log(VerbosityLevel::Normal, None, message);
    }

    #[inline]
    pub fn verbose(&self, message: &str) {
        self.log(VerbosityLevel::Verbose, None, message);
    }

    /// Log a rule-based opponent decision at Normal level
    #[inline]
    pub fn opponent_choice(&self, message: &str) {
        self.log(VerbosityLevel::Normal, Some("opponent_choice"), message);
    }
}

impl Default for GameLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GameLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameLogger")
            .field("verbosity", &self.verbosity)
            .field("output_mode", &self.output_mode)
            .field("log_count", &self.log_buffer.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_creation() {
        let logger = GameLogger::new();
        assert_eq!(logger.verbosity(), VerbosityLevel::Normal);
        assert!(!logger.is_capturing());
    }

    #[test]
    fn test_log_capture() {
        let logger = GameLogger::capturing();
        assert!(logger.is_capturing());

        logger.normal("test message");
        logger.minimal("minimal message");
        logger.opponent_choice("plays Ember Drake");

        let logs = logger.logs();
        assert_eq!(logs.len(), 3);
        assert_eq!(logs[0].message, "test message");
        assert_eq!(logs[1].level, VerbosityLevel::Minimal);
        assert_eq!(logs[2].category.as_deref(), Some("opponent_choice"));
    }

    #[test]
    fn test_capture_respects_verbosity() {
        let logger = GameLogger {
            verbosity: VerbosityLevel::Minimal,
            ..GameLogger::capturing()
        };
        logger.verbose("dropped");
        logger.normal("dropped too");
        logger.minimal("Game over: player");

        let logs = logger.logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].message, "Game over: player");
    }
}
