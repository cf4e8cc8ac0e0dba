//! Per-document diagnostic sink.
//!
//! Soft failures during interpretation (unknown properties, shape mismatches)
//! are reported here rather than returned as errors. The sink is disabled by
//! default.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Diagnostic level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type Callback = Arc<dyn Fn(Level, &str) + Send + Sync>;

/// Where diagnostics go.
#[derive(Clone, Default)]
pub enum Logger {
    /// Drop everything.
    #[default]
    Disabled,
    /// Forward to the `tracing` facade under the `oasa` target.
    Console,
    /// Hand each message to a caller-supplied function.
    Callback(Callback),
}

impl Logger {
    /// Build a callback sink.
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(Level, &str) + Send + Sync + 'static,
    {
        Logger::Callback(Arc::new(f))
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Logger::Disabled)
    }

    pub fn log(&self, level: Level, message: &str) {
        match self {
            Logger::Disabled => {}
            Logger::Console => match level {
                Level::Info => tracing::info!(target: "oasa", "{}", message),
                Level::Warn => tracing::warn!(target: "oasa", "{}", message),
                Level::Error => tracing::error!(target: "oasa", "{}", message),
            },
            Logger::Callback(f) => f(level, message),
        }
    }

    pub fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }
}

impl From<bool> for Logger {
    /// `true` enables the console sink, `false` disables diagnostics.
    fn from(debug: bool) -> Self {
        if debug {
            Logger::Console
        } else {
            Logger::Disabled
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Logger::Disabled => f.write_str("Logger::Disabled"),
            Logger::Console => f.write_str("Logger::Console"),
            Logger::Callback(_) => f.write_str("Logger::Callback(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn default_is_disabled() {
        let logger = Logger::default();
        assert!(!logger.is_enabled());
        // Must not panic
        logger.warn("ignored");
    }

    #[test]
    fn from_bool() {
        assert!(matches!(Logger::from(true), Logger::Console));
        assert!(matches!(Logger::from(false), Logger::Disabled));
    }

    #[test]
    fn callback_receives_level_and_message() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let logger = Logger::callback(move |level, msg| {
            sink.lock().unwrap().push((level, msg.to_string()));
        });

        logger.info("one");
        logger.warn("two");
        logger.error("three");

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                (Level::Info, "one".to_string()),
                (Level::Warn, "two".to_string()),
                (Level::Error, "three".to_string()),
            ]
        );
    }

    #[test]
    fn level_display() {
        assert_eq!(Level::Warn.to_string(), "warn");
    }
}
