//! Error handling for consolekit.
use std::path::PathBuf;

use thiserror::Error;

/// Defines all possible errors that can occur in the console toolkit.
///
/// Lookups that can legitimately come back empty (options, values, a missing
/// logfile) are not errors and never surface here.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Error writing to the output stream or a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error reading or accessing a configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ConfigRead {
        /// The config path that could not be read.
        path: PathBuf,
        /// The underlying error that occurred.
        #[source]
        source: std::io::Error,
    },

    /// Error parsing YAML configuration.
    #[error("Invalid YAML format: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// A `${VAR}` reference in the configuration has no value in the environment.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    /// Error converting a value for the dumper.
    #[error("Failed to serialize value: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Error opening a logfile for appending.
    #[error("Can't open logfile '{path}' for writing: {source}")]
    LogFileOpen {
        /// The logfile path.
        path: PathBuf,
        /// The underlying error that occurred.
        #[source]
        source: std::io::Error,
    },

    /// Error spawning or waiting on a shell command.
    #[error("Failed to execute command '{command}': {source}")]
    Shell {
        /// The full command line that was executed.
        command: String,
        /// The underlying error that occurred.
        #[source]
        source: std::io::Error,
    },

    /// Error reading or cleaning up a daemon PID file.
    #[error("PID file error for '{path}': {source}")]
    PidFile {
        /// The PID file path.
        path: PathBuf,
        /// The underlying error that occurred.
        #[source]
        source: std::io::Error,
    },

    /// An option was given a value it cannot take.
    #[error("Invalid value for --{option}: {reason}")]
    InvalidOption {
        /// Canonical option name.
        option: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Error returned by a system call.
    #[error("System call failed: {0}")]
    ErrNo(#[from] nix::errno::Errno),
}
