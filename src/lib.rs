//! Consolekit is a small toolkit for console scripts and daemons. It parses
//! command-line options with aliases and defaults, renders usage text and
//! fixed-width tables, writes colorized output and timestamped logfiles, and
//! reports memory use and elapsed time when the script ends.

/// Command-line interface of the `conkit` demo binary.
pub mod cli;

/// ANSI colors.
pub mod colors;

/// Configuration management.
pub mod config;

/// Console output context.
pub mod console;

/// Shared constants.
pub mod constants;

/// Cursor movement and key input.
pub mod cursor;

/// Signal handling and child-process bookkeeping.
pub mod daemon;

/// Structured value dumps.
pub mod dump;

/// Error handling.
pub mod error;

/// Logfile management.
pub mod logs;

/// Memory and elapsed-time reporting.
pub mod metrics;

/// Option registry and tokenizer.
pub mod options;

/// Shell pipelines.
pub mod shell;

/// Text tables.
pub mod table;

/// Usage text.
pub mod usage;

#[doc(hidden)]
pub mod test_utils;
