//! Constants and layout values for the console toolkit.
//!
//! This module centralizes the magic numbers and strings used across the
//! option parser, the renderers and the process helpers.

use std::time::Duration;

// ============================================================================
// Option Parsing
// ============================================================================

/// Canonical name of the built-in help option.
pub const HELP_OPTION: &str = "help";

/// Alias registered for the help option on every new registry.
pub const HELP_ALIAS: &str = "h";

// ============================================================================
// Usage Text Layout
// ============================================================================

/// Width of the `--name` column in usage text.
pub const USAGE_PARAM_WIDTH: usize = 16;

/// Width of the alias column in usage text.
pub const USAGE_ALIAS_WIDTH: usize = 10;

/// Width at which option descriptions are wrapped.
pub const USAGE_TEXT_WIDTH: usize = 60;

// ============================================================================
// Table Layout
// ============================================================================

/// Horizontal space added around the widest text of each column.
pub const TABLE_CELL_PADDING: usize = 2;

/// Character used for the horizontal rules between rows.
pub const TABLE_RULE_CHAR: char = '-';

/// Character used between cells.
pub const TABLE_CELL_SEPARATOR: char = '|';

// ============================================================================
// Console Output
// ============================================================================

/// String emitted once per indent level in front of `drop_text` lines.
pub const INDENT_STR: &str = "\t";

/// Width of the `=` rule written after an error report in the logfile.
pub const ERROR_RULE_WIDTH: usize = 80;

/// Timestamp format used for logfile entries.
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Date prefix used when packing a logfile into a gzip archive.
pub const LOG_ARCHIVE_DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Memory Reporting
// ============================================================================

/// Bytes in a kilobyte.
pub const KBYTE: u64 = 1024;

/// Bytes in a megabyte.
pub const MBYTE: u64 = 1_048_576;

/// Bytes in a gigabyte.
pub const GBYTE: u64 = 1_073_741_824;

/// Unit letters used by the elapsed-time summary written on exit.
pub const SUMMARY_TIME_UNITS: &str = "ywdhisS";

// ============================================================================
// Shell Execution Constants
// ============================================================================

/// Default shell used for executing command pipelines.
pub const DEFAULT_SHELL: &str = "sh";

/// Shell argument flag for executing command strings.
pub const SHELL_COMMAND_FLAG: &str = "-c";

/// Separator placed between pipeline stages.
pub const PIPE_SEPARATOR: &str = " | ";

// ============================================================================
// Daemon Helpers
// ============================================================================

/// Interval between reaping attempts while waiting for child processes.
pub const CHILD_POLL_INTERVAL: Duration = Duration::from_millis(100);
