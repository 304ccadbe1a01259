//! Command-line interface for the `conkit` demo binary.
//!
//! Options are registered on a [`Console`] and parsed with its own option
//! parser; [`Cli::from_console`] turns the parsed values into typed settings.
use std::{io::Write, path::PathBuf, str::FromStr};

use tracing::level_filters::LevelFilter;

use crate::{console::Console, error::ConsoleError};

/// Options that never take a value.
pub const NO_VALUE_OPTIONS: &[&str] = &["dump", "no-color"];

/// Wrapper around `LevelFilter` so log levels parse from either string names
/// ("info", "debug", etc.) or numeric shorthands (0-5).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogLevelArg(LevelFilter);

impl LogLevelArg {
    /// String representation suitable for `RUST_LOG`.
    pub fn as_str(&self) -> &'static str {
        match self.0 {
            LevelFilter::OFF => "off",
            LevelFilter::ERROR => "error",
            LevelFilter::WARN => "warn",
            LevelFilter::INFO => "info",
            LevelFilter::DEBUG => "debug",
            LevelFilter::TRACE => "trace",
        }
    }

    pub fn level(&self) -> LevelFilter {
        self.0
    }
}

impl FromStr for LogLevelArg {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err("log level cannot be empty".into());
        }

        if let Ok(number) = trimmed.parse::<u8>() {
            let level = match number {
                0 => LevelFilter::OFF,
                1 => LevelFilter::ERROR,
                2 => LevelFilter::WARN,
                3 => LevelFilter::INFO,
                4 => LevelFilter::DEBUG,
                5 => LevelFilter::TRACE,
                _ => {
                    return Err(format!(
                        "unsupported log level number '{number}' (expected 0-5)"
                    ));
                }
            };

            return Ok(LogLevelArg(level));
        }

        let level = match trimmed.to_ascii_lowercase().as_str() {
            "off" => Some(LevelFilter::OFF),
            "error" | "err" => Some(LevelFilter::ERROR),
            "warn" | "warning" => Some(LevelFilter::WARN),
            "info" | "information" => Some(LevelFilter::INFO),
            "debug" => Some(LevelFilter::DEBUG),
            "trace" => Some(LevelFilter::TRACE),
            _ => None,
        }
        .ok_or_else(|| format!("invalid log level '{trimmed}'"))?;

        Ok(LogLevelArg(level))
    }
}

/// Registers the demo options, their aliases and descriptions on `console`.
pub fn register_options<W: Write>(console: &mut Console<W>) {
    let options: [(&str, &str, Option<&str>, &str); 7] = [
        ("name", "n", Some("World"), "Who to greet."),
        (
            "log-level",
            "l",
            None,
            "Diagnostic verbosity written to stderr: 0-5 or off, error, warn, info, debug, trace.",
        ),
        ("logfile", "L", None, "Append output to this logfile."),
        ("config", "c", None, "Load console settings from a YAML file."),
        (
            "exec",
            "e",
            None,
            "Run a shell pipeline (stages separated by '|') and show its output as a table.",
        ),
        ("dump", "d", None, "Dump the effective options."),
        ("no-color", "", None, "Disable ANSI colors."),
    ];

    for (name, alias, default, description) in options {
        if !alias.is_empty() {
            console.add_option_alias(name, alias);
        }
        if let Some(default) = default {
            console.set_option_default(name, default);
        }
        console.set_option_description(name, description);
    }
    console.set_option_description("help", "Show this help and exit.");
}

/// Whether `--no-color` was given or `NO_COLOR` is set in the environment.
pub fn plain_output_requested<W: Write>(console: &Console<W>) -> bool {
    console.option("no-color").is_some_and(|value| value.is_truthy())
        || std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty())
}

/// Typed settings of one `conkit` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cli {
    pub name: String,
    pub log_level: Option<LogLevelArg>,
    pub logfile: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub exec: Option<String>,
    pub dump: bool,
    pub no_color: bool,
    pub positional: Vec<String>,
}

impl Cli {
    /// Reads the settings from the options parsed by `console`.
    pub fn from_console<W: Write>(console: &Console<W>) -> Result<Self, ConsoleError> {
        let text = |name: &str| {
            console
                .option(name)
                .and_then(|value| value.as_str().map(str::to_string))
                .filter(|value| !value.is_empty())
        };
        let flag = |name: &str| console.option(name).is_some_and(|value| value.is_truthy());

        let log_level = text("log-level")
            .map(|value| {
                value
                    .parse::<LogLevelArg>()
                    .map_err(|reason| ConsoleError::InvalidOption {
                        option: "log-level".into(),
                        reason,
                    })
            })
            .transpose()?;

        Ok(Self {
            name: text("name").unwrap_or_default(),
            log_level,
            logfile: text("logfile").map(PathBuf::from),
            config: text("config").map(PathBuf::from),
            exec: text("exec"),
            dump: flag("dump"),
            no_color: flag("no-color"),
            positional: console.parsed().positional().to_vec(),
        })
    }
}
