//! Configuration management for consolekit.
use regex::Regex;
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use crate::error::ConsoleError;

static ENV_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{?([A-Za-z_][A-Za-z0-9_]*)\}?").expect("env pattern is a valid regex")
});

/// Console settings as read from a YAML file.
///
/// ```yaml
/// colors: true
/// append_pid_on_output: false
/// text_to_log: true
/// logfile: "${HOME}/.local/share/myapp/app.log"
/// referer: import-job
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Emit debug lines written through `Console::drop_debug`.
    pub debug: bool,
    /// Copy every `drop_text` line into the logfile.
    pub text_to_log: bool,
    /// Prefix console lines with `#<pid>`.
    pub append_pid_on_output: bool,
    /// Prefix logfile entries with `#<pid>`.
    pub append_pid_on_log: bool,
    /// Paint output with ANSI colors.
    pub colors: bool,
    /// Logfile to open on startup.
    pub logfile: Option<PathBuf>,
    /// Name stamped on every logfile entry.
    pub referer: Option<String>,
    /// Write the memory/elapsed-time summary when the console is dropped.
    pub summary_on_exit: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            debug: false,
            text_to_log: false,
            append_pid_on_output: false,
            append_pid_on_log: false,
            colors: true,
            logfile: None,
            referer: None,
            summary_on_exit: true,
        }
    }
}

/// Expands `$VAR` and `${VAR}` references from the environment.
fn expand_env_vars(input: &str) -> Result<String, ConsoleError> {
    let mut missing = None;
    let result = ENV_REFERENCE.replace_all(input, |caps: &regex::Captures| {
        let var_name = &caps[1];
        match env::var(var_name) {
            Ok(value) => value,
            Err(_) => {
                missing.get_or_insert_with(|| var_name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(var_name) => Err(ConsoleError::MissingEnvVar(var_name)),
        None => Ok(result.into_owned()),
    }
}

/// Parses configuration from YAML text, expanding environment variables.
pub fn parse_config(content: &str) -> Result<ConsoleConfig, ConsoleError> {
    let expanded = expand_env_vars(content)?;
    if expanded.trim().is_empty() {
        return Ok(ConsoleConfig::default());
    }
    Ok(serde_yaml::from_str(&expanded)?)
}

/// Loads and parses the configuration file at `config_path`.
///
/// A relative `logfile` is resolved against the directory of the config file.
pub fn load_config(config_path: impl AsRef<Path>) -> Result<ConsoleConfig, ConsoleError> {
    let config_path = config_path.as_ref();
    let content = fs::read_to_string(config_path).map_err(|source| ConsoleError::ConfigRead {
        path: config_path.to_path_buf(),
        source,
    })?;

    let mut config = parse_config(&content)?;

    let base_path = config_path.parent().unwrap_or_else(|| Path::new("."));
    if let Some(logfile) = config.logfile.take() {
        config.logfile = Some(if logfile.is_absolute() {
            logfile
        } else {
            base_path.join(logfile)
        });
    }
    Ok(config)
}
