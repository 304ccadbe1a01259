//! Logfile writing and archiving.
use std::{
    fs::{self, File, OpenOptions},
    io::{Read, Write},
    path::{Path, PathBuf},
};

use chrono::Local;
use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use fs2::FileExt;
use serde::Deserialize;
use strum::{AsRefStr, EnumString};
use tracing::debug;

use crate::{
    constants::{LOG_ARCHIVE_DATE_FORMAT, LOG_TIMESTAMP_FORMAT},
    error::ConsoleError,
};

/// Severity attached to a logfile entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, EnumString, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogLevel {
    Error,
    Warning,
    Notice,
    Info,
    Debug,
    #[default]
    None,
}

impl LogLevel {
    /// Label written in front of the message, e.g. `"Error:"`.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Error => "Error:",
            Self::Warning => "Warning:",
            Self::Notice => "Notice:",
            Self::Info => "Info:",
            Self::Debug => "Debug:",
            Self::None => "",
        }
    }
}

/// Context stamped on every entry besides time and level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryContext {
    /// Name of the script or program writing the entry.
    pub referer: Option<String>,
    /// Prefix entries with `#<pid>`.
    pub append_pid: bool,
}

/// Formats one logfile line (without the trailing newline).
///
/// `YYYY/MM/DD HH:MM:SS[ #pid][ referer][ Level:] text`
pub fn format_entry(context: &EntryContext, level: LogLevel, text: &str) -> String {
    let mut parts = vec![Local::now().format(LOG_TIMESTAMP_FORMAT).to_string()];
    if context.append_pid {
        parts.push(format!("#{}", std::process::id()));
    }
    if let Some(referer) = context.referer.as_deref().filter(|r| !r.is_empty()) {
        parts.push(referer.to_string());
    }
    if !level.label().is_empty() {
        parts.push(level.label().to_string());
    }
    parts.push(text.to_string());
    parts.join(" ")
}

/// An open logfile, appended to entry by entry.
#[derive(Debug)]
pub struct LogFile {
    path: PathBuf,
    file: File,
}

impl LogFile {
    /// Opens `path` for appending, creating missing parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConsoleError> {
        let path = path.as_ref().to_path_buf();
        let open_error = |source| ConsoleError::LogFileOpen {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(open_error)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(open_error)?;

        debug!("Opened logfile {}", path.display());
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a formatted entry, holding an exclusive lock while writing so
    /// entries from forked children do not interleave.
    pub fn write_entry(
        &mut self,
        context: &EntryContext,
        level: LogLevel,
        text: &str,
    ) -> Result<(), ConsoleError> {
        let mut line = format_entry(context, level, text);
        line.push('\n');

        self.file.lock_exclusive()?;
        let written = self.file.write_all(line.as_bytes()).and_then(|_| self.file.flush());
        let unlocked = FileExt::unlock(&self.file);
        written?;
        unlocked?;
        Ok(())
    }
}

/// Path of the archive that [`pack_logfile`] writes for `logfile` today.
pub fn archive_path(logfile: &Path) -> PathBuf {
    let name = logfile
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let date = Local::now().format(LOG_ARCHIVE_DATE_FORMAT);
    logfile
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!("{date}_{name}.gz"))
}

/// Compresses `logfile` into `<dir>/<YYYY-MM-DD>_<name>.gz` and removes it.
///
/// When today's archive already exists its content is kept and the logfile is
/// appended after it.
pub fn pack_logfile(logfile: &Path) -> Result<PathBuf, ConsoleError> {
    let archive = archive_path(logfile);
    let mut text = Vec::new();

    if archive.exists() {
        let mut decoder = GzDecoder::new(File::open(&archive)?);
        decoder.read_to_end(&mut text)?;
    }
    File::open(logfile)?.read_to_end(&mut text)?;

    let mut encoder = GzEncoder::new(File::create(&archive)?, Compression::best());
    encoder.write_all(&text)?;
    encoder.finish()?;

    fs::remove_file(logfile)?;
    debug!("Packed {} into {}", logfile.display(), archive.display());
    Ok(archive)
}
