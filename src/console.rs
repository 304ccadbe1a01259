//! The console context: output, options, tables and logfile in one place.
//!
//! A [`Console`] is built once at startup and passed by reference to the code
//! that writes output. It owns the writer, the option registry and the
//! optional logfile, and prints a memory/elapsed-time summary when dropped.
use std::{
    collections::BTreeMap,
    error::Error,
    io::{self, Stdout, Write},
    path::Path,
    time::{Duration, Instant},
};

use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    colors::{Color, colorize, visible_width},
    config::ConsoleConfig,
    constants::{ERROR_RULE_WIDTH, INDENT_STR, SUMMARY_TIME_UNITS},
    cursor,
    dump::Dumper,
    error::ConsoleError,
    logs::{EntryContext, LogFile, LogLevel},
    metrics::{self, MemoryUsage},
    options::{OptionRegistry, OptionValue, ParsedOptions, env_args},
    table::{Cell, Table, center},
    usage::UsageFormatter,
};

/// Console output context.
pub struct Console<W: Write = Stdout> {
    out: W,
    silent: bool,
    indent: usize,
    colors: bool,
    debug: bool,
    text_to_log: bool,
    append_pid_on_output: bool,
    summary_on_drop: bool,
    log_context: EntryContext,
    logfile: Option<LogFile>,
    registry: OptionRegistry,
    parsed: ParsedOptions,
    program: String,
    started: Instant,
}

impl Console<Stdout> {
    /// A console writing to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Console<W> {
    /// Creates a console writing to `out` with colors on and no logfile.
    pub fn new(out: W) -> Self {
        Self {
            out,
            silent: false,
            indent: 0,
            colors: true,
            debug: false,
            text_to_log: false,
            append_pid_on_output: false,
            summary_on_drop: true,
            log_context: EntryContext::default(),
            logfile: None,
            registry: OptionRegistry::new(),
            parsed: ParsedOptions::default(),
            program: env_args().into_iter().next().unwrap_or_default(),
            started: Instant::now(),
        }
    }

    /// Creates a console from `config`, opening its logfile if one is set.
    pub fn from_config(config: &ConsoleConfig, out: W) -> Result<Self, ConsoleError> {
        let mut console = Self::new(out);
        console.apply_config(config)?;
        Ok(console)
    }

    /// Replaces the output settings with those of `config`.
    ///
    /// Registered options and parsed values are kept.
    pub fn apply_config(&mut self, config: &ConsoleConfig) -> Result<(), ConsoleError> {
        self.debug = config.debug;
        self.text_to_log = config.text_to_log;
        self.append_pid_on_output = config.append_pid_on_output;
        self.colors = config.colors;
        self.summary_on_drop = config.summary_on_exit;
        self.log_context = EntryContext {
            referer: config.referer.clone(),
            append_pid: config.append_pid_on_log,
        };
        if let Some(logfile) = &config.logfile {
            self.set_log_file(logfile)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------------

    /// Disables all further output, including the summary on drop.
    pub fn shut_up(&mut self) {
        self.silent = true;
    }

    pub fn is_silent(&self) -> bool {
        self.silent
    }

    pub fn set_colors(&mut self, enabled: bool) {
        self.colors = enabled;
    }

    pub fn colors_enabled(&self) -> bool {
        self.colors
    }

    pub fn set_debug(&mut self, enabled: bool) {
        self.debug = enabled;
    }

    pub fn set_text_to_log(&mut self, enabled: bool) {
        self.text_to_log = enabled;
    }

    pub fn set_append_pid_on_output(&mut self, enabled: bool) {
        self.append_pid_on_output = enabled;
    }

    pub fn set_append_pid_on_log(&mut self, enabled: bool) {
        self.log_context.append_pid = enabled;
    }

    pub fn set_summary_on_drop(&mut self, enabled: bool) {
        self.summary_on_drop = enabled;
    }

    /// Sets the name stamped on logfile entries.
    pub fn set_referer(&mut self, referer: impl Into<String>) -> &mut Self {
        self.log_context.referer = Some(referer.into());
        self
    }

    pub fn referer(&self) -> Option<&str> {
        self.log_context.referer.as_deref()
    }

    /// Sets the program name shown in usage text.
    pub fn set_program(&mut self, program: impl Into<String>) {
        self.program = program.into();
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.out
    }

    fn color(&self, color: Option<Color>) -> Option<Color> {
        if self.colors { color } else { None }
    }

    // ------------------------------------------------------------------------
    // Text output
    // ------------------------------------------------------------------------

    /// Writes `text` without indent or newline.
    pub fn echo(&mut self, text: &str, color: Option<Color>) -> Result<(), ConsoleError> {
        if self.silent {
            return Ok(());
        }
        let text = colorize(text, self.color(color));
        self.out.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Writes `n` line breaks.
    pub fn drop_lf(&mut self, n: usize) -> Result<(), ConsoleError> {
        self.echo(&"\n".repeat(n), None)
    }

    /// Writes an indented line, optionally copying it into the logfile.
    ///
    /// Lines are copied to the logfile when `put_to_log` is set or the
    /// console was configured with `text_to_log`.
    pub fn drop_text(
        &mut self,
        text: &str,
        color: Option<Color>,
        put_to_log: bool,
    ) -> Result<(), ConsoleError> {
        self.emit_line(text, color)?;
        if self.text_to_log || put_to_log {
            self.put_log(text, LogLevel::None)?;
        }
        Ok(())
    }

    /// [`drop_text`](Self::drop_text) for several lines.
    pub fn drop_lines<I, S>(&mut self, lines: I, color: Option<Color>) -> Result<(), ConsoleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.drop_text(line.as_ref(), color, false)?;
        }
        Ok(())
    }

    /// Writes an `ERROR:`, `WARNING:` or `NOTICE:` line.
    pub fn drop_error(
        &mut self,
        text: &str,
        level: LogLevel,
        put_to_log: bool,
    ) -> Result<(), ConsoleError> {
        let (label, color) = error_style(level);
        self.drop_text(&format!("{label}: {text}"), Some(color), put_to_log)
    }

    /// Writes a gray line when debug output is enabled.
    pub fn drop_debug(&mut self, text: &str) -> Result<(), ConsoleError> {
        if self.debug {
            self.emit_line(&format!("DEBUG: {text}"), Some(Color::Gray))?;
        }
        Ok(())
    }

    pub fn increase_indent(&mut self) {
        self.indent += 1;
    }

    /// Returns `false` when the indent is already zero.
    pub fn decrease_indent(&mut self) -> bool {
        if self.indent == 0 {
            return false;
        }
        self.indent -= 1;
        true
    }

    fn emit_line(&mut self, text: &str, color: Option<Color>) -> Result<(), ConsoleError> {
        if self.silent {
            return Ok(());
        }
        let body = format!("{}{text}", INDENT_STR.repeat(self.indent));
        let prefix = if self.append_pid_on_output {
            format!("#{}\t", std::process::id())
        } else {
            String::new()
        };
        let line = format!("{prefix}{}\n", colorize(&body, self.color(color)));
        self.out.write_all(line.as_bytes())?;
        Ok(())
    }

    fn write_raw_lines(&mut self, lines: &[String]) -> Result<(), ConsoleError> {
        if self.silent {
            return Ok(());
        }
        for line in lines {
            self.out.write_all(line.as_bytes())?;
            self.out.write_all(b"\n")?;
        }
        self.out.flush()?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Logfile
    // ------------------------------------------------------------------------

    /// Opens `path` as the logfile, replacing any previous one.
    pub fn set_log_file(&mut self, path: impl AsRef<Path>) -> Result<(), ConsoleError> {
        match LogFile::open(path) {
            Ok(logfile) => {
                self.logfile = Some(logfile);
                Ok(())
            }
            Err(err) => {
                self.emit_line(&format!("ERROR: {err}"), Some(Color::LightRed))?;
                Err(err)
            }
        }
    }

    pub fn log_file(&self) -> Option<&LogFile> {
        self.logfile.as_ref()
    }

    /// Appends an entry to the logfile.
    ///
    /// Returns `Ok(false)` and prints a warning when no logfile is set.
    pub fn put_log(&mut self, text: &str, level: LogLevel) -> Result<bool, ConsoleError> {
        match self.logfile.as_mut() {
            Some(logfile) => {
                logfile.write_entry(&self.log_context, level, text)?;
                Ok(true)
            }
            None => {
                warn!("Log entry dropped, no logfile defined");
                let (label, color) = error_style(LogLevel::Warning);
                self.emit_line(
                    &format!(
                        "{label}: There is no defined logfile! Define logfile before doing any logfile actions!"
                    ),
                    Some(color),
                )?;
                Ok(false)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Options
    // ------------------------------------------------------------------------

    pub fn registry(&self) -> &OptionRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut OptionRegistry {
        &mut self.registry
    }

    pub fn set_option_default(&mut self, name: &str, value: impl Into<String>) {
        self.registry.set_default(name, value);
    }

    pub fn set_option_description(&mut self, name: &str, text: impl Into<String>) {
        self.registry.set_description(name, text);
    }

    /// Binds `alias` to `name`; `false` if the alias belongs to another option.
    pub fn add_option_alias(&mut self, name: &str, alias: &str) -> bool {
        self.registry.add_alias(name, alias)
    }

    /// Parses `args` (program name first) without acting on `--help`.
    pub fn parse_args<I, S>(&mut self, args: I, no_value: &[&str]) -> &ParsedOptions
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|arg| arg.as_ref().to_string()).collect();
        if let Some(program) = args.first() {
            self.program = program.clone();
        }
        self.parsed = self.registry.parse(&args, no_value);
        debug!(
            "Parsed {} option(s), {} positional argument(s)",
            self.parsed.values().len(),
            self.parsed.positional().len()
        );
        &self.parsed
    }

    /// Parses `args`; when help was requested prints usage and exits with 0.
    pub fn parse_options<I, S>(
        &mut self,
        args: I,
        no_value: &[&str],
    ) -> Result<&ParsedOptions, ConsoleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.parse_args(args, no_value);
        self.exit_on_help()?;
        Ok(&self.parsed)
    }

    /// Prints usage and exits with 0 when the last parse requested help.
    ///
    /// Split from [`parse_args`](Self::parse_args) so output settings taken
    /// from the parsed options apply to the usage text.
    pub fn exit_on_help(&mut self) -> Result<(), ConsoleError> {
        if self.write_help_if_requested()? {
            self.shut_up();
            std::process::exit(0);
        }
        Ok(())
    }

    fn write_help_if_requested(&mut self) -> Result<bool, ConsoleError> {
        if !self.parsed.help_requested() {
            return Ok(false);
        }
        self.show_usage()?;
        Ok(true)
    }

    pub fn parsed(&self) -> &ParsedOptions {
        &self.parsed
    }

    /// Value of `name` (or its alias), falling back to the registered default.
    pub fn option(&self, name: &str) -> Option<OptionValue> {
        self.registry.get(&self.parsed, name)
    }

    /// Defaults merged with parsed options.
    pub fn options(&self) -> BTreeMap<String, OptionValue> {
        self.registry.all(&self.parsed)
    }

    /// Usage lines for the registered options.
    pub fn usage_lines(&self) -> Vec<String> {
        let param_color = self.color(Some(Color::White));
        UsageFormatter::default().render_styled(&self.program, &self.registry.specs(), param_color)
    }

    /// Writes usage text, preceded by a blank line.
    pub fn show_usage(&mut self) -> Result<(), ConsoleError> {
        let lines = self.usage_lines();
        self.drop_lf(1)?;
        self.write_raw_lines(&lines)
    }

    // ------------------------------------------------------------------------
    // Tables, banners and dumps
    // ------------------------------------------------------------------------

    /// Renders `table` (clearing it) and writes it without pid prefix.
    pub fn flush_table(&mut self, table: &mut Table) -> Result<(), ConsoleError> {
        let lines = if self.colors {
            table.render_styled()
        } else {
            table.render()
        };
        self.write_raw_lines(&lines)
    }

    /// Writes `lines` centered inside a dashed box.
    pub fn draw_logo<I, C>(&mut self, lines: I) -> Result<(), ConsoleError>
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        let cells: Vec<Cell> = lines.into_iter().map(Into::into).collect();
        let lines = logo_lines(&cells, self.colors);
        self.write_raw_lines(&lines)
    }

    /// Writes a recursive dump of `value`.
    pub fn show_dump<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ConsoleError> {
        let dump = Dumper::new(self.colors).dump_value(value)?;
        self.write_raw_lines(&[dump])
    }

    // ------------------------------------------------------------------------
    // Cursor
    // ------------------------------------------------------------------------

    pub fn move_cursor(&mut self, row: u16, col: u16) -> Result<(), ConsoleError> {
        cursor::move_to(&mut self.out, row, col)
    }

    pub fn cursor_up(&mut self, n: u16) -> Result<(), ConsoleError> {
        cursor::up(&mut self.out, n)
    }

    pub fn cursor_down(&mut self, n: u16) -> Result<(), ConsoleError> {
        cursor::down(&mut self.out, n)
    }

    pub fn cursor_forward(&mut self, n: u16) -> Result<(), ConsoleError> {
        cursor::forward(&mut self.out, n)
    }

    pub fn cursor_backward(&mut self, n: u16) -> Result<(), ConsoleError> {
        cursor::backward(&mut self.out, n)
    }

    pub fn clear_screen(&mut self) -> Result<(), ConsoleError> {
        cursor::clear_screen(&mut self.out)
    }

    pub fn erase_to_eol(&mut self) -> Result<(), ConsoleError> {
        cursor::erase_to_eol(&mut self.out)
    }

    pub fn save_cursor(&mut self) -> Result<(), ConsoleError> {
        cursor::save_position(&mut self.out)
    }

    pub fn restore_cursor(&mut self) -> Result<(), ConsoleError> {
        cursor::restore_position(&mut self.out)
    }

    // ------------------------------------------------------------------------
    // Runtime summary and termination
    // ------------------------------------------------------------------------

    /// Time since the console was created.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn memory_usage(&self) -> MemoryUsage {
        MemoryUsage::sample()
    }

    /// "Peak memory usage" and "Elapsed time" lines.
    pub fn summary_lines(&self) -> Vec<String> {
        let label = self.color(Some(Color::White));
        let memory = metrics::format_bytes(self.memory_usage().peak);
        let elapsed = metrics::format_elapsed(self.elapsed(), SUMMARY_TIME_UNITS);
        vec![
            format!("{} {memory}", colorize("Peak memory usage:", label)),
            format!("{} {elapsed}", colorize("Elapsed time:", label)),
        ]
    }

    /// Writes a blank line followed by the summary lines.
    pub fn write_summary(&mut self) -> Result<(), ConsoleError> {
        let lines = self.summary_lines();
        self.drop_lf(1)?;
        self.write_raw_lines(&lines)
    }

    /// Logs the reason (for error and debug levels), silences output and
    /// exits the process; the exit status is 1 for [`LogLevel::Error`].
    pub fn abort(&mut self, reason: &str, level: LogLevel) -> ! {
        if matches!(level, LogLevel::Error | LogLevel::Debug) && self.logfile.is_some() {
            let _ = self.put_log(&format!("Script aborted. Reason: {reason}"), level);
        }
        self.shut_up();
        let _ = self.out.flush();
        std::process::exit(i32::from(level == LogLevel::Error));
    }

    /// Writes `err` and its causes to the logfile, then aborts.
    pub fn handle_error(&mut self, err: &dyn Error) -> ! {
        let message = error_report(err);
        if self.logfile.is_some() {
            let _ = self.put_log(&message, LogLevel::None);
        } else {
            let _ = self.drop_error(&err.to_string(), LogLevel::Error, false);
        }
        self.abort("Error caught.", LogLevel::Error)
    }
}

impl<W: Write> Drop for Console<W> {
    fn drop(&mut self) {
        if self.summary_on_drop && !self.silent {
            let _ = self.write_summary();
        }
        let _ = self.out.flush();
    }
}

fn error_style(level: LogLevel) -> (&'static str, Color) {
    match level {
        LogLevel::Error => ("ERROR", Color::LightRed),
        LogLevel::Warning => ("WARNING", Color::Yellow),
        LogLevel::Notice | LogLevel::Info | LogLevel::Debug | LogLevel::None => {
            ("NOTICE", Color::Gray)
        }
    }
}

/// Error message with its chain of causes, closed by a rule of `=`.
fn error_report(err: &dyn Error) -> String {
    let mut message = format!("ERROR => {err}\n\n");
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(&format!("CAUSED BY => {cause}\n\n"));
        source = cause.source();
    }
    message.push_str(&"=".repeat(ERROR_RULE_WIDTH));
    message
}

/// Lines of a banner box around `cells`.
fn logo_lines(cells: &[Cell], colors: bool) -> Vec<String> {
    let max = cells
        .iter()
        .map(|cell| visible_width(cell.text()))
        .max()
        .unwrap_or(0);
    let rule = "-".repeat(max + 4);

    let mut lines = vec![rule.clone()];
    for cell in cells {
        let free = max + 2 - visible_width(cell.text());
        let style = if colors { cell.style() } else { None };
        lines.push(format!("|{}|", colorize(&center(cell.text(), free), style)));
    }
    lines.push(rule);
    lines
}
