use std::{error::Error, io::Write};

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use consolekit::{
    cli::{self, Cli, NO_VALUE_OPTIONS},
    colors::Color,
    config::load_config,
    console::Console,
    error::ConsoleError,
    logs::LogLevel,
    options::env_args,
    shell::ShellCommand,
    table::{Cell, Table},
};

fn main() -> Result<(), Box<dyn Error>> {
    let mut console = Console::stdout();
    cli::register_options(&mut console);
    console.parse_args(env_args(), NO_VALUE_OPTIONS);
    if cli::plain_output_requested(&console) {
        console.set_colors(false);
    }
    console.exit_on_help()?;

    let args = match Cli::from_console(&console) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            console.shut_up();
            std::process::exit(2);
        }
    };
    init_logging(&args);
    register_signal_handler()?;

    if let Err(err) = configure(&mut console, &args).and_then(|()| run(&mut console, &args)) {
        console.handle_error(&err);
    }
    Ok(())
}

fn configure<W: Write>(console: &mut Console<W>, args: &Cli) -> Result<(), ConsoleError> {
    if let Some(config_path) = &args.config {
        let config = load_config(config_path)?;
        console.apply_config(&config)?;
        debug!("Loaded console settings from {}", config_path.display());
    }
    if let Some(logfile) = &args.logfile {
        console.set_log_file(logfile)?;
    }
    if console.referer().is_none() {
        console.set_referer("conkit");
    }
    if cli::plain_output_requested(console) {
        console.set_colors(false);
    }
    Ok(())
}

fn init_logging(args: &Cli) {
    let filter = if let Some(level) = args.log_level {
        EnvFilter::new(level.as_str())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn register_signal_handler() -> Result<(), Box<dyn Error>> {
    ctrlc::set_handler(move || {
        eprintln!("conkit interrupted");
        std::process::exit(130);
    })?;

    Ok(())
}

fn run<W: Write>(console: &mut Console<W>, args: &Cli) -> Result<(), ConsoleError> {
    console.draw_logo([
        Cell::header(format!("Hello, {}!", args.name)).styled(Color::LightGreen),
        Cell::body(format!("consolekit {}", env!("CARGO_PKG_VERSION"))),
    ])?;
    if console.log_file().is_some() {
        console.put_log(&format!("Greeted {}", args.name), LogLevel::Info)?;
    }

    let options = console.options();
    let mut table = Table::new();
    table.push_row([Cell::header("Option"), Cell::header("Value")]);
    for (name, value) in &options {
        table.push_row([Cell::body(format!("--{name}")), Cell::body(value.to_string())]);
    }
    for (index, arg) in args.positional.iter().enumerate() {
        table.push_row([Cell::body(format!("#{index}")), Cell::body(arg.as_str())]);
    }
    console.flush_table(&mut table)?;

    if args.dump {
        console.show_dump(&options)?;
    }

    if let Some(pipeline) = &args.exec {
        exec_pipeline(console, pipeline)?;
    }
    Ok(())
}

/// Runs `pipeline` (stages separated by `|`) and shows its output as a table.
fn exec_pipeline<W: Write>(console: &mut Console<W>, pipeline: &str) -> Result<(), ConsoleError> {
    let mut shell = ShellCommand::new();
    for stage in pipeline.split('|') {
        let mut words = stage.split_whitespace();
        if let Some(program) = words.next() {
            shell.add_command(program).args(words);
        }
    }
    if shell.stages().is_empty() {
        return console.drop_error("Nothing to execute.", LogLevel::Warning, false);
    }

    info!("Running {}", shell.command_line());
    let output = shell.exec()?;

    let mut table = Table::new();
    table.push_row([Cell::header(shell.command_line())]);
    for line in output.lines() {
        table.push_row([line]);
    }
    console.flush_table(&mut table)?;

    if !output.success() {
        let status = output
            .status
            .map_or_else(|| "signal".to_string(), |code| code.to_string());
        let put_to_log = console.log_file().is_some();
        console.drop_error(
            &format!("Command exited with status {status}: {}", output.stderr.trim()),
            LogLevel::Warning,
            put_to_log,
        )?;
    }
    Ok(())
}
