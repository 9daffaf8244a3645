/*!
# Reciprocal Counter Application

Front end for the reciprocal counter core. It drives the measurement loop
from a simulated clock/counter and shows the result either on an interactive
terminal front panel or, headless, in the log and as JSON lines.

## Features

- Interactive terminal front panel with single-key commands
- Headless mode with scripted commands and JSON output
- TOML configuration for timebase, measurement cadence and display options
- Optional diagnostics panel showing register and pipeline internals

## Usage

### Interactive (default)
```bash
reciprocal_counter --config counter.toml
```

Keys: `f` `p` `h` `l` `e` select the mode, `m` `g` `d` the input, `6` `7` the
precision, `q` or Esc quits.

### Headless
```bash
reciprocal_counter simulate --signal 48000 --headless --passes 5 --json --commands 7p
```

### Generate a configuration file
```bash
reciprocal_counter config --output counter.toml
```
*/

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, Write};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use counter_core::{
    format_fixed, input_label, mode_label, unit_label, AppScheduler, MeasurementResult, Settings,
};
use counter_core::constants::DISPLAY_DECIMALS;
use tracing::{info, warn, Level};

mod config;
mod input;
mod simulation;
mod terminal;

use config::AppConfig;
use input::spawn_keyboard_reader;
use simulation::SimulatedCounter;
use terminal::{LogDisplay, TerminalDisplay, TerminalGuard};

#[derive(Parser)]
#[command(name = "reciprocal_counter")]
#[command(about = "Reciprocal frequency counter with auto-ranging gate time")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, default_value = "counter.toml")]
    config: PathBuf,

    /// Write log output to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the counter against a simulated input signal
    Simulate {
        /// Input signal reading (overrides the config file)
        #[arg(short, long)]
        signal: Option<u64>,

        /// Measurement interval in milliseconds (overrides the config file)
        #[arg(short, long)]
        interval: Option<u64>,

        /// Run without the terminal front panel
        #[arg(long)]
        headless: bool,

        /// Stop after this many measurements
        #[arg(short, long, requires = "headless")]
        passes: Option<u64>,

        /// Print every measurement as a JSON line
        #[arg(long, requires = "headless")]
        json: bool,

        /// Command characters applied before measuring
        #[arg(long, requires = "headless")]
        commands: Option<String>,
    },

    /// Generate configuration file
    Config {
        /// Output path for configuration file
        #[arg(short, long, default_value = "counter.toml")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let headless = matches!(cli.command, Some(Commands::Simulate { headless: true, .. }));
    init_logging(cli.log_file.as_deref(), headless, cli.verbose)?;

    match cli.command {
        Some(Commands::Simulate { signal, interval, headless, passes, json, commands }) => {
            let mut config = load_config(&cli.config)?;
            if let Some(interval) = interval {
                config.counter.measurement_interval_ms = interval;
                config.validate()?;
            }
            let mut counter = SimulatedCounter::new(config.counter.simulated_signal);
            if let Some(signal) = signal {
                counter.set_signal(signal);
            }

            let completed = if headless {
                run_headless(&config, counter, passes, json, commands.as_deref().unwrap_or(""))?
            } else {
                run_terminal(&config, counter)?
            };
            info!("✅ Counter finished after {} measurements", completed);
            Ok(())
        }

        Some(Commands::Config { output }) => generate_config_file(output),

        None => {
            let config = load_config(&cli.config)?;
            let counter = SimulatedCounter::new(config.counter.simulated_signal);
            let completed = run_terminal(&config, counter)?;
            info!("✅ Counter finished after {} measurements", completed);
            Ok(())
        }
    }
}

/// Set up logging.
///
/// The terminal front panel owns stdout, so without a log file logging stays
/// off unless running headless.
fn init_logging(log_file: Option<&Path>, headless: bool, verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file: {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None if headless => {
            // stderr keeps stdout clean for JSON output
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .init();
        }
        None => {}
    }
    Ok(())
}

/// Load the configuration file, falling back to defaults when it does not exist
fn load_config(path: &Path) -> Result<AppConfig> {
    if path.exists() {
        AppConfig::load_from_file(path)
    } else {
        warn!("⚠️ Config file {} not found, using defaults", path.display());
        Ok(AppConfig::new())
    }
}

/// Run the interactive front panel until the user quits
fn run_terminal(config: &AppConfig, counter: SimulatedCounter) -> Result<u64> {
    let guard = TerminalGuard::enter().context("Failed to set up terminal")?;

    let reader_running = Arc::new(AtomicBool::new(true));
    let (keys, reader) = spawn_keyboard_reader(Arc::clone(&reader_running));

    let display = TerminalDisplay::new(io::stdout(), config.display.use_color);
    let mut scheduler = AppScheduler::new(config.scheduler_config(), keys, counter, display);

    let mut write_error = None;
    let completed = scheduler.run(|s, _| match s.display_mut().take_error() {
        Some(e) => {
            write_error = Some(e);
            ControlFlow::Break(())
        }
        None => ControlFlow::Continue(()),
    });

    reader_running.store(false, Ordering::SeqCst);
    if reader.join().is_err() {
        warn!("Keyboard reader thread panicked");
    }
    drop(guard);

    if let Some(e) = write_error {
        return Err(e).context("Terminal output failed");
    }
    println!("Reciprocal counter finished");
    Ok(completed)
}

/// Run without a front panel, optionally printing JSON lines
fn run_headless(
    config: &AppConfig,
    counter: SimulatedCounter,
    passes: Option<u64>,
    json: bool,
    commands: &str,
) -> Result<u64> {
    info!("🚀 Starting headless counter");
    info!("⏱️ Timebase: {} Hz", config.counter.timebase_frequency_hz);
    info!("📡 Interval: {} ms", config.counter.measurement_interval_ms);

    let source: VecDeque<char> = commands.chars().collect();
    let mut scheduler = AppScheduler::new(config.scheduler_config(), source, counter, LogDisplay::default());

    // Set up Ctrl+C handler
    let running = scheduler.get_running_flag();
    ctrlc::set_handler(move || {
        eprintln!("\n🛑 Received Ctrl+C, shutting down gracefully...");
        running.store(false, Ordering::SeqCst);
    })?;

    let mut output_error = None;
    let completed = scheduler.run(|s, outcome| {
        let Some(result) = outcome.measurement else {
            return ControlFlow::Continue(());
        };
        if json {
            if let Err(e) = print_json(&s.settings(), &result) {
                output_error = Some(e);
                return ControlFlow::Break(());
            }
        }
        match passes {
            Some(limit) if s.passes() >= limit => ControlFlow::Break(()),
            _ => ControlFlow::Continue(()),
        }
    });

    if let Some(e) = output_error {
        return Err(e);
    }
    if let Some(value) = scheduler.display().last_value() {
        info!("📟 Last reading: {}", value.trim());
    }
    Ok(completed)
}

/// Write one measurement as a JSON line on stdout
fn print_json(settings: &Settings, result: &MeasurementResult) -> Result<()> {
    let json_output = serde_json::json!({
        "timestamp": Local::now().to_rfc3339(),
        "mode": mode_label(settings.mode),
        "input": input_label(settings.input),
        "precision": settings.precision.digits(),
        "unit": unit_label(settings.mode),
        "value": format_fixed(result.display_value, DISPLAY_DECIMALS).trim(),
        "measurement": result,
    });

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", json_output)?;
    stdout.flush()?;
    Ok(())
}

/// Generate a default configuration file
fn generate_config_file(output_path: PathBuf) -> Result<()> {
    let config = AppConfig::new();
    config.save_to_file(&output_path)?;

    println!("✅ Generated configuration file: {}", output_path.display());
    println!("📝 Edit the file to customize settings, then run:");
    println!("   reciprocal_counter --config {}", output_path.display());

    Ok(())
}
