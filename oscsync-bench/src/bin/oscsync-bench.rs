use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, Parser};
use oscsync_bench::{run, BenchConfig, Method, Report};

// ----------------------------------------------------------------------------
// Command-line Interface

#[derive(Debug, Parser)]
#[command(about = "Simulate RC oscillator synchronization against a BREAK/SYNCH reference")]
enum Cli {
    /// Send reference frames to a simulated device and report the result.
    Run(RunArgs),
    /// Print the effective configuration as TOML.
    ShowConfig(ConfigArgs),
}

#[derive(Debug, Args)]
struct ConfigArgs {
    /// Bench configuration file (built-in defaults if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct RunArgs {
    #[command(flatten)]
    config: ConfigArgs,
    /// Calibration method, overriding the configuration file.
    #[arg(short, long, value_enum)]
    method: Option<Method>,
    /// Number of frames to send, overriding the configuration file.
    #[arg(short, long)]
    frames: Option<usize>,
    /// Put the device to sleep between frames.
    #[arg(long)]
    sleep: bool,
}

// ----------------------------------------------------------------------------
// Application

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_module("oscsync_bench", log::LevelFilter::Info)
        .filter_module("oscsync_core", log::LevelFilter::Info)
        .parse_default_env()
        .init();

    match Cli::parse() {
        Cli::Run(args) => run_bench(args),
        Cli::ShowConfig(args) => show_config(args),
    }
}

// ----------------------------------------------------------------------------
// Subcommands

fn run_bench(args: RunArgs) -> Result<()> {
    let mut config = load_config(&args.config)?;
    if let Some(method) = args.method {
        config.method = method;
    }
    if let Some(frames) = args.frames {
        config.frames = frames;
    }
    config.sleep |= args.sleep;
    config.validate()?;

    log::info!(
        "{} search on {:?}, {} frame(s)",
        config.method,
        config.synch.device,
        config.frames
    );

    let report = run(&config)?;
    print_report(&report);

    if !report.all_synchronized(config.reference.data) {
        bail!("Device did not synchronize on every frame");
    }
    Ok(())
}

fn show_config(args: ConfigArgs) -> Result<()> {
    let config = load_config(&args)?;
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

// ----------------------------------------------------------------------------
// Helper Functions

fn load_config(args: &ConfigArgs) -> Result<BenchConfig> {
    match &args.config {
        Some(path) => BenchConfig::load(path),
        None => Ok(BenchConfig::default()),
    }
}

fn print_report(report: &Report) {
    println!(
        "{:>5}  {:>6}  {:>6}  {:>5}  {:>12}  {:>8}  {:>8}",
        "frame", "rounds", "resets", "trim", "frequency", "error", "data"
    );
    for frame in &report.frames {
        let data = frame
            .received
            .iter()
            .map(|byte| format!("{byte:#04x}"))
            .collect::<Vec<_>>()
            .join(" ");
        let rounds = format!("{}/{}", frame.rounds, report.method.rounds());
        match frame.converged {
            Some(c) => println!(
                "{:>5}  {:>6}  {:>6}  {:>#5x}  {:>12.0}  {:>+7.3}%  {:>8}",
                frame.index,
                rounds,
                frame.restarts,
                c.trim,
                c.frequency,
                c.error * 100.0,
                data
            ),
            None => println!(
                "{:>5}  {:>6}  {:>6}  {:>5}  {:>12}  {:>8}  {:>8}",
                frame.index, rounds, frame.restarts, "-", "-", "-", data
            ),
        }
    }
    println!("ideal trim {:#04x}", report.ideal_trim);
    if let Some(worst) = report.worst_error() {
        println!(
            "worst error {:.3}% against {:.0} Hz",
            worst * 100.0,
            report.target_frequency
        );
    }
}
