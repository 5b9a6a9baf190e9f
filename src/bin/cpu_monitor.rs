// src/bin/cpu_monitor.rs

use anyhow::{Context, Result};
use clap::Parser;
use cpu_monitor::config::{find_config_file, MonitorSettings, CONFIG};
use cpu_monitor::logging::init_logger;
use cpu_monitor::modules::{identify, CpuMonitor, CpuidSource, FailureLatch, TerminalDisplay};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

/// Delay between display ticks; sampling itself is gated at 100 ms.
const TICK: Duration = Duration::from_millis(25);

#[derive(Parser, Debug)]
#[command(name = "cpu-monitor")]
#[command(about = "CPU identification and live per-core frequency monitor", long_about = None)]
struct Args {
    /// Use config file at defined path
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the CPU identification and exit
    #[arg(long)]
    info: bool,

    /// Write log records to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = find_config_file(args.config.as_deref())?;
    CONFIG.set_path(config_path)?;
    let settings = MonitorSettings::from_config(&CONFIG)?;

    let level = if args.debug {
        log::LevelFilter::Debug
    } else {
        settings.log_level
    };
    init_logger(level, args.log_file.as_deref()).context("failed to initialise logging")?;

    let profile = identify(&CpuidSource::new(), &settings.max_freq_path)
        .context("CPU identification is required before monitoring")?;

    if args.info {
        println!("{}", profile);
        if CONFIG.has_config() {
            println!("\nUsing settings defined in {} file", CONFIG.get_path().display());
        }
        return Ok(());
    }

    let display = TerminalDisplay::new(std::io::stdout());
    let mut monitor = CpuMonitor::new(profile, &settings, display);
    let mut latch = FailureLatch::new();

    loop {
        latch.observe(&monitor.tick());
        thread::sleep(TICK);
    }
}
