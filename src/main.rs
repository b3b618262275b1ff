use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::atomic::Ordering;

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, Log, Metadata, Record};

use pagesim::simulation::{Coordinator, EventLog};
use pagesim::SimConfig;

#[derive(Parser)]
#[command(author, version, about = "Demand-paged virtual memory simulator with LRU replacement")]
struct Cli {
    /// Total number of simulated processes to launch
    #[arg(short = 'n', long)]
    processes: Option<u32>,

    /// Processes allowed to run at the same time
    #[arg(short = 's', long)]
    simultaneous: Option<u32>,

    /// Minimum simulated milliseconds between launches
    #[arg(short = 'i', long)]
    interval_ms: Option<u64>,

    /// Trace log file
    #[arg(short = 'f', long, default_value = "oss.log")]
    logfile: PathBuf,

    /// Number of physical frames
    #[arg(long)]
    frames: Option<u32>,

    /// Seed for the simulated workloads
    #[arg(long)]
    seed: Option<u64>,

    /// Upper bound on coordinator loop iterations
    #[arg(long)]
    max_loops: Option<u64>,

    /// Stop writing the trace log after this many lines
    #[arg(long)]
    max_log_lines: Option<u64>,

    /// JSON configuration file; command-line options take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Log debug diagnostics to stderr
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors to stderr
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn sim_config(&self) -> Result<SimConfig> {
        let mut config = match &self.config {
            Some(path) => SimConfig::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => SimConfig::default(),
        };

        if let Some(processes) = self.processes {
            config.launch.max_total = processes;
        }
        if let Some(simultaneous) = self.simultaneous {
            config.launch.max_simultaneous = simultaneous;
        }
        if let Some(interval_ms) = self.interval_ms {
            config.launch.launch_interval_ns = interval_ms.saturating_mul(1_000_000);
        }
        if let Some(frames) = self.frames {
            config.memory.frame_count = frames;
        }
        if let Some(seed) = self.seed {
            config.workload.seed = seed;
        }
        if let Some(max_loops) = self.max_loops {
            config.launch.max_loops = max_loops;
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else if self.quiet {
            LevelFilter::Error
        } else {
            LevelFilter::Info
        }
    }
}

/// Writes `log` records to stderr
struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            let _ = writeln!(io::stderr(), "[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    log::set_logger(&LOGGER).map_err(|err| anyhow::anyhow!("Failed to install logger: {}", err))?;
    log::set_max_level(cli.log_level());

    let config = cli.sim_config()?;

    let file = File::create(&cli.logfile)
        .with_context(|| format!("Failed to create log file {}", cli.logfile.display()))?;
    let writer = BufWriter::new(file);
    let event_log = match cli.max_log_lines {
        Some(max) => EventLog::with_max_lines(writer, max),
        None => EventLog::new(writer),
    };

    let coordinator = Coordinator::new(config, event_log)?;

    // Ctrl-C ends the run at the next loop so the trace and summary are kept
    let stop = coordinator.stop_handle();
    ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst))
        .context("Failed to install interrupt handler")?;

    let (summary, mut writer) = coordinator.run()?;
    writer.flush()?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary);
        println!("Trace written to {}", cli.logfile.display());
    }

    Ok(())
}
