//! CLI for diskpulse: SMART health checks and raw read benchmarks.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "diskpulse")]
#[command(about = "diskpulse: SMART health checks and positional read benchmarks for disks")]
#[command(version = diskpulse_core::VERSION)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List whole-disk block devices on this machine
    Devices {
        /// Print the device list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Query SMART data and print a health report.
    /// Use --all to check every listed disk concurrently.
    Check {
        /// Device to check, e.g. /dev/sda
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        device: Option<String>,

        /// Check every disk reported by `diskpulse devices`
        #[arg(long)]
        all: bool,

        /// Export the report as JSON to this path (a directory gets the default file name)
        #[arg(long)]
        json: Option<String>,

        /// Export the attribute table as CSV to this path (a directory gets the default file name)
        #[arg(long)]
        csv: Option<String>,

        /// Also print the raw smartctl transcript
        #[arg(long)]
        raw: bool,

        /// Per-command timeout in seconds
        #[arg(long, default_value = "15")]
        timeout_sec: f64,

        /// smartctl program name or path
        #[arg(long, default_value = "smartctl")]
        smartctl: String,

        /// Maximum concurrent probes with --all
        #[arg(long, default_value_t = diskpulse_core::DEFAULT_MAX_WORKERS)]
        workers: usize,
    },

    /// Positional read benchmark: throughput and seek latency across the device.
    /// Needs read access to the device node (usually root). Ctrl+C cancels.
    Bench {
        /// Device (or any file) to read
        device: String,

        /// Bytes read per sample
        #[arg(long, default_value_t = diskpulse_core::benchmark::DEFAULT_BLOCK_SIZE)]
        block_size: usize,

        /// Number of evenly spaced samples
        #[arg(long, default_value_t = diskpulse_core::benchmark::DEFAULT_SAMPLE_COUNT)]
        samples: usize,

        /// Write the summary as JSON
        #[arg(long)]
        output: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    commands::init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Devices { json } => commands::devices::run(json),
        Commands::Check {
            device,
            all,
            json,
            csv,
            raw,
            timeout_sec,
            smartctl,
            workers,
        } => commands::check::run(commands::check::CheckCommandConfig {
            device: device.as_deref(),
            all,
            json_path: json.as_deref(),
            csv_path: csv.as_deref(),
            show_raw: raw,
            timeout_sec,
            smartctl: &smartctl,
            workers,
        }),
        Commands::Bench {
            device,
            block_size,
            samples,
            output,
        } => commands::bench::run(&device, block_size, samples, output.as_deref()),
    };

    if let Err(e) = result {
        commands::report_error(&e);
        std::process::exit(commands::exit_code(&e));
    }
}
