#![allow(dead_code)]

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter};
use std::process::exit;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use config::{HighwayConfig, IndexConfig};
use highway::Highway;
use log::{debug, error, info};
use crate::test::random_samples::{self, SamplePlan};

mod bucket;
mod col;
mod command;
mod config;
mod fleet;
mod highway;
mod index;
mod planner;
mod primitives;
mod test;

#[derive(Parser, Debug)]
#[command(
    version,
    author,
    about = "Plans trips along a highway of stations whose vehicles have a limited range"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone, Debug)]
enum Commands {
    #[command(about = "Execute highway commands, one per line, and print one reply per command")]
    Run(RunArgs),

    #[command(about = "Apply random operations and check the results against a reference model")]
    RunRandom(RunRandomArgs),
}

#[derive(Args, Clone, Debug)]
struct HighwayArgs {
    #[arg(
        long,
        default_value_t = 8,
        help = "The number of buckets the position index starts with and never shrinks below."
    )]
    index_min_capacity: usize,

    #[arg(
        long,
        default_value_t = 2,
        help = "The number of bits the index capacity is shifted by on every resize."
    )]
    index_resize_bits: u32,

    #[arg(
        long,
        default_value_t = 75,
        help = "The maximum number of entries per 100 buckets before the index grows."
    )]
    index_load_factor: u32,

    #[arg(
        long,
        default_value_t = 8,
        help = "The number of stations space is reserved for up front."
    )]
    station_capacity: usize,
}

impl HighwayArgs {
    fn config(&self) -> HighwayConfig {
        let config = HighwayConfig {
            index: IndexConfig {
                min_capacity: self.index_min_capacity,
                resize_bits: self.index_resize_bits,
                load_factor_percent: self.index_load_factor,
            },
            station_capacity: self.station_capacity,
        };
        config.validate().unwrap_or_else(|it| {
            error!("Invalid configuration: {}", it);
            exit(1);
        });
        config
    }
}

#[derive(Args, Clone, Debug)]
struct RunArgs {
    #[arg(
        short = 'i',
        long,
        help = "The file to read commands from. Reads from stdin if not given."
    )]
    input: Option<String>,

    #[arg(long, help = "Abort on the first malformed line instead of skipping it.")]
    strict: bool,

    #[clap(flatten)]
    highway_args: HighwayArgs,
}

fn main_run(args: &RunArgs) {
    let input: Box<dyn BufRead> = match &args.input {
        Some(path) => {
            let file = File::open(path).unwrap_or_else(|it| {
                error!("Could not open input file {}: {}", path, it);
                exit(1);
            });
            Box::new(BufReader::new(file))
        }
        None => Box::new(io::stdin().lock()),
    };
    let output = BufWriter::new(io::stdout().lock());

    let mut highway = Highway::new(args.highway_args.config());
    let start_time = Instant::now();
    let stats =
        command::run_script(&mut highway, input, output, args.strict).unwrap_or_else(|it| {
            error!("Could not run commands: {}", it);
            exit(1);
        });

    info!(
        "Executed {} commands in {:?} ({} lines skipped)",
        stats.num_commands,
        start_time.elapsed(),
        stats.num_skipped
    );
    info!(
        "Live stations: {}, index capacity: {}",
        highway.len(),
        highway.index().capacity()
    );
    debug!("Final state:\n{}", highway.describe());
}

#[derive(Args, Clone, Debug)]
struct RunRandomArgs {
    #[arg(long, default_value_t = 0, help = "The seed of the first sample.")]
    seed: u64,

    #[arg(short = 'n', long, default_value_t = 1, help = "The number of samples to run.")]
    samples: u64,

    #[arg(long, default_value_t = 20_000, help = "The number of random operations per sample.")]
    steps: usize,

    #[arg(long, default_value_t = 300, help = "Stations are placed at positions below this bound.")]
    positions: u32,

    #[arg(long, default_value_t = 60, help = "Vehicle ranges are drawn below this bound.")]
    max_range: u32,

    #[clap(flatten)]
    highway_args: HighwayArgs,
}

fn main_run_random(args: &RunRandomArgs) {
    if args.positions == 0 || args.max_range == 0 {
        error!("Positions and max range must be positive");
        exit(1);
    }
    let plan = SamplePlan {
        num_positions: args.positions,
        max_range: args.max_range,
        steps: args.steps,
    };
    let start_time = Instant::now();
    random_samples::run_samples(
        args.seed..args.seed + args.samples,
        plan,
        args.highway_args.config(),
    );
    info!(
        "{} samples passed in {:?}",
        args.samples,
        start_time.elapsed()
    );
}

fn main() {
    env_logger::builder().parse_env("LOG").init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => main_run(&args),
        Commands::RunRandom(args) => main_run_random(&args),
    }
}
