use crate::format::RecordFormat;
use crate::sink::{Sink, SinkStats};
use anyhow::Context;
use clap::error::ErrorKind;
use clap::{value_parser, CommandFactory, FromArgMatches, Parser};
use sqd_bloom_data::BlockSource;
use std::fs::File;
use std::io::{BufWriter, IsTerminal};
use std::path::PathBuf;
use std::time::Duration;


const WRITE_BUFFER_SIZE: usize = 64 * 1024;


#[derive(Parser, Debug)]
#[command(version, long_about = None)]
pub struct Cli {
    /// Gzip compressed JSON array of blocks
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// File to write the records to, truncated if it exists
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Whether the logs should be structured in JSON format
    #[arg(long)]
    pub json_log: bool,

    /// Interval between progress reports in seconds
    #[arg(long, value_name = "SECS", value_parser = value_parser!(u64).range(1..), default_value_t = 5)]
    pub report_interval: u64,
}


impl Cli {
    /// Parses the process arguments.
    ///
    /// Unlike [Parser::parse], usage errors terminate the process with status 1.
    pub fn parse_or_exit(name: &'static str, about: &'static str) -> Self {
        let command = Self::command()
            .name(name)
            .bin_name(name)
            .about(about);

        let result = command
            .try_get_matches()
            .and_then(|matches| Self::from_arg_matches(&matches));

        match result {
            Ok(cli) => cli,
            Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                err.exit()
            },
            Err(err) => {
                let _ = err.print();
                std::process::exit(1)
            }
        }
    }
}


pub fn init_logging(json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::builder().parse_lossy(
        std::env::var(tracing_subscriber::EnvFilter::DEFAULT_ENV)
            .unwrap_or("info".to_string()),
    );

    if json || !std::io::stderr().is_terminal() {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .json()
            .with_current_span(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .init();
    }
}


/// Streams `args.input` through `format` into a freshly created `args.output`.
pub fn run<F: RecordFormat>(args: &Cli, format: F) -> anyhow::Result<SinkStats> {
    let source = BlockSource::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;

    let output = File::create(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;

    let out = BufWriter::with_capacity(WRITE_BUFFER_SIZE, output);

    let stats = Sink::new(format)
        .with_report_interval(Duration::from_secs(args.report_interval))
        .write(source, out)
        .with_context(|| format!(
            "failed to convert {} into {}",
            args.input.display(),
            args.output.display()
        ))?;

    Ok(stats)
}
