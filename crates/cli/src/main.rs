//! Cache simulator CLI.
//!
//! This binary replays a valgrind memory trace against a set-associative LRU cache. It performs:
//! 1. **Configuration:** Cache organization from `-s/-E/-b`, optionally layered over a JSON file (`-c`).
//! 2. **Replay:** Streams the trace given by `-t`, echoing each record's outcome with `-v`.
//! 3. **Reporting:** Prints `hits:H misses:M evictions:E`, a full report (`--stats`), or JSON (`--json`).

use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use csim_core::config::{Config, OrganizationSpec};
use csim_core::sim::simulate_file;

/// Environment variable holding the log filter (e.g. `CSIM_LOG=debug`).
const LOG_ENV: &str = "CSIM_LOG";

#[derive(Parser, Debug)]
#[command(
    name = "csim",
    author,
    version,
    about = "Trace-driven set-associative cache simulator",
    long_about = "Replay a valgrind memory trace against an LRU cache with 2^s sets of E lines and 2^b-byte blocks.\n\nExamples:\n  csim -s 4 -E 1 -b 4 -t traces/yi.trace\n  csim -v -s 1 -E 2 -b 4 -t traces/lackey.trace\n  csim -c cache.json -t traces/yi.trace --json"
)]
struct Cli {
    /// Number of set index bits (the cache has 2^s sets).
    #[arg(short = 's', value_name = "s")]
    set_index_bits: Option<u32>,

    /// Number of lines per set (associativity).
    #[arg(short = 'E', value_name = "E")]
    lines_per_set: Option<u32>,

    /// Number of block offset bits (blocks are 2^b bytes).
    #[arg(short = 'b', value_name = "b")]
    block_offset_bits: Option<u32>,

    /// Trace file to replay.
    #[arg(short = 't', value_name = "tracefile")]
    trace: Option<PathBuf>,

    /// Print every record followed by its hit/miss/eviction outcome.
    #[arg(short = 'v', long)]
    verbose: bool,

    /// JSON config file; command-line flags override its values.
    #[arg(short = 'c', long, value_name = "config.json")]
    config: Option<PathBuf>,

    /// Print the final counters as JSON instead of the summary line.
    #[arg(long, conflicts_with = "stats")]
    json: bool,

    /// Print the full statistics report instead of the summary line.
    #[arg(long)]
    stats: bool,
}

impl Cli {
    /// Organization parameters given on the command line.
    const fn organization_overrides(&self) -> OrganizationSpec {
        OrganizationSpec {
            set_index_bits: self.set_index_bits,
            lines_per_set: self.lines_per_set,
            block_offset_bits: self.block_offset_bits,
        }
    }

    /// Builds the effective configuration: file values (if any) overridden by flags.
    fn resolve_config(&self) -> Result<Config, csim_core::common::ConfigError> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)?,
            None => Config::default(),
        };
        config.cache = config.cache.merge(self.organization_overrides());
        config.general.verbose |= self.verbose;
        if let Some(trace) = &self.trace {
            config.general.trace_path = Some(trace.clone());
        }
        Ok(config)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Validates the configuration, replays the trace, and writes the results to `out`.
///
/// Nothing is written when the configuration is invalid or the trace cannot be opened.
fn run(cli: &Cli, out: &mut impl Write) -> Result<(), Box<dyn Error>> {
    let config = cli.resolve_config()?;
    let org = config.cache.resolve()?;
    let trace_path = config.trace_path()?;
    let verbose = config.general.verbose;

    let mut echoed = Ok(());
    let stats = simulate_file(org, trace_path, |line, report| {
        if verbose && echoed.is_ok() {
            echoed = writeln!(out, "{}", report.verbose_line(&line.text));
        }
    })?;
    echoed?;

    if cli.json {
        writeln!(out, "{}", stats.to_json()?)?;
    } else if cli.stats {
        stats.write_report(out)?;
    } else {
        writeln!(out, "{}", stats.summary_line())?;
    }
    Ok(())
}

/// Writes `error: <message>` followed by one `caused by:` line per source.
fn report_error(err: &dyn Error, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "error: {err}")?;
    let mut source = err.source();
    while let Some(cause) = source {
        writeln!(out, "  caused by: {cause}")?;
        source = cause.source();
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(&cli, &mut io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let _ = report_error(&*e, &mut io::stderr().lock());
            ExitCode::FAILURE
        }
    }
}
