use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use concat_bench::config::{DEFAULT_BIND_ADDR, DEFAULT_CAPACITY_HINT, DEFAULT_REQUEST_ID};
use concat_bench::{CountingAllocator, Result};

// Import handler modules
mod handlers;

#[global_allocator]
static ALLOCATOR: CountingAllocator = CountingAllocator::system();

#[derive(Parser)]
#[command(name = "strbench")]
#[command(about = "String concatenation benchmarks - compare ways of building a short log line", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Append debug logs to this file
    #[arg(long, value_name = "PATH", global = true)]
    debug_log: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure one or more strategies (all when none are given)
    #[command(aliases = &["r", "bench"])]
    Run(RunArgs),

    /// List available strategies
    #[command(aliases = &["ls", "l"])]
    List,

    /// Print one line built by each strategy, without measuring
    #[command(aliases = &["s"])]
    Sample(SampleArgs),

    /// List saved reports
    #[command(aliases = &["history", "h"])]
    Reports {
        /// Limit number of reports to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show a saved report
    Show {
        /// Run ID (supports prefix matching)
        run_id: String,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Strategies to measure: append, write, format, bytes, builder
    pub strategies: Vec<String>,

    /// Fixed iteration count (skips calibration)
    #[arg(short = 'n', long)]
    pub iterations: Option<u64>,

    /// Seconds each strategy should run when calibrating
    #[arg(long, env = "STRBENCH_BENCHTIME", default_value = "1")]
    pub benchtime: String,

    /// Upper bound for calibrated iteration counts
    #[arg(long, default_value_t = concat_bench::config::DEFAULT_MAX_ITERATIONS)]
    pub max_iterations: u64,

    /// Request id placed at the start of each line
    #[arg(long, default_value = DEFAULT_REQUEST_ID)]
    pub id: String,

    /// Address the setup listener binds to
    #[arg(long, default_value = DEFAULT_BIND_ADDR)]
    pub bind: String,

    /// Initial capacity of the byte buffer used by the `bytes` strategy
    #[arg(long, default_value_t = DEFAULT_CAPACITY_HINT)]
    pub capacity: usize,

    /// Do not report allocations
    #[arg(long)]
    pub no_allocs: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Save the report under $STRBENCH_HOME/reports
    #[arg(long)]
    pub save: bool,
}

impl Default for RunArgs {
    fn default() -> Self {
        RunArgs {
            strategies: Vec::new(),
            iterations: None,
            benchtime: "1".to_string(),
            max_iterations: concat_bench::config::DEFAULT_MAX_ITERATIONS,
            id: DEFAULT_REQUEST_ID.to_string(),
            bind: DEFAULT_BIND_ADDR.to_string(),
            capacity: DEFAULT_CAPACITY_HINT,
            no_allocs: false,
            json: false,
            save: false,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct SampleArgs {
    /// Strategies to sample (all when none are given)
    pub strategies: Vec<String>,

    /// Pin the timestamp (RFC 3339, e.g. 2024-01-15T10:30:00Z)
    #[arg(long)]
    pub at: Option<String>,

    /// Use this address text instead of binding a listener
    #[arg(long)]
    pub addr: Option<String>,

    /// Request id placed at the start of each line
    #[arg(long, default_value = DEFAULT_REQUEST_ID)]
    pub id: String,

    /// Address the setup listener binds to
    #[arg(long, default_value = DEFAULT_BIND_ADDR)]
    pub bind: String,

    /// Initial capacity of the byte buffer used by the `bytes` strategy
    #[arg(long, default_value_t = DEFAULT_CAPACITY_HINT)]
    pub capacity: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    concat_bench::logging::init(cli.verbose, cli.debug_log.as_deref())?;

    match cli.command {
        Some(Commands::Run(args)) => {
            handlers::handle_run(args)?;
        }
        Some(Commands::List) => {
            handlers::handle_list_strategies();
        }
        Some(Commands::Sample(args)) => {
            handlers::handle_sample(args)?;
        }
        Some(Commands::Reports { limit }) => {
            handlers::handle_list_reports(limit)?;
        }
        Some(Commands::Show { run_id, json }) => {
            handlers::handle_show_report(&run_id, json)?;
        }
        None => {
            // Default action: measure everything
            handlers::handle_run(RunArgs::default())?;
        }
    }

    Ok(())
}
