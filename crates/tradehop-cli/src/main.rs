mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use tradehop_cli::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about = "Multi-hop trade route planner")]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Command,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalOptions {
    /// Trade database path (file or directory). Defaults to $TRADEHOP_DB, then
    /// the platform data directory.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find the most profitable multi-hop trade runs.
    Run(RunArgs),
    /// List the stations of a system or station and their filter status.
    Stations(StationsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Starting system or station.
    #[arg(long)]
    pub from: Option<String>,
    /// Final system or station.
    #[arg(long)]
    pub to: Option<String>,
    /// Goal system to work towards; requires --from.
    #[arg(long)]
    pub towards: Option<String>,
    /// Places the route must visit (repeat or comma-separate).
    #[arg(long, value_delimiter = ',')]
    pub via: Vec<String>,
    /// Places or items to avoid (repeat or comma-separate).
    #[arg(long, value_delimiter = ',')]
    pub avoid: Vec<String>,

    /// Cargo capacity in tons.
    #[arg(long)]
    pub capacity: Option<i64>,
    /// Starting credits.
    #[arg(long, alias = "cr")]
    pub credits: i64,
    /// Credits to keep in reserve.
    #[arg(long, alias = "ins", default_value_t = 0)]
    pub insurance: i64,
    /// Maximum light-years per jump when laden.
    #[arg(long = "ly-per", alias = "ly")]
    pub ly_per: Option<f64>,
    /// Maximum light-years per jump when empty; used for --start-jumps/--end-jumps.
    #[arg(long = "empty-ly", alias = "emp")]
    pub empty_ly: Option<f64>,

    /// Number of hops (station to station legs).
    #[arg(long, default_value_t = 2)]
    pub hops: i64,
    /// Maximum jumps per hop.
    #[arg(long = "jumps-per", alias = "jum", default_value_t = 2)]
    pub jumps_per: i64,
    /// Consider stations this many jumps from --from as origins.
    #[arg(long = "start-jumps", short = 's', default_value_t = 0)]
    pub start_jumps: i64,
    /// Consider stations this many jumps from --to as destinations.
    #[arg(long = "end-jumps", short = 'e', default_value_t = 0)]
    pub end_jumps: i64,
    /// Maximum units of any one item per hop.
    #[arg(long)]
    pub limit: Option<i64>,

    /// Maximum age of price data in days.
    #[arg(long = "age", alias = "max-days-old")]
    pub max_age_days: Option<f64>,
    /// Acceptable pad sizes, e.g. "ML" or "L?".
    #[arg(long = "pad-size", short = 'p')]
    pub pad_size: Option<String>,
    /// Only use stations with a known black market.
    #[arg(long = "black-market", alias = "bm")]
    pub black_market: bool,
    /// Percent penalty for stations far from their star.
    #[arg(long = "ls-penalty", alias = "lsp", default_value_t = 0.6)]
    pub ls_penalty: f64,
    /// Ignore stations further than this many light-seconds from their star.
    #[arg(long = "max-ls")]
    pub max_ls: Option<f64>,
    /// Minimum profit per ton.
    #[arg(long = "gain-per-ton", alias = "gpt", default_value_t = 1)]
    pub min_gain_per_ton: i64,
    /// Never revisit a station.
    #[arg(long)]
    pub unique: bool,
    /// Reduce expected gains by this fraction (0 to 0.25).
    #[arg(long, default_value_t = 0.0)]
    pub margin: f64,

    /// Number of routes to show.
    #[arg(long, default_value_t = 1)]
    pub routes: i64,
    /// Keep at most this many routes between hops.
    #[arg(long = "max-routes")]
    pub max_routes: Option<usize>,
    /// Drop routes scoring below this percentage of the best.
    #[arg(long = "prune-score", default_value_t = 0.0)]
    pub prune_score: f64,
    /// First hop at which --prune-score applies.
    #[arg(long = "prune-hops", default_value_t = 3)]
    pub prune_hops: i64,

    /// Print a progress line before each hop.
    #[arg(long)]
    pub progress: bool,
    /// Show the per-hop summary instead of load instructions.
    #[arg(long)]
    pub summary: bool,
    /// Write credits without thousands separators.
    #[arg(long = "plain-credits")]
    pub plain_credits: bool,
    /// Increase detail (-v jumps, -vv station details and data ages).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Args, Debug, Clone)]
pub struct StationsArgs {
    /// System or station name.
    pub place: String,
    /// Acceptable pad sizes, e.g. "ML" or "L?".
    #[arg(long = "pad-size", short = 'p')]
    pub pad_size: Option<String>,
    /// Require a known black market.
    #[arg(long = "black-market", alias = "bm")]
    pub black_market: bool,
    /// Maximum light-seconds from the star.
    #[arg(long = "max-ls")]
    pub max_ls: Option<f64>,
    /// Maximum age of price data in days.
    #[arg(long = "age")]
    pub max_age_days: Option<f64>,
    /// Also list stations that fail the filters.
    #[arg(long)]
    pub all: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match &cli.command {
        Command::Run(args) => commands::run::handle_run(&cli.global, args),
        Command::Stations(args) => commands::stations::handle_stations(&cli.global, args),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
