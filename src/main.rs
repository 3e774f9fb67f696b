mod commands;
mod core;
mod forms;
mod graph;
mod plugin;
mod score;
mod store;
mod utils;

use clap::{Args, Parser, Subcommand};
use crate::core::config::ImpactConfig;
use crate::core::context::{AnalysisContext, TopologySource};
use crate::core::error::{ImpactError, ImpactResult, print_error};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Analyze the impact of device outages on circuits
#[derive(Parser)]
#[command(name = "netbox-impact")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  #[command(flatten)]
  source: SourceArgs,

  /// Path to impact.toml (default: search the current directory)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Log debug output to stderr (RUST_LOG overrides)
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Args)]
struct SourceArgs {
  /// Read the topology from a JSON snapshot file
  #[arg(long, global = true, conflicts_with = "netbox_url")]
  snapshot: Option<PathBuf>,

  /// Read the topology from a NetBox instance (root URL, without /api)
  #[arg(long, global = true)]
  netbox_url: Option<String>,

  /// NetBox API token
  #[arg(long, global = true, env = "NETBOX_TOKEN", hide_env_values = true)]
  netbox_token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
  // ============================================================================
  // Inspection
  // ============================================================================
  /// Show the plugin manifest
  Manifest {
    /// Output the manifest in JSON format
    #[arg(long)]
    json: bool,
  },

  /// List the devices that can be selected for analysis
  Devices {
    /// Only show devices whose name contains this (or whose id equals it)
    #[arg(long)]
    filter: Option<String>,
    /// Output choices in JSON format
    #[arg(long)]
    json: bool,
  },

  // ============================================================================
  // Analysis
  // ============================================================================
  /// Show which circuits are impacted if the given devices go down
  Analyze {
    /// Device ids (comma-separated or repeated)
    #[arg(long, num_args = 0.., value_name = "IDS")]
    devices: Vec<String>,
    /// Propagation mode: direct (default), transitive
    #[arg(long)]
    mode: Option<String>,
    /// Output format: text (default), json, names-only
    #[arg(long, default_value = "text")]
    format: String,
    /// Also compute the weighted impact score
    #[arg(long)]
    score: bool,
    /// Impact type used for --score
    #[arg(long, requires = "score")]
    impact_type: Option<String>,
  },

  /// Compute a weighted impact score
  Score {
    /// Device ids (comma-separated or repeated)
    #[arg(long, num_args = 0.., value_name = "IDS")]
    devices: Vec<String>,
    /// Circuit ids (comma-separated or repeated)
    #[arg(long, num_args = 0.., value_name = "IDS")]
    circuits: Vec<String>,
    /// Interface ids (comma-separated or repeated)
    #[arg(long, num_args = 0.., value_name = "IDS")]
    interfaces: Vec<String>,
    /// Read ids from a JSON request: {"device_ids":[..],"circuit_ids":[..],"interface_ids":[..],"impact_type":".."}
    #[arg(long, value_name = "FILE", conflicts_with_all = ["devices", "circuits", "interfaces"])]
    request: Option<PathBuf>,
    /// planned-work, fiber-works, electrical-work or incident-work
    #[arg(long)]
    impact_type: Option<String>,
    /// Output the score in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Pick devices, circuits and interfaces at prompts, then analyze and score
  Interactive,
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_logging(verbose: bool) {
  let default_level = if verbose { "netbox_impact=debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  tracing_subscriber::registry()
    .with(filter)
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
    .init();
}

fn load_config(path: Option<&PathBuf>) -> ImpactResult<ImpactConfig> {
  match path {
    Some(path) => ImpactConfig::load_from(path),
    None => {
      let cwd = std::env::current_dir().map_err(|e| ImpactError::message(format!("Failed to get current directory: {}", e)))?;
      ImpactConfig::discover(&cwd)
    }
  }
}

fn run(cli: Cli) -> ImpactResult<()> {
  let command = match cli.command {
    // The manifest needs neither config nor topology
    Commands::Manifest { json } => return commands::run_manifest(json),
    command => command,
  };

  let config = load_config(cli.config.as_ref())?;
  let source = TopologySource::resolve(
    cli.source.snapshot,
    cli.source.netbox_url,
    cli.source.netbox_token,
    &config,
  )?;

  // Build the context once (loads config + topology) and share it
  let ctx = AnalysisContext::build(&source, config)?;

  match command {
    Commands::Manifest { json } => commands::run_manifest(json),
    Commands::Devices { filter, json } => commands::run_devices(&ctx, filter, json),
    Commands::Analyze {
      devices,
      mode,
      format,
      score,
      impact_type,
    } => commands::run_analyze(&ctx, devices, mode, format, score, impact_type),
    Commands::Score {
      devices,
      circuits,
      interfaces,
      request,
      impact_type,
      json,
    } => commands::run_score(&ctx, devices, circuits, interfaces, request, impact_type, json),
    Commands::Interactive => commands::run_interactive(&ctx),
  }
}

fn main() {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  if let Err(err) = run(cli) {
    handle_error(err);
  }
}

fn handle_error(err: ImpactError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
