//! rundebug CLI - inspect runtime debug settings and try out bisect patterns.
//!
//! # Commands
//!
//! - `rundebug get <name>...` - Show the current value of settings
//! - `rundebug list` - List every entry of the settings string
//! - `rundebug check <pattern>` - Parse a bisect pattern and show what it selects
//! - `rundebug demo` - Run a small program with a deliberately buggy setting
//! - `rundebug metrics` - Export the non-default counters
//! - `rundebug completions` - Generate shell completions

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use colored::Colorize;
use rundebug_config::{EnvLoader, RunDebugConfig};
use rundebug_log::Level;
use std::io;
use std::path::PathBuf;

mod commands;
mod error;

use commands::{Context, check, demo, get, list, metrics};
use error::CliResult;

/// rundebug CLI - runtime debug settings tools
#[derive(Parser)]
#[command(name = "rundebug")]
#[command(author = "Pegasus Heavy Industries LLC")]
#[command(version)]
#[command(about = "Inspect runtime debug settings and test bisect patterns")]
#[command(long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = format!(
    "{}\n  {} RUNDEBUG=http2client=0 rundebug get http2client\n  {} rundebug check 'buggy:+3+4' --sites 10\n  {} RUNDEBUG=bisect=buggy:v@bug rundebug demo",
    "Examples:".bright_cyan().bold(),
    "$".dimmed(),
    "$".dimmed(),
    "$".dimmed(),
))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (.toml, .json or .env)
    #[arg(short, long, global = true, env = "RUNDEBUG_CLI_CONFIG")]
    config: Option<PathBuf>,

    /// Load variables from this .env file before reading settings
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current value of one or more settings
    #[command(alias = "g")]
    Get(GetArgs),

    /// List every entry of the settings string
    #[command(alias = "ls")]
    List(ListArgs),

    /// Parse a bisect pattern and show which sites it selects
    #[command(alias = "c")]
    Check(CheckArgs),

    /// Run a small program whose `buggy` setting misbehaves on some lines
    Demo(DemoArgs),

    /// Export non-default counters
    #[command(alias = "m")]
    Metrics(MetricsArgs),

    /// Generate shell completions
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
struct GetArgs {
    /// Setting names; a leading '#' marks an internal setting
    #[arg(required = true)]
    names: Vec<String>,

    /// Print bare values instead of name=value
    #[arg(short, long)]
    raw: bool,

    /// Print JSON
    #[arg(long, conflicts_with = "raw")]
    json: bool,
}

#[derive(Args)]
struct ListArgs {
    /// Print JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct CheckArgs {
    /// Directive (`[!]name:rule`) or, with --inline, a bare rule
    pattern: String,

    /// Treat the pattern as an inline rule (the part after '#')
    #[arg(long)]
    inline: bool,

    /// Setting the checks belong to; defaults to the directive's own
    #[arg(short, long)]
    setting: Option<String>,

    /// Number of ordinal call sites to evaluate
    #[arg(short = 'n', long, default_value = "10")]
    sites: u64,

    /// Additional labelled sites to evaluate
    #[arg(short, long = "label")]
    labels: Vec<String>,
}

#[derive(Args)]
struct DemoArgs {
    /// Loop iterations
    #[arg(short = 'n', long, default_value = "10")]
    iterations: u32,
}

#[derive(Args)]
struct MetricsArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: MetricsFormat,

    /// Register these settings before exporting
    #[arg(short, long = "register")]
    register: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum MetricsFormat {
    /// One `path value` line per counter
    Text,
    /// JSON object keyed by path
    Json,
    /// Prometheus exposition format
    Prometheus,
}

impl From<MetricsFormat> for metrics::Format {
    fn from(format: MetricsFormat) -> Self {
        match format {
            MetricsFormat::Text => metrics::Format::Text,
            MetricsFormat::Json => metrics::Format::Json,
            MetricsFormat::Prometheus => metrics::Format::Prometheus,
        }
    }
}

fn load_config(cli: &Cli) -> CliResult<RunDebugConfig> {
    RunDebugConfig::load_dotenv(cli.env_file.as_deref())?;
    let config = match &cli.config {
        Some(path) => RunDebugConfig::from_file(path)?,
        None => RunDebugConfig::default(),
    };
    Ok(config.with_env(&EnvLoader::default())?)
}

fn run(cli: Cli) -> CliResult<()> {
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        generate(*shell, &mut cmd, "rundebug", &mut io::stdout());
        return Ok(());
    }

    let ctx = Context::new(load_config(&cli)?)?;

    match cli.command {
        Commands::Get(args) => get::run(&ctx, &args.names, get::Output::new(args.raw, args.json)),
        Commands::List(args) => list::run(&ctx, args.json),
        Commands::Check(args) => check::run(&check::CheckOptions {
            pattern: args.pattern,
            inline: args.inline,
            setting: args.setting,
            sites: args.sites,
            labels: args.labels,
        }),
        Commands::Demo(args) => demo::run(&ctx, args.iterations, cli.quiet),
        Commands::Metrics(args) => metrics::run(&ctx, &args.register, args.format.into()),
        Commands::Completions { .. } => Ok(()),
    }
}

fn main() {
    let cli = Cli::parse();

    rundebug_log::init();
    if cli.no_color {
        colored::control::set_override(false);
        rundebug_log::set_color(false);
    }
    if cli.verbose {
        rundebug_log::set_debug(true);
    } else if cli.quiet {
        rundebug_log::set_level(Level::Error);
    }

    if let Err(e) = run(cli) {
        eprintln!("\n  {} {}\n", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
