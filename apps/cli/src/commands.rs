//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use hostfilter_core::pipeline::{FilterReport, ProgressReporter, RunConfig, RunOutcome};
use hostfilter_merge::MergeConfig;
use hostfilter_shared::{AppConfig, FilterConfig, default_output_path, init_config, load_config, load_config_from};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::prompt::{PromptPaths, ask_folder};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// hostfilter — find the machines that still need the monitoring agent.
#[derive(Parser)]
#[command(
    name = "hostfilter",
    version,
    about = "Remove hosts already running the monitoring agent from an inventory CSV.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.hostfilter/hostfilter.toml.
    #[arg(long, env = "HOSTFILTER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Filter an inventory CSV, dropping every host that runs the agent.
    Filter(FilterArgs),

    /// Concatenate all files in a folder into one Markdown-delimited file.
    Merge {
        /// Folder to merge (prompted for if omitted).
        dir: Option<PathBuf>,

        /// Output file (defaults to [merge].output_file).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Never prompt; missing arguments cancel the command.
        #[arg(long)]
        no_prompt: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments for `hostfilter filter`.
#[derive(clap::Args)]
pub(crate) struct FilterArgs {
    /// Inventory CSV to read (prompted for if omitted).
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Where to write the filtered CSV (prompted for if omitted; blank uses the default).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Substring of the process name that marks a host as covered.
    #[arg(long)]
    pub marker: Option<String>,

    /// Header of the process name column.
    #[arg(long)]
    pub name_column: Option<String>,

    /// Header of the IP column.
    #[arg(long)]
    pub ip_column: Option<String>,

    /// Header of the host name column.
    #[arg(long)]
    pub hostname_column: Option<String>,

    /// Encoding of the input file (e.g. windows-1252, utf-8).
    #[arg(long)]
    pub input_encoding: Option<String>,

    /// Encoding of the written file.
    #[arg(long)]
    pub output_encoding: Option<String>,

    /// Never prompt; a missing --input cancels and a missing --output uses the default.
    #[arg(long)]
    pub no_prompt: bool,

    /// Print the run report as JSON on stdout.
    #[arg(long)]
    pub json: bool,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "hostfilter=info",
        1 => "hostfilter=debug",
        _ => "hostfilter=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    match cli.command {
        Command::Filter(args) => cmd_filter(&config, args),
        Command::Merge {
            dir,
            output,
            no_prompt,
        } => cmd_merge(&config, dir, output, no_prompt),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

/// Apply CLI overrides on top of the configured filter settings.
fn filter_config(config: &AppConfig, args: &FilterArgs) -> FilterConfig {
    let mut filter = FilterConfig::from(config);
    if let Some(marker) = &args.marker {
        filter.marker = marker.clone();
    }
    if let Some(col) = &args.name_column {
        filter.columns.name = col.clone();
    }
    if let Some(col) = &args.ip_column {
        filter.columns.ip = col.clone();
    }
    if let Some(col) = &args.hostname_column {
        filter.columns.host_name = col.clone();
    }
    if let Some(enc) = &args.input_encoding {
        filter.input_encoding = enc.clone();
    }
    if let Some(enc) = &args.output_encoding {
        filter.output_encoding = enc.clone();
    }
    filter
}

fn cmd_filter(config: &AppConfig, args: FilterArgs) -> Result<()> {
    let run_config = RunConfig {
        filter: filter_config(config, &args),
        default_output: default_output_path(config),
    };

    info!(
        marker = %run_config.filter.marker,
        default_output = %run_config.default_output.display(),
        "filtering inventory"
    );

    let reporter = CliProgress::new();
    let paths = PromptPaths::new(args.input.clone(), args.output.clone(), !args.no_prompt)
        .with_spinner(reporter.spinner.clone());

    let outcome = hostfilter_core::pipeline::run_filter(&run_config, &paths, &reporter);
    reporter.spinner.finish_and_clear();

    let report = match outcome? {
        RunOutcome::Cancelled => {
            println!("No file selected. Exiting.");
            return Ok(());
        }
        RunOutcome::Written(report) => report,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let stats = &report.stats;
    println!("Filtered CSV saved to: {}", report.output.display());
    println!();
    println!("  Rows read:       {}", stats.input_rows);
    println!("  Agent hosts:     {}", stats.excluded_hosts);
    println!("  Rows excluded:   {}", stats.excluded_rows);
    println!("  Duplicate rows:  {}", stats.duplicate_rows);
    println!("  Rows written:    {}", stats.output_rows);
    println!("  Time:            {:.1}s", report.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_merge(
    config: &AppConfig,
    dir: Option<PathBuf>,
    output: Option<PathBuf>,
    no_prompt: bool,
) -> Result<()> {
    let Some(source_dir) = dir.or_else(|| ask_folder(!no_prompt)) else {
        println!("No folder selected. Exiting.");
        return Ok(());
    };

    let output = output.unwrap_or_else(|| PathBuf::from(&config.merge.output_file));

    info!(source = %source_dir.display(), output = %output.display(), "merging folder");

    let report = hostfilter_merge::merge_folder(&MergeConfig { source_dir, output })?;

    println!(
        "Files merged successfully into '{}' ({} files).",
        report.output.display(),
        report.files_merged
    );
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _report: &FilterReport) {
        self.spinner.finish_and_clear();
    }
}
