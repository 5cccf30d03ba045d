use anyhow::{bail, Context, Result};
use auditgate::{
    analyze_with,
    audit::AuditRunner,
    config::Config,
    expiry::parse_utc,
    output::{format_result_to_string, log_summary, print_result, OutputFormat},
    AnalysisOptions,
};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const FAILURE: u8 = 1;
}

#[derive(Parser)]
#[command(name = "auditgate")]
#[command(
    author,
    version,
    about = "Fail CI on high or critical dependency advisories that are not allowlisted"
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the default lookup
    #[arg(long = "config", global = true)]
    config_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze an audit report against the allowlist
    Check {
        /// Read the audit report from this file instead of running the package manager
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Allowlist file (defaults to the configured allowlist path)
        #[arg(short, long)]
        allowlist: Option<PathBuf>,

        /// Output format (table, json)
        #[arg(short, long)]
        format: Option<String>,

        /// Flag allowlist entries expiring within this many days
        #[arg(long)]
        expiring_days: Option<i64>,

        /// Write the JSON result to a file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Evaluate expiry as of this date (YYYY-MM-DD or RFC 3339) instead of now
        #[arg(long)]
        now: Option<String>,
    },

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!(error = %e, "audit check failed");
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::FAILURE)
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    let config = match &cli.config_file {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Check {
            report,
            allowlist,
            format,
            expiring_days,
            output,
            now,
        } => {
            let format_str = format.unwrap_or_else(|| config.default_format.clone());
            let format = OutputFormat::from_str(&format_str).map_err(|e| anyhow::anyhow!(e))?;

            let now = match now {
                Some(value) => parse_utc(&value)
                    .with_context(|| format!("Invalid --now value: {}", value))?,
                None => Utc::now(),
            };

            let options = AnalysisOptions {
                expiring_threshold_days: expiring_days.unwrap_or(config.expiring_threshold_days),
            };
            if options.expiring_threshold_days < 0 {
                bail!("--expiring-days must be zero or greater");
            }

            run_check(CheckArgs {
                config: &config,
                report,
                allowlist,
                format,
                output,
                now,
                options,
            })
        }
        Commands::Config { init, path } => {
            handle_config(init, path)?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

struct CheckArgs<'a> {
    config: &'a Config,
    report: Option<PathBuf>,
    allowlist: Option<PathBuf>,
    format: OutputFormat,
    output: Option<PathBuf>,
    now: DateTime<Utc>,
    options: AnalysisOptions,
}

fn run_check(args: CheckArgs<'_>) -> Result<u8> {
    let is_interactive = args.format == OutputFormat::Table;

    let raw_report = match &args.report {
        Some(path) => read_file(path, "audit report")?,
        None => run_audit(args.config, is_interactive)?,
    };

    let raw_allowlist = load_allowlist(args.allowlist.as_deref(), args.config)?;

    let result = analyze_with(
        &raw_report,
        raw_allowlist.as_deref(),
        args.now,
        &args.options,
    )?;

    log_summary(&result);

    if let Some(path) = &args.output {
        std::fs::write(path, format_result_to_string(&result)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if is_interactive {
            println!("Results written to: {}", path.display());
        }
    }
    print_result(&result, args.format)?;

    if result.is_successful {
        Ok(exit_codes::SUCCESS)
    } else {
        Ok(exit_codes::FAILURE)
    }
}

fn run_audit(config: &Config, is_interactive: bool) -> Result<String> {
    let runner = AuditRunner::from_config(config);
    tracing::debug!(program = %config.npm_command, args = ?runner.args(), "running audit");

    let progress = if is_interactive {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Running {} audit...", config.npm_command));
        Some(pb)
    } else {
        None
    };

    let result = runner.run();

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    result
}

/// Reads the allowlist text, or `None` when no allowlist applies.
///
/// An explicit path must exist. The configured default path is optional.
fn load_allowlist(explicit: Option<&Path>, config: &Config) -> Result<Option<String>> {
    if let Some(path) = explicit {
        return read_file(path, "allowlist").map(Some);
    }

    let default_path = PathBuf::from(&config.allowlist_path);
    if default_path.exists() {
        tracing::debug!(path = %default_path.display(), "using configured allowlist");
        read_file(&default_path, "allowlist").map(Some)
    } else {
        tracing::debug!(path = %default_path.display(), "no allowlist found");
        Ok(None)
    }
}

fn read_file(path: &Path, what: &str) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} {}", what, path.display()))
}

fn handle_config(init: bool, show_path: bool) -> Result<()> {
    let config_path = Config::config_path();

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        let config = Config::default();
        config.save()?;
        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
        return Ok(());
    }

    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        println!("Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("No config file found.");
        println!("Run 'auditgate config --init' to create one.");
        println!();
        println!("Config path: {}", config_path.display());
    }

    Ok(())
}
