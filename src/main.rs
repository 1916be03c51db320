use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use limiter::config::RateRules;
use limiter::ratelimit::{GlobalRate, ScopedRate};

/// limiter - validate and inspect rate limit rules
#[derive(Parser, Debug)]
#[command(name = "limiter")]
#[command(version)]
#[command(about = "Validate and inspect rate limit rules", long_about = None)]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a rules file and print every rate with a fresh deadline
    Check {
        /// Rules file (YAML, TOML or JSON)
        file: PathBuf,

        /// Print rates as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the limit that applies to a path and method (-1 if none)
    Lookup {
        /// Rules file (YAML, TOML or JSON)
        file: PathBuf,

        #[arg(long)]
        path: String,

        #[arg(long)]
        method: String,
    },

    /// Parse a single rate definition
    Parse {
        /// Period command, e.g. 10-M
        command: String,

        #[arg(long)]
        limit: i64,

        /// Bind the rate to a path (requires --method)
        #[arg(long, requires = "method")]
        path: Option<String>,

        /// Bind the rate to an HTTP method (requires --path)
        #[arg(long, requires = "path")]
        method: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.command {
        Commands::Check { file, json } => {
            let mut rules = RateRules::from_file(&file)?;
            rules.update_deadlines();
            info!(file = %file.display(), "Rules are valid");

            if json {
                let output = json!({
                    "global": rules.global.as_ref().map(global_json),
                    "rates": rules.registry.iter().map(scoped_json).collect::<Vec<_>>(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                if let Some(global) = &rules.global {
                    println!(
                        "global: {} (until {})",
                        global,
                        deadline_text(global.deadline_display())
                    );
                }
                for rate in &rules.registry {
                    println!("{} (until {})", rate, deadline_text(rate.deadline_display()));
                }
            }
        }
        Commands::Lookup { file, path, method } => {
            let rules = RateRules::from_file(&file)?;
            println!("{}", rules.limit_for(&path, &method));
        }
        Commands::Parse {
            command,
            limit,
            path,
            method,
        } => match (path, method) {
            (Some(path), Some(method)) => {
                let rate = ScopedRate::parse(&path, &command, &method, limit)?;
                println!("{}", serde_json::to_string_pretty(&scoped_json(&rate))?);
            }
            _ => {
                let rate = GlobalRate::parse(&command, limit)?;
                println!("{}", serde_json::to_string_pretty(&global_json(&rate))?);
            }
        },
    }

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn deadline_text(display: Option<String>) -> String {
    display.unwrap_or_else(|| "unset".to_string())
}

fn global_json(rate: &GlobalRate) -> Value {
    json!({
        "command": rate.command(),
        "period_secs": rate.period().as_secs(),
        "limit": rate.limit(),
        "deadline": rate.deadline(),
        "deadline_display": rate.deadline_display(),
    })
}

fn scoped_json(rate: &ScopedRate) -> Value {
    json!({
        "path": rate.path(),
        "method": rate.method(),
        "command": rate.command(),
        "period_secs": rate.period().as_secs(),
        "limit": rate.limit(),
        "deadline": rate.deadline(),
        "deadline_display": rate.deadline_display(),
    })
}
