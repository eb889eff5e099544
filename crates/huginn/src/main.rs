//! huginn: trace what your middleware does
//!
//! Runs a small counter pipeline through the instrumentation decorator and
//! prints the spans and events it produced.

mod config;
mod demo;
mod render;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use huginn_middleware::SinkKind;
use huginn_middleware::sink::LOG_TARGET;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use config::Config;
use demo::CounterAction;

/// Trace inbound actions and middleware effects
#[derive(Parser)]
#[command(name = "huginn")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to .huginn directory (default: search for .huginn/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the demo counter pipeline and print its trace
    Run {
        /// Label prefixed to span messages
        #[arg(long)]
        label: Option<String>,

        /// Where spans go: collector, log (DEBUG records on stderr) or off
        #[arg(long)]
        sink: Option<SinkKind>,

        /// Comma-separated actions, e.g. `increment,add:5,reset`
        #[arg(long, value_delimiter = ',')]
        actions: Option<Vec<String>>,

        /// Print the trace as JSON instead of an outline
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration
    Config,
}

/// Level filter for the CLI.
///
/// The signpost target stays at DEBUG so `--sink log` prints its spans
/// without `--verbose`.
fn log_filter(verbose: bool) -> EnvFilter {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    match format!("{LOG_TARGET}=debug").parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

/// Logs go to stderr so stdout only carries the trace.
fn init_logging(verbose: bool) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(log_filter(verbose))
        .init();
}

fn parse_actions(actions: &[String]) -> Result<Vec<CounterAction>> {
    actions
        .iter()
        .map(|action| {
            action
                .trim()
                .parse::<CounterAction>()
                .map_err(anyhow::Error::msg)
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Run {
            label,
            sink,
            actions,
            json,
        } => {
            if let Some(label) = label {
                config.instrumentation.label = label;
            }
            if let Some(sink) = sink {
                config.instrumentation.sink = sink;
            }
            if let Some(actions) = actions {
                config.demo.actions = actions;
            }

            let errors = config.validate();
            if !errors.is_empty() {
                for error in &errors {
                    tracing::error!("{error}");
                }
                bail!("Invalid configuration ({} error(s))", errors.len());
            }

            let actions = parse_actions(&config.demo.actions)?;
            let delay = Duration::from_millis(config.demo.autosave_delay_ms);
            info!(
                actions = actions.len(),
                sink = ?config.instrumentation.sink,
                "Running demo pipeline"
            );

            let (state, trace) = huginn_tracing::with_tracing(async {
                huginn_tracing::add_metadata("label", &config.instrumentation.label);
                huginn_tracing::add_metadata("sink", config.instrumentation.sink);
                demo::run(&actions, delay, &config.instrumentation).await
            })
            .await;
            let state = state?;
            info!(value = state.value, saved = ?state.saved, "Pipeline finished");

            if json {
                println!("{}", serde_json::to_string_pretty(&trace)?);
            } else {
                print!("{}", render::outline(&trace));
                println!("final value: {}", state.value);
            }
        }
        Commands::Config => {
            print!(
                "{}",
                toml::to_string_pretty(&config).context("Failed to serialize configuration")?
            );
        }
    }

    Ok(())
}
