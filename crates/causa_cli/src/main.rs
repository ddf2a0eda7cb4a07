//! CAUSA CLI
//!
//! Build causal chains from the command line and post them through an
//! event bus.

#![warn(missing_docs)]
#![warn(clippy::all)]

use causa_core::{CausalChain, Element};
use causa_event::{BusConfig, Event, EventBus, install_event_manager};
use clap::{Parser, Subcommand};
use color_eyre::Result;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "causa")]
#[command(about = "CAUSA - causal chains for events", long_about = None)]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a chain and print it
    Chain {
        /// Causes, root first; repeated words are the same object
        #[arg(required = true)]
        elements: Vec<String>,
        /// Keep adjacent repeats instead of collapsing them
        #[arg(long)]
        raw: bool,
    },
    /// Build a chain and post it as a trace event
    Post {
        /// Causes, root first; repeated words are the same object
        #[arg(required = true)]
        elements: Vec<String>,
        /// Bus configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Keep adjacent repeats instead of collapsing them
        #[arg(long)]
        raw: bool,
    },
}

/// Event posted by `causa post`
struct TraceEvent {
    cause: CausalChain,
}

impl Event for TraceEvent {
    fn cause(&self) -> &CausalChain {
        &self.cause
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// One element per distinct word, so repeats are identical
fn intern(words: Vec<String>) -> Vec<Element> {
    let mut seen: HashMap<String, Element> = HashMap::new();
    words
        .into_iter()
        .map(|word| {
            seen.entry(word.clone())
                .or_insert_with(|| Element::new(word))
                .clone()
        })
        .collect()
}

fn build_chain(words: Vec<String>, raw: bool) -> Result<CausalChain> {
    let elements = intern(words);
    let chain = if raw {
        CausalChain::of_vec(elements)?
    } else {
        CausalChain::of_iter(elements)?
    };
    Ok(chain)
}

fn load_config(path: Option<PathBuf>) -> Result<BusConfig> {
    let Some(path) = path else {
        tracing::debug!("using default bus config");
        return Ok(BusConfig::default());
    };
    let config = BusConfig::from_file(&path)?;
    tracing::info!(path = %path.display(), fail_fast = config.fail_fast, "loaded bus config");
    Ok(config)
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match cli.command {
        Commands::Chain { elements, raw } => {
            let chain = build_chain(elements, raw)?;
            println!("{}", chain);
            println!("root: {}", chain.root());
            println!("length: {}", chain.len());
            Ok(())
        }
        Commands::Post {
            elements,
            config,
            raw,
        } => {
            let bus = Arc::new(EventBus::with_config(load_config(config)?));
            bus.subscribe("printer", |event: &TraceEvent| {
                println!("received {}", event.cause());
                Ok(())
            })?;
            install_event_manager(bus.clone())?;

            let event = TraceEvent {
                cause: build_chain(elements, raw)?,
            }
            .post();

            let stats = bus.stats();
            tracing::info!(
                root = %event.cause().root(),
                delivered = stats.delivered,
                failed = stats.failed,
                "trace event posted"
            );
            println!("root: {}", event.cause().root());
            println!(
                "posted: {}, delivered: {}, failed: {}",
                stats.posted, stats.delivered, stats.failed
            );
            Ok(())
        }
    }
}
