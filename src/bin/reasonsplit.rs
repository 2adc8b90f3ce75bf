use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use reasonsplit::{ChatConfig, EventEncoder, EventRenderer, RunContext, StreamClassifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// One lifecycle event per line
    Events,
    /// AG-UI events framed as server-sent events
    Sse,
    /// The rendered chat message as JSON
    Message,
}

/// Split a raw model response into reasoning and answer channels
#[derive(Debug, Parser)]
#[command(name = "reasonsplit", version, about)]
struct Args {
    /// File holding the raw response; stdin when omitted
    input: Option<PathBuf>,

    /// YAML chat config (model, markers)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Characters per simulated delta
    #[arg(long, default_value_t = 4)]
    chunk_size: usize,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Events)]
    format: Format,

    /// Thread ID for SSE output
    #[arg(long)]
    thread_id: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    if args.chunk_size == 0 {
        bail!("--chunk-size must be at least 1");
    }

    let config = match &args.config {
        Some(path) => ChatConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ChatConfig::default(),
    };

    let raw = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut raw = String::new();
            io::stdin().read_to_string(&mut raw).context("reading stdin")?;
            raw
        }
    };

    let chars: Vec<char> = raw.chars().collect();
    let mut classifier = StreamClassifier::new(config.markers.clone());
    let mut events = Vec::new();
    for chunk in chars.chunks(args.chunk_size) {
        let delta: String = chunk.iter().collect();
        events.extend(classifier.push(&delta));
    }
    events.extend(classifier.finish());
    tracing::info!(events = events.len(), "classified response");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.format {
        Format::Events => {
            for event in &events {
                writeln!(out, "{}", serde_json::to_string(event)?)?;
            }
        }
        Format::Sse => {
            let run = match args.thread_id {
                Some(thread_id) => RunContext::new(thread_id),
                None => RunContext::new_thread(),
            };
            let body = EventEncoder::new().encode_all(&run.to_agui_run(&events))?;
            write!(out, "{}", body)?;
        }
        Format::Message => {
            let mut renderer = EventRenderer::new();
            for event in &events {
                renderer.apply(event)?;
            }
            let message = renderer.finish()?;
            writeln!(out, "{}", serde_json::to_string_pretty(&message)?)?;
        }
    }
    Ok(())
}
