use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reasoning_split::{
    metrics, parse_reasoning_with, ParserConfig, ReasoningTransformer, StreamingReasoningParser,
    Transformer,
};

#[derive(Parser)]
#[command(name = "reasoning-split")]
#[command(about = "Split LLM reasoning from answer content", long_about = None)]
struct Cli {
    /// Path to a parser config file (JSON)
    #[arg(short, long, env = "REASONING_SPLIT_CONFIG")]
    config: Option<String>,

    /// Print Prometheus metrics to stderr before exiting
    #[arg(long)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a complete response
    Parse {
        /// Input file (stdin when omitted)
        file: Option<String>,
    },
    /// Replay a response through the streaming parser
    Stream {
        /// Input file (stdin when omitted)
        file: Option<String>,

        /// Characters per simulated token
        #[arg(long, default_value = "1")]
        chunk_size: usize,
    },
    /// Guess whether a model id emits reasoning
    Model {
        model_id: String,
    },
    /// Move reasoning into `reasoning_content` in a JSON response body
    Transform {
        /// Input file (stdin when omitted)
        file: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reasoning_split=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let config_path = shellexpand::tilde(path).to_string();
            let config = ParserConfig::from_file(&config_path)?;
            tracing::info!("Loaded config from {}", config_path);
            config
        }
        None => ParserConfig::default(),
    };

    match &cli.command {
        Command::Parse { file } => {
            let text = read_input(file.as_deref())?;
            let parsed = parse_reasoning_with(&text, &config);
            metrics::record_parse(&parsed);
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }
        Command::Stream { file, chunk_size } => {
            let text = read_input(file.as_deref())?;
            let mut parser = StreamingReasoningParser::new();
            for token in split_chars(&text, *chunk_size) {
                let result = parser.process_token(token);
                metrics::record_stream_token();
                println!("{}", serde_json::to_string(&result)?);
            }
            let final_result = parser.get_result();
            tracing::info!(phase = ?parser.phase(), format = ?final_result.format, "Stream replay finished");
            metrics::record_parse(&final_result);
            println!("{}", serde_json::to_string(&final_result)?);
        }
        Command::Model { model_id } => {
            let likely = config.is_likely_reasoning_model(model_id);
            println!(
                "{}",
                serde_json::json!({ "model": model_id, "likely_reasoning_model": likely })
            );
        }
        Command::Transform { file } => {
            let text = read_input(file.as_deref())?;
            let response: serde_json::Value =
                serde_json::from_str(&text).context("Failed to parse response JSON")?;
            let transformer = ReasoningTransformer::new(config.clone());
            let transformed = transformer.transform_response(response)?;
            println!("{}", serde_json::to_string_pretty(&transformed)?);
        }
    }

    if cli.metrics {
        eprint!("{}", metrics::gather_text()?);
    }

    Ok(())
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            let path = shellexpand::tilde(path).to_string();
            std::fs::read_to_string(&path).context(format!("Failed to read input file: {}", path))
        }
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

/// Split `text` into pieces of `chunk_size` characters (at least one).
fn split_chars(text: &str, chunk_size: usize) -> Vec<&str> {
    let chunk_size = chunk_size.max(1);
    let mut pieces = Vec::new();
    let mut start = 0;
    for (count, (index, _)) in text.char_indices().enumerate() {
        if count > 0 && count % chunk_size == 0 {
            pieces.push(&text[start..index]);
            start = index;
        }
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}
