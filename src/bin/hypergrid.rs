//! Hypergrid CLI — run an input through one convergence cycle.
//!
//! Usage:
//!   hypergrid think "Because X, therefore Y"
//!   hypergrid query guardian "a well-formed sentence"

use clap::{Parser, Subcommand};
use hypergrid::Convergence;

#[derive(Parser)]
#[command(name = "hypergrid", version, about = "N-dimensional graph-activation engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single input through fan-out, propagation, and synthesis.
    Think { input: String },
    /// Query one aspect directly by id, bypassing convergence.
    Query { aspect_id: String, input: String },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut convergence = match Convergence::create(None, None) {
        Ok(c) => c,
        Err(err) => {
            eprintln!("error: failed to build convergence engine: {err}");
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Think { input } => match convergence.think(&input).await {
            Ok(thought) => println!("{}", thought.payload),
            Err(err) => {
                eprintln!("error: {err}");
                std::process::exit(1);
            }
        },
        Commands::Query { aspect_id, input } => match convergence.query_aspect_async(&aspect_id, &input).await {
            Ok(output) => println!("{output}"),
            Err(err) => {
                eprintln!("error: {err}");
                std::process::exit(1);
            }
        },
    }
}
