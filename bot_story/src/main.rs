use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bot_story::{ScriptConfig, TickRunner};
use clap::{Parser, Subcommand};
use story_core::StorySnapshot;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "botstory", version, about = "Play a story-driven robot behavior script")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the script on a simulated rover and print the final story states
    Run {
        script: PathBuf,

        /// Number of control-loop ticks to run
        #[arg(long, default_value_t = 50)]
        ticks: u64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the story graph after setup, without running any ticks
    Tree {
        script: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Run { script, ticks, json } => {
            let config = load(&script)?;
            let mut runner = TickRunner::simulated(&config)?;
            runner.run(ticks);
            print(&runner.snapshot(), json)
        }
        Command::Tree { script, json } => {
            let graph = load(&script)?.build_graph()?;
            print(&graph.snapshot(), json)
        }
    }
}

fn load(path: &Path) -> Result<ScriptConfig> {
    ScriptConfig::load(path).with_context(|| format!("cannot use script {}", path.display()))
}

fn print(snapshot: &StorySnapshot, json: bool) -> Result<()> {
    if json {
        println!("{}", snapshot.to_json_pretty()?);
    } else {
        print!("{snapshot}");
    }
    Ok(())
}
