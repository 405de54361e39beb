//! stax - Visualize stacked branches
//!
//! stax shells out to a branch-stacking tool for branch data, lays the stack
//! out as a multi-lane ancestry graph, and renders it to the terminal or to
//! a local live-reloading web panel.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use eyre::Result;
use tracing_subscriber::EnvFilter;

use stax::config::Config;
use stax::render::{OutputFormat, render_graph};
use stax::{data, serve};

/// CLI arguments
#[derive(Debug, Parser)]
#[command(name = "stax", version, about = "Visualize stacked branches")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Repository to inspect (default: discovered from the current
    /// directory)
    #[arg(short = 'C', long, global = true)]
    repo: Option<PathBuf>,

    /// Path to config file (default: .config/stax/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format: text, json
    #[arg(short = 'f', long)]
    format: Option<String>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Show verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the local panel server with live reload
    Serve {
        /// Open the panel in a browser
        #[arg(long)]
        open: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let start = match &args.repo {
        Some(path) => path.clone(),
        None => std::env::current_dir()?,
    };
    let repo_root = data::discover_repo_root(&start)?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| Config::default_path(&repo_root));
    let config = Config::load(&config_path)?;

    match args.command {
        Some(Command::Serve { open }) => {
            let open_panel = open || config.serve.open;
            serve::serve(repo_root, config, open_panel).await
        }
        None => run_log(&args, &repo_root, &config),
    }
}

/// The default command: render the stack graph once.
fn run_log(args: &Args, repo_root: &Path, config: &Config) -> Result<()> {
    let format = match &args.format {
        Some(f) => {
            OutputFormat::from_str(f).ok_or_else(|| eyre::eyre!("Unknown format: {}", f))?
        }
        None => OutputFormat::default(),
    };

    let graph = data::load_graph(repo_root, config)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&graph)?),
        OutputFormat::Text => {
            let color = !args.no_color && std::io::stdout().is_terminal();
            print!("{}", render_graph(&graph, color));
        }
    }

    Ok(())
}
