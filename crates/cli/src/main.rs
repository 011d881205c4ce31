mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{CookArgs, HostArgs, RecipeArgs};
use output::OutputFormat;

/// sous - cook software onto a host from declarative ingredients
#[derive(Parser)]
#[command(name = "sous")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Configuration file (default: $SOUS_CONFIG or ~/.config/sous/config.toml)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Show the detected host and configuration
  Info {
    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// List known ingredients
  List,

  /// Resolve ingredients into an ordered build sequence
  Plan {
    #[command(flatten)]
    recipe: RecipeArgs,

    #[command(flatten)]
    host: HostArgs,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Print the dependency tree of ingredients
  Tree {
    #[command(flatten)]
    recipe: RecipeArgs,

    #[command(flatten)]
    host: HostArgs,
  },

  /// Print the platform rules an ingredient declares
  Rules {
    /// Ingredient name
    ingredient: String,
  },

  /// Install ingredients and their dependencies
  Cook {
    #[command(flatten)]
    recipe: RecipeArgs,

    #[command(flatten)]
    host: HostArgs,

    #[command(flatten)]
    cook: CookArgs,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let filter = match std::env::var("RUST_LOG") {
    Ok(_) => EnvFilter::from_default_env(),
    Err(_) if cli.verbose => EnvFilter::new("debug"),
    Err(_) => EnvFilter::new("warn"),
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let config = cmd::load_config(cli.config.as_deref())?;

  match cli.command {
    Commands::Info { output } => cmd::cmd_info(&config, output),
    Commands::List => cmd::cmd_list(&config),
    Commands::Plan { recipe, host, output } => cmd::cmd_plan(&config, &recipe, &host, output),
    Commands::Tree { recipe, host } => cmd::cmd_tree(&config, &recipe, &host),
    Commands::Rules { ingredient } => cmd::cmd_rules(&config, &ingredient),
    Commands::Cook {
      recipe,
      host,
      cook,
      output,
    } => cmd::cmd_cook(&config, &recipe, &host, &cook, output),
  }
}
