use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;

mod commands;
mod config;
mod logging;

use commands::{calc, interactive, models, Context};

#[derive(Parser)]
#[command(
    name = "marginkit",
    version,
    about = "Gross margin and breakeven calculator for products built on LLM APIs",
    long_about = r#"marginkit turns unit economics (price per user, request volume, token counts,
per-token prices, fixed and variable costs) into per-user API cost, gross profit,
gross margin and the number of users needed to break even.

Token prices come from a built-in model catalog or are entered manually with
--model custom (USD per 1M tokens).

Quick start:
  marginkit models                                   # list common models
  marginkit models --advanced                        # include reasoning / extended models
  marginkit calc --price 20 --requests 100 \
      --tokens-in 500 --tokens-out 200 \
      --fixed-costs 1000 --other-variable 2          # default model (gpt-4o-mini)
  marginkit calc --model custom --cost-in 5 --cost-out 10 ...
  marginkit interactive                              # edit the form line by line"#
)]
pub struct Cli {
    /// Config file (default: ~/.config/marginkit/config.toml or ~/.marginkit.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Number display locale: en, zh, de, fr, ru
    #[arg(long, global = true)]
    pub locale: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute margin and breakeven for one set of inputs
    Calc(calc::CalcArgs),

    /// List model pricing presets
    Models(models::ModelsArgs),

    /// Line-oriented pricing form on stdin
    Interactive(interactive::InteractiveArgs),
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {:#}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = config::Config::load(cli.config.as_deref())?;

    if cli.no_color {
        colored::control::set_override(false);
    } else if let Some(color) = config.color {
        colored::control::set_override(color);
    }

    let ctx = Context::from_config(config, cli.locale.as_deref())?;

    match cli.command {
        Commands::Calc(args) => calc::run(args, &ctx),
        Commands::Models(args) => models::run(args, &ctx),
        Commands::Interactive(args) => interactive::run(args, &ctx),
    }
}
