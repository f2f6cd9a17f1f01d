// src/cli/args.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
#[command(arg_required_else_help = true, disable_help_subcommand = true)]
pub struct Args {
    /// Path to config file (optional)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Page origin to post bridge requests from (overrides config)
    #[arg(short, long, value_name = "ORIGIN", global = true)]
    pub origin: Option<String>,

    /// Verbosity level (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Ask Anki for permission through the bridge
    Check,

    /// Query the AnkiConnect version directly
    Status,

    /// Save a flashcard through the bridge
    Save {
        /// Front of the card
        #[arg(long, value_name = "TEXT")]
        front: String,

        /// Back of the card
        #[arg(long, value_name = "TEXT")]
        back: String,

        /// Game level the card was mastered at
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=3))]
        level: u8,
    },

    /// Practice additions in the terminal
    Practice {
        /// Stop after this many problems
        #[arg(short, long, value_name = "N")]
        rounds: Option<u32>,

        /// Save every correctly answered problem to Anki
        #[arg(short, long)]
        save: bool,
    },

    /// Write a default config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
