//! polyglue CLI - Class inspection and chat sessions
//!
//! Commands:
//! - `polyglue classes` - List the registered chat classes
//! - `polyglue connect` - Run a chat session until it ends or Ctrl-C
//! - `polyglue check-config` - Validate a client configuration file

use clap::{Parser, Subcommand};

mod classes;
mod config;
mod connect;

#[derive(Parser)]
#[command(name = "polyglue")]
#[command(author, version, long_about = None)]
#[command(about = "Inspect polyglue classes and run chat sessions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered classes with their parameters, fields and methods
    Classes {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Connect to the chat service and log events until the session ends
    Connect {
        /// Session token
        #[arg(short, long)]
        token: String,

        /// Path to a TOML client configuration
        #[arg(short, long)]
        config: Option<String>,

        /// Log level (trace, debug, info, warn, error, off)
        #[arg(short, long)]
        log_level: Option<String>,
    },

    /// Validate a TOML client configuration
    CheckConfig {
        /// Path to the configuration file
        path: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Classes { json } => {
            classes::run(json)?;
        }
        Commands::Connect {
            token,
            config,
            log_level,
        } => {
            connect::run(token, config, log_level)?;
        }
        Commands::CheckConfig { path } => {
            config::check(&path)?;
        }
    }

    Ok(())
}
