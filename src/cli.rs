//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};

/// Composes a person, clothing and a place into one generated photo.
#[derive(Parser, Debug)]
#[command(name = "compositor", version, about)]
pub struct Cli {
    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// What to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP service until interrupted.
    Serve {
        /// Address to listen on, overriding config.
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Compose one image and print the result as JSON.
    Compose {
        /// URL of the person image.
        #[arg(long)]
        person: String,

        /// URL of a clothing image; repeat for several.
        #[arg(long, required = true)]
        clothing: Vec<String>,

        /// URL of the place image.
        #[arg(long)]
        place: String,
    },
}
