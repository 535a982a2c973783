//! Command-line interface for the t3 client.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// t3 - play snapmark tic-tac-toe from the terminal
#[derive(Parser, Debug)]
#[command(name = "t3")]
#[command(
    about = "Tic-tac-toe client. The game url, id and player token are saved in a local cache file.",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Where the game handle is saved between commands
    #[arg(long, default_value = "t3_cache.toml")]
    pub cache_location: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start a new game and save its handle
    Start {
        /// Server url
        #[arg(long, default_value = "http://localhost:8000")]
        url: String,

        /// Player name
        #[arg(long)]
        name: String,
    },

    /// Join an existing game and save its handle
    Join {
        /// Server url
        #[arg(long, default_value = "http://localhost:8000")]
        url: String,

        /// Player name
        #[arg(long)]
        name: String,

        /// Game to join
        #[arg(long)]
        game_id: String,
    },

    /// Print the board and whose turn it is
    State,

    /// Play a turn at the given coordinates
    Turn {
        /// Target row, 0 to 2
        row: usize,

        /// Target column, 0 to 2
        column: usize,
    },

    /// Submit a photo of the board as your move
    Snap {
        /// Path to the board photo
        image: PathBuf,
    },
}
