//! t3 - command-line client for snapmark tic-tac-toe.

#![warn(missing_docs)]

mod cli;
mod handle;
mod remote;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use handle::GameHandle;
use remote::{ApiClient, GameView, TurnOutcome};
use snapmark_core::Seat;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Quiet by default; RUST_LOG opens the taps when debugging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let client = ApiClient::new();

    match cli.command {
        Command::Start { url, name } => {
            let handle = client.start_game(&url, &name).await?;
            handle.save(&cli.cache_location)?;
            println!("Game ID: {}", handle.game_id());
        }
        Command::Join { url, name, game_id } => {
            let handle = client.join_game(&url, &name, &game_id).await?;
            handle.save(&cli.cache_location)?;
        }
        Command::State => {
            let handle = GameHandle::from_file(&cli.cache_location)?;
            let view = client.fetch_state(&handle).await?;
            print_state(&view);
        }
        Command::Turn { row, column } => {
            let handle = GameHandle::from_file(&cli.cache_location)?;
            let outcome = client.play_turn(&handle, row, column).await?;
            report_outcome(&client, &handle, outcome).await?;
        }
        Command::Snap { image } => {
            let handle = GameHandle::from_file(&cli.cache_location)?;
            let photo = std::fs::read(&image)
                .with_context(|| format!("could not read photo {}", image.display()))?;
            let report = client.play_photo(&handle, photo).await?;
            println!("Played ({}, {})", report.played.row, report.played.column);
            report_outcome(&client, &handle, report.outcome).await?;
        }
    }

    Ok(())
}

/// Prints the final board and result when a move ends the game.
async fn report_outcome(
    client: &ApiClient,
    handle: &GameHandle,
    outcome: Option<TurnOutcome>,
) -> Result<()> {
    match outcome {
        Some(TurnOutcome::Won { winner }) => {
            print_state(&client.fetch_state(handle).await?);
            println!("{winner} won the game");
        }
        Some(TurnOutcome::Draw) => {
            print_state(&client.fetch_state(handle).await?);
            println!("Game is drawn");
        }
        None => {}
    }
    Ok(())
}

fn print_state(view: &GameView) {
    let second = view.second_player_name.as_deref().unwrap_or("[EMPTY]");
    println!("{} vs {}", view.first_player_name, second);
    let turn = match view.current_turn {
        Seat::First => "first_player",
        Seat::Second => "second_player",
    };
    println!("Current turn: {turn}");
    println!("{}", view.game_state.display());
}
