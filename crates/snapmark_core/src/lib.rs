//! Snapmark core - tic-tac-toe engine with board-photo reconciliation
//!
//! This crate holds the pure game logic shared by the server and the
//! client: the board and its marks, the game aggregate with its turn
//! sequencing, and the reconciler that turns an externally observed
//! board into a single move.
//!
//! # Architecture
//!
//! - **Board**: the 3x3 grid, cells, marks, and validated moves
//! - **Game**: the aggregate enforcing turn order, wins, and draws
//! - **Reconcile**: diffing an observed board against the authoritative one
//! - **Player**: seats, player identities, and capability tokens
//!
//! # Example
//!
//! ```
//! use snapmark_core::{Game, GameId, Move, Seat};
//!
//! let mut game = Game::with_starting_seat(GameId::generate(), "alice", Seat::First);
//! game.join("bob")?;
//!
//! let mv = Move::new(1, 1).ok_or("out of range")?;
//! let winner = game.play_turn(mv)?;
//! assert!(winner.is_none());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod board;
mod game;
mod player;
mod reconcile;

// Crate-level exports - Board types
pub use board::{Board, Cell, Mark, Move};

// Crate-level exports - Game aggregate
pub use game::{Game, GameError, GameId};

// Crate-level exports - Players and seats
pub use player::{Player, PlayerToken, Seat};

// Crate-level exports - Observation reconciliation
pub use reconcile::{infer_move, ReconcileError};
