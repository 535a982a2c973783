//! Snapmark server - HTTP tic-tac-toe with photo move submission
//!
//! The server holds every live game in memory and exposes a small JSON
//! API: create a game, join it, fetch its state, and play turns either
//! as explicit coordinates or as a photo of the physical board. Photo
//! submissions are reconciled against the authoritative board, so the
//! camera never becomes a second source of truth.
//!
//! # Architecture
//!
//! - **Api**: routes, wire types, and error mapping
//! - **Registry**: shared in-memory game store with per-game locking
//! - **Vision**: board photo decoding and glyph classification

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod api;
mod registry;
mod vision;

// Crate-level exports - HTTP interface
pub use api::{
    app, app_with_reader, ApiError, ErrorBody, GameCredentials, GameView, ImageTurnReport,
    PlayTurnBody, PlayedMove, PlayerNameBody, TurnReport, PLAYER_NAME_MAX_LENGTH,
    PLAYER_TOKEN_HEADER,
};

// Crate-level exports - Game registry
pub use registry::{GameRegistry, SharedGame};

// Crate-level exports - Board photo reading
pub use vision::{read_board, GlyphReader, InkGlyphReader, VisionError, BORDER_CROP, LUMA_THRESHOLD};
