//! HTTP interface: routes, wire types, and error mapping.

use crate::registry::GameRegistry;
use crate::vision::{self, GlyphReader, InkGlyphReader, VisionError};
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use snapmark_core::{Board, Game, GameError, GameId, Move, PlayerToken, ReconcileError, Seat};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Longest accepted player name, in characters.
pub const PLAYER_NAME_MAX_LENGTH: usize = 100;

/// Header carrying the player token on photo submissions, where the
/// body is the image itself and has no room for it.
pub const PLAYER_TOKEN_HEADER: &str = "x-player-token";

/// Largest accepted board photo.
const MAX_PHOTO_BYTES: usize = 8 * 1024 * 1024;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    registry: GameRegistry,
    glyph_reader: Arc<dyn GlyphReader + Send + Sync>,
}

/// Builds the router with the stock glyph reader.
pub fn app(registry: GameRegistry) -> Router {
    app_with_reader(registry, Arc::new(InkGlyphReader))
}

/// Builds the router with an injected glyph reader.
pub fn app_with_reader(
    registry: GameRegistry,
    glyph_reader: Arc<dyn GlyphReader + Send + Sync>,
) -> Router {
    let state = AppState {
        registry,
        glyph_reader,
    };
    Router::new()
        .route("/new_game", post(new_game))
        .route("/{game_id}", get(game_view))
        .route("/{game_id}/join", post(join_game))
        .route("/{game_id}/play_turn", post(play_turn))
        .route(
            "/{game_id}/play_turn/image",
            post(play_turn_image).layer(DefaultBodyLimit::max(MAX_PHOTO_BYTES)),
        )
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────
//  Wire types
// ─────────────────────────────────────────────────────────────

/// Body of `POST /new_game` and `POST /{game_id}/join`.
#[derive(Debug, Deserialize)]
pub struct PlayerNameBody {
    /// Display name for the player entering the game.
    pub player_name: String,
}

/// Credentials returned when a player enters a game.
#[derive(Debug, Serialize, Deserialize)]
pub struct GameCredentials {
    /// The game the credentials belong to.
    pub game_id: GameId,
    /// The bearer token proving this player's identity.
    pub player_token: PlayerToken,
}

/// Public view of a game, as returned by `GET /{game_id}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct GameView {
    /// The board, rows of `"X"`, `"O"`, or `"_"`.
    pub game_state: Board,
    /// Name of the player who created the game.
    pub first_player_name: String,
    /// Name of the player who joined, if anybody has.
    pub second_player_name: Option<String>,
    /// The seat to move.
    pub current_turn: Seat,
}

/// Body of `POST /{game_id}/play_turn`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PlayTurnBody {
    /// The caller's bearer token.
    pub player_token: PlayerToken,
    /// Target row, `0` to `2`.
    pub row: usize,
    /// Target column, `0` to `2`.
    pub column: usize,
}

/// How a game ended, if the move ended it. A move that ends nothing
/// reports as `null`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum TurnReport {
    /// Somebody completed a line.
    Won {
        /// Name of the winning player.
        winner: String,
    },
    /// All nine cells played without a line.
    Draw,
}

/// The move inferred from a board photo, echoed back to the caller.
#[derive(Debug, Serialize, Deserialize)]
pub struct PlayedMove {
    /// Row of the inferred move.
    pub row: usize,
    /// Column of the inferred move.
    pub column: usize,
}

/// Response of `POST /{game_id}/play_turn/image`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ImageTurnReport {
    /// The move the photo was reconciled to.
    #[serde(rename = "move")]
    pub played: PlayedMove,
    /// Whether that move ended the game.
    pub outcome: Option<TurnReport>,
}

/// Error payload, a bare explanation under a `detail` key.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable reason the request was rejected.
    pub detail: String,
}

// ─────────────────────────────────────────────────────────────
//  Error mapping
// ─────────────────────────────────────────────────────────────

/// Everything a handler can reject a request with.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ApiError {
    /// No game registered under the requested id.
    #[display("game not found")]
    NotFound,
    /// The presented token matches no player in the game.
    #[display("unknown player token")]
    UnknownToken,
    /// The token is valid but its seat is not the seat to move.
    #[display("not the caller's turn")]
    NotYourTurn,
    /// The game cannot accept the request in its current state.
    #[display("{_0}")]
    Rejected(String),
    /// The request itself is malformed.
    #[display("{_0}")]
    Validation(String),
}

impl std::error::Error for ApiError {}

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        match err {
            GameError::CellOccupied(_) => ApiError::Rejected("Invalid turn".to_string()),
            GameError::GameFull => ApiError::Rejected("Game is full.".to_string()),
            GameError::Finished => ApiError::Rejected("Game is already finished.".to_string()),
        }
    }
}

impl From<ReconcileError> for ApiError {
    fn from(err: ReconcileError) -> Self {
        ApiError::Rejected(err.to_string())
    }
}

impl From<VisionError> for ApiError {
    fn from(err: VisionError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            ApiError::UnknownToken => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::NotYourTurn => (StatusCode::BAD_REQUEST, "Not your turn".to_string()),
            ApiError::Rejected(detail) => (StatusCode::BAD_REQUEST, detail),
            ApiError::Validation(detail) => (StatusCode::UNPROCESSABLE_ENTITY, detail),
        };
        (status, Json(ErrorBody { detail })).into_response()
    }
}

// ─────────────────────────────────────────────────────────────
//  Handlers
// ─────────────────────────────────────────────────────────────

fn validate_player_name(name: &str) -> Result<(), ApiError> {
    if name.chars().count() > PLAYER_NAME_MAX_LENGTH {
        warn!(length = name.chars().count(), "player name too long");
        return Err(ApiError::Validation(format!(
            "player_name must be at most {PLAYER_NAME_MAX_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Resolves the token to a seat and checks that seat may move now.
///
/// Checked in capability order: an unknown token learns nothing about
/// the game's state, a finished game rejects both seats alike, and only
/// then does turn order come into it.
fn authorize_turn(game: &Game, token: &PlayerToken) -> Result<Seat, ApiError> {
    let seat = game.seat_of_token(token).ok_or(ApiError::UnknownToken)?;
    if game.is_finished() {
        return Err(GameError::Finished.into());
    }
    if seat != game.turn() {
        warn!(?seat, turn = ?game.turn(), "move attempted out of turn");
        return Err(ApiError::NotYourTurn);
    }
    Ok(seat)
}

/// The report a finished game sends back with the final move.
fn turn_report(game: &Game) -> Option<TurnReport> {
    if let Some(winner) = game.winner_player() {
        Some(TurnReport::Won {
            winner: winner.name().to_string(),
        })
    } else if game.is_drawn() {
        Some(TurnReport::Draw)
    } else {
        None
    }
}

#[instrument(skip(state, body))]
async fn new_game(
    State(state): State<AppState>,
    Json(body): Json<PlayerNameBody>,
) -> Result<Json<GameCredentials>, ApiError> {
    validate_player_name(&body.player_name)?;
    let (game_id, game) = state.registry.create(body.player_name);
    let player_token = game.lock().unwrap().first_player().token().clone();
    info!(game_id = %game_id, "game created");
    Ok(Json(GameCredentials {
        game_id,
        player_token,
    }))
}

#[instrument(skip(state), fields(game_id = %game_id))]
async fn game_view(
    State(state): State<AppState>,
    Path(game_id): Path<GameId>,
) -> Result<Json<GameView>, ApiError> {
    let shared = state.registry.get(&game_id).ok_or(ApiError::NotFound)?;
    let game = shared.lock().unwrap();
    Ok(Json(GameView {
        game_state: game.board().clone(),
        first_player_name: game.first_player().name().to_string(),
        second_player_name: game.second_player().map(|p| p.name().to_string()),
        current_turn: game.turn(),
    }))
}

#[instrument(skip(state, body), fields(game_id = %game_id))]
async fn join_game(
    State(state): State<AppState>,
    Path(game_id): Path<GameId>,
    Json(body): Json<PlayerNameBody>,
) -> Result<Json<GameCredentials>, ApiError> {
    validate_player_name(&body.player_name)?;
    let shared = state.registry.get(&game_id).ok_or(ApiError::NotFound)?;
    let mut game = shared.lock().unwrap();
    let player = game.join(body.player_name)?;
    let player_token = player.token().clone();
    info!(second_player = player.name(), "player joined");
    Ok(Json(GameCredentials {
        game_id,
        player_token,
    }))
}

#[instrument(skip(state, body), fields(game_id = %game_id))]
async fn play_turn(
    State(state): State<AppState>,
    Path(game_id): Path<GameId>,
    Json(body): Json<PlayTurnBody>,
) -> Result<Json<Option<TurnReport>>, ApiError> {
    let shared = state.registry.get(&game_id).ok_or(ApiError::NotFound)?;
    let mut game = shared.lock().unwrap();
    let seat = authorize_turn(&game, &body.player_token)?;
    let mv = Move::new(body.row, body.column).ok_or_else(|| {
        ApiError::Validation("row and column must be between 0 and 2".to_string())
    })?;
    game.play_turn(mv)?;
    info!(?seat, mv = %mv, "turn played");
    Ok(Json(turn_report(&game)))
}

#[instrument(skip(state, headers, body), fields(game_id = %game_id, bytes = body.len()))]
async fn play_turn_image(
    State(state): State<AppState>,
    Path(game_id): Path<GameId>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ImageTurnReport>, ApiError> {
    let token = headers
        .get(PLAYER_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(PlayerToken::from)
        .ok_or(ApiError::UnknownToken)?;

    let shared = state.registry.get(&game_id).ok_or(ApiError::NotFound)?;
    let mut game = shared.lock().unwrap();
    let seat = authorize_turn(&game, &token)?;

    let observed = vision::read_board(&body, state.glyph_reader.as_ref())?;
    let mv = game
        .infer_move(&observed)?
        .ok_or_else(|| ApiError::Rejected("No new move detected.".to_string()))?;
    game.play_turn(mv)?;
    info!(?seat, mv = %mv, "turn played from photo");
    Ok(Json(ImageTurnReport {
        played: PlayedMove {
            row: mv.row(),
            column: mv.col(),
        },
        outcome: turn_report(&game),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            ApiError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::UnknownToken.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::NotYourTurn.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Rejected("Game is full.".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Validation("bad".to_string()).into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_game_errors_map_to_client_facing_details() {
        assert_eq!(
            ApiError::from(GameError::GameFull),
            ApiError::Rejected("Game is full.".to_string())
        );
        assert_eq!(
            ApiError::from(GameError::CellOccupied(Move::new(0, 0).unwrap())),
            ApiError::Rejected("Invalid turn".to_string())
        );
        assert_eq!(
            ApiError::from(GameError::Finished),
            ApiError::Rejected("Game is already finished.".to_string())
        );
    }

    #[test]
    fn test_turn_report_wire_shape() {
        let won = TurnReport::Won {
            winner: "alice".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&won).unwrap(),
            serde_json::json!({"result": "won", "winner": "alice"})
        );
        assert_eq!(
            serde_json::to_value(TurnReport::Draw).unwrap(),
            serde_json::json!({"result": "draw"})
        );
        assert_eq!(
            serde_json::to_value(None::<TurnReport>).unwrap(),
            serde_json::Value::Null
        );
    }

    #[test]
    fn test_player_name_validation() {
        assert!(validate_player_name("alice").is_ok());
        assert!(validate_player_name(&"x".repeat(PLAYER_NAME_MAX_LENGTH)).is_ok());
        assert!(validate_player_name(&"x".repeat(PLAYER_NAME_MAX_LENGTH + 1)).is_err());
    }
}
