//! The game aggregate: turn sequencing, move application, win and draw
//! detection.

use crate::board::{Board, Cell, Mark, Move};
use crate::player::{Player, PlayerToken, Seat};
use crate::reconcile::{self, ReconcileError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Unique identifier for a game.
///
/// Generated from 128 random bits by whoever registers the game; the
/// engine itself only carries it for correlation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::From)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    /// Draws a fresh random identifier.
    pub fn generate() -> Self {
        Self(format!("{:032x}", rand::random::<u128>()))
    }
}

impl From<&str> for GameId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors a game can report. All of them are rejected before any state
/// changes, so a failed call leaves the game exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum GameError {
    /// The target cell already holds a mark.
    #[display("cell {_0} is already occupied")]
    CellOccupied(Move),
    /// A second player has already joined.
    #[display("game already has two players")]
    GameFull,
    /// The game has been won or drawn; no further moves are accepted.
    #[display("game is already finished")]
    Finished,
}

impl std::error::Error for GameError {}

/// One game of tic-tac-toe: board, both player slots, and turn state.
///
/// The engine is purely in-memory and synchronous. It enforces turn
/// *mechanics* (whose mark goes down, when the game ends); *who is
/// allowed to call* is the hosting layer's concern, driven by
/// [`Game::seat_of_token`] and [`Game::turn`].
#[derive(Debug, Clone)]
pub struct Game {
    id: GameId,
    board: Board,
    first_player: Player,
    second_player: Option<Player>,
    turns_played: u8,
    starting_seat: Seat,
    turn: Seat,
    winner: Option<Seat>,
}

// ─────────────────────────────────────────────────────────────
//  Construction and joining
// ─────────────────────────────────────────────────────────────

impl Game {
    /// Creates a game with the given identifier and first player.
    ///
    /// The opening seat is decided by a coin flip, so the creator does
    /// not automatically move first. Whichever seat starts plays `X`
    /// for the whole game.
    #[instrument(skip(first_player_name), fields(game_id = %id))]
    pub fn new(id: GameId, first_player_name: impl Into<String>) -> Self {
        Self::with_starting_seat(id, first_player_name, Seat::coin_flip())
    }

    /// Creates a game with an explicit opening seat.
    ///
    /// [`Game::new`] flips a coin; this constructor exists for tests and
    /// replays that need a deterministic game.
    pub fn with_starting_seat(
        id: GameId,
        first_player_name: impl Into<String>,
        starting_seat: Seat,
    ) -> Self {
        let first_player = Player::new(first_player_name);
        info!(
            game_id = %id,
            first_player = first_player.name(),
            ?starting_seat,
            "creating game"
        );
        Self {
            id,
            board: Board::new(),
            first_player,
            second_player: None,
            turns_played: 0,
            starting_seat,
            turn: starting_seat,
            winner: None,
        }
    }

    /// Fills the second seat.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::GameFull`] if somebody already joined. Turn
    /// order is unaffected either way.
    #[instrument(skip(self, player_name), fields(game_id = %self.id))]
    pub fn join(&mut self, player_name: impl Into<String>) -> Result<&Player, GameError> {
        if self.second_player.is_some() {
            warn!("join rejected: game already has two players");
            return Err(GameError::GameFull);
        }
        let player = self.second_player.insert(Player::new(player_name));
        info!(second_player = player.name(), "second player joined");
        Ok(player)
    }
}

// ─────────────────────────────────────────────────────────────
//  Move application
// ─────────────────────────────────────────────────────────────

impl Game {
    /// The mark the seat to move would place.
    ///
    /// `X` exactly when the seat to move is the seat that won the
    /// opening coin flip; the coin flip fixes each seat's mark for the
    /// whole game, independent of turn alternation.
    pub fn mark_to_play(&self) -> Mark {
        if self.turn == self.starting_seat {
            Mark::X
        } else {
            Mark::O
        }
    }

    /// Applies a move for the seat whose turn it is.
    ///
    /// Returns the winning seat if this move ends the game with a win.
    /// A draw is not an error and not a return value: after the ninth
    /// move callers observe it through [`Game::is_drawn`].
    ///
    /// The seat to move flips unconditionally, even on a terminal move,
    /// so the serialized view keeps reporting a current turn.
    ///
    /// # Errors
    ///
    /// [`GameError::Finished`] if the game is already won or drawn,
    /// [`GameError::CellOccupied`] if the target cell holds a mark.
    /// Both are checked before any mutation.
    #[instrument(skip(self), fields(game_id = %self.id, mv = %mv))]
    pub fn play_turn(&mut self, mv: Move) -> Result<Option<Seat>, GameError> {
        if self.is_finished() {
            warn!("move rejected: game is finished");
            return Err(GameError::Finished);
        }
        if !self.board.is_empty(mv) {
            warn!(cell = %self.board.get(mv), "move rejected: cell occupied");
            return Err(GameError::CellOccupied(mv));
        }

        let mark = self.mark_to_play();
        self.board.set(mv, Cell::from(mark));
        self.turns_played += 1;
        debug!(%mark, turns_played = self.turns_played, "mark placed");

        if self.is_winning_move(mv) {
            info!(winner = ?self.turn, "game won");
            self.winner = Some(self.turn);
        } else if self.is_drawn() {
            info!("game drawn");
        }

        self.turn = self.turn.other();
        Ok(self.winner)
    }

    /// Whether the just-played cell completed a line.
    ///
    /// Only the row, column, and (where applicable) diagonals through
    /// `mv` are examined. A win can only be completed by the cell just
    /// played, so this is equivalent to a full-board scan at O(1) cost.
    fn is_winning_move(&self, mv: Move) -> bool {
        let played = self.board.get(mv);
        let line = |cells: [Cell; 3]| cells.iter().all(|&c| c == played);

        line(self.board.row(mv.row()))
            || line(self.board.column(mv.col()))
            || (mv.row() == mv.col() && line(self.board.diagonal()))
            || (mv.row() + mv.col() == 2 && line(self.board.anti_diagonal()))
    }

    /// Infers the move implied by an externally observed board.
    ///
    /// Delegates to [`reconcile::infer_move`] against the authoritative
    /// board. The caller applies the result through [`Game::play_turn`]
    /// exactly as if the coordinates had been supplied directly.
    pub fn infer_move(&self, observed: &Board) -> Result<Option<Move>, ReconcileError> {
        reconcile::infer_move(&self.board, observed)
    }
}

// ─────────────────────────────────────────────────────────────
//  Outcome and identity queries
// ─────────────────────────────────────────────────────────────

impl Game {
    /// A game is drawn when all nine cells are played and nobody won.
    pub fn is_drawn(&self) -> bool {
        self.turns_played == 9 && self.winner.is_none()
    }

    /// Whether the game accepts no further moves.
    pub fn is_finished(&self) -> bool {
        self.winner.is_some() || self.is_drawn()
    }

    /// The winning seat, if the game has been won.
    pub fn winner(&self) -> Option<Seat> {
        self.winner
    }

    /// The winning player, if the game has been won.
    pub fn winner_player(&self) -> Option<&Player> {
        self.winner.and_then(|seat| self.player(seat))
    }

    /// The player in the given seat, if that seat is filled.
    pub fn player(&self, seat: Seat) -> Option<&Player> {
        match seat {
            Seat::First => Some(&self.first_player),
            Seat::Second => self.second_player.as_ref(),
        }
    }

    /// Which seat the presented token belongs to, if any.
    ///
    /// This is the hosting layer's authorization primitive: a token
    /// either resolves to a seat or the request is from nobody we know.
    pub fn seat_of_token(&self, token: &PlayerToken) -> Option<Seat> {
        if self.first_player.token() == token {
            Some(Seat::First)
        } else if self
            .second_player
            .as_ref()
            .is_some_and(|p| p.token() == token)
        {
            Some(Seat::Second)
        } else {
            None
        }
    }

    /// The game's identifier.
    pub fn id(&self) -> &GameId {
        &self.id
    }

    /// The authoritative board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The seat to move.
    pub fn turn(&self) -> Seat {
        self.turn
    }

    /// How many moves have been accepted.
    pub fn turns_played(&self) -> u8 {
        self.turns_played
    }

    /// The seat that won the opening coin flip (and therefore plays `X`).
    pub fn starting_seat(&self) -> Seat {
        self.starting_seat
    }

    /// The player who created the game.
    pub fn first_player(&self) -> &Player {
        &self.first_player
    }

    /// The player who joined, if anybody has.
    pub fn second_player(&self) -> Option<&Player> {
        self.second_player.as_ref()
    }
}
