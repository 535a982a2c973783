//! Player identity and seating.

use serde::{Deserialize, Serialize};

/// Which of the two player slots.
///
/// The first seat is filled at game creation; the second stays empty
/// until somebody joins. Turn bookkeeping and the winner marker are both
/// expressed in seats, never in player identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Seat {
    /// The player who created the game.
    #[serde(rename = "first_player")]
    First,
    /// The player who joined.
    #[serde(rename = "second_player")]
    Second,
}

impl Seat {
    /// Returns the opposite seat.
    pub fn other(self) -> Self {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }

    /// Uniformly random seat: the fairness coin flip at game creation.
    pub fn coin_flip() -> Self {
        if rand::random() { Seat::First } else { Seat::Second }
    }
}

/// Opaque bearer credential proving a player's identity.
///
/// Generated once at player creation from 128 random bits, compared only
/// by equality, never derived from other player data. Whoever presents
/// the token is the player.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::From)]
#[serde(transparent)]
pub struct PlayerToken(String);

impl PlayerToken {
    /// Draws a fresh unguessable token.
    pub fn generate() -> Self {
        Self(format!("{:032x}", rand::random::<u128>()))
    }
}

impl From<&str> for PlayerToken {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl std::fmt::Display for PlayerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A player: display name plus bearer token.
#[derive(Debug, Clone)]
pub struct Player {
    name: String,
    token: PlayerToken,
}

impl Player {
    /// Creates a player with a freshly generated token.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            token: PlayerToken::generate(),
        }
    }

    /// The player's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The player's bearer token.
    pub fn token(&self) -> &PlayerToken {
        &self.token
    }
}
