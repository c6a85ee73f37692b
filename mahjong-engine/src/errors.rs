use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RiichiError {
    /// Tile or hand text that could not be parsed.
    Parse { input: String, message: String },
    /// Tile id outside the 136-tile set.
    InvalidTile { message: String },
    /// Tiles that do not form a pair, triplet, quad or run.
    InvalidCombo { message: String },
    /// Hand construction with the wrong tile count or duplicated tiles.
    InvalidHand { message: String },
    /// Rejected game configuration (player roster, wall permutation, ...).
    InvalidConfig { message: String },
    /// Operation not applicable to the current round or game state.
    InvalidState { message: String },
}

impl fmt::Display for RiichiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiichiError::Parse { input, message } => {
                write!(f, "Parse error on '{}': {}", input, message)
            }
            RiichiError::InvalidTile { message } => {
                write!(f, "Invalid tile: {}", message)
            }
            RiichiError::InvalidCombo { message } => {
                write!(f, "Invalid combo: {}", message)
            }
            RiichiError::InvalidHand { message } => {
                write!(f, "Invalid hand: {}", message)
            }
            RiichiError::InvalidConfig { message } => {
                write!(f, "Invalid configuration: {}", message)
            }
            RiichiError::InvalidState { message } => {
                write!(f, "Invalid state: {}", message)
            }
        }
    }
}

impl std::error::Error for RiichiError {}

pub type RiichiResult<T> = Result<T, RiichiError>;
