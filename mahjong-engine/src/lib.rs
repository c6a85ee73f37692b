pub mod agari;
pub mod combo;
pub mod errors;
pub mod game;
pub mod hand;
pub mod parser;
pub mod round;
pub mod rule;
pub mod score;
pub mod seeding;
pub mod tile;
pub mod yaku;

pub use errors::{RiichiError, RiichiResult};
pub use game::{Game, Player, PlayerScore};
pub use hand::Hand;
pub use round::{EndOfRound, PlayerSettlement, Round, RoundSetup, TurnPhase};
pub use rule::GameRule;
pub use tile::{Tile, TileKind, Wind};
