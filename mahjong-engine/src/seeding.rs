//! Deterministic RNG seeding and wall shuffle.
//!
//! - Session-level RNG with per-game seed derivation
//! - Per-round wall seed via SHA-256 KDF
//! - Vendored Fisher-Yates shuffle for cross-version determinism
//! - Scripted walls built from tile text
//!
//! # Determinism guarantee
//!
//! Given the same `(session seed, game nonce, round index)` tuple,
//! [`generate_wall`] produces an identical 136-tile wall on any platform.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

use crate::errors::{RiichiError, RiichiResult};
use crate::parser::TileManager;
use crate::round::wall::{
    COMPENSATION_COUNT, HANDS_END, INDICATOR_COUNT, LIVE_WALL_COUNT,
};
use crate::tile::{Tile, TileId, NUM_TILES};

/// Vendored Fisher-Yates shuffle.
///
/// Does NOT depend on `rand::seq::SliceRandom`, whose internal algorithm may
/// change across rand versions.
pub fn fisher_yates_shuffle<T>(slice: &mut [T], rng: &mut impl Rng) {
    for i in (1..slice.len()).rev() {
        let j = rng.random_range(0..=i);
        slice.swap(i, j);
    }
}

/// `SHA-256(session_seed || nonce_le || round_index_le)`.
pub fn derive_round_seed(session_seed: &[u8; 32], nonce: u64, round_index: u32) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(session_seed);
    hasher.update(nonce.to_le_bytes());
    hasher.update(round_index.to_le_bytes());
    hasher.finalize().into()
}

/// Shuffled 136-tile wall for one round of a game.
pub fn generate_wall(session_seed: &[u8; 32], nonce: u64, round_index: u32, with_red: bool) -> Vec<Tile> {
    let seed = derive_round_seed(session_seed, nonce, round_index);
    let mut rng = ChaCha8Rng::from_seed(seed);

    let mut ids: Vec<u8> = (0..NUM_TILES as u8).collect();
    fisher_yates_shuffle(&mut ids, &mut rng);
    ids.into_iter()
        .filter_map(TileId::new)
        .map(|id| Tile::from_id(id, with_red))
        .collect()
}

/// Game-level RNG: seat draw at game start.
pub fn game_rng(session_seed: &[u8; 32], nonce: u64) -> ChaCha8Rng {
    let mut hasher = Sha256::new();
    hasher.update(session_seed);
    hasher.update(nonce.to_le_bytes());
    hasher.update(b"seats");
    ChaCha8Rng::from_seed(hasher.finalize().into())
}

/// A deterministic session RNG that produces per-game seeds.
///
/// ```
/// use mahjong_engine::seeding::SessionRng;
///
/// let mut session = SessionRng::new([0u8; 32]);
/// let seed_0 = session.next_game_seed();
/// let seed_1 = session.next_game_seed();
/// assert_ne!(seed_0, seed_1);
/// ```
pub struct SessionRng {
    seed: [u8; 32],
    game_index: u64,
}

impl SessionRng {
    pub fn new(seed: [u8; 32]) -> Self {
        Self {
            seed,
            game_index: 0,
        }
    }

    /// Number of seeds generated so far.
    pub fn game_index(&self) -> u64 {
        self.game_index
    }

    /// `SHA-256(session_seed || game_index_le)`, then advances the counter.
    pub fn next_game_seed(&mut self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.seed);
        hasher.update(self.game_index.to_le_bytes());
        let result: [u8; 32] = hasher.finalize().into();
        self.game_index += 1;
        result
    }
}

/// Builds a wall in round layout from tile text.
///
/// `hands[s]` is the starting hand of seat `s` (13 tiles), `draws` the first
/// tiles of the live wall in draw order and `dora` the first dora indicators.
/// Every other slot receives the unused tiles in id order.
pub fn arrange_wall(hands: [&str; 4], draws: &str, dora: &str, with_red: bool) -> RiichiResult<Vec<Tile>> {
    let mut tm = TileManager::new(with_red);
    let mut wall = Vec::with_capacity(NUM_TILES);
    for (seat, text) in hands.iter().enumerate() {
        let before = wall.len();
        tm.parse_into(text, &mut wall)?;
        if wall.len() - before != 13 {
            return Err(RiichiError::InvalidConfig {
                message: format!("seat {seat} starts with {} tiles", wall.len() - before),
            });
        }
    }

    let mut scripted_draws = Vec::new();
    tm.parse_into(draws, &mut scripted_draws)?;
    let mut scripted_dora = Vec::new();
    tm.parse_into(dora, &mut scripted_dora)?;
    if scripted_draws.len() > LIVE_WALL_COUNT || scripted_dora.len() > INDICATOR_COUNT {
        return Err(RiichiError::InvalidConfig {
            message: "too many scripted draws or dora indicators".to_string(),
        });
    }

    let mut filler = tm.remaining().into_iter();
    let mut fill = |wall: &mut Vec<Tile>, count: usize| {
        wall.extend(filler.by_ref().take(count));
    };

    debug_assert_eq!(wall.len(), HANDS_END);
    let draw_count = scripted_draws.len();
    wall.extend(scripted_draws);
    fill(&mut wall, LIVE_WALL_COUNT - draw_count);
    fill(&mut wall, COMPENSATION_COUNT);
    let dora_count = scripted_dora.len();
    wall.extend(scripted_dora);
    fill(&mut wall, INDICATOR_COUNT - dora_count);
    fill(&mut wall, INDICATOR_COUNT);
    Ok(wall)
}
