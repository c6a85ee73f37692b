//! Live wall and dead wall of a round.
//!
//! A 136-tile permutation is laid out as: four starting hands of 13 tiles,
//! the live wall, 4 compensation tiles, 5 dora indicators and 5 ura indicators.

use serde::{Deserialize, Serialize};

use crate::tile::Tile;

pub const HANDS_END: usize = 52;
pub const LIVE_WALL_COUNT: usize = 70;
pub const COMPENSATION_COUNT: usize = 4;
pub const INDICATOR_COUNT: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wall {
    live: Vec<Tile>,
    compensation: Vec<Tile>,
    dora: Vec<Tile>,
    ura: Vec<Tile>,
    /// Tiles moved from the end of the live wall into the dead wall by kans.
    dead_treasure: Vec<Tile>,
}

impl Wall {
    /// Splits a full permutation into starting hands and walls.
    pub(crate) fn split(tiles: &[Tile]) -> ([Vec<Tile>; 4], Wall) {
        let hands = [0, 1, 2, 3].map(|s: usize| tiles[13 * s..13 * (s + 1)].to_vec());
        let live_end = HANDS_END + LIVE_WALL_COUNT;
        let comp_end = live_end + COMPENSATION_COUNT;
        let dora_end = comp_end + INDICATOR_COUNT;
        let wall = Wall {
            live: tiles[HANDS_END..live_end].to_vec(),
            compensation: tiles[live_end..comp_end].to_vec(),
            dora: tiles[comp_end..dora_end].to_vec(),
            ura: tiles[dora_end..dora_end + INDICATOR_COUNT].to_vec(),
            dead_treasure: Vec::new(),
        };
        (hands, wall)
    }

    #[inline]
    pub fn live_tiles(&self) -> &[Tile] {
        &self.live
    }

    #[inline]
    pub fn compensation_tiles(&self) -> &[Tile] {
        &self.compensation
    }

    #[inline]
    pub fn dora_indicators(&self) -> &[Tile] {
        &self.dora
    }

    #[inline]
    pub fn ura_indicators(&self) -> &[Tile] {
        &self.ura
    }

    #[inline]
    pub fn dead_treasure_tiles(&self) -> &[Tile] {
        &self.dead_treasure
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.live.len()
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.live.is_empty()
    }

    pub fn kan_count(&self) -> usize {
        COMPENSATION_COUNT - self.compensation.len()
    }

    /// One indicator plus one per kan.
    pub fn visible_dora_count(&self) -> usize {
        1 + self.kan_count()
    }

    pub fn visible_dora_indicators(&self) -> &[Tile] {
        &self.dora[..self.visible_dora_count()]
    }

    pub fn visible_ura_indicators(&self) -> &[Tile] {
        &self.ura[..self.visible_dora_count()]
    }

    pub fn hidden_dora_indicators(&self) -> &[Tile] {
        &self.dora[self.visible_dora_count()..]
    }

    /// Every tile still held by the walls.
    pub fn tile_count(&self) -> usize {
        self.live.len()
            + self.compensation.len()
            + self.dora.len()
            + self.ura.len()
            + self.dead_treasure.len()
    }

    pub(crate) fn pick(&mut self) -> Option<Tile> {
        if self.live.is_empty() {
            return None;
        }
        Some(self.live.remove(0))
    }

    /// Draws a compensation tile; the last live tile joins the dead wall.
    pub(crate) fn pick_compensation(&mut self) -> Option<Tile> {
        if self.compensation.is_empty() || self.live.is_empty() {
            return None;
        }
        let tile = self.compensation.remove(0);
        if let Some(last) = self.live.pop() {
            self.dead_treasure.push(last);
        }
        Some(tile)
    }

    pub(crate) fn undo_compensation(&mut self, tile: Tile) {
        self.compensation.insert(0, tile);
        if let Some(t) = self.dead_treasure.pop() {
            self.live.push(t);
        }
    }
}
