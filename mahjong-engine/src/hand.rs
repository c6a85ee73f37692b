//! A player's hand: concealed tiles, declared combos and the result of the
//! last yaku evaluation.

use serde::{Deserialize, Serialize};

use crate::agari;
use crate::combo::TileCombo;
use crate::errors::{RiichiError, RiichiResult};
use crate::tile::{sort_tiles, Tile, TileKind};
use crate::yaku::{best_yakus, get_yakus, thirteen_orphans_yakus, Yaku, WinContext};

/// Net tile count of a hand waiting for a draw; a quad counts as three.
pub const HAND_SIZE: usize = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KanKind {
    /// Four concealed copies.
    Concealed,
    /// An open triplet upgraded with the fourth copy.
    Added,
    /// Three concealed copies plus an opponent's discard.
    Open,
}

/// Yaku of a complete hand and the meld partition that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub yakus: Vec<Yaku>,
    /// Declared combos first, then the concealed melds. Empty for thirteen
    /// orphans and nagashi mangan.
    pub combos: Vec<TileCombo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hand {
    concealed: Vec<Tile>,
    declared: Vec<TileCombo>,
    latest_pick: Option<Tile>,
    evaluation: Option<Evaluation>,
}

impl Hand {
    /// A starting hand of exactly 13 tiles.
    pub fn new(tiles: Vec<Tile>) -> RiichiResult<Hand> {
        Self::from_parts(tiles, Vec::new())
    }

    /// A hand with declared combos, holding 13 or 14 net tiles.
    pub fn from_parts(mut concealed: Vec<Tile>, declared: Vec<TileCombo>) -> RiichiResult<Hand> {
        let net = concealed.len() + 3 * declared.len();
        if net != HAND_SIZE && net != HAND_SIZE + 1 {
            return Err(RiichiError::InvalidHand {
                message: format!("a hand holds 13 or 14 tiles, got {net}"),
            });
        }
        for (i, a) in concealed.iter().enumerate() {
            let duplicate = concealed[i + 1..].iter().any(|b| a.same_instance(b))
                || declared.iter().any(|c| c.tiles().iter().any(|b| a.same_instance(b)));
            if duplicate {
                return Err(RiichiError::InvalidHand {
                    message: format!("tile id {} appears twice", a.id().value()),
                });
            }
        }
        sort_tiles(&mut concealed);
        Ok(Hand {
            concealed,
            declared,
            latest_pick: None,
            evaluation: None,
        })
    }

    #[inline]
    pub fn concealed_tiles(&self) -> &[Tile] {
        &self.concealed
    }

    #[inline]
    pub fn declared_combos(&self) -> &[TileCombo] {
        &self.declared
    }

    #[inline]
    pub fn latest_pick(&self) -> Option<Tile> {
        self.latest_pick
    }

    /// Last evaluation, `None` when the hand is not (or no longer) a winning one.
    #[inline]
    pub fn evaluation(&self) -> Option<&Evaluation> {
        self.evaluation.as_ref()
    }

    pub fn yakus(&self) -> &[Yaku] {
        self.evaluation.as_ref().map_or(&[], |e| e.yakus.as_slice())
    }

    pub fn yaku_combos(&self) -> &[TileCombo] {
        self.evaluation.as_ref().map_or(&[], |e| e.combos.as_slice())
    }

    /// The last evaluation found at least one yaku.
    pub fn is_complete(&self) -> bool {
        self.evaluation.as_ref().is_some_and(|e| !e.yakus.is_empty())
    }

    /// Concealed tiles plus three per declared combo.
    pub fn net_tile_count(&self) -> usize {
        self.concealed.len() + 3 * self.declared.len()
    }

    /// Concealed and declared tiles together.
    pub fn all_tiles(&self) -> Vec<Tile> {
        let mut tiles = self.concealed.clone();
        tiles.extend(self.declared.iter().flat_map(|c| c.tiles().iter().copied()));
        tiles
    }

    /// No declared combo was built from a stolen tile.
    pub fn is_concealed(&self) -> bool {
        self.declared.iter().all(TileCombo::is_concealed)
    }

    pub fn contains_instance(&self, tile: &Tile) -> bool {
        self.concealed.iter().any(|t| t.same_instance(tile))
    }

    pub fn count_kind(&self, kind: TileKind) -> usize {
        self.concealed.iter().filter(|t| t.kind() == kind).count()
    }

    // ---------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------

    /// Adds a drawn tile. Panics unless the hand holds 13 net tiles.
    pub fn pick(&mut self, tile: Tile) {
        assert_eq!(
            self.net_tile_count(),
            HAND_SIZE,
            "picking into a hand of {} tiles",
            self.net_tile_count()
        );
        self.insert(tile);
        self.latest_pick = Some(tile);
    }

    fn insert(&mut self, tile: Tile) {
        let key = tile.sort_key();
        let pos = self.concealed.partition_point(|t| t.sort_key() < key);
        self.concealed.insert(pos, tile);
    }

    /// Takes a tile instance out of the concealed tiles.
    pub(crate) fn remove_instance(&mut self, tile: &Tile) -> bool {
        match self.concealed.iter().position(|t| t.same_instance(tile)) {
            Some(pos) => {
                self.concealed.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Takes back a drawn tile, as when a kan is robbed before its
    /// compensation tile is played.
    pub(crate) fn undo_pick(&mut self, tile: &Tile) -> bool {
        if !self.remove_instance(tile) {
            return false;
        }
        if self.latest_pick.is_some_and(|t| t.same_instance(tile)) {
            self.latest_pick = None;
        }
        true
    }

    /// Whether `tile` may leave the hand. Right after a call the stolen kind is
    /// forbidden, and so is the tile extending a chii on its far side.
    pub fn can_discard_tile(&self, tile: &Tile, after_stealing: bool) -> bool {
        if !self.contains_instance(tile) {
            return false;
        }
        if !after_stealing {
            return true;
        }
        let Some((combo, stolen)) = self
            .declared
            .last()
            .and_then(|c| c.open_tile().map(|t| (c, t)))
        else {
            return true;
        };
        if stolen.kind() == tile.kind() {
            return false;
        }
        if combo.is_run() && tile.family() == combo.family() {
            let first = combo.tiles()[0].number();
            let last = combo.tiles()[2].number();
            if stolen.number() == first && tile.number() == first + 3 {
                return false;
            }
            if stolen.number() == last && last >= 4 && tile.number() == last - 3 {
                return false;
            }
        }
        true
    }

    pub fn discard(&mut self, tile: &Tile, after_stealing: bool) -> bool {
        if !self.can_discard_tile(tile, after_stealing) {
            return false;
        }
        self.remove_instance(tile);
        self.latest_pick = None;
        true
    }

    /// Builds a run starting at `start_number` with the stolen `tile`.
    pub fn declare_chii(&mut self, tile: Tile, stolen_from: usize, start_number: u8) -> bool {
        if tile.is_honor()
            || !(1..=7).contains(&start_number)
            || tile.number() < start_number
            || tile.number() > start_number + 2
        {
            return false;
        }
        let mut tiles = Vec::with_capacity(3);
        for n in (start_number..start_number + 3).filter(|&n| n != tile.number()) {
            let Some(t) = self
                .concealed
                .iter()
                .find(|t| t.family() == tile.family() && t.number() == n)
            else {
                return false;
            };
            tiles.push(*t);
        }
        self.extract_combo(tiles, tile, stolen_from)
    }

    pub fn declare_pon(&mut self, tile: Tile, stolen_from: usize) -> bool {
        let tiles: Vec<Tile> = self
            .concealed
            .iter()
            .filter(|t| t.kind() == tile.kind())
            .take(2)
            .copied()
            .collect();
        if tiles.len() < 2 {
            return false;
        }
        self.extract_combo(tiles, tile, stolen_from)
    }

    fn extract_combo(&mut self, mut tiles: Vec<Tile>, stolen: Tile, stolen_from: usize) -> bool {
        tiles.push(stolen);
        let Ok(combo) = TileCombo::new_open(tiles, stolen, stolen_from) else {
            return false;
        };
        for t in combo.tiles().iter().filter(|t| !t.same_instance(&stolen)) {
            self.remove_instance(t);
        }
        self.declared.push(combo);
        self.evaluation = None;
        true
    }

    /// Declares a kan on `tile`. With `stolen_from` the tile is an opponent's
    /// discard; otherwise it is a concealed quad or a pon upgrade, in that order.
    pub fn declare_kan(&mut self, tile: Tile, stolen_from: Option<usize>) -> Option<KanKind> {
        let kind = tile.kind();
        let same: Vec<Tile> = self
            .concealed
            .iter()
            .filter(|t| t.kind() == kind)
            .copied()
            .collect();

        let result = if let Some(seat) = stolen_from {
            if same.len() < 3 {
                return None;
            }
            let mut tiles = same[..3].to_vec();
            tiles.push(tile);
            let combo = TileCombo::new_open(tiles, tile, seat).ok()?;
            for t in &same[..3] {
                self.remove_instance(t);
            }
            self.declared.push(combo);
            KanKind::Open
        } else if same.len() == 4 {
            let combo = TileCombo::new(same.clone()).ok()?;
            for t in &same {
                self.remove_instance(t);
            }
            self.declared.push(combo);
            KanKind::Concealed
        } else {
            let pos = self
                .declared
                .iter()
                .position(|c| c.is_triplet() && !c.is_concealed() && c.first_kind() == kind)?;
            let own = *same.first()?;
            let quad = self.declared[pos].upgraded(own).ok()?;
            self.remove_instance(&own);
            self.declared[pos] = quad;
            KanKind::Added
        };
        self.evaluation = None;
        Some(result)
    }

    // ---------------------------------------------------------------------
    // Evaluation
    // ---------------------------------------------------------------------

    /// Evaluates the hand won on `ctx.latest_tile`, keeping the partition with
    /// the highest fan. `None` when incomplete or without yaku.
    pub fn evaluate(&self, ctx: &WinContext) -> Option<Evaluation> {
        let mut tiles = self.concealed.clone();
        if !ctx.draw_type.is_self_draw() {
            tiles.push(ctx.latest_tile);
            sort_tiles(&mut tiles);
        }
        if !agari::is_complete(&tiles, &self.declared) {
            return None;
        }
        if agari::is_thirteen_orphans(&tiles, &self.declared) {
            return Some(Evaluation {
                yakus: thirteen_orphans_yakus(ctx),
                combos: Vec::new(),
            });
        }

        let mut candidates: Vec<(Vec<Yaku>, Vec<TileCombo>)> =
            agari::standard_partitions(&tiles, &self.declared)
                .into_iter()
                .map(|p| (get_yakus(&p, ctx), p))
                .collect();
        if agari::is_seven_pairs(&tiles, &self.declared) {
            let pairs = agari::seven_pairs_combos(&tiles);
            candidates.push((get_yakus(&pairs, ctx), pairs));
        }

        best_yakus(&candidates, self.is_concealed())
            .filter(|(yakus, _)| !yakus.is_empty())
            .map(|(yakus, combos)| Evaluation {
                yakus: yakus.clone(),
                combos: combos.clone(),
            })
    }

    /// Runs [`Hand::evaluate`] and stores the outcome.
    pub fn set_yakus(&mut self, ctx: &WinContext) -> bool {
        self.evaluation = self.evaluate(ctx);
        self.is_complete()
    }

    pub(crate) fn set_nagashi(&mut self) {
        self.evaluation = Some(Evaluation {
            yakus: vec![Yaku::NagashiMangan],
            combos: Vec::new(),
        });
    }

    /// Moves the tile won by ron into the concealed tiles.
    pub fn set_from_ron(&mut self, tile: Tile) {
        self.insert(tile);
        self.latest_pick = Some(tile);
    }

    /// A 13-tile hand plus `tile` has a complete shape (no yaku required).
    pub fn completes_with(&self, tile: &Tile) -> bool {
        let mut tiles = self.concealed.clone();
        tiles.push(*tile);
        agari::is_complete(&tiles, &self.declared)
    }

    /// The winning tile sat in a pair, the middle of a run or the inner side
    /// of an edge run, with no alternative reading of the same partition.
    pub fn closed_wait(&self) -> bool {
        let Some(win) = self.latest_pick else {
            return false;
        };
        let concealed_melds = self
            .yaku_combos()
            .get(self.declared.len()..)
            .unwrap_or_default();
        let mut holders = concealed_melds
            .iter()
            .filter(|c| c.contains_kind(win.kind()))
            .peekable();
        holders.peek().is_some()
            && holders.all(|c| c.is_pair() || c.is_middle_wait(&win) || c.is_edge_wait(&win))
    }

    /// Kinds completing a 13-tile hand.
    pub fn waits(&self) -> Vec<TileKind> {
        agari::waits(&self.concealed, &self.declared)
    }

    pub fn tenpai_with(&self, candidates: &[TileKind]) -> bool {
        agari::is_tenpai(&self.concealed, &self.declared, candidates)
    }

    /// Discards of a 14-tile hand that keep it tenpai.
    pub fn tenpai_discards(&self, candidates: &[TileKind]) -> Vec<Tile> {
        agari::tenpai_discards(&self.concealed, &self.declared, candidates)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_hand, parse_tiles};
    use crate::tile::Wind;
    use crate::yaku::DrawType;

    fn hand(text: &str) -> Hand {
        let (concealed, declared) = parse_hand(text, false).unwrap();
        Hand::from_parts(concealed, declared).unwrap()
    }

    /// A tile not used by `hand(..)` of the same kind.
    fn spare(kind_text: &str, nth: usize) -> Tile {
        parse_tiles(&kind_text.repeat(nth + 1), false).unwrap()[nth]
    }

    #[test]
    fn rejects_wrong_size() {
        let tiles = parse_tiles("123m456p", false).unwrap();
        assert!(Hand::new(tiles).is_err());
    }

    #[test]
    fn pick_keeps_order_and_tracks_latest() {
        let mut h = hand("9m123p456s789s111z");
        let t = spare("1m", 0);
        h.pick(t);
        assert_eq!(h.concealed_tiles()[0].kind(), t.kind());
        assert!(h.latest_pick().unwrap().same_instance(&t));
        assert_eq!(h.net_tile_count(), 14);
    }

    #[test]
    #[should_panic]
    fn pick_into_full_hand_panics() {
        let mut h = hand("123m456p789s11122z");
        h.pick(spare("9p", 3));
    }

    #[test]
    fn pon_then_kuikae() {
        let mut h = hand("55m123p456s789s11z");
        let stolen = spare("5m", 2);
        assert!(h.declare_pon(stolen, 1));
        assert_eq!(h.net_tile_count(), 14);
        assert!(!h.is_concealed());
        let one_z = h.concealed_tiles().iter().find(|t| t.is_honor()).copied().unwrap();
        assert!(h.can_discard_tile(&one_z, true));
    }

    #[test]
    fn chii_forbids_swap_back() {
        let mut h = hand("23m4m678p456s789s1z");
        let stolen = spare("1m", 0);
        assert!(h.declare_chii(stolen, 3, 1));
        let four = *h
            .concealed_tiles()
            .iter()
            .find(|t| t.family() == stolen.family() && t.number() == 4)
            .unwrap();
        assert!(!h.can_discard_tile(&four, true));
        assert!(h.can_discard_tile(&four, false));
    }

    #[test]
    fn chii_needs_both_neighbours() {
        let mut h = hand("2m5m678p456s789s11z");
        assert!(!h.declare_chii(spare("1m", 0), 3, 1));
        assert!(!h.declare_chii(spare("1z", 2), 3, 1));
        assert!(h.is_concealed());
    }

    #[test]
    fn kan_kinds() {
        let mut h = hand("1111m23p456s789s11z");
        assert_eq!(h.declare_kan(h.concealed_tiles()[0], None), Some(KanKind::Concealed));
        assert!(h.is_concealed());
        assert_eq!(h.net_tile_count(), 13);

        let mut open = hand("999p23p456s789s1z");
        let discard = spare("9p", 3);
        assert_eq!(open.declare_kan(discard, Some(2)), Some(KanKind::Open));
        assert!(!open.is_concealed());

        let mut added = hand("9p23p456s789s1z(p5z1)");
        let fourth = spare("5z", 3);
        added.pick(fourth);
        assert_eq!(added.declare_kan(fourth, None), Some(KanKind::Added));
        assert!(added.declared_combos()[0].is_quad());
        assert_eq!(added.declared_combos()[0].stolen_from(), Some(1));
    }

    #[test]
    fn evaluates_ron_without_mutating() {
        let waiting = hand("123m456p789s3334z");
        let win = spare("4z", 1);
        let ctx = WinContext::new(win, DrawType::OpponentDiscard, Wind::East, Wind::South);
        // No yaku on a plain ron.
        assert!(waiting.evaluate(&ctx).is_none());
        assert!(waiting.completes_with(&win));
        assert_eq!(waiting.net_tile_count(), 13);
    }

    #[test]
    fn tsumo_evaluation_is_stored() {
        let mut h = hand("123m456p789s3334z");
        let win = spare("4z", 1);
        h.pick(win);
        let ctx = WinContext::new(win, DrawType::Wall, Wind::East, Wind::South);
        assert!(h.set_yakus(&ctx));
        assert_eq!(h.yakus(), &[Yaku::MenzenTsumo]);
        assert_eq!(h.yaku_combos().len(), 5);
        // Single wait on the pair.
        assert!(h.closed_wait());
    }

    #[test]
    fn open_wait_is_not_closed() {
        let mut h = hand("23m456p789s33344z");
        let win = spare("1m", 0);
        h.pick(win);
        let ctx = WinContext::new(win, DrawType::Wall, Wind::East, Wind::South);
        assert!(h.set_yakus(&ctx));
        assert!(!h.closed_wait());
    }

    #[test]
    fn waits_and_tenpai_discards() {
        let h = hand("123m456p789s3334z");
        assert_eq!(h.waits().len(), 1);
        let all: Vec<TileKind> = (0..34).filter_map(TileKind::new).collect();
        assert!(h.tenpai_with(&all));
        let none: Vec<TileKind> = all.iter().copied().filter(|k| *k != h.waits()[0]).collect();
        assert!(!h.tenpai_with(&none));

        let mut full = hand("123m456p789s3334z");
        full.pick(spare("9m", 0));
        let discards = full.tenpai_discards(&all);
        assert!(discards.iter().any(|t| t.kind() == spare("9m", 0).kind()));
    }

    #[test]
    fn all_tiles_includes_declared() {
        let h = hand("23p456s789s11z(p5z1)");
        assert_eq!(h.all_tiles().len(), 13);
        assert!(!h.is_concealed());
    }
}
