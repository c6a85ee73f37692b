//! Discard safety from one seat's point of view: genbutsu, suji, kabe, one-chance.
//!
//! Rebuilt from the visible state of a round before each CPU discard
//! decision. Opponents are indexed relative to the observer: 0 is the
//! next seat (shimocha), 2 the previous one (kamicha).

use mahjong_engine::tile::{relative_seat, TileKind, NUM_TILE_KINDS};
use mahjong_engine::Round;

/// Number of opponents to track safety against.
pub const NUM_OPPONENTS: usize = 3;

const NP: usize = 4;

/// Danger level of a discard against one opponent, safest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Safety {
    /// The opponent cannot ron on it.
    Safe,
    /// Suji or kabe against a riichi player.
    QuiteSafe,
    /// Nothing is known (the opponent is not in riichi).
    Unknown,
    QuiteUnsafe,
    Unsafe,
}

impl Safety {
    /// Weight used to rank discards: lower is safer.
    #[inline]
    pub const fn risk(self) -> u32 {
        self as u32
    }
}

#[derive(Debug, Clone)]
pub struct SafetyInfo {
    /// Seat the information is computed for.
    pub observer: usize,
    // genbutsu[opp][kind] = true if the opponent discarded this kind
    pub genbutsu: [[bool; NUM_TILE_KINDS]; NUM_OPPONENTS],
    // riichi_era[opp][kind] = true if anyone passed this kind after the opponent's riichi
    pub riichi_era: [[bool; NUM_TILE_KINDS]; NUM_OPPONENTS],
    // suji[opp][kind] = true if a kind three away is genbutsu
    pub suji: [[bool; NUM_TILE_KINDS]; NUM_OPPONENTS],

    // -- Kabe (wall block): all 4 copies visible --
    pub kabe: [bool; NUM_TILE_KINDS],
    // -- One-chance: 3 copies visible, 1 remaining --
    pub one_chance: [bool; NUM_TILE_KINDS],
    pub visible_counts: [u8; NUM_TILE_KINDS],

    pub opponent_riichi: [bool; NUM_OPPONENTS],
}

impl SafetyInfo {
    pub fn new(observer: usize) -> Self {
        Self {
            observer,
            genbutsu: [[false; NUM_TILE_KINDS]; NUM_OPPONENTS],
            riichi_era: [[false; NUM_TILE_KINDS]; NUM_OPPONENTS],
            suji: [[false; NUM_TILE_KINDS]; NUM_OPPONENTS],
            kabe: [false; NUM_TILE_KINDS],
            one_chance: [false; NUM_TILE_KINDS],
            visible_counts: [0; NUM_TILE_KINDS],
            opponent_riichi: [false; NUM_OPPONENTS],
        }
    }

    /// Collects everything `observer` can see in `round`.
    pub fn from_round(round: &Round, observer: usize) -> Self {
        let mut info = Self::new(observer);
        for opp in 0..NUM_OPPONENTS {
            let seat = info.opponent_seat(opp);
            for t in round.virtual_discards(seat) {
                info.on_discard(t.kind(), opp);
            }
            let Some(record) = round.riichi(seat) else {
                continue;
            };
            info.on_riichi(opp);
            for s in (0..NP).filter(|&s| s != seat) {
                let since = record.opponent_discard_ranks[s].unwrap_or(0);
                for t in round.virtual_discards(s).iter().skip(since) {
                    info.on_passed(t.kind(), opp);
                }
            }
        }
        for t in round.dead_tiles_for(observer) {
            info.on_revealed(t.kind());
        }
        info
    }

    /// Opponent index of `seat`, `None` for the observer itself.
    pub fn opponent_index(&self, seat: usize) -> Option<usize> {
        ((seat + NP - self.observer) % NP).checked_sub(1)
    }

    pub fn opponent_seat(&self, opp: usize) -> usize {
        relative_seat(self.observer, opp as isize + 1)
    }
}

// ---------------------------------------------------------------------------
// Incremental updates
// ---------------------------------------------------------------------------

impl SafetyInfo {
    /// The opponent discarded a tile of `kind`.
    pub fn on_discard(&mut self, kind: TileKind, opp: usize) {
        if opp >= NUM_OPPONENTS {
            return;
        }
        self.genbutsu[opp][kind.index()] = true;
        self.update_suji(opp, kind);
    }

    /// Someone discarded `kind` after the opponent's riichi and it was not ronned.
    pub fn on_passed(&mut self, kind: TileKind, opp: usize) {
        if opp < NUM_OPPONENTS {
            self.riichi_era[opp][kind.index()] = true;
        }
    }

    pub fn on_riichi(&mut self, opp: usize) {
        if opp < NUM_OPPONENTS {
            self.opponent_riichi[opp] = true;
        }
    }

    /// One more copy of `kind` is visible to the observer.
    pub fn on_revealed(&mut self, kind: TileKind) {
        let idx = kind.index();
        self.visible_counts[idx] = self.visible_counts[idx].saturating_add(1);
        self.kabe[idx] = self.visible_counts[idx] >= 4;
        self.one_chance[idx] = self.visible_counts[idx] == 3;
    }

    /// 1-4-7, 2-5-8, 3-6-9: a safe N protects N-3 and N+3 against a two-sided wait.
    fn update_suji(&mut self, opp: usize, kind: TileKind) {
        if kind.is_honor() {
            return;
        }
        for delta in [-3, 3] {
            if let Some(k) = kind.offset(delta) {
                self.suji[opp][k.index()] = true;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

impl SafetyInfo {
    /// Safety of discarding `kind` against one opponent.
    pub fn against(&self, opp: usize, kind: TileKind) -> Safety {
        let idx = kind.index();
        if !self.opponent_riichi[opp] {
            return Safety::Unknown;
        }
        if self.genbutsu[opp][idx] || self.riichi_era[opp][idx] || self.is_dead_honor(kind) {
            return Safety::Safe;
        }
        if self.suji[opp][idx] || self.kabe[idx] || self.one_chance[idx] {
            return Safety::QuiteSafe;
        }
        if kind.is_honor_or_terminal() {
            Safety::QuiteUnsafe
        } else {
            Safety::Unsafe
        }
    }

    /// Sum of the risks against every opponent.
    pub fn danger(&self, kind: TileKind) -> u32 {
        (0..NUM_OPPONENTS).map(|opp| self.against(opp, kind).risk()).sum()
    }

    pub fn any_riichi(&self) -> bool {
        self.opponent_riichi.iter().any(|&r| r)
    }

    /// All four copies of an honor are in sight: nobody can wait on it.
    fn is_dead_honor(&self, kind: TileKind) -> bool {
        kind.is_honor() && self.kabe[kind.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(id: u8) -> TileKind {
        TileKind::new(id).unwrap()
    }

    #[test]
    fn new_safety_info_is_empty() {
        let si = SafetyInfo::new(0);
        for opp in 0..NUM_OPPONENTS {
            assert!(si.genbutsu[opp].iter().all(|&v| !v));
            assert!(si.riichi_era[opp].iter().all(|&v| !v));
            assert!(si.suji[opp].iter().all(|&v| !v));
            assert!(!si.opponent_riichi[opp]);
        }
        assert!(si.visible_counts.iter().all(|&v| v == 0));
        assert!(!si.any_riichi());
    }

    #[test]
    fn opponent_indices_are_relative() {
        let si = SafetyInfo::new(2);
        assert_eq!(si.opponent_index(2), None);
        assert_eq!(si.opponent_index(3), Some(0));
        assert_eq!(si.opponent_index(0), Some(1));
        assert_eq!(si.opponent_index(1), Some(2));
        for opp in 0..NUM_OPPONENTS {
            assert_eq!(si.opponent_index(si.opponent_seat(opp)), Some(opp));
        }
    }

    #[test]
    fn discard_sets_genbutsu_and_suji() {
        let mut si = SafetyInfo::new(0);
        si.on_discard(kind(3), 1); // 4m
        assert!(si.genbutsu[1][3]);
        assert!(!si.genbutsu[0][3]);
        assert!(si.suji[1][0]); // 1m
        assert!(si.suji[1][6]); // 7m
        assert!(!si.suji[1][9]); // 1p is another suit
    }

    #[test]
    fn honors_have_no_suji() {
        let mut si = SafetyInfo::new(0);
        si.on_discard(kind(30), 0);
        assert!(si.suji[0].iter().all(|&v| !v));
    }

    #[test]
    fn kabe_and_one_chance_follow_visible_counts() {
        let mut si = SafetyInfo::new(0);
        for _ in 0..3 {
            si.on_revealed(kind(13));
        }
        assert!(si.one_chance[13]);
        assert!(!si.kabe[13]);
        si.on_revealed(kind(13));
        assert!(si.kabe[13]);
        assert!(!si.one_chance[13]);
    }

    #[test]
    fn only_riichi_opponents_are_ranked() {
        let mut si = SafetyInfo::new(0);
        assert_eq!(si.against(0, kind(4)), Safety::Unknown);
        si.on_riichi(0);
        assert_eq!(si.against(0, kind(4)), Safety::Unsafe);
        assert_eq!(si.against(0, kind(27)), Safety::QuiteUnsafe);
        si.on_passed(kind(5), 0);
        assert_eq!(si.against(0, kind(5)), Safety::Safe);
        si.on_discard(kind(4), 0); // 5m protects 2m and 8m
        assert_eq!(si.against(0, kind(4)), Safety::Safe);
        assert_eq!(si.against(0, kind(1)), Safety::QuiteSafe);
        assert_eq!(si.against(0, kind(7)), Safety::QuiteSafe);
    }

    #[test]
    fn dead_honor_is_safe() {
        let mut si = SafetyInfo::new(0);
        si.on_riichi(1);
        for _ in 0..4 {
            si.on_revealed(kind(31));
        }
        assert_eq!(si.against(1, kind(31)), Safety::Safe);
        assert_eq!(si.danger(kind(31)), Safety::Unknown.risk() * 2);
    }
}
