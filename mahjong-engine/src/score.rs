//! Fu, fan and point charts.

use crate::hand::Hand;
use crate::rule::GameRule;
use crate::tile::{Tile, Wind};
use crate::yaku::{Yaku, YAKUMAN_FAN};

/// Stake of a riichi declaration.
pub const RIICHI_COST: i32 = 1000;
/// Paid by the losers per honba, all losers together.
pub const HONBA_VALUE: i32 = 300;
/// Pool shared between tenpai and noten players at an exhaustive draw.
pub const TENPAI_POOL: i32 = 3000;
/// End of game bonus by rank.
pub const UMA: [i32; 4] = [15, 5, -5, -15];

const CHIITOITSU_FU: u32 = 25;

// (fan, fu, ron, east tsumo share, other tsumo share)
const CHART_OTHER: [(u32, u32, i32, i32, i32); 29] = [
    (1, 30, 1000, 500, 300),
    (1, 40, 1300, 700, 400),
    (1, 50, 1600, 800, 400),
    (1, 60, 2000, 1000, 500),
    (1, 70, 2300, 1200, 600),
    (1, 80, 2600, 1300, 700),
    (1, 90, 2900, 1500, 800),
    (1, 100, 3200, 1600, 800),
    (1, 110, 3600, 1800, 900),
    (2, 20, 1300, 700, 400),
    (2, 25, 1600, 0, 0),
    (2, 30, 2000, 1000, 500),
    (2, 40, 2600, 1300, 700),
    (2, 50, 3200, 1600, 800),
    (2, 60, 3900, 2000, 1000),
    (2, 70, 4500, 2300, 1200),
    (2, 80, 5200, 2600, 1300),
    (2, 90, 5800, 2900, 1500),
    (2, 100, 6400, 3200, 1600),
    (2, 110, 7100, 3600, 1800),
    (3, 20, 2600, 1300, 700),
    (3, 25, 3200, 1600, 800),
    (3, 30, 3900, 2000, 1000),
    (3, 40, 5200, 2600, 1300),
    (3, 50, 6400, 3200, 1600),
    (3, 60, 7700, 3900, 2000),
    (4, 20, 5200, 2600, 1300),
    (4, 25, 6400, 3200, 1600),
    (4, 30, 7700, 3900, 2000),
];

// (fan, fu, ron, tsumo share of each player)
const CHART_EAST: [(u32, u32, i32, i32); 29] = [
    (1, 30, 1500, 500),
    (1, 40, 2000, 700),
    (1, 50, 2400, 800),
    (1, 60, 2900, 1000),
    (1, 70, 3400, 1200),
    (1, 80, 3900, 1300),
    (1, 90, 4400, 1500),
    (1, 100, 4800, 1600),
    (1, 110, 5300, 1800),
    (2, 20, 2000, 700),
    (2, 25, 2400, 0),
    (2, 30, 2900, 1000),
    (2, 40, 3900, 1300),
    (2, 50, 4800, 1600),
    (2, 60, 5800, 2000),
    (2, 70, 6800, 2300),
    (2, 80, 7700, 2600),
    (2, 90, 8700, 2900),
    (2, 100, 9600, 3200),
    (2, 110, 10600, 3600),
    (3, 20, 3900, 1300),
    (3, 25, 4800, 1600),
    (3, 30, 5800, 2000),
    (3, 40, 7700, 2600),
    (3, 50, 9600, 3200),
    (3, 60, 10600, 3900),
    (4, 20, 7700, 2600),
    (4, 25, 9600, 3200),
    (4, 30, 11600, 3900),
];

// Base points of a non-dealer from mangan up, keyed by minimal fan.
const OVER_FOUR_FAN: [(u32, i32); 5] = [(5, 2000), (6, 3000), (8, 4000), (11, 6000), (13, 8000)];

// ---------------------------------------------------------------------------
// Fu
// ---------------------------------------------------------------------------

/// Fu of an evaluated hand; 0 when the hand holds no evaluation.
///
/// Triplets count 2 (4 for terminals and honors), doubled when concealed;
/// quads four times a triplet. A concealed triplet completed by ron counts as open.
pub fn fu_count(hand: &Hand, is_tsumo: bool, dominant_wind: Wind, seat_wind: Wind) -> u32 {
    let Some(evaluation) = hand.evaluation() else {
        return 0;
    };
    if evaluation.yakus.contains(&Yaku::Chiitoitsu) {
        return CHIITOITSU_FU;
    }
    let pinfu = evaluation.yakus.contains(&Yaku::Pinfu);
    let ron_tile = if is_tsumo { None } else { hand.latest_pick() };

    let mut fu = 0;
    for combo in &evaluation.combos {
        if !combo.is_triplet_or_quad() {
            continue;
        }
        let mut value = if combo.has_terminal_or_honor() { 4 } else { 2 };
        let robbed = ron_tile.is_some_and(|t| combo.tiles().iter().any(|c| c.same_instance(&t)));
        if combo.is_concealed() && !robbed {
            value *= 2;
        }
        if combo.is_quad() {
            value *= 4;
        }
        fu += value;
    }
    if is_tsumo && !pinfu {
        fu += 2;
    }
    let valuable_pair = evaluation
        .combos
        .iter()
        .any(|c| c.is_pair() && c.is_valuable(dominant_wind, seat_wind));
    if valuable_pair {
        fu += 2;
    }
    if hand.closed_wait() {
        fu += 2;
    }
    // Open hand without any fu.
    if fu == 0 && !pinfu {
        fu += 2;
    }

    let base = if hand.is_concealed() && !is_tsumo { 30 } else { 20 };
    round_up(base + fu, 10)
}

#[inline]
fn round_up(value: u32, step: u32) -> u32 {
    value.div_ceil(step) * step
}

// ---------------------------------------------------------------------------
// Fan
// ---------------------------------------------------------------------------

/// Dora, ura dora and red five counts of a winning hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DoraCount {
    pub dora: u32,
    pub ura_dora: u32,
    pub red_dora: u32,
}

impl DoraCount {
    /// Counts over `tiles`; every indicator counts separately.
    pub fn of(tiles: &[Tile], dora_indicators: &[Tile], ura_indicators: &[Tile]) -> Self {
        let hits = |indicators: &[Tile]| -> u32 {
            indicators
                .iter()
                .map(|i| tiles.iter().filter(|t| t.is_dora_next(i)).count() as u32)
                .sum()
        };
        Self {
            dora: hits(dora_indicators),
            ura_dora: hits(ura_indicators),
            red_dora: tiles.iter().filter(|t| t.is_red()).count() as u32,
        }
    }

    #[inline]
    pub fn total(&self) -> u32 {
        self.dora + self.ura_dora + self.red_dora
    }
}

/// Fan of a yaku list plus dora. Yakuman ignore dora.
pub fn fan_count(yakus: &[Yaku], concealed: bool, dora: DoraCount, rule: &GameRule) -> u32 {
    let yakumans = yakus.iter().filter(|y| y.is_yakuman()).count() as u32;
    if yakumans > 0 {
        return YAKUMAN_FAN * if rule.multiple_yakumans { yakumans } else { 1 };
    }
    let fan: u32 = yakus.iter().map(|y| y.fan(concealed)).sum::<u32>() + dora.total();
    if fan >= YAKUMAN_FAN {
        if rule.kazoe_yakuman {
            YAKUMAN_FAN
        } else {
            YAKUMAN_FAN - 1
        }
    } else {
        fan
    }
}

// ---------------------------------------------------------------------------
// Points
// ---------------------------------------------------------------------------

/// Points of a win, before honba.
///
/// Ron: `(paid by the discarder, 0)`. Tsumo: `(paid by the dealer, paid by each
/// other player)`; for a dealer win both values are the share of each player.
pub fn points(fan: u32, fu: u32, is_tsumo: bool, seat_wind: Wind) -> (i32, i32) {
    let east = seat_wind == Wind::East;
    let fan = match (fan, fu) {
        (4, 40..) | (3, 70..) => 5,
        _ => fan,
    };

    if fan > 4 {
        let mut base = OVER_FOUR_FAN
            .iter()
            .rev()
            .find(|(min, _)| *min <= fan)
            .map_or(OVER_FOUR_FAN[0].1, |(_, b)| *b);
        if east {
            base *= 2;
        }
        if fan > YAKUMAN_FAN {
            base += base * ((fan - YAKUMAN_FAN) / YAKUMAN_FAN) as i32;
        }
        return if is_tsumo {
            (base * if east { 1 } else { 2 }, base)
        } else {
            (base * if east { 3 } else { 4 }, 0)
        };
    }

    if east {
        let row = CHART_EAST
            .iter()
            .rev()
            .find(|r| r.0 <= fan && r.1 <= fu)
            .or_else(|| CHART_EAST.iter().find(|r| r.0 == fan))
            .unwrap_or(&CHART_EAST[0]);
        if is_tsumo {
            (row.3, row.3)
        } else {
            (row.2, 0)
        }
    } else {
        let row = CHART_OTHER
            .iter()
            .rev()
            .find(|r| r.0 <= fan && r.1 <= fu)
            .or_else(|| CHART_OTHER.iter().find(|r| r.0 == fan))
            .unwrap_or(&CHART_OTHER[0]);
        if is_tsumo {
            (row.3, row.4)
        } else {
            (row.2, 0)
        }
    }
}

/// Total a win is worth to the winner, before honba.
pub fn win_total(fan: u32, fu: u32, is_tsumo: bool, seat_wind: Wind) -> i32 {
    let (v1, v2) = points(fan, fu, is_tsumo, seat_wind);
    match (is_tsumo, seat_wind == Wind::East) {
        (false, _) => v1,
        (true, true) => 3 * v1,
        (true, false) => v1 + 2 * v2,
    }
}

/// Exhaustive draw: `(gain of each tenpai player, loss of each noten player)`.
pub fn ryuukyoku_points(tenpai_count: usize) -> (i32, i32) {
    match tenpai_count {
        1 => (TENPAI_POOL, -TENPAI_POOL / 3),
        2 => (TENPAI_POOL / 2, -TENPAI_POOL / 2),
        3 => (TENPAI_POOL / 3, -TENPAI_POOL),
        _ => (0, 0),
    }
}

/// Honba bonus per payer on tsumo, or per winner on ron.
pub fn honba_points(honba: u32, winners: usize, is_tsumo: bool) -> i32 {
    let total = honba as i32 * HONBA_VALUE;
    if is_tsumo {
        total / 3
    } else {
        total / winners.max(1) as i32
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
