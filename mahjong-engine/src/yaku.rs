//! Yaku table and detection.
//!
//! [`Yaku`] carries the static data of every scoring pattern (fan when open,
//! concealed bonus, superseding yaku). [`get_yakus`] evaluates one meld
//! partition against a [`WinContext`]: yakuman first, and only when none
//! applies the regular yaku.

use serde::{Deserialize, Serialize};

use crate::combo::TileCombo;
use crate::tile::{Dragon, Family, Tile, Wind};

/// Fan value of a yakuman.
pub const YAKUMAN_FAN: u32 = 13;

// ---------------------------------------------------------------------------
// Win context
// ---------------------------------------------------------------------------

/// Where the winning tile came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrawType {
    Wall,
    Compensation,
    OpponentDiscard,
    /// Tile added to an open triplet by an opponent (robbed).
    OpponentKanCallOpen,
    /// Tile of an opponent's concealed kan (robbed, thirteen orphans only).
    OpponentKanCallConcealed,
}

impl DrawType {
    #[inline]
    pub const fn is_self_draw(self) -> bool {
        matches!(self, DrawType::Wall | DrawType::Compensation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RiichiState {
    #[default]
    None,
    Riichi,
    /// Declared on the first uninterrupted turn.
    Double,
}

/// Everything the yaku rules need to know besides the tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinContext {
    pub latest_tile: Tile,
    pub draw_type: DrawType,
    pub dominant_wind: Wind,
    pub seat_wind: Wind,
    /// No own discard yet and no call since the seat's previous turn.
    pub is_first_turn: bool,
    /// The wall is exhausted (haitei / houtei).
    pub is_round_last_tile: bool,
    pub riichi: RiichiState,
    pub is_ippatsu: bool,
    pub use_renhou: bool,
}

impl WinContext {
    /// A minimal context: no riichi, not the first turn, not the last tile.
    pub fn new(latest_tile: Tile, draw_type: DrawType, dominant_wind: Wind, seat_wind: Wind) -> Self {
        Self {
            latest_tile,
            draw_type,
            dominant_wind,
            seat_wind,
            is_first_turn: false,
            is_round_last_tile: false,
            riichi: RiichiState::None,
            is_ippatsu: false,
            use_renhou: false,
        }
    }

    pub fn is_tenhou(&self) -> bool {
        self.is_first_turn && self.draw_type == DrawType::Wall && self.seat_wind == Wind::East
    }

    pub fn is_chiihou(&self) -> bool {
        self.is_first_turn && self.draw_type == DrawType::Wall && self.seat_wind != Wind::East
    }

    pub fn is_renhou(&self) -> bool {
        self.use_renhou && self.is_first_turn && self.draw_type == DrawType::OpponentDiscard
    }
}

// ---------------------------------------------------------------------------
// Yaku table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Yaku {
    KokushiMusou,
    Daisangen,
    Suuankou,
    Daisuushii,
    Tsuuiisou,
    Ryuuiisou,
    Chinroutou,
    ChuurenPoutou,
    Suukantsu,
    Tenhou,
    Chiihou,
    Renhou,
    NagashiMangan,
    Chiniisou,
    Junchan,
    Ryanpeikou,
    DaburuRiichi,
    SanshokuDoujun,
    Ittsu,
    Toitoi,
    Sanankou,
    SanshokuDoukou,
    Sankantsu,
    Chiitoitsu,
    Honroutou,
    Shousangen,
    Haitei,
    RinshanKaihou,
    Chankan,
    Tanyao,
    Yakuhai,
    Ippatsu,
    MenzenTsumo,
    Pinfu,
    Honiisou,
    Chanta,
    Riichi,
    Iipeikou,
    Shousuushii,
}

impl Yaku {
    /// Every yaku, in evaluation order.
    pub const ALL: [Yaku; 39] = [
        Yaku::KokushiMusou,
        Yaku::Daisangen,
        Yaku::Suuankou,
        Yaku::Daisuushii,
        Yaku::Tsuuiisou,
        Yaku::Ryuuiisou,
        Yaku::Chinroutou,
        Yaku::ChuurenPoutou,
        Yaku::Suukantsu,
        Yaku::Tenhou,
        Yaku::Chiihou,
        Yaku::Renhou,
        Yaku::NagashiMangan,
        Yaku::Chiniisou,
        Yaku::Junchan,
        Yaku::Ryanpeikou,
        Yaku::DaburuRiichi,
        Yaku::SanshokuDoujun,
        Yaku::Ittsu,
        Yaku::Toitoi,
        Yaku::Sanankou,
        Yaku::SanshokuDoukou,
        Yaku::Sankantsu,
        Yaku::Chiitoitsu,
        Yaku::Honroutou,
        Yaku::Shousangen,
        Yaku::Haitei,
        Yaku::RinshanKaihou,
        Yaku::Chankan,
        Yaku::Tanyao,
        Yaku::Yakuhai,
        Yaku::Ippatsu,
        Yaku::MenzenTsumo,
        Yaku::Pinfu,
        Yaku::Honiisou,
        Yaku::Chanta,
        Yaku::Riichi,
        Yaku::Iipeikou,
        Yaku::Shousuushii,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Yaku::KokushiMusou => "Kokushi musou",
            Yaku::Daisangen => "Daisangen",
            Yaku::Suuankou => "Suuankou",
            Yaku::Daisuushii => "Daisuushii",
            Yaku::Tsuuiisou => "Tsuuiisou",
            Yaku::Ryuuiisou => "Ryuuiisou",
            Yaku::Chinroutou => "Chinroutou",
            Yaku::ChuurenPoutou => "Chuuren poutou",
            Yaku::Suukantsu => "Suukantsu",
            Yaku::Tenhou => "Tenhou",
            Yaku::Chiihou => "Chiihou",
            Yaku::Renhou => "Renhou",
            Yaku::NagashiMangan => "Nagashi mangan",
            Yaku::Chiniisou => "Chiniisou",
            Yaku::Junchan => "Junchan",
            Yaku::Ryanpeikou => "Ryanpeikou",
            Yaku::DaburuRiichi => "Daburu riichi",
            Yaku::SanshokuDoujun => "Sanshoku doujun",
            Yaku::Ittsu => "Ittsu",
            Yaku::Toitoi => "Toitoi",
            Yaku::Sanankou => "Sanankou",
            Yaku::SanshokuDoukou => "Sanshoku doukou",
            Yaku::Sankantsu => "Sankantsu",
            Yaku::Chiitoitsu => "Chiitoitsu",
            Yaku::Honroutou => "Honroutou",
            Yaku::Shousangen => "Shousangen",
            Yaku::Haitei => "Haitei",
            Yaku::RinshanKaihou => "Rinshan kaihou",
            Yaku::Chankan => "Chankan",
            Yaku::Tanyao => "Tanyao",
            Yaku::Yakuhai => "Yakuhai",
            Yaku::Ippatsu => "Ippatsu",
            Yaku::MenzenTsumo => "Menzen tsumo",
            Yaku::Pinfu => "Pinfu",
            Yaku::Honiisou => "Honiisou",
            Yaku::Chanta => "Chanta",
            Yaku::Riichi => "Riichi",
            Yaku::Iipeikou => "Iipeikou",
            Yaku::Shousuushii => "Shousuushii",
        }
    }

    pub const fn name_en(self) -> &'static str {
        match self {
            Yaku::KokushiMusou => "Thirteen orphans",
            Yaku::Daisangen => "Big three dragons",
            Yaku::Suuankou => "Four concealed triplets",
            Yaku::Daisuushii => "Big four winds",
            Yaku::Tsuuiisou => "All honors",
            Yaku::Ryuuiisou => "All green",
            Yaku::Chinroutou => "All terminals",
            Yaku::ChuurenPoutou => "Nine gates",
            Yaku::Suukantsu => "Four kans",
            Yaku::Tenhou => "Heavenly hand",
            Yaku::Chiihou => "Earthly hand",
            Yaku::Renhou => "Hand of man",
            Yaku::NagashiMangan => "Discard mangan",
            Yaku::Chiniisou => "Flush",
            Yaku::Junchan => "Terminal in each meld",
            Yaku::Ryanpeikou => "Two sets of identical sequences",
            Yaku::DaburuRiichi => "Double ready",
            Yaku::SanshokuDoujun => "Three colored straight",
            Yaku::Ittsu => "Straight",
            Yaku::Toitoi => "All triplets",
            Yaku::Sanankou => "Three concealed triplets",
            Yaku::SanshokuDoukou => "Three colored triplets",
            Yaku::Sankantsu => "Three kans",
            Yaku::Chiitoitsu => "Seven pairs",
            Yaku::Honroutou => "Terminals and honors",
            Yaku::Shousangen => "Small three dragons",
            Yaku::Haitei => "Win by last draw / discard",
            Yaku::RinshanKaihou => "Dead wall draw",
            Yaku::Chankan => "Robbing a kan",
            Yaku::Tanyao => "All simples",
            Yaku::Yakuhai => "Value tiles",
            Yaku::Ippatsu => "One shot",
            Yaku::MenzenTsumo => "Self draw",
            Yaku::Pinfu => "All sequences",
            Yaku::Honiisou => "Half flush",
            Yaku::Chanta => "Terminal or honor in each group",
            Yaku::Riichi => "Ready hand",
            Yaku::Iipeikou => "Identical sequences",
            Yaku::Shousuushii => "Little four winds",
        }
    }

    /// Fan when the hand is open; 0 for concealed-only yaku.
    pub const fn fan_count(self) -> u32 {
        match self {
            Yaku::Daisangen
            | Yaku::Suuankou
            | Yaku::Daisuushii
            | Yaku::Tsuuiisou
            | Yaku::Ryuuiisou
            | Yaku::Chinroutou
            | Yaku::Suukantsu
            | Yaku::Shousuushii => YAKUMAN_FAN,
            Yaku::Chiniisou => 5,
            Yaku::Junchan
            | Yaku::Toitoi
            | Yaku::Sanankou
            | Yaku::SanshokuDoukou
            | Yaku::Sankantsu
            | Yaku::Honroutou
            | Yaku::Shousangen
            | Yaku::Honiisou => 2,
            Yaku::SanshokuDoujun
            | Yaku::Ittsu
            | Yaku::Haitei
            | Yaku::RinshanKaihou
            | Yaku::Chankan
            | Yaku::Tanyao
            | Yaku::Yakuhai
            | Yaku::Chanta => 1,
            Yaku::KokushiMusou
            | Yaku::ChuurenPoutou
            | Yaku::Tenhou
            | Yaku::Chiihou
            | Yaku::Renhou
            | Yaku::NagashiMangan
            | Yaku::Ryanpeikou
            | Yaku::DaburuRiichi
            | Yaku::Chiitoitsu
            | Yaku::Ippatsu
            | Yaku::MenzenTsumo
            | Yaku::Pinfu
            | Yaku::Riichi
            | Yaku::Iipeikou => 0,
        }
    }

    /// Extra fan granted when the hand is concealed.
    pub const fn concealed_bonus(self) -> u32 {
        match self {
            Yaku::KokushiMusou
            | Yaku::ChuurenPoutou
            | Yaku::Tenhou
            | Yaku::Chiihou
            | Yaku::Renhou => YAKUMAN_FAN,
            Yaku::NagashiMangan => 5,
            Yaku::Junchan | Yaku::Ryanpeikou => 3,
            Yaku::DaburuRiichi | Yaku::Chiitoitsu => 2,
            Yaku::Chiniisou
            | Yaku::SanshokuDoujun
            | Yaku::Ittsu
            | Yaku::Ippatsu
            | Yaku::MenzenTsumo
            | Yaku::Pinfu
            | Yaku::Honiisou
            | Yaku::Chanta
            | Yaku::Riichi
            | Yaku::Iipeikou => 1,
            _ => 0,
        }
    }

    #[inline]
    pub const fn concealed_fan_count(self) -> u32 {
        self.fan_count() + self.concealed_bonus()
    }

    #[inline]
    pub const fn is_concealed_only(self) -> bool {
        self.fan_count() == 0
    }

    #[inline]
    pub const fn is_yakuman(self) -> bool {
        self.concealed_fan_count() == YAKUMAN_FAN
    }

    #[inline]
    pub const fn fan(self, concealed: bool) -> u32 {
        if concealed {
            self.concealed_fan_count()
        } else {
            self.fan_count()
        }
    }

    /// Yaku that make this one obsolete when both apply.
    pub const fn upgrades(self) -> &'static [Yaku] {
        match self {
            Yaku::Honiisou => &[Yaku::Chiniisou],
            Yaku::Chanta => &[Yaku::Junchan, Yaku::Honroutou],
            Yaku::Riichi => &[Yaku::DaburuRiichi],
            Yaku::Iipeikou => &[Yaku::Ryanpeikou],
            Yaku::Shousuushii => &[Yaku::Daisuushii],
            _ => &[],
        }
    }
}

/// Total fan of a yaku list.
pub fn fan_sum(yakus: &[Yaku], concealed: bool) -> u32 {
    yakus.iter().map(|y| y.fan(concealed)).sum()
}

/// The list with the highest fan; the first one wins ties. Empty when `candidates` is.
pub fn best_yakus<'a, T>(candidates: &'a [(Vec<Yaku>, T)], concealed: bool) -> Option<&'a (Vec<Yaku>, T)> {
    let mut best: Option<&(Vec<Yaku>, T)> = None;
    for candidate in candidates {
        let better = match best {
            None => true,
            Some(b) => fan_sum(&candidate.0, concealed) > fan_sum(&b.0, concealed),
        };
        if better {
            best = Some(candidate);
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

const NINE_GATES_PATTERNS: [[u8; 14]; 9] = [
    [1, 1, 1, 1, 2, 3, 4, 5, 6, 7, 8, 9, 9, 9],
    [1, 1, 1, 2, 2, 3, 4, 5, 6, 7, 8, 9, 9, 9],
    [1, 1, 1, 2, 3, 3, 4, 5, 6, 7, 8, 9, 9, 9],
    [1, 1, 1, 2, 3, 4, 4, 5, 6, 7, 8, 9, 9, 9],
    [1, 1, 1, 2, 3, 4, 5, 5, 6, 7, 8, 9, 9, 9],
    [1, 1, 1, 2, 3, 4, 5, 6, 6, 7, 8, 9, 9, 9],
    [1, 1, 1, 2, 3, 4, 5, 6, 7, 7, 8, 9, 9, 9],
    [1, 1, 1, 2, 3, 4, 5, 6, 7, 8, 8, 9, 9, 9],
    [1, 1, 1, 2, 3, 4, 5, 6, 7, 8, 9, 9, 9, 9],
];

const GREEN_NUMBERS: [u8; 5] = [2, 3, 4, 6, 8];

fn count(combos: &[TileCombo], pred: impl Fn(&TileCombo) -> bool) -> usize {
    combos.iter().filter(|c| pred(c)).count()
}

/// Concealed triplets and quads, excluding one completed by a discard.
fn concealed_triplets(combos: &[TileCombo], ctx: &WinContext) -> usize {
    count(combos, |c| {
        c.is_triplet_or_quad()
            && c.is_concealed()
            && (!c.contains_kind(ctx.latest_tile.kind()) || ctx.draw_type.is_self_draw())
    })
}

fn single_family(combos: &[TileCombo]) -> bool {
    combos.iter().all(|c| c.family() == combos[0].family())
}

fn distinct_runs(runs: &[&TileCombo]) -> usize {
    let mut distinct: Vec<&TileCombo> = Vec::new();
    for r in runs {
        if !distinct.iter().any(|d| d.is_bijection(r)) {
            distinct.push(r);
        }
    }
    distinct.len()
}

/// True when three combos of one group (by `key`) cover the three suits.
fn three_colors<K: PartialEq + Copy>(combos: &[&TileCombo], key: impl Fn(&TileCombo) -> K) -> bool {
    let mut keys: Vec<K> = Vec::new();
    for c in combos {
        let k = key(c);
        if !keys.contains(&k) {
            keys.push(k);
        }
    }
    keys.into_iter()
        .map(|k| combos.iter().filter(|c| key(c) == k).collect::<Vec<_>>())
        .find(|group| group.len() >= 3)
        .map(|group| {
            let mut families: Vec<Family> = group.iter().map(|c| c.family()).collect();
            families.sort();
            families.dedup();
            families.len() == 3
        })
        .unwrap_or(false)
}

fn is_valuable_pair(c: &TileCombo, ctx: &WinContext) -> bool {
    c.is_pair() && c.is_valuable(ctx.dominant_wind, ctx.seat_wind)
}

fn yakuman_applies(yaku: Yaku, combos: &[TileCombo], ctx: &WinContext) -> bool {
    match yaku {
        Yaku::Daisangen => count(combos, |c| c.is_triplet_or_quad() && c.is_dragon()) == 3,
        Yaku::Suuankou => concealed_triplets(combos, ctx) == 4,
        Yaku::Shousuushii => {
            count(combos, |c| c.is_triplet_or_quad() && c.is_wind()) == 3
                && combos.iter().any(|c| c.is_pair() && c.is_wind())
        }
        Yaku::Daisuushii => count(combos, |c| c.is_triplet_or_quad() && c.is_wind()) == 4,
        Yaku::Tsuuiisou => combos.iter().all(TileCombo::is_honor),
        Yaku::Ryuuiisou => combos.iter().all(|c| {
            c.tiles().iter().all(|t| {
                (t.family() == Family::Bamboo && GREEN_NUMBERS.contains(&t.number()))
                    || t.dragon() == Some(Dragon::Green)
            })
        }),
        Yaku::Chinroutou => combos.iter().all(|c| c.tiles().iter().all(Tile::is_terminal)),
        Yaku::ChuurenPoutou => {
            if !combos.iter().all(TileCombo::is_concealed) || !single_family(combos) {
                return false;
            }
            let mut numbers: Vec<u8> = combos
                .iter()
                .flat_map(|c| c.tiles().iter().map(Tile::number))
                .collect();
            numbers.sort_unstable();
            NINE_GATES_PATTERNS.iter().any(|p| p[..] == numbers[..])
        }
        Yaku::Suukantsu => count(combos, TileCombo::is_quad) == 4,
        Yaku::Tenhou => ctx.is_tenhou(),
        Yaku::Chiihou => ctx.is_chiihou(),
        Yaku::Renhou => ctx.is_renhou(),
        // Whole-hand shape checked by the caller.
        _ => false,
    }
}

/// Number of times a regular yaku applies (yakuhai may apply once per meld).
fn regular_occurrences(yaku: Yaku, combos: &[TileCombo], ctx: &WinContext) -> usize {
    let runs: Vec<&TileCombo> = combos.iter().filter(|c| c.is_run()).collect();
    let all_concealed = combos.iter().all(TileCombo::is_concealed);
    let applies = match yaku {
        Yaku::Chiniisou => single_family(combos) && !combos.iter().any(TileCombo::is_honor),
        Yaku::Haitei => ctx.is_round_last_tile,
        Yaku::RinshanKaihou => ctx.draw_type == DrawType::Compensation,
        Yaku::Chankan => ctx.draw_type == DrawType::OpponentKanCallOpen,
        Yaku::Tanyao => combos.iter().all(|c| !c.has_terminal_or_honor()),
        Yaku::Yakuhai => {
            return count(combos, |c| {
                c.is_triplet_or_quad() && c.is_valuable(ctx.dominant_wind, ctx.seat_wind)
            });
        }
        Yaku::Riichi => ctx.riichi != RiichiState::None,
        Yaku::Ippatsu => ctx.is_ippatsu,
        Yaku::MenzenTsumo => ctx.draw_type.is_self_draw() && all_concealed,
        Yaku::Honiisou => {
            let suited: Vec<&TileCombo> = combos.iter().filter(|c| !c.is_honor()).collect();
            !suited.is_empty() && suited.iter().all(|c| c.family() == suited[0].family())
        }
        Yaku::Pinfu => {
            let win = ctx.latest_tile;
            count(combos, |c| c.is_run() && c.is_concealed()) == 4
                && !combos.iter().any(|c| is_valuable_pair(c, ctx))
                && runs.iter().any(|c| {
                    c.contains_kind(win.kind()) && !c.is_edge_wait(&win) && !c.is_middle_wait(&win)
                })
        }
        Yaku::Iipeikou => all_concealed && runs.len() >= 2 && distinct_runs(&runs) < runs.len(),
        Yaku::Shousangen => {
            count(combos, |c| c.is_triplet_or_quad() && c.is_dragon()) == 2
                && combos.iter().any(|c| c.is_pair() && c.is_dragon())
        }
        Yaku::Honroutou => combos.iter().all(|c| c.is_honor() || c.tiles().iter().all(Tile::is_terminal)),
        Yaku::Chiitoitsu => combos.iter().all(TileCombo::is_pair),
        Yaku::Sankantsu => count(combos, TileCombo::is_quad) == 3,
        Yaku::SanshokuDoukou => {
            let sets: Vec<&TileCombo> = combos
                .iter()
                .filter(|c| c.is_triplet_or_quad() && !c.is_honor())
                .collect();
            three_colors(&sets, |c| c.first_kind().number())
        }
        Yaku::Sanankou => concealed_triplets(combos, ctx) == 3,
        Yaku::Toitoi => count(combos, TileCombo::is_triplet_or_quad) == 4,
        Yaku::Ittsu => {
            let mut families: Vec<Family> = runs.iter().map(|c| c.family()).collect();
            families.dedup();
            families.into_iter().any(|f| {
                let starts: Vec<u8> = runs
                    .iter()
                    .filter(|c| c.family() == f)
                    .map(|c| c.first_kind().number())
                    .collect();
                starts.len() >= 3 && [1, 4, 7].iter().all(|n| starts.contains(n))
            })
        }
        Yaku::SanshokuDoujun => three_colors(&runs, |c| c.first_kind().number()),
        Yaku::Chanta => combos.iter().all(TileCombo::has_terminal_or_honor),
        Yaku::DaburuRiichi => ctx.riichi == RiichiState::Double,
        Yaku::Ryanpeikou => all_concealed && runs.len() == 4 && distinct_runs(&runs) <= 2,
        Yaku::Junchan => combos.iter().all(TileCombo::has_terminal),
        _ => false,
    };
    usize::from(applies)
}

fn remove_superseded(yakus: &mut Vec<Yaku>) {
    let snapshot = yakus.clone();
    yakus.retain(|y| !y.upgrades().iter().any(|u| snapshot.contains(u)));
}

/// Yaku of one meld partition (thirteen orphans and nagashi mangan are whole-hand
/// shapes handled by the caller). Yakuman exclude every regular yaku.
/// An empty list means no yaku.
pub fn get_yakus(combos: &[TileCombo], ctx: &WinContext) -> Vec<Yaku> {
    // Only thirteen orphans robs a concealed kan.
    if ctx.draw_type == DrawType::OpponentKanCallConcealed {
        return Vec::new();
    }

    let mut yakus: Vec<Yaku> = Yaku::ALL
        .iter()
        .copied()
        .filter(|y| y.is_yakuman() && yakuman_applies(*y, combos, ctx))
        .collect();
    remove_superseded(&mut yakus);
    if !yakus.is_empty() {
        return yakus;
    }

    for yaku in Yaku::ALL.iter().copied().filter(|y| !y.is_yakuman()) {
        let n = regular_occurrences(yaku, combos, ctx);
        yakus.extend(std::iter::repeat(yaku).take(n));
    }
    remove_superseded(&mut yakus);
    yakus
}

/// Yaku of a thirteen orphans hand.
pub fn thirteen_orphans_yakus(ctx: &WinContext) -> Vec<Yaku> {
    let mut yakus = vec![Yaku::KokushiMusou];
    if ctx.is_tenhou() {
        yakus.push(Yaku::Tenhou);
    } else if ctx.is_chiihou() {
        yakus.push(Yaku::Chiihou);
    } else if ctx.is_renhou() {
        yakus.push(Yaku::Renhou);
    }
    yakus
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agari::{seven_pairs_combos, standard_partitions};
    use crate::parser::{parse_hand, parse_tile};

    fn ctx(win: &str, draw_type: DrawType) -> WinContext {
        WinContext::new(parse_tile(win, false).unwrap(), draw_type, Wind::East, Wind::South)
    }

    /// Best yaku over every standard partition of `text`.
    fn yakus_of(text: &str, c: &WinContext) -> Vec<Yaku> {
        let (concealed, declared) = parse_hand(text, false).unwrap();
        let concealed_hand = declared.iter().all(TileCombo::is_concealed);
        let candidates: Vec<(Vec<Yaku>, ())> = standard_partitions(&concealed, &declared)
            .iter()
            .map(|p| (get_yakus(p, c), ()))
            .collect();
        best_yakus(&candidates, concealed_hand)
            .map(|b| b.0.clone())
            .unwrap_or_default()
    }

    #[test]
    fn table_invariants() {
        for y in Yaku::ALL {
            for u in y.upgrades() {
                assert!(u.upgrades().is_empty(), "{y:?} upgrade chain is not flat");
                assert_ne!(*u, y);
            }
        }
        assert!(Yaku::KokushiMusou.is_yakuman());
        assert!(Yaku::KokushiMusou.is_concealed_only());
        assert!(!Yaku::NagashiMangan.is_yakuman());
        assert_eq!(Yaku::Chiniisou.concealed_fan_count(), 6);
        assert_eq!(Yaku::Riichi.fan(false), 0);
    }

    #[test]
    fn menzen_tsumo_only() {
        let y = yakus_of("123m456p789s33344z", &ctx("3m", DrawType::Wall));
        assert_eq!(y, vec![Yaku::MenzenTsumo]);
    }

    #[test]
    fn no_yaku_is_an_empty_list() {
        let y = yakus_of("123m456p789s33344z", &ctx("3m", DrawType::OpponentDiscard));
        assert!(y.is_empty());
    }

    #[test]
    fn pinfu_needs_two_sided_wait() {
        let hand = "123456m234p567s99p";
        let open_wait = yakus_of(hand, &ctx("4m", DrawType::OpponentDiscard));
        assert!(open_wait.contains(&Yaku::Pinfu));
        let edge = yakus_of(hand, &ctx("3m", DrawType::OpponentDiscard));
        assert!(!edge.contains(&Yaku::Pinfu));
    }

    #[test]
    fn yakuman_excludes_regular_yaku() {
        let y = yakus_of("555666777z123m99p", &ctx("9p", DrawType::Wall));
        assert_eq!(y, vec![Yaku::Daisangen]);
    }

    #[test]
    fn little_four_winds_superseded() {
        let y = yakus_of("111222333z44z567m", &ctx("5m", DrawType::OpponentDiscard));
        assert_eq!(y, vec![Yaku::Shousuushii]);
        let big = yakus_of("111222333444z55m", &ctx("5m", DrawType::OpponentDiscard));
        assert!(big.contains(&Yaku::Daisuushii));
        assert!(!big.contains(&Yaku::Shousuushii));
    }

    #[test]
    fn riichi_superseded_by_double() {
        let mut c = ctx("4m", DrawType::OpponentDiscard);
        c.riichi = RiichiState::Double;
        let y = yakus_of("123456m234p567s99p", &c);
        assert!(y.contains(&Yaku::DaburuRiichi));
        assert!(!y.contains(&Yaku::Riichi));
    }

    #[test]
    fn yakuhai_counts_per_meld() {
        let mut c = ctx("9p", DrawType::OpponentDiscard);
        c.dominant_wind = Wind::East;
        c.seat_wind = Wind::East;
        let y = yakus_of("111z555z123m99p(p7z1)", &c);
        assert_eq!(y.iter().filter(|&&y| y == Yaku::Yakuhai).count(), 3);
    }

    #[test]
    fn double_wind_triplet_counts_once() {
        let win = parse_tile("9p", false).unwrap();
        let c = WinContext::new(win, DrawType::OpponentDiscard, Wind::South, Wind::South);
        let y = yakus_of("222z123m456p789s99p", &c);
        assert_eq!(y, vec![Yaku::Yakuhai]);
        assert_eq!(fan_sum(&y, true), 1);
    }

    #[test]
    fn ryanpeikou_beats_seven_pairs() {
        let text = "112233m445566p77s";
        let c = ctx("7s", DrawType::OpponentDiscard);
        let y = yakus_of(text, &c);
        assert!(y.contains(&Yaku::Ryanpeikou));
        assert!(!y.contains(&Yaku::Iipeikou));

        let (concealed, _) = parse_hand(text, false).unwrap();
        let pairs = get_yakus(&seven_pairs_combos(&concealed), &c);
        assert!(pairs.contains(&Yaku::Chiitoitsu));
        assert!(fan_sum(&y, true) > fan_sum(&pairs, true));
    }

    #[test]
    fn concealed_kan_robbery_clears_everything() {
        let y = yakus_of("123456m234p567s99p", &ctx("4m", DrawType::OpponentKanCallConcealed));
        assert!(y.is_empty());
        let dragons = yakus_of("555666777z123m99p", &ctx("9p", DrawType::OpponentKanCallConcealed));
        assert!(dragons.is_empty());
        let added = yakus_of("123456m234p567s99p", &ctx("4m", DrawType::OpponentKanCallOpen));
        assert!(added.contains(&Yaku::Chankan));
    }

    #[test]
    fn chanta_upgrades() {
        let c = ctx("9s", DrawType::OpponentDiscard);
        let junchan = yakus_of("123m789m123p789s99s", &c);
        assert!(junchan.contains(&Yaku::Junchan));
        assert!(!junchan.contains(&Yaku::Chanta));
        let chanta = yakus_of("123m789m123p111z99s", &ctx("9s", DrawType::Wall));
        assert!(chanta.contains(&Yaku::Chanta));
    }

    #[test]
    fn flushes() {
        let c = ctx("9m", DrawType::OpponentDiscard);
        let full = yakus_of("11123455678999m", &c);
        // Nine gates is a yakuman.
        assert_eq!(full, vec![Yaku::ChuurenPoutou]);
        let half = yakus_of("123456789m111z99m", &c);
        assert!(half.contains(&Yaku::Honiisou));
        assert!(half.contains(&Yaku::Ittsu));
        assert!(!half.contains(&Yaku::Chiniisou));
    }

    #[test]
    fn three_color_yaku() {
        let c = ctx("2s", DrawType::OpponentDiscard);
        let straight = yakus_of("123m123p123s555z99m", &c);
        assert!(straight.contains(&Yaku::SanshokuDoujun));
        let triplets = yakus_of("222m222p222s789m55p", &c);
        assert!(triplets.contains(&Yaku::SanshokuDoukou));
    }

    #[test]
    fn tenhou_from_context() {
        let mut c = ctx("3m", DrawType::Wall);
        c.seat_wind = Wind::East;
        c.is_first_turn = true;
        assert!(yakus_of("123m456p789s33344z", &c).contains(&Yaku::Tenhou));
        let kokushi = thirteen_orphans_yakus(&c);
        assert_eq!(kokushi, vec![Yaku::KokushiMusou, Yaku::Tenhou]);
    }
}
