//! Hand completion search.
//!
//! Two layers: count-level predicates (`is_complete`, `waits`, ...) that only
//! answer yes/no over a 34-kind histogram, and `standard_partitions`, which
//! enumerates every distinct way of splitting the concealed tiles into melds
//! and materialises them as [`TileCombo`]s for yaku and fu evaluation.

use std::collections::{HashMap, HashSet};

use crate::combo::{ComboKind, TileCombo};
use crate::tile::{kind_counts, Tile, TileKind, NUM_TILE_KINDS, WIND_START};

/// Kinds of the thirteen orphans.
pub const ORPHAN_KINDS: [u8; 13] = [0, 8, 9, 17, 18, 26, 27, 28, 29, 30, 31, 32, 33];

/// Melds in a complete standard hand, pair included.
const MELDS_IN_HAND: usize = 5;

// ---------------------------------------------------------------------------
// Count-level predicates
// ---------------------------------------------------------------------------

/// Whether the histogram splits into melds plus exactly one pair.
pub fn is_standard_counts(counts: &[u8; NUM_TILE_KINDS]) -> bool {
    let total: u32 = counts.iter().map(|&c| c as u32).sum();
    if total % 3 != 2 {
        return false;
    }
    let mut work = *counts;
    for i in 0..NUM_TILE_KINDS {
        if work[i] >= 2 {
            work[i] -= 2;
            if melds_only(&work) {
                return true;
            }
            work[i] += 2;
        }
    }
    false
}

/// Whether the histogram splits into triplets and runs only.
fn melds_only(counts: &[u8; NUM_TILE_KINDS]) -> bool {
    let mut c = *counts;
    for i in 0..NUM_TILE_KINDS {
        if c[i] >= 3 {
            c[i] -= 3;
        }
        if c[i] == 0 {
            continue;
        }
        // Remaining copies can only start runs.
        let n = c[i];
        if i >= WIND_START as usize || i % 9 > 6 || c[i + 1] < n || c[i + 2] < n {
            return false;
        }
        c[i] = 0;
        c[i + 1] -= n;
        c[i + 2] -= n;
    }
    true
}

fn is_seven_pairs_counts(counts: &[u8; NUM_TILE_KINDS]) -> bool {
    counts.iter().filter(|&&c| c == 2).count() == 7 && counts.iter().all(|&c| c == 0 || c == 2)
}

fn is_thirteen_orphans_counts(counts: &[u8; NUM_TILE_KINDS]) -> bool {
    let total: u32 = counts.iter().map(|&c| c as u32).sum();
    total == 14
        && ORPHAN_KINDS.iter().all(|&k| counts[k as usize] >= 1)
        && ORPHAN_KINDS.iter().any(|&k| counts[k as usize] == 2)
}

/// Completeness over a histogram of concealed tiles; irregular shapes require no declared combo.
pub fn is_complete_counts(counts: &[u8; NUM_TILE_KINDS], declared: usize) -> bool {
    if is_standard_counts(counts) {
        return true;
    }
    declared == 0 && (is_seven_pairs_counts(counts) || is_thirteen_orphans_counts(counts))
}

/// Whether the concealed tiles plus declared combos make a complete hand of any shape.
pub fn is_complete(concealed: &[Tile], declared: &[TileCombo]) -> bool {
    if concealed.len() + 3 * declared.len() != 14 {
        return false;
    }
    is_complete_counts(&kind_counts(concealed), declared.len())
}

pub fn is_seven_pairs(concealed: &[Tile], declared: &[TileCombo]) -> bool {
    declared.is_empty() && concealed.len() == 14 && is_seven_pairs_counts(&kind_counts(concealed))
}

pub fn is_thirteen_orphans(concealed: &[Tile], declared: &[TileCombo]) -> bool {
    declared.is_empty() && is_thirteen_orphans_counts(&kind_counts(concealed))
}

/// Kinds that would complete a 13-tile hand. A kind the hand already holds four of is never a wait.
pub fn waits(concealed: &[Tile], declared: &[TileCombo]) -> Vec<TileKind> {
    if concealed.len() + 3 * declared.len() != 13 {
        return Vec::new();
    }
    let mut counts = kind_counts(concealed);
    let mut held = counts;
    for combo in declared {
        for t in combo.tiles() {
            held[t.kind().index()] += 1;
        }
    }
    let mut result = Vec::new();
    for k in 0..NUM_TILE_KINDS {
        if held[k] >= 4 {
            continue;
        }
        counts[k] += 1;
        if is_complete_counts(&counts, declared.len()) {
            if let Some(kind) = TileKind::new(k as u8) {
                result.push(kind);
            }
        }
        counts[k] -= 1;
    }
    result
}

/// Tenpai against a set of candidate kinds, typically those not yet visible to the player.
pub fn is_tenpai(concealed: &[Tile], declared: &[TileCombo], candidates: &[TileKind]) -> bool {
    waits(concealed, declared)
        .iter()
        .any(|w| candidates.contains(w))
}

/// Tiles of a 14-tile hand whose discard leaves it tenpai against `candidates`,
/// one per kind, preferring a plain tile over a red five.
pub fn tenpai_discards(concealed: &[Tile], declared: &[TileCombo], candidates: &[TileKind]) -> Vec<Tile> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for tile in concealed {
        if !seen.insert(tile.kind()) {
            continue;
        }
        let pos = concealed
            .iter()
            .position(|t| t.kind() == tile.kind())
            .unwrap_or_default();
        let mut rest = concealed.to_vec();
        rest.remove(pos);
        if is_tenpai(&rest, declared, candidates) {
            let pick = concealed
                .iter()
                .find(|t| t.kind() == tile.kind() && !t.is_red())
                .unwrap_or(tile);
            result.push(*pick);
        }
    }
    result
}

// ---------------------------------------------------------------------------
// Partition search
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct MeldShape {
    kind: ComboKind,
    first: u8,
}

type SuitMemo = HashMap<[u8; 9], Vec<Vec<MeldShape>>>;

/// Every split of one suit (relative numbers 0-8) into pairs, triplets and runs
/// holding at most one pair. Memoised by the remaining counts.
fn suit_partitions(counts: [u8; 9], memo: &mut SuitMemo) -> Vec<Vec<MeldShape>> {
    let Some(i) = counts.iter().position(|&c| c > 0) else {
        return vec![Vec::new()];
    };
    if let Some(hit) = memo.get(&counts) {
        return hit.clone();
    }

    let mut results = Vec::new();
    let mut options: Vec<(MeldShape, [u8; 9])> = Vec::with_capacity(3);
    if counts[i] >= 2 {
        let mut c = counts;
        c[i] -= 2;
        options.push((MeldShape { kind: ComboKind::Pair, first: i as u8 }, c));
    }
    if counts[i] >= 3 {
        let mut c = counts;
        c[i] -= 3;
        options.push((MeldShape { kind: ComboKind::Triplet, first: i as u8 }, c));
    }
    if i <= 6 && counts[i + 1] > 0 && counts[i + 2] > 0 {
        let mut c = counts;
        c[i] -= 1;
        c[i + 1] -= 1;
        c[i + 2] -= 1;
        options.push((MeldShape { kind: ComboKind::Run, first: i as u8 }, c));
    }

    for (shape, rest) in options {
        for tail in suit_partitions(rest, memo) {
            let pairs = tail.iter().filter(|m| m.kind == ComboKind::Pair).count();
            if shape.kind == ComboKind::Pair && pairs > 0 {
                continue;
            }
            let mut seq = Vec::with_capacity(tail.len() + 1);
            seq.push(shape);
            seq.extend(tail);
            results.push(seq);
        }
    }

    memo.insert(counts, results.clone());
    results
}

/// Split of one family, or `None` when it cannot be split at all.
fn family_partitions(
    counts: &[u8; NUM_TILE_KINDS],
    start: usize,
    memo: &mut SuitMemo,
) -> Option<Vec<Vec<MeldShape>>> {
    let size: u32 = counts[start..start + 9].iter().map(|&c| c as u32).sum();
    if size % 3 == 1 {
        return None;
    }
    let mut local = [0u8; 9];
    local.copy_from_slice(&counts[start..start + 9]);
    let found: Vec<Vec<MeldShape>> = suit_partitions(local, memo)
        .into_iter()
        .map(|seq| {
            seq.into_iter()
                .map(|m| MeldShape {
                    kind: m.kind,
                    first: m.first + start as u8,
                })
                .collect()
        })
        .collect();
    (!found.is_empty()).then_some(found)
}

/// Honors only form pairs and triplets, so there is a single split.
fn honor_partition(counts: &[u8; NUM_TILE_KINDS]) -> Option<Vec<MeldShape>> {
    let mut seq = Vec::new();
    for k in WIND_START as usize..NUM_TILE_KINDS {
        match counts[k] {
            0 => {}
            2 => seq.push(MeldShape { kind: ComboKind::Pair, first: k as u8 }),
            3 => seq.push(MeldShape { kind: ComboKind::Triplet, first: k as u8 }),
            _ => return None,
        }
    }
    Some(seq)
}

/// All distinct standard partitions (four melds and a pair) of the concealed
/// tiles combined with the declared combos. Declared combos come first in
/// every returned sequence.
pub fn standard_partitions(concealed: &[Tile], declared: &[TileCombo]) -> Vec<Vec<TileCombo>> {
    if concealed.len() + 3 * declared.len() != 14 {
        return Vec::new();
    }

    if declared.len() == 4 {
        if concealed[0].kind() != concealed[1].kind() {
            return Vec::new();
        }
        return TileCombo::new(concealed.to_vec())
            .map(|pair| {
                let mut seq = declared.to_vec();
                seq.push(pair);
                vec![seq]
            })
            .unwrap_or_default();
    }

    let counts = kind_counts(concealed);
    let Some(honors) = honor_partition(&counts) else {
        return Vec::new();
    };

    let mut memo = SuitMemo::new();
    let mut product: Vec<Vec<MeldShape>> = vec![honors];
    for start in [0usize, 9, 18] {
        let Some(options) = family_partitions(&counts, start, &mut memo) else {
            return Vec::new();
        };
        let mut next = Vec::with_capacity(product.len() * options.len());
        for head in &product {
            for option in &options {
                let mut seq = head.clone();
                seq.extend_from_slice(option);
                next.push(seq);
            }
        }
        product = next;
    }

    let mut seen: HashSet<Vec<MeldShape>> = HashSet::new();
    let mut results = Vec::new();
    for mut seq in product {
        let pairs = seq.iter().filter(|m| m.kind == ComboKind::Pair).count();
        if pairs != 1 || seq.len() + declared.len() != MELDS_IN_HAND {
            continue;
        }
        seq.sort_unstable();
        if !seen.insert(seq.clone()) {
            continue;
        }
        if let Some(combos) = materialise(&seq, concealed) {
            let mut full = declared.to_vec();
            full.extend(combos);
            results.push(full);
        }
    }
    results
}

/// Seven pair combos, in kind order.
pub fn seven_pairs_combos(concealed: &[Tile]) -> Vec<TileCombo> {
    let mut pool: Vec<Tile> = concealed.to_vec();
    pool.sort_by_key(Tile::sort_key);
    pool.chunks(2)
        .filter_map(|pair| TileCombo::new(pair.to_vec()).ok())
        .collect()
}

/// Assigns physical tiles to each shape.
fn materialise(shapes: &[MeldShape], concealed: &[Tile]) -> Option<Vec<TileCombo>> {
    let mut pool: Vec<Tile> = concealed.to_vec();
    pool.sort_by_key(Tile::sort_key);
    let mut combos = Vec::with_capacity(shapes.len());
    for shape in shapes {
        let kinds: Vec<u8> = match shape.kind {
            ComboKind::Pair => vec![shape.first; 2],
            ComboKind::Triplet => vec![shape.first; 3],
            ComboKind::Quad => vec![shape.first; 4],
            ComboKind::Run => vec![shape.first, shape.first + 1, shape.first + 2],
        };
        let mut tiles = Vec::with_capacity(kinds.len());
        for k in kinds {
            let pos = pool.iter().position(|t| t.kind().id() == k)?;
            tiles.push(pool.remove(pos));
        }
        combos.push(TileCombo::new(tiles).ok()?);
    }
    Some(combos)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
