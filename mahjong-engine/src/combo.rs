//! Validated tile groups: pairs, triplets, quads and runs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{RiichiError, RiichiResult};
use crate::tile::{Family, Tile, TileKind, Wind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComboKind {
    Pair,
    Triplet,
    Quad,
    Run,
}

/// A group of 2 to 4 tiles, sorted, optionally carrying the tile stolen from an opponent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileCombo {
    tiles: Vec<Tile>,
    kind: ComboKind,
    open_tile: Option<Tile>,
    stolen_from: Option<usize>,
}

impl TileCombo {
    /// Builds a concealed combo.
    pub fn new(tiles: Vec<Tile>) -> RiichiResult<TileCombo> {
        Self::build(tiles, None, None)
    }

    /// Builds a combo completed by `open_tile`, stolen from seat `stolen_from`.
    /// `open_tile` must be one of `tiles`.
    pub fn new_open(tiles: Vec<Tile>, open_tile: Tile, stolen_from: usize) -> RiichiResult<TileCombo> {
        if !tiles.iter().any(|t| t.same_instance(&open_tile)) {
            return Err(RiichiError::InvalidCombo {
                message: format!("open tile {open_tile} is not part of the combo"),
            });
        }
        if stolen_from >= 4 {
            return Err(RiichiError::InvalidCombo {
                message: format!("seat {stolen_from} out of range"),
            });
        }
        Self::build(tiles, Some(open_tile), Some(stolen_from))
    }

    fn build(
        mut tiles: Vec<Tile>,
        open_tile: Option<Tile>,
        stolen_from: Option<usize>,
    ) -> RiichiResult<TileCombo> {
        let kind = classify(&tiles).ok_or_else(|| RiichiError::InvalidCombo {
            message: format!(
                "[{}] is not a pair, triplet, quad or run",
                tiles.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(" ")
            ),
        })?;
        for (i, a) in tiles.iter().enumerate() {
            if tiles[i + 1..].iter().any(|b| a.same_instance(b)) {
                return Err(RiichiError::InvalidCombo {
                    message: format!("tile id {} used twice", a.id().value()),
                });
            }
        }
        tiles.sort_by_key(Tile::sort_key);
        Ok(TileCombo {
            tiles,
            kind,
            open_tile,
            stolen_from,
        })
    }

    /// Upgrades an open triplet into a quad with `tile` (added kan).
    pub(crate) fn upgraded(&self, tile: Tile) -> RiichiResult<TileCombo> {
        if self.kind != ComboKind::Triplet {
            return Err(RiichiError::InvalidCombo {
                message: "only a triplet can become a quad".to_string(),
            });
        }
        let mut tiles = self.tiles.clone();
        tiles.push(tile);
        Self::build(tiles, self.open_tile, self.stolen_from)
    }

    #[inline]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    #[inline]
    pub fn kind(&self) -> ComboKind {
        self.kind
    }

    #[inline]
    pub fn open_tile(&self) -> Option<Tile> {
        self.open_tile
    }

    #[inline]
    pub fn stolen_from(&self) -> Option<usize> {
        self.stolen_from
    }

    /// No tile was stolen to form this combo (concealed kans included).
    #[inline]
    pub fn is_concealed(&self) -> bool {
        self.open_tile.is_none()
    }

    #[inline]
    pub fn is_pair(&self) -> bool {
        self.kind == ComboKind::Pair
    }

    #[inline]
    pub fn is_triplet(&self) -> bool {
        self.kind == ComboKind::Triplet
    }

    #[inline]
    pub fn is_quad(&self) -> bool {
        self.kind == ComboKind::Quad
    }

    #[inline]
    pub fn is_run(&self) -> bool {
        self.kind == ComboKind::Run
    }

    /// Triplet or quad.
    #[inline]
    pub fn is_triplet_or_quad(&self) -> bool {
        matches!(self.kind, ComboKind::Triplet | ComboKind::Quad)
    }

    #[inline]
    pub fn family(&self) -> Family {
        self.tiles[0].family()
    }

    /// Kind of the lowest tile.
    #[inline]
    pub fn first_kind(&self) -> TileKind {
        self.tiles[0].kind()
    }

    #[inline]
    pub fn contains_kind(&self, kind: TileKind) -> bool {
        self.tiles.iter().any(|t| t.kind() == kind)
    }

    /// At least one terminal or honor tile.
    pub fn has_terminal_or_honor(&self) -> bool {
        self.tiles.iter().any(Tile::is_honor_or_terminal)
    }

    pub fn has_terminal(&self) -> bool {
        self.tiles.iter().any(Tile::is_terminal)
    }

    /// Only terminals and honors.
    pub fn is_all_terminal_or_honor(&self) -> bool {
        self.tiles.iter().all(Tile::is_honor_or_terminal)
    }

    pub fn is_honor(&self) -> bool {
        self.family().is_honor()
    }

    pub fn is_dragon(&self) -> bool {
        self.family() == Family::Dragon
    }

    pub fn is_wind(&self) -> bool {
        self.family() == Family::Wind
    }

    /// Wind combo of the given wind.
    pub fn is_wind_of(&self, wind: Wind) -> bool {
        self.first_kind().wind() == Some(wind)
    }

    /// Dragon, round wind or seat wind.
    pub fn is_valuable(&self, dominant_wind: Wind, seat_wind: Wind) -> bool {
        self.is_dragon() || self.is_wind_of(dominant_wind) || self.is_wind_of(seat_wind)
    }

    /// Run won on its inner side only: 1-2-3 completed by 3, 7-8-9 completed by 7.
    pub fn is_edge_wait(&self, tile: &Tile) -> bool {
        if !self.is_run() || !self.contains_kind(tile.kind()) {
            return false;
        }
        let first = self.tiles[0].number();
        let last = self.tiles[2].number();
        (first == 1 && tile.number() == 3) || (last == 9 && tile.number() == 7)
    }

    /// Run won on its middle tile.
    pub fn is_middle_wait(&self, tile: &Tile) -> bool {
        self.is_run() && self.tiles[1].kind() == tile.kind()
    }

    /// Both combos hold the same tile kinds with the same multiplicity.
    pub fn is_bijection(&self, other: &TileCombo) -> bool {
        self.tiles.len() == other.tiles.len()
            && self
                .tiles
                .iter()
                .zip(other.tiles.iter())
                .all(|(a, b)| a.kind() == b.kind())
    }

    pub fn red_count(&self) -> u8 {
        self.tiles.iter().filter(|t| t.is_red()).count() as u8
    }
}

impl PartialEq for TileCombo {
    fn eq(&self, other: &Self) -> bool {
        self.is_bijection(other)
    }
}

impl Eq for TileCombo {}

impl fmt::Display for TileCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, t) in self.tiles.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{t}")?;
        }
        f.write_str("]")
    }
}

fn classify(tiles: &[Tile]) -> Option<ComboKind> {
    if !(2..=4).contains(&tiles.len()) {
        return None;
    }
    let first = tiles[0];
    if tiles.iter().all(|t| t.kind() == first.kind()) {
        return Some(match tiles.len() {
            2 => ComboKind::Pair,
            3 => ComboKind::Triplet,
            _ => ComboKind::Quad,
        });
    }
    if tiles.len() != 3 || first.is_honor() || tiles.iter().any(|t| t.family() != first.family()) {
        return None;
    }
    let mut numbers: Vec<u8> = tiles.iter().map(Tile::number).collect();
    numbers.sort_unstable();
    (numbers[1] == numbers[0] + 1 && numbers[2] == numbers[1] + 1).then_some(ComboKind::Run)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_tiles;

    fn combo(text: &str) -> RiichiResult<TileCombo> {
        TileCombo::new(parse_tiles(text, true)?)
    }

    #[test]
    fn classifies_shapes() {
        assert_eq!(combo("55z").unwrap().kind(), ComboKind::Pair);
        assert_eq!(combo("111m").unwrap().kind(), ComboKind::Triplet);
        assert_eq!(combo("9999s").unwrap().kind(), ComboKind::Quad);
        assert_eq!(combo("312p").unwrap().kind(), ComboKind::Run);
        assert_eq!(combo("406s").unwrap().kind(), ComboKind::Run);
    }

    #[test]
    fn rejects_invalid_groups() {
        assert!(combo("123z").is_err());
        assert!(combo("124m").is_err());
        assert!(combo("12m3p").is_err());
        assert!(combo("1m").is_err());
        assert!(combo("11111m").is_err());
        assert!(combo("1234m").is_err());
    }

    #[test]
    fn run_is_sorted() {
        let c = combo("978m").unwrap();
        let numbers: Vec<u8> = c.tiles().iter().map(Tile::number).collect();
        assert_eq!(numbers, vec![7, 8, 9]);
    }

    #[test]
    fn wait_shapes() {
        let low = combo("123m").unwrap();
        let three = parse_tiles("3m", false).unwrap()[0];
        let one = parse_tiles("1m", false).unwrap()[0];
        let two = parse_tiles("2m", false).unwrap()[0];
        assert!(low.is_edge_wait(&three));
        assert!(!low.is_edge_wait(&one));
        assert!(low.is_middle_wait(&two));

        let high = combo("789p").unwrap();
        let seven = parse_tiles("7p", false).unwrap()[0];
        assert!(high.is_edge_wait(&seven));
    }

    #[test]
    fn equality_is_bijection_ignoring_red() {
        let red = combo("055p").unwrap();
        let plain = TileCombo::new(parse_tiles("555p", false).unwrap()).unwrap();
        assert_eq!(red, plain);
        assert_eq!(red.red_count(), 1);
        assert_ne!(red, combo("5555p").unwrap());
    }

    #[test]
    fn open_tile_must_belong() {
        let tiles = parse_tiles("234s", false).unwrap();
        let stranger = parse_tiles("9s", false).unwrap()[0];
        assert!(TileCombo::new_open(tiles.clone(), stranger, 1).is_err());
        let c = TileCombo::new_open(tiles.clone(), tiles[0], 3).unwrap();
        assert!(!c.is_concealed());
        assert_eq!(c.stolen_from(), Some(3));
    }

    #[test]
    fn valuable_combos() {
        let east = combo("111z").unwrap();
        assert!(east.is_valuable(Wind::East, Wind::South));
        assert!(!east.is_valuable(Wind::South, Wind::West));
        assert!(combo("666z").unwrap().is_valuable(Wind::South, Wind::West));
    }

    #[test]
    fn upgrade_to_quad() {
        let tiles = parse_tiles("4444p", false).unwrap();
        let pon = TileCombo::new_open(tiles[..3].to_vec(), tiles[0], 2).unwrap();
        let kan = pon.upgraded(tiles[3]).unwrap();
        assert!(kan.is_quad());
        assert_eq!(kan.stolen_from(), Some(2));
        assert!(kan.upgraded(tiles[3]).is_err());
    }
}
