//! Tile text notation.
//!
//! Digits followed by a suit letter: `m` characters, `p` circles, `s` bamboos,
//! `z` honors (1-4 East South West North, 5-7 White Green Red). `0` stands for
//! the red five of a suit. Declared combos go in parentheses:
//! `(123m)` chii, `(p5z)` pon, `(k5z)` concealed kan, `(k5z2)` open kan and
//! `(s5z)` added kan. A trailing digit after the suit names the seat the tile
//! was stolen from (default 3).

use std::iter::Peekable;
use std::str::Chars;

use crate::combo::TileCombo;
use crate::errors::{RiichiError, RiichiResult};
use crate::tile::{Tile, TileId, NUM_TILE_KINDS};

/// Hands out distinct physical copies so that parsed tiles never share an id.
pub(crate) struct TileManager {
    used: [[bool; 4]; NUM_TILE_KINDS],
    with_red: bool,
}

impl TileManager {
    pub(crate) fn new(with_red: bool) -> Self {
        Self {
            used: [[false; 4]; NUM_TILE_KINDS],
            with_red,
        }
    }

    /// Takes a free copy of `kind`; copy 0 of a five is reserved for the red request
    /// and only handed out for a plain request when the other copies are gone.
    pub(crate) fn get_tile(&mut self, kind: usize, is_red: bool) -> Result<Tile, String> {
        if kind >= NUM_TILE_KINDS {
            return Err(format!("Invalid tile kind: {}", kind));
        }

        let is_5 = kind == 4 || kind == 13 || kind == 22;
        let search_indices: &[usize] = match (is_5, is_red) {
            (true, true) => &[0],
            (true, false) => &[1, 2, 3, 0],
            (false, _) => &[0, 1, 2, 3],
        };

        let copy = search_indices
            .iter()
            .find(|&&idx| !self.used[kind][idx])
            .copied()
            .ok_or_else(|| format!("No more copies of tile {}", kind))?;
        self.used[kind][copy] = true;
        let id = TileId::new((kind * 4 + copy) as u8)
            .ok_or_else(|| format!("Invalid tile id for kind {}", kind))?;
        Ok(Tile::from_id(id, self.with_red))
    }

    /// Marks an already allocated tile as used.
    pub(crate) fn reserve(&mut self, tile: &Tile) -> bool {
        let id = tile.id().value() as usize;
        let slot = &mut self.used[id / 4][id % 4];
        !std::mem::replace(slot, true)
    }

    /// Every tile not handed out yet, in id order.
    pub(crate) fn remaining(&self) -> Vec<Tile> {
        (0..NUM_TILE_KINDS * 4)
            .filter(|&id| !self.used[id / 4][id % 4])
            .filter_map(|id| TileId::new(id as u8))
            .map(|id| Tile::from_id(id, self.with_red))
            .collect()
    }

    pub(crate) fn parse_into(&mut self, text: &str, out: &mut Vec<Tile>) -> RiichiResult<()> {
        let mut pending_digits: Vec<u32> = Vec::new();
        for c in text.chars() {
            if let Some(d) = c.to_digit(10) {
                pending_digits.push(d);
            } else if let Some(offset) = suit_offset(c) {
                for &d in &pending_digits {
                    let (kind, is_red) = kind_of(offset, d, text)?;
                    let tile = self.get_tile(kind, is_red).map_err(|e| RiichiError::Parse {
                        input: text.to_string(),
                        message: e,
                    })?;
                    out.push(tile);
                }
                pending_digits.clear();
            } else if !c.is_whitespace() {
                return Err(RiichiError::Parse {
                    input: text.to_string(),
                    message: format!("Unexpected character '{}'", c),
                });
            }
        }

        if !pending_digits.is_empty() {
            return Err(RiichiError::Parse {
                input: text.to_string(),
                message: "Pending digits without suit".to_string(),
            });
        }
        Ok(())
    }
}

/// Parses concealed tiles, e.g. `"123m406p77z"`.
pub fn parse_tiles(text: &str, with_red: bool) -> RiichiResult<Vec<Tile>> {
    let mut tm = TileManager::new(with_red);
    let mut tiles = Vec::new();
    tm.parse_into(text, &mut tiles)?;
    Ok(tiles)
}

/// Parses exactly one tile.
pub fn parse_tile(text: &str, with_red: bool) -> RiichiResult<Tile> {
    let tiles = parse_tiles(text, with_red)?;
    if tiles.len() != 1 {
        return Err(RiichiError::Parse {
            input: text.to_string(),
            message: format!(
                "Expected exactly one tile, but found {} tiles in string",
                tiles.len()
            ),
        });
    }
    Ok(tiles[0])
}

/// Parses concealed tiles and parenthesised declared combos, e.g. `"123m55z(p7z1)"`.
pub fn parse_hand(text: &str, with_red: bool) -> RiichiResult<(Vec<Tile>, Vec<TileCombo>)> {
    let mut tm = TileManager::new(with_red);
    let mut tiles = Vec::new();
    let mut combos = Vec::new();
    let mut plain = String::new();

    let mut chars = text.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c == '(' {
            chars.next();
            combos.push(parse_meld(&mut chars, &mut tm)?);
        } else {
            chars.next();
            plain.push(c);
        }
    }
    tm.parse_into(&plain, &mut tiles)?;
    Ok((tiles, combos))
}

fn suit_offset(c: char) -> Option<usize> {
    match c {
        'm' => Some(0),
        'p' => Some(9),
        's' => Some(18),
        'z' => Some(27),
        _ => None,
    }
}

fn kind_of(offset: usize, digit: u32, input: &str) -> RiichiResult<(usize, bool)> {
    let bad = |message: String| RiichiError::Parse {
        input: input.to_string(),
        message,
    };
    match (offset, digit) {
        (27, 0) | (27, 8..) => Err(bad(format!("Invalid honor digit {}", digit))),
        (_, 0) => Ok((offset + 4, true)),
        (_, d) => Ok((offset + d as usize - 1, false)),
    }
}

fn parse_meld(chars: &mut Peekable<Chars>, tm: &mut TileManager) -> RiichiResult<TileCombo> {
    let mut content = String::new();
    let mut closed = false;
    for c in chars.by_ref() {
        if c == ')' {
            closed = true;
            break;
        }
        content.push(c);
    }
    let parse_err = |message: String| RiichiError::Parse {
        input: content.clone(),
        message,
    };
    if !closed {
        return Err(parse_err("Unclosed meld".to_string()));
    }

    let (prefix, rest) = match content.chars().next() {
        Some(p @ ('p' | 'k' | 's')) => (p, &content[1..]),
        _ => (' ', content.as_str()),
    };

    let digits: Vec<u32> = rest.chars().map_while(|c| c.to_digit(10)).collect();
    let mut tail = rest.chars().skip(digits.len());
    let offset = tail
        .next()
        .and_then(suit_offset)
        .ok_or_else(|| parse_err("Invalid suit in meld".to_string()))?;
    let seat = tail.next().and_then(|c| c.to_digit(10)).map(|d| d as usize);
    if digits.is_empty() {
        return Err(parse_err("Meld without tiles".to_string()));
    }

    let mut tiles = Vec::new();
    if prefix == ' ' {
        if digits.len() != 3 {
            return Err(parse_err("Chii meld requires 3 digits".to_string()));
        }
        for &d in &digits {
            let (kind, is_red) = kind_of(offset, d, &content)?;
            tiles.push(tm.get_tile(kind, is_red).map_err(parse_err)?);
        }
    } else {
        let (kind, is_red) = kind_of(offset, digits[0], &content)?;
        let count = if prefix == 'p' { 3 } else { 4 };
        tiles.push(tm.get_tile(kind, is_red).map_err(parse_err)?);
        while tiles.len() < count {
            tiles.push(tm.get_tile(kind, false).map_err(parse_err)?);
        }
    }

    let concealed_kan = prefix == 'k' && seat.is_none();
    if concealed_kan {
        TileCombo::new(tiles)
    } else {
        let open = tiles[tiles.len() - 1];
        TileCombo::new_open(tiles, open, seat.unwrap_or(3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::Family;

    #[test]
    fn parses_suits_and_honors() {
        let tiles = parse_tiles("19m19p19s1234567z", false).unwrap();
        assert_eq!(tiles.len(), 13);
        assert!(tiles.iter().all(Tile::is_honor_or_terminal));
        assert_eq!(tiles[12].family(), Family::Dragon);
    }

    #[test]
    fn copies_are_distinct() {
        let tiles = parse_tiles("1111m", false).unwrap();
        for (i, a) in tiles.iter().enumerate() {
            for b in &tiles[i + 1..] {
                assert!(!a.same_instance(b));
            }
        }
        assert!(parse_tiles("11111m", false).is_err());
    }

    #[test]
    fn red_five_notation() {
        let tiles = parse_tiles("0m5m", true).unwrap();
        assert!(tiles[0].is_red());
        assert!(!tiles[1].is_red());
        assert_eq!(tiles[0], tiles[1]);

        // Without red doras the reserved copy is a plain five.
        let plain = parse_tiles("0p", false).unwrap();
        assert!(!plain[0].is_red());
        assert_eq!(plain[0].number(), 5);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_tiles("123", false).is_err());
        assert!(parse_tiles("8z", false).is_err());
        assert!(parse_tiles("12x", false).is_err());
        assert!(parse_tile("12m", false).is_err());
        assert_eq!(parse_tile("7z", false).unwrap().to_string(), "7z");
    }

    #[test]
    fn hand_with_melds() {
        let (tiles, combos) = parse_hand("123m44p(p7z1)(k1s)(k2s2)(234p)", false).unwrap();
        assert_eq!(tiles.len(), 5);
        assert_eq!(combos.len(), 4);
        assert!(combos[0].is_triplet());
        assert_eq!(combos[0].stolen_from(), Some(1));
        assert!(combos[1].is_quad() && combos[1].is_concealed());
        assert!(combos[2].is_quad() && !combos[2].is_concealed());
        assert!(combos[3].is_run());
        assert_eq!(combos[3].stolen_from(), Some(3));
    }

    #[test]
    fn unclosed_meld_is_an_error() {
        assert!(parse_hand("123m(p7z", false).is_err());
    }
}
