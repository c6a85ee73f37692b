//! Tile kinds, physical tiles and the 136-tile set.
//!
//! A [`TileKind`] is one of the 34 faces (1-9 of three suits, four winds,
//! three dragons). A [`Tile`] is one physical piece: a kind plus a stable
//! [`TileId`] in `0..136` and a red-five flag. Tile equality, ordering and
//! hashing go through the kind only, so a red five equals a plain five;
//! "is this the exact same piece" questions use [`Tile::same_instance`].

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::errors::{RiichiError, RiichiResult};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of distinct tile kinds.
pub const NUM_TILE_KINDS: usize = 34;

/// Physical tiles in a standard set.
pub const NUM_TILES: usize = 136;

/// Number of copies of every kind.
pub const COPIES_PER_KIND: usize = 4;

pub const CHARACTER_START: u8 = 0;
pub const CIRCLE_START: u8 = 9;
pub const BAMBOO_START: u8 = 18;
pub const WIND_START: u8 = 27;
pub const DRAGON_START: u8 = 31;

// ---------------------------------------------------------------------------
// Family / Wind / Dragon
// ---------------------------------------------------------------------------

/// The five tile families, in sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Family {
    Character = 0,
    Circle = 1,
    Bamboo = 2,
    Wind = 3,
    Dragon = 4,
}

impl Family {
    /// True for the three numbered suits.
    #[inline]
    pub const fn is_suit(self) -> bool {
        matches!(self, Family::Character | Family::Circle | Family::Bamboo)
    }

    #[inline]
    pub const fn is_honor(self) -> bool {
        !self.is_suit()
    }
}

/// Seat and round winds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Wind {
    #[default]
    East = 0,
    South = 1,
    West = 2,
    North = 3,
}

impl From<u8> for Wind {
    fn from(val: u8) -> Self {
        match val % 4 {
            0 => Wind::East,
            1 => Wind::South,
            2 => Wind::West,
            _ => Wind::North,
        }
    }
}

impl Wind {
    pub const ALL: [Wind; 4] = [Wind::East, Wind::South, Wind::West, Wind::North];

    /// The wind that follows in play order (East -> South -> West -> North -> East).
    #[inline]
    pub fn next(self) -> Wind {
        Wind::from(self as u8 + 1)
    }

    /// Wind of the player sitting to the left (the one who plays just before).
    #[inline]
    pub fn left(self) -> Wind {
        Wind::from(self as u8 + 3)
    }

    /// Wind of the player sitting to the right (the one who plays just after).
    #[inline]
    pub fn right(self) -> Wind {
        self.next()
    }

    #[inline]
    pub fn opposite(self) -> Wind {
        Wind::from(self as u8 + 2)
    }

    /// The honor kind showing this wind.
    #[inline]
    pub const fn kind(self) -> TileKind {
        TileKind(WIND_START + self as u8)
    }
}

/// Dragons, in dora order (White -> Green -> Red -> White).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dragon {
    White = 0,
    Green = 1,
    Red = 2,
}

impl Dragon {
    #[inline]
    pub const fn kind(self) -> TileKind {
        TileKind(DRAGON_START + self as u8)
    }
}

/// Seat reached after moving `offset` places in play order from `seat`.
#[inline]
pub fn relative_seat(seat: usize, offset: isize) -> usize {
    (seat as isize + offset).rem_euclid(4) as usize
}

// ---------------------------------------------------------------------------
// TileKind
// ---------------------------------------------------------------------------

/// A tile face in the range 0-33.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileKind(u8);

impl TileKind {
    /// Creates a `TileKind` if `id` is in range 0..34.
    #[inline]
    pub const fn new(id: u8) -> Option<Self> {
        if (id as usize) < NUM_TILE_KINDS {
            Some(TileKind(id))
        } else {
            None
        }
    }

    /// A numbered tile; `None` when `number` is outside 1-9 or `family` is an honor family.
    #[inline]
    pub const fn suited(family: Family, number: u8) -> Option<Self> {
        if number < 1 || number > 9 {
            return None;
        }
        match family {
            Family::Character => Some(TileKind(CHARACTER_START + number - 1)),
            Family::Circle => Some(TileKind(CIRCLE_START + number - 1)),
            Family::Bamboo => Some(TileKind(BAMBOO_START + number - 1)),
            Family::Wind | Family::Dragon => None,
        }
    }

    /// Raw numeric id (0-33).
    #[inline]
    pub const fn id(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn family(self) -> Family {
        match self.0 {
            0..9 => Family::Character,
            9..18 => Family::Circle,
            18..27 => Family::Bamboo,
            27..31 => Family::Wind,
            _ => Family::Dragon,
        }
    }

    /// 1-based number within a suit, 0 for honors.
    #[inline]
    pub const fn number(self) -> u8 {
        if self.0 < WIND_START {
            self.0 % 9 + 1
        } else {
            0
        }
    }

    #[inline]
    pub const fn wind(self) -> Option<Wind> {
        match self.0 {
            27 => Some(Wind::East),
            28 => Some(Wind::South),
            29 => Some(Wind::West),
            30 => Some(Wind::North),
            _ => None,
        }
    }

    #[inline]
    pub const fn dragon(self) -> Option<Dragon> {
        match self.0 {
            31 => Some(Dragon::White),
            32 => Some(Dragon::Green),
            33 => Some(Dragon::Red),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_honor(self) -> bool {
        self.0 >= WIND_START
    }

    /// True for 1 or 9 of any suit.
    #[inline]
    pub const fn is_terminal(self) -> bool {
        !self.is_honor() && (self.0 % 9 == 0 || self.0 % 9 == 8)
    }

    #[inline]
    pub const fn is_honor_or_terminal(self) -> bool {
        self.is_honor() || self.is_terminal()
    }

    /// Kind of the same suit `delta` numbers away, if it exists.
    #[inline]
    pub fn offset(self, delta: i8) -> Option<TileKind> {
        if self.is_honor() {
            return None;
        }
        let number = self.number() as i8 + delta;
        if !(1..=9).contains(&number) {
            return None;
        }
        TileKind::suited(self.family(), number as u8)
    }

    /// The dora shown by an indicator of this kind.
    #[inline]
    pub const fn dora_next(self) -> TileKind {
        match self.family() {
            Family::Character | Family::Circle | Family::Bamboo => {
                let start = self.0 - self.0 % 9;
                TileKind(start + (self.0 % 9 + 1) % 9)
            }
            Family::Wind => TileKind(WIND_START + (self.0 - WIND_START + 1) % 4),
            Family::Dragon => TileKind(DRAGON_START + (self.0 - DRAGON_START + 1) % 3),
        }
    }
}

impl fmt::Debug for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TileKind({}={})", self.0, kind_name(self.0))
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(kind_name(self.0))
    }
}

// ---------------------------------------------------------------------------
// Tile
// ---------------------------------------------------------------------------

/// Stable identity of one physical tile (0-135). Survives every re-sort of a hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(u8);

impl TileId {
    #[inline]
    pub const fn new(id: u8) -> Option<Self> {
        if (id as usize) < NUM_TILES {
            Some(TileId(id))
        } else {
            None
        }
    }

    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn kind(self) -> TileKind {
        TileKind(self.0 / 4)
    }

    /// Copy 0 of each five is the red one when red doras are in use.
    #[inline]
    pub const fn is_red_slot(self) -> bool {
        matches!(self.0, 16 | 52 | 88)
    }
}

/// One physical tile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Tile {
    id: TileId,
    kind: TileKind,
    red: bool,
}

impl Tile {
    /// Builds the physical tile `id`; red only if `with_red` and the id is a red slot.
    pub fn new(id: u8, with_red: bool) -> RiichiResult<Tile> {
        let id = TileId::new(id).ok_or_else(|| RiichiError::InvalidTile {
            message: format!("tile id {id} is outside 0..{NUM_TILES}"),
        })?;
        Ok(Tile::from_id(id, with_red))
    }

    #[inline]
    pub const fn from_id(id: TileId, with_red: bool) -> Tile {
        Tile {
            id,
            kind: id.kind(),
            red: with_red && id.is_red_slot(),
        }
    }

    #[inline]
    pub const fn id(&self) -> TileId {
        self.id
    }

    #[inline]
    pub const fn kind(&self) -> TileKind {
        self.kind
    }

    #[inline]
    pub const fn is_red(&self) -> bool {
        self.red
    }

    #[inline]
    pub const fn family(&self) -> Family {
        self.kind.family()
    }

    #[inline]
    pub const fn number(&self) -> u8 {
        self.kind.number()
    }

    #[inline]
    pub const fn wind(&self) -> Option<Wind> {
        self.kind.wind()
    }

    #[inline]
    pub const fn dragon(&self) -> Option<Dragon> {
        self.kind.dragon()
    }

    #[inline]
    pub const fn is_honor(&self) -> bool {
        self.kind.is_honor()
    }

    #[inline]
    pub const fn is_terminal(&self) -> bool {
        self.kind.is_terminal()
    }

    #[inline]
    pub const fn is_honor_or_terminal(&self) -> bool {
        self.kind.is_honor_or_terminal()
    }

    /// True if this tile is the dora designated by `indicator`.
    #[inline]
    pub fn is_dora_next(&self, indicator: &Tile) -> bool {
        indicator.kind.dora_next() == self.kind
    }

    /// Same physical piece, not merely the same face.
    #[inline]
    pub fn same_instance(&self, other: &Tile) -> bool {
        self.id == other.id
    }

    /// Hand order: by kind, red five before plain fives, then by id.
    #[inline]
    pub fn sort_key(&self) -> (u8, bool, u8) {
        (self.kind.id(), !self.red, self.id.value())
    }
}

impl PartialEq for Tile {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for Tile {}

impl Hash for Tile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
    }
}

impl PartialOrd for Tile {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tile {
    fn cmp(&self, other: &Self) -> Ordering {
        self.kind.cmp(&other.kind)
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.red {
            write!(f, "0{}", &kind_name(self.kind.id())[1..])
        } else {
            f.write_str(kind_name(self.kind.id()))
        }
    }
}

/// The 136 tiles in id order.
pub fn full_set(with_red: bool) -> Vec<Tile> {
    (0..NUM_TILES as u8)
        .filter_map(TileId::new)
        .map(|id| Tile::from_id(id, with_red))
        .collect()
}

/// Sorts tiles into hand order.
#[inline]
pub fn sort_tiles(tiles: &mut [Tile]) {
    tiles.sort_by_key(Tile::sort_key);
}

/// Per-kind histogram of a tile list.
pub fn kind_counts<'a>(tiles: impl IntoIterator<Item = &'a Tile>) -> [u8; NUM_TILE_KINDS] {
    let mut counts = [0u8; NUM_TILE_KINDS];
    for t in tiles {
        counts[t.kind().index()] += 1;
    }
    counts
}

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

const KIND_NAMES: [&str; NUM_TILE_KINDS] = [
    "1m", "2m", "3m", "4m", "5m", "6m", "7m", "8m", "9m", "1p", "2p", "3p", "4p", "5p", "6p", "7p",
    "8p", "9p", "1s", "2s", "3s", "4s", "5s", "6s", "7s", "8s", "9s", "1z", "2z", "3z", "4z", "5z",
    "6z", "7z",
];

/// Short name of a kind id, "??" when out of range.
#[inline]
pub fn kind_name(kind: u8) -> &'static str {
    KIND_NAMES.get(kind as usize).copied().unwrap_or("??")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
