//! One round (hand) of play: the wall, the four hands, discard piles and the
//! legality-checked call API.
//!
//! Probes (`can_*`) never mutate. Mutators return `false` / `None` when the
//! action is not legal in the current [`TurnPhase`]. Seat indices outside
//! `0..4` are caller bugs and panic.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::{RiichiError, RiichiResult};
use crate::hand::{Hand, KanKind};
use crate::rule::GameRule;
use crate::score::RIICHI_COST;
use crate::tile::{kind_counts, relative_seat, Tile, TileKind, Wind, NUM_TILES, NUM_TILE_KINDS};
use crate::yaku::{DrawType, RiichiState, WinContext};

mod settlement;
pub mod wall;

pub use settlement::{EndOfRound, PlayerSettlement};
use wall::Wall;

const NP: usize = 4;

#[inline]
fn check_seat(seat: usize) {
    assert!(seat < NP, "seat index {seat} out of range");
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    /// The current player has 13 net tiles and must draw; the previous
    /// player's last discard may be called.
    AwaitingDraw,
    AwaitingDiscard { after_stealing: bool },
    /// A kan was declared and the compensation tile drawn. `compensation`
    /// becomes `None` once the draw is rolled back by a robbing ron.
    KanPending {
        kind: KanKind,
        kan_tile: Tile,
        compensation: Option<Tile>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiichiRecord {
    /// Number of the declarer's discards before the riichi tile.
    pub discard_rank: usize,
    pub is_double: bool,
    pub tile: Tile,
    /// Length of each opponent's discard pile at declaration, calls included.
    /// `None` at the declarer's own seat.
    pub opponent_discard_ranks: [Option<usize>; NP],
}

/// Table state a round starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSetup {
    pub east_index: usize,
    pub dominant_wind: Wind,
    pub honba: u32,
    pub pending_riichi: u32,
    pub points: [i32; NP],
    pub rule: GameRule,
}

impl Default for RoundSetup {
    fn default() -> Self {
        let rule = GameRule::default();
        Self {
            east_index: 0,
            dominant_wind: Wind::East,
            honba: 0,
            pending_riichi: 0,
            points: [rule.starting_points(); NP],
            rule,
        }
    }
}

// ---------------------------------------------------------------------------
// Round
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    rule: GameRule,
    wall: Wall,
    hands: [Hand; NP],
    /// Visible discard piles; a called tile leaves its pile.
    discards: [Vec<Tile>; NP],
    /// Every tile each seat gave away, called or not. Drives furiten.
    virtual_discards: [Vec<Tile>; NP],
    riichis: [Option<RiichiRecord>; NP],
    current: usize,
    east_index: usize,
    dominant_wind: Wind,
    honba: u32,
    pending_riichi: u32,
    points: [i32; NP],
    /// Seats of the discards since the last call, newest first.
    history: Vec<usize>,
    /// A call has cleared the history at least once.
    interrupted: bool,
    phase: TurnPhase,
    winners: Vec<usize>,
    /// Seat paying a ron and the tile won.
    ron_source: Option<(usize, Tile)>,
}

impl Round {
    /// Deals `wall`, a permutation of the 136 tiles in wall layout (see
    /// [`wall`]). Starting hands are taken by absolute seat.
    pub fn new(tiles: Vec<Tile>, setup: RoundSetup) -> RiichiResult<Round> {
        if tiles.len() != NUM_TILES {
            return Err(RiichiError::InvalidConfig {
                message: format!("a wall holds {NUM_TILES} tiles, got {}", tiles.len()),
            });
        }
        let mut seen = [false; NUM_TILES];
        for t in &tiles {
            let id = t.id().value() as usize;
            if std::mem::replace(&mut seen[id], true) {
                return Err(RiichiError::InvalidConfig {
                    message: format!("tile id {id} appears twice in the wall"),
                });
            }
        }
        if setup.east_index >= NP {
            return Err(RiichiError::InvalidConfig {
                message: format!("east index {} out of range", setup.east_index),
            });
        }

        let ([h0, h1, h2, h3], wall) = Wall::split(&tiles);
        let hands = [Hand::new(h0)?, Hand::new(h1)?, Hand::new(h2)?, Hand::new(h3)?];
        Ok(Round {
            rule: setup.rule,
            wall,
            hands,
            discards: Default::default(),
            virtual_discards: Default::default(),
            riichis: Default::default(),
            current: setup.east_index,
            east_index: setup.east_index,
            dominant_wind: setup.dominant_wind,
            honba: setup.honba,
            pending_riichi: setup.pending_riichi,
            points: setup.points,
            history: Vec::new(),
            interrupted: false,
            phase: TurnPhase::AwaitingDraw,
            winners: Vec::new(),
            ron_source: None,
        })
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[inline]
    pub fn rule(&self) -> &GameRule {
        &self.rule
    }

    #[inline]
    pub fn wall(&self) -> &Wall {
        &self.wall
    }

    pub fn hand(&self, seat: usize) -> &Hand {
        check_seat(seat);
        &self.hands[seat]
    }

    pub fn discards(&self, seat: usize) -> &[Tile] {
        check_seat(seat);
        &self.discards[seat]
    }

    pub fn virtual_discards(&self, seat: usize) -> &[Tile] {
        check_seat(seat);
        &self.virtual_discards[seat]
    }

    pub fn riichi(&self, seat: usize) -> Option<&RiichiRecord> {
        check_seat(seat);
        self.riichis[seat].as_ref()
    }

    #[inline]
    pub fn current_player(&self) -> usize {
        self.current
    }

    /// Seat that played just before the current player.
    #[inline]
    pub fn previous_player(&self) -> usize {
        relative_seat(self.current, -1)
    }

    #[inline]
    pub fn east_index(&self) -> usize {
        self.east_index
    }

    #[inline]
    pub fn dominant_wind(&self) -> Wind {
        self.dominant_wind
    }

    #[inline]
    pub fn honba(&self) -> u32 {
        self.honba
    }

    #[inline]
    pub fn pending_riichi(&self) -> u32 {
        self.pending_riichi
    }

    /// Points after riichi stakes, before settlement.
    #[inline]
    pub fn points(&self) -> [i32; NP] {
        self.points
    }

    #[inline]
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Seats that declared a win, in declaration order.
    #[inline]
    pub fn winners(&self) -> &[usize] {
        &self.winners
    }

    /// Seat paying the declared ron(s).
    pub fn ron_source_seat(&self) -> Option<usize> {
        self.ron_source.map(|(seat, _)| seat)
    }

    pub fn seat_wind(&self, seat: usize) -> Wind {
        check_seat(seat);
        Wind::from(((seat + NP - self.east_index) % NP) as u8)
    }

    #[inline]
    pub fn is_wall_exhausted(&self) -> bool {
        self.wall.is_exhausted()
    }

    #[inline]
    pub fn visible_dora_count(&self) -> usize {
        self.wall.visible_dora_count()
    }

    pub fn is_riichi(&self, seat: usize) -> bool {
        self.riichi(seat).is_some()
    }

    /// The seat declared riichi with its discard of index `rank`.
    pub fn is_riichi_rank(&self, seat: usize, rank: usize) -> bool {
        self.riichi(seat).is_some_and(|r| r.discard_rank == rank)
    }

    /// Someone declared a win; only settlement remains.
    #[inline]
    pub fn has_winner(&self) -> bool {
        !self.winners.is_empty()
    }

    /// The last discard was played on an empty wall. Callers should offer
    /// ron on that discard before settling.
    pub fn is_exhaustive_draw(&self) -> bool {
        self.winners.is_empty() && self.wall.is_exhausted() && self.phase == TurnPhase::AwaitingDraw
    }

    /// Tiles held by walls, hands and visible discard piles. Always 136.
    pub fn tile_count(&self) -> usize {
        self.wall.tile_count()
            + self.hands.iter().map(|h| h.all_tiles().len()).sum::<usize>()
            + self.discards.iter().map(Vec::len).sum::<usize>()
    }

    fn awaits_discard(&self) -> bool {
        match self.phase {
            TurnPhase::AwaitingDiscard { .. } => true,
            TurnPhase::KanPending { compensation, .. } => compensation.is_some(),
            TurnPhase::AwaitingDraw => false,
        }
    }

    fn after_stealing(&self) -> bool {
        matches!(
            self.phase,
            TurnPhase::AwaitingDiscard { after_stealing: true }
                | TurnPhase::KanPending {
                    kind: KanKind::Open,
                    ..
                }
        )
    }

    fn interrupt(&mut self) {
        self.history.clear();
        self.interrupted = true;
    }

    // -----------------------------------------------------------------------
    // Draw and discard
    // -----------------------------------------------------------------------

    /// Draws the next live tile for the current player.
    pub fn pick(&mut self) -> Option<Tile> {
        if self.phase != TurnPhase::AwaitingDraw || self.has_winner() {
            return None;
        }
        let tile = self.wall.pick()?;
        self.hands[self.current].pick(tile);
        self.phase = TurnPhase::AwaitingDiscard {
            after_stealing: false,
        };
        Some(tile)
    }

    /// After riichi only the drawn tile may leave the hand.
    pub fn can_discard(&self, tile: &Tile) -> bool {
        if self.has_winner() || !self.awaits_discard() {
            return false;
        }
        let hand = &self.hands[self.current];
        if self.riichis[self.current].is_some()
            && !hand.latest_pick().is_some_and(|t| t.same_instance(tile))
        {
            return false;
        }
        hand.can_discard_tile(tile, self.after_stealing())
    }

    pub fn discard(&mut self, tile: Tile) -> bool {
        if !self.can_discard(&tile) {
            return false;
        }
        let seat = self.current;
        let after_stealing = self.after_stealing();
        if !self.hands[seat].discard(&tile, after_stealing) {
            return false;
        }
        self.discards[seat].push(tile);
        self.virtual_discards[seat].push(tile);
        self.history.insert(0, seat);
        self.current = relative_seat(seat, 1);
        self.phase = TurnPhase::AwaitingDraw;
        true
    }

    // -----------------------------------------------------------------------
    // Chii / pon
    // -----------------------------------------------------------------------

    fn callable_discard(&self) -> Option<(usize, Tile)> {
        if self.has_winner() || self.phase != TurnPhase::AwaitingDraw || self.wall.is_exhausted() {
            return None;
        }
        let from = self.previous_player();
        self.discards[from].last().map(|t| (from, *t))
    }

    /// Start numbers of the runs the current player may build with the
    /// previous player's discard.
    pub fn can_call_chii(&self) -> Vec<u8> {
        let seat = self.current;
        let Some((from, tile)) = self.callable_discard() else {
            return Vec::new();
        };
        if tile.is_honor() || self.riichis[seat].is_some() {
            return Vec::new();
        }
        let n = tile.number();
        (n.saturating_sub(2).max(1)..=n.min(7))
            .filter(|&start| {
                let mut hand = self.hands[seat].clone();
                hand.declare_chii(tile, from, start) && leaves_discard(&hand)
            })
            .collect()
    }

    pub fn call_chii(&mut self, start_number: u8) -> bool {
        if !self.can_call_chii().contains(&start_number) {
            return false;
        }
        let seat = self.current;
        let from = self.previous_player();
        let Some(tile) = self.discards[from].pop() else {
            return false;
        };
        if !self.hands[seat].declare_chii(tile, from, start_number) {
            self.discards[from].push(tile);
            return false;
        }
        debug!("seat {seat} chii {tile} from seat {from}");
        self.interrupt();
        self.phase = TurnPhase::AwaitingDiscard {
            after_stealing: true,
        };
        true
    }

    pub fn can_call_pon(&self, seat: usize) -> bool {
        check_seat(seat);
        let Some((from, tile)) = self.callable_discard() else {
            return false;
        };
        seat != from
            && self.riichis[seat].is_none()
            && self.hands[seat].count_kind(tile.kind()) >= 2
    }

    pub fn call_pon(&mut self, seat: usize) -> bool {
        if !self.can_call_pon(seat) {
            return false;
        }
        let from = self.previous_player();
        let Some(tile) = self.discards[from].pop() else {
            return false;
        };
        if !self.hands[seat].declare_pon(tile, from) {
            self.discards[from].push(tile);
            return false;
        }
        debug!("seat {seat} pon {tile} from seat {from}");
        self.interrupt();
        self.current = seat;
        self.phase = TurnPhase::AwaitingDiscard {
            after_stealing: true,
        };
        true
    }

    // -----------------------------------------------------------------------
    // Kan
    // -----------------------------------------------------------------------

    /// Tiles `seat` may declare a kan with. On its own turn: concealed quads
    /// and pon upgrades (for a riichi hand only the drawn kind, and only when
    /// every tenpai-keeping discard is that kind). Otherwise: an open kan on
    /// the previous player's discard.
    pub fn can_call_kan(&self, seat: usize) -> Vec<Tile> {
        check_seat(seat);
        if self.has_winner()
            || self.wall.compensation_tiles().is_empty()
            || self.wall.is_exhausted()
        {
            return Vec::new();
        }
        let hand = &self.hands[seat];

        if seat == self.current && self.awaits_discard() {
            let counts = kind_counts(hand.concealed_tiles());
            let mut choices: Vec<Tile> = Vec::new();
            for t in hand.concealed_tiles() {
                if choices.iter().any(|c| c.kind() == t.kind()) {
                    continue;
                }
                let quad = counts[t.kind().index()] == 4;
                let upgrade = hand
                    .declared_combos()
                    .iter()
                    .any(|c| c.is_triplet() && !c.is_concealed() && c.first_kind() == t.kind());
                if quad || upgrade {
                    choices.push(*t);
                }
            }
            if self.riichis[seat].is_some() {
                let Some(latest) = hand.latest_pick() else {
                    return Vec::new();
                };
                if self
                    .tenpai_discards(seat)
                    .iter()
                    .any(|t| t.kind() != latest.kind())
                {
                    return Vec::new();
                }
                choices.retain(|t| t.kind() == latest.kind());
            }
            return choices;
        }

        let Some((from, tile)) = self.callable_discard() else {
            return Vec::new();
        };
        if seat == from || self.riichis[seat].is_some() || hand.count_kind(tile.kind()) < 3 {
            return Vec::new();
        }
        vec![tile]
    }

    /// Declares a kan and draws the compensation tile, which is returned.
    /// `tile` picks among several candidates by kind; `None` takes the first.
    pub fn call_kan(&mut self, seat: usize, tile: Option<Tile>) -> Option<Tile> {
        let choices = self.can_call_kan(seat);
        let chosen = match tile {
            Some(t) => choices.iter().find(|c| c.kind() == t.kind()).copied()?,
            None => choices.first().copied()?,
        };

        let (kind, kan_tile) = if seat == self.current && self.awaits_discard() {
            let kind = self.hands[seat].declare_kan(chosen, None)?;
            if kind == KanKind::Added {
                self.virtual_discards[seat].push(chosen);
            }
            (kind, chosen)
        } else {
            let from = self.previous_player();
            let discard = self.discards[from].pop()?;
            if self.hands[seat].declare_kan(discard, Some(from)).is_none() {
                self.discards[from].push(discard);
                return None;
            }
            self.current = seat;
            (KanKind::Open, discard)
        };

        self.interrupt();
        let compensation = self.wall.pick_compensation()?;
        self.hands[seat].pick(compensation);
        self.phase = TurnPhase::KanPending {
            kind,
            kan_tile,
            compensation: Some(compensation),
        };
        debug!("seat {seat} {kind:?} kan on {kan_tile}, compensation {compensation}");
        Some(compensation)
    }

    /// Rolls back the compensation draw of the pending kan.
    pub fn undo_pick_compensation_tile(&mut self) -> bool {
        let TurnPhase::KanPending {
            kind,
            kan_tile,
            compensation: Some(tile),
        } = self.phase
        else {
            return false;
        };
        if !self.hands[self.current].undo_pick(&tile) {
            return false;
        }
        self.wall.undo_compensation(tile);
        self.phase = TurnPhase::KanPending {
            kind,
            kan_tile,
            compensation: None,
        };
        true
    }

    // -----------------------------------------------------------------------
    // Riichi
    // -----------------------------------------------------------------------

    /// Discards that can declare riichi for the current player.
    pub fn can_call_riichi(&self) -> Vec<Tile> {
        let seat = self.current;
        if self.has_winner()
            || !self.awaits_discard()
            || self.riichis[seat].is_some()
            || !self.hands[seat].is_concealed()
            || self.wall.remaining() < NP
            || self.points[seat] < RIICHI_COST
        {
            return Vec::new();
        }
        self.tenpai_discards(seat)
    }

    /// Discards `tile` and declares riichi.
    pub fn call_riichi(&mut self, tile: Tile) -> bool {
        let allowed = self
            .can_call_riichi()
            .iter()
            .any(|t| t.kind() == tile.kind());
        if !allowed || !self.can_discard(&tile) {
            return false;
        }
        let seat = self.current;
        let discard_rank = self.virtual_discards[seat].len();
        let is_double = discard_rank == 0 && self.is_uninterrupted(seat);
        if !self.discard(tile) {
            return false;
        }
        let mut opponent_discard_ranks = [None; NP];
        for (s, rank) in opponent_discard_ranks.iter_mut().enumerate() {
            if s != seat {
                *rank = Some(self.virtual_discards[s].len());
            }
        }
        self.riichis[seat] = Some(RiichiRecord {
            discard_rank,
            is_double,
            tile,
            opponent_discard_ranks,
        });
        self.points[seat] -= RIICHI_COST;
        self.pending_riichi += 1;
        debug!("seat {seat} riichi on {tile} (double: {is_double})");
        true
    }

    // -----------------------------------------------------------------------
    // Winning
    // -----------------------------------------------------------------------

    fn self_draw_context(&self) -> Option<WinContext> {
        if self.has_winner() || !self.awaits_discard() {
            return None;
        }
        let seat = self.current;
        let latest = self.hands[seat].latest_pick()?;
        let draw_type = match self.phase {
            TurnPhase::KanPending { .. } => DrawType::Compensation,
            _ => DrawType::Wall,
        };
        Some(self.win_context(seat, latest, draw_type))
    }

    pub fn can_call_tsumo(&self) -> bool {
        self.self_draw_context()
            .is_some_and(|ctx| self.hands[self.current].evaluate(&ctx).is_some())
    }

    pub fn call_tsumo(&mut self) -> bool {
        let Some(ctx) = self.self_draw_context() else {
            return false;
        };
        let seat = self.current;
        if !self.hands[seat].set_yakus(&ctx) {
            return false;
        }
        debug!("seat {seat} tsumo: {:?}", self.hands[seat].yakus());
        self.winners.push(seat);
        true
    }

    /// Paying seat, tile and draw type of a ron available to `seat`.
    fn ron_target(&self, seat: usize) -> Option<(usize, Tile, DrawType)> {
        if self.winners.contains(&seat) || (self.has_winner() && self.ron_source.is_none()) {
            return None;
        }
        match self.phase {
            TurnPhase::KanPending { kind, kan_tile, .. } if seat != self.current => match kind {
                KanKind::Added => Some((self.current, kan_tile, DrawType::OpponentKanCallOpen)),
                KanKind::Concealed => {
                    Some((self.current, kan_tile, DrawType::OpponentKanCallConcealed))
                }
                KanKind::Open => None,
            },
            TurnPhase::AwaitingDraw => {
                let from = self.previous_player();
                if seat == from {
                    return None;
                }
                self.discards[from]
                    .last()
                    .map(|t| (from, *t, DrawType::OpponentDiscard))
            }
            _ => None,
        }
    }

    pub fn can_call_ron(&self, seat: usize) -> bool {
        check_seat(seat);
        let Some((_, tile, draw_type)) = self.ron_target(seat) else {
            return false;
        };
        let ctx = self.win_context(seat, tile, draw_type);
        self.hands[seat].evaluate(&ctx).is_some() && !self.is_furiten(seat, &tile, draw_type)
    }

    /// Declares a ron. Several seats may ron the same tile; robbing a kan
    /// rolls back its compensation draw.
    pub fn call_ron(&mut self, seat: usize) -> bool {
        if !self.can_call_ron(seat) {
            return false;
        }
        let Some((from, tile, draw_type)) = self.ron_target(seat) else {
            return false;
        };
        let ctx = self.win_context(seat, tile, draw_type);
        if !self.hands[seat].set_yakus(&ctx) {
            return false;
        }
        debug!(
            "seat {seat} ron on {tile} from seat {from}: {:?}",
            self.hands[seat].yakus()
        );
        self.winners.push(seat);
        self.ron_source = Some((from, tile));
        if matches!(
            self.phase,
            TurnPhase::KanPending {
                compensation: Some(_),
                ..
            }
        ) {
            self.undo_pick_compensation_tile();
        }
        true
    }

    // -----------------------------------------------------------------------
    // Turn history
    // -----------------------------------------------------------------------

    /// No call happened since the seat's last discard and every player
    /// discarded in order since then. A seat without discards counts from
    /// the dealer's first discard.
    fn is_uninterrupted(&self, seat: usize) -> bool {
        let (since, start) = match self.history.iter().position(|&s| s == seat) {
            Some(pos) => (&self.history[..pos], relative_seat(seat, 1)),
            None if self.interrupted => return false,
            None => (&self.history[..], self.east_index),
        };
        since
            .iter()
            .rev()
            .enumerate()
            .all(|(i, &s)| s == relative_seat(start, i as isize))
    }

    fn win_context(&self, seat: usize, tile: Tile, draw_type: DrawType) -> WinContext {
        let uninterrupted = self.is_uninterrupted(seat);
        let own = &self.virtual_discards[seat];
        let record = self.riichis[seat].as_ref();
        WinContext {
            latest_tile: tile,
            draw_type,
            dominant_wind: self.dominant_wind,
            seat_wind: self.seat_wind(seat),
            is_first_turn: !self.wall.is_exhausted() && own.is_empty() && uninterrupted,
            is_round_last_tile: self.wall.is_exhausted(),
            riichi: match record {
                None => RiichiState::None,
                Some(r) if r.is_double => RiichiState::Double,
                Some(_) => RiichiState::Riichi,
            },
            is_ippatsu: record.is_some_and(|r| {
                uninterrupted && own.last().is_some_and(|t| t.same_instance(&r.tile))
            }),
            use_renhou: self.rule.use_renhou,
        }
    }

    // -----------------------------------------------------------------------
    // Furiten
    // -----------------------------------------------------------------------

    fn is_furiten(&self, seat: usize, ron_tile: &Tile, draw_type: DrawType) -> bool {
        let hand = &self.hands[seat];
        if self.virtual_discards[seat].iter().any(|t| hand.completes_with(t)) {
            return true;
        }

        // Tiles passed since the seat's own last discard.
        let skip_discarder = draw_type == DrawType::OpponentDiscard;
        let temporary = self
            .history
            .iter()
            .enumerate()
            .take_while(|&(_, &s)| s != seat)
            .filter(|&(i, _)| !(skip_discarder && i == 0))
            .any(|(_, &s)| {
                self.virtual_discards[s]
                    .last()
                    .is_some_and(|t| hand.completes_with(t))
            });
        if temporary {
            return true;
        }

        let Some(record) = &self.riichis[seat] else {
            return false;
        };
        (0..NP).filter(|&s| s != seat).any(|s| {
            let rank = record.opponent_discard_ranks[s].unwrap_or(0);
            self.virtual_discards[s]
                .iter()
                .skip(rank)
                .filter(|t| !t.same_instance(ron_tile))
                .any(|t| hand.completes_with(t))
        })
    }

    // -----------------------------------------------------------------------
    // Point of view
    // -----------------------------------------------------------------------

    /// Tiles `seat` cannot see: live wall, opponents' concealed tiles and the
    /// unrevealed part of the dead wall.
    pub fn concealed_from_view(&self, seat: usize) -> Vec<Tile> {
        check_seat(seat);
        let mut tiles = self.wall.live_tiles().to_vec();
        for (s, hand) in self.hands.iter().enumerate() {
            if s != seat {
                tiles.extend_from_slice(hand.concealed_tiles());
            }
        }
        tiles.extend_from_slice(self.wall.compensation_tiles());
        tiles.extend_from_slice(self.wall.dead_treasure_tiles());
        tiles.extend_from_slice(self.wall.ura_indicators());
        tiles.extend_from_slice(self.wall.hidden_dora_indicators());
        tiles
    }

    /// Tiles `seat` can see: its own hand, every declared combo, visible
    /// discards and revealed dora indicators.
    pub fn dead_tiles_for(&self, seat: usize) -> Vec<Tile> {
        check_seat(seat);
        let mut tiles = self.hands[seat].concealed_tiles().to_vec();
        for hand in &self.hands {
            tiles.extend(hand.declared_combos().iter().flat_map(|c| c.tiles().iter().copied()));
        }
        for pile in &self.discards {
            tiles.extend_from_slice(pile);
        }
        tiles.extend_from_slice(self.wall.visible_dora_indicators());
        tiles
    }

    /// Discards of a 14-tile hand keeping it tenpai on a tile `seat` cannot see.
    pub fn tenpai_discards(&self, seat: usize) -> Vec<Tile> {
        let mut unseen = [false; NUM_TILE_KINDS];
        for t in self.concealed_from_view(seat) {
            unseen[t.kind().index()] = true;
        }
        let candidates: Vec<TileKind> = (0..NUM_TILE_KINDS as u8)
            .filter_map(TileKind::new)
            .filter(|k| unseen[k.index()])
            .collect();
        self.hands[seat].tenpai_discards(&candidates)
    }

    /// A 13-tile hand one tile away from completion.
    pub fn is_tenpai(&self, seat: usize) -> bool {
        check_seat(seat);
        let all: Vec<TileKind> = (0..NUM_TILE_KINDS as u8).filter_map(TileKind::new).collect();
        self.hands[seat].tenpai_with(&all)
    }

    /// A riichi player with nothing to decide but the forced discard.
    pub fn human_can_auto_discard(&self, seat: usize) -> bool {
        check_seat(seat);
        seat == self.current
            && self.awaits_discard()
            && self.is_riichi(seat)
            && self.can_call_kan(seat).is_empty()
    }
}

/// Some concealed tile may be discarded right after the call.
fn leaves_discard(hand: &Hand) -> bool {
    hand.concealed_tiles()
        .iter()
        .any(|t| hand.can_discard_tile(t, true))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeding::arrange_wall;
    use crate::tile::full_set;

    fn round(hands: [&str; 4], draws: &str, dora: &str) -> Round {
        let wall = arrange_wall(hands, draws, dora, false).unwrap();
        Round::new(wall, RoundSetup::default()).unwrap()
    }

    fn find(round: &Round, seat: usize, text: &str) -> Tile {
        let kind = crate::parser::parse_tile(text, false).unwrap().kind();
        *round
            .hand(seat)
            .concealed_tiles()
            .iter()
            .find(|t| t.kind() == kind)
            .unwrap()
    }

    #[test]
    fn rejects_bad_walls() {
        assert!(Round::new(Vec::new(), RoundSetup::default()).is_err());
        let mut tiles = full_set(false);
        tiles[1] = tiles[0];
        assert!(Round::new(tiles, RoundSetup::default()).is_err());
    }

    #[test]
    fn pick_discard_cycle() {
        let mut r = Round::new(full_set(false), RoundSetup::default()).unwrap();
        assert_eq!(r.current_player(), 0);
        assert!(r.can_call_chii().is_empty());
        let t = r.pick().unwrap();
        assert!(r.pick().is_none());
        assert!(r.can_discard(&t));
        assert!(r.discard(t));
        assert_eq!(r.current_player(), 1);
        assert_eq!(r.discards(0).len(), 1);
        assert_eq!(r.tile_count(), NUM_TILES);
        assert_eq!(r.seat_wind(1), Wind::South);
    }

    #[test]
    #[should_panic]
    fn out_of_range_seat_panics() {
        let r = Round::new(full_set(false), RoundSetup::default()).unwrap();
        r.can_call_pon(4);
    }

    #[test]
    fn pon_jumps_turn() {
        let mut r = round(
            ["123m456m789m1234p", "123s456s789s1122z", "55z123p456p789p11s", "99m99p99s33z44z66z7z"],
            "5z",
            "9m",
        );
        let five_z = r.pick().unwrap();
        assert!(r.discard(five_z));
        assert!(r.can_call_pon(2));
        assert!(!r.can_call_pon(1));
        assert!(!r.can_call_pon(0));
        assert!(r.can_call_chii().is_empty());

        assert!(r.call_pon(2));
        assert_eq!(r.current_player(), 2);
        assert!(r.discards(0).is_empty());
        assert_eq!(r.virtual_discards(0).len(), 1);
        assert!(!r.hand(2).is_concealed());
        assert_eq!(r.tile_count(), NUM_TILES);

        let one_s = find(&r, 2, "1s");
        assert!(r.discard(one_s));
        assert_eq!(r.current_player(), 3);
    }

    #[test]
    fn chii_options_and_call() {
        let mut r = round(
            ["3m456p789p11z22z33z", "12m45m123s456s789s", "999m111p222p333s4s", "678m567s555z666z7z"],
            "4z",
            "9s",
        );
        r.pick().unwrap();
        let three = find(&r, 0, "3m");
        assert!(r.discard(three));
        assert_eq!(r.can_call_chii(), vec![1, 2, 3]);
        assert!(!r.call_chii(4));
        assert!(r.call_chii(2));
        assert_eq!(r.current_player(), 1);
        assert_eq!(r.hand(1).declared_combos().len(), 1);
        assert!(r.discards(0).is_empty());
        assert!(r.pick().is_none());
        assert_eq!(r.tile_count(), NUM_TILES);
    }

    #[test]
    fn riichi_on_first_discard_is_double() {
        let mut r = round(
            ["123m456p789s1122z", "3m111p222p333p444z", "555z666z777z999m1s", "111m222m999p999s2s"],
            "9m",
            "8s",
        );
        let drawn = r.pick().unwrap();
        let choices = r.can_call_riichi();
        assert!(choices.iter().any(|t| t.kind() == drawn.kind()));
        assert!(r.call_riichi(drawn));

        let record = r.riichi(0).unwrap();
        assert!(record.is_double);
        assert_eq!(record.discard_rank, 0);
        assert_eq!(record.opponent_discard_ranks, [None, Some(0), Some(0), Some(0)]);
        assert!(r.is_riichi_rank(0, 0));
        assert_eq!(r.points()[0], 24_000);
        assert_eq!(r.pending_riichi(), 1);
    }

    fn tanyao_round(first_draw: &str) -> Round {
        round(
            ["45m234p456p678s88s", "3m111z222z333z444z", "555z666z777z999m1p", "111m222m999p999s1s"],
            &format!("{first_draw}7m"),
            "9m",
        )
    }

    #[test]
    fn ron_on_discard() {
        let mut r = tanyao_round("1z");
        let drawn = r.pick().unwrap();
        assert!(r.discard(drawn));
        r.pick().unwrap();
        let three = find(&r, 1, "3m");
        assert!(r.discard(three));

        assert!(r.can_call_ron(0));
        assert!(!r.can_call_ron(1));
        assert!(!r.can_call_ron(2));
        assert!(r.call_ron(0));
        assert_eq!(r.winners(), &[0]);
        assert_eq!(r.ron_source_seat(), Some(1));
        assert!(r.pick().is_none());
    }

    #[test]
    fn own_discard_furiten() {
        let mut r = tanyao_round("6m");
        let six = r.pick().unwrap();
        // A complete hand that is thrown away.
        assert!(r.can_call_tsumo());
        assert!(r.discard(six));
        r.pick().unwrap();
        let three = find(&r, 1, "3m");
        assert!(r.discard(three));
        assert!(!r.can_call_ron(0));
        assert!(!r.call_ron(0));
    }

    #[test]
    fn point_of_view_partitions_the_set() {
        let mut r = Round::new(full_set(false), RoundSetup::default()).unwrap();
        let t = r.pick().unwrap();
        r.discard(t);
        for seat in 0..NP {
            let hidden = r.concealed_from_view(seat).len();
            let seen = r.dead_tiles_for(seat).len();
            assert_eq!(hidden + seen, NUM_TILES);
        }
    }
}
