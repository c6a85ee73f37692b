//! Typed action vocabulary over the round API, and the legal actions of a seat.

use std::fmt;

use anyhow::{bail, Result};
use mahjong_engine::{Round, Tile, TurnPhase};

/// One decision of one seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Draw,
    Discard(Tile),
    /// Declare riichi, discarding this tile.
    Riichi(Tile),
    Tsumo,
    Ron,
    Pon,
    /// Chii on the previous discard, by start number of the run.
    Chii(u8),
    Kan(Tile),
    /// Decline every call on offer.
    Pass,
}

/// Precedence of simultaneous claims on a discard.
pub const RON_PRIORITY: u8 = 3;

impl Action {
    /// Claim on another seat's tile when offered in response to a discard
    /// or a kan.
    #[inline]
    pub const fn is_claim(self) -> bool {
        self.claim_priority() > 0
    }

    /// Ron over pon and kan over chii. Zero for non-claims.
    #[inline]
    pub const fn claim_priority(self) -> u8 {
        match self {
            Action::Ron => RON_PRIORITY,
            Action::Pon | Action::Kan(_) => 2,
            Action::Chii(_) => 1,
            _ => 0,
        }
    }

    /// Plays the action for `seat`. Draw, discard, riichi, tsumo and chii
    /// act for the current player.
    pub fn apply(self, round: &mut Round, seat: usize) -> Result<()> {
        let done = match self {
            Action::Draw => round.pick().is_some(),
            Action::Discard(t) => round.discard(t),
            Action::Riichi(t) => round.call_riichi(t),
            Action::Tsumo => round.call_tsumo(),
            Action::Ron => round.call_ron(seat),
            Action::Pon => round.call_pon(seat),
            Action::Chii(start) => round.call_chii(start),
            Action::Kan(t) => round.call_kan(seat, Some(t)).is_some(),
            Action::Pass => true,
        };
        if !done {
            bail!("seat {seat} cannot play {self}");
        }
        Ok(())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Draw => f.write_str("draw"),
            Action::Discard(t) => write!(f, "discard {t}"),
            Action::Riichi(t) => write!(f, "riichi {t}"),
            Action::Tsumo => f.write_str("tsumo"),
            Action::Ron => f.write_str("ron"),
            Action::Pon => f.write_str("pon"),
            Action::Chii(start) => write!(f, "chii from {start}"),
            Action::Kan(t) => write!(f, "kan {t}"),
            Action::Pass => f.write_str("pass"),
        }
    }
}

/// Tiles the current player may discard, one per kind (red fives apart).
pub fn discard_choices(round: &Round) -> Vec<Tile> {
    let mut choices: Vec<Tile> = Vec::new();
    for t in round.hand(round.current_player()).concealed_tiles() {
        let seen = choices
            .iter()
            .any(|c| c.kind() == t.kind() && c.is_red() == t.is_red());
        if !seen && round.can_discard(t) {
            choices.push(*t);
        }
    }
    choices
}

/// Legal actions of `seat`, claims first.
///
/// While the current player must draw, every seat but the discarder may
/// claim the last discard; the current player's alternative is `Draw`,
/// everyone else's is `Pass`. During a kan the other seats may only rob it.
pub fn legal_actions(round: &Round, seat: usize) -> Vec<Action> {
    let mut actions = Vec::new();
    if round.has_winner() {
        return actions;
    }
    let current = round.current_player();

    match round.phase() {
        TurnPhase::AwaitingDraw => {
            if round.can_call_ron(seat) {
                actions.push(Action::Ron);
            }
            if round.can_call_pon(seat) {
                actions.push(Action::Pon);
            }
            actions.extend(round.can_call_kan(seat).into_iter().map(Action::Kan));
            if seat == current {
                actions.extend(round.can_call_chii().into_iter().map(Action::Chii));
                if !round.is_wall_exhausted() {
                    actions.push(Action::Draw);
                }
            } else if !actions.is_empty() {
                actions.push(Action::Pass);
            }
        }
        _ if seat == current => {
            if round.can_call_tsumo() {
                actions.push(Action::Tsumo);
            }
            actions.extend(round.can_call_riichi().into_iter().map(Action::Riichi));
            actions.extend(round.can_call_kan(seat).into_iter().map(Action::Kan));
            actions.extend(discard_choices(round).into_iter().map(Action::Discard));
        }
        TurnPhase::KanPending { .. } => {
            if round.can_call_ron(seat) {
                actions.extend([Action::Ron, Action::Pass]);
            }
        }
        TurnPhase::AwaitingDiscard { .. } => {}
    }
    actions
}
