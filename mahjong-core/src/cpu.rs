//! CPU decisions: a heuristic policy over the public round API.
//!
//! Every decision only returns choices the round reports legal, and never
//! decides for a human seat.

use mahjong_engine::tile::{kind_counts, Tile, TileKind};
use mahjong_engine::{Game, Round, TurnPhase};

use crate::action::discard_choices;
use crate::safety::SafetyInfo;

const NP: usize = 4;

pub struct Cpu<'a> {
    round: &'a Round,
    cpu_seats: [bool; NP],
}

impl<'a> Cpu<'a> {
    /// Decides for every seat.
    pub fn new(round: &'a Round) -> Self {
        Self::with_seats(round, [true; NP])
    }

    pub fn with_seats(round: &'a Round, cpu_seats: [bool; NP]) -> Self {
        Self { round, cpu_seats }
    }

    /// Decides for the CPU players of `game`.
    pub fn for_game(game: &'a Game) -> Self {
        let players = game.players();
        Self::with_seats(game.round(), std::array::from_fn(|s| players[s].is_cpu))
    }

    #[inline]
    fn is_cpu(&self, seat: usize) -> bool {
        self.cpu_seats[seat]
    }

    fn current_cpu(&self) -> Option<usize> {
        let seat = self.round.current_player();
        self.is_cpu(seat).then_some(seat)
    }

    /// Yakuhai kind for `seat`: a dragon, its seat wind or the round wind.
    fn is_valuable(&self, seat: usize, kind: TileKind) -> bool {
        kind.dragon().is_some()
            || kind
                .wind()
                .is_some_and(|w| w == self.round.seat_wind(seat) || w == self.round.dominant_wind())
    }

    fn last_discard(&self) -> Option<Tile> {
        self.round.discards(self.round.previous_player()).last().copied()
    }
}

// ---------------------------------------------------------------------------
// Own turn
// ---------------------------------------------------------------------------

impl Cpu<'_> {
    /// Tile the current player discards: the only legal one, else one keeping
    /// tenpai, else the safest against riichi opponents, else the most
    /// isolated.
    pub fn discard_decision(&self) -> Option<Tile> {
        let seat = self.current_cpu()?;
        let choices = discard_choices(self.round);
        match choices.as_slice() {
            [] => return None,
            [only] => return Some(*only),
            _ => {}
        }

        let tenpai = self.round.tenpai_discards(seat);
        if let Some(t) = tenpai.iter().find(|t| self.round.can_discard(t)) {
            return Some(*t);
        }

        let safety = SafetyInfo::from_round(self.round, seat);
        if safety.any_riichi() {
            return choices.iter().min_by_key(|t| safety.danger(t.kind())).copied();
        }

        let counts = kind_counts(self.round.hand(seat).concealed_tiles());
        let near = |k: TileKind, delta: i8| {
            k.offset(delta)
                .is_some_and(|n| counts[n.index()] > 0) as u32
        };
        // Fewest copies first, then fewest neighbours; ties go to the later tile.
        choices
            .iter()
            .rev()
            .min_by_key(|t| {
                let k = t.kind();
                let neighbours = 2 * (near(k, -1) + near(k, 1)) + near(k, -2) + near(k, 2);
                (counts[k.index()], neighbours)
            })
            .copied()
    }

    /// Riichi whenever possible, on the first candidate discard.
    pub fn riichi_decision(&self) -> Option<Tile> {
        self.current_cpu()?;
        self.round.can_call_riichi().first().copied()
    }

    pub fn tsumo_decision(&self) -> bool {
        self.current_cpu().is_some() && self.round.can_call_tsumo()
    }
}

// ---------------------------------------------------------------------------
// Calls
// ---------------------------------------------------------------------------

impl Cpu<'_> {
    /// Every CPU seat able to ron calls it.
    pub fn ron_decision(&self) -> Vec<usize> {
        (0..NP)
            .filter(|&s| self.is_cpu(s) && self.round.can_call_ron(s))
            .collect()
    }

    /// Seat calling pon on the last discard: only with an already open hand
    /// or for a yakuhai triplet.
    pub fn pon_decision(&self) -> Option<usize> {
        let tile = self.last_discard()?;
        (0..NP).find(|&s| {
            self.is_cpu(s)
                && self.round.can_call_pon(s)
                && (!self.round.hand(s).is_concealed() || self.is_valuable(s, tile.kind()))
        })
    }

    /// Seat and tile of a kan. With `concealed_only`, a concealed kan or pon
    /// upgrade by the current player (always accepted); otherwise an open kan
    /// on the last discard, under the same conditions as a pon.
    pub fn kan_decision(&self, concealed_only: bool) -> Option<(usize, Tile)> {
        let awaiting_draw = self.round.phase() == TurnPhase::AwaitingDraw;
        if concealed_only {
            let seat = self.current_cpu()?;
            if awaiting_draw {
                return None;
            }
            return self.round.can_call_kan(seat).first().map(|&t| (seat, t));
        }
        if !awaiting_draw {
            return None;
        }
        (0..NP).filter(|&s| self.is_cpu(s)).find_map(|s| {
            let concealed = self.round.hand(s).is_concealed();
            self.round
                .can_call_kan(s)
                .into_iter()
                .find(|t| !concealed || self.is_valuable(s, t.kind()))
                .map(|t| (s, t))
        })
    }

    /// Start number of a chii for the current player. Only an open hand
    /// calls, and never to build a run it already holds.
    pub fn chii_decision(&self) -> Option<u8> {
        let seat = self.current_cpu()?;
        let hand = self.round.hand(seat);
        if hand.is_concealed() {
            return None;
        }
        let tile = self.last_discard()?;
        let counts = kind_counts(hand.concealed_tiles());
        let held = |k: Option<TileKind>| k.is_some_and(|k| counts[k.index()] > 0);
        self.round
            .can_call_chii()
            .into_iter()
            .filter(|&start| {
                let first = TileKind::suited(tile.family(), start);
                let run = [first, first.and_then(|k| k.offset(1)), first.and_then(|k| k.offset(2))];
                !run.iter().all(|&k| held(k))
            })
            .next_back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mahjong_engine::parser::parse_tile;
    use mahjong_engine::seeding::arrange_wall;
    use mahjong_engine::RoundSetup;

    fn round(hands: [&str; 4], draws: &str) -> Round {
        let wall = arrange_wall(hands, draws, "9m", false).unwrap();
        Round::new(wall, RoundSetup::default()).unwrap()
    }

    fn tsumogiri(r: &mut Round) {
        let t = r.pick().unwrap();
        assert!(r.discard(t));
    }

    fn kind(text: &str) -> TileKind {
        parse_tile(text, false).unwrap().kind()
    }

    const OTHERS: [&str; 3] = [
        "3m111z222z333z444z",
        "555z666z777z999m1s",
        "111m222m999p999s2s",
    ];

    #[test]
    fn discards_the_most_isolated_tile() {
        let mut r = round(["1m12p45p78p12s45s78s", OTHERS[0], OTHERS[1], OTHERS[2]], "3p");
        r.pick().unwrap();
        let t = Cpu::new(&r).discard_decision().unwrap();
        assert_eq!(t.kind(), kind("1m"));
    }

    #[test]
    fn keeps_tenpai() {
        let mut r = round(
            [
                "123m456p789s1122z",
                "3m111p222p333p444z",
                "555z666z777z999m1s",
                "111m222m999p999s2s",
            ],
            "9m",
        );
        r.pick().unwrap();
        let cpu = Cpu::new(&r);
        assert_eq!(cpu.discard_decision().unwrap().kind(), kind("9m"));
        assert_eq!(cpu.riichi_decision().unwrap().kind(), kind("9m"));
    }

    #[test]
    fn riichi_player_discards_the_drawn_tile() {
        let mut r = round(
            [
                "123m456p789s1122z",
                "3m111p222p333p444z",
                "555z666z777z999m1s",
                "111m222m999p999s2s",
            ],
            "9m5z4s3s7m",
        );
        let drawn = r.pick().unwrap();
        assert!(r.call_riichi(drawn));
        for _ in 0..3 {
            tsumogiri(&mut r);
        }
        let drawn = r.pick().unwrap();
        assert_eq!(Cpu::new(&r).discard_decision(), Some(drawn));
    }

    #[test]
    fn plays_safe_against_riichi() {
        let mut r = round(
            [
                "1m12p45p78p12s45s78s",
                "234m567m789s1122z",
                "333z444z555z666z7z",
                "999m999p666s777z3s",
            ],
            "9s5p3z4z3p",
        );
        tsumogiri(&mut r);
        let five = r.pick().unwrap();
        assert!(r.call_riichi(five));
        tsumogiri(&mut r);
        tsumogiri(&mut r);
        r.pick().unwrap();

        let t = Cpu::new(&r).discard_decision().unwrap();
        assert_eq!(t.kind(), kind("5p"));
        let safety = SafetyInfo::from_round(&r, 0);
        assert!(safety.opponent_riichi[0]);
        assert!(safety.riichi_era[0][kind("3z").index()]);
    }

    #[test]
    fn pon_only_for_value() {
        let mut r = round(
            [
                "5z147m258p369s123z",
                "3m111p222p333p444z",
                "55z666z777z999m1s5p",
                "111m222m999p999s2s",
            ],
            "8s",
        );
        r.pick().unwrap();
        let white = r
            .hand(0)
            .concealed_tiles()
            .iter()
            .copied()
            .find(|t| t.kind() == kind("5z"))
            .unwrap();
        assert!(r.discard(white));
        assert_eq!(Cpu::new(&r).pon_decision(), Some(2));
        assert_eq!(Cpu::with_seats(&r, [true, true, false, true]).pon_decision(), None);
    }

    #[test]
    fn ron_only_for_cpu_seats() {
        let mut r = round(
            [
                "45m234p456p678s88s",
                "3m111z222z333z444z",
                "555z666z777z999m1p",
                "111m222m999p999s1s",
            ],
            "1z6m",
        );
        tsumogiri(&mut r);
        tsumogiri(&mut r);
        assert_eq!(Cpu::new(&r).ron_decision(), vec![0]);
        assert!(Cpu::with_seats(&r, [false, true, true, true])
            .ron_decision()
            .is_empty());
    }

    #[test]
    fn concealed_kan_is_always_taken() {
        let mut r = round(
            [
                "111p123m456m78s99s",
                "3m111z222z333z444z",
                "555z666z777z999m1s",
                "111m222m999p888s2s",
            ],
            "1p",
        );
        r.pick().unwrap();
        let (seat, tile) = Cpu::new(&r).kan_decision(true).unwrap();
        assert_eq!(seat, 0);
        assert_eq!(tile.kind(), kind("1p"));
        assert_eq!(Cpu::new(&r).kan_decision(false), None);
    }

    #[test]
    fn concealed_hand_does_not_chii() {
        let mut r = round(
            [
                "3m111z222z333z444z",
                "45m234p456p678s88s",
                "555z666z777z999m1p",
                "111m222m999p999s1s",
            ],
            "1z",
        );
        r.pick().unwrap();
        let three = r
            .hand(0)
            .concealed_tiles()
            .iter()
            .copied()
            .find(|t| t.kind() == kind("3m"))
            .unwrap();
        assert!(r.discard(three));
        assert!(!r.can_call_chii().is_empty());
        assert_eq!(Cpu::new(&r).chii_decision(), None);
    }
}
