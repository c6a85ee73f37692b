//! End-of-round settlement: payments, honba, riichi sticks and liability.

use log::info;
use serde::{Deserialize, Serialize};

use super::{Round, NP};
use crate::combo::TileCombo;
use crate::hand::Hand;
use crate::score::{fan_count, fu_count, honba_points, points, ryuukyoku_points, DoraCount, RIICHI_COST};
use crate::tile::{Tile, Wind};
use crate::yaku::Yaku;

/// Outcome of one seat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSettlement {
    pub seat: usize,
    /// Tenpai at an exhaustive draw.
    pub tenpai: bool,
    pub fan: u32,
    pub fu: u32,
    pub yakus: Vec<Yaku>,
    pub dora: u32,
    pub ura_dora: u32,
    pub red_dora: u32,
    /// Value of the win before honba; zero for non-winners.
    pub hand_points: i32,
    /// Points received (negative when paying), riichi sticks included.
    pub net_gain: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndOfRound {
    pub ryuukyoku: bool,
    pub dealer_rotates: bool,
    /// Set by the game once it decides no round follows.
    pub end_of_game: bool,
    pub show_ura_dora: bool,
    /// Indexed by seat.
    pub players: Vec<PlayerSettlement>,
    pub honba: u32,
    /// Riichi sticks on the table when the round ended.
    pub pending_riichi: u32,
    pub dora_indicators: Vec<Tile>,
    pub ura_indicators: Vec<Tile>,
    pub visible_dora_count: usize,
}

impl EndOfRound {
    pub fn winners(&self) -> Vec<usize> {
        self.players
            .iter()
            .filter(|p| !p.yakus.is_empty())
            .map(|p| p.seat)
            .collect()
    }

    /// Sum of the net gains; equals the riichi sticks paid out.
    pub fn net_total(&self) -> i32 {
        self.players.iter().map(|p| p.net_gain).sum()
    }
}

/// Seat liable for a big three dragons or big four winds completed by
/// a tile it fed.
fn liable_seat(hand: &Hand) -> Option<usize> {
    let declared = hand.declared_combos();
    let check = |yaku: Yaku, pred: fn(&TileCombo) -> bool, count: usize| -> Option<usize> {
        if !hand.yakus().contains(&yaku) {
            return None;
        }
        let matching: Vec<&TileCombo> = declared.iter().filter(|c| pred(c)).collect();
        if matching.len() != count {
            return None;
        }
        matching.last()?.stolen_from()
    };
    check(Yaku::Daisangen, TileCombo::is_dragon, 3)
        .or_else(|| check(Yaku::Daisuushii, TileCombo::is_wind, 4))
}

impl Round {
    /// Concealed seats whose every discard is a terminal or honor and
    /// none of whose discards was called.
    fn nagashi_seats(&self) -> Vec<usize> {
        (0..NP)
            .filter(|&s| {
                let own = &self.virtual_discards[s];
                !own.is_empty()
                    && own.iter().all(Tile::is_honor_or_terminal)
                    && self.hands[s].is_concealed()
                    && !self.hands.iter().any(|h| {
                        h.declared_combos()
                            .iter()
                            .any(|c| c.stolen_from() == Some(s))
                    })
            })
            .collect()
    }

    /// Settles the round from the declared wins, or as an exhaustive draw
    /// when nobody won. Call once, after the last action of the round.
    pub fn end_of_round(&mut self) -> EndOfRound {
        let mut players: Vec<PlayerSettlement> = (0..NP)
            .map(|seat| PlayerSettlement {
                seat,
                ..Default::default()
            })
            .collect();
        let mut result = EndOfRound {
            ryuukyoku: false,
            dealer_rotates: false,
            end_of_game: false,
            show_ura_dora: false,
            players: Vec::new(),
            honba: self.honba,
            pending_riichi: self.pending_riichi,
            dora_indicators: self.wall.dora_indicators().to_vec(),
            ura_indicators: self.wall.ura_indicators().to_vec(),
            visible_dora_count: self.wall.visible_dora_count(),
        };

        let mut winners = self.winners.clone();
        let mut nagashi = false;
        if winners.is_empty() && self.rule.use_nagashi_mangan && self.wall.is_exhausted() {
            winners = self.nagashi_seats();
            nagashi = !winners.is_empty();
            for &s in &winners {
                self.hands[s].set_nagashi();
            }
        }

        if winners.is_empty() {
            let tenpai: Vec<bool> = (0..NP).map(|s| self.is_tenpai(s)).collect();
            let count = tenpai.iter().filter(|&&t| t).count();
            let (gain, loss) = ryuukyoku_points(count);
            for (p, &t) in players.iter_mut().zip(&tenpai) {
                p.tenpai = t;
                p.net_gain = if t { gain } else { loss };
            }
            result.ryuukyoku = true;
            result.dealer_rotates = !tenpai[self.east_index];
            result.players = players;
            info!(
                "ryuukyoku, {count} tenpai, honba {}, sticks {}",
                self.honba, self.pending_riichi
            );
            return result;
        }

        let ron = if nagashi { None } else { self.ron_source };
        let order_start = ron.map_or(self.east_index, |(from, _)| from);
        winners.sort_by_key(|&s| (s + NP - order_start) % NP);
        let winner_count = winners.len();

        let mut gains = [0i32; NP];
        let mut pay = |from: usize, to: usize, amount: i32| {
            gains[from] -= amount;
            gains[to] += amount;
        };

        for &w in &winners {
            if let Some((_, tile)) = ron {
                self.hands[w].set_from_ron(tile);
            }
            let hand = &self.hands[w];
            let seat_wind = self.seat_wind(w);
            let concealed = hand.is_concealed();

            let (fan, fu, dora) = if nagashi {
                (5, 30, DoraCount::default())
            } else {
                let ura: &[Tile] = if self.riichis[w].is_some() {
                    result.show_ura_dora = true;
                    self.wall.visible_ura_indicators()
                } else {
                    &[]
                };
                let dora = DoraCount::of(&hand.all_tiles(), self.wall.visible_dora_indicators(), ura);
                let fan = fan_count(hand.yakus(), concealed, dora, &self.rule);
                let fu = fu_count(hand, ron.is_none(), self.dominant_wind, seat_wind);
                (fan, fu, dora)
            };

            let liable = if nagashi { None } else { liable_seat(hand) };
            let hand_points = match (liable, ron) {
                // A liable self-draw is paid in full by the feeder, as a ron.
                (Some(l), None) => {
                    let (value, _) = points(fan, fu, false, seat_wind);
                    pay(l, w, value + honba_points(self.honba, 1, false));
                    value
                }
                (Some(l), Some((from, _))) if l != from => {
                    let (value, _) = points(fan, fu, false, seat_wind);
                    let half = value / 2;
                    pay(l, w, half);
                    pay(from, w, value - half + honba_points(self.honba, winner_count, false));
                    value
                }
                (_, Some((from, _))) => {
                    let (value, _) = points(fan, fu, false, seat_wind);
                    pay(from, w, value + honba_points(self.honba, winner_count, false));
                    value
                }
                (None, None) => {
                    let (dealer_share, other_share) = points(fan, fu, true, seat_wind);
                    let mut total = 0;
                    for o in (0..NP).filter(|&o| o != w) {
                        let share = if seat_wind == Wind::East || o == self.east_index {
                            dealer_share
                        } else {
                            other_share
                        };
                        pay(o, w, share + honba_points(self.honba, 1, true));
                        total += share;
                    }
                    total
                }
            };

            let p = &mut players[w];
            p.fan = fan;
            p.fu = fu;
            p.yakus = hand.yakus().to_vec();
            p.dora = dora.dora;
            p.ura_dora = dora.ura_dora;
            p.red_dora = dora.red_dora;
            p.hand_points = hand_points;
        }

        // Sticks go to the first winner after the loser, or from the dealer.
        gains[winners[0]] += self.pending_riichi as i32 * RIICHI_COST;
        for (p, gain) in players.iter_mut().zip(gains) {
            p.net_gain = gain;
        }

        result.dealer_rotates = !winners.contains(&self.east_index);
        result.players = players;
        info!(
            "round won by {:?} ({}), honba {}, sticks {}",
            winners,
            if ron.is_some() { "ron" } else { "tsumo" },
            self.honba,
            self.pending_riichi
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::super::{RoundSetup, TurnPhase};
    use super::*;
    use crate::parser::{parse_hand, parse_tile, parse_tiles};
    use crate::seeding::arrange_wall;
    use crate::yaku::{DrawType, WinContext};

    fn round(hands: [&str; 4], draws: &str, dora: &str, setup: RoundSetup) -> Round {
        let wall = arrange_wall(hands, draws, dora, false).unwrap();
        Round::new(wall, setup).unwrap()
    }

    fn find(round: &Round, seat: usize, text: &str) -> Tile {
        let kind = parse_tile(text, false).unwrap().kind();
        *round
            .hand(seat)
            .concealed_tiles()
            .iter()
            .find(|t| t.kind() == kind)
            .unwrap()
    }

    const TANYAO: [&str; 4] = [
        "45m234p456p678s88s",
        "3m111z222z333z444z",
        "555z666z777z999m1p",
        "111m222m999p999s1s",
    ];

    #[test]
    fn dealer_ron_pinfu_tanyao() {
        let setup = RoundSetup {
            honba: 1,
            pending_riichi: 2,
            ..RoundSetup::default()
        };
        let mut r = round(TANYAO, "1z7m", "9m", setup);
        let drawn = r.pick().unwrap();
        r.discard(drawn);
        r.pick().unwrap();
        let three = find(&r, 1, "3m");
        r.discard(three);
        assert!(r.call_ron(0));

        let end = r.end_of_round();
        assert!(!end.ryuukyoku);
        assert!(!end.dealer_rotates);
        let winner = &end.players[0];
        assert_eq!(winner.fan, 2);
        assert_eq!(winner.fu, 30);
        assert_eq!(winner.hand_points, 2900);
        assert_eq!(winner.net_gain, 2900 + 300 + 2000);
        assert_eq!(end.players[1].net_gain, -3200);
        assert_eq!(end.net_total(), 2000);
        assert_eq!(end.winners(), vec![0]);
        assert!(!end.show_ura_dora);
    }

    #[test]
    fn non_dealer_tsumo_splits_payment() {
        // Seat 1 waits on 3m-6m and draws 6m on its first, uninterrupted turn.
        let mut r = round(
            [
                "3m111z222z333z444z",
                "45m234p456p678s88s",
                "555z666z777z999m1p",
                "111m222m999p999s1s",
            ],
            "1z6m",
            "9m",
            RoundSetup::default(),
        );
        let drawn = r.pick().unwrap();
        r.discard(drawn);
        r.pick().unwrap();
        assert!(r.can_call_tsumo());
        assert!(r.call_tsumo());

        let end = r.end_of_round();
        assert!(end.dealer_rotates);
        assert_eq!(end.players[1].yakus, vec![Yaku::Chiihou]);
        assert_eq!(end.players[1].fan, 13);
        let gains: Vec<i32> = end.players.iter().map(|p| p.net_gain).collect();
        assert_eq!(gains.iter().sum::<i32>(), 0);
        assert!(gains[1] > 0);
        assert_eq!(gains[0], -16_000);
        assert_eq!(gains[2], -8_000);
        assert_eq!(gains[3], -8_000);
        assert_eq!(end.players[1].hand_points, gains[1]);
    }

    #[test]
    fn exhaustive_draw_pays_tenpai() {
        let mut r = round(
            [
                "45m234p456p678s88s",
                "1m111z222z333z444z",
                "555z666z777z999m1p",
                "11m22m999p8p13579s",
            ],
            "",
            "9m",
            RoundSetup::default(),
        );
        while !r.is_exhaustive_draw() {
            let t = r.pick().unwrap();
            assert!(r.discard(t));
        }
        assert_eq!(r.phase(), TurnPhase::AwaitingDraw);
        let end = r.end_of_round();
        assert!(end.ryuukyoku);
        // Every seat discarded what it drew: three single waits and a noten hand.
        assert!(end.players[..3].iter().all(|p| p.tenpai && p.net_gain == 1000));
        assert!(!end.players[3].tenpai);
        assert_eq!(end.players[3].net_gain, -3000);
        assert_eq!(end.net_total(), 0);
        assert!(!end.dealer_rotates);
    }

    fn dragons_hand(text: &str) -> Hand {
        let (concealed, declared) = parse_hand(text, false).unwrap();
        let mut hand = Hand::from_parts(concealed, declared).unwrap();
        let win = parse_tiles("9p9p", false).unwrap()[1];
        hand.pick(win);
        let ctx = WinContext::new(win, DrawType::Wall, Wind::East, Wind::South);
        assert!(hand.set_yakus(&ctx));
        assert!(hand.yakus().contains(&Yaku::Daisangen));
        hand
    }

    #[test]
    fn third_dragon_feeder_is_liable() {
        let hand = dragons_hand("123m9p(p5z1)(p6z3)(p7z1)");
        assert_eq!(liable_seat(&hand), Some(1));

        let hand = dragons_hand("123m9p(p5z1)(p6z3)(k7z)");
        assert_eq!(liable_seat(&hand), None);
    }
}
