//! A full game: four players, dealer rotation, round-wind progression and
//! final ranking.

use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::{RiichiError, RiichiResult};
use crate::round::{EndOfRound, Round, RoundSetup};
use crate::rule::{GameRule, InitialPoints};
use crate::score::{RIICHI_COST, UMA};
use crate::seeding::{game_rng, generate_wall};
use crate::tile::Wind;

const NP: usize = 4;
/// Score ending a West or North extension.
const EXTENSION_TARGET: i32 = 30_000;
const CPU_PREFIX: &str = "CPU_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub is_cpu: bool,
    /// Seat wind of the first round.
    pub initial_wind: Wind,
    pub points: i32,
}

/// One line of the ranking table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerScore {
    pub seat: usize,
    pub name: String,
    /// 1 to 4.
    pub rank: usize,
    pub points: i32,
    pub uma: i32,
    /// `(points - starting points) / 1000 + uma`.
    pub score: f64,
}

fn check_human_name(name: &str) -> RiichiResult<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(RiichiError::InvalidConfig {
            message: "player name is empty".to_string(),
        });
    }
    if trimmed.to_uppercase().starts_with(CPU_PREFIX) {
        return Err(RiichiError::InvalidConfig {
            message: format!("player name '{trimmed}' is reserved for CPU players"),
        });
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct Game {
    rule: GameRule,
    players: [Player; NP],
    session_seed: [u8; 32],
    nonce: u64,
    round_index: u32,
    initial_east: usize,
    east_index: usize,
    dominant_wind: Wind,
    honba: u32,
    pending_riichi: u32,
    round: Round,
    finished: bool,
}

impl Game {
    /// A human at seat 0 against three CPU players.
    pub fn new(rule: GameRule, human_name: &str, session_seed: [u8; 32], nonce: u64) -> RiichiResult<Game> {
        Self::with_players(rule, &[(human_name, false)], session_seed, nonce)
    }

    /// One to four `(name, is_cpu)` entries from seat 0; missing seats are
    /// CPU players named `CPU_<seat>`.
    pub fn with_players(
        rule: GameRule,
        roster: &[(&str, bool)],
        session_seed: [u8; 32],
        nonce: u64,
    ) -> RiichiResult<Game> {
        if roster.is_empty() || roster.len() > NP {
            return Err(RiichiError::InvalidConfig {
                message: format!("a game seats 1 to {NP} players, got {}", roster.len()),
            });
        }
        for (name, is_cpu) in roster {
            if !is_cpu {
                check_human_name(name)?;
            }
        }

        let mut rng = game_rng(&session_seed, nonce);
        let east_index = rng.random_range(0..NP);
        let players = std::array::from_fn(|seat| {
            let (name, is_cpu) = match roster.get(seat) {
                Some((name, is_cpu)) => (name.trim().to_string(), *is_cpu),
                None => (format!("{CPU_PREFIX}{seat}"), true),
            };
            Player {
                name,
                is_cpu,
                initial_wind: Wind::from(((seat + NP - east_index) % NP) as u8),
                points: rule.starting_points(),
            }
        });

        let round = Self::build_round(&rule, &players, &session_seed, nonce, 0, east_index, Wind::East, 0, 0)?;
        info!("new game, east seat {east_index}, nonce {nonce}");
        Ok(Game {
            rule,
            players,
            session_seed,
            nonce,
            round_index: 0,
            initial_east: east_index,
            east_index,
            dominant_wind: Wind::East,
            honba: 0,
            pending_riichi: 0,
            round,
            finished: false,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn build_round(
        rule: &GameRule,
        players: &[Player; NP],
        session_seed: &[u8; 32],
        nonce: u64,
        round_index: u32,
        east_index: usize,
        dominant_wind: Wind,
        honba: u32,
        pending_riichi: u32,
    ) -> RiichiResult<Round> {
        let wall = generate_wall(session_seed, nonce, round_index, rule.with_red_doras);
        Round::new(
            wall,
            RoundSetup {
                east_index,
                dominant_wind,
                honba,
                pending_riichi,
                points: std::array::from_fn(|s| players[s].points),
                rule: *rule,
            },
        )
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[inline]
    pub fn rule(&self) -> &GameRule {
        &self.rule
    }

    #[inline]
    pub fn players(&self) -> &[Player; NP] {
        &self.players
    }

    #[inline]
    pub fn round(&self) -> &Round {
        &self.round
    }

    #[inline]
    pub fn round_mut(&mut self) -> &mut Round {
        &mut self.round
    }

    /// Seat of the current dealer.
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

    /// Rounds played so far.
    #[inline]
    pub fn round_index(&self) -> u32 {
        self.round_index
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn current_wind_of(&self, seat: usize) -> Wind {
        self.round.seat_wind(seat)
    }

    /// Renames the human at seat 0 and switches rule options. Takes effect
    /// from the next round.
    pub fn update_configuration(
        &mut self,
        name: &str,
        with_red_doras: bool,
        use_nagashi_mangan: bool,
        use_renhou: bool,
    ) -> RiichiResult<()> {
        check_human_name(name)?;
        self.players[0].name = name.trim().to_string();
        self.rule.with_red_doras = with_red_doras;
        self.rule.use_nagashi_mangan = use_nagashi_mangan;
        self.rule.use_renhou = use_renhou;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Progression
    // -----------------------------------------------------------------------

    /// Settles the current round and deals the next one, unless the game
    /// is over. `ron_seat`, when given, must be the seat that dealt in.
    pub fn next_round(&mut self, ron_seat: Option<usize>) -> RiichiResult<EndOfRound> {
        if self.finished {
            return Err(RiichiError::InvalidState {
                message: "the game is over".to_string(),
            });
        }
        if let Some(seat) = ron_seat {
            if self.round.ron_source_seat() != Some(seat) {
                return Err(RiichiError::InvalidState {
                    message: format!("seat {seat} did not deal into a ron"),
                });
            }
        }

        let mut end = self.round.end_of_round();
        let round_points = self.round.points();
        for (s, player) in self.players.iter_mut().enumerate() {
            player.points = round_points[s] + end.players[s].net_gain;
        }
        self.pending_riichi = if end.ryuukyoku {
            self.round.pending_riichi()
        } else {
            0
        };

        let mut finished = self.rule.end_of_game.tobi_applies() && self.players.iter().any(|p| p.points < 0);
        if !finished
            && !end.ryuukyoku
            && matches!(self.dominant_wind, Wind::West | Wind::North)
            && self.players.iter().any(|p| p.points >= EXTENSION_TARGET)
        {
            finished = true;
        }

        if !finished {
            if end.dealer_rotates {
                self.honba = 0;
                self.east_index = (self.east_index + 1) % NP;
                if self.east_index == self.initial_east {
                    match self.next_dominant_wind() {
                        Some(wind) => self.dominant_wind = wind,
                        None => finished = true,
                    }
                }
            } else {
                self.honba += 1;
            }
        }

        if finished {
            self.finish();
            end.end_of_game = true;
        } else {
            self.round_index += 1;
            self.round = Self::build_round(
                &self.rule,
                &self.players,
                &self.session_seed,
                self.nonce,
                self.round_index,
                self.east_index,
                self.dominant_wind,
                self.honba,
                self.pending_riichi,
            )?;
        }
        Ok(end)
    }

    /// Round wind after a full dealer cycle; `None` ends the game.
    fn next_dominant_wind(&self) -> Option<Wind> {
        match self.dominant_wind {
            Wind::East => Some(Wind::South),
            Wind::South => {
                let extend = self.rule.end_of_game.enchousen_applies()
                    && self.rule.initial_points == InitialPoints::K25
                    && self.players.iter().all(|p| p.points < EXTENSION_TARGET);
                extend.then_some(Wind::West)
            }
            Wind::West => Some(Wind::North),
            Wind::North => None,
        }
    }

    /// Pending riichi sticks go to the leader(s); an uneven split leaves
    /// the remainder to the first of them in seat order.
    fn finish(&mut self) {
        self.finished = true;
        let sticks = self.pending_riichi as i32 * RIICHI_COST;
        self.pending_riichi = 0;
        if sticks > 0 {
            let top = self.players.iter().map(|p| p.points).max().unwrap_or(0);
            let leaders: Vec<usize> = (0..NP).filter(|&s| self.players[s].points == top).collect();
            let share = sticks / leaders.len() as i32;
            for &s in &leaders {
                self.players[s].points += share;
            }
            self.players[leaders[0]].points += sticks - share * leaders.len() as i32;
        }
        info!(
            "game over after {} rounds: {:?}",
            self.round_index + 1,
            self.players.iter().map(|p| p.points).collect::<Vec<_>>()
        );
    }

    /// Players ordered by points, ties broken by starting wind.
    pub fn ranking(&self) -> Vec<PlayerScore> {
        let mut order: Vec<usize> = (0..NP).collect();
        order.sort_by(|&a, &b| {
            self.players[b]
                .points
                .cmp(&self.players[a].points)
                .then(self.players[a].initial_wind.cmp(&self.players[b].initial_wind))
        });
        let start = self.rule.starting_points();
        order
            .into_iter()
            .enumerate()
            .map(|(i, seat)| {
                let p = &self.players[seat];
                PlayerScore {
                    seat,
                    name: p.name.clone(),
                    rank: i + 1,
                    points: p.points,
                    uma: UMA[i],
                    score: f64::from(p.points - start) / 1000.0 + f64::from(UMA[i]),
                }
            })
            .collect()
    }
}
