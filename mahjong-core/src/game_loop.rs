//! Game loop runner: plays a [`Game`] to completion, asking an
//! [`ActionSelector`] for every decision.
//!
//! Each step resolves the claims on the last discard (or on a pending kan)
//! by precedence, then lets the current player act. Rounds are settled
//! through [`Game::next_round`].

use anyhow::{bail, Context, Result};
use log::{debug, warn};
use mahjong_engine::seeding::SessionRng;
use mahjong_engine::{EndOfRound, Game, GameRule, PlayerScore, Round, TurnPhase};

use crate::action::{legal_actions, Action, RON_PRIORITY};
use crate::cpu::Cpu;
use crate::safety::SafetyInfo;

const NP: usize = 4;

/// Actions after which a runner gives up on a game.
pub const MAX_STEPS: u32 = 50_000;

const CPU_ROSTER: [(&str, bool); NP] = [
    ("CPU_0", true),
    ("CPU_1", true),
    ("CPU_2", true),
    ("CPU_3", true),
];

/// Trait for action selection policies.
pub trait ActionSelector {
    /// Select an action for `seat` from `legal`, which is never empty.
    fn select_action(&mut self, round: &Round, seat: usize, legal: &[Action]) -> Action;
}

/// Simple policy that always picks the first legal action.
pub struct FirstActionSelector;

impl ActionSelector for FirstActionSelector {
    fn select_action(&mut self, _round: &Round, _seat: usize, legal: &[Action]) -> Action {
        legal[0]
    }
}

/// The CPU decision engine, playing every seat.
pub struct CpuSelector;

impl ActionSelector for CpuSelector {
    fn select_action(&mut self, round: &Round, seat: usize, legal: &[Action]) -> Action {
        let cpu = Cpu::new(round);
        let own_turn = seat == round.current_player() && round.phase() != TurnPhase::AwaitingDraw;
        let wanted = if own_turn {
            own_turn_decision(&cpu)
        } else {
            claim_decision(&cpu, round, seat)
        };
        wanted
            .filter(|a| legal.contains(a))
            .or_else(|| {
                legal
                    .iter()
                    .copied()
                    .find(|a| matches!(a, Action::Draw | Action::Pass))
            })
            .unwrap_or(legal[0])
    }
}

fn own_turn_decision(cpu: &Cpu<'_>) -> Option<Action> {
    if cpu.tsumo_decision() {
        return Some(Action::Tsumo);
    }
    if let Some((_, t)) = cpu.kan_decision(true) {
        return Some(Action::Kan(t));
    }
    if let Some(t) = cpu.riichi_decision() {
        return Some(Action::Riichi(t));
    }
    cpu.discard_decision().map(Action::Discard)
}

fn claim_decision(cpu: &Cpu<'_>, round: &Round, seat: usize) -> Option<Action> {
    if cpu.ron_decision().contains(&seat) {
        return Some(Action::Ron);
    }
    if round.phase() != TurnPhase::AwaitingDraw {
        return None;
    }
    if let Some((s, t)) = cpu.kan_decision(false) {
        if s == seat {
            return Some(Action::Kan(t));
        }
    }
    if cpu.pon_decision() == Some(seat) {
        return Some(Action::Pon);
    }
    if seat == round.current_player() {
        return cpu.chii_decision().map(Action::Chii);
    }
    None
}

/// Runs a complete game.
pub struct GameRunner {
    game: Game,
    total_actions: u32,
    rounds_played: u32,
    settlements: Vec<EndOfRound>,
}

impl GameRunner {
    /// A game between four CPU players.
    pub fn new(rule: GameRule, session_seed: [u8; 32], nonce: u64) -> Result<Self> {
        let game = Game::with_players(rule, &CPU_ROSTER, session_seed, nonce)
            .context("creating the game")?;
        Ok(Self::from_game(game))
    }

    /// Next game of a session: the seed comes from the session KDF and the
    /// nonce is the game's index in the session.
    pub fn new_with_session(session: &mut SessionRng, rule: GameRule) -> Result<Self> {
        let nonce = session.game_index();
        let seed = session.next_game_seed();
        Self::new(rule, seed, nonce)
    }

    pub fn from_game(game: Game) -> Self {
        Self {
            game,
            total_actions: 0,
            rounds_played: 0,
            settlements: Vec::new(),
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn is_done(&self) -> bool {
        self.game.is_finished()
    }

    pub fn total_actions(&self) -> u32 {
        self.total_actions
    }

    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    /// Settlement of every round played, in order.
    pub fn settlements(&self) -> &[EndOfRound] {
        &self.settlements
    }

    /// Points of each seat as of the last settlement.
    pub fn scores(&self) -> [i32; NP] {
        std::array::from_fn(|i| self.game.players()[i].points)
    }

    pub fn ranking(&self) -> Vec<PlayerScore> {
        self.game.ranking()
    }

    /// Safety information from a seat's point of view in the current round.
    pub fn safety(&self, seat: usize) -> SafetyInfo {
        SafetyInfo::from_round(self.game.round(), seat)
    }
}

impl GameRunner {
    /// Advance the game by one step. Returns false once the game is over
    /// or the step cap is reached.
    pub fn step_once(&mut self, selector: &mut dyn ActionSelector) -> Result<bool> {
        if self.game.is_finished() || self.total_actions >= MAX_STEPS {
            return Ok(false);
        }
        let round = self.game.round();
        if round.has_winner() {
            return self.settle();
        }
        let current = round.current_player();
        let phase = round.phase();

        let mut claims: Vec<(usize, Action)> = Vec::new();
        for seat in 0..NP {
            if seat == current && phase != TurnPhase::AwaitingDraw {
                continue;
            }
            let legal = legal_actions(round, seat);
            if !legal.iter().any(|a| a.is_claim()) {
                continue;
            }
            let chosen = choose(selector, round, seat, &legal);
            if chosen.is_claim() {
                claims.push((seat, chosen));
            }
        }

        if let Some(best) = claims.iter().map(|(_, a)| a.claim_priority()).max() {
            // Every ron is played; a lesser claim goes to a single seat.
            for (seat, action) in claims.into_iter().filter(|(_, a)| a.claim_priority() == best) {
                self.play(seat, action)?;
                if best < RON_PRIORITY {
                    break;
                }
            }
            return Ok(true);
        }

        let action = if phase == TurnPhase::AwaitingDraw {
            if self.game.round().is_wall_exhausted() {
                return self.settle();
            }
            Action::Draw
        } else {
            let round = self.game.round();
            let legal = legal_actions(round, current);
            if legal.is_empty() {
                bail!("seat {current} has no legal action in {phase:?}");
            }
            choose(selector, round, current, &legal)
        };
        self.play(current, action)?;
        Ok(true)
    }

    /// Run the full game to completion.
    pub fn run_to_completion(&mut self, selector: &mut dyn ActionSelector) -> Result<()> {
        while self.step_once(selector)? {}
        Ok(())
    }

    fn play(&mut self, seat: usize, action: Action) -> Result<()> {
        debug!("seat {seat}: {action}");
        action.apply(self.game.round_mut(), seat)?;
        self.total_actions += 1;
        Ok(())
    }

    fn settle(&mut self) -> Result<bool> {
        let ron_seat = self.game.round().ron_source_seat();
        let end = self
            .game
            .next_round(ron_seat)
            .with_context(|| format!("settling round {}", self.rounds_played + 1))?;
        self.rounds_played += 1;
        let over = end.end_of_game;
        self.settlements.push(end);
        Ok(!over)
    }
}

/// Asks the policy, replacing an illegal choice by the first legal action.
fn choose(selector: &mut dyn ActionSelector, round: &Round, seat: usize, legal: &[Action]) -> Action {
    let chosen = selector.select_action(round, seat, legal);
    match legal.iter().find(|&&a| a == chosen) {
        Some(&a) => a,
        None => {
            warn!("seat {seat} chose illegal action {chosen}, playing {} instead", legal[0]);
            legal[0]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: [u8; 32] = [42; 32];

    fn played(selector: &mut dyn ActionSelector, seed: [u8; 32]) -> GameRunner {
        let mut runner = GameRunner::new(GameRule::default(), seed, 0).unwrap();
        runner.run_to_completion(selector).unwrap();
        runner
    }

    /// Always asks for a tsumo, legal or not.
    struct StubbornSelector;

    impl ActionSelector for StubbornSelector {
        fn select_action(&mut self, _round: &Round, _seat: usize, _legal: &[Action]) -> Action {
            Action::Tsumo
        }
    }

    #[test]
    fn game_completes_with_first_action() {
        let runner = played(&mut FirstActionSelector, SEED);
        assert!(runner.is_done());
        assert!(
            runner.total_actions() > 20,
            "expected realistic action count, got {}",
            runner.total_actions()
        );
    }

    #[test]
    fn cpu_game_plays_both_winds() {
        let runner = played(&mut CpuSelector, SEED);
        assert!(runner.is_done());
        // East and South: at least eight dealers.
        assert!(runner.rounds_played() >= 8);
        assert_eq!(runner.settlements().len() as u32, runner.rounds_played());
        assert!(runner.settlements().last().unwrap().end_of_game);
    }

    #[test]
    fn points_are_conserved() {
        let runner = played(&mut CpuSelector, [7; 32]);
        let sum: i32 = runner.scores().iter().sum();
        assert_eq!(sum, 4 * 25_000);
        assert_eq!(runner.game().pending_riichi(), 0);
        let ranks: Vec<usize> = runner.ranking().iter().map(|p| p.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn safety_available_during_game() {
        let mut runner = GameRunner::new(GameRule::default(), SEED, 0).unwrap();
        let mut selector = CpuSelector;
        for _ in 0..20 {
            if !runner.step_once(&mut selector).unwrap() {
                break;
            }
        }
        let has_safety_data = (0..NP).any(|seat| {
            let s = runner.safety(seat);
            s.genbutsu.iter().flatten().any(|&g| g)
        });
        assert!(has_safety_data, "discards should show up as genbutsu");
    }

    #[test]
    fn illegal_choices_fall_back() {
        let runner = played(&mut StubbornSelector, SEED);
        assert!(runner.is_done());
    }

    #[test]
    fn session_seeded_games_are_deterministic() {
        let mut session_a = SessionRng::new([42u8; 32]);
        let mut session_b = SessionRng::new([42u8; 32]);

        let mut runner_a = GameRunner::new_with_session(&mut session_a, GameRule::default()).unwrap();
        let mut runner_b = GameRunner::new_with_session(&mut session_b, GameRule::default()).unwrap();

        runner_a.run_to_completion(&mut CpuSelector).unwrap();
        runner_b.run_to_completion(&mut CpuSelector).unwrap();

        assert_eq!(runner_a.scores(), runner_b.scores());
        assert_eq!(runner_a.total_actions(), runner_b.total_actions());
        assert_eq!(runner_a.settlements(), runner_b.settlements());
    }
}
