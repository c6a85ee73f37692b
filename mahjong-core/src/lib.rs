//! CPU players and a game driver for the riichi mahjong engine.
//!
//! Provides the heuristic CPU decision engine, discard safety tracking, a
//! typed action vocabulary and a game loop that plays complete games under
//! any [`game_loop::ActionSelector`] policy.

pub mod action;
pub mod cpu;
pub mod game_loop;
pub mod safety;

pub use action::{legal_actions, Action};
pub use cpu::Cpu;
pub use game_loop::{ActionSelector, CpuSelector, FirstActionSelector, GameRunner};
pub use safety::{Safety, SafetyInfo};
