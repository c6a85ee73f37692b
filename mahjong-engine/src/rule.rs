use serde::{Deserialize, Serialize};

/// Starting points of every player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InitialPoints {
    #[default]
    K25,
    K30,
}

impl InitialPoints {
    pub const fn points(self) -> i32 {
        match self {
            InitialPoints::K25 => 25_000,
            InitialPoints::K30 => 30_000,
        }
    }
}

/// How a game ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EndOfGameRule {
    /// South round only.
    #[default]
    Oorasu,
    /// A negative score ends the game.
    Tobi,
    /// West and North extension when nobody reached 30 000.
    Enchousen,
    EnchousenAndTobi,
}

impl EndOfGameRule {
    pub const fn tobi_applies(self) -> bool {
        matches!(self, EndOfGameRule::Tobi | EndOfGameRule::EnchousenAndTobi)
    }

    pub const fn enchousen_applies(self) -> bool {
        matches!(
            self,
            EndOfGameRule::Enchousen | EndOfGameRule::EnchousenAndTobi
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameRule {
    pub initial_points: InitialPoints,
    pub end_of_game: EndOfGameRule,
    pub with_red_doras: bool,
    pub use_nagashi_mangan: bool,
    pub use_renhou: bool,

    /// Several simultaneous yakuman stack (13 fan each) instead of counting once.
    pub multiple_yakumans: bool,
    /// 13 fan or more from ordinary yaku and dora is scored as a yakuman.
    /// When off, it is capped at 12 fan (sanbaiman).
    pub kazoe_yakuman: bool,
}

impl Default for GameRule {
    fn default() -> Self {
        Self::default_line()
    }
}

impl GameRule {
    /// Casual table: 25 000 start, south round only, no optional yaku.
    pub fn default_line() -> Self {
        Self {
            initial_points: InitialPoints::K25,
            end_of_game: EndOfGameRule::Oorasu,
            with_red_doras: false,
            use_nagashi_mangan: false,
            use_renhou: false,
            multiple_yakumans: false,
            kazoe_yakuman: false,
        }
    }

    pub fn default_tournament() -> Self {
        Self {
            initial_points: InitialPoints::K30,
            end_of_game: EndOfGameRule::Tobi,
            with_red_doras: true,
            use_nagashi_mangan: false,
            use_renhou: false,
            multiple_yakumans: false,
            kazoe_yakuman: false,
        }
    }

    pub fn starting_points(&self) -> i32 {
        self.initial_points.points()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        let line = GameRule::default();
        assert_eq!(line.starting_points(), 25_000);
        assert!(!line.end_of_game.tobi_applies());
        assert!(!line.with_red_doras);

        let tournament = GameRule::default_tournament();
        assert_eq!(tournament.starting_points(), 30_000);
        assert!(tournament.end_of_game.tobi_applies());
        assert!(!tournament.end_of_game.enchousen_applies());
        assert!(tournament.with_red_doras);
    }

    #[test]
    fn end_rule_flags() {
        assert!(EndOfGameRule::EnchousenAndTobi.tobi_applies());
        assert!(EndOfGameRule::EnchousenAndTobi.enchousen_applies());
        assert!(EndOfGameRule::Enchousen.enchousen_applies());
        assert!(!EndOfGameRule::Oorasu.enchousen_applies());
    }

    #[test]
    fn serde_roundtrip() {
        let rule = GameRule::default_tournament();
        let json = serde_json::to_string(&rule).unwrap();
        let back: GameRule = serde_json::from_str(&json).unwrap();
        assert_eq!(rule, back);
    }
}
