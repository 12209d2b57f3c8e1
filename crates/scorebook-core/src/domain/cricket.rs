//! Cricket match state: matches, teams, batsmen and bowlers.
//!
//! Field names serialize in camelCase (`runsConceded`, `isOut`,
//! `currentInnings`, ...) so stored matches keep the shape the web client
//! wrote to local storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Generate a fresh random identifier.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of a match; also its key in the match store.
    MatchId
);
string_id!(TeamId);
string_id!(PlayerId);
string_id!(BowlerId);

/// Selects one of the two teams of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamSide {
    A,
    B,
}

impl TeamSide {
    /// The other team.
    pub fn opponent(self) -> Self {
        match self {
            TeamSide::A => TeamSide::B,
            TeamSide::B => TeamSide::A,
        }
    }
}

impl std::str::FromStr for TeamSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a" => Ok(TeamSide::A),
            "b" => Ok(TeamSide::B),
            other => Err(format!("unknown team '{other}' (expected a or b)")),
        }
    }
}

/// Which innings is in progress. Serialized as the integer 1 or 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Innings {
    First,
    Second,
}

impl Innings {
    pub fn toggled(self) -> Self {
        match self {
            Innings::First => Innings::Second,
            Innings::Second => Innings::First,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Innings::First => 1,
            Innings::Second => 2,
        }
    }
}

impl TryFrom<u8> for Innings {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Innings::First),
            2 => Ok(Innings::Second),
            other => Err(format!("innings must be 1 or 2, got {other}")),
        }
    }
}

impl From<Innings> for u8 {
    fn from(innings: Innings) -> Self {
        innings.number()
    }
}

/// Match format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchType {
    T20,
    #[serde(rename = "ODI")]
    Odi,
    Test,
    Custom,
}

impl MatchType {
    /// Overs per innings implied by the format, when it has a fixed limit.
    pub fn default_overs(self) -> Option<u32> {
        match self {
            MatchType::T20 => Some(20),
            MatchType::Odi => Some(50),
            MatchType::Test | MatchType::Custom => None,
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MatchType::T20 => "T20",
            MatchType::Odi => "ODI",
            MatchType::Test => "Test",
            MatchType::Custom => "Custom",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for MatchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "t20" => Ok(MatchType::T20),
            "odi" => Ok(MatchType::Odi),
            "test" => Ok(MatchType::Test),
            "custom" => Ok(MatchType::Custom),
            other => Err(format!(
                "unknown match type '{other}' (expected T20, ODI, Test or Custom)"
            )),
        }
    }
}

/// Overs bowled for a number of legal balls.
///
/// The fractional digit counts balls within the current over, so 14 balls is
/// `2.2`, not `2.333`.
pub fn overs_from_balls(balls: u32) -> f64 {
    f64::from(balls / 6) + f64::from(balls % 6) / 10.0
}

/// Inverse of [`overs_from_balls`].
///
/// Only values produced by [`overs_from_balls`] round-trip. The fractional
/// digit is read as a ball count without range checking, so `0.7` decodes
/// to 7 balls. Negative and NaN inputs give 0 and huge ones saturate.
pub fn balls_from_overs(overs: f64) -> u32 {
    let whole = overs.trunc();
    let partial = ((overs - whole) * 10.0).round();
    (whole as u32).saturating_mul(6).saturating_add(partial as u32)
}

/// A batsman's innings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub runs: u32,
    pub balls: u32,
    pub fours: u32,
    pub sixes: u32,
    pub is_out: bool,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PlayerId::generate(),
            name: name.into(),
            runs: 0,
            balls: 0,
            fours: 0,
            sixes: 0,
            is_out: false,
        }
    }

    /// Runs per 100 balls; `None` before the first ball faced.
    pub fn strike_rate(&self) -> Option<f64> {
        (self.balls > 0).then(|| f64::from(self.runs) * 100.0 / f64::from(self.balls))
    }
}

/// A bowler's figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bowler {
    pub id: BowlerId,
    pub name: String,
    pub overs: f64,
    pub runs_conceded: u32,
    pub wickets: u32,
}

impl Bowler {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: BowlerId::generate(),
            name: name.into(),
            overs: 0.0,
            runs_conceded: 0,
            wickets: 0,
        }
    }

    /// Runs conceded per six legal balls; `None` before the first ball.
    pub fn economy(&self) -> Option<f64> {
        let balls = balls_from_overs(self.overs);
        (balls > 0).then(|| f64::from(self.runs_conceded) * 6.0 / f64::from(balls))
    }
}

/// One side: batting order, bowlers and the innings total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub players: Vec<Player>,
    pub bowlers: Vec<Bowler>,
    pub score: u32,
    pub wickets: u32,
    pub overs: f64,
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TeamId::generate(),
            name: name.into(),
            players: Vec::new(),
            bowlers: Vec::new(),
            score: 0,
            wickets: 0,
            overs: 0.0,
        }
    }

    /// Legal balls faced across the whole batting order.
    pub fn total_balls(&self) -> u32 {
        self.players.iter().map(|p| p.balls).sum()
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == *id)
    }

    pub fn player_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == *id)
    }

    pub fn bowler_mut(&mut self, id: &BowlerId) -> Option<&mut Bowler> {
        self.bowlers.iter_mut().find(|b| b.id == *id)
    }

    /// `"<score>/<wickets> (<overs> ov)"`, e.g. `"143/6 (17.4 ov)"`.
    pub fn scoreline(&self) -> String {
        format!("{}/{} ({:.1} ov)", self.score, self.wickets, self.overs)
    }
}

/// Inputs for creating a match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchSetup {
    pub team_a: String,
    pub team_b: String,
    pub date: Option<String>,
    pub venue: Option<String>,
    pub match_type: Option<MatchType>,
    pub overs_per_innings: Option<u32>,
}

/// Root aggregate of a cricket match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: MatchId,
    pub team_a: Team,
    pub team_b: Team,
    pub current_innings: Innings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_type: Option<MatchType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overs_per_innings: Option<u32>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Match {
    /// Fresh match: empty rosters, zeroed scores, first innings.
    ///
    /// Team names are taken as given; validation happens in the match book.
    pub fn new(setup: MatchSetup) -> Self {
        let overs_per_innings = setup
            .overs_per_innings
            .or_else(|| setup.match_type.and_then(MatchType::default_overs));
        Self {
            id: MatchId::generate(),
            team_a: Team::new(setup.team_a.trim()),
            team_b: Team::new(setup.team_b.trim()),
            current_innings: Innings::First,
            date: setup.date,
            venue: setup.venue,
            match_type: setup.match_type,
            overs_per_innings,
            created_at: Utc::now(),
        }
    }

    pub fn team(&self, side: TeamSide) -> &Team {
        match side {
            TeamSide::A => &self.team_a,
            TeamSide::B => &self.team_b,
        }
    }

    pub fn team_mut(&mut self, side: TeamSide) -> &mut Team {
        match side {
            TeamSide::A => &mut self.team_a,
            TeamSide::B => &mut self.team_b,
        }
    }

    /// Team A bats the first innings, team B the second.
    pub fn batting_side(&self) -> TeamSide {
        match self.current_innings {
            Innings::First => TeamSide::A,
            Innings::Second => TeamSide::B,
        }
    }

    /// `"<team A> vs <team B>"`
    pub fn title(&self) -> String {
        format!("{} vs {}", self.team_a.name, self.team_b.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overs_encoding_boundaries() {
        assert_eq!(overs_from_balls(0), 0.0);
        assert_eq!(overs_from_balls(5), 0.5);
        assert_eq!(overs_from_balls(6), 1.0);
        assert_eq!(overs_from_balls(14), 2.2);
        assert_eq!(overs_from_balls(120), 20.0);
    }

    #[test]
    fn balls_from_overs_tolerates_malformed_input() {
        assert_eq!(balls_from_overs(0.7), 7);
        assert_eq!(balls_from_overs(-3.2), 0);
        assert_eq!(balls_from_overs(f64::NAN), 0);
        assert_eq!(balls_from_overs(1e12), u32::MAX);
    }

    #[test]
    fn balls_from_overs_inverts_encoding() {
        for n in 0..=300 {
            assert_eq!(balls_from_overs(overs_from_balls(n)), n, "n = {n}");
        }
    }

    #[test]
    fn match_serializes_camel_case_with_millis() {
        let m = Match::new(MatchSetup {
            team_a: "Lions".to_string(),
            team_b: "Tigers".to_string(),
            match_type: Some(MatchType::Odi),
            ..Default::default()
        });
        let json = serde_json::to_value(&m).unwrap();

        assert_eq!(json["currentInnings"], 1);
        assert_eq!(json["matchType"], "ODI");
        assert_eq!(json["oversPerInnings"], 50);
        assert_eq!(json["teamA"]["name"], "Lions");
        assert!(json["teamA"]["players"].as_array().unwrap().is_empty());
        assert!(json["createdAt"].is_i64());
        assert!(json.get("venue").is_none());
    }

    #[test]
    fn innings_rejects_out_of_range_numbers() {
        let bad = r#"{"id":"m","teamA":{"id":"a","name":"A","players":[],"bowlers":[],"score":0,"wickets":0,"overs":0},"teamB":{"id":"b","name":"B","players":[],"bowlers":[],"score":0,"wickets":0,"overs":0},"currentInnings":3,"createdAt":0}"#;
        assert!(serde_json::from_str::<Match>(bad).is_err());

        let good = bad.replace("\"currentInnings\":3", "\"currentInnings\":2");
        let m: Match = serde_json::from_str(&good).unwrap();
        assert_eq!(m.current_innings, Innings::Second);
        assert_eq!(m.batting_side(), TeamSide::B);
    }

    #[test]
    fn explicit_overs_override_format_default() {
        let m = Match::new(MatchSetup {
            team_a: "A".to_string(),
            team_b: "B".to_string(),
            match_type: Some(MatchType::T20),
            overs_per_innings: Some(10),
            ..Default::default()
        });
        assert_eq!(m.overs_per_innings, Some(10));

        let test = Match::new(MatchSetup {
            team_a: "A".to_string(),
            team_b: "B".to_string(),
            match_type: Some(MatchType::Test),
            ..Default::default()
        });
        assert_eq!(test.overs_per_innings, None);
    }

    #[test]
    fn scoreline_and_rates() {
        let mut team = Team::new("Lions");
        team.score = 143;
        team.wickets = 6;
        team.overs = 17.4;
        assert_eq!(team.scoreline(), "143/6 (17.4 ov)");

        let mut p = Player::new("Opener");
        assert_eq!(p.strike_rate(), None);
        p.runs = 30;
        p.balls = 20;
        assert_eq!(p.strike_rate(), Some(150.0));

        let mut b = Bowler::new("Quick");
        assert_eq!(b.economy(), None);
        b.overs = 2.0;
        b.runs_conceded = 15;
        assert_eq!(b.economy(), Some(7.5));
    }
}
