//! Domain models for Scorebook.
//!
//! - `Match`: a cricket match and both teams' innings
//! - `Team`, `Player`, `Bowler`: rosters and figures
//! - `ScoreError`: error taxonomy shared by the engine and services

pub mod cricket;
pub mod error;

pub use cricket::{
    balls_from_overs, overs_from_balls, Bowler, BowlerId, Innings, Match, MatchId, MatchSetup,
    MatchType, Player, PlayerId, Team, TeamId, TeamSide,
};
pub use error::{Result, ScoreError};
