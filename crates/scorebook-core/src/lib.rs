//! Scorebook Core Library
//!
//! Cricket scoring engine, the match book that persists it, and the
//! scorecard service. Storage lives in `scorebook-state`; this crate only
//! depends on its traits.

pub mod config;
pub mod domain;
pub mod match_book;
pub mod metrics;
pub mod obs;
pub mod scorecards;
pub mod scoring;
pub mod telemetry;

pub use config::MatchBookConfig;
pub use domain::{
    balls_from_overs, overs_from_balls, Bowler, BowlerId, Innings, Match, MatchId, MatchSetup,
    MatchType, Player, PlayerId, Result, ScoreError, Team, TeamId, TeamSide,
};
pub use match_book::{MatchBook, SweepReport};
pub use scorecards::{
    parse_field_value, resolve_field, template_fields, FieldSpec, NewScorecard, Scorecard,
    ScorecardPatch, ScorecardService,
};
pub use scoring::{
    add_bowler, add_player, apply_delivery, apply_delivery_with_bowler, apply_to_team,
    current_batsman, innings_complete, is_all_out, overs_exhausted, switch_innings, Delivery,
    DeliveryOutcome,
};

pub use scorebook_state::{ScorecardId, ScorecardKind, UserId};

pub use metrics::METRICS;
pub use obs::MatchSpan;
pub use telemetry::init_tracing;

/// Scorebook version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
