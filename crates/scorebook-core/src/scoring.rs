//! Ball-by-ball scoring engine.
//!
//! Pure functions over [`Match`] and [`Team`]. Nothing here touches a store;
//! [`crate::match_book::MatchBook`] applies these and persists the result.
//!
//! The engine is deliberately passive. It does not rotate strike, complete
//! overs, cap wickets or end innings; callers evaluate [`innings_complete`]
//! when they need to know.

use serde::{Deserialize, Serialize};

use crate::domain::cricket::{
    balls_from_overs, overs_from_balls, Bowler, BowlerId, Match, Player, PlayerId, Team, TeamSide,
};

/// A single scoring event.
///
/// `is_extra` covers wides, no-balls, byes and leg-byes alike: the runs go to
/// the team total, the batsman is not credited and no legal ball is counted.
/// Splitting it into a `{Wide, NoBall, Bye, LegBye, Legal}` variant would let
/// each kind follow its own rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub runs: u32,
    pub is_extra: bool,
    pub is_wicket: bool,
}

impl Delivery {
    /// A legal ball off the bat.
    pub fn runs(runs: u32) -> Self {
        Self {
            runs,
            ..Self::default()
        }
    }

    /// Extras worth `runs`.
    pub fn extra(runs: u32) -> Self {
        Self {
            runs,
            is_extra: true,
            is_wicket: false,
        }
    }

    /// A legal ball on which the batsman is dismissed.
    pub fn wicket() -> Self {
        Self {
            is_wicket: true,
            ..Self::default()
        }
    }

    pub fn with_wicket(mut self) -> Self {
        self.is_wicket = true;
        self
    }
}

/// What happened when a delivery was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOutcome {
    /// False when the batsman was not on the batting roster; nothing changed.
    pub applied: bool,
    /// Batsman on strike afterwards. After a wicket this is the replacement,
    /// or `None` when nobody is left.
    pub next_batsman: Option<PlayerId>,
}

impl DeliveryOutcome {
    fn skipped() -> Self {
        Self {
            applied: false,
            next_batsman: None,
        }
    }
}

/// Apply one delivery to `team` with `batsman` on strike.
///
/// An id that is not on the roster leaves the team untouched.
pub fn apply_to_team(team: &mut Team, batsman: &PlayerId, delivery: Delivery) -> DeliveryOutcome {
    let Some(player) = team.player_mut(batsman) else {
        tracing::debug!(batsman = %batsman, "batsman not on roster; delivery ignored");
        return DeliveryOutcome::skipped();
    };

    if !delivery.is_extra {
        player.balls += 1;
        player.runs += delivery.runs;
        match delivery.runs {
            4 => player.fours += 1,
            6 => player.sixes += 1,
            _ => {}
        }
    }

    let next_batsman = if delivery.is_wicket {
        player.is_out = true;
        team.players
            .iter()
            .find(|p| !p.is_out && p.id != *batsman)
            .map(|p| p.id.clone())
    } else {
        Some(batsman.clone())
    };

    team.overs = overs_from_balls(team.total_balls());
    team.score += delivery.runs;
    if delivery.is_wicket {
        team.wickets += 1;
    }

    DeliveryOutcome {
        applied: true,
        next_batsman,
    }
}

/// Apply one delivery to the batting team selected by `side`.
///
/// Bowling figures are left alone; see [`apply_delivery_with_bowler`].
pub fn apply_delivery(
    m: &mut Match,
    side: TeamSide,
    batsman: &PlayerId,
    delivery: Delivery,
) -> DeliveryOutcome {
    apply_to_team(m.team_mut(side), batsman, delivery)
}

/// Like [`apply_delivery`], and also charges the delivery to a bowler of the
/// fielding side.
///
/// The bowler is credited with the runs and any wicket, and one legal ball
/// when the delivery is not an extra. An unknown bowler id is ignored. Plain
/// [`apply_delivery`] never updates bowling figures; this is an extension
/// over that behavior and must be opted into.
pub fn apply_delivery_with_bowler(
    m: &mut Match,
    side: TeamSide,
    batsman: &PlayerId,
    bowler: Option<&BowlerId>,
    delivery: Delivery,
) -> DeliveryOutcome {
    let outcome = apply_delivery(m, side, batsman, delivery);
    if !outcome.applied {
        return outcome;
    }

    if let Some(bowler_id) = bowler {
        match m.team_mut(side.opponent()).bowler_mut(bowler_id) {
            Some(b) => charge_bowler(b, delivery),
            None => tracing::debug!(bowler = %bowler_id, "bowler not on fielding side; figures unchanged"),
        }
    }
    outcome
}

fn charge_bowler(bowler: &mut Bowler, delivery: Delivery) {
    bowler.runs_conceded += delivery.runs;
    if delivery.is_wicket {
        bowler.wickets += 1;
    }
    if !delivery.is_extra {
        bowler.overs = overs_from_balls(balls_from_overs(bowler.overs) + 1);
    }
}

/// Toggle the current innings between 1 and 2. Neither team's record is reset.
pub fn switch_innings(m: &mut Match) {
    m.current_innings = m.current_innings.toggled();
}

/// Append a batsman to a team's roster and return the new id.
pub fn add_player(m: &mut Match, side: TeamSide, name: &str) -> PlayerId {
    let player = Player::new(name.trim());
    let id = player.id.clone();
    m.team_mut(side).players.push(player);
    id
}

/// Append a bowler to a team and return the new id.
pub fn add_bowler(m: &mut Match, side: TeamSide, name: &str) -> BowlerId {
    let bowler = Bowler::new(name.trim());
    let id = bowler.id.clone();
    m.team_mut(side).bowlers.push(bowler);
    id
}

/// First batsman in roster order who is not out.
pub fn current_batsman(team: &Team) -> Option<&Player> {
    team.players.iter().find(|p| !p.is_out)
}

/// All out: ten wickets, or every batsman but one dismissed.
///
/// A lone batsman has no partner, so one wicket ends a single-player
/// innings. An empty roster is never all out on roster size alone.
pub fn is_all_out(team: &Team) -> bool {
    let roster = team.players.len() as u32;
    team.wickets >= 10 || (roster > 0 && team.wickets >= roster.saturating_sub(1).max(1))
}

/// Whether the team has faced its full allocation of overs.
///
/// Always false for formats without a limit.
pub fn overs_exhausted(team: &Team, overs_per_innings: Option<u32>) -> bool {
    match overs_per_innings {
        Some(limit) => u64::from(team.total_balls()) >= u64::from(limit) * 6,
        None => false,
    }
}

/// Whether `side`'s innings is over by either rule.
pub fn innings_complete(m: &Match, side: TeamSide) -> bool {
    let team = m.team(side);
    is_all_out(team) || overs_exhausted(team, m.overs_per_innings)
}
