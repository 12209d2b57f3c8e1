//! Match book: the scoring engine bound to a [`MatchStore`].
//!
//! Every mutation applies the engine function to the caller's `Match` and
//! then saves it. A failed save is reported but the in-memory match keeps
//! the change; there is no rollback and no retry.
//!
//! Stored matches expire once they are older than the retention window.
//! Expiry is enforced on read: `load` and `list` delete expired and
//! undecodable records as they find them, and `sweep_expired` runs the same
//! pass over the whole store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use scorebook_state::{MatchBlob, MatchStore};

use crate::config::MatchBookConfig;
use crate::domain::cricket::{BowlerId, Match, MatchId, MatchSetup, PlayerId, TeamSide};
use crate::domain::error::{Result, ScoreError};
use crate::metrics::METRICS;
use crate::obs;
use crate::scoring::{self, Delivery, DeliveryOutcome};

/// Result of a retention sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Records deleted for exceeding the retention window.
    pub removed: usize,
    /// Records deleted because their payload could not be decoded.
    pub corrupt: usize,
    /// Live matches left in the store.
    pub remaining: usize,
}

enum Stored {
    Live(Box<Match>),
    Expired { age_hours: i64 },
    Corrupt(String),
}

/// Scoring engine plus persistence.
pub struct MatchBook<S> {
    store: S,
    config: MatchBookConfig,
}

impl<S> MatchBook<S>
where
    S: MatchStore,
{
    pub fn new(store: S) -> Self {
        Self::with_config(store, MatchBookConfig::default())
    }

    pub fn with_config(store: S, config: MatchBookConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &MatchBookConfig {
        &self.config
    }

    /// Create and persist a new match.
    #[instrument(skip(self, setup), fields(team_a = %setup.team_a, team_b = %setup.team_b))]
    pub async fn create(&self, setup: MatchSetup) -> Result<Match> {
        if setup.team_a.trim().is_empty() || setup.team_b.trim().is_empty() {
            return Err(ScoreError::validation("both team names are required"));
        }
        if setup.overs_per_innings == Some(0) {
            return Err(ScoreError::validation("overs per innings must be at least 1"));
        }

        let m = Match::new(setup);
        self.save(&m).await?;
        obs::emit_match_created(m.id.as_str(), &m.title());
        Ok(m)
    }

    /// Persist `m` under its id, replacing any earlier state.
    pub async fn save(&self, m: &Match) -> Result<()> {
        let payload = serde_json::to_string(m)?;
        let blob = MatchBlob::new(m.id.as_str(), payload, m.created_at);
        if let Err(e) = self.store.put(blob).await {
            METRICS.inc_save_failures();
            obs::emit_match_save_error(m.id.as_str(), &e);
            return Err(e.into());
        }
        Ok(())
    }

    /// Load a match.
    ///
    /// Expired and undecodable records are deleted before the error is
    /// returned, so a second `load` reports `MatchNotFound`.
    #[instrument(skip(self), fields(match_id = %id))]
    pub async fn load(&self, id: &MatchId) -> Result<Match> {
        let blob = self
            .store
            .get(id.as_str())
            .await?
            .ok_or_else(|| ScoreError::MatchNotFound(id.to_string()))?;

        match self.inspect(&blob, Utc::now()) {
            Stored::Live(m) => Ok(*m),
            Stored::Expired { age_hours } => {
                self.discard_expired(&blob.key, age_hours).await?;
                Err(ScoreError::MatchExpired(id.to_string()))
            }
            Stored::Corrupt(reason) => {
                self.discard_corrupt(&blob.key, &reason).await?;
                Err(ScoreError::CorruptMatch {
                    id: id.to_string(),
                    reason,
                })
            }
        }
    }

    /// All live matches, newest first. Expired and corrupt records are
    /// removed along the way.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Match>> {
        let (live, _) = self.scan().await?;
        Ok(live)
    }

    /// Remove every expired or corrupt record from the store.
    #[instrument(skip(self))]
    pub async fn sweep_expired(&self) -> Result<SweepReport> {
        let (live, mut report) = self.scan().await?;
        report.remaining = live.len();
        obs::emit_sweep_completed(report.removed, report.corrupt, report.remaining);
        Ok(report)
    }

    async fn scan(&self) -> Result<(Vec<Match>, SweepReport)> {
        let now = Utc::now();
        let mut live = Vec::new();
        let mut report = SweepReport::default();

        for blob in self.store.list().await? {
            match self.inspect(&blob, now) {
                Stored::Live(m) => live.push(*m),
                Stored::Expired { age_hours } => {
                    self.discard_expired(&blob.key, age_hours).await?;
                    report.removed += 1;
                }
                Stored::Corrupt(reason) => {
                    self.discard_corrupt(&blob.key, &reason).await?;
                    report.corrupt += 1;
                }
            }
        }

        live.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok((live, report))
    }

    fn inspect(&self, blob: &MatchBlob, now: DateTime<Utc>) -> Stored {
        let age = now - blob.created_at;
        if age > self.config.retention {
            return Stored::Expired {
                age_hours: age.num_hours(),
            };
        }
        match serde_json::from_str::<Match>(&blob.payload) {
            Ok(m) => Stored::Live(Box::new(m)),
            Err(e) => Stored::Corrupt(e.to_string()),
        }
    }

    async fn discard_expired(&self, key: &str, age_hours: i64) -> Result<()> {
        self.store.delete(key).await?;
        METRICS.inc_expired();
        obs::emit_match_expired(key, age_hours);
        Ok(())
    }

    async fn discard_corrupt(&self, key: &str, reason: &str) -> Result<()> {
        self.store.delete(key).await?;
        METRICS.inc_corrupt();
        obs::emit_match_corrupt(key, reason);
        Ok(())
    }

    /// Apply a delivery and save.
    ///
    /// When the batsman is not on the batting roster nothing changes and
    /// nothing is written.
    pub async fn apply_delivery(
        &self,
        m: &mut Match,
        side: TeamSide,
        batsman: &PlayerId,
        delivery: Delivery,
    ) -> Result<DeliveryOutcome> {
        self.apply_delivery_with_bowler(m, side, batsman, None, delivery)
            .await
    }

    /// Apply a delivery, charge it to `bowler` when given, and save.
    #[instrument(skip(self, m), fields(match_id = %m.id))]
    pub async fn apply_delivery_with_bowler(
        &self,
        m: &mut Match,
        side: TeamSide,
        batsman: &PlayerId,
        bowler: Option<&BowlerId>,
        delivery: Delivery,
    ) -> Result<DeliveryOutcome> {
        let outcome = scoring::apply_delivery_with_bowler(m, side, batsman, bowler, delivery);
        if !outcome.applied {
            return Ok(outcome);
        }

        METRICS.inc_deliveries();
        obs::emit_delivery_applied(
            m.id.as_str(),
            delivery.runs,
            delivery.is_extra,
            delivery.is_wicket,
            &m.team(side).scoreline(),
        );
        self.save(m).await?;
        Ok(outcome)
    }

    /// Toggle the innings and save.
    #[instrument(skip(self, m), fields(match_id = %m.id))]
    pub async fn switch_innings(&self, m: &mut Match) -> Result<()> {
        scoring::switch_innings(m);
        obs::emit_innings_switched(m.id.as_str(), m.current_innings.number());
        self.save(m).await
    }

    /// Add a batsman to `side` and save.
    #[instrument(skip(self, m), fields(match_id = %m.id))]
    pub async fn add_player(&self, m: &mut Match, side: TeamSide, name: &str) -> Result<PlayerId> {
        if name.trim().is_empty() {
            return Err(ScoreError::validation("player name is required"));
        }
        let id = scoring::add_player(m, side, name);
        self.save(m).await?;
        Ok(id)
    }

    /// Add a bowler to `side` and save.
    #[instrument(skip(self, m), fields(match_id = %m.id))]
    pub async fn add_bowler(&self, m: &mut Match, side: TeamSide, name: &str) -> Result<BowlerId> {
        if name.trim().is_empty() {
            return Err(ScoreError::validation("bowler name is required"));
        }
        let id = scoring::add_bowler(m, side, name);
        self.save(m).await?;
        Ok(id)
    }

    /// Delete a match. Unknown ids are ignored.
    #[instrument(skip(self), fields(match_id = %id))]
    pub async fn delete(&self, id: &MatchId) -> Result<()> {
        self.store.delete(id.as_str()).await?;
        Ok(())
    }
}
