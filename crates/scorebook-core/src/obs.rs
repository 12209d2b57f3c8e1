//! Structured observability hooks for match and scorecard lifecycle events.
//!
//! This module provides:
//! - Match-scoped tracing spans via the `MatchSpan` RAII guard
//! - Emission functions for lifecycle events (created, delivery, innings, expiry, sharing)
//!
//! Events are emitted at `info!` level, failures at `warn!`. Filtering and
//! JSON output are configured through [`crate::init_tracing`].

use tracing::{info, warn};

/// RAII guard that enters a match-scoped tracing span.
///
/// # Example
///
/// ```ignore
/// let _span = MatchSpan::enter("4f0c...");
/// // every event logged here carries match_id = "4f0c..."
/// ```
pub struct MatchSpan {
    _span: tracing::span::EnteredSpan,
}

impl MatchSpan {
    /// Create and enter a span tagged with the match id.
    pub fn enter(match_id: &str) -> Self {
        let span = tracing::info_span!("scorebook.match", match_id = %match_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: match created.
pub fn emit_match_created(match_id: &str, title: &str) {
    info!(event = "match.created", match_id = %match_id, title = %title);
}

/// Emit event: delivery applied, with the batting team's total afterwards.
pub fn emit_delivery_applied(
    match_id: &str,
    runs: u32,
    is_extra: bool,
    is_wicket: bool,
    scoreline: &str,
) {
    info!(
        event = "match.delivery_applied",
        match_id = %match_id,
        runs = runs,
        is_extra = is_extra,
        is_wicket = is_wicket,
        scoreline = %scoreline,
    );
}

/// Emit event: innings switched.
pub fn emit_innings_switched(match_id: &str, innings: u8) {
    info!(event = "match.innings_switched", match_id = %match_id, innings = innings);
}

/// Emit event: match removed for exceeding the retention window.
pub fn emit_match_expired(match_id: &str, age_hours: i64) {
    info!(event = "match.expired", match_id = %match_id, age_hours = age_hours);
}

/// Emit event: stored match could not be decoded and was discarded.
pub fn emit_match_corrupt(match_id: &str, reason: &str) {
    warn!(event = "match.corrupt", match_id = %match_id, reason = %reason);
}

/// Emit event: saving a match failed (warning level).
pub fn emit_match_save_error(match_id: &str, error: &dyn std::fmt::Display) {
    warn!(event = "match.save_error", match_id = %match_id, error = %error);
}

/// Emit event: retention sweep finished.
pub fn emit_sweep_completed(removed: usize, corrupt: usize, remaining: usize) {
    info!(
        event = "match.sweep_completed",
        removed = removed,
        corrupt = corrupt,
        remaining = remaining,
    );
}

/// Emit event: scorecard created.
pub fn emit_scorecard_created(scorecard_id: &str, owner: &str) {
    info!(event = "scorecard.created", scorecard_id = %scorecard_id, owner = %owner);
}

/// Emit event: scorecard made public under a share token.
pub fn emit_scorecard_shared(scorecard_id: &str) {
    info!(event = "scorecard.shared", scorecard_id = %scorecard_id);
}

/// Emit event: scorecard deleted.
pub fn emit_scorecard_deleted(scorecard_id: &str) {
    info!(event = "scorecard.deleted", scorecard_id = %scorecard_id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_span_create() {
        let _span = MatchSpan::enter("test-match-id");
    }
}
