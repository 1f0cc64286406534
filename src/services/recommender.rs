use std::sync::Arc;
use std::time::Instant;

use crate::{
    error::AppResult,
    models::{PredictionRow, UsageRecord, UserId},
    services::{
        group_cache::GroupCache, matrix::UsageMatrix, predictor, providers::UsageFetcher,
        roster::FileRoster, similarity::SimilarityMatrix,
    },
};

/// End-to-end recommendation pipeline
///
/// Wires the roster, the peer-group cache, and the fetcher into the
/// build → normalize → similarity → predict chain. One instance is shared
/// by all requests; per-request state lives on the stack.
pub struct RecommendationService {
    roster: Arc<FileRoster>,
    cache: Arc<GroupCache>,
    fetcher: Arc<dyn UsageFetcher>,
}

impl RecommendationService {
    pub fn new(
        roster: Arc<FileRoster>,
        cache: Arc<GroupCache>,
        fetcher: Arc<dyn UsageFetcher>,
    ) -> Self {
        Self {
            roster,
            cache,
            fetcher,
        }
    }

    /// Produces the ranked top-N unplayed games for one user
    ///
    /// The caller has already validated the id. Roster and similarity
    /// failures abort the request; a failed fetch of the target's own
    /// library is swallowed like any member fetch, which then surfaces as a
    /// degenerate neighborhood since the target has no matrix row.
    pub async fn recommend(&self, user: &UserId, top_n: usize) -> AppResult<Vec<PredictionRow>> {
        let started = Instant::now();

        // 1. Record the user so future refreshes include their library.
        self.roster.add_if_absent(user).await?;

        // 2. Peer records come from the shared snapshot, minus any stale
        //    copy of the requesting user's own library.
        let mut records = self.cache.get_peer_records(user).await?;
        let peer_records = records.len();

        // 3. The target's library is always fetched fresh so the unplayed
        //    set reflects their current state.
        match self.fetcher.fetch_user_records(user).await {
            Ok(own_records) => records.extend(own_records),
            Err(e) => {
                tracing::warn!(
                    user_id = %user,
                    error = %e,
                    "Target fetch failed, contributing zero records"
                );
            }
        }

        // 4. Owning a game without playing it is not a preference signal.
        let records: Vec<UsageRecord> = records
            .into_iter()
            .filter(|record| record.usage_hours > 0.0)
            .collect();

        // 5. Build → normalize → similarity → predict.
        let normalized = UsageMatrix::build(&records).normalize();
        let similarity = SimilarityMatrix::compute(&normalized)?;
        let predictions = predictor::predict(user, &normalized, &similarity, top_n)?;

        tracing::info!(
            user_id = %user,
            peer_records,
            played_records = records.len(),
            users = normalized.n_users(),
            items = normalized.n_items(),
            recommendations = predictions.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Recommendations generated"
        );

        Ok(predictions)
    }
}
