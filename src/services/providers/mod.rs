/// Usage data provider abstraction
///
/// The recommender only ever sees (user, game, hours) triples; where they
/// come from is a pluggable concern. The production implementation talks to
/// the Steam Web API, tests substitute a canned fetcher.
use crate::{
    error::AppResult,
    models::{UsageRecord, UserId},
};

pub mod steam;

/// Trait for per-user usage data sources
///
/// A fetch returns every (game, hours) pair the provider knows for the
/// account, including zero-hour entries; filtering is the pipeline's job.
/// An account with no visible data is an `Ok` empty vec, not an error;
/// errors mean the fetch itself failed (transport, auth, provider outage).
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait UsageFetcher: Send + Sync {
    /// Fetch all usage records owned by the given user
    async fn fetch_user_records(&self, user: &UserId) -> AppResult<Vec<UsageRecord>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
