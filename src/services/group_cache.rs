use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};

use crate::{
    error::AppResult,
    models::{UsageRecord, UserId},
    services::{providers::UsageFetcher, roster::FileRoster},
};

/// One fully built peer-group snapshot
struct Snapshot {
    records: Vec<UsageRecord>,
    built_at: Instant,
    refreshed_at: DateTime<Utc>,
}

/// Process-wide cache of every roster member's usage records
///
/// Collecting the peer group is the expensive part of a recommendation: one
/// provider call per roster member, with a mandatory pause between calls for
/// the provider's rate limits. This cache amortizes that cost across
/// requests by holding a single snapshot for a configurable TTL.
///
/// Concurrency discipline:
/// - Readers see either the old snapshot or the new one, never a partially
///   rebuilt one: the swap happens in one write-lock critical section.
/// - When the snapshot expires, exactly one caller rebuilds it; concurrent
///   callers wait on the refresh lock and are served the fresh snapshot the
///   winner produced.
pub struct GroupCache {
    fetcher: Arc<dyn UsageFetcher>,
    roster: Arc<FileRoster>,
    ttl: Duration,
    fetch_delay: Duration,
    snapshot: RwLock<Option<Snapshot>>,
    refresh_lock: Mutex<()>,
}

impl GroupCache {
    pub fn new(
        fetcher: Arc<dyn UsageFetcher>,
        roster: Arc<FileRoster>,
        ttl: Duration,
        fetch_delay: Duration,
    ) -> Self {
        Self {
            fetcher,
            roster,
            ttl,
            fetch_delay,
            snapshot: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Returns the cached peer-group records, refreshing first if the
    /// snapshot is missing or older than the TTL
    ///
    /// Records owned by `exclude` are dropped from the returned view: the
    /// caller substitutes a fresh fetch for the requesting user, so the
    /// cached (possibly week-old) copy of their library must not leak in.
    pub async fn get_peer_records(&self, exclude: &UserId) -> AppResult<Vec<UsageRecord>> {
        // Fast path: snapshot is still fresh.
        if let Some(records) = self.read_fresh(exclude).await {
            return Ok(records);
        }

        // Single-flight: first caller through rebuilds, the rest wait here.
        let _refresh = self.refresh_lock.lock().await;

        // A concurrent caller may have finished the rebuild while this one
        // was waiting on the lock.
        if let Some(records) = self.read_fresh(exclude).await {
            return Ok(records);
        }

        let snapshot = self.rebuild().await?;
        let records = filter_excluded(&snapshot.records, exclude);
        *self.snapshot.write().await = Some(snapshot);

        Ok(records)
    }

    /// Serves the exclusion-filtered view if the current snapshot is fresh
    async fn read_fresh(&self, exclude: &UserId) -> Option<Vec<UsageRecord>> {
        let guard = self.snapshot.read().await;
        let snapshot = guard.as_ref()?;
        if snapshot.built_at.elapsed() >= self.ttl {
            return None;
        }
        Some(filter_excluded(&snapshot.records, exclude))
    }

    /// Fetches every roster member's records into a new snapshot
    ///
    /// A member whose fetch fails contributes zero records; the refresh
    /// carries on for everyone else. Only a roster read failure aborts.
    async fn rebuild(&self) -> AppResult<Snapshot> {
        let members = self.roster.load().await?;
        let started = Instant::now();

        tracing::info!(
            members = members.len(),
            provider = self.fetcher.name(),
            "Rebuilding peer group snapshot"
        );

        let mut records = Vec::new();
        let mut failed = 0usize;

        for (i, member) in members.iter().enumerate() {
            // Pause between provider calls, not before the first one.
            if i > 0 {
                tokio::time::sleep(self.fetch_delay).await;
            }

            match self.fetcher.fetch_user_records(member).await {
                Ok(member_records) => records.extend(member_records),
                Err(e) => {
                    failed += 1;
                    tracing::warn!(
                        user_id = %member,
                        error = %e,
                        "Member fetch failed during refresh, contributing zero records"
                    );
                }
            }
        }

        let snapshot = Snapshot {
            records,
            built_at: Instant::now(),
            refreshed_at: Utc::now(),
        };

        tracing::info!(
            members = members.len(),
            failed,
            records = snapshot.records.len(),
            refreshed_at = %snapshot.refreshed_at,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Peer group snapshot rebuilt"
        );

        Ok(snapshot)
    }
}

fn filter_excluded(records: &[UsageRecord], exclude: &UserId) -> Vec<UsageRecord> {
    records
        .iter()
        .filter(|record| &record.owner != exclude)
        .cloned()
        .collect()
}
