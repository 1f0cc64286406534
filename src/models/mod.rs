use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::error::{AppError, AppResult};

/// A 64-bit Steam account identifier, always 17 decimal digits when rendered
///
/// Well-formedness is a precondition for everything downstream (roster
/// membership, fetches, matrix rows), so the only way to obtain a `UserId`
/// on the request path is [`UserId::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

/// Steam IDs are SteamID64 values: exactly 17 decimal digits
pub const USER_ID_LEN: usize = 17;

impl UserId {
    /// Validates and wraps a raw identifier string
    ///
    /// Rejects anything that isn't exactly 17 ASCII digits before any side
    /// effect (no roster write, no network call) can happen.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let raw = raw.trim();
        if raw.len() != USER_ID_LEN {
            return Err(AppError::InvalidIdentifier(format!(
                "Steam ID must be exactly {} digits, got {} characters",
                USER_ID_LEN,
                raw.len()
            )));
        }
        if !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AppError::InvalidIdentifier(
                "Steam ID must contain only digits".to_string(),
            ));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One observed (user, game) usage pair
///
/// Produced only by `UsageFetcher` implementations and never mutated after
/// creation. `usage_hours` is always ≥ 0; zero-hour records are dropped
/// before matrix construction since owning an unplayed game carries no
/// preference signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub item_id: u64,
    pub item_name: String,
    pub usage_hours: f64,
    pub owner: UserId,
}

/// A single ranked prediction for the target user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRow {
    pub item_name: String,
    pub predicted_score: f64,
}

// ============================================================================
// HTTP response types
// ============================================================================

/// Response body for the recommendations endpoint
#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub steam_id: UserId,
    pub generated_at: DateTime<Utc>,
    pub recommendations: Vec<RecommendedItem>,
}

#[derive(Debug, Serialize)]
pub struct RecommendedItem {
    pub name: String,
    pub score: f64,
}

impl From<PredictionRow> for RecommendedItem {
    fn from(row: PredictionRow) -> Self {
        Self {
            name: row.item_name,
            score: row.predicted_score,
        }
    }
}

// ============================================================================
// Steam Web API types
// ============================================================================

/// Raw response envelope from IPlayerService/GetOwnedGames
///
/// Accounts with no visible data come back as an empty `response` object
/// with no `games` key, which deserializes to `None` here.
#[derive(Debug, Clone, Deserialize)]
pub struct OwnedGamesResponse {
    #[serde(default)]
    pub response: OwnedGamesBody,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwnedGamesBody {
    #[serde(default)]
    pub games: Option<Vec<OwnedGame>>,
}

/// One owned game as Steam reports it
#[derive(Debug, Clone, Deserialize)]
pub struct OwnedGame {
    pub appid: u64,
    pub name: String,
    /// Total playtime in minutes
    pub playtime_forever: u64,
}

impl OwnedGame {
    /// Converts the Steam wire representation into a usage record owned by
    /// the given account, translating minutes to hours
    pub fn into_record(self, owner: &UserId) -> UsageRecord {
        UsageRecord {
            item_id: self.appid,
            item_name: self.name,
            usage_hours: self.playtime_forever as f64 / 60.0,
            owner: owner.clone(),
        }
    }
}
