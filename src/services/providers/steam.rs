/// Steam Web API provider
///
/// Fetches a user's owned games and lifetime playtimes via
/// `IPlayerService/GetOwnedGames`. Playtimes arrive in minutes and are
/// converted to hours before leaving this module.
///
/// Accounts with private game details return an empty `response` object;
/// that is reported as an empty record set, not an error.
use std::time::Duration;

use reqwest::Client as HttpClient;

use crate::{
    error::{AppError, AppResult},
    models::{OwnedGamesResponse, UsageRecord, UserId},
    services::providers::UsageFetcher,
};

#[derive(Clone)]
pub struct SteamProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl SteamProvider {
    /// Creates a new Steam provider with a per-call request timeout
    pub fn new(api_key: String, api_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url,
        })
    }
}

#[async_trait::async_trait]
impl UsageFetcher for SteamProvider {
    async fn fetch_user_records(&self, user: &UserId) -> AppResult<Vec<UsageRecord>> {
        let url = format!("{}/IPlayerService/GetOwnedGames/v1/", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("steamid", user.as_str()),
                ("include_appinfo", "true"),
                ("include_played_free_games", "true"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Steam API returned status {}: {}",
                status, body
            )));
        }

        let owned: OwnedGamesResponse = response.json().await?;

        let records: Vec<UsageRecord> = owned
            .response
            .games
            .unwrap_or_default()
            .into_iter()
            .map(|game| game.into_record(user))
            .collect();

        tracing::debug!(
            user_id = %user,
            records = records.len(),
            provider = "steam",
            "Owned games fetched"
        );

        Ok(records)
    }

    fn name(&self) -> &'static str {
        "steam"
    }
}
