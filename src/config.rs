use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Steam Web API key
    pub steam_api_key: String,

    /// Steam Web API base URL
    #[serde(default = "default_steam_api_url")]
    pub steam_api_url: String,

    /// Path to the persisted roster of known Steam IDs
    #[serde(default = "default_roster_path")]
    pub roster_path: String,

    /// How long a peer-group snapshot stays fresh, in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Number of recommendations returned when the request doesn't say
    #[serde(default = "default_top_n")]
    pub default_top_n: usize,

    /// Pause between per-member Steam calls during a group refresh, in
    /// milliseconds. Steam rate-limits aggressively; this dominates
    /// wall-clock time on a cold cache.
    #[serde(default = "default_fetch_delay_ms")]
    pub fetch_delay_ms: u64,

    /// Per-call HTTP timeout for Steam requests, in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_steam_api_url() -> String {
    "https://api.steampowered.com".to_string()
}

fn default_roster_path() -> String {
    "steam_ids.txt".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    60 * 60 * 24 * 7 // 1 week
}

fn default_top_n() -> usize {
    5
}

fn default_fetch_delay_ms() -> u64 {
    5000
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}
