use std::env;
use std::time::Duration;

/// Runtime configuration. Environment variables are read once here; every
/// other component receives explicit values.
#[derive(Debug, Clone)]
pub struct Config {
    /// Extra API origin to try after the inferred sibling origin.
    pub fallback_origin: Option<String>,
    /// Registered application id for the activity SDK handshake.
    pub discord_client_id: Option<String>,
    /// OAuth redirect URI. Unused inside the webview host, where the
    /// platform does not require one.
    pub redirect_uri: Option<String>,
    pub poll_interval_ms: u64,
    /// Bet used when the autonomous matchmaker opens a new room.
    pub default_bet: f64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            fallback_origin: non_empty(env::var("ACTIVITY_API_ORIGIN").ok()),
            discord_client_id: non_empty(env::var("DISCORD_CLIENT_ID").ok()),
            redirect_uri: non_empty(env::var("ACTIVITY_OAUTH_REDIRECT_URI").ok()),
            poll_interval_ms: env::var("ACTIVITY_POLL_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
            default_bet: env::var("ACTIVITY_DEFAULT_BET")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(50.0),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fallback_origin: None,
            discord_client_id: None,
            redirect_uri: None,
            poll_interval_ms: 5000,
            default_bet: 50.0,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
