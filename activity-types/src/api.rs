//! Request and response shapes for the backend HTTP contract. Envelope
//! fields the client logic touches are fully typed; open-ended sub-shapes
//! (stock rows, shop items, account sub-objects, history rows) are carried
//! as raw JSON for the renderer to pick apart.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::duel::{DuelSession, LobbyListing};

// ---------------------------------------------------------------------------
// Read endpoints
// ---------------------------------------------------------------------------

/// GET /api/stocks
#[derive(Debug, Clone, Deserialize)]
pub struct StocksResponse {
    #[serde(default)]
    pub stocks: Vec<Value>,
    #[serde(default)]
    pub server_time_utc: Option<String>,
}

/// GET /api/dashboard-stats
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub until_close: String,
    #[serde(default)]
    pub seconds_until_close: i64,
    #[serde(default)]
    pub until_reset: String,
    #[serde(default)]
    pub seconds_until_reset: i64,
    #[serde(default)]
    pub company_count: i64,
    #[serde(default)]
    pub user_count: i64,
}

/// GET /api/shop
#[derive(Debug, Clone, Deserialize)]
pub struct ShopResponse {
    #[serde(default)]
    pub items: Vec<Value>,
    /// Server-side rotation identifier for the current item set.
    #[serde(default)]
    pub bucket: Option<Value>,
}

/// GET /api/activity/status
#[derive(Debug, Clone, Deserialize)]
pub struct AccountStatus {
    #[serde(default)]
    pub user: Value,
    #[serde(default)]
    pub stocks: Vec<Value>,
    #[serde(default)]
    pub commodities: Vec<Value>,
    #[serde(default)]
    pub perks: Vec<Value>,
    #[serde(default)]
    pub trade_limit: Option<Value>,
}

/// GET /api/activity/dual/status
#[derive(Debug, Clone, Deserialize)]
pub struct DuelStatusResponse {
    #[serde(default)]
    pub current_game: Option<DuelSession>,
    #[serde(default)]
    pub open_lobbies: Vec<LobbyListing>,
}

/// GET /api/activity/history
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub rows: Vec<Value>,
    #[serde(default)]
    pub total: i64,
}

/// GET /api/activity/oauth/token
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
}

// ---------------------------------------------------------------------------
// Write endpoints
// ---------------------------------------------------------------------------

/// POST /api/activity/trade/buy and /sell
#[derive(Debug, Clone, Serialize)]
pub struct TradeRequest {
    pub user_id: String,
    pub symbol: String,
    pub shares: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TradeAck {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub owned_shares: Option<f64>,
    #[serde(default)]
    pub unit_price: Option<f64>,
    #[serde(default)]
    pub total_cost: Option<f64>,
    #[serde(default)]
    pub net_gain: Option<f64>,
}

/// POST /api/activity/shop/buy
#[derive(Debug, Clone, Serialize)]
pub struct ShopBuyRequest {
    pub user_id: String,
    pub name: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShopBuyAck {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub unit_price: Option<f64>,
    #[serde(default)]
    pub activated_perks: Vec<String>,
}

/// POST /api/activity/shop/sell
#[derive(Debug, Clone, Serialize)]
pub struct ShopSellRequest {
    pub user_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShopSellAck {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub total_gain: Option<f64>,
}

/// POST /api/activity/dual/create
#[derive(Debug, Clone, Serialize)]
pub struct DuelCreateRequest {
    pub user_id: String,
    pub display_name: String,
    pub bet: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DuelCreateAck {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub game: Option<CreatedGame>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedGame {
    pub code: String,
}

/// POST /api/activity/dual/join
#[derive(Debug, Clone, Serialize)]
pub struct DuelJoinRequest {
    pub user_id: String,
    pub display_name: String,
    pub code: String,
}

/// POST /api/activity/dual/ready
#[derive(Debug, Clone, Serialize)]
pub struct DuelReadyRequest {
    pub user_id: String,
    pub code: String,
    pub bet: f64,
}

/// POST /api/activity/dual/guess
#[derive(Debug, Clone, Serialize)]
pub struct DuelGuessRequest {
    pub user_id: String,
    pub code: String,
    pub guess: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DuelGuessAck {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    /// Advisory range-narrowing feedback, surfaced to the user verbatim.
    #[serde(default)]
    pub hint: Option<String>,
}

/// Minimal ack for write endpoints with no op-specific payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Ack {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl Ack {
    /// Application-level rejection text, present only when `ok` is false.
    pub fn rejection(&self) -> Option<&str> {
        if self.ok {
            None
        } else {
            Some(self.error.as_deref().unwrap_or("rejected"))
        }
    }
}
