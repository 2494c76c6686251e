//! Typed wrappers over every backend endpoint, so polling rounds and user
//! actions share one request surface.

use std::sync::Arc;

use activity_types::{
    AccountStatus, Ack, DashboardStats, DuelCreateAck, DuelCreateRequest, DuelGuessAck,
    DuelGuessRequest, DuelJoinRequest, DuelReadyRequest, DuelStatusResponse, HistoryResponse,
    ShopBuyAck, ShopBuyRequest, ShopResponse, ShopSellAck, ShopSellRequest, StocksResponse,
    TokenResponse, TradeAck, TradeRequest,
};
use url::form_urlencoded;

use crate::fetch::{Outcome, ResilientFetcher};

#[derive(Clone)]
pub struct Api {
    fetcher: Arc<ResilientFetcher>,
}

impl Api {
    pub fn new(fetcher: Arc<ResilientFetcher>) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &ResilientFetcher {
        &self.fetcher
    }

    // -- reads --------------------------------------------------------------

    pub async fn stocks(&self, user_id: Option<&str>) -> Outcome<StocksResponse> {
        let path = match user_id {
            Some(id) => format!("/api/stocks?{}", query(&[("user_id", id)])),
            None => "/api/stocks".to_string(),
        };
        self.fetcher.get_json(&path).await
    }

    pub async fn dashboard_stats(&self) -> Outcome<DashboardStats> {
        self.fetcher.get_json("/api/dashboard-stats").await
    }

    pub async fn shop(&self) -> Outcome<ShopResponse> {
        self.fetcher.get_json("/api/shop").await
    }

    pub async fn account_status(&self, user_id: &str) -> Outcome<AccountStatus> {
        let path = format!("/api/activity/status?{}", query(&[("user_id", user_id)]));
        self.fetcher.get_json(&path).await
    }

    pub async fn duel_status(&self, user_id: &str) -> Outcome<DuelStatusResponse> {
        let path = format!(
            "/api/activity/dual/status?{}",
            query(&[("user_id", user_id)])
        );
        self.fetcher.get_json(&path).await
    }

    pub async fn history(
        &self,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> Outcome<HistoryResponse> {
        let path = format!(
            "/api/activity/history?{}",
            query(&[
                ("user_id", user_id),
                ("limit", &limit.to_string()),
                ("offset", &offset.to_string()),
            ])
        );
        self.fetcher.get_json(&path).await
    }

    pub async fn oauth_token(
        &self,
        code: &str,
        redirect_uri: Option<&str>,
    ) -> Outcome<TokenResponse> {
        let path = match redirect_uri {
            Some(uri) => format!(
                "/api/activity/oauth/token?{}",
                query(&[("code", code), ("redirect_uri", uri)])
            ),
            None => format!("/api/activity/oauth/token?{}", query(&[("code", code)])),
        };
        self.fetcher.get_json(&path).await
    }

    /// Path for the binary image passthrough. Callers hand this to an <img>
    /// element; it is not fetched through the JSON pipeline.
    pub fn image_proxy_path(url: &str) -> String {
        format!("/api/activity/image-proxy?{}", query(&[("url", url)]))
    }

    // -- writes -------------------------------------------------------------

    pub async fn trade_buy(&self, request: &TradeRequest) -> Outcome<TradeAck> {
        self.fetcher.post_json("/api/activity/trade/buy", request).await
    }

    pub async fn trade_sell(&self, request: &TradeRequest) -> Outcome<TradeAck> {
        self.fetcher.post_json("/api/activity/trade/sell", request).await
    }

    pub async fn shop_buy(&self, request: &ShopBuyRequest) -> Outcome<ShopBuyAck> {
        self.fetcher.post_json("/api/activity/shop/buy", request).await
    }

    pub async fn shop_sell(&self, request: &ShopSellRequest) -> Outcome<ShopSellAck> {
        self.fetcher.post_json("/api/activity/shop/sell", request).await
    }

    pub async fn duel_create(&self, request: &DuelCreateRequest) -> Outcome<DuelCreateAck> {
        self.fetcher.post_json("/api/activity/dual/create", request).await
    }

    pub async fn duel_join(&self, request: &DuelJoinRequest) -> Outcome<Ack> {
        self.fetcher.post_json("/api/activity/dual/join", request).await
    }

    pub async fn duel_ready(&self, request: &DuelReadyRequest) -> Outcome<Ack> {
        self.fetcher.post_json("/api/activity/dual/ready", request).await
    }

    pub async fn duel_guess(&self, request: &DuelGuessRequest) -> Outcome<DuelGuessAck> {
        self.fetcher.post_json("/api/activity/dual/guess", request).await
    }
}

fn query(pairs: &[(&str, &str)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}
