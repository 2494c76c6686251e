//! Composition root: config + host context -> origins -> fetcher -> typed
//! API -> polling + duel client, all sharing one view state, status slot,
//! and busy-flag set.

use std::sync::Arc;

use activity_core::origin::{HostContext, resolve_origins};
use activity_types::Identity;
use futures_util::join;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::api::Api;
use crate::config::Config;
use crate::duel::DuelClient;
use crate::fetch::ResilientFetcher;
use crate::polling::{PollHandle, PollingController, RoundGuard};
use crate::state::{BusyFlags, Loadable, StatusSlot, ViewState};

pub struct DashboardClient {
    api: Api,
    config: Config,
    identity: RwLock<Identity>,
    duel: RwLock<Arc<DuelClient>>,
    view: Arc<RwLock<ViewState>>,
    status: StatusSlot,
    busy: BusyFlags,
    poll: Mutex<Option<PollHandle>>,
}

impl DashboardClient {
    /// Identity is resolved once at startup (see `IdentityResolver`) and
    /// handed in here; a fresh resolution requires a full reload.
    pub fn new(config: Config, host: &HostContext, identity: Identity) -> Arc<Self> {
        let origins = resolve_origins(host, config.fallback_origin.as_deref());
        debug!(?origins, "resolved origin candidates");
        let fetcher = Arc::new(ResilientFetcher::new(host, origins));
        let api = Api::new(fetcher);
        let status = StatusSlot::new();
        let busy = BusyFlags::new();
        let duel = Arc::new(DuelClient::new(
            api.clone(),
            identity.clone(),
            status.clone(),
            busy.clone(),
            config.default_bet,
        ));
        Arc::new(Self {
            api,
            config,
            identity: RwLock::new(identity),
            duel: RwLock::new(duel),
            view: Arc::new(RwLock::new(ViewState::default())),
            status,
            busy,
            poll: Mutex::new(None),
        })
    }

    pub fn api(&self) -> &Api {
        &self.api
    }

    pub fn view(&self) -> Arc<RwLock<ViewState>> {
        self.view.clone()
    }

    pub fn status(&self) -> &StatusSlot {
        &self.status
    }

    pub fn busy(&self) -> &BusyFlags {
        &self.busy
    }

    pub async fn identity(&self) -> Identity {
        self.identity.read().await.clone()
    }

    pub async fn duel(&self) -> Arc<DuelClient> {
        self.duel.read().await.clone()
    }

    // -- polling ------------------------------------------------------------

    /// Start (or restart) the refresh loop at the configured cadence.
    pub async fn start_polling(self: &Arc<Self>) {
        let mut poll = self.poll.lock().await;
        if let Some(previous) = poll.take() {
            previous.cancel();
        }
        let client = self.clone();
        *poll = Some(PollingController::start(
            self.config.poll_interval(),
            move |guard| {
                let client = client.clone();
                async move { client.run_round(guard).await }
            },
        ));
        info!(interval_ms = self.config.poll_interval_ms, "polling started");
    }

    pub async fn stop_polling(&self) {
        if let Some(handle) = self.poll.lock().await.take() {
            handle.cancel();
        }
    }

    /// Replace the polling identity. Per-identity state is rebuilt from
    /// scratch and the loop restarts rather than reusing stale data.
    pub async fn set_identity(self: &Arc<Self>, identity: Identity) {
        // The old loop's guard must be poisoned before any state it could
        // still commit into is replaced.
        self.stop_polling().await;
        {
            let mut current = self.identity.write().await;
            *current = identity.clone();
            let mut duel = self.duel.write().await;
            *duel = Arc::new(DuelClient::new(
                self.api.clone(),
                identity,
                self.status.clone(),
                self.busy.clone(),
                self.config.default_bet,
            ));
            *self.view.write().await = ViewState::default();
        }
        self.start_polling().await;
    }

    /// One poll round, outside the loop. Used by the probe binary and tests.
    pub async fn run_once(self: &Arc<Self>) {
        self.clone().run_round(RoundGuard::standalone()).await;
    }

    /// A round issues its sub-fetches concurrently and commits each result
    /// independently: one failing collaborator marks only its own slot.
    async fn run_round(self: Arc<Self>, guard: RoundGuard) {
        let identity = self.identity.read().await.clone();
        let duel = self.duel.read().await.clone();
        let user_id = if identity.id.is_empty() {
            None
        } else {
            Some(identity.id.clone())
        };

        let (market, stats, shop) = join!(
            self.api.stocks(user_id.as_deref()),
            self.api.dashboard_stats(),
            self.api.shop(),
        );
        // Account and duel state only exist for resolved identities.
        let (account, duel_refresh) = match user_id.as_deref() {
            Some(id) => {
                let (account, duel_refresh) =
                    join!(self.api.account_status(id), self.api.duel_status(id));
                (Some(account), Some(duel_refresh))
            }
            None => (None, None),
        };

        {
            // Checked under the write lock: a round parked here across a
            // teardown must not resume into a rebuilt view.
            let mut view = self.view.write().await;
            if !guard.is_current() {
                debug!("round discarded after cancellation");
                return;
            }
            view.market = match market {
                Ok(data) => Loadable::ready(data),
                Err(err) => Loadable::Failed(err.to_string()),
            };
            view.stats = match stats {
                Ok(data) => Loadable::ready(data),
                Err(err) => Loadable::Failed(err.to_string()),
            };
            view.shop = match shop {
                Ok(data) => Loadable::ready(data),
                Err(err) => Loadable::Failed(err.to_string()),
            };
            if let Some(account) = account {
                view.account = match account {
                    Ok(data) => Loadable::ready(data),
                    Err(err) => Loadable::Failed(err.to_string()),
                };
            }
        }
        if let Some(refresh) = duel_refresh {
            if !guard.is_current() {
                return;
            }
            duel.apply_refresh(refresh).await;
            duel.auto_matchmake().await;
        }
    }

    // -- trade and shop actions ---------------------------------------------

    /// Buy shares. Busy-keyed per symbol so unrelated trades stay parallel.
    pub async fn buy_stock(&self, symbol: &str, shares: f64) -> Result<(), String> {
        self.trade(symbol, shares, true).await
    }

    pub async fn sell_stock(&self, symbol: &str, shares: f64) -> Result<(), String> {
        self.trade(symbol, shares, false).await
    }

    async fn trade(&self, symbol: &str, shares: f64, buying: bool) -> Result<(), String> {
        let action = if buying { "buy" } else { "sell" };
        let symbol = symbol.trim().to_ascii_uppercase();
        if symbol.is_empty() {
            return Err(self.action_failed(action, "symbol is required").await);
        }
        if !shares.is_finite() || shares <= 0.0 {
            return Err(self
                .action_failed(&format!("{action} {symbol}"), "share count must be positive")
                .await);
        }
        let identity = self.identity.read().await.clone();
        if identity.is_guest() {
            return Err(self
                .action_failed(&format!("{action} {symbol}"), "sign in to trade")
                .await);
        }
        let key = format!("trade:{symbol}");
        let Some(_guard) = self.busy.try_claim(&key) else {
            return Err(format!("{symbol} trade already in flight"));
        };

        let request = activity_types::TradeRequest {
            user_id: identity.id,
            symbol: symbol.clone(),
            shares,
        };
        let outcome = if buying {
            self.api.trade_buy(&request).await
        } else {
            self.api.trade_sell(&request).await
        };
        match outcome {
            Ok(ack) if ack.ok => {
                let owned = ack.owned_shares.unwrap_or_default();
                self.status
                    .set(format!("{action} {symbol}: done, now holding {owned}"))
                    .await;
                Ok(())
            }
            Ok(ack) => {
                let reason = ack.error.unwrap_or_else(|| "rejected".to_string());
                Err(self.action_failed(&format!("{action} {symbol}"), reason).await)
            }
            Err(err) => Err(self.action_failed(&format!("{action} {symbol}"), err).await),
        }
    }

    pub async fn buy_shop_item(&self, name: &str, quantity: i64) -> Result<(), String> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(self.action_failed("shop buy", "item name is required").await);
        }
        if quantity < 1 {
            return Err(self
                .action_failed(&format!("buy {name}"), "quantity must be at least 1")
                .await);
        }
        let identity = self.identity.read().await.clone();
        if identity.is_guest() {
            return Err(self.action_failed(&format!("buy {name}"), "sign in to shop").await);
        }
        let key = format!("shop:{name}");
        let Some(_guard) = self.busy.try_claim(&key) else {
            return Err(format!("{name} purchase already in flight"));
        };

        let request = activity_types::ShopBuyRequest {
            user_id: identity.id,
            name: name.clone(),
            quantity,
        };
        match self.api.shop_buy(&request).await {
            Ok(ack) if ack.ok => {
                if ack.activated_perks.is_empty() {
                    self.status.set(format!("bought {quantity} x {name}")).await;
                } else {
                    self.status
                        .set(format!(
                            "bought {quantity} x {name}, activated: {}",
                            ack.activated_perks.join(", ")
                        ))
                        .await;
                }
                Ok(())
            }
            Ok(ack) => {
                let reason = ack.error.unwrap_or_else(|| "rejected".to_string());
                Err(self.action_failed(&format!("buy {name}"), reason).await)
            }
            Err(err) => Err(self.action_failed(&format!("buy {name}"), err).await),
        }
    }

    pub async fn sell_shop_item(&self, name: &str) -> Result<(), String> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(self.action_failed("shop sell", "item name is required").await);
        }
        let identity = self.identity.read().await.clone();
        if identity.is_guest() {
            return Err(self.action_failed(&format!("sell {name}"), "sign in to shop").await);
        }
        let key = format!("shop:{name}");
        let Some(_guard) = self.busy.try_claim(&key) else {
            return Err(format!("{name} sale already in flight"));
        };

        let request = activity_types::ShopSellRequest {
            user_id: identity.id,
            name: name.clone(),
        };
        match self.api.shop_sell(&request).await {
            Ok(ack) if ack.ok => {
                let gain = ack.total_gain.unwrap_or_default();
                self.status.set(format!("sold {name} for {gain}")).await;
                Ok(())
            }
            Ok(ack) => {
                let reason = ack.error.unwrap_or_else(|| "rejected".to_string());
                Err(self.action_failed(&format!("sell {name}"), reason).await)
            }
            Err(err) => Err(self.action_failed(&format!("sell {name}"), err).await),
        }
    }

    async fn action_failed(&self, action: &str, message: impl std::fmt::Display) -> String {
        let text = format!("{action} failed: {message}");
        self.status.set(text.clone()).await;
        text
    }
}
