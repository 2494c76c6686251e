//! Matchmaking and gameplay client for the number-duel minigame. The server
//! owns every session; this client validates locally, submits actions, and
//! reconciles the cached session from poll refreshes. All mutating duel
//! actions share a single busy key so overlapping submissions cannot race.

use std::fmt::Display;
use std::sync::Arc;

use activity_core::matchmaking::{AutoAction, Throttle, plan_auto_action};
use activity_core::session::SessionTracker;
use activity_core::validation::{can_ready, normalize_code, validate_bet, validate_guess};
use activity_core::{Clock, SystemClock};
use activity_types::{
    DuelCreateRequest, DuelGuessRequest, DuelJoinRequest, DuelReadyRequest, DuelSession,
    DuelStatus, DuelStatusResponse, Identity, LobbyListing,
};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::api::Api;
use crate::fetch::FetchError;
use crate::state::{BusyFlags, StatusSlot};

/// All mutating duel operations serialize behind this one key.
pub const DUEL_BUSY_KEY: &str = "duel";

#[derive(Debug)]
struct DuelState {
    tracker: SessionTracker,
    open_lobbies: Vec<LobbyListing>,
    refresh_error: Option<String>,
    guess_input: String,
    bet_input: f64,
    last_hint: Option<String>,
    throttle: Throttle,
}

pub struct DuelClient {
    api: Api,
    identity: Identity,
    status: StatusSlot,
    busy: BusyFlags,
    clock: Arc<dyn Clock>,
    inner: RwLock<DuelState>,
}

impl DuelClient {
    pub fn new(
        api: Api,
        identity: Identity,
        status: StatusSlot,
        busy: BusyFlags,
        default_bet: f64,
    ) -> Self {
        Self::with_clock(api, identity, status, busy, default_bet, Arc::new(SystemClock))
    }

    pub fn with_clock(
        api: Api,
        identity: Identity,
        status: StatusSlot,
        busy: BusyFlags,
        default_bet: f64,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            api,
            identity,
            status,
            busy,
            clock,
            inner: RwLock::new(DuelState {
                tracker: SessionTracker::new(),
                open_lobbies: Vec::new(),
                refresh_error: None,
                guess_input: String::new(),
                bet_input: default_bet,
                last_hint: None,
                throttle: Throttle::new(),
            }),
        }
    }

    // -- read accessors -----------------------------------------------------

    pub async fn session(&self) -> Option<DuelSession> {
        self.inner.read().await.tracker.current().cloned()
    }

    pub async fn open_lobbies(&self) -> Vec<LobbyListing> {
        self.inner.read().await.open_lobbies.clone()
    }

    pub async fn guess_input(&self) -> String {
        self.inner.read().await.guess_input.clone()
    }

    pub async fn last_hint(&self) -> Option<String> {
        self.inner.read().await.last_hint.clone()
    }

    pub async fn refresh_error(&self) -> Option<String> {
        self.inner.read().await.refresh_error.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy(DUEL_BUSY_KEY)
    }

    pub async fn set_guess_input(&self, raw: impl Into<String>) {
        self.inner.write().await.guess_input = raw.into();
    }

    pub async fn set_bet_input(&self, bet: f64) {
        self.inner.write().await.bet_input = bet;
    }

    // -- mutating operations ------------------------------------------------

    /// Open a new lobby with the caller as host and sole player.
    pub async fn create(&self, bet: f64) -> Result<(), String> {
        let bet = match validate_bet(bet) {
            Ok(bet) => bet,
            Err(err) => return Err(self.fail("duel create", err).await),
        };
        self.require_player("duel create").await?;
        let Some(_guard) = self.busy.try_claim(DUEL_BUSY_KEY) else {
            return Err("another duel action is in flight".to_string());
        };

        let request = DuelCreateRequest {
            user_id: self.identity.id.clone(),
            display_name: self.identity.name.clone(),
            bet,
        };
        match self.api.duel_create(&request).await {
            Ok(ack) if ack.ok => {
                let code = ack.game.map(|g| g.code).unwrap_or_default();
                info!(%code, "duel room created");
                self.status.set(format!("created duel room {code}")).await;
                Ok(())
            }
            Ok(ack) => Err(self.fail("duel create", rejection(ack.error)).await),
            Err(err) => Err(self.fail("duel create", err).await),
        }
    }

    /// Join an existing lobby by room code.
    pub async fn join(&self, code: &str) -> Result<(), String> {
        let code = match normalize_code(code) {
            Ok(code) => code,
            Err(err) => return Err(self.fail("duel join", err).await),
        };
        self.require_player("duel join").await?;
        let Some(_guard) = self.busy.try_claim(DUEL_BUSY_KEY) else {
            return Err("another duel action is in flight".to_string());
        };

        let request = DuelJoinRequest {
            user_id: self.identity.id.clone(),
            display_name: self.identity.name.clone(),
            code: code.clone(),
        };
        match self.api.duel_join(&request).await {
            Ok(ack) if ack.ok => {
                info!(%code, "joined duel room");
                self.status.set(format!("joined duel room {code}")).await;
                Ok(())
            }
            Ok(ack) => {
                Err(self
                    .fail(&format!("join {code}"), rejection(ack.error))
                    .await)
            }
            Err(err) => Err(self.fail(&format!("join {code}"), err).await),
        }
    }

    /// Mark the caller ready in the lobby. Requires an opponent and a bet.
    pub async fn ready(&self, code: &str, bet: f64) -> Result<(), String> {
        let code = match normalize_code(code) {
            Ok(code) => code,
            Err(err) => return Err(self.fail("duel ready", err).await),
        };
        self.require_player("duel ready").await?;
        {
            let state = self.inner.read().await;
            let Some(session) = state.tracker.current() else {
                return Err(self.fail("duel ready", "no current room").await);
            };
            if let Err(err) = can_ready(session, &self.identity.id, bet) {
                return Err(self.fail("duel ready", err).await);
            }
        }
        let Some(_guard) = self.busy.try_claim(DUEL_BUSY_KEY) else {
            return Err("another duel action is in flight".to_string());
        };

        let request = DuelReadyRequest {
            user_id: self.identity.id.clone(),
            code: code.clone(),
            bet,
        };
        match self.api.duel_ready(&request).await {
            Ok(ack) if ack.ok => {
                self.status.set(format!("ready in room {code}")).await;
                Ok(())
            }
            Ok(ack) => {
                Err(self
                    .fail(&format!("ready in {code}"), rejection(ack.error))
                    .await)
            }
            Err(err) => Err(self.fail(&format!("ready in {code}"), err).await),
        }
    }

    /// Submit a guess for an active session. The stored guess input is
    /// cleared on any successful submission; on rejection it is left
    /// unchanged and the failure message names the room code.
    pub async fn guess(&self, code: &str, raw_guess: &str) -> Result<(), String> {
        let code = match normalize_code(code) {
            Ok(code) => code,
            Err(err) => return Err(self.fail("duel guess", err).await),
        };
        let value = match validate_guess(raw_guess) {
            Ok(value) => value,
            Err(err) => return Err(self.fail(&format!("guess in {code}"), err).await),
        };
        self.require_player("duel guess").await?;
        {
            let state = self.inner.read().await;
            if state.tracker.status() != Some(DuelStatus::Active) {
                return Err(self
                    .fail(&format!("guess in {code}"), "round is not active")
                    .await);
            }
        }
        let Some(_guard) = self.busy.try_claim(DUEL_BUSY_KEY) else {
            return Err("another duel action is in flight".to_string());
        };

        let request = DuelGuessRequest {
            user_id: self.identity.id.clone(),
            code: code.clone(),
            guess: value,
        };
        match self.api.duel_guess(&request).await {
            Ok(ack) if ack.ok => {
                let hint = ack.hint.unwrap_or_default();
                {
                    let mut state = self.inner.write().await;
                    state.guess_input.clear();
                    state.last_hint = if hint.is_empty() {
                        None
                    } else {
                        Some(hint.clone())
                    };
                }
                if hint.is_empty() {
                    self.status.set(format!("guess submitted in {code}")).await;
                } else {
                    self.status.set(hint).await;
                }
                Ok(())
            }
            Ok(ack) => {
                Err(self
                    .fail(&format!("guess in {code}"), rejection(ack.error))
                    .await)
            }
            Err(err) => Err(self.fail(&format!("guess in {code}"), err).await),
        }
    }

    // -- polling integration ------------------------------------------------

    /// Reconcile the cached duel view from a poll sub-fetch. A failure only
    /// marks this domain's error slot; previously known data stays put.
    pub async fn apply_refresh(&self, refresh: Result<DuelStatusResponse, FetchError>) {
        let mut state = self.inner.write().await;
        match refresh {
            Ok(response) => {
                state.open_lobbies = response.open_lobbies;
                state.tracker.apply(response.current_game);
                state.refresh_error = None;
            }
            Err(err) => {
                debug!(error = %err, "duel status refresh failed");
                state.refresh_error = Some(err.to_string());
            }
        }
    }

    /// Autonomous matchmaking, run once per poll tick. Only acts when the
    /// viewer has no current session, nothing is in flight, and the throttle
    /// window is clear; then joins a foreign lobby or creates a fresh room.
    pub async fn auto_matchmake(&self) {
        if self.identity.is_guest() {
            return;
        }
        if self.busy.is_busy(DUEL_BUSY_KEY) {
            return;
        }
        let (action, bet) = {
            let mut state = self.inner.write().await;
            if state.tracker.current().is_some() {
                return;
            }
            if !state.throttle.try_fire(self.clock.now()) {
                return;
            }
            (
                plan_auto_action(&state.open_lobbies, &self.identity.id),
                state.bet_input,
            )
        };
        match action {
            AutoAction::Join { code } => {
                debug!(%code, "auto matchmaking joins open lobby");
                let _ = self.join(&code).await;
            }
            AutoAction::Create => {
                debug!("auto matchmaking opens a new room");
                let _ = self.create(bet).await;
            }
        }
    }

    // -- helpers ------------------------------------------------------------

    async fn require_player(&self, action: &str) -> Result<(), String> {
        if self.identity.is_guest() {
            return Err(self.fail(action, "sign in to play").await);
        }
        Ok(())
    }

    async fn fail(&self, action: &str, message: impl Display) -> String {
        let text = format!("{action} failed: {message}");
        self.status.set(text.clone()).await;
        text
    }
}

fn rejection(error: Option<String>) -> String {
    error.unwrap_or_else(|| "rejected".to_string())
}
