//! Shared view state. Each slot is owned by exactly one writer; slots fail
//! independently so one broken collaborator never blanks the whole view.

use std::sync::Arc;

use activity_types::{AccountStatus, DashboardStats, ShopResponse, StocksResponse};
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::RwLock;
use tracing::info;

/// One independently refreshed slice of the dashboard.
#[derive(Debug, Clone, Default)]
pub enum Loadable<T> {
    #[default]
    NotAsked,
    Ready {
        data: T,
        refreshed_at: String,
    },
    Failed(String),
}

impl<T> Loadable<T> {
    pub fn ready(data: T) -> Self {
        Loadable::Ready {
            data,
            refreshed_at: Utc::now().to_rfc3339(),
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Loadable::Ready { data, .. } => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Loadable::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Loadable::Ready { .. })
    }
}

/// The reconciled read-model the poller writes into.
#[derive(Debug, Default)]
pub struct ViewState {
    pub market: Loadable<StocksResponse>,
    pub stats: Loadable<DashboardStats>,
    pub account: Loadable<AccountStatus>,
    pub shop: Loadable<ShopResponse>,
}

/// Latest human-readable action message. New messages replace the previous
/// one; there is no queue.
#[derive(Debug, Clone, Default)]
pub struct StatusSlot(Arc<RwLock<Option<String>>>);

impl StatusSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, message: impl Into<String>) {
        let message = message.into();
        info!(%message, "status");
        *self.0.write().await = Some(message);
    }

    pub async fn current(&self) -> Option<String> {
        self.0.read().await.clone()
    }

    pub async fn clear(&self) {
        *self.0.write().await = None;
    }
}

/// Per-entity busy flags, keyed by session, trading symbol, or shop item so
/// unrelated concurrent actions are never serialized behind each other.
/// Claims release on drop, which keeps flags from sticking on error paths.
#[derive(Debug, Clone, Default)]
pub struct BusyFlags(Arc<DashMap<String, ()>>);

pub struct BusyGuard {
    flags: BusyFlags,
    key: String,
}

impl BusyFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_claim(&self, key: &str) -> Option<BusyGuard> {
        match self.0.entry(key.to_string()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(vacant) => {
                vacant.insert(());
                Some(BusyGuard {
                    flags: self.clone(),
                    key: key.to_string(),
                })
            }
        }
    }

    pub fn is_busy(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flags.0.remove(&self.key);
    }
}
