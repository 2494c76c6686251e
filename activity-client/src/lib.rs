pub mod api;
pub mod client;
pub mod config;
pub mod duel;
pub mod fetch;
pub mod identity;
pub mod polling;
pub mod sdk;
pub mod state;

pub use api::Api;
pub use client::DashboardClient;
pub use config::Config;
pub use duel::DuelClient;
pub use fetch::{FetchError, Outcome, ResilientFetcher};
pub use identity::IdentityResolver;
pub use polling::{PollHandle, PollingController, RoundGuard};
