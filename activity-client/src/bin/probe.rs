//! One-shot diagnostic round against a live backend. Resolves origins and
//! identity the same way the embedded client does, runs a single poll round,
//! and logs what each slot ended up with.

use std::env;

use activity_client::sdk::LaunchParams;
use activity_client::{Config, DashboardClient, IdentityResolver};
use activity_core::origin::HostContext;
use tracing::info;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    let host = HostContext::new(
        &env::var("ACTIVITY_PROTOCOL").unwrap_or_else(|_| "http:".to_string()),
        &env::var("ACTIVITY_HOSTNAME").unwrap_or_else(|_| "127.0.0.1:8724".to_string()),
    );
    let launch = LaunchParams {
        username: env::var("ACTIVITY_USERNAME").ok(),
        user_id: env::var("ACTIVITY_USER_ID").ok(),
    };

    info!(hostname = %host.hostname, "probing backend");

    // No SDK outside the webview; launch params or guest mode only.
    let bootstrap = DashboardClient::new(config.clone(), &host, activity_types::Identity::guest("probe"));
    let resolver = IdentityResolver::new(
        bootstrap.api().clone(),
        config.discord_client_id.clone(),
        config.redirect_uri.clone(),
    );
    let identity = resolver.detect(Some(&host), &launch, None).await;
    info!(name = %identity.name, reason = %identity.reason, "identity resolved");

    let client = DashboardClient::new(config, &host, identity);
    client.run_once().await;

    let view = client.view();
    let view = view.read().await;
    match view.market.data() {
        Some(market) => info!(stocks = market.stocks.len(), "market snapshot loaded"),
        None => info!(error = ?view.market.error(), "market snapshot unavailable"),
    }
    match view.stats.data() {
        Some(stats) => info!(
            companies = stats.company_count,
            users = stats.user_count,
            "dashboard stats loaded"
        ),
        None => info!(error = ?view.stats.error(), "dashboard stats unavailable"),
    }
    match view.account.data() {
        Some(_) => info!("account status loaded"),
        None => info!(error = ?view.account.error(), "account status unavailable"),
    }
    let duel = client.duel().await;
    info!(
        session = ?duel.session().await.map(|s| s.code),
        lobbies = duel.open_lobbies().await.len(),
        "duel state"
    );
    if let Some(message) = client.status().current().await {
        info!(%message, "status slot");
    }
}
