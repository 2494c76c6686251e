//! Viewer identity resolution. `detect` never fails: every branch that
//! cannot produce a usable identity returns the guest variant with a
//! branch-specific reason code so failures stay diagnosable without
//! crashing the view. At most one SDK handshake runs per page load.

use activity_core::origin::HostContext;
use activity_types::Identity;
use tracing::{info, warn};

use crate::api::Api;
use crate::sdk::{ActivitySdk, LaunchParams};

const AVATAR_CDN: &str = "https://cdn.discordapp.com";

pub struct IdentityResolver {
    api: Api,
    client_id: Option<String>,
    redirect_uri: Option<String>,
}

impl IdentityResolver {
    pub fn new(api: Api, client_id: Option<String>, redirect_uri: Option<String>) -> Self {
        Self {
            api,
            client_id,
            redirect_uri,
        }
    }

    /// Resolve the current viewer. First match wins: explicit launch
    /// parameters, then the SDK handshake when running inside the activity
    /// webview with a configured client id.
    pub async fn detect(
        &self,
        host: Option<&HostContext>,
        launch: &LaunchParams,
        sdk: Option<&dyn ActivitySdk>,
    ) -> Identity {
        if let Some(name) = launch
            .username
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
        {
            let id = launch.sanitized_user_id().unwrap_or_default();
            info!(name, "identity taken from launch parameters");
            return Identity {
                id,
                name: name.to_string(),
                avatar_url: String::new(),
                reason: "query-param".to_string(),
            };
        }

        let Some(host) = host else {
            return Identity::guest("no-window");
        };
        if !host.is_activity_webview() {
            return Identity::guest("not-discord-activity-host");
        }
        let Some(client_id) = self.client_id.as_deref() else {
            return Identity::guest("missing-client-id");
        };
        let Some(sdk) = sdk else {
            return Identity::guest("sdk-init-failed");
        };
        self.handshake(client_id, sdk).await
    }

    async fn handshake(&self, client_id: &str, sdk: &dyn ActivitySdk) -> Identity {
        if let Err(err) = sdk.ready().await {
            warn!(error = %err, "sdk handshake never became ready");
            return Identity::guest("sdk-init-failed");
        }

        // Inside the webview the platform does not require a redirect URI.
        let code = match sdk.authorize(client_id, None).await {
            Ok(Some(code)) if !code.is_empty() => code,
            Ok(_) => return Identity::guest("no-auth-code"),
            Err(err) => {
                warn!(error = %err, "authorization request failed");
                return Identity::guest("no-auth-code");
            }
        };

        let token = match self
            .api
            .oauth_token(&code, self.redirect_uri.as_deref())
            .await
        {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, "token exchange failed");
                return Identity::guest("no-access-token");
            }
        };
        let Some(access_token) = token.access_token.filter(|t| !t.is_empty()) else {
            return Identity::guest("no-access-token");
        };

        let profile = match sdk.authenticate(&access_token).await {
            Ok(profile) => profile,
            Err(err) => {
                warn!(error = %err, "sdk authenticate failed");
                return Identity::guest("sdk-auth-failed");
            }
        };

        // Global display name > profile display name > account handle.
        let name = [
            profile.global_name.as_deref(),
            profile.display_name.as_deref(),
            Some(profile.username.as_str()),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|n| !n.is_empty())
        .unwrap_or("")
        .to_string();
        if name.is_empty() {
            return Identity::guest("empty-display-name");
        }

        let avatar_url = profile
            .avatar
            .as_deref()
            .filter(|hash| !hash.is_empty())
            .map(|hash| format!("{AVATAR_CDN}/avatars/{}/{hash}.png?size=128", profile.id))
            .unwrap_or_default();

        info!(user_id = %profile.id, "identity resolved via sdk handshake");
        Identity {
            id: profile.id,
            name,
            avatar_url,
            reason: "sdk-oauth".to_string(),
        }
    }
}
