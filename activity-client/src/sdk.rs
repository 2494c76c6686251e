//! Seam for the embedded activity SDK. The real SDK lives in the host
//! webview; everything the identity handshake needs from it sits behind this
//! trait so the flow is testable with a scripted implementation.

use anyhow::Result;
use async_trait::async_trait;

/// Subset of the embedded app SDK used by the identity handshake.
#[async_trait]
pub trait ActivitySdk: Send + Sync {
    /// Resolves once the host handshake completes.
    async fn ready(&self) -> Result<()>;

    /// Request an authorization code for the `identify` scope. The redirect
    /// URI is omitted inside the webview host, where it is not required.
    async fn authorize(&self, client_id: &str, redirect_uri: Option<&str>)
    -> Result<Option<String>>;

    /// Authenticate the SDK with a bearer token, yielding the viewer profile.
    async fn authenticate(&self, access_token: &str) -> Result<SdkProfile>;
}

#[derive(Debug, Clone, Default)]
pub struct SdkProfile {
    pub id: String,
    pub username: String,
    pub global_name: Option<String>,
    pub display_name: Option<String>,
    /// Avatar hash, if the user has a custom avatar.
    pub avatar: Option<String>,
}

/// Query parameters the host passed at page launch.
#[derive(Debug, Clone, Default)]
pub struct LaunchParams {
    pub username: Option<String>,
    pub user_id: Option<String>,
}

impl LaunchParams {
    /// Accept the launch id only when it is all digits after an optional
    /// stripped `+` prefix; otherwise discard the id but keep the name.
    pub fn sanitized_user_id(&self) -> Option<String> {
        let raw = self.user_id.as_deref()?.trim();
        let digits = raw.strip_prefix('+').unwrap_or(raw);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            Some(digits.to_string())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(id: &str) -> LaunchParams {
        LaunchParams {
            username: Some("alice".to_string()),
            user_id: Some(id.to_string()),
        }
    }

    #[test]
    fn plain_digits_pass() {
        assert_eq!(params("123456").sanitized_user_id().as_deref(), Some("123456"));
    }

    #[test]
    fn plus_prefix_is_stripped() {
        assert_eq!(params("+987").sanitized_user_id().as_deref(), Some("987"));
    }

    #[test]
    fn non_numeric_ids_are_discarded() {
        assert_eq!(params("12ab").sanitized_user_id(), None);
        assert_eq!(params("+").sanitized_user_id(), None);
        assert_eq!(params("").sanitized_user_id(), None);
    }
}
