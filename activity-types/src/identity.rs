use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Resolved viewer identity. An empty `name` marks the unauthenticated/guest
/// variant; mutating controls are disabled for guests. `reason` records which
/// resolution branch produced this value and is only ever read for
/// diagnostics, never for control flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub avatar_url: String,
    pub reason: String,
}

impl Identity {
    pub fn guest(reason: &str) -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            avatar_url: String::new(),
            reason: reason.to_string(),
        }
    }

    pub fn is_guest(&self) -> bool {
        self.name.is_empty()
    }
}

/// Index of the platform default avatar for a user with no custom avatar,
/// derived from the snowflake id the same way the CDN does.
pub fn default_avatar_index(user_id: &str) -> u64 {
    let id: u64 = user_id.parse().unwrap_or(0);
    (id >> 22) % 6
}
