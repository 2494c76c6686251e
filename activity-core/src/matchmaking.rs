use std::time::{Duration, Instant};

use activity_types::{DuelStatus, LobbyListing};

/// Minimum spacing between autonomous matchmaking actions. Overlapping poll
/// ticks under network latency must never fire duplicate joins or creates.
pub const AUTO_ACTION_WINDOW: Duration = Duration::from_millis(2500);

/// What the autonomous matchmaker decided to do for a viewer with no
/// current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoAction {
    /// Join an existing lobby by room code.
    Join { code: String },
    /// No joinable lobby; open a new room.
    Create,
}

/// Scan the open-lobby listing. A room is joinable when it is still in the
/// lobby phase, hosted by someone other than the viewer, and already has at
/// least one player waiting.
pub fn plan_auto_action(open_lobbies: &[LobbyListing], viewer_id: &str) -> AutoAction {
    for lobby in open_lobbies {
        if lobby.status == DuelStatus::Lobby
            && lobby.host_user_id != viewer_id
            && lobby.player_count >= 1
        {
            return AutoAction::Join {
                code: lobby.code.clone(),
            };
        }
    }
    AutoAction::Create
}

/// One-shot-per-window throttle, compared against an injected now.
#[derive(Debug, Default)]
pub struct Throttle {
    last_fired: Option<Instant>,
}

impl Throttle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the window. Returns false while a previous claim is still
    /// within `AUTO_ACTION_WINDOW` of `now`.
    pub fn try_fire(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_fired {
            if now.duration_since(last) < AUTO_ACTION_WINDOW {
                return false;
            }
        }
        self.last_fired = Some(now);
        true
    }
}
