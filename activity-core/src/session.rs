use activity_types::{DuelSession, DuelStatus};
use tracing::warn;

/// Tracks the viewer's authoritative duel session across poll refreshes.
///
/// The server owns the session; the tracker only decides whether a snapshot
/// is acceptable. A snapshot that would move the same room's status backward
/// is dropped (the next poll is authoritative anyway), so observers never
/// see Active -> Lobby or Finished -> anything.
#[derive(Debug, Default)]
pub struct SessionTracker {
    current: Option<DuelSession>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&DuelSession> {
        self.current.as_ref()
    }

    pub fn status(&self) -> Option<DuelStatus> {
        self.current.as_ref().map(|s| s.status)
    }

    /// Apply an authoritative refresh. Returns true if the snapshot was
    /// accepted. `None` clears the session (the server forgot it, e.g. after
    /// a finished game is reaped).
    pub fn apply(&mut self, snapshot: Option<DuelSession>) -> bool {
        let Some(next) = snapshot else {
            self.current = None;
            return true;
        };
        if let Some(cur) = &self.current {
            if cur.code.eq_ignore_ascii_case(&next.code)
                && !cur.status.can_advance_to(next.status)
            {
                warn!(
                    code = %cur.code,
                    from = ?cur.status,
                    to = ?next.status,
                    "ignoring backward session snapshot"
                );
                return false;
            }
        }
        self.current = Some(next);
        true
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
