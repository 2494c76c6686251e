use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Lifecycle of a duel room. Transitions only ever move forward:
/// Lobby -> Active -> Finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum DuelStatus {
    Lobby,
    Active,
    Finished,
}

impl DuelStatus {
    /// Forward-only check. Staying in place is allowed; moving backward is not.
    pub fn can_advance_to(self, next: DuelStatus) -> bool {
        next >= self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DuelPlayer {
    pub user_id: String,
    pub display_name: String,
    pub ready: bool,
}

/// Authoritative duel session state as reported by the server. The client
/// holds a read-mostly cached copy refreshed each poll tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DuelSession {
    pub code: String,
    pub status: DuelStatus,
    pub players: Vec<DuelPlayer>,
    pub round: i32,
    pub pot: f64,
    pub min_value: i32,
    pub max_value: i32,
    pub ready_count: i32,
    pub winner_user_id: Option<String>,
}

impl DuelSession {
    /// Structural invariants: non-empty code, ready_count bounded by the
    /// player count, unique player ids, winner set iff the duel is finished.
    pub fn validate(&self) -> Result<(), String> {
        if self.code.trim().is_empty() {
            return Err("session code is empty".to_string());
        }
        if self.ready_count < 0 || self.ready_count as usize > self.players.len() {
            return Err(format!(
                "ready_count {} exceeds player count {}",
                self.ready_count,
                self.players.len()
            ));
        }
        for (i, player) in self.players.iter().enumerate() {
            if self.players[i + 1..].iter().any(|p| p.user_id == player.user_id) {
                return Err(format!("duplicate player id {}", player.user_id));
            }
        }
        match (self.status, &self.winner_user_id) {
            (DuelStatus::Finished, None) => Err("finished session has no winner".to_string()),
            (DuelStatus::Lobby | DuelStatus::Active, Some(_)) => {
                Err("winner set before the session finished".to_string())
            }
            _ => Ok(()),
        }
    }

    pub fn player(&self, user_id: &str) -> Option<&DuelPlayer> {
        self.players.iter().find(|p| p.user_id == user_id)
    }
}

/// Read-only projection of an open room, used only for matchmaking scans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LobbyListing {
    pub code: String,
    pub host_user_id: String,
    pub status: DuelStatus,
    pub player_count: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(status: DuelStatus) -> DuelSession {
        DuelSession {
            code: "ROOM".to_string(),
            status,
            players: vec![
                DuelPlayer {
                    user_id: "1".to_string(),
                    display_name: "Alice".to_string(),
                    ready: true,
                },
                DuelPlayer {
                    user_id: "2".to_string(),
                    display_name: "Bob".to_string(),
                    ready: false,
                },
            ],
            round: 1,
            pot: 100.0,
            min_value: 1,
            max_value: 100,
            ready_count: 1,
            winner_user_id: None,
        }
    }

    #[test]
    fn status_only_advances() {
        assert!(DuelStatus::Lobby.can_advance_to(DuelStatus::Active));
        assert!(DuelStatus::Active.can_advance_to(DuelStatus::Finished));
        assert!(DuelStatus::Active.can_advance_to(DuelStatus::Active));
        assert!(!DuelStatus::Active.can_advance_to(DuelStatus::Lobby));
        assert!(!DuelStatus::Finished.can_advance_to(DuelStatus::Active));
        assert!(!DuelStatus::Finished.can_advance_to(DuelStatus::Lobby));
    }

    #[test]
    fn validate_accepts_consistent_lobby() {
        assert!(session(DuelStatus::Lobby).validate().is_ok());
    }

    #[test]
    fn validate_rejects_overflowing_ready_count() {
        let mut s = session(DuelStatus::Lobby);
        s.ready_count = 3;
        assert!(s.validate().is_err());
    }

    #[test]
    fn validate_ties_winner_to_finished() {
        let mut s = session(DuelStatus::Finished);
        assert!(s.validate().is_err());
        s.winner_user_id = Some("1".to_string());
        assert!(s.validate().is_ok());

        let mut s = session(DuelStatus::Active);
        s.winner_user_id = Some("1".to_string());
        assert!(s.validate().is_err());
    }

    #[test]
    fn validate_rejects_duplicate_players() {
        let mut s = session(DuelStatus::Lobby);
        s.players[1].user_id = "1".to_string();
        assert!(s.validate().is_err());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&DuelStatus::Lobby).unwrap(),
            "\"lobby\""
        );
        assert_eq!(
            serde_json::from_str::<DuelStatus>("\"finished\"").unwrap(),
            DuelStatus::Finished
        );
    }
}
