use activity_core::SessionTracker;
use activity_types::{DuelPlayer, DuelSession, DuelStatus};
use proptest::prelude::*;

fn snapshot(code: &str, status: DuelStatus) -> DuelSession {
    DuelSession {
        code: code.to_string(),
        status,
        players: vec![DuelPlayer {
            user_id: "1".to_string(),
            display_name: "Alice".to_string(),
            ready: false,
        }],
        round: 0,
        pot: 0.0,
        min_value: 1,
        max_value: 100,
        ready_count: 0,
        winner_user_id: if status == DuelStatus::Finished {
            Some("1".to_string())
        } else {
            None
        },
    }
}

fn status_strategy() -> impl Strategy<Value = DuelStatus> {
    prop_oneof![
        Just(DuelStatus::Lobby),
        Just(DuelStatus::Active),
        Just(DuelStatus::Finished),
    ]
}

proptest! {
    /// Whatever order the server's snapshots arrive in, the tracked status
    /// for a given room never moves backward.
    #[test]
    fn observed_status_never_regresses(statuses in prop::collection::vec(status_strategy(), 1..40)) {
        let mut tracker = SessionTracker::new();
        let mut last_seen: Option<DuelStatus> = None;
        for status in statuses {
            tracker.apply(Some(snapshot("ROOM", status)));
            let observed = tracker.status().unwrap();
            if let Some(prev) = last_seen {
                prop_assert!(observed >= prev, "regressed from {:?} to {:?}", prev, observed);
            }
            last_seen = Some(observed);
        }
    }

    /// Clearing between snapshots resets the room lifecycle entirely.
    #[test]
    fn clear_allows_a_fresh_lobby(status in status_strategy()) {
        let mut tracker = SessionTracker::new();
        tracker.apply(Some(snapshot("ROOM", status)));
        tracker.apply(None);
        prop_assert!(tracker.apply(Some(snapshot("ROOM", DuelStatus::Lobby))));
        prop_assert_eq!(tracker.status(), Some(DuelStatus::Lobby));
    }
}
