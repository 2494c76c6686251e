//! Client-side preconditions. Every check here short-circuits before any
//! network call is made.

use activity_types::DuelSession;
use anyhow::{Result, anyhow, bail};

pub fn validate_bet(bet: f64) -> Result<f64> {
    if !bet.is_finite() || bet <= 0.0 {
        bail!("bet must be a positive number");
    }
    Ok(bet)
}

/// Room codes are case-insensitive; normalize to uppercase before sending.
pub fn normalize_code(code: &str) -> Result<String> {
    let code = code.trim();
    if code.is_empty() {
        bail!("room code is required");
    }
    Ok(code.to_ascii_uppercase())
}

pub fn validate_guess(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| anyhow!("guess must be a whole number"))
}

/// Ready is enabled only when an opponent is present and the viewer has not
/// already readied up.
pub fn can_ready(session: &DuelSession, viewer_id: &str, bet: f64) -> Result<()> {
    validate_bet(bet)?;
    if session.players.len() < 2 {
        bail!("waiting for an opponent to join");
    }
    match session.player(viewer_id) {
        None => bail!("you are not in room {}", session.code),
        Some(p) if p.ready => bail!("already marked ready"),
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use activity_types::{DuelPlayer, DuelStatus};

    fn lobby_session(players: &[(&str, bool)]) -> DuelSession {
        DuelSession {
            code: "ROOM".to_string(),
            status: DuelStatus::Lobby,
            players: players
                .iter()
                .map(|(id, ready)| DuelPlayer {
                    user_id: id.to_string(),
                    display_name: format!("player-{id}"),
                    ready: *ready,
                })
                .collect(),
            round: 0,
            pot: 0.0,
            min_value: 1,
            max_value: 100,
            ready_count: players.iter().filter(|(_, r)| *r).count() as i32,
            winner_user_id: None,
        }
    }

    #[test]
    fn bet_must_be_positive_and_finite() {
        assert!(validate_bet(50.0).is_ok());
        assert!(validate_bet(0.0).is_err());
        assert!(validate_bet(-1.0).is_err());
        assert!(validate_bet(f64::NAN).is_err());
        assert!(validate_bet(f64::INFINITY).is_err());
    }

    #[test]
    fn code_is_trimmed_and_uppercased() {
        assert_eq!(normalize_code("  ab12 ").unwrap(), "AB12");
        assert!(normalize_code("   ").is_err());
    }

    #[test]
    fn guess_must_be_an_integer() {
        assert_eq!(validate_guess(" 50 ").unwrap(), 50);
        assert!(validate_guess("5.5").is_err());
        assert!(validate_guess("abc").is_err());
        assert!(validate_guess("").is_err());
    }

    #[test]
    fn ready_requires_two_players() {
        let session = lobby_session(&[("me", false)]);
        assert!(can_ready(&session, "me", 50.0).is_err());
    }

    #[test]
    fn ready_rejects_double_ready_and_strangers() {
        let session = lobby_session(&[("me", true), ("other", false)]);
        assert!(can_ready(&session, "me", 50.0).is_err());
        assert!(can_ready(&session, "stranger", 50.0).is_err());
        assert!(can_ready(&session, "other", 50.0).is_ok());
    }

    #[test]
    fn ready_validates_bet_first() {
        let session = lobby_session(&[("me", false), ("other", false)]);
        assert!(can_ready(&session, "me", 0.0).is_err());
    }
}
