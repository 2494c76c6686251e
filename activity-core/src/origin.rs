//! Candidate API origin resolution. Pure: the host context is an explicit
//! injected value, never read from a global.

/// Domain suffix of the restricted activity webview. Its network policy
/// forbids cross-origin targets, so only same-origin relative requests work.
pub const ACTIVITY_HOST_SUFFIX: &str = ".discordsays.com";

/// Infix marking an "activity" deployment of the dashboard. Removing it
/// yields the sibling dashboard host that actually serves the API.
pub const ACTIVITY_INFIX: &str = "-activity.";

/// Runtime host context: protocol as reported by the page location (with the
/// trailing colon, e.g. `https:`) plus the host name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostContext {
    pub protocol: String,
    pub hostname: String,
}

impl HostContext {
    pub fn new(protocol: &str, hostname: &str) -> Self {
        Self {
            protocol: protocol.to_string(),
            hostname: hostname.to_string(),
        }
    }

    pub fn is_activity_webview(&self) -> bool {
        self.hostname.ends_with(ACTIVITY_HOST_SUFFIX)
    }

    /// Absolute origin of this host, used to resolve the `""` (same-origin)
    /// candidate into a concrete base URL.
    pub fn origin(&self) -> String {
        format!("{}//{}", self.protocol, self.hostname)
    }
}

/// Ordered candidate origins for API requests. The empty string means
/// "relative to the current host". Never returns an empty list.
///
/// On the restricted webview only the same-origin candidate is usable. On an
/// activity-infixed host the inferred sibling dashboard origin goes first,
/// because relative requests on that host are known to 404. The heuristic is
/// not verified against DNS; a wrong inference fails like any other
/// candidate and the loop moves on.
pub fn resolve_origins(host: &HostContext, fallback: Option<&str>) -> Vec<String> {
    if host.is_activity_webview() {
        return vec![String::new()];
    }

    let mut candidates = Vec::new();
    if host.hostname.contains(ACTIVITY_INFIX) {
        let sibling = host.hostname.replacen(ACTIVITY_INFIX, ".", 1);
        candidates.push(format!("{}//{}", host.protocol, sibling));
    }
    if let Some(fallback) = fallback {
        let fallback = fallback.trim().trim_end_matches('/');
        if !fallback.is_empty() {
            candidates.push(fallback.to_string());
        }
    }
    candidates.push(String::new());

    // De-duplicate, first occurrence wins.
    let mut seen: Vec<String> = Vec::new();
    candidates.retain(|c| {
        if seen.contains(c) {
            false
        } else {
            seen.push(c.clone());
            true
        }
    });
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn webview_host_gets_only_relative_candidate() {
        let host = HostContext::new("https:", "1234567890.discordsays.com");
        assert_eq!(resolve_origins(&host, Some("https://fallback.example")), vec![""]);
    }

    #[test]
    fn activity_infix_derives_sibling_first() {
        let host = HostContext::new("https:", "xyz-activity.example.com");
        let origins = resolve_origins(&host, Some("https://fallback.example"));
        assert_eq!(
            origins,
            vec![
                "https://xyz.example.com".to_string(),
                "https://fallback.example".to_string(),
                String::new(),
            ]
        );
    }

    #[test]
    fn infix_replacement_touches_first_occurrence_only() {
        let host = HostContext::new("https:", "a-activity.b-activity.example.com");
        let origins = resolve_origins(&host, None);
        assert_eq!(origins[0], "https://a.b-activity.example.com");
    }

    #[test]
    fn plain_host_gets_fallback_then_relative() {
        let host = HostContext::new("https:", "dashboard.example.com");
        let origins = resolve_origins(&host, Some("https://api.example.com/"));
        assert_eq!(
            origins,
            vec!["https://api.example.com".to_string(), String::new()]
        );
    }

    #[test]
    fn no_fallback_still_yields_relative() {
        let host = HostContext::new("http:", "localhost:8080");
        assert_eq!(resolve_origins(&host, None), vec![String::new()]);
    }

    #[test]
    fn duplicate_fallback_is_dropped() {
        let host = HostContext::new("https:", "xyz-activity.example.com");
        let origins = resolve_origins(&host, Some("https://xyz.example.com"));
        assert_eq!(
            origins,
            vec!["https://xyz.example.com".to_string(), String::new()]
        );
    }

    #[test]
    fn result_is_never_empty() {
        for hostname in ["discordsays.com.evil.example", "example.com", "x.discordsays.com"] {
            let host = HostContext::new("https:", hostname);
            assert!(!resolve_origins(&host, None).is_empty());
        }
    }
}
