//! User-Agent selection for session traffic.
//!
//! The default is a desktop Firefox string; the service expects browser
//! traffic.

/// Browser User-Agent sent when no override is configured.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:96.0) Gecko/20100101 Firefox/96.0";

/// Picks the User-Agent for a run.
///
/// Blank overrides fall back to [`DEFAULT_USER_AGENT`].
#[must_use]
pub fn resolve_user_agent(override_ua: Option<&str>) -> String {
    override_ua
        .map(str::trim)
        .filter(|ua| !ua.is_empty())
        .unwrap_or(DEFAULT_USER_AGENT)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_user_agent_defaults_to_browser_string() {
        let ua = resolve_user_agent(None);
        assert_eq!(ua, DEFAULT_USER_AGENT);
        assert!(ua.starts_with("Mozilla/5.0"), "default UA must look like a browser: {ua}");
    }

    #[test]
    fn test_resolve_user_agent_uses_override() {
        assert_eq!(resolve_user_agent(Some("custom-agent/1.0")), "custom-agent/1.0");
    }

    #[test]
    fn test_resolve_user_agent_blank_override_falls_back() {
        assert_eq!(resolve_user_agent(Some("   ")), DEFAULT_USER_AGENT);
    }
}
