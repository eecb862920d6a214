//! User-Agent string for report endpoint requests.

/// Default User-Agent (identifies the tool and its version).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("report-desk/{version} (report-client)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_carries_crate_version() {
        let ua = default_user_agent();
        assert_eq!(
            Some(env!("CARGO_PKG_VERSION")),
            ua.strip_prefix("report-desk/")
                .and_then(|s| s.split(' ').next()),
            "UA must contain crate version: {ua}"
        );
        assert!(ua.ends_with("(report-client)"), "got: {ua}");
    }
}
