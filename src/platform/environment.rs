use std::env;

pub(crate) const ENVIRONMENT_VAR: &str = "PIWIK_TRACKER_ENV";

fn forced_environment() -> Option<String> {
    env::var(ENVIRONMENT_VAR).ok()
}

/// Whether the process declared itself a test context. The browser original
/// keyed this off `NODE_ENV`; here the `PIWIK_TRACKER_ENV` variable set to
/// `test` plays the same role. Invalid-configuration warnings are suppressed
/// in test contexts.
pub fn is_test_environment() -> bool {
    forced_environment()
        .map(|value| value.eq_ignore_ascii_case("test"))
        .unwrap_or(false)
}
