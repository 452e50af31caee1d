use std::env;

use quiz_core::model::ClientSettingsDraft;

pub const BASE_URL_VAR: &str = "QUIZ_API_BASE_URL";
pub const TIMEOUT_VAR: &str = "QUIZ_API_TIMEOUT_SECS";

/// Read client settings from the environment.
///
/// Unset or unparsable values are left as `None` so `validate` applies defaults
/// and command-line flags can still override them.
#[must_use]
pub fn settings_draft_from_env() -> ClientSettingsDraft {
    ClientSettingsDraft {
        base_url: env::var(BASE_URL_VAR).ok(),
        timeout_secs: env::var(TIMEOUT_VAR)
            .ok()
            .and_then(|raw| raw.trim().parse().ok()),
    }
}
