#![allow(dead_code)]

use std::sync::OnceLock;

use flick_common::observability::{LogConfig, LogFormat};
use flick_search::SearchSettings;
use url::Url;
use wiremock::MockServer;

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "flickfinder-tests",
            emit_stderr: true,
            format: if std::env::var("FLICK_LOG_FORMAT")
                .map(|raw| raw.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false)
            {
                LogFormat::Json
            } else {
                LogFormat::Text
            },
            default_filter: "debug".to_string(),
            ..LogConfig::default()
        };

        flick_common::observability::init_logging(config).unwrap_or_default()
    });
}

/// Settings whose endpoint is the mock server's `/services/rest`.
pub fn settings_for(server: &MockServer) -> SearchSettings {
    let mut settings = SearchSettings::new("test-key");
    settings.endpoint = Url::parse(&format!("{}/services/rest", server.uri())).unwrap();
    settings
}
