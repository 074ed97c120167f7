mod common;

use common::EnvGuard;
use extension_packager::config::{ENV_FILTERS_URL, ENV_USER_AGENT};
use extension_packager::{BrowserGroup, BuildError, ToolConfig};
use serial_test::serial;
use std::time::Duration;

#[test]
#[serial]
fn env_overrides_server_and_user_agent() {
    let _g = EnvGuard::set(&[
        (ENV_FILTERS_URL, "http://127.0.0.1:8080/".to_string()),
        (ENV_USER_AGENT, "packager-ci/1.0".to_string()),
    ]);
    let cfg = ToolConfig::default().with_env_overrides();
    assert_eq!(cfg.filters.user_agent, "packager-ci/1.0");
    assert_eq!(
        cfg.filters.metadata_url(BrowserGroup::Safari),
        "http://127.0.0.1:8080/extension/safari/filters.json"
    );
}

#[test]
#[serial]
fn blank_env_values_are_ignored() {
    let _g = EnvGuard::set(&[
        (ENV_FILTERS_URL, "  ".to_string()),
        (ENV_USER_AGENT, String::new()),
    ]);
    assert_eq!(ToolConfig::default().with_env_overrides(), ToolConfig::default());
}

#[test]
#[serial]
fn defaults_without_env() {
    let _g = EnvGuard::set(&[(ENV_FILTERS_URL, "http://unused".to_string())]);
    std::env::remove_var(ENV_FILTERS_URL);
    let cfg = ToolConfig::default().with_env_overrides();
    assert_eq!(cfg.filters.server_url, "https://filters.adtidy.org");
    assert_eq!(cfg.filters.timeout(), Duration::from_secs(30));
}

#[test]
fn toml_config_fills_optional_fields() {
    let cfg = ToolConfig::from_toml_str(
        r#"
[filters]
server_url = "https://mirror.example.org"
user_agent = "mirror"
max_filter_id = 3

[locales]
base_locale = "en"
supported = ["en", "de"]
"#,
    )
    .expect("parse");
    assert_eq!(cfg.filters.filter_ids(), vec![1, 2, 3]);
    assert_eq!(cfg.filters.timeout_secs, 30);
    assert!(cfg.locales.is_supported("de"));
    assert!(!cfg.locales.is_supported("pt_BR"));
}

#[test]
fn invalid_toml_is_a_config_error() {
    let err = ToolConfig::from_toml_str("[filters]\nmax_filter_id = \"many\"").unwrap_err();
    assert!(matches!(err, BuildError::Config(_)));
}
