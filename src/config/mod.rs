//! Build configuration.
//!
//! Defaults are embedded from `defaults.toml` and parsed once. Components
//! never read them directly: callers build a [`ToolConfig`] (usually
//! `ToolConfig::default()`) and pass the relevant part down.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs, time::Duration};

use crate::browser::{Branch, Browser, BrowserGroup, PackMethod};
use crate::error::{BuildError, Result};

const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Overrides [`FiltersConfig::server_url`].
pub const ENV_FILTERS_URL: &str = "EXTPACK_FILTERS_URL";
/// Overrides [`FiltersConfig::user_agent`].
pub const ENV_USER_AGENT: &str = "EXTPACK_USER_AGENT";

pub const SAFARI_BUNDLE_EXTENSION: &str = "safariextension";

static DEFAULTS: Lazy<ToolConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("embedded defaults.toml is valid")
});

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    pub filters: FiltersConfig,
    pub locales: LocalesConfig,
}

/// Remote filter server and the filter ids to ship.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FiltersConfig {
    pub server_url: String,
    pub user_agent: String,
    pub max_filter_id: u32,
    #[serde(default)]
    pub retired_filter_ids: Vec<u32>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Filter that Safari builds re-download with [`Self::safari_user_agent`];
    /// the server answers a Safari client with a Safari-specific variant.
    #[serde(default = "default_english_filter_id")]
    pub english_filter_id: u32,
    #[serde(default = "default_safari_user_agent")]
    pub safari_user_agent: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LocalesConfig {
    /// Authority for the full message key set.
    pub base_locale: String,
    pub supported: Vec<String>,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_english_filter_id() -> u32 {
    2
}

fn default_safari_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_9_4) AppleWebKit/537.78.2 \
     (KHTML, like Gecko) Version/7.0.6 Safari/537.78.2"
        .to_string()
}

impl Default for ToolConfig {
    fn default() -> Self {
        DEFAULTS.clone()
    }
}

impl ToolConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| BuildError::Config(format!("invalid config: {e}")))
    }

    /// Applies `EXTPACK_FILTERS_URL` / `EXTPACK_USER_AGENT` when set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = env::var(ENV_FILTERS_URL) {
            if !url.trim().is_empty() {
                self.filters.server_url = url;
            }
        }
        if let Ok(ua) = env::var(ENV_USER_AGENT) {
            if !ua.trim().is_empty() {
                self.filters.user_agent = ua;
            }
        }
        self
    }
}

impl FiltersConfig {
    /// `1..=max_filter_id`, skipping retired ids.
    pub fn filter_ids(&self) -> Vec<u32> {
        (1..=self.max_filter_id)
            .filter(|id| !self.retired_filter_ids.contains(id))
            .collect()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn group_url(&self, group: BrowserGroup) -> String {
        format!(
            "{}/extension/{}",
            self.server_url.trim_end_matches('/'),
            group.name()
        )
    }

    pub fn metadata_url(&self, group: BrowserGroup) -> String {
        format!("{}/filters.json", self.group_url(group))
    }

    pub fn i18n_metadata_url(&self, group: BrowserGroup) -> String {
        format!("{}/filters_i18n.json", self.group_url(group))
    }

    pub fn filter_url(&self, group: BrowserGroup, filter_id: u32) -> String {
        format!("{}/filters/{filter_id}.txt", self.group_url(group))
    }

    pub fn optimized_filter_url(&self, group: BrowserGroup, filter_id: u32) -> String {
        format!("{}/filters/{filter_id}_optimized.txt", self.group_url(group))
    }
}

impl LocalesConfig {
    /// Case-insensitive, so `zh_cn` matches `zh_CN`.
    pub fn is_supported(&self, code: &str) -> bool {
        self.supported.iter().any(|s| s.eq_ignore_ascii_case(code))
    }
}

/// Everything one build invocation needs to know.
#[derive(Debug, Clone)]
pub struct BuildSettings {
    pub browser: Browser,
    pub version: String,
    pub branch: Branch,
    pub extension_id: Option<String>,
    pub update_url: Option<String>,
    pub allow_remote_scripts: bool,
    /// Reduced-surface embeddable variant (Chromium family only).
    pub api_only: bool,
    pub refresh_filters: bool,
    pub pack_method: Option<PackMethod>,
    pub source_dir: PathBuf,
    pub dest_dir: PathBuf,
}

impl BuildSettings {
    pub fn new(
        browser: Browser,
        version: impl Into<String>,
        source_dir: impl Into<PathBuf>,
        dest_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            browser,
            version: version.into(),
            branch: Branch::default(),
            extension_id: None,
            update_url: None,
            allow_remote_scripts: false,
            api_only: false,
            refresh_filters: false,
            pack_method: None,
            source_dir: source_dir.into(),
            dest_dir: dest_dir.into(),
        }
    }

    /// Rejects inconsistent settings before anything touches the filesystem.
    pub fn validate(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            return Err(BuildError::Config("version is required".into()));
        }
        let has_id = self
            .extension_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty());
        if self.browser.requires_extension_id() && !has_id {
            return Err(BuildError::Config(format!(
                "extension id is required for {}",
                self.browser
            )));
        }
        if let Some(method) = self.pack_method {
            if !self.browser.supports_pack_method(method) {
                return Err(BuildError::Config(format!(
                    "pack method {} is not supported for {}",
                    method.script_name(),
                    self.browser
                )));
            }
        }
        if self.api_only && !self.browser.is_chromium_family() {
            return Err(BuildError::Config(format!(
                "API-only builds are not available for {}",
                self.browser
            )));
        }
        // The destination is wiped before assembly.
        let source = resolved(&self.source_dir);
        let dest = resolved(&self.build_dir());
        if source.starts_with(&dest) {
            return Err(BuildError::Config(format!(
                "destination {} contains the source tree {}",
                dest.display(),
                source.display()
            )));
        }
        Ok(())
    }

    /// Directory the tree is assembled into: `dest_dir`, with the
    /// `.safariextension` suffix Safari expects on extension bundles.
    pub fn build_dir(&self) -> PathBuf {
        let has_suffix = self
            .dest_dir
            .extension()
            .is_some_and(|ext| ext == SAFARI_BUNDLE_EXTENSION);
        if self.browser != Browser::Safari || has_suffix {
            return self.dest_dir.clone();
        }
        let mut name = self.dest_dir.clone().into_os_string();
        name.push(".");
        name.push(SAFARI_BUNDLE_EXTENSION);
        PathBuf::from(name)
    }

    pub fn name_postfix(&self) -> &'static str {
        crate::browser::name_postfix(self.browser, self.branch, self.allow_remote_scripts)
    }

    /// `<browser>-<branch>-<version>.<ext>`
    pub fn artifact_name(&self, method: PackMethod) -> String {
        format!(
            "{}-{}-{}.{}",
            self.browser,
            self.branch,
            self.version,
            method.extension()
        )
    }
}

/// Absolute form of `path`, canonical as far as it exists.
fn resolved(path: &Path) -> PathBuf {
    if let Ok(canonical) = fs::canonicalize(path) {
        return canonical;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
            resolved(parent).join(name)
        }
        _ => env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf()),
    }
}
