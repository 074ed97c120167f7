use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::checksum::validate_checksum;
use super::script_rules::{build_script_rule_set, LOCAL_SCRIPT_RULES_FILE};
use super::transport::Transport;
use super::{
    filter_file_name, filters_dir, optimized_filter_file_name, I18N_METADATA_FILE,
    METADATA_FILE,
};
use crate::browser::BrowserGroup;
use crate::config::FiltersConfig;
use crate::error::{BuildError, IoContext, Result};

/// Rule-list text of one filter id. The server publishes both variants
/// for every id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRules {
    pub standard: String,
    pub optimized: String,
}

/// Filters of one browser group, keyed by filter id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRuleSet {
    pub group: BrowserGroup,
    pub filters: BTreeMap<u32, FilterRules>,
}

/// Raw `filters.json` / `filters_i18n.json`. Metadata carries no checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterMetadata {
    pub filters: String,
    pub filters_i18n: String,
}

/// Downloads filter lists into `<filters_root>/<group>`.
pub struct FilterFetcher<T> {
    transport: T,
    config: FiltersConfig,
    filters_root: PathBuf,
}

impl<T: Transport> FilterFetcher<T> {
    pub fn new(transport: T, config: FiltersConfig, filters_root: impl Into<PathBuf>) -> Self {
        Self {
            transport,
            config,
            filters_root: filters_root.into(),
        }
    }

    pub fn config(&self) -> &FiltersConfig {
        &self.config
    }

    pub fn group_dir(&self, group: BrowserGroup) -> PathBuf {
        filters_dir(&self.filters_root, group)
    }

    /// Downloads and checksums every filter of `group`, then commits them to
    /// the group directory. Nothing is committed unless every download
    /// validated; the staging directory is removed on every exit path.
    pub fn fetch_all(&self, group: BrowserGroup) -> Result<FilterRuleSet> {
        let dest = self.group_dir(group);
        fs::create_dir_all(&dest).at(&dest)?;
        let staging = tempfile::Builder::new()
            .prefix(".staging-")
            .tempdir_in(&self.filters_root)
            .at(&self.filters_root)?;

        let mut filters = BTreeMap::new();
        for id in self.config.filter_ids() {
            let standard = self.download_checked(&self.config.filter_url(group, id))?;
            write_text(staging.path(), &filter_file_name(id), &standard)?;

            let optimized =
                self.download_checked(&self.config.optimized_filter_url(group, id))?;
            write_text(staging.path(), &optimized_filter_file_name(id), &optimized)?;

            filters.insert(
                id,
                FilterRules {
                    standard,
                    optimized,
                },
            );
        }

        commit(staging.path(), &dest)?;
        let staging_path = staging.path().to_path_buf();
        staging.close().at(&staging_path)?;
        info!(group = %group, count = filters.len(), "filters committed to {}", dest.display());

        Ok(FilterRuleSet { group, filters })
    }

    pub fn fetch_metadata(&self, group: BrowserGroup) -> Result<FilterMetadata> {
        Ok(FilterMetadata {
            filters: self.download_json(&self.config.metadata_url(group))?,
            filters_i18n: self.download_json(&self.config.i18n_metadata_url(group))?,
        })
    }

    /// Metadata, filter lists and, for groups that need it, the prebuilt
    /// script rule allowlist.
    pub fn refresh(&self, group: BrowserGroup) -> Result<FilterRuleSet> {
        let metadata = self.fetch_metadata(group)?;
        let set = self.fetch_all(group)?;

        let dest = self.group_dir(group);
        write_text(&dest, METADATA_FILE, &metadata.filters)?;
        write_text(&dest, I18N_METADATA_FILE, &metadata.filters_i18n)?;

        if group.ships_local_script_rules() {
            let ids: Vec<u32> = set.filters.keys().copied().collect();
            let rules = build_script_rule_set(&dest, &ids)?;
            let path = dest.join(LOCAL_SCRIPT_RULES_FILE);
            let json = rules
                .to_json()
                .map_err(|source| BuildError::Json { path, source })?;
            write_text(&dest, LOCAL_SCRIPT_RULES_FILE, &json)?;
            info!(group = %group, rules = rules.len(), "local script rules updated");
        }
        Ok(set)
    }

    /// Re-downloads the English filter as a Safari client into
    /// `filters_dir`, replacing the group variant assembled there.
    pub fn fetch_safari_english_filter(&self, filters_dir: &Path) -> Result<PathBuf> {
        let id = self.config.english_filter_id;
        let url = self.config.filter_url(BrowserGroup::Safari, id);
        debug!("downloading {url} as safari");
        let body = self
            .transport
            .get_text_as(&url, &self.config.safari_user_agent)?;
        validate_checksum(&url, &body)?;

        fs::create_dir_all(filters_dir).at(filters_dir)?;
        let name = filter_file_name(id);
        write_text(filters_dir, &name, &body)?;
        info!(filter = id, "safari english filter written to {}", filters_dir.display());
        Ok(filters_dir.join(name))
    }

    fn download_checked(&self, url: &str) -> Result<String> {
        debug!("downloading {url}");
        let body = self.transport.get_text(url)?;
        validate_checksum(url, &body)?;
        Ok(body)
    }

    fn download_json(&self, url: &str) -> Result<String> {
        debug!("downloading {url}");
        let body = self.transport.get_text(url)?;
        serde_json::from_str::<serde_json::Value>(&body).map_err(|e| BuildError::Transport {
            url: url.to_string(),
            message: format!("invalid JSON: {e}"),
        })?;
        Ok(body)
    }
}

fn write_text(dir: &Path, name: &str, text: &str) -> Result<()> {
    let path = dir.join(name);
    fs::write(&path, text).at(&path)
}

fn commit(staging: &Path, dest: &Path) -> Result<()> {
    for entry in fs::read_dir(staging).at(staging)? {
        let from = entry.at(staging)?.path();
        if let Some(name) = from.file_name() {
            let to = dest.join(name);
            fs::copy(&from, &to).at(&to)?;
        }
    }
    Ok(())
}
