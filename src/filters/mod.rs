//! Remote filter lists: download, checksum, commit, and script-rule
//! extraction.

pub mod checksum;
pub mod fetch;
pub mod script_rules;
pub mod transport;

pub use checksum::{add_checksum, calculate_checksum, validate_checksum};
pub use fetch::{FilterFetcher, FilterMetadata, FilterRuleSet, FilterRules};
pub use script_rules::{build_script_rule_set, ScriptRule, ScriptRules};
pub use transport::Transport;

#[cfg(feature = "http")]
pub use transport::HttpTransport;

use std::path::{Path, PathBuf};

use crate::browser::BrowserGroup;

pub const METADATA_FILE: &str = "filters.json";
pub const I18N_METADATA_FILE: &str = "filters_i18n.json";

/// `<filters_root>/<group>`.
pub fn filters_dir(filters_root: &Path, group: BrowserGroup) -> PathBuf {
    filters_root.join(group.name())
}

pub fn filter_file_name(filter_id: u32) -> String {
    format!("filter_{filter_id}.txt")
}

pub fn optimized_filter_file_name(filter_id: u32) -> String {
    format!("filter_mobile_{filter_id}.txt")
}

/// Runs [`FilterFetcher::refresh`] on the blocking pool.
#[cfg(feature = "tokio")]
pub async fn refresh_async<T>(fetcher: FilterFetcher<T>, group: BrowserGroup) -> crate::Result<FilterRuleSet>
where
    T: Transport + Send + 'static,
{
    tokio::task::spawn_blocking(move || fetcher.refresh(group))
        .await
        .map_err(|e| crate::BuildError::Task(e.to_string()))?
}
