//! Chrome-style `_locales/<code>/messages.json` trees and their conversion
//! to flat `<code>.properties` files for platforms that need them.

use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::assemble::plan::{FIREFOX_LOCALE_DIR, LOCALES_DIR};
use crate::config::LocalesConfig;
use crate::error::{BuildError, IoContext, Result};

pub const MESSAGES_FILE: &str = "messages.json";
pub const PROPERTIES_EXTENSION: &str = "properties";

/// Message ids whose text carries the extension's display name.
const NAME_MESSAGE_IDS: [&str; 2] = ["name", "short_name"];

/// Messages of one locale, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocaleMessages {
    records: Map<String, Value>,
}

impl LocaleMessages {
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        Ok(Self {
            records: serde_json::from_str(raw)?,
        })
    }

    /// Parses `id=value` lines as written by [`Self::to_properties`].
    pub fn from_properties(raw: &str) -> Self {
        let mut records = Map::new();
        for line in raw.lines() {
            if let Some((id, text)) = line.split_once('=') {
                let text = text.replace("\\n", "\n");
                records.insert(id.to_string(), serde_json::json!({ "message": text }));
            }
        }
        Self { records }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).at(path)?;
        Self::from_json(&raw).map_err(|source| BuildError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn message(&self, id: &str) -> Option<&str> {
        self.records.get(id)?.get("message")?.as_str()
    }

    /// `(id, message)` pairs, skipping records without a message.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.records
            .iter()
            .filter_map(|(id, record)| Some((id.as_str(), record.get("message")?.as_str()?)))
    }

    /// `id=value` lines covering every id of `base`, falling back to the
    /// base text where this locale has none.
    pub fn to_properties(&self, base: &LocaleMessages) -> String {
        let mut out = String::new();
        for (id, base_text) in base.iter() {
            let text = self.message(id).unwrap_or(base_text);
            out.push_str(id);
            out.push('=');
            out.push_str(&text.replace('\n', "\\n"));
            out.push('\n');
        }
        out
    }
}

/// `pt_BR` -> `pt-BR.properties`
pub fn properties_file_name(code: &str) -> String {
    format!("{}.{PROPERTIES_EXTENSION}", code.replace('_', "-"))
}

/// Result of one conversion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertedLocales {
    pub written: Vec<PathBuf>,
    pub pruned: Vec<String>,
}

pub struct LocaleConverter {
    config: LocalesConfig,
}

impl LocaleConverter {
    pub fn new(config: LocalesConfig) -> Self {
        Self { config }
    }

    /// Replaces every `<code>/messages.json` directory under `locale_dir`
    /// with a `<code>.properties` file. Unsupported locales are deleted.
    ///
    /// Output is rendered into a staging directory first; source
    /// directories are only removed once every locale converted. The
    /// sources are consumed, so a second run fails with `NotFound`.
    pub fn convert(&self, locale_dir: &Path) -> Result<ConvertedLocales> {
        if !locale_dir.is_dir() {
            return Err(BuildError::io(
                locale_dir,
                io::Error::new(io::ErrorKind::NotFound, "locale directory not found"),
            ));
        }
        let codes = locale_codes(locale_dir)?;
        let base_path = locale_dir.join(&self.config.base_locale).join(MESSAGES_FILE);
        let base = LocaleMessages::read(&base_path)?;

        let staging = tempfile::Builder::new()
            .prefix(".converted-")
            .tempdir_in(locale_dir)
            .at(locale_dir)?;

        let mut result = ConvertedLocales::default();
        let mut staged = Vec::new();
        for code in &codes {
            if !self.config.is_supported(code) {
                result.pruned.push(code.clone());
                continue;
            }
            let messages = if code.eq_ignore_ascii_case(&self.config.base_locale) {
                base.clone()
            } else {
                LocaleMessages::read(&locale_dir.join(code).join(MESSAGES_FILE))?
            };
            let name = properties_file_name(code);
            let path = staging.path().join(&name);
            fs::write(&path, messages.to_properties(&base)).at(&path)?;
            debug!("converted locale {code}");
            staged.push(name);
        }

        for code in &codes {
            let dir = locale_dir.join(code);
            fs::remove_dir_all(&dir).at(&dir)?;
        }
        for code in &result.pruned {
            warn!("pruned unsupported locale {code}");
        }
        for name in staged {
            let to = locale_dir.join(&name);
            let from = staging.path().join(&name);
            fs::rename(&from, &to).at(&to)?;
            result.written.push(to);
        }
        let staging_path = staging.path().to_path_buf();
        staging.close().at(&staging_path)?;

        info!(
            written = result.written.len(),
            pruned = result.pruned.len(),
            "locales converted in {}",
            locale_dir.display()
        );
        Ok(result)
    }
}

/// Visible subdirectory names, sorted.
fn locale_codes(locale_dir: &Path) -> Result<Vec<String>> {
    let mut codes = Vec::new();
    for entry in fs::read_dir(locale_dir).at(locale_dir)? {
        let entry = entry.at(locale_dir)?;
        if !entry.file_type().at(&entry.path())?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with('.') {
            codes.push(name);
        }
    }
    codes.sort();
    Ok(codes)
}

/// Display name and description of one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleSummary {
    pub code: String,
    pub name: String,
    pub description: String,
}

/// Summaries of every supported locale present in `build_dir`, in
/// allowlist order. Converted `locale/<code>.properties` files win over
/// `_locales/<code>/messages.json`; locales with neither are skipped.
/// Messages a locale lacks fall back to the base locale.
pub fn locale_summaries(build_dir: &Path, config: &LocalesConfig) -> Result<Vec<LocaleSummary>> {
    let base = read_summary_source(build_dir, &config.base_locale)?;
    let mut summaries = Vec::new();
    for code in &config.supported {
        let Some((path, doc)) = read_summary_source(build_dir, code)? else {
            debug!("no messages for locale {code}");
            continue;
        };
        let base_doc = base.as_ref().map(|(_, doc)| doc);
        let name = doc
            .message("name")
            .or_else(|| base_doc?.message("name"))
            .ok_or_else(|| BuildError::MalformedDescriptor {
                path: path.clone(),
                reason: "no `name` message".into(),
            })?;
        let description = doc
            .message("description")
            .or_else(|| base_doc?.message("description"))
            .unwrap_or_default();
        summaries.push(LocaleSummary {
            code: code.clone(),
            name: name.to_string(),
            description: description.to_string(),
        });
    }
    Ok(summaries)
}

fn read_summary_source(build_dir: &Path, code: &str) -> Result<Option<(PathBuf, LocaleMessages)>> {
    let properties = build_dir
        .join(FIREFOX_LOCALE_DIR)
        .join(properties_file_name(code));
    if properties.is_file() {
        let raw = fs::read_to_string(&properties).at(&properties)?;
        return Ok(Some((properties, LocaleMessages::from_properties(&raw))));
    }
    let messages = build_dir.join(LOCALES_DIR).join(code).join(MESSAGES_FILE);
    if messages.is_file() {
        let doc = LocaleMessages::read(&messages)?;
        return Ok(Some((messages, doc)));
    }
    Ok(None)
}

/// Appends `postfix` to the `name` and `short_name` messages only.
pub fn rename_postfix(messages: &mut Value, postfix: &str) {
    if postfix.is_empty() {
        return;
    }
    for id in NAME_MESSAGE_IDS {
        if let Some(Value::String(text)) = messages.get_mut(id).and_then(|r| r.get_mut("message"))
        {
            text.push_str(postfix);
        }
    }
}

/// Applies [`rename_postfix`] to every `<code>/messages.json` under
/// `locales_dir`. Returns the number of documents rewritten.
pub fn rename_postfix_in_dir(locales_dir: &Path, postfix: &str) -> Result<usize> {
    if postfix.is_empty() {
        return Ok(0);
    }
    let mut rewritten = 0;
    for code in locale_codes(locales_dir)? {
        let path = locales_dir.join(code).join(MESSAGES_FILE);
        if !path.is_file() {
            continue;
        }
        let raw = fs::read_to_string(&path).at(&path)?;
        let mut doc: Value = serde_json::from_str(&raw).map_err(|source| BuildError::Json {
            path: path.clone(),
            source,
        })?;
        rename_postfix(&mut doc, postfix);
        let out = serde_json::to_string_pretty(&doc).map_err(|source| BuildError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, out).at(&path)?;
        rewritten += 1;
    }
    Ok(rewritten)
}
