//! Script-injection rules (`domain#%#script`) extracted from filter lists.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::error::{IoContext, Result};

pub const SCRIPT_MARKER: &str = "#%#";
pub const COMMENT_MARKER: char = '!';
/// Domain of a rule that applies everywhere.
pub const ANY_DOMAIN: &str = "<any>";

pub const LOCAL_SCRIPT_RULES_FILE: &str = "local_script_rules.json";

const LOCAL_SCRIPT_RULES_COMMENT: &str = "Store review does not allow remote scripts, and \
script rules count as such. The rules below are prebuilt from the bundled filters; at runtime \
only script rules listed here (plus user rules) are executed.";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScriptRule {
    pub domains: String,
    pub script: String,
}

impl ScriptRule {
    /// Splits at the first marker; `None` if `line` is not a script rule.
    pub fn parse(line: &str) -> Option<Self> {
        let (domains, script) = line.split_once(SCRIPT_MARKER)?;
        let domains = if domains.is_empty() {
            ANY_DOMAIN.to_string()
        } else {
            domains.to_string()
        };
        Some(Self {
            domains,
            script: script.to_string(),
        })
    }
}

/// Deduplicated script rules, serialized in a stable (sorted) order.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptRules {
    pub comment: String,
    pub rules: Vec<ScriptRule>,
}

impl ScriptRules {
    pub fn from_lines<'a, I>(lines: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut raw = BTreeSet::new();
        collect_script_lines(lines, &mut raw);
        Self::from_raw(raw)
    }

    fn from_raw(raw: BTreeSet<String>) -> Self {
        Self {
            comment: LOCAL_SCRIPT_RULES_COMMENT.to_string(),
            rules: raw.iter().filter_map(|line| ScriptRule::parse(line)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn collect_script_lines<'a, I>(lines: I, into: &mut BTreeSet<String>)
where
    I: IntoIterator<Item = &'a str>,
{
    for line in lines {
        let line = line.trim();
        if line.starts_with(COMMENT_MARKER) || !line.contains(SCRIPT_MARKER) {
            continue;
        }
        into.insert(line.to_string());
    }
}

/// Reads `filter_<id>.txt` for every id in `filter_dir` and collects the
/// script rules across all of them.
pub fn build_script_rule_set(filter_dir: &Path, filter_ids: &[u32]) -> Result<ScriptRules> {
    let mut raw = BTreeSet::new();
    for id in filter_ids {
        let path = filter_dir.join(super::filter_file_name(*id));
        let text = fs::read_to_string(&path).at(&path)?;
        collect_script_lines(text.lines(), &mut raw);
    }
    Ok(ScriptRules::from_raw(raw))
}
