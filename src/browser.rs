use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BuildError;

/// Target browser of one build.
///
/// The set is closed, so per-browser behavior lives in `match` tables
/// (`group`, the assembly plan, the manifest descriptors) rather than traits.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Browser {
    #[serde(rename = "chrome")]
    Chromium,
    Opera,
    Edge,
    Safari,
    FirefoxLegacy,
    #[serde(rename = "firefox")]
    FirefoxWebExt,
}

/// Shared filter-rule classification of a browser.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum BrowserGroup {
    Chromium,
    Safari,
    Firefox,
}

/// Release channel of a build.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    #[default]
    Dev,
    Beta,
    Release,
}

/// Archive format produced by the external packaging scripts.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PackMethod {
    Zip,
    Crx,
    Xpi,
    Extz,
}

impl Browser {
    pub const ALL: [Browser; 6] = [
        Browser::Chromium,
        Browser::Opera,
        Browser::Edge,
        Browser::Safari,
        Browser::FirefoxLegacy,
        Browser::FirefoxWebExt,
    ];

    /// Canonical name, stable across builds.
    pub fn name(self) -> &'static str {
        match self {
            Browser::Chromium => "chrome",
            Browser::Opera => "opera",
            Browser::Edge => "edge",
            Browser::Safari => "safari",
            Browser::FirefoxLegacy => "firefox_legacy",
            Browser::FirefoxWebExt => "firefox",
        }
    }

    pub fn group(self) -> BrowserGroup {
        match self {
            Browser::Chromium | Browser::Opera | Browser::Edge => BrowserGroup::Chromium,
            Browser::Safari => BrowserGroup::Safari,
            Browser::FirefoxLegacy | Browser::FirefoxWebExt => BrowserGroup::Firefox,
        }
    }

    pub fn is_chromium_family(self) -> bool {
        matches!(self, Browser::Chromium | Browser::Opera | Browser::Edge)
    }

    /// Safari and Firefox targets cannot be built without an extension id.
    pub fn requires_extension_id(self) -> bool {
        matches!(
            self,
            Browser::Safari | Browser::FirefoxLegacy | Browser::FirefoxWebExt
        )
    }

    pub fn supports_pack_method(self, method: PackMethod) -> bool {
        match self {
            Browser::Chromium | Browser::Opera | Browser::Edge => {
                matches!(method, PackMethod::Zip | PackMethod::Crx)
            }
            Browser::Safari => method == PackMethod::Extz,
            Browser::FirefoxLegacy => method == PackMethod::Xpi,
            Browser::FirefoxWebExt => matches!(method, PackMethod::Xpi | PackMethod::Zip),
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Browser {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Browser::ALL
            .into_iter()
            .find(|b| b.name() == s)
            .ok_or_else(|| BuildError::Config(format!("unknown browser: {s}")))
    }
}

impl BrowserGroup {
    /// Directory / URL segment for this group.
    pub fn name(self) -> &'static str {
        match self {
            BrowserGroup::Chromium => "chromium",
            BrowserGroup::Safari => "safari",
            BrowserGroup::Firefox => "firefox",
        }
    }

    /// Firefox store review forbids remote scripts, so its filters ship with
    /// a prebuilt allowlist of script rules.
    pub fn ships_local_script_rules(self) -> bool {
        self == BrowserGroup::Firefox
    }
}

impl fmt::Display for BrowserGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Branch {
    pub fn name(self) -> &'static str {
        match self {
            Branch::Dev => "dev",
            Branch::Beta => "beta",
            Branch::Release => "release",
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Branch {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" => Ok(Branch::Dev),
            "beta" => Ok(Branch::Beta),
            "release" => Ok(Branch::Release),
            other => Err(BuildError::Config(format!("unknown branch: {other}"))),
        }
    }
}

impl PackMethod {
    pub fn extension(self) -> &'static str {
        match self {
            PackMethod::Zip => "zip",
            PackMethod::Crx => "crx",
            PackMethod::Xpi => "xpi",
            PackMethod::Extz => "safariextz",
        }
    }

    /// Name of the packaging script, without its `.sh` suffix.
    pub fn script_name(self) -> &'static str {
        match self {
            PackMethod::Zip => "zip",
            PackMethod::Crx => "crx",
            PackMethod::Xpi => "xpi",
            PackMethod::Extz => "extz",
        }
    }
}

impl FromStr for PackMethod {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zip" => Ok(PackMethod::Zip),
            "crx" => Ok(PackMethod::Crx),
            "xpi" => Ok(PackMethod::Xpi),
            "extz" => Ok(PackMethod::Extz),
            other => Err(BuildError::Config(format!("unknown pack method: {other}"))),
        }
    }
}

/// Human-readable suffix appended to the extension's display name.
pub fn name_postfix(browser: Browser, branch: Branch, allow_remote_scripts: bool) -> &'static str {
    match (browser, branch) {
        (Browser::FirefoxLegacy, Branch::Dev) => " (Legacy Dev)",
        (Browser::FirefoxLegacy, Branch::Beta) => " (Legacy Beta)",
        (Browser::FirefoxLegacy, Branch::Release) => " (Legacy)",
        (Browser::FirefoxWebExt, Branch::Dev) if allow_remote_scripts => " (Standalone Dev)",
        (Browser::FirefoxWebExt, Branch::Beta) if allow_remote_scripts => " (Standalone Beta)",
        (Browser::FirefoxWebExt, Branch::Release) if allow_remote_scripts => " (Standalone)",
        (_, Branch::Dev) => " (Dev)",
        (_, Branch::Beta) => " (Beta)",
        (_, Branch::Release) => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_browser_round_trips_through_its_name() {
        for b in Browser::ALL {
            assert_eq!(b.name().parse::<Browser>().unwrap(), b);
        }
    }

    #[test]
    fn unknown_browser_is_a_config_error() {
        let err = "netscape".parse::<Browser>().unwrap_err();
        assert!(matches!(err, BuildError::Config(_)));
    }

    #[test]
    fn groups_are_derived_from_the_variant() {
        assert_eq!(Browser::Opera.group(), BrowserGroup::Chromium);
        assert_eq!(Browser::Edge.group(), BrowserGroup::Chromium);
        assert_eq!(Browser::Safari.group(), BrowserGroup::Safari);
        assert_eq!(Browser::FirefoxWebExt.group(), BrowserGroup::Firefox);
        assert_eq!(Browser::FirefoxLegacy.group(), BrowserGroup::Firefox);
    }

    #[test]
    fn serde_uses_canonical_names() {
        for b in Browser::ALL {
            let json = serde_json::to_string(&b).unwrap();
            assert_eq!(json, format!("\"{}\"", b.name()));
        }
    }

    #[test]
    fn postfix_table() {
        assert_eq!(name_postfix(Browser::Chromium, Branch::Beta, false), " (Beta)");
        assert_eq!(name_postfix(Browser::Chromium, Branch::Release, false), "");
        assert_eq!(name_postfix(Browser::Safari, Branch::Dev, false), " (Dev)");
        assert_eq!(name_postfix(Browser::FirefoxLegacy, Branch::Release, false), " (Legacy)");
        assert_eq!(
            name_postfix(Browser::FirefoxWebExt, Branch::Dev, true),
            " (Standalone Dev)"
        );
        assert_eq!(name_postfix(Browser::FirefoxWebExt, Branch::Dev, false), " (Dev)");
        assert_eq!(name_postfix(Browser::FirefoxWebExt, Branch::Release, false), "");
    }
}
