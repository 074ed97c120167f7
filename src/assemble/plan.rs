//! Which source layers a browser's tree is built from, and in what order.
//!
//! Later copies overwrite earlier ones, so the order of [`Step`]s is part of
//! the contract: base layer, browser layer, overlays, then the common layer.

use std::path::PathBuf;

use crate::browser::Browser;

pub const WEBKIT_LAYER: &str = "browser/webkit";
pub const CHROME_LAYER: &str = "browser/chrome";
pub const EDGE_LAYER: &str = "browser/edge";
pub const SAFARI_LAYER: &str = "browser/safari";
pub const FIREFOX_LEGACY_LAYER: &str = "browser/firefox";
pub const FIREFOX_WEBEXT_LAYER: &str = "browser/firefox_webext";
pub const API_LAYER: &str = "api";

pub const FILTERS_DIR: &str = "filters";
pub const LOCALES_DIR: &str = "_locales";
pub const PAGES_DIR: &str = "pages";
pub const LIB_DIR: &str = "lib";

/// Where the legacy Firefox add-on expects its `.properties` files.
pub const FIREFOX_LOCALE_DIR: &str = "locale";
const FONTS_CSS: &str = "pages/skin/fonts.css";
const FIREFOX_FONTS_CSS: &str = "pages/skin/firefox-fonts.css";
const FONTS_DIR: &str = "pages/skin/fonts";

/// Removed from API-only builds.
const API_ONLY_REMOVALS: [&str; 4] = [LOCALES_DIR, PAGES_DIR, "icons", "devtools"];

/// Paths in `Copy` are relative to the source root; all
/// others are relative to the destination root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Copy { from: PathBuf, to: PathBuf },
    /// Render every `.html` file under this directory with `browser` bound.
    /// Runs once every layer and overlay is in place.
    Render(PathBuf),
    /// Move `from` onto `to`, replacing it.
    Replace { from: PathBuf, to: PathBuf },
    Remove(PathBuf),
    /// Convert `dir` to `.properties` files, then move it to `relocate_to`.
    ConvertLocales { dir: PathBuf, relocate_to: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyPlan {
    pub browser: Browser,
    pub steps: Vec<Step>,
}

fn copy(from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Step {
    Step::Copy {
        from: from.into(),
        to: to.into(),
    }
}

fn root_layer(from: &str) -> Step {
    copy(from, "")
}

fn common_layer(browser: Browser, steps: &mut Vec<Step>) {
    steps.push(copy(
        PathBuf::from(FILTERS_DIR).join(browser.group().name()),
        FILTERS_DIR,
    ));
    steps.push(copy(LOCALES_DIR, LOCALES_DIR));
    steps.push(copy(PAGES_DIR, PAGES_DIR));
    steps.push(copy(LIB_DIR, LIB_DIR));
}

fn chromium_layers(browser: Browser, steps: &mut Vec<Step>) {
    steps.push(root_layer(WEBKIT_LAYER));
    steps.push(root_layer(CHROME_LAYER));
    if browser == Browser::Edge {
        steps.push(root_layer(EDGE_LAYER));
    }
    common_layer(browser, steps);
}

/// Pure function of its inputs.
pub fn assembly_plan(browser: Browser, api_only: bool) -> AssemblyPlan {
    let mut steps = Vec::new();
    match browser {
        Browser::Chromium | Browser::Opera | Browser::Edge => chromium_layers(browser, &mut steps),
        Browser::Safari => {
            steps.push(root_layer(WEBKIT_LAYER));
            steps.push(root_layer(SAFARI_LAYER));
            common_layer(browser, &mut steps);
        }
        Browser::FirefoxLegacy => {
            steps.push(root_layer(FIREFOX_LEGACY_LAYER));
            common_layer(browser, &mut steps);
        }
        Browser::FirefoxWebExt => {
            chromium_layers(browser, &mut steps);
            steps.push(root_layer(FIREFOX_WEBEXT_LAYER));
        }
    }
    steps.push(Step::Render(PAGES_DIR.into()));

    if browser == Browser::FirefoxLegacy {
        steps.push(Step::Replace {
            from: FIREFOX_FONTS_CSS.into(),
            to: FONTS_CSS.into(),
        });
        steps.push(Step::Remove(FONTS_DIR.into()));
        steps.push(Step::ConvertLocales {
            dir: LOCALES_DIR.into(),
            relocate_to: FIREFOX_LOCALE_DIR.into(),
        });
    }

    if api_only && browser.is_chromium_family() {
        steps.push(root_layer(API_LAYER));
        steps.extend(API_ONLY_REMOVALS.iter().map(|p| Step::Remove(PathBuf::from(*p))));
    }

    AssemblyPlan { browser, steps }
}
