//! Per-browser manifest and install-descriptor customization.
//!
//! Substitution is textual on purpose: descriptors keep their exact
//! formatting and key order. Unknown placeholders are left as they are.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::browser::Browser;
use crate::config::LocalesConfig;
use crate::error::{BuildError, IoContext, Result};
use crate::locales::{locale_summaries, LocaleSummary};

pub const CHROME_MANIFEST: &str = "manifest.json";
pub const SAFARI_INFO_PLIST: &str = "Info.plist";
pub const FIREFOX_INSTALL_RDF: &str = "install.rdf";
pub const FIREFOX_PACKAGE_JSON: &str = "package.json";

/// Values substituted into a browser's descriptors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestValues {
    pub version: String,
    pub extension_id: Option<String>,
    pub update_url: Option<String>,
    pub name_postfix: String,
}

impl ManifestValues {
    fn extension_id(&self) -> &str {
        self.extension_id.as_deref().unwrap_or_default()
    }

    /// Beta ids never update from the Safari gallery.
    pub fn update_from_gallery(&self) -> bool {
        !self.extension_id().contains("beta")
    }
}

/// How a descriptor receives the update URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpdateUrl {
    /// Spliced in as a trailing `"update_url"` member of the JSON object.
    JsonSplice,
    /// Replaces `placeholder` verbatim, empty when absent.
    Raw { placeholder: &'static str },
    /// Replaces `${updateUrl}` with `open url close`, empty when absent.
    Wrapped {
        open: &'static str,
        close: &'static str,
    },
    Ignored,
}

#[derive(Debug, Clone, Copy)]
struct Descriptor {
    file: &'static str,
    update_url: UpdateUrl,
}

fn descriptors(browser: Browser) -> &'static [Descriptor] {
    match browser {
        Browser::Chromium | Browser::Opera | Browser::Edge => &[Descriptor {
            file: CHROME_MANIFEST,
            update_url: UpdateUrl::JsonSplice,
        }],
        Browser::Safari => &[Descriptor {
            file: SAFARI_INFO_PLIST,
            update_url: UpdateUrl::Raw {
                placeholder: "${updateURL}",
            },
        }],
        Browser::FirefoxLegacy => &[
            Descriptor {
                file: FIREFOX_INSTALL_RDF,
                update_url: UpdateUrl::Wrapped {
                    open: "<em:updateURL>",
                    close: "</em:updateURL>",
                },
            },
            Descriptor {
                file: FIREFOX_PACKAGE_JSON,
                update_url: UpdateUrl::Ignored,
            },
        ],
        Browser::FirefoxWebExt => &[
            Descriptor {
                file: FIREFOX_INSTALL_RDF,
                update_url: UpdateUrl::Wrapped {
                    open: "<em:updateURL>",
                    close: "</em:updateURL>",
                },
            },
            Descriptor {
                file: FIREFOX_PACKAGE_JSON,
                update_url: UpdateUrl::Ignored,
            },
            // Inherited from the Chromium layer; carries `${version}` too.
            Descriptor {
                file: CHROME_MANIFEST,
                update_url: UpdateUrl::Ignored,
            },
        ],
    }
}

fn substitute(text: &str, values: &ManifestValues) -> String {
    text.replace("${version}", &values.version)
        .replace("${extensionId}", values.extension_id())
        .replace("${extensionNamePostfix}", &values.name_postfix)
        .replace(
            "${updateFromGallery}",
            if values.update_from_gallery() { "true" } else { "false" },
        )
}

/// Appends `"update_url"` as the last member of a JSON object, textually.
pub fn splice_update_url(manifest: &str, update_url: &str) -> Option<String> {
    let body = manifest.trim_end().strip_suffix('}')?;
    Some(format!("{body}, \"update_url\": \"{update_url}\"}}"))
}

/// Renders one descriptor's text.
fn customize_text(
    path: &Path,
    text: &str,
    update_url: UpdateUrl,
    values: &ManifestValues,
) -> Result<String> {
    let text = substitute(text, values);
    let url = values.update_url.as_deref().filter(|u| !u.is_empty());
    let out = match (update_url, url) {
        (UpdateUrl::JsonSplice, Some(url)) => {
            splice_update_url(&text, url).ok_or_else(|| BuildError::MalformedDescriptor {
                path: path.to_path_buf(),
                reason: "no closing brace to splice update_url before".into(),
            })?
        }
        (UpdateUrl::JsonSplice, None) | (UpdateUrl::Ignored, _) => text,
        (UpdateUrl::Raw { placeholder }, url) => text.replace(placeholder, url.unwrap_or("")),
        (UpdateUrl::Wrapped { open, close }, Some(url)) => {
            text.replace("${updateUrl}", &format!("{open}{url}{close}"))
        }
        (UpdateUrl::Wrapped { .. }, None) => text.replace("${updateUrl}", ""),
    };
    Ok(out)
}

/// Placeholder in `install.rdf` for the per-locale name and description.
pub const LOCALIZED_PLACEHOLDER: &str = "${localised}";

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// One `<em:localized>` element per locale, `name_postfix` appended to
/// every name.
pub fn localized_block(locales: &[LocaleSummary], name_postfix: &str) -> String {
    let mut out = String::new();
    for locale in locales {
        out.push_str("<em:localized>\n\t<Description>\n");
        out.push_str(&format!("\t\t<em:locale>{}</em:locale>\n", xml_escape(&locale.code)));
        out.push_str(&format!(
            "\t\t<em:name>{}</em:name>\n",
            xml_escape(&format!("{}{name_postfix}", locale.name))
        ));
        out.push_str(&format!(
            "\t\t<em:description>{}</em:description>\n",
            xml_escape(&locale.description)
        ));
        out.push_str("\t</Description>\n</em:localized>\n");
    }
    out
}

/// Expands [`LOCALIZED_PLACEHOLDER`] in the build's `install.rdf` from the
/// locale files under `build_dir`. Returns `false` without touching
/// anything when there is no `install.rdf` or no placeholder in it.
///
/// Runs before the postfix is applied to `_locales`, so names carry it once.
pub fn write_localized(build_dir: &Path, config: &LocalesConfig, name_postfix: &str) -> Result<bool> {
    let path = build_dir.join(FIREFOX_INSTALL_RDF);
    if !path.is_file() {
        return Ok(false);
    }
    let text = fs::read_to_string(&path).at(&path)?;
    if !text.contains(LOCALIZED_PLACEHOLDER) {
        return Ok(false);
    }
    let locales = locale_summaries(build_dir, config)?;
    let block = localized_block(&locales, name_postfix);
    fs::write(&path, text.replace(LOCALIZED_PLACEHOLDER, &block)).at(&path)?;
    info!(locales = locales.len(), "localized descriptions written to {}", path.display());
    Ok(true)
}

/// Rewrites every descriptor of `browser` under `build_dir` in place.
/// A missing descriptor is an I/O error.
pub fn customize(build_dir: &Path, browser: Browser, values: &ManifestValues) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for descriptor in descriptors(browser) {
        let path = build_dir.join(descriptor.file);
        let text = fs::read_to_string(&path).at(&path)?;
        let out = customize_text(&path, &text, descriptor.update_url, values)?;
        fs::write(&path, out).at(&path)?;
        written.push(path);
    }
    info!(browser = %browser, version = %values.version, "customized {} descriptor(s)", written.len());
    Ok(written)
}
