//! Sequences one build: validate, refresh filters, assemble, customize,
//! pack. Fail-fast; the first error aborts the remaining steps.
//!
//! The build directory is [`BuildSettings::build_dir`], which gains a
//! `.safariextension` suffix for Safari.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::assemble::plan::{FILTERS_DIR, LOCALES_DIR};
use crate::assemble::{AssemblyPlan, VariantAssembler};
use crate::browser::{Browser, BrowserGroup};
use crate::config::{BuildSettings, ToolConfig};
use crate::error::{BuildError, Result};
use crate::filters::{FilterFetcher, Transport};
use crate::locales::rename_postfix_in_dir;
use crate::manifest::{self, ManifestValues};
use crate::pack::Packager;

#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub build_dir: PathBuf,
    pub plan: AssemblyPlan,
    pub artifact: Option<PathBuf>,
}

pub struct Pipeline<'a> {
    config: ToolConfig,
    transport: Option<&'a dyn Transport>,
    packager: Option<&'a dyn Packager>,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: ToolConfig) -> Self {
        Self {
            config,
            transport: None,
            packager: None,
        }
    }

    /// Needed when `refresh_filters` is set.
    pub fn with_transport(mut self, transport: &'a dyn Transport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Needed when `pack_method` is set.
    pub fn with_packager(mut self, packager: &'a dyn Packager) -> Self {
        self.packager = Some(packager);
        self
    }

    pub fn run(&self, settings: &BuildSettings) -> Result<BuildOutput> {
        settings.validate()?;
        let transport = match (settings.refresh_filters, self.transport) {
            (true, None) => {
                return Err(BuildError::Config(
                    "filter refresh requested without a transport".into(),
                ))
            }
            (_, transport) => transport,
        };
        let packager = match (settings.pack_method, self.packager) {
            (Some(_), None) => {
                return Err(BuildError::Config(
                    "pack method given without a packager".into(),
                ))
            }
            (Some(method), Some(packager)) => Some((method, packager)),
            (None, _) => None,
        };

        let browser = settings.browser;
        info!(browser = %browser, branch = %settings.branch, version = %settings.version, "build started");

        let fetcher = transport.map(|transport| {
            FilterFetcher::new(
                transport,
                self.config.filters.clone(),
                settings.source_dir.join(FILTERS_DIR),
            )
        });
        if let Some(fetcher) = &fetcher {
            fetcher.refresh(browser.group())?;
        }

        let build_dir = settings.build_dir();
        let assembler = VariantAssembler::new(self.config.locales.clone());
        let plan = assembler.assemble(&settings.source_dir, &build_dir, browser, settings.api_only)?;

        if let (Some(fetcher), Browser::Safari) = (&fetcher, browser) {
            fetcher.fetch_safari_english_filter(&build_dir.join(FILTERS_DIR))?;
        }

        let values = ManifestValues {
            version: settings.version.clone(),
            extension_id: settings.extension_id.clone(),
            update_url: settings.update_url.clone(),
            name_postfix: settings.name_postfix().to_string(),
        };
        manifest::customize(&build_dir, browser, &values)?;
        if browser.group() == BrowserGroup::Firefox {
            manifest::write_localized(&build_dir, &self.config.locales, &values.name_postfix)?;
        }

        let locales = build_dir.join(LOCALES_DIR);
        if uses_chrome_locales(browser) && locales.is_dir() {
            rename_postfix_in_dir(&locales, &values.name_postfix)?;
        }

        let artifact = match packager {
            Some((method, packager)) => Some(packager.pack(
                method,
                &build_dir,
                artifact_dir(&build_dir),
                &settings.artifact_name(method),
            )?),
            None => None,
        };

        Ok(BuildOutput {
            build_dir,
            plan,
            artifact,
        })
    }
}

/// One build with the embedded defaults and no collaborators; settings
/// asking for a refresh or a pack step fail validation.
pub fn build(settings: &BuildSettings) -> Result<BuildOutput> {
    Pipeline::new(ToolConfig::default()).run(settings)
}

/// Targets whose display name lives in `_locales/*/messages.json`.
fn uses_chrome_locales(browser: Browser) -> bool {
    browser.is_chromium_family() || browser == Browser::FirefoxWebExt
}

/// Archives land next to the build directory.
fn artifact_dir(build_dir: &Path) -> &Path {
    build_dir.parent().unwrap_or_else(|| Path::new("."))
}
