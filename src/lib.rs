//! # extension_packager
//!
//! Builds browser-specific trees of one browser extension from a single
//! canonical source tree:
//!
//! - Merge the right **source layers** per browser, in the right order
//! - Refresh **filter lists** from the filter server, checksum-verified
//! - Convert Chrome-style **`_locales`** into `.properties` files where needed
//! - Customize each browser's **manifest / install descriptor**
//! - Hand the finished tree to an external **packaging script**
//!
//! ---
//!
//! ## Browsers and groups
//!
//! | Browser | Canonical name | Group |
//! |---|---|---|
//! | Chromium | `chrome` | `chromium` |
//! | Opera | `opera` | `chromium` |
//! | Edge | `edge` | `chromium` |
//! | Safari | `safari` | `safari` |
//! | Firefox (legacy XPCOM) | `firefox_legacy` | `firefox` |
//! | Firefox (WebExtensions) | `firefox` | `firefox` |
//!
//! The group selects the shared filter directory (`filters/<group>`) and the
//! remote endpoints (`<server>/extension/<group>/...`).
//!
//! ---
//!
//! ## Source tree layout
//!
//! ```text
//! browser/webkit/          base layer for Chromium family and Safari
//! browser/chrome/          Chromium layer (also Opera, Edge, Firefox WebExt)
//! browser/edge/            Edge overlay
//! browser/safari/          Safari layer
//! browser/firefox/         Firefox legacy base
//! browser/firefox_webext/  WebExtensions overlay
//! api/                     API-only overlay
//! filters/<group>/         filter lists, metadata, local script rules
//! _locales/<code>/messages.json
//! pages/                   HTML pages, rendered with `browser` bound
//! lib/                     shared code
//! ```
//!
//! Later layers overwrite earlier ones. Dotfiles are never copied. Pages
//! are rendered once every layer is in place.
//!
//! Safari trees are built into `<dest>.safariextension`. A destination that
//! contains the source tree is rejected before anything is written.
//!
//! ---
//!
//! ## Quick start
//!
//! ```no_run
//! use extension_packager::{Browser, BuildSettings, Pipeline, ToolConfig};
//!
//! let mut settings = BuildSettings::new(Browser::Chromium, "4.1.2", "Extension", "build/chrome");
//! settings.update_url = Some("https://example.org/update.xml".into());
//!
//! let output = Pipeline::new(ToolConfig::default()).run(&settings).unwrap();
//! println!("built {}", output.build_dir.display());
//! ```
//!
//! ### Refreshing filters
//!
//! Downloads go through the [`Transport`] trait. With the default `http`
//! feature, [`filters::HttpTransport`] talks to the real server:
//!
//! ```no_run
//! # #[cfg(feature = "http")] {
//! use extension_packager::filters::{FilterFetcher, HttpTransport};
//! use extension_packager::{BrowserGroup, ToolConfig};
//!
//! let config = ToolConfig::default().with_env_overrides();
//! let transport = HttpTransport::new(&config.filters).unwrap();
//! let fetcher = FilterFetcher::new(transport, config.filters.clone(), "Extension/filters");
//! fetcher.refresh(BrowserGroup::Firefox).unwrap();
//! # }
//! ```
//!
//! Every filter list must carry a valid `! Checksum:` comment. One bad list
//! aborts the whole batch and nothing is committed.
//!
//! A Safari build with a refresh also re-downloads the English filter with
//! a Safari User-Agent, straight into the build tree.
//!
//! ---
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events and never installs a subscriber.
//!
//! ---
//!
//! ## Crate layout
//!
//! - [`assemble`]: layer plans, filtered copies, page templating.
//! - [`filters`]: checksum protocol, fetcher, script rules, transport.
//! - [`locales`]: `.properties` conversion and display-name postfixes.
//! - [`manifest`]: textual placeholder substitution per browser.
//! - [`pack`]: external packaging scripts.
//! - [`pipeline`]: the sequence of one build.

pub mod assemble;
pub mod browser;
pub mod config;
pub mod error;
pub mod filters;
pub mod locales;
pub mod manifest;
pub mod pack;
pub mod pipeline;

#[doc(inline)]
pub use browser::{name_postfix, Branch, Browser, BrowserGroup, PackMethod};
#[doc(inline)]
pub use config::{BuildSettings, FiltersConfig, LocalesConfig, ToolConfig};
#[doc(inline)]
pub use error::{BuildError, Result};
#[doc(inline)]
pub use filters::Transport;
#[doc(inline)]
pub use pipeline::{build, BuildOutput, Pipeline};

#[doc(inline)]
pub use assemble::VariantAssembler;
#[doc(inline)]
pub use locales::LocaleConverter;
