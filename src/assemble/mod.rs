//! Per-browser tree assembly from one canonical source tree.

pub mod copy;
pub mod plan;
pub mod templates;

pub use copy::{copy_layer, remove_path};
pub use plan::{assembly_plan, AssemblyPlan, Step};
pub use templates::{render_page, render_pages};

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::browser::Browser;
use crate::config::LocalesConfig;
use crate::error::{IoContext, Result};
use crate::locales::LocaleConverter;

pub struct VariantAssembler {
    locales: LocalesConfig,
}

impl VariantAssembler {
    pub fn new(locales: LocalesConfig) -> Self {
        Self { locales }
    }

    /// Builds `dest` for `browser` from `source`. An existing `dest` is
    /// deleted first. A failed step leaves the partial tree in place.
    pub fn assemble(
        &self,
        source: &Path,
        dest: &Path,
        browser: Browser,
        api_only: bool,
    ) -> Result<AssemblyPlan> {
        let plan = assembly_plan(browser, api_only);
        remove_path(dest)?;
        fs::create_dir_all(dest).at(dest)?;

        for step in &plan.steps {
            self.run_step(step, source, dest, browser)?;
        }
        info!(browser = %browser, steps = plan.steps.len(), "assembled {}", dest.display());
        Ok(plan)
    }

    fn run_step(&self, step: &Step, source: &Path, dest: &Path, browser: Browser) -> Result<()> {
        match step {
            Step::Copy { from, to } => {
                let files = copy_layer(&source.join(from), &dest.join(to))?;
                debug!("copied {} ({files} files)", from.display());
            }
            Step::Render(dir) => {
                let pages = render_pages(&dest.join(dir), browser)?;
                debug!("rendered {pages} pages for {browser}");
            }
            Step::Replace { from, to } => {
                let to = dest.join(to);
                fs::rename(dest.join(from), &to).at(&to)?;
            }
            Step::Remove(path) => remove_path(&dest.join(path))?,
            Step::ConvertLocales { dir, relocate_to } => {
                let dir = dest.join(dir);
                LocaleConverter::new(self.locales.clone()).convert(&dir)?;
                let target = dest.join(relocate_to);
                remove_path(&target)?;
                fs::rename(&dir, &target).at(&target)?;
            }
        }
        Ok(())
    }
}
