use std::fs;
use std::path::Path;

use minijinja::{context, Environment};
use tracing::debug;
use walkdir::WalkDir;

use super::copy::{is_hidden, walk_error};
use crate::browser::Browser;
use crate::error::{BuildError, IoContext, Result};

fn environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env
}

/// Renders one page in place with `browser` as the only variable.
pub fn render_page(path: &Path, browser: Browser) -> Result<()> {
    render_with(&environment(), path, browser)
}

fn render_with(env: &Environment<'_>, path: &Path, browser: Browser) -> Result<()> {
    let source = fs::read_to_string(path).at(path)?;
    let rendered = env
        .render_str(&source, context! { browser => browser })
        .map_err(|source| BuildError::Template {
            path: path.to_path_buf(),
            source,
        })?;
    fs::write(path, rendered).at(path)
}

/// Renders every `.html` file under `pages_dir`. Returns the page count.
pub fn render_pages(pages_dir: &Path, browser: Browser) -> Result<usize> {
    let env = environment();
    let mut pages = 0;
    let walker = WalkDir::new(pages_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e));
    for entry in walker {
        let entry = entry.map_err(|e| walk_error(pages_dir, e))?;
        let is_html = entry.path().extension().is_some_and(|ext| ext == "html");
        if entry.file_type().is_file() && is_html {
            debug!("rendering {}", entry.path().display());
            render_with(&env, entry.path(), browser)?;
            pages += 1;
        }
    }
    Ok(pages)
}
