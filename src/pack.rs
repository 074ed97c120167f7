//! Hand-off to the external archive scripts (zip/crx/xpi/extz).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::browser::PackMethod;
use crate::error::{BuildError, IoContext, Result};

/// Turns a finished build directory into one archive and returns its path.
pub trait Packager {
    fn pack(
        &self,
        method: PackMethod,
        build_dir: &Path,
        artifact_dir: &Path,
        artifact_name: &str,
    ) -> Result<PathBuf>;
}

/// Runs `<scripts_dir>/<method>.sh <build_dir> <artifact_dir> <artifact_name>`.
///
/// The last non-empty stdout line is taken as the artifact path; without
/// one, `<artifact_dir>/<artifact_name>` is assumed.
pub struct ScriptPackager {
    scripts_dir: PathBuf,
}

impl ScriptPackager {
    pub fn new(scripts_dir: impl Into<PathBuf>) -> Self {
        Self {
            scripts_dir: scripts_dir.into(),
        }
    }

    pub fn script_path(&self, method: PackMethod) -> PathBuf {
        self.scripts_dir.join(format!("{}.sh", method.script_name()))
    }
}

impl Packager for ScriptPackager {
    fn pack(
        &self,
        method: PackMethod,
        build_dir: &Path,
        artifact_dir: &Path,
        artifact_name: &str,
    ) -> Result<PathBuf> {
        let script = self.script_path(method);
        if !script.is_file() {
            return Err(BuildError::io(
                &script,
                io::Error::new(io::ErrorKind::NotFound, "packaging script not found"),
            ));
        }
        fs::create_dir_all(artifact_dir).at(artifact_dir)?;

        let output = Command::new(&script)
            .arg(build_dir)
            .arg(artifact_dir)
            .arg(artifact_name)
            .output()
            .at(&script)?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!("{} stdout: {}", script.display(), stdout.trim());

        if !output.status.success() {
            return Err(BuildError::ExternalTool {
                tool: script.display().to_string(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let artifact = stdout
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| artifact_dir.join(artifact_name));
        info!("packed {}", artifact.display());
        Ok(artifact)
    }
}
