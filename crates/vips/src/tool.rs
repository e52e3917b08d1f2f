use crate::error::{ErrorKind, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// A discovered `vips` executable.
pub struct Vips {
    path: PathBuf,
}
impl Vips {
    /// Locate `vips` on the PATH.
    pub fn discover() -> Result<Self> {
        match which::which("vips") {
            Ok(path) => {
                tracing::trace!(vips = %path.display(), "Discovered vips executable");
                Ok(Self { path })
            },
            Err(_) => {
                tracing::info!("vips executable not found in PATH");
                exn::bail!(ErrorKind::VipsNotFound)
            },
        }
    }

    /// Reported version string, e.g. `vips-8.15.1`.
    pub fn version(&self) -> Result<String> {
        let stdout = self.run(&["--version".to_string()])?;
        Ok(stdout.trim().to_string())
    }

    /// Read the pixel dimensions of an image via `vips header`.
    ///
    /// Two invocations, one per field, matching how the IIP deployment
    /// tooling has always done it.
    pub fn dimensions(&self, image: impl AsRef<Path>) -> Result<(u32, u32)> {
        let width = self.header_field(image.as_ref(), "width")?;
        let height = self.header_field(image.as_ref(), "height")?;
        Ok((width, height))
    }

    fn header_field(&self, image: &Path, field: &str) -> Result<u32> {
        let stdout = self.run(&[
            "header".to_string(),
            "-f".to_string(),
            field.to_string(),
            image.display().to_string(),
        ])?;
        let trimmed = stdout.trim();
        trimmed.parse::<u32>().map_err(|_| exn::Exn::from(ErrorKind::HeaderParse(trimmed.to_string())))
    }

    /// Run `vips` with the given arguments, returning captured stdout.
    ///
    /// Non-zero exit propagates the captured stderr in the error; stderr of
    /// successful runs is logged at trace level and otherwise discarded.
    pub(crate) fn run(&self, args: &[String]) -> Result<String> {
        tracing::debug!(args = ?args, "Running vips");
        let output = Command::new(&self.path).args(args).output().map_err(|_| exn::Exn::from(ErrorKind::Io))?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return match output.status.code() {
                Some(code) => {
                    exn::bail!(ErrorKind::CommandFailed("vips".to_string(), code, stderr.trim().to_string()))
                },
                None => exn::bail!(ErrorKind::CommandKilled("vips".to_string())),
            };
        }
        if !stderr.is_empty() {
            tracing::trace!(stderr = %stderr.trim(), "vips wrote to stderr on success");
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
