//! Debian package installation.
//!
//! Installation failures are classified and surfaced, never retried:
//! a missing package and a failed transaction are different operator
//! problems.

use std::process::Command;

use tracing::{debug, info};

use muster_core::service::InstallError;

/// Install a package with apt-get.
pub fn apt_install(package: &str) -> Result<(), InstallError> {
  info!(package, "installing package");

  let output = Command::new("apt-get")
    .env("DEBIAN_FRONTEND", "noninteractive")
    .args(["install", "-y", "-q"])
    .arg(package)
    .output()
    .map_err(|e| InstallError::Command {
      package: package.to_string(),
      message: e.to_string(),
    })?;

  if output.status.success() {
    debug!(package, "package installed");
    return Ok(());
  }

  Err(classify_failure(
    package,
    &String::from_utf8_lossy(&output.stderr),
  ))
}

/// Split apt failures into "no such package" and everything else.
fn classify_failure(package: &str, stderr: &str) -> InstallError {
  if stderr.contains("Unable to locate package") || stderr.contains("has no installation candidate")
  {
    InstallError::NotFound {
      package: package.to_string(),
    }
  } else {
    InstallError::Command {
      package: package.to_string(),
      message: stderr.trim().to_string(),
    }
  }
}
