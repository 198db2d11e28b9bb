// SPDX-License-Identifier: Apache-2.0
//! Handshake: run a candidate binary with `capabilities` and parse the
//! `PluginSpec` it prints to standard output.

use crate::descriptor::PluginDescriptor;
use crate::error::PluginError;
use crate::spec::PluginSpec;
use std::path::Path;
use tokio::process::Command;

/// Run the handshake against `binary_path` and build its descriptor.
///
/// The plugin's id is the binary's file stem; the id must be unique among
/// discovered plugins, which callers enforce at registration time.
pub async fn discover(binary_path: &Path) -> Result<PluginDescriptor, PluginError> {
    let binary = binary_path.display().to_string();
    let id = binary_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| binary.clone());

    let output = Command::new(binary_path)
        .arg("capabilities")
        .output()
        .await
        .map_err(|e| PluginError::Handshake { binary: binary.clone(), reason: e.to_string() })?;

    if !output.status.success() {
        return Err(PluginError::Handshake {
            binary,
            reason: format!("exited with {}", output.status),
        });
    }

    let spec: PluginSpec = serde_json::from_slice(&output.stdout)
        .map_err(|e| PluginError::Handshake { binary, reason: e.to_string() })?;

    Ok(PluginDescriptor { id, binary_path: binary_path.to_path_buf(), spec })
}

/// Run the handshake against every candidate in `binaries`, short-circuiting
/// on the first failure.
pub async fn discover_all(binaries: &[impl AsRef<Path>]) -> Result<Vec<PluginDescriptor>, PluginError> {
    let mut out = Vec::with_capacity(binaries.len());
    for binary in binaries {
        out.push(discover(binary.as_ref()).await?);
    }
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn handshake_rejects_missing_binary() {
        let err = discover(Path::new("/nonexistent/ocm-plugin-binary")).await.unwrap_err();
        assert!(matches!(err, PluginError::Handshake { .. }));
    }
}
