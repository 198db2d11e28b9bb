// SPDX-License-Identifier: Apache-2.0
//! Spawning a plugin process, waiting for it to report its listen address,
//! and polling `/healthz` until it answers.

use crate::config::PluginManagerConfig;
use crate::descriptor::{Endpoint, PluginDescriptor};
use crate::error::PluginError;
use serde::Serialize;
use std::net::SocketAddr;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::time::{sleep, Instant};

/// The manager → plugin startup config JSON, passed as `--config <json>`.
/// `location` is always an ephemeral loopback address; the plugin's actual
/// bound port is read back from its first line of standard output.
#[derive(Debug, Clone, Serialize)]
struct StartupConfig {
    id: String,
    #[serde(rename = "type")]
    transport: &'static str,
    #[serde(rename = "pluginType")]
    plugin_type: String,
    location: String,
}

/// A started plugin process and the client bound to its endpoint.
pub struct RunningPlugin {
    /// The plugin this process serves.
    pub descriptor: PluginDescriptor,
    /// Loopback endpoint the process is listening on.
    pub endpoint: Endpoint,
    /// HTTP client configured with this manager's dial/TLS/header timeouts.
    pub client: reqwest::Client,
    child: Child,
}

impl RunningPlugin {
    /// Ask the plugin to shut down over HTTP and wait up to `deadline` for
    /// its process to exit, killing it outright if the deadline passes or
    /// the request itself fails.
    pub async fn shutdown(mut self, deadline: std::time::Duration) -> Result<(), PluginError> {
        let id = self.descriptor.id.clone();
        let url = format!("{}/shutdown", self.endpoint.base_url());
        let _ = self.client.post(&url).send().await;

        match tokio::time::timeout(deadline, self.child.wait()).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(PluginError::Shutdown { id, reason: e.to_string() }),
            Err(_) => {
                let _ = self.child.kill().await;
                Err(PluginError::Shutdown { id, reason: "did not exit before deadline".into() })
            }
        }
    }
}

/// Spawn `descriptor`'s binary, read its reported listen address from the
/// first line of standard output, and poll `/healthz` until it answers or
/// the configured timeout elapses.
pub async fn start(
    descriptor: PluginDescriptor,
    config: &PluginManagerConfig,
) -> Result<RunningPlugin, PluginError> {
    let id = descriptor.id.clone();
    let startup_config = StartupConfig {
        id: id.clone(),
        transport: "tcp",
        plugin_type: descriptor.spec.supported_config_types.first().map(ToString::to_string).unwrap_or_default(),
        location: "127.0.0.1:0".to_string(),
    };
    let config_json = serde_json::to_string(&startup_config)
        .map_err(|e| PluginError::Process { id: id.clone(), reason: e.to_string() })?;

    let mut child = Command::new(&descriptor.binary_path)
        .arg("--config")
        .arg(config_json)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| PluginError::Process { id: id.clone(), reason: e.to_string() })?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| PluginError::Process { id: id.clone(), reason: "no stdout pipe".into() })?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| PluginError::Process { id: id.clone(), reason: "no stderr pipe".into() })?;

    let mut stdout = BufReader::new(stdout).lines();
    let endpoint = read_endpoint(&id, &mut stdout, config.startup_timeout).await?;

    let pump_id = id.clone();
    tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            tracing::info!(plugin.id = %pump_id, "{line}");
        }
    });

    let client = reqwest::Client::builder()
        .connect_timeout(config.dial_timeout)
        .timeout(config.header_timeout)
        .build()
        .map_err(|e| PluginError::Process { id: id.clone(), reason: e.to_string() })?;

    poll_health(&id, &client, &endpoint, config).await?;

    Ok(RunningPlugin { descriptor, endpoint, client, child })
}

async fn read_endpoint(
    id: &str,
    lines: &mut tokio::io::Lines<BufReader<tokio::process::ChildStdout>>,
    timeout: std::time::Duration,
) -> Result<Endpoint, PluginError> {
    let line = tokio::time::timeout(timeout, lines.next_line())
        .await
        .map_err(|_| PluginError::StartupTimeout { id: id.to_string() })?
        .map_err(|e| PluginError::Process { id: id.to_string(), reason: e.to_string() })?
        .ok_or_else(|| PluginError::Process { id: id.to_string(), reason: "closed stdout before reporting a listen address".into() })?;

    let addr: SocketAddr = line
        .trim()
        .parse()
        .map_err(|e| PluginError::Process { id: id.to_string(), reason: format!("invalid listen address {line:?}: {e}") })?;
    Ok(Endpoint(addr))
}

async fn poll_health(
    id: &str,
    client: &reqwest::Client,
    endpoint: &Endpoint,
    config: &PluginManagerConfig,
) -> Result<(), PluginError> {
    let deadline = Instant::now() + config.health_poll_timeout;
    let url = format!("{}/healthz", endpoint.base_url());
    loop {
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return Ok(());
            }
        }
        if Instant::now() >= deadline {
            return Err(PluginError::StartupTimeout { id: id.to_string() });
        }
        sleep(config.health_poll_interval).await;
    }
}
