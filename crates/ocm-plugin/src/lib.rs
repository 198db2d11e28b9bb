// SPDX-License-Identifier: Apache-2.0
//! Discovery, handshake, lazy startup and HTTP dispatch for external
//! capability plugins, alongside direct registration of in-process handlers.

mod config;
mod descriptor;
mod discovery;
mod dispatch;
mod error;
mod manager;
mod registry;
mod spec;
mod startup;

pub use config::PluginManagerConfig;
pub use descriptor::{Endpoint, PluginDescriptor};
pub use discovery::{discover, discover_all};
pub use error::PluginError;
pub use manager::{PluginManager, SharedPluginManager};
pub use registry::{InternalHandler, Registries, Resolved};
pub use spec::{CapabilityEntry, PluginSpec};
pub use startup::{start, RunningPlugin};
pub use tokio_util::sync::CancellationToken;
