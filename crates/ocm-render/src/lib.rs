// SPDX-License-Identifier: Apache-2.0
//! Output-format-agnostic graph rendering: `VertexSerializer` and
//! `ListSerializer` interfaces, concrete JSON/NDJSON/YAML implementations,
//! and a render loop that runs alongside a DAG traversal.

mod error;
mod json;
mod loop_;
mod ndjson;
mod snapshot;
mod traits;
mod yaml;

pub use error::RenderError;
pub use json::JsonSerializer;
pub use loop_::RenderLoop;
pub use ndjson::NdjsonSerializer;
pub use snapshot::{snapshot_all, VertexSnapshot};
pub use traits::{ListSerializer, VertexSerializer};
pub use yaml::YamlSerializer;
