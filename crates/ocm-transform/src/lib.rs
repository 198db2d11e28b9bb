// SPDX-License-Identifier: Apache-2.0
//! Builds an `ocm-graph::Dag` from a transformation graph definition,
//! wiring dependency edges from the `${...}` expressions in each step's
//! spec, and runs it by dispatching each step to the plugin manager.

mod builder;
mod definition;
mod error;
mod orchestrator;
mod resolve;

pub use builder::build;
pub use definition::{TransformationGraphDefinition, TransformationStep};
pub use error::TransformError;
pub use ocm_graph::CancellationToken;
pub use orchestrator::{TransformationOrchestrator, CAPABILITY};
pub use resolve::resolve;
