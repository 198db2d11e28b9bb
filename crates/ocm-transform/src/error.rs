// SPDX-License-Identifier: Apache-2.0
//! Error taxonomy for building and executing a transformation graph.

use ocm_expr::ExprError;
use ocm_graph::GraphError;
use ocm_plugin::PluginError;
use thiserror::Error;

/// Failure modes raised while building or running a
/// [`crate::orchestrator::TransformationOrchestrator`].
#[derive(Debug, Error)]
pub enum TransformError {
    /// Two steps in the definition declared the same id.
    #[error("duplicate transformation id {0:?}")]
    DuplicateTransformationID(String),
    /// An expression referenced a step id that does not exist.
    #[error("step {step:?} depends on unknown step {dependency:?}")]
    UnknownDependency {
        /// The step whose expression referenced the dependency.
        step: String,
        /// The id referenced but never declared.
        dependency: String,
    },
    /// A step's spec could not be walked for expressions.
    #[error("step {step:?} spec is malformed: {source}")]
    Expr {
        /// The step whose spec failed to parse.
        step: String,
        /// The underlying scan/walk error.
        #[source]
        source: ExprError,
    },
    /// The underlying graph rejected the build or execution.
    #[error(transparent)]
    Graph(#[from] GraphError<String>),
    /// A step's plugin dispatch failed.
    #[error(transparent)]
    Plugin(#[from] PluginError),
}
