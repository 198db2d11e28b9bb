// SPDX-License-Identifier: Apache-2.0
//! Running a built transformation graph: each step is dispatched to the
//! plugin manager once its dependencies' outputs are available.

use crate::builder::build;
use crate::definition::{TransformationGraphDefinition, TransformationStep};
use crate::error::TransformError;
use crate::resolve::resolve;
use dashmap::DashMap;
use ocm_credentials::{CredentialError, CredentialGraph, Identity};
use ocm_graph::{CancellationToken, Dag, GraphError};
use ocm_plugin::PluginManager;
use serde_json::Value as Json;
use std::sync::Arc;

/// The capability name every transformation plugin registers under.
pub const CAPABILITY: &str = "transformation";

/// The credential attribute populated with the resolved token, if any.
const TOKEN_ATTRIBUTE: &str = "token";

/// Builds and runs a transformation graph, collecting each step's output.
pub struct TransformationOrchestrator {
    plugins: Arc<PluginManager>,
    credentials: Arc<CredentialGraph>,
}

impl TransformationOrchestrator {
    /// An orchestrator dispatching steps through `plugins`, resolving
    /// per-step credentials through `credentials` before each dispatch.
    pub fn new(plugins: Arc<PluginManager>, credentials: Arc<CredentialGraph>) -> Self {
        Self { plugins, credentials }
    }

    /// Build the graph from `definition` and run it to completion,
    /// returning every step's output keyed by id.
    pub async fn run(
        &self,
        definition: &TransformationGraphDefinition,
        worker_limit: Option<usize>,
        cancellation: CancellationToken,
    ) -> Result<std::collections::HashMap<String, Json>, TransformError> {
        let dag: Arc<Dag<String, TransformationStep>> = build(definition)?;
        let outputs: Arc<DashMap<String, Json>> = Arc::new(DashMap::new());

        let plugins = self.plugins.clone();
        let credentials = self.credentials.clone();
        let step_outputs = outputs.clone();
        let step_cancellation = cancellation.clone();
        let result = dag
            .process_topology(
                move |id, step| {
                    let plugins = plugins.clone();
                    let credentials = credentials.clone();
                    let outputs = step_outputs.clone();
                    let cancellation = step_cancellation.clone();
                    async move { run_step(&plugins, &credentials, &outputs, id, step, cancellation).await }
                },
                worker_limit,
                cancellation,
            )
            .await;

        match result {
            Ok(()) => Ok(outputs.iter().map(|e| (e.key().clone(), e.value().clone())).collect()),
            Err(e) => Err(TransformError::Graph(e)),
        }
    }
}

async fn run_step(
    plugins: &PluginManager,
    credentials: &CredentialGraph,
    outputs: &DashMap<String, Json>,
    id: String,
    step: TransformationStep,
    cancellation: CancellationToken,
) -> Result<(), GraphError<String>> {
    let snapshot: std::collections::HashMap<String, Json> =
        outputs.iter().map(|e| (e.key().clone(), e.value().clone())).collect();
    let resolved_spec = resolve(&step.spec, &snapshot);

    let identity = Identity::new([
        ("type".to_string(), step.object_type.group().to_string()),
        ("name".to_string(), step.object_type.name().to_string()),
    ]);
    let token = match credentials.resolve(&identity).await {
        Ok(resolved) => resolved.get(TOKEN_ATTRIBUTE).cloned(),
        Err(CredentialError::NotFound { .. }) => None,
        Err(e) => return Err(GraphError::Callback(e.to_string())),
    };

    let output = plugins
        .invoke(CAPABILITY, &step.object_type, "apply", resolved_spec, token.as_deref(), &cancellation)
        .await
        .map_err(|e| GraphError::Callback(e.to_string()))?;

    outputs.insert(id, output);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use ocm_plugin::{InternalHandler, PluginManagerConfig};
    use ocm_scheme::Type;
    use serde_json::json;

    fn uppercase_handler() -> InternalHandler {
        Arc::new(|req| {
            Box::pin(async move {
                let text = req["text"].as_str().unwrap_or_default().to_uppercase();
                Ok(json!({"text": text}))
            })
        })
    }

    #[tokio::test]
    async fn downstream_step_reads_upstream_output() {
        let plugins = Arc::new(PluginManager::new(PluginManagerConfig::default()));
        let ty = Type::unversioned("uppercase").unwrap();
        plugins.register_internal(CAPABILITY, ty.clone(), uppercase_handler()).unwrap();

        let definition = TransformationGraphDefinition {
            steps: vec![
                TransformationStep { id: "source".to_string(), object_type: ty.clone(), spec: json!({"text": "hello"}) },
                TransformationStep {
                    id: "sink".to_string(),
                    object_type: ty,
                    spec: json!({"text": "${source.output.text}"}),
                },
            ],
        };

        let orchestrator = TransformationOrchestrator::new(plugins, Arc::new(CredentialGraph::new()));
        let outputs = orchestrator.run(&definition, Some(2), CancellationToken::new()).await.unwrap();
        assert_eq!(outputs["source"], json!({"text": "HELLO"}));
        assert_eq!(outputs["sink"], json!({"text": "HELLO"}));
    }

    #[tokio::test]
    async fn step_with_no_matching_credential_still_runs() {
        // No consumer is registered at all, so `credentials.resolve` returns
        // `NotFound`; `run_step` must treat that as "no credential" rather
        // than failing the step.
        let plugins = Arc::new(PluginManager::new(PluginManagerConfig::default()));
        let ty = Type::new("demo.ocm.software", "uncredentialed", "").unwrap();
        plugins.register_internal(CAPABILITY, ty.clone(), uppercase_handler()).unwrap();

        let definition = TransformationGraphDefinition {
            steps: vec![TransformationStep { id: "only".to_string(), object_type: ty, spec: json!({"text": "ok"}) }],
        };

        let orchestrator = TransformationOrchestrator::new(plugins, Arc::new(CredentialGraph::new()));
        let outputs = orchestrator.run(&definition, Some(1), CancellationToken::new()).await.unwrap();
        assert_eq!(outputs["only"], json!({"text": "OK"}));
    }

    #[tokio::test]
    async fn resolver_failure_other_than_not_found_fails_the_step() {
        let plugins = Arc::new(PluginManager::new(PluginManagerConfig::default()));
        let ty = Type::new("demo.ocm.software", "broken-credential", "").unwrap();
        plugins.register_internal(CAPABILITY, ty.clone(), uppercase_handler()).unwrap();

        let credentials = Arc::new(CredentialGraph::new());
        let pattern = ocm_credentials::Identity::new([("type".to_string(), "demo.ocm.software".to_string())]);
        let failing: ocm_credentials::CredentialResolver =
            Arc::new(|_identity| Box::pin(async { Err(CredentialError::ResolverFailed { identity: "x".into(), reason: "boom".into() }) }));
        credentials.register(pattern, failing);

        let definition = TransformationGraphDefinition {
            steps: vec![TransformationStep { id: "only".to_string(), object_type: ty, spec: json!({"text": "ok"}) }],
        };

        let orchestrator = TransformationOrchestrator::new(plugins, credentials);
        let err = orchestrator.run(&definition, Some(1), CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, TransformError::Graph(GraphError::Callback(_))));
    }
}
