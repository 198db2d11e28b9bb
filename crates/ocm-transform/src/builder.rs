// SPDX-License-Identifier: Apache-2.0
//! Turning a [`TransformationGraphDefinition`] into an `ocm-graph::Dag`,
//! with dependency edges discovered from the expressions in each step's
//! spec.

use crate::definition::{TransformationGraphDefinition, TransformationStep};
use crate::error::TransformError;
use ocm_graph::Dag;
use std::collections::HashSet;
use std::sync::Arc;

/// Build a DAG keyed by step id, with an edge `d → s` for every dependency
/// `d` an expression in step `s`'s spec references.
pub fn build(definition: &TransformationGraphDefinition) -> Result<Arc<Dag<String, TransformationStep>>, TransformError> {
    let dag: Arc<Dag<String, TransformationStep>> = Arc::new(Dag::new());
    let mut seen = HashSet::with_capacity(definition.steps.len());

    for step in &definition.steps {
        if !seen.insert(step.id.clone()) {
            return Err(TransformError::DuplicateTransformationID(step.id.clone()));
        }
        dag.add_vertex(step.id.clone(), step.clone());
    }

    let mut order_index = 0usize;
    for step in &definition.steps {
        let fields = ocm_expr::walk(&step.spec)
            .map_err(|source| TransformError::Expr { step: step.id.clone(), source })?;
        for field in fields {
            for expression in &field.expressions {
                let Some(dependency) = leading_identifier(expression) else { continue };
                if dependency == step.id {
                    continue;
                }
                if !seen.contains(&dependency) {
                    return Err(TransformError::UnknownDependency {
                        step: step.id.clone(),
                        dependency,
                    });
                }
                dag.add_edge(dependency, step.id.clone(), order_index)?;
                order_index += 1;
            }
        }
    }

    Ok(dag)
}

/// The leading identifier of an expression body, read as a step-id
/// reference: `stepId.output.field` → `stepId`. `None` for an expression
/// with no leading identifier, e.g. a numeric or string literal.
fn leading_identifier(expression: &str) -> Option<String> {
    let ident: String = expression
        .trim_start()
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if ident.is_empty() {
        None
    } else {
        Some(ident)
    }
}
