// SPDX-License-Identifier: Apache-2.0
//! [`Dag::process_reverse_topology`] walks leaves-first, and a cancellation
//! raised mid-run still reports [`GraphError::Cancelled`] distinctly from a
//! processor error — both exercised here only through the crate's public
//! surface.

use ocm_graph::{CancellationToken, Dag, GraphError};
use std::sync::{Arc, Mutex};

fn chain() -> Arc<Dag<u32, ()>> {
    let dag: Arc<Dag<u32, ()>> = Arc::new(Dag::new());
    dag.add_vertex(1, ());
    dag.add_vertex(2, ());
    dag.add_vertex(3, ());
    dag.add_edge(1, 2, 0).unwrap();
    dag.add_edge(2, 3, 0).unwrap();
    dag
}

#[tokio::test]
async fn reverse_topology_processes_leaves_before_roots() {
    let dag = chain();
    let order = Arc::new(Mutex::new(Vec::new()));
    let recorder = order.clone();

    dag.process_reverse_topology(
        move |id, _attrs| {
            let order = recorder.clone();
            async move {
                order.lock().unwrap().push(id);
                Ok(())
            }
        },
        Some(1),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(*order.lock().unwrap(), vec![3, 2, 1]);
}

#[tokio::test]
async fn cancellation_mid_run_stops_later_frontiers() {
    let dag = chain();
    let cancellation = CancellationToken::new();
    let processed = Arc::new(Mutex::new(Vec::new()));
    let recorder = processed.clone();
    let cancel_handle = cancellation.clone();

    let err = dag
        .process_topology(
            move |id, _attrs| {
                let order = recorder.clone();
                let cancellation = cancel_handle.clone();
                async move {
                    order.lock().unwrap().push(id);
                    if id == 1 {
                        cancellation.cancel();
                    }
                    Ok(())
                }
            },
            Some(1),
            cancellation,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, GraphError::Cancelled));
    // Vertex 1 ran before cancellation fired; 3 is unreachable from a
    // one-worker frontier walk that stops after 1.
    assert_eq!(*processed.lock().unwrap(), vec![1]);
}
