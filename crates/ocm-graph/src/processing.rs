// SPDX-License-Identifier: Apache-2.0
//! Bounded, frontier-by-frontier topological processing.

use crate::dag::Dag;
use crate::error::GraphError;
use crate::state::ProcessingState;
use crate::vertex::VertexId;
use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

impl<Id, T> Dag<Id, T>
where
    Id: VertexId + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Process the graph in topological order: a vertex is handled only
    /// after all of its dependencies have completed.
    ///
    /// Operates on a clone; `self` is left unmutated except for the
    /// processing-state annotations each vertex carries as work progresses.
    /// `worker_limit` bounds concurrency within one frontier and defaults to
    /// the number of available CPUs. `cancellation` is checked before each
    /// frontier iteration and before each processor call; when it fires the
    /// run ends with [`GraphError::Cancelled`] rather than a processor error.
    pub async fn process_topology<P, Fut>(
        self: &Arc<Self>,
        processor: P,
        worker_limit: Option<usize>,
        cancellation: CancellationToken,
    ) -> Result<(), GraphError<Id>>
    where
        P: Fn(Id, T) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = Result<(), GraphError<Id>>> + Send + 'static,
    {
        let working = Arc::new(self.clone_graph());
        self.run_frontiers(working, processor, worker_limit, cancellation).await
    }

    /// Like [`Self::process_topology`] but walks the reversed graph, so
    /// vertices with no outgoing edges in `self` are processed first.
    pub async fn process_reverse_topology<P, Fut>(
        self: &Arc<Self>,
        processor: P,
        worker_limit: Option<usize>,
        cancellation: CancellationToken,
    ) -> Result<(), GraphError<Id>>
    where
        P: Fn(Id, T) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = Result<(), GraphError<Id>>> + Send + 'static,
    {
        let working = Arc::new(self.reverse());
        self.run_frontiers(working, processor, worker_limit, cancellation).await
    }

    async fn run_frontiers<P, Fut>(
        self: &Arc<Self>,
        working: Arc<Self>,
        processor: P,
        worker_limit: Option<usize>,
        cancellation: CancellationToken,
    ) -> Result<(), GraphError<Id>>
    where
        P: Fn(Id, T) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = Result<(), GraphError<Id>>> + Send + 'static,
    {
        let limit = worker_limit.unwrap_or_else(default_worker_limit).max(1);
        let semaphore = Arc::new(Semaphore::new(limit));
        let cancelled = Arc::new(AtomicBool::new(false));
        let first_error: Arc<Mutex<Option<GraphError<Id>>>> = Arc::new(Mutex::new(None));

        let mut in_degree: BTreeMap<Id, usize> = working
            .vertices
            .iter()
            .map(|e| (e.key().clone(), working.in_degree(e.key())))
            .collect();
        let mut frontier: Vec<Id> = in_degree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(id, _)| id.clone())
            .collect();
        frontier.sort();

        while !frontier.is_empty() {
            if cancellation.is_cancelled() {
                cancelled.store(true, Ordering::SeqCst);
                break;
            }

            for id in &frontier {
                self.set_processing_state(id, ProcessingState::Queued);
            }

            let mut tasks = Vec::with_capacity(frontier.len());
            for id in frontier.drain(..) {
                if cancelled.load(Ordering::SeqCst) || cancellation.is_cancelled() {
                    cancelled.store(true, Ordering::SeqCst);
                    break;
                }
                let Ok(permit) = semaphore.clone().acquire_owned().await else {
                    break;
                };
                let Some(attrs) = working.vertex_attributes(&id) else {
                    continue;
                };
                let processor = processor.clone();
                let original = self.clone();
                let cancelled = cancelled.clone();
                let first_error = first_error.clone();
                let cancellation = cancellation.clone();
                tasks.push(tokio::spawn(async move {
                    let _permit = permit;
                    if cancelled.load(Ordering::SeqCst) {
                        return None;
                    }
                    if cancellation.is_cancelled() {
                        cancelled.store(true, Ordering::SeqCst);
                        return None;
                    }
                    original.set_processing_state(&id, ProcessingState::Processing);
                    match processor(id.clone(), attrs).await {
                        Ok(()) => {
                            original.set_processing_state(&id, ProcessingState::Completed);
                            Some(id)
                        }
                        Err(e) => {
                            original.set_processing_state(&id, ProcessingState::Error);
                            let mut guard = first_error.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
                            if guard.is_none() {
                                *guard = Some(e);
                            }
                            cancelled.store(true, Ordering::SeqCst);
                            None
                        }
                    }
                }));
            }

            let mut next: BTreeSet<Id> = BTreeSet::new();
            for task in tasks {
                if let Ok(Some(id)) = task.await {
                    if let Some(children) = working.outgoing(&id) {
                        for edge in children {
                            if let Some(d) = in_degree.get_mut(&edge.to) {
                                *d -= 1;
                                if *d == 0 {
                                    next.insert(edge.to.clone());
                                }
                            }
                        }
                    }
                }
            }

            if cancelled.load(Ordering::SeqCst) {
                break;
            }
            frontier = next.into_iter().collect();
        }

        let guard = first_error.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        match &*guard {
            Some(e) => Err(e.clone()),
            None if cancelled.load(Ordering::SeqCst) => Err(GraphError::Cancelled),
            None => Ok(()),
        }
    }
}

fn default_worker_limit() -> usize {
    std::thread::available_parallelism().map(std::num::NonZeroUsize::get).unwrap_or(1)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    #[tokio::test]
    async fn processes_in_dependency_order() {
        let dag: Arc<Dag<u32, ()>> = Arc::new(Dag::new());
        dag.add_vertex(1, ());
        dag.add_vertex(2, ());
        dag.add_vertex(3, ());
        dag.add_edge(1, 2, 0).unwrap();
        dag.add_edge(2, 3, 0).unwrap();

        let order = Arc::new(StdMutex::new(Vec::new()));
        let order_for_processor = order.clone();
        dag.process_topology(
            move |id, _attrs| {
                let order = order_for_processor.clone();
                async move {
                    order.lock().expect("lock poisoned").push(id);
                    Ok(())
                }
            },
            Some(1),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(*order.lock().expect("lock poisoned"), vec![1, 2, 3]);
        assert_eq!(dag.vertex(&3).unwrap().processing_state, Some(ProcessingState::Completed));
    }

    #[tokio::test]
    async fn first_processor_error_is_returned() {
        let dag: Arc<Dag<u32, ()>> = Arc::new(Dag::new());
        dag.add_vertex(1, ());
        dag.add_vertex(2, ());
        dag.add_edge(1, 2, 0).unwrap();

        let err = dag
            .process_topology(
                |id, _attrs| async move {
                    if id == 1 {
                        Err(GraphError::Callback("boom".into()))
                    } else {
                        Ok(())
                    }
                },
                Some(2),
                CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::Callback(_)));
        assert_eq!(dag.vertex(&2).unwrap().processing_state, None);
    }

    #[tokio::test]
    async fn cancellation_before_any_frontier_is_reported_distinctly_from_a_processor_error() {
        let dag: Arc<Dag<u32, ()>> = Arc::new(Dag::new());
        dag.add_vertex(1, ());

        let cancellation = CancellationToken::new();
        cancellation.cancel();

        let err = dag
            .process_topology(|_id, _attrs| async move { Ok(()) }, Some(1), cancellation)
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::Cancelled));
    }
}
