// SPDX-License-Identifier: Apache-2.0
//! DFS-style discovery from a root vertex, with per-vertex dedup so a
//! vertex reachable by multiple paths is visited exactly once.

use crate::dag::Dag;
use crate::error::GraphError;
use crate::state::DiscoveryState;
use crate::vertex::VertexId;
use dashmap::DashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

type Latches<Id> = Arc<DashMap<Id, Arc<Notify>>>;
type FirstError<Id> = Arc<Mutex<Option<GraphError<Id>>>>;

impl<Id, T> Dag<Id, T>
where
    Id: VertexId + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Discover the graph reachable from `root` by repeatedly calling
    /// `visit(id, attributes)`, which must treat its argument as read-only
    /// and return the vertex's outbound neighbours.
    ///
    /// The second caller to reach an already-in-flight vertex waits on its
    /// completion instead of invoking `visit` a second time. The first
    /// error encountered cancels the remaining discovery and is returned;
    /// work already completed is left in place. `cancellation` is checked
    /// before every `visit` call and while a caller awaits another's `done`
    /// signal; when it fires first, the run ends with
    /// [`GraphError::Cancelled`] rather than a visitor error.
    pub async fn discover<V, Fut>(
        self: &Arc<Self>,
        root: Id,
        root_attrs: T,
        visit: V,
        cancellation: CancellationToken,
    ) -> Result<(), GraphError<Id>>
    where
        V: Fn(Id, T) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = Result<Vec<(Id, T)>, GraphError<Id>>> + Send + 'static,
    {
        let latches: Latches<Id> = Arc::new(DashMap::new());
        let cancelled = Arc::new(AtomicBool::new(false));
        let first_error: FirstError<Id> = Arc::new(Mutex::new(None));

        self.add_vertex_with_state(root.clone(), root_attrs.clone(), DiscoveryState::Discovering);
        Self::discover_one(self.clone(), root, root_attrs, visit, latches, cancelled.clone(), first_error.clone(), cancellation)
            .await;

        let guard = first_error.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        match &*guard {
            Some(e) => Err(e.clone()),
            None if cancelled.load(Ordering::SeqCst) => Err(GraphError::Cancelled),
            None => Ok(()),
        }
    }

    fn discover_one<V, Fut>(
        this: Arc<Self>,
        id: Id,
        attrs: T,
        visit: V,
        latches: Latches<Id>,
        cancelled: Arc<AtomicBool>,
        first_error: FirstError<Id>,
        cancellation: CancellationToken,
    ) -> Pin<Box<dyn Future<Output = ()> + Send>>
    where
        V: Fn(Id, T) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = Result<Vec<(Id, T)>, GraphError<Id>>> + Send + 'static,
    {
        Box::pin(async move {
            let mut first_owner = false;
            let notify = latches
                .entry(id.clone())
                .or_insert_with(|| {
                    first_owner = true;
                    Arc::new(Notify::new())
                })
                .clone();

            if !first_owner {
                if !cancelled.load(Ordering::SeqCst) {
                    tokio::select! {
                        () = notify.notified() => {}
                        () = cancellation.cancelled() => cancelled.store(true, Ordering::SeqCst),
                    }
                }
                return;
            }

            if cancelled.load(Ordering::SeqCst) {
                notify.notify_waiters();
                return;
            }

            if cancellation.is_cancelled() {
                cancelled.store(true, Ordering::SeqCst);
                notify.notify_waiters();
                return;
            }

            this.set_discovery_state(&id, DiscoveryState::Discovering);
            let outcome = visit(id.clone(), attrs).await;
            match outcome {
                Ok(neighbours) => {
                    this.set_discovery_state(&id, DiscoveryState::Discovered);
                    let mut children = Vec::with_capacity(neighbours.len());
                    let mut edge_error = None;
                    for (order_index, (nid, nattrs)) in neighbours.into_iter().enumerate() {
                        this.add_vertex_with_state(nid.clone(), nattrs.clone(), DiscoveryState::Discovering);
                        if let Err(e) = this.add_edge(id.clone(), nid.clone(), order_index) {
                            edge_error = Some(e);
                            break;
                        }
                        children.push((nid, nattrs));
                    }

                    if let Some(e) = edge_error {
                        this.set_discovery_state(&id, DiscoveryState::Error);
                        record_first_error(&first_error, e);
                        cancelled.store(true, Ordering::SeqCst);
                    } else {
                        let mut tasks = Vec::with_capacity(children.len());
                        for (nid, nattrs) in children {
                            tasks.push(tokio::spawn(Self::discover_one(
                                this.clone(),
                                nid,
                                nattrs,
                                visit.clone(),
                                latches.clone(),
                                cancelled.clone(),
                                first_error.clone(),
                                cancellation.clone(),
                            )));
                        }
                        for task in tasks {
                            let _ = task.await;
                        }
                        if cancelled.load(Ordering::SeqCst) {
                            this.set_discovery_state(&id, DiscoveryState::Error);
                        } else {
                            this.set_discovery_state(&id, DiscoveryState::Completed);
                        }
                    }
                }
                Err(e) => {
                    this.set_discovery_state(&id, DiscoveryState::Error);
                    record_first_error(&first_error, e);
                    cancelled.store(true, Ordering::SeqCst);
                }
            }

            notify.notify_waiters();
        })
    }
}

fn record_first_error<Id: VertexId>(first_error: &FirstError<Id>, error: GraphError<Id>) {
    let mut guard = first_error.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    if guard.is_none() {
        *guard = Some(error);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::sync::Mutex as StdMutex;

    #[tokio::test]
    async fn discover_visits_each_vertex_once() {
        let dag: Arc<Dag<u32, ()>> = Arc::new(Dag::new());
        let visited = Arc::new(StdMutex::new(BTreeSet::new()));
        let visited_for_visit = visited.clone();

        // diamond: 1 -> {2, 3} -> 4
        let graph = [(1u32, vec![2, 3]), (2, vec![4]), (3, vec![4]), (4, vec![])];
        let graph = Arc::new(graph.into_iter().collect::<std::collections::BTreeMap<_, _>>());

        dag.discover(
            1,
            (),
            move |id, _attrs| {
                let visited = visited_for_visit.clone();
                let graph = graph.clone();
                async move {
                    visited.lock().expect("lock poisoned").insert(id);
                    let neighbours = graph.get(&id).cloned().unwrap_or_default();
                    Ok(neighbours.into_iter().map(|n| (n, ())).collect())
                }
            },
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(*visited.lock().expect("lock poisoned"), BTreeSet::from([1, 2, 3, 4]));
        assert_eq!(dag.vertex(&4).unwrap().discovery_state, DiscoveryState::Completed);
    }

    #[tokio::test]
    async fn discover_propagates_visitor_error() {
        let dag: Arc<Dag<u32, ()>> = Arc::new(Dag::new());
        let err = dag
            .discover(
                1,
                (),
                |_id, _attrs| async { Err(GraphError::Callback("boom".into())) },
                CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::Callback(_)));
    }

    #[tokio::test]
    async fn discover_stops_when_cancelled_before_start() {
        let dag: Arc<Dag<u32, ()>> = Arc::new(Dag::new());
        let cancellation = CancellationToken::new();
        cancellation.cancel();

        let err = dag
            .discover(1, (), |id, _attrs| async move { Ok(vec![(id + 1, ())]) }, cancellation)
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::Cancelled));
    }
}
