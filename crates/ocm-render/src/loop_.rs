// SPDX-License-Identifier: Apache-2.0
//! A render loop that runs concurrently with a DAG traversal: it
//! re-renders the graph's current snapshot on an interval and performs one
//! final flush when told to stop.

use crate::snapshot::snapshot_all;
use crate::traits::ListSerializer;
use ocm_graph::{Dag, VertexId};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};

/// A spawned render loop and the handle used to stop it.
pub struct RenderLoop {
    stop: Arc<Notify>,
    handle: JoinHandle<()>,
}

impl RenderLoop {
    /// Spawn a loop that re-renders `dag` every `period` and sends the
    /// rendered text on `sink`, finishing with one last render after
    /// [`RenderLoop::stop`] is called.
    pub fn spawn<Id, T>(
        dag: Arc<Dag<Id, T>>,
        serializer: Arc<dyn ListSerializer>,
        period: Duration,
        sink: mpsc::Sender<String>,
    ) -> Self
    where
        Id: VertexId + Serialize + 'static,
        T: Serialize + Clone + Send + Sync + 'static,
    {
        let stop = Arc::new(Notify::new());
        let stop_for_task = stop.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if render_once(&dag, &serializer, &sink).await.is_err() {
                            break;
                        }
                    }
                    () = stop_for_task.notified() => {
                        let _ = render_once(&dag, &serializer, &sink).await;
                        break;
                    }
                }
            }
        });

        Self { stop, handle }
    }

    /// Signal the loop to perform its final flush and exit, waiting for it
    /// to finish.
    pub async fn stop(self) {
        self.stop.notify_one();
        let _ = self.handle.await;
    }
}

async fn render_once<Id, T>(
    dag: &Dag<Id, T>,
    serializer: &Arc<dyn ListSerializer>,
    sink: &mpsc::Sender<String>,
) -> Result<(), mpsc::error::SendError<String>>
where
    Id: VertexId + Serialize,
    T: Serialize + Clone,
{
    let snapshot = snapshot_all(dag);
    let rendered = match serializer.render_list(&snapshot) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "render pass failed");
            return Ok(());
        }
    };
    sink.send(rendered).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::json::JsonSerializer;

    #[tokio::test(start_paused = true)]
    async fn render_loop_emits_periodic_and_final_renders() {
        let dag: Arc<Dag<u32, &'static str>> = Arc::new(Dag::new());
        dag.add_vertex(1, "a");

        let (tx, mut rx) = mpsc::channel(8);
        let render_loop = RenderLoop::spawn(dag.clone(), Arc::new(JsonSerializer), Duration::from_millis(10), tx);

        tokio::time::advance(Duration::from_millis(25)).await;
        let first = rx.recv().await.unwrap();
        assert!(first.contains("\"id\": 1"));

        render_loop.stop().await;
        assert!(rx.recv().await.is_some());
    }
}
