//! [`CacheArranger`]: an optional background prefetch worker (spec §10).
//!
//! Not required for correctness — every read already loads and keyframes on
//! demand. This exists purely so a caller can warm the cache for a time it
//! knows it's about to visit without blocking the read that gets there.

use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;

use epochweave_storage::GraphName;
use epochweave_timeline::{BranchId, Tick, Turn};

use crate::orm::Orm;

/// One unit of prefetch work, or the sentinel that tells the worker to
/// drain its queue and stop.
pub enum ArrangeRequest {
    /// Warm the cache for `graph` at `(branch, turn, tick)`.
    Warm {
        /// Graph to prefetch.
        graph: GraphName,
        /// Branch to prefetch on.
        branch: BranchId,
        /// Turn to prefetch.
        turn: Turn,
        /// Tick to prefetch.
        tick: Tick,
    },
    /// Finish any requests already queued, then stop.
    Shutdown,
}

/// A background thread that prefetches keyframes/journals for requested
/// times, one request at a time, under the world lock.
pub struct CacheArranger {
    sender: Sender<ArrangeRequest>,
    worker: Option<JoinHandle<()>>,
}

impl CacheArranger {
    /// Spawns the worker thread against `orm`.
    #[must_use]
    pub fn spawn(orm: Arc<Orm>) -> Self {
        let (sender, receiver) = mpsc::channel::<ArrangeRequest>();
        let worker = std::thread::spawn(move || {
            for request in receiver {
                match request {
                    ArrangeRequest::Warm {
                        graph,
                        branch,
                        turn,
                        tick,
                    } => {
                        let _ = orm.prefetch(&graph, &branch, turn, tick);
                    }
                    ArrangeRequest::Shutdown => break,
                }
            }
        });
        Self {
            sender,
            worker: Some(worker),
        }
    }

    /// Queues a prefetch request. Silently dropped if the worker has
    /// already shut down.
    pub fn request(&self, request: ArrangeRequest) {
        let _ = self.sender.send(request);
    }

    /// Drains the queue and stops the worker, joining its thread. Matches
    /// the queue-plus-sentinel shutdown pattern a `Queue`-backed worker
    /// uses elsewhere in this codebase's ancestry.
    pub fn shutdown(&mut self) {
        let _ = self.sender.send(ArrangeRequest::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for CacheArranger {
    fn drop(&mut self) {
        self.shutdown();
    }
}
