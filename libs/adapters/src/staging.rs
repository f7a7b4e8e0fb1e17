use std::sync::Arc;

use tokio::sync::Mutex;

struct Buffers<F> {
    pending: Vec<F>,
    last_sent: Arc<[F]>,
}

/// Ordered queue of outgoing fragments plus the most recently flushed batch.
///
/// Both halves share one lock. [`take`](Self::take) swaps the pending queue out and publishes it
/// as history in the same critical section, so the network call that follows runs unlocked and
/// concurrent stagers start filling the next batch immediately.
pub struct StagingBuffer<F> {
    inner: Mutex<Buffers<F>>,
}

impl<F> StagingBuffer<F> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Buffers {
                pending: Vec::new(),
                last_sent: Arc::from(Vec::new()),
            }),
        }
    }

    /// Appends one fragment and returns the number now pending.
    pub async fn stage(&self, fragment: F) -> usize {
        let mut guard = self.inner.lock().await;
        guard.pending.push(fragment);
        guard.pending.len()
    }

    /// Empties the pending queue, records it as the last sent batch and returns it.
    pub async fn take(&self) -> Arc<[F]> {
        let mut guard = self.inner.lock().await;
        let batch: Arc<[F]> = Arc::from(std::mem::take(&mut guard.pending));
        guard.last_sent = Arc::clone(&batch);
        batch
    }

    pub async fn last_sent(&self) -> Arc<[F]> {
        Arc::clone(&self.inner.lock().await.last_sent)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.pending.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<F> Default for StagingBuffer<F> {
    fn default() -> Self {
        Self::new()
    }
}
