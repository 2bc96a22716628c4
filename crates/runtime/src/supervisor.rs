use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Supervised task pool.
///
/// Tracks every spawned task so the run can wait for all of them to finish,
/// either naturally (quiescence) or after a shutdown signal. Panicking tasks
/// are counted rather than lost.
#[derive(Debug, Clone, Default)]
pub struct Supervisor {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    active: AtomicUsize,
    spawned: AtomicU64,
    panicked: AtomicUsize,
    idle: Notify,
}

/// Held by each running task; releases its slot on completion or unwind.
struct TaskSlot {
    inner: Arc<Inner>,
}

impl TaskSlot {
    fn claim(inner: &Arc<Inner>) -> Self {
        inner.active.fetch_add(1, Ordering::SeqCst);
        inner.spawned.fetch_add(1, Ordering::Relaxed);
        Self {
            inner: Arc::clone(inner),
        }
    }
}

impl Drop for TaskSlot {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.inner.panicked.fetch_add(1, Ordering::SeqCst);
        }
        if self.inner.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.inner.idle.notify_waiters();
        }
    }
}

impl Supervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a supervised task on the current tokio runtime.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let slot = TaskSlot::claim(&self.inner);
        tokio::spawn(async move {
            let _slot = slot;
            task.await;
        });
    }

    /// Tasks currently running.
    pub fn active(&self) -> usize {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Tasks ever spawned.
    pub fn spawned(&self) -> u64 {
        self.inner.spawned.load(Ordering::Relaxed)
    }

    pub fn panicked(&self) -> usize {
        self.inner.panicked.load(Ordering::SeqCst)
    }

    /// Resolves once no supervised task is running.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.active() == 0 {
                return;
            }
            notified.await;
        }
    }
}
