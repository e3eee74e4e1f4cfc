//! Background Dispatch
//!
//! A deferred open runs the backing-store resolution off the calling thread.
//! [`TaskSpawner`] abstracts where that work executes so the adapters do not
//! depend on any particular runtime's dispatch primitives; [`TokioSpawner`]
//! submits to a Tokio runtime's blocking pool, [`ThreadSpawner`] falls back
//! to a detached thread so adapters work without a runtime at all.

/// Submits a one-shot task to a background execution context.
pub trait TaskSpawner: Send + Sync {
    /// Runs `task` off the calling thread. The task may block.
    fn spawn_blocking(&self, task: Box<dyn FnOnce() + Send + 'static>);
}

/// Dispatches onto a Tokio runtime's blocking pool.
#[derive(Debug, Clone)]
pub struct TokioSpawner {
    handle: tokio::runtime::Handle,
}

impl TokioSpawner {
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Captures the runtime of the calling context.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn current() -> Self {
        Self {
            handle: tokio::runtime::Handle::current(),
        }
    }
}

impl TaskSpawner for TokioSpawner {
    fn spawn_blocking(&self, task: Box<dyn FnOnce() + Send + 'static>) {
        self.handle.spawn_blocking(task);
    }
}

/// Dispatches onto a freshly spawned detached thread.
#[derive(Debug, Clone, Default)]
pub struct ThreadSpawner;

impl TaskSpawner for ThreadSpawner {
    fn spawn_blocking(&self, task: Box<dyn FnOnce() + Send + 'static>) {
        std::thread::spawn(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn thread_spawner_runs_the_task() {
        let (tx, rx) = mpsc::channel();
        ThreadSpawner.spawn_blocking(Box::new(move || {
            tx.send(11u32).unwrap();
        }));
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 11);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn tokio_spawner_runs_the_task() {
        let (tx, rx) = mpsc::channel();
        TokioSpawner::current().spawn_blocking(Box::new(move || {
            tx.send(22u32).unwrap();
        }));
        tokio::task::spawn_blocking(move || {
            assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 22);
        })
        .await
        .unwrap();
    }
}
