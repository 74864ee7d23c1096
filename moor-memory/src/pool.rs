use crate::{MemoryConnection, MemoryDriver, MemoryStore};
use moor_core::{Pool, Result, SessionError};
use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};
use tokio::sync::Semaphore;

/// Pool configuration.
#[derive(Debug, Clone)]
pub struct MemoryPoolOptions {
    /// Cap on concurrently handed out connections.
    pub max_connections: usize,
    /// How long `acquire` may wait on an exhausted pool before failing with
    /// [`SessionError::PoolExhausted`]. `None` waits indefinitely.
    pub acquire_timeout: Option<Duration>,
}

impl Default for MemoryPoolOptions {
    fn default() -> Self {
        Self {
            max_connections: 8,
            acquire_timeout: None,
        }
    }
}

/// Snapshot of pool usage.
#[derive(Debug, Clone, Copy)]
pub struct MemoryPoolStats {
    /// Connections handed out over the pool's lifetime.
    pub acquired_total: usize,
    /// Connections sitting idle in the pool.
    pub idle: usize,
    /// Remaining capacity before `acquire` has to wait.
    pub available: usize,
}

/// Hands out [`MemoryConnection`]s to a shared [`MemoryStore`], up to a
/// configured cap.
pub struct MemoryPool {
    store: Arc<MemoryStore>,
    options: MemoryPoolOptions,
    idle: Mutex<Vec<MemoryConnection>>,
    permits: Semaphore,
    closed: AtomicBool,
    acquired: AtomicUsize,
}

impl MemoryPool {
    pub fn new(options: MemoryPoolOptions) -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            permits: Semaphore::new(options.max_connections),
            options,
            idle: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
            acquired: AtomicUsize::new(0),
        }
    }

    pub fn options(&self) -> &MemoryPoolOptions {
        &self.options
    }

    pub fn stats(&self) -> MemoryPoolStats {
        MemoryPoolStats {
            acquired_total: self.acquired.load(Ordering::SeqCst),
            idle: self.idle.lock().expect("pool mutex poisoned").len(),
            available: self.permits.available_permits(),
        }
    }
}

impl Pool<MemoryDriver> for MemoryPool {
    async fn acquire(&self) -> Result<MemoryConnection> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(SessionError::ConnectFailed("the pool is closed".into()).into());
        }
        let permit = match self.options.acquire_timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.permits.acquire())
                .await
                .map_err(|_| SessionError::PoolExhausted)?,
            None => self.permits.acquire().await,
        };
        permit
            .map_err(|_| SessionError::ConnectFailed("the pool is closed".into()))?
            .forget();
        self.acquired.fetch_add(1, Ordering::SeqCst);
        let idle = self.idle.lock().expect("pool mutex poisoned").pop();
        Ok(idle.unwrap_or_else(|| MemoryConnection::new(self.store.clone())))
    }

    fn release(&self, mut connection: MemoryConnection) {
        connection.reset();
        if !self.closed.load(Ordering::SeqCst) {
            self.idle
                .lock()
                .expect("pool mutex poisoned")
                .push(connection);
        }
        self.permits.add_permits(1);
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        // Wakes pending acquires with an error.
        self.permits.close();
        self.idle.lock().expect("pool mutex poisoned").clear();
        Ok(())
    }
}
