use crate::{Driver, Pool, Result, Session};
use std::sync::Arc;

/// Entry point to a database: owns the pool and hands out sessions.
pub struct Database<D: Driver> {
    pool: Arc<D::Pool>,
}

impl<D: Driver> Database<D> {
    /// Create a connection pool for the given URL. The scheme must match the
    /// driver (`D::NAME`).
    pub async fn connect(url: &str) -> Result<Self> {
        Ok(Self {
            pool: Arc::new(D::connect(url).await?),
        })
    }

    /// Open a logical session. The session borrows a physical connection
    /// lazily, on its first statement or transaction.
    pub fn session(&self) -> Session<D> {
        Session::new(self.pool.clone(), D::dialect())
    }

    pub fn pool(&self) -> &Arc<D::Pool> {
        &self.pool
    }

    /// Close the underlying pool.
    pub async fn close(&self) -> Result<()> {
        self.pool.close().await
    }
}

impl<D: Driver> Clone for Database<D> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
        }
    }
}
