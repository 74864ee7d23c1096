use crate::{Driver, Result};
use std::future::Future;

/// Supplies and reclaims the physical connections a [`crate::Session`]
/// leases.
///
/// `release` is synchronous: returning a connection is a queue push, not an
/// I/O operation, so it can run from any cleanup path, including drops where
/// no executor is available. All resilience (redialing, health checks,
/// timeouts) belongs behind this trait, not above it.
pub trait Pool<D: Driver>: Send + Sync + 'static {
    /// Borrow a connection, suspending until one is available. Fails with
    /// [`crate::SessionError::PoolExhausted`] or
    /// [`crate::SessionError::ConnectFailed`].
    fn acquire(&self) -> impl Future<Output = Result<D::Connection>> + Send;

    /// Return a previously acquired connection.
    fn release(&self, connection: D::Connection);

    /// Close the pool and drop its idle connections.
    fn close(&self) -> impl Future<Output = Result<()>> + Send;
}
