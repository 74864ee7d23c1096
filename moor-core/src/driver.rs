use crate::{Connection, Dialect, Pool, Result};
use std::future::Future;

/// Binds the collaborating types a backend contributes: its connection pool,
/// its connections and its dialect.
pub trait Driver: Sized + Send + Sync + 'static {
    /// Connection URL scheme, e.g. `memory` for `memory://...` URLs.
    const NAME: &'static str;

    type Pool: Pool<Self>;
    type Connection: Connection;
    type Dialect: Dialect;

    fn dialect() -> Self::Dialect;

    /// Create a connection pool for the given URL.
    fn connect(url: &str) -> impl Future<Output = Result<Self::Pool>> + Send;
}
