use crate::{MemoryConnection, MemoryDialect, MemoryPool, MemoryPoolOptions};
use moor_core::{Context, Driver, Error, Result};
use std::time::Duration;
use url::Url;

/// In-memory driver: a backend with real transaction and savepoint
/// semantics and no server behind it. Reference implementation and test bed
/// for the session layer.
pub struct MemoryDriver;

impl Driver for MemoryDriver {
    const NAME: &'static str = "memory";

    type Pool = MemoryPool;
    type Connection = MemoryConnection;
    type Dialect = MemoryDialect;

    fn dialect() -> MemoryDialect {
        MemoryDialect
    }

    async fn connect(url: &str) -> Result<MemoryPool> {
        let prefix = format!("{}://", Self::NAME);
        if !url.starts_with(&prefix) {
            return Err(Error::msg(format!(
                "Expected memory connection url to start with `{prefix}`"
            )));
        }
        let context = || format!("While decoding connection URL: `{url}`");
        let url = Url::parse(url).with_context(context)?;
        let mut options = MemoryPoolOptions::default();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "max_connections" => {
                    options.max_connections = value.parse().with_context(context)?;
                }
                "acquire_timeout_ms" => {
                    options.acquire_timeout =
                        Some(Duration::from_millis(value.parse().with_context(context)?));
                }
                other => log::warn!("Ignoring unknown connection parameter `{other}`"),
            }
        }
        Ok(MemoryPool::new(options))
    }
}
