use crate::{
    Connection, Cursor, Dialect, Driver, Insert, Pool, Record, Result, SessionError, Statement,
    Transaction, Value,
    connection::{run_statement, settle},
};
use std::sync::Arc;

/// A logical database session.
///
/// Statements and transactions nested arbitrarily deep within one session
/// multiplex a single physical connection: savepoints are connection-scoped,
/// so everything the session runs has to land on the connection its root
/// transaction runs on. The connection is borrowed from the pool when the
/// first holder acquires a lease and returned when the last one releases it;
/// holders never need to know whether they are the outermost.
///
/// A session is not internally synchronized. Overlapping operations from
/// multiple tasks on the same session are unsupported and must be serialized
/// by the caller; the lease counter and the root-transaction flag are plain
/// fields mutated between suspension points.
pub struct Session<D: Driver> {
    pool: Arc<D::Pool>,
    dialect: D::Dialect,
    connection: Option<D::Connection>,
    lease_count: u32,
    has_root_transaction: bool,
    rollback_isolation: bool,
    isolation: Option<Transaction>,
}

impl<D: Driver> Session<D> {
    pub fn new(pool: Arc<D::Pool>, dialect: D::Dialect) -> Self {
        Self {
            pool,
            dialect,
            connection: None,
            lease_count: 0,
            has_root_transaction: false,
            rollback_isolation: false,
            isolation: None,
        }
    }

    /// Wrap the session in a transaction that [`close`](Self::close) always
    /// rolls back, so the session's net effect on persistent state is void
    /// no matter what ran inside. Meant for test isolation.
    pub fn with_rollback_isolation(mut self) -> Self {
        self.rollback_isolation = true;
        self
    }

    /// Enter the session scope. With rollback isolation enabled this starts
    /// the isolation transaction; otherwise it is a no-op.
    pub async fn begin(&mut self) -> Result<()> {
        if self.rollback_isolation && self.isolation.is_none() {
            let mut transaction = self.transaction();
            transaction.start(self).await?;
            self.isolation = Some(transaction);
        }
        Ok(())
    }

    /// Leave the session scope: roll back the isolation transaction, if any,
    /// and verify every lease has been returned.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(mut transaction) = self.isolation.take() {
            transaction.rollback(self).await?;
        }
        if self.lease_count != 0 {
            return Err(
                SessionError::Usage("session closed with outstanding connection leases").into(),
            );
        }
        Ok(())
    }

    /// Create a transaction on this session. Nothing happens until
    /// [`Transaction::start`] runs; whether it becomes the root or a
    /// savepoint is decided there.
    pub fn transaction(&self) -> Transaction {
        Transaction::new()
    }

    pub fn dialect(&self) -> &D::Dialect {
        &self.dialect
    }

    /// Number of outstanding connection leases.
    pub fn lease_count(&self) -> u32 {
        self.lease_count
    }

    /// Whether a connection is currently borrowed from the pool.
    pub fn is_leased(&self) -> bool {
        self.connection.is_some()
    }

    /// Whether a root transaction is open on this session.
    pub fn has_root_transaction(&self) -> bool {
        self.has_root_transaction
    }

    pub(crate) fn set_root_transaction(&mut self, value: bool) {
        self.has_root_transaction = value;
    }

    pub(crate) fn leased_connection(&mut self) -> Result<&mut D::Connection> {
        self.connection
            .as_mut()
            .ok_or_else(|| SessionError::Usage("no connection is leased").into())
    }

    /// Lease the session connection, borrowing from the pool on the first
    /// acquisition and returning the already-leased connection otherwise.
    ///
    /// Every call must be paired with one
    /// [`release_connection`](Self::release_connection), on error paths too.
    pub async fn acquire_connection(&mut self) -> Result<&mut D::Connection> {
        if self.connection.is_none() {
            self.connection = Some(self.pool.acquire().await?);
        }
        self.lease_count += 1;
        Ok(self
            .connection
            .as_mut()
            .expect("a leased connection is present while lease_count > 0"))
    }

    /// Release one lease; the last holder returns the connection to the
    /// pool.
    ///
    /// # Panics
    ///
    /// Panics when no lease is outstanding. An unbalanced release is a
    /// pairing bug and must not pass silently.
    pub fn release_connection(&mut self) {
        assert!(
            self.lease_count > 0,
            "connection lease released more times than acquired"
        );
        self.lease_count -= 1;
        if self.lease_count == 0 {
            let connection = self
                .connection
                .take()
                .expect("a leased connection is present while lease_count > 0");
            self.pool.release(connection);
        }
    }

    /// Compile and run a statement, discarding any rows it produces.
    pub async fn execute(&mut self, statement: &Statement) -> Result<()> {
        let compiled = self.dialect.compile(statement)?;
        log::debug!("execute: {} {:?}", compiled.sql, compiled.params);
        let connection = self.acquire_connection().await?;
        let result = run_statement(connection, &compiled.sql, &compiled.params).await;
        self.release_connection();
        result
    }

    /// Compile and run the insert once per value set, sharing one lease and
    /// one cursor across the whole batch. The batch is not wire-batched;
    /// throughput comes from reusing the leased connection. An empty batch
    /// still leases and releases exactly once and executes nothing.
    pub async fn execute_many(&mut self, insert: &Insert, values: &[Vec<Value>]) -> Result<()> {
        let compiled = values
            .iter()
            .map(|row| {
                self.dialect
                    .compile(&insert.clone().values(row.iter().cloned()).into())
            })
            .collect::<Result<Vec<_>>>()?;
        let connection = self.acquire_connection().await?;
        let mut cursor = connection.cursor();
        let mut result = Ok(());
        for compiled in &compiled {
            log::debug!("execute_many: {} {:?}", compiled.sql, compiled.params);
            result = cursor.execute(&compiled.sql, &compiled.params).await;
            if result.is_err() {
                break;
            }
        }
        let result = settle(result, cursor.close().await);
        drop(cursor);
        self.release_connection();
        result
    }

    /// Run a query and return every row as a [`Record`].
    pub async fn fetch_all(&mut self, statement: &Statement) -> Result<Vec<Record>> {
        let compiled = self.dialect.compile(statement)?;
        log::debug!("fetch_all: {} {:?}", compiled.sql, compiled.params);
        let connection = self.acquire_connection().await?;
        let mut cursor = connection.cursor();
        let rows = match cursor.execute(&compiled.sql, &compiled.params).await {
            Ok(()) => cursor.fetch_all().await,
            Err(error) => Err(error),
        };
        let rows = settle(rows, cursor.close().await);
        drop(cursor);
        self.release_connection();
        Ok(rows?
            .into_iter()
            .map(|row| Record::new(row, compiled.columns.clone()))
            .collect())
    }

    /// Run a query and return its first row, if any.
    pub async fn fetch_one(&mut self, statement: &Statement) -> Result<Option<Record>> {
        let compiled = self.dialect.compile(statement)?;
        log::debug!("fetch_one: {} {:?}", compiled.sql, compiled.params);
        let connection = self.acquire_connection().await?;
        let mut cursor = connection.cursor();
        let row = match cursor.execute(&compiled.sql, &compiled.params).await {
            Ok(()) => cursor.fetch_one().await,
            Err(error) => Err(error),
        };
        let row = settle(row, cursor.close().await);
        drop(cursor);
        self.release_connection();
        Ok(row?.map(|row| Record::new(row, compiled.columns.clone())))
    }
}

impl<D: Driver> Drop for Session<D> {
    /// Backstop for cancelled tasks: a session dropped while a lease is
    /// outstanding still returns its connection to the pool.
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            log::warn!(
                "session dropped while holding {} connection lease(s)",
                self.lease_count
            );
            self.pool.release(connection);
        }
    }
}
