use crate::{Result, Row, Value};
use std::future::Future;

/// One physical database connection.
///
/// Transaction control at this level is native (`BEGIN`/`COMMIT`/`ROLLBACK`
/// on the wire); savepoints are ordinary statements issued through a cursor.
pub trait Connection: Send + 'static {
    type Cursor<'c>: Cursor
    where
        Self: 'c;

    /// Open a cursor for statement execution.
    fn cursor(&mut self) -> Self::Cursor<'_>;

    /// Start a native transaction.
    fn begin(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Commit the native transaction.
    fn commit(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Roll back the native transaction.
    fn rollback(&mut self) -> impl Future<Output = Result<()>> + Send;
}

/// Statement execution handle scoped to a connection.
///
/// `close` must run on success and failure paths alike; the session layer
/// guarantees it does for every cursor it opens.
pub trait Cursor: Send {
    fn execute(
        &mut self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Result<()>> + Send;

    fn fetch_one(&mut self) -> impl Future<Output = Result<Option<Row>>> + Send;

    fn fetch_all(&mut self) -> impl Future<Output = Result<Vec<Row>>> + Send;

    fn close(&mut self) -> impl Future<Output = Result<()>> + Send;
}

/// Execute one statement through a fresh cursor, closing it on every path.
pub(crate) async fn run_statement<C: Connection>(
    connection: &mut C,
    sql: &str,
    params: &[Value],
) -> Result<()> {
    let mut cursor = connection.cursor();
    let result = cursor.execute(sql, params).await;
    let closed = cursor.close().await;
    settle(result, closed)
}

/// Merge an operation outcome with its cleanup outcome: the operation error
/// is surfaced unchanged unless cleanup itself failed, in which case the
/// cleanup error wins and carries the original as context.
pub(crate) fn settle<T>(operation: Result<T>, cleanup: Result<()>) -> Result<T> {
    match (operation, cleanup) {
        (Ok(value), Ok(())) => Ok(value),
        (Err(error), Ok(())) => Err(error),
        (Ok(_), Err(error)) => Err(error),
        (Err(original), Err(cleanup)) => Err(cleanup.context(original)),
    }
}
