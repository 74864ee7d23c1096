use thiserror::Error;

/// Typed failures raised by the session layer itself.
///
/// Statement and driver errors travel as plain [`crate::Error`] values and are
/// surfaced verbatim; this enum covers the cases a caller may want to match
/// on, recoverable with `downcast_ref` from the propagated error.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A session or transaction was driven in the wrong state (commit before
    /// start, double commit, close with outstanding leases). Always a caller
    /// bug, never retried.
    #[error("{0}")]
    Usage(&'static str),
    /// Field lookup on a [`crate::Record`] by a name absent from the result
    /// columns.
    #[error("no column named `{0}` in the result set")]
    UnknownColumn(String),
    /// The pool could not hand out a connection in time.
    #[error("connection pool exhausted")]
    PoolExhausted,
    /// A connection could not be established at all.
    #[error("could not establish a connection: {0}")]
    ConnectFailed(String),
}
