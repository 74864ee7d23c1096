use crate::{Connection, Dialect, Driver, Result, Session, SessionError, connection::run_statement};
use uuid::Uuid;

/// Where a transaction is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Unstarted,
    Active,
    Committed,
    RolledBack,
}

/// How a transaction maps onto the connection. Decided when
/// [`Transaction::start`] runs, not at construction: any transaction may
/// turn out root or nested depending on what is already open on the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TransactionKind {
    /// The outermost transaction: native BEGIN / COMMIT / ROLLBACK.
    Root,
    /// Opened while the root was active: SAVEPOINT / RELEASE SAVEPOINT /
    /// ROLLBACK TO SAVEPOINT on the same leased connection.
    Nested { savepoint: String },
}

/// A transaction on a [`Session`].
///
/// Exactly one root transaction exists per session at a time; every
/// transaction started while the root is open becomes a savepoint on the
/// same leased connection. The lease taken by `start` is held for the whole
/// start→commit/rollback lifetime and released exactly once when the
/// transaction terminates, on success and on failure alike.
///
/// Methods take the owning session explicitly: the session carries the
/// shared state (lease counter, root flag) without internal locking, so the
/// single `&mut` is threaded through rather than hidden behind a mutex.
#[derive(Debug)]
pub struct Transaction {
    state: TransactionState,
    kind: Option<TransactionKind>,
}

impl Transaction {
    pub(crate) fn new() -> Self {
        Self {
            state: TransactionState::Unstarted,
            kind: None,
        }
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Whether this transaction became the session root. `None` until
    /// started.
    pub fn is_root(&self) -> Option<bool> {
        self.kind
            .as_ref()
            .map(|kind| matches!(kind, TransactionKind::Root))
    }

    /// The savepoint identifier of a nested transaction.
    pub fn savepoint(&self) -> Option<&str> {
        match &self.kind {
            Some(TransactionKind::Nested { savepoint }) => Some(savepoint),
            _ => None,
        }
    }

    /// Activate the transaction: lease the session connection, become root
    /// if no root is open, and issue `BEGIN` or `SAVEPOINT`.
    ///
    /// On failure the freshly taken lease is released and the transaction
    /// stays unstarted.
    pub async fn start<D: Driver>(&mut self, session: &mut Session<D>) -> Result<()> {
        if self.state != TransactionState::Unstarted {
            return Err(SessionError::Usage("transaction was already started").into());
        }
        let kind = if session.has_root_transaction() {
            TransactionKind::Nested {
                savepoint: fresh_savepoint_name(),
            }
        } else {
            TransactionKind::Root
        };
        let sql = match &kind {
            TransactionKind::Root => None,
            TransactionKind::Nested { savepoint } => {
                let mut sql = String::new();
                session.dialect().write_savepoint(&mut sql, savepoint);
                Some(sql)
            }
        };
        let connection = session.acquire_connection().await?;
        let result = match &sql {
            None => {
                log::debug!("transaction: begin");
                connection.begin().await
            }
            Some(sql) => {
                log::debug!("transaction: {sql}");
                run_statement(connection, sql, &[]).await
            }
        };
        match result {
            Ok(()) => {
                if matches!(kind, TransactionKind::Root) {
                    session.set_root_transaction(true);
                }
                self.kind = Some(kind);
                self.state = TransactionState::Active;
                Ok(())
            }
            Err(error) => {
                session.release_connection();
                Err(error)
            }
        }
    }

    /// Commit: native COMMIT for the root (which also clears the session's
    /// root flag), `RELEASE SAVEPOINT` for a nested transaction (merging its
    /// effects into the enclosing scope without ending it). The lease is
    /// released either way, and the transaction is terminated even when the
    /// statement failed.
    pub async fn commit<D: Driver>(&mut self, session: &mut Session<D>) -> Result<()> {
        let kind = self.active_kind("cannot commit a transaction that is not active")?;
        let result = match &kind {
            TransactionKind::Root => {
                log::debug!("transaction: commit");
                let result = session.leased_connection()?.commit().await;
                session.set_root_transaction(false);
                result
            }
            TransactionKind::Nested { savepoint } => {
                let mut sql = String::new();
                session.dialect().write_release_savepoint(&mut sql, savepoint);
                log::debug!("transaction: {sql}");
                run_statement(session.leased_connection()?, &sql, &[]).await
            }
        };
        self.state = TransactionState::Committed;
        session.release_connection();
        result
    }

    /// Roll back: native ROLLBACK for the root (clearing the session's root
    /// flag), `ROLLBACK TO SAVEPOINT` for a nested transaction: statements
    /// since the savepoint are undone while the enclosing transaction stays
    /// open and the savepoint remains valid. The lease is released either
    /// way.
    pub async fn rollback<D: Driver>(&mut self, session: &mut Session<D>) -> Result<()> {
        let kind = self.active_kind("cannot roll back a transaction that is not active")?;
        let result = match &kind {
            TransactionKind::Root => {
                log::debug!("transaction: rollback");
                let result = session.leased_connection()?.rollback().await;
                session.set_root_transaction(false);
                result
            }
            TransactionKind::Nested { savepoint } => {
                let mut sql = String::new();
                session
                    .dialect()
                    .write_rollback_to_savepoint(&mut sql, savepoint);
                log::debug!("transaction: {sql}");
                run_statement(session.leased_connection()?, &sql, &[]).await
            }
        };
        self.state = TransactionState::RolledBack;
        session.release_connection();
        result
    }

    fn active_kind(&self, message: &'static str) -> Result<TransactionKind> {
        match (&self.state, &self.kind) {
            (TransactionState::Active, Some(kind)) => Ok(kind.clone()),
            _ => Err(SessionError::Usage(message).into()),
        }
    }
}

/// Process-unique identifier that is valid as a bare SQL identifier.
fn fresh_savepoint_name() -> String {
    format!("MOOR_SAVEPOINT_{}", Uuid::new_v4().simple())
}
