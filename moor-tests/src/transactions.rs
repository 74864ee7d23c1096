use moor::{
    ColumnType, Comparison, Database, Driver, SessionError, Statement, TransactionState,
};

fn names() -> Statement {
    Statement::select("entries")
        .column("name", ColumnType::Text)
        .into()
}

/// The nested transaction state machine: one root per session, savepoints
/// for everything below it, nested rollback undoing only its own scope and
/// nested commit merging into the root.
pub async fn nested_transactions<D: Driver>(database: &Database<D>) {
    let mut session = database.session();
    session
        .execute(
            &Statement::create_table("entries")
                .column("id", ColumnType::Integer)
                .column("name", ColumnType::Text)
                .into(),
        )
        .await
        .expect("Failed to create the entries table");

    let mut root = session.transaction();
    root.start(&mut session)
        .await
        .expect("Could not start the root transaction");
    assert_eq!(root.is_root(), Some(true));
    assert!(root.savepoint().is_none());
    assert!(session.has_root_transaction());
    assert_eq!(session.lease_count(), 1);

    session
        .execute(
            &Statement::insert("entries")
                .column("id")
                .column("name")
                .value(1)
                .value("first")
                .into(),
        )
        .await
        .expect("Failed to insert the first entry");

    // A transaction opened while the root is active becomes a savepoint on
    // the same leased connection.
    let mut nested = session.transaction();
    nested
        .start(&mut session)
        .await
        .expect("Could not start the nested transaction");
    assert_eq!(nested.is_root(), Some(false));
    assert!(nested.savepoint().is_some());
    assert!(session.has_root_transaction());
    assert_eq!(session.lease_count(), 2);

    session
        .execute(
            &Statement::insert("entries")
                .column("id")
                .column("name")
                .value(2)
                .value("second")
                .into(),
        )
        .await
        .expect("Failed to insert the second entry");

    // Rolling back the nested transaction undoes only its statements and
    // keeps the root active.
    nested
        .rollback(&mut session)
        .await
        .expect("Could not roll back the nested transaction");
    assert_eq!(nested.state(), TransactionState::RolledBack);
    assert!(session.has_root_transaction());
    assert_eq!(session.lease_count(), 1);

    let rows = session
        .fetch_all(&names())
        .await
        .expect("Failed to fetch the entries");
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].try_get::<String>("name").expect("Missing name"),
        "first"
    );

    // Committing (releasing) a nested transaction merges its effects into
    // the still-open root.
    let mut nested = session.transaction();
    nested
        .start(&mut session)
        .await
        .expect("Could not start the second nested transaction");
    session
        .execute(
            &Statement::insert("entries")
                .column("id")
                .column("name")
                .value(3)
                .value("third")
                .into(),
        )
        .await
        .expect("Failed to insert the third entry");
    nested
        .commit(&mut session)
        .await
        .expect("Could not commit the nested transaction");
    assert!(session.has_root_transaction());

    root.commit(&mut session)
        .await
        .expect("Could not commit the root transaction");
    assert!(!session.has_root_transaction());
    assert_eq!(session.lease_count(), 0);
    assert!(!session.is_leased());
    session.close().await.expect("Could not close the session");

    // The committed rows are durably visible from a fresh session.
    let mut other = database.session();
    let rows = other
        .fetch_all(&names())
        .await
        .expect("Failed to fetch the entries from a fresh session");
    let names = rows
        .iter()
        .map(|row| row.try_get::<String>("name").expect("Missing name"))
        .collect::<Vec<_>>();
    assert_eq!(names, ["first", "third"]);
    other.close().await.expect("Could not close the session");
}

/// The root commit path on its own: begin, insert, commit, observe from
/// another session.
pub async fn root_commit<D: Driver>(database: &Database<D>) {
    let mut session = database.session();
    session
        .execute(
            &Statement::create_table("accounts")
                .column("id", ColumnType::Integer)
                .column("balance", ColumnType::Integer)
                .into(),
        )
        .await
        .expect("Failed to create the accounts table");

    let mut transaction = session.transaction();
    transaction
        .start(&mut session)
        .await
        .expect("Could not start the transaction");
    session
        .execute(
            &Statement::insert("accounts")
                .column("id")
                .column("balance")
                .value(1)
                .value(100)
                .into(),
        )
        .await
        .expect("Failed to insert the account");
    transaction
        .commit(&mut session)
        .await
        .expect("Could not commit the transaction");
    assert_eq!(transaction.state(), TransactionState::Committed);
    session.close().await.expect("Could not close the session");

    let mut other = database.session();
    let row = other
        .fetch_one(
            &Statement::select("accounts")
                .column("balance", ColumnType::Integer)
                .filter("id", Comparison::Equal, 1)
                .into(),
        )
        .await
        .expect("Failed to fetch the account")
        .expect("The committed account is missing");
    assert_eq!(row.try_get::<i64>("balance").expect("Missing balance"), 100);
    other.close().await.expect("Could not close the session");
}

/// Driving a transaction in the wrong state is a usage error, reported
/// without touching the connection.
pub async fn usage_errors<D: Driver>(database: &Database<D>) {
    let mut session = database.session();

    // Committing before start.
    let mut transaction = session.transaction();
    let error = transaction
        .commit(&mut session)
        .await
        .expect_err("Committing an unstarted transaction must fail");
    assert!(matches!(
        error.downcast_ref::<SessionError>(),
        Some(SessionError::Usage(..))
    ));
    assert_eq!(session.lease_count(), 0);

    // Double start.
    let mut transaction = session.transaction();
    transaction
        .start(&mut session)
        .await
        .expect("Could not start the transaction");
    let error = transaction
        .start(&mut session)
        .await
        .expect_err("Starting a transaction twice must fail");
    assert!(matches!(
        error.downcast_ref::<SessionError>(),
        Some(SessionError::Usage(..))
    ));

    // Double commit.
    transaction
        .commit(&mut session)
        .await
        .expect("Could not commit the transaction");
    let error = transaction
        .commit(&mut session)
        .await
        .expect_err("Committing a transaction twice must fail");
    assert!(matches!(
        error.downcast_ref::<SessionError>(),
        Some(SessionError::Usage(..))
    ));

    // Rollback after commit.
    let error = transaction
        .rollback(&mut session)
        .await
        .expect_err("Rolling back a committed transaction must fail");
    assert!(matches!(
        error.downcast_ref::<SessionError>(),
        Some(SessionError::Usage(..))
    ));
    assert_eq!(session.lease_count(), 0);
    assert!(!session.has_root_transaction());

    // Closing with an outstanding lease is refused.
    session
        .acquire_connection()
        .await
        .expect("Could not acquire a lease");
    let error = session
        .close()
        .await
        .expect_err("Closing with an outstanding lease must fail");
    assert!(matches!(
        error.downcast_ref::<SessionError>(),
        Some(SessionError::Usage(..))
    ));
    session.release_connection();

    session.close().await.expect("Could not close the session");
}
