use moor::{ColumnType, Database, Driver, Statement};

/// Properties of the reference-counted connection lease: balanced
/// acquire/release sequences drain to zero, statements do not leak leases,
/// and a batched execute releases its lease exactly once.
pub async fn leasing<D: Driver>(database: &Database<D>) {
    let mut session = database.session();
    assert_eq!(session.lease_count(), 0);
    assert!(!session.is_leased());

    // Nested holders share the one connection and release independently.
    session
        .acquire_connection()
        .await
        .expect("Could not acquire the first lease");
    session
        .acquire_connection()
        .await
        .expect("Could not acquire the nested lease");
    assert_eq!(session.lease_count(), 2);
    assert!(session.is_leased());
    session.release_connection();
    assert_eq!(session.lease_count(), 1);
    assert!(session.is_leased());
    session.release_connection();
    assert_eq!(session.lease_count(), 0);
    assert!(!session.is_leased());

    // Statements lease and fully release around themselves.
    session
        .execute(
            &Statement::create_table("items")
                .column("id", ColumnType::Integer)
                .column("label", ColumnType::Text)
                .into(),
        )
        .await
        .expect("Failed to create the items table");
    assert_eq!(session.lease_count(), 0);
    assert!(!session.is_leased());

    // An empty batch still balances its lease and executes nothing.
    let insert = Statement::insert("items").column("id").column("label");
    session
        .execute_many(&insert, &[])
        .await
        .expect("Failed to run an empty batch");
    assert_eq!(session.lease_count(), 0);
    assert!(!session.is_leased());

    // A batch inside a transaction releases exactly its own lease: the
    // transaction still holds one afterwards.
    let mut transaction = session.transaction();
    transaction
        .start(&mut session)
        .await
        .expect("Could not start the transaction");
    assert_eq!(session.lease_count(), 1);
    session
        .execute_many(
            &insert,
            &[
                vec![1.into(), "first".into()],
                vec![2.into(), "second".into()],
            ],
        )
        .await
        .expect("Failed to insert the items batch");
    assert_eq!(session.lease_count(), 1);
    transaction
        .rollback(&mut session)
        .await
        .expect("Could not roll back the transaction");
    assert_eq!(session.lease_count(), 0);
    assert!(!session.is_leased());

    session.close().await.expect("Could not close the session");
}
