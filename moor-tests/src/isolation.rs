use moor::{ColumnType, Database, Driver, Statement};

/// A rollback-isolated session leaves persistent state untouched regardless
/// of what ran inside it.
pub async fn isolation<D: Driver>(database: &Database<D>) {
    let mut setup = database.session();
    setup
        .execute(
            &Statement::create_table("events")
                .column("id", ColumnType::Integer)
                .column("kind", ColumnType::Text)
                .into(),
        )
        .await
        .expect("Failed to create the events table");
    setup.close().await.expect("Could not close the session");

    {
        let mut session = database.session().with_rollback_isolation();
        session.begin().await.expect("Could not begin the session");
        session
            .execute(
                &Statement::insert("events")
                    .column("id")
                    .column("kind")
                    .value(1)
                    .value("created")
                    .into(),
            )
            .await
            .expect("Failed to insert the event");

        // Visible inside the isolated session.
        let rows = session
            .fetch_all(
                &Statement::select("events")
                    .column("kind", ColumnType::Text)
                    .into(),
            )
            .await
            .expect("Failed to fetch the events");
        assert_eq!(rows.len(), 1);

        session.close().await.expect("Could not close the session");
    }

    // Gone after the session closed.
    let mut session = database.session();
    let rows = session
        .fetch_all(
            &Statement::select("events")
                .column("kind", ColumnType::Text)
                .into(),
        )
        .await
        .expect("Failed to fetch the events");
    assert!(rows.is_empty());
    session.close().await.expect("Could not close the session");
}
