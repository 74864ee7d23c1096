#[cfg(test)]
mod tests {
    use moor::{Database, SessionError};
    use moor_memory::MemoryDriver;
    use moor_tests::init_logs;

    #[tokio::test]
    async fn exhausted_pool_times_out() {
        init_logs();
        let database = Database::<MemoryDriver>::connect(
            "memory://pool?max_connections=1&acquire_timeout_ms=50",
        )
        .await
        .expect("Could not open the database");
        assert_eq!(database.pool().options().max_connections, 1);

        let mut first = database.session();
        first
            .acquire_connection()
            .await
            .expect("Could not acquire the only connection");

        let mut second = database.session();
        let error = second
            .acquire_connection()
            .await
            .expect_err("Acquiring beyond the cap must time out");
        assert!(matches!(
            error.downcast_ref::<SessionError>(),
            Some(SessionError::PoolExhausted)
        ));

        // Releasing frees the slot for other sessions.
        first.release_connection();
        second
            .acquire_connection()
            .await
            .expect("Could not acquire after the connection was released");
        second.release_connection();
    }

    #[tokio::test]
    async fn closed_pool_refuses_connections() {
        init_logs();
        let database = Database::<MemoryDriver>::connect("memory://closing")
            .await
            .expect("Could not open the database");
        database
            .close()
            .await
            .expect("Could not close the database");

        let mut session = database.session();
        let error = session
            .acquire_connection()
            .await
            .expect_err("A closed pool must refuse connections");
        assert!(matches!(
            error.downcast_ref::<SessionError>(),
            Some(SessionError::ConnectFailed(..))
        ));
    }

    #[tokio::test]
    async fn batch_takes_a_single_connection() {
        init_logs();
        let database = Database::<MemoryDriver>::connect("memory://batching")
            .await
            .expect("Could not open the database");
        let mut session = database.session();
        session
            .execute(
                &moor::Statement::create_table("rows")
                    .column("id", moor::ColumnType::Integer)
                    .into(),
            )
            .await
            .expect("Failed to create the table");

        let before = database.pool().stats().acquired_total;
        let insert = moor::Statement::insert("rows").column("id");
        session
            .execute_many(
                &insert,
                &[vec![1.into()], vec![2.into()], vec![3.into()]],
            )
            .await
            .expect("Failed to insert the batch");
        let after = database.pool().stats().acquired_total;
        assert_eq!(after - before, 1, "a batch must lease exactly once");
        session.close().await.expect("Could not close the session");
    }

    #[tokio::test]
    async fn dropped_session_returns_its_connection() {
        init_logs();
        let database = Database::<MemoryDriver>::connect(
            "memory://dropping?max_connections=1&acquire_timeout_ms=50",
        )
        .await
        .expect("Could not open the database");

        let mut session = database.session();
        session
            .acquire_connection()
            .await
            .expect("Could not acquire the connection");
        // Dropped without release: the backstop must return the connection.
        drop(session);

        let mut session = database.session();
        session
            .acquire_connection()
            .await
            .expect("The dropped session must have returned its connection");
        session.release_connection();
    }

    #[tokio::test]
    #[should_panic(expected = "connection lease released more times than acquired")]
    async fn unbalanced_release_panics() {
        let database = Database::<MemoryDriver>::connect("memory://imbalance")
            .await
            .expect("Could not open the database");
        let mut session = database.session();
        session.release_connection();
    }
}
