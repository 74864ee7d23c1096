#[cfg(test)]
mod tests {
    use moor::{Connection, Cursor, Driver, Pool, Row, Value};
    use moor_memory::{MemoryConnection, MemoryDriver};
    use moor_tests::init_logs;

    async fn run(connection: &mut MemoryConnection, sql: &str, params: &[Value]) {
        let mut cursor = connection.cursor();
        cursor
            .execute(sql, params)
            .await
            .unwrap_or_else(|e| panic!("Failed to run `{sql}`: {e:#}"));
        cursor.close().await.expect("Failed to close the cursor");
    }

    async fn ids(connection: &mut MemoryConnection) -> Vec<i64> {
        let mut cursor = connection.cursor();
        cursor
            .execute("SELECT id FROM t", &[])
            .await
            .expect("Failed to select");
        let rows = cursor.fetch_all().await.expect("Failed to fetch");
        cursor.close().await.expect("Failed to close the cursor");
        rows.iter()
            .map(|row: &Row| match &row[0] {
                Value::Int64(Some(id)) => *id,
                other => panic!("Unexpected id value {other:?}"),
            })
            .collect()
    }

    #[tokio::test]
    async fn savepoint_stays_valid_after_rollback_to_it() {
        init_logs();
        let pool = MemoryDriver::connect("memory://savepoints")
            .await
            .expect("Could not create the pool");
        let mut connection = pool.acquire().await.expect("Could not acquire");

        run(&mut connection, "CREATE TABLE t (id BIGINT)", &[]).await;
        connection.begin().await.expect("Failed to begin");
        run(
            &mut connection,
            "INSERT INTO t (id) VALUES (?)",
            &[Value::Int64(Some(1))],
        )
        .await;
        run(&mut connection, "SAVEPOINT sp1", &[]).await;

        run(
            &mut connection,
            "INSERT INTO t (id) VALUES (?)",
            &[Value::Int64(Some(2))],
        )
        .await;
        run(&mut connection, "ROLLBACK TO SAVEPOINT sp1", &[]).await;
        assert_eq!(ids(&mut connection).await, [1]);

        // Standard semantics: the savepoint survives a rollback to it.
        run(
            &mut connection,
            "INSERT INTO t (id) VALUES (?)",
            &[Value::Int64(Some(3))],
        )
        .await;
        run(&mut connection, "ROLLBACK TO SAVEPOINT sp1", &[]).await;
        assert_eq!(ids(&mut connection).await, [1]);

        run(
            &mut connection,
            "INSERT INTO t (id) VALUES (?)",
            &[Value::Int64(Some(4))],
        )
        .await;
        run(&mut connection, "RELEASE SAVEPOINT sp1", &[]).await;
        connection.commit().await.expect("Failed to commit");
        assert_eq!(ids(&mut connection).await, [1, 4]);

        pool.release(connection);
    }

    #[tokio::test]
    async fn transaction_changes_stay_private_until_commit() {
        init_logs();
        let pool = MemoryDriver::connect("memory://visibility")
            .await
            .expect("Could not create the pool");
        let mut writer = pool.acquire().await.expect("Could not acquire");
        let mut reader = pool.acquire().await.expect("Could not acquire");

        run(&mut writer, "CREATE TABLE t (id BIGINT)", &[]).await;
        assert!(!writer.in_transaction());
        writer.begin().await.expect("Failed to begin");
        assert!(writer.in_transaction());
        run(
            &mut writer,
            "INSERT INTO t (id) VALUES (?)",
            &[Value::Int64(Some(1))],
        )
        .await;
        assert!(ids(&mut reader).await.is_empty());
        writer.commit().await.expect("Failed to commit");
        assert!(!writer.in_transaction());
        assert_eq!(ids(&mut reader).await, [1]);

        pool.release(writer);
        pool.release(reader);
    }

    #[tokio::test]
    async fn transaction_misuse_is_rejected() {
        init_logs();
        let pool = MemoryDriver::connect("memory://misuse")
            .await
            .expect("Could not create the pool");
        let mut connection = pool.acquire().await.expect("Could not acquire");

        assert!(connection.commit().await.is_err());
        assert!(connection.rollback().await.is_err());

        let mut cursor = connection.cursor();
        assert!(
            cursor.execute("SAVEPOINT lonely", &[]).await.is_err(),
            "a savepoint outside of a transaction must be rejected"
        );
        cursor.close().await.expect("Failed to close the cursor");

        connection.begin().await.expect("Failed to begin");
        assert!(connection.begin().await.is_err());
        connection.rollback().await.expect("Failed to roll back");

        pool.release(connection);
    }
}
