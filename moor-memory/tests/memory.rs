#[cfg(test)]
mod tests {
    use moor::Database;
    use moor_memory::MemoryDriver;
    use moor_tests::{execute_tests, init_logs};

    #[tokio::test]
    async fn memory() {
        init_logs();
        let database = Database::<MemoryDriver>::connect("memory://tests")
            .await
            .expect("Could not open the database");
        execute_tests(&database).await;
        database
            .close()
            .await
            .expect("Could not close the database");
    }
}
