use moor::{ColumnType, Database, Driver, Statement, Value};

/// Exercises every statement operation of a session: execute, execute_many,
/// fetch_all and fetch_one, under rollback isolation.
pub async fn queries<D: Driver>(database: &Database<D>) {
    let mut session = database.session().with_rollback_isolation();
    session.begin().await.expect("Could not begin the session");

    session
        .execute(
            &Statement::create_table("notes")
                .column("id", ColumnType::Integer)
                .column("text", ColumnType::Text)
                .column("completed", ColumnType::Boolean)
                .into(),
        )
        .await
        .expect("Failed to create the notes table");

    // execute()
    session
        .execute(
            &Statement::insert("notes")
                .column("text")
                .column("completed")
                .value("example1")
                .value(true)
                .into(),
        )
        .await
        .expect("Failed to insert the first note");

    // execute_many()
    let insert = Statement::insert("notes").column("text").column("completed");
    session
        .execute_many(
            &insert,
            &[
                vec!["example2".into(), false.into()],
                vec!["example3".into(), true.into()],
            ],
        )
        .await
        .expect("Failed to insert the notes batch");

    // fetch_all()
    let select = Statement::select("notes")
        .column("text", ColumnType::Text)
        .column("completed", ColumnType::Boolean);
    let results = session
        .fetch_all(&select.clone().into())
        .await
        .expect("Failed to fetch all notes");
    assert_eq!(results.len(), 3);
    let texts = results
        .iter()
        .map(|record| {
            record
                .try_get::<String>("text")
                .expect("Note has no text column")
        })
        .collect::<Vec<_>>();
    assert_eq!(texts, ["example1", "example2", "example3"]);
    assert_eq!(
        results[0].get("completed").expect("Missing completed"),
        Value::Boolean(Some(true))
    );
    assert_eq!(
        results[1].get("completed").expect("Missing completed"),
        Value::Boolean(Some(false))
    );

    // fetch_one()
    let result = session
        .fetch_one(&select.into())
        .await
        .expect("Failed to fetch one note")
        .expect("Expected at least one note");
    assert_eq!(
        result.try_get::<String>("text").expect("Missing text"),
        "example1"
    );
    assert!(result.try_get::<bool>("completed").expect("Missing completed"));

    // fetch_one() on an empty result set
    let none = session
        .fetch_one(
            &Statement::select("notes")
                .column("text", ColumnType::Text)
                .filter("text", moor::Comparison::Equal, "missing")
                .into(),
        )
        .await
        .expect("Failed to fetch from an empty selection");
    assert!(none.is_none());

    session.close().await.expect("Could not close the session");
}
