use moor_core::{Column, ColumnType, Record, Row, SessionError, Value};
use std::sync::Arc;
use time::macros::datetime;
use uuid::Uuid;

fn record(columns: Vec<Column>, row: Vec<Value>) -> Record {
    let columns: Arc<[Column]> = columns.into();
    let row: Row = row.into();
    Record::new(row, columns)
}

#[test]
fn lookup_by_name() {
    let record = record(
        vec![
            Column::new("id", ColumnType::Integer),
            Column::new("name", ColumnType::Text),
        ],
        vec![Value::Int64(Some(1)), Value::Varchar(Some("alice".into()))],
    );
    assert_eq!(
        record.get("name").expect("Missing name"),
        Value::Varchar(Some("alice".into()))
    );
    assert_eq!(record.try_get::<i64>("id").expect("Missing id"), 1);
    assert_eq!(record.len(), 2);
}

#[test]
fn unknown_column_is_reported() {
    let record = record(
        vec![Column::new("id", ColumnType::Integer)],
        vec![Value::Int64(Some(1))],
    );
    let error = record
        .get("missing")
        .expect_err("An unknown column must fail the lookup");
    match error.downcast_ref::<SessionError>() {
        Some(SessionError::UnknownColumn(name)) => assert_eq!(name, "missing"),
        other => panic!("Expected UnknownColumn, got {other:?}"),
    }
}

#[test]
fn values_convert_to_the_declared_type() {
    // Drivers may report booleans as integers and uuids or timestamps as
    // strings; the declared column type is what comes out.
    let id = Uuid::new_v4();
    let record = record(
        vec![
            Column::new("completed", ColumnType::Boolean),
            Column::new("key", ColumnType::Uuid),
            Column::new("at", ColumnType::Timestamp),
            Column::new("ratio", ColumnType::Float),
        ],
        vec![
            Value::Int64(Some(1)),
            Value::Varchar(Some(id.to_string())),
            Value::Varchar(Some("2024-02-01T10:30:00Z".into())),
            Value::Int64(Some(3)),
        ],
    );
    assert_eq!(
        record.get("completed").expect("Missing completed"),
        Value::Boolean(Some(true))
    );
    assert_eq!(record.try_get::<Uuid>("key").expect("Missing key"), id);
    assert_eq!(
        record.get("at").expect("Missing at"),
        Value::Timestamp(Some(datetime!(2024-02-01 10:30 UTC)))
    );
    assert_eq!(record.get("ratio").expect("Missing ratio"), Value::Float64(Some(3.0)));
}

#[test]
fn incompatible_values_are_rejected() {
    let record = record(
        vec![Column::new("id", ColumnType::Integer)],
        vec![Value::Varchar(Some("not a number".into()))],
    );
    assert!(record.get("id").is_err());
}

#[test]
fn nulls_keep_their_declared_type() {
    let record = record(
        vec![Column::new("completed", ColumnType::Boolean)],
        vec![Value::Null],
    );
    assert_eq!(
        record.get("completed").expect("Missing completed"),
        Value::Boolean(None)
    );
    assert_eq!(
        record
            .try_get::<Option<bool>>("completed")
            .expect("Missing completed"),
        None
    );
}
