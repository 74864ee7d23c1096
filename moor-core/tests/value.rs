use moor_core::{FromValue, Value};
use rust_decimal::Decimal;
use uuid::Uuid;

#[test]
fn conversions_into_value() {
    assert_eq!(Value::from(true), Value::Boolean(Some(true)));
    assert_eq!(Value::from(42), Value::Int64(Some(42)));
    assert_eq!(Value::from(42i64), Value::Int64(Some(42)));
    assert_eq!(Value::from(1.5), Value::Float64(Some(1.5)));
    assert_eq!(Value::from("text"), Value::Varchar(Some("text".into())));
    assert_eq!(Value::from(None::<i64>), Value::Null);
    assert_eq!(Value::from(Some("text")), Value::Varchar(Some("text".into())));
}

#[test]
fn null_detection() {
    assert!(Value::Null.is_null());
    assert!(Value::Boolean(None).is_null());
    assert!(Value::Varchar(None).is_null());
    assert!(!Value::Int64(Some(0)).is_null());
}

#[test]
fn type_equality_ignores_the_payload() {
    assert!(Value::Int64(Some(1)).same_type(&Value::Int64(None)));
    assert!(!Value::Int64(Some(1)).same_type(&Value::Float64(Some(1.0))));
}

#[test]
fn conversions_out_of_value() {
    assert_eq!(
        i64::from_value(Value::Int64(Some(7))).expect("Failed to convert"),
        7
    );
    assert_eq!(
        String::from_value(Value::Varchar(Some("x".into()))).expect("Failed to convert"),
        "x"
    );
    let id = Uuid::new_v4();
    assert_eq!(
        Uuid::from_value(Value::Uuid(Some(id))).expect("Failed to convert"),
        id
    );
    assert_eq!(
        Decimal::from_value(Value::Decimal(Some(Decimal::new(125, 2)))).expect("Failed to convert"),
        Decimal::new(125, 2)
    );
    assert_eq!(
        Option::<bool>::from_value(Value::Boolean(None)).expect("Failed to convert"),
        None
    );
    assert!(bool::from_value(Value::Int64(Some(1))).is_err());
}
