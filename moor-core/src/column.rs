use crate::{Error, Result, Value};
use rust_decimal::Decimal;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use uuid::Uuid;

/// Logical type a result column declares for its values.
///
/// The declared type is what callers observe through [`crate::Record`]:
/// drivers are free to report values in whatever native width they use
/// (integers for booleans, strings for uuids or timestamps) and the column
/// type converts them on the way out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Boolean,
    Integer,
    Float,
    Decimal,
    Text,
    Blob,
    Timestamp,
    Uuid,
}

impl ColumnType {
    /// The NULL of this type.
    pub fn null(&self) -> Value {
        match self {
            ColumnType::Boolean => Value::Boolean(None),
            ColumnType::Integer => Value::Int64(None),
            ColumnType::Float => Value::Float64(None),
            ColumnType::Decimal => Value::Decimal(None),
            ColumnType::Text => Value::Varchar(None),
            ColumnType::Blob => Value::Blob(None),
            ColumnType::Timestamp => Value::Timestamp(None),
            ColumnType::Uuid => Value::Uuid(None),
        }
    }

    /// Convert a raw driver value into this declared type.
    pub fn convert(&self, raw: Value) -> Result<Value> {
        if raw.is_null() {
            return Ok(self.null());
        }
        match (self, raw) {
            (ColumnType::Boolean, Value::Boolean(v)) => Ok(Value::Boolean(v)),
            (ColumnType::Boolean, Value::Int64(Some(v))) => Ok(Value::Boolean(Some(v != 0))),
            (ColumnType::Integer, Value::Int64(v)) => Ok(Value::Int64(v)),
            (ColumnType::Float, Value::Float64(v)) => Ok(Value::Float64(v)),
            (ColumnType::Float, Value::Int64(Some(v))) => Ok(Value::Float64(Some(v as f64))),
            (ColumnType::Decimal, Value::Decimal(v)) => Ok(Value::Decimal(v)),
            (ColumnType::Decimal, Value::Int64(Some(v))) => {
                Ok(Value::Decimal(Some(Decimal::from(v))))
            }
            (ColumnType::Decimal, Value::Varchar(Some(v))) => {
                Ok(Value::Decimal(Some(v.parse().map_err(Error::new)?)))
            }
            (ColumnType::Text, Value::Varchar(v)) => Ok(Value::Varchar(v)),
            (ColumnType::Blob, Value::Blob(v)) => Ok(Value::Blob(v)),
            (ColumnType::Timestamp, Value::Timestamp(v)) => Ok(Value::Timestamp(v)),
            (ColumnType::Timestamp, Value::Varchar(Some(v))) => Ok(Value::Timestamp(Some(
                OffsetDateTime::parse(&v, &Rfc3339).map_err(Error::new)?,
            ))),
            (ColumnType::Uuid, Value::Uuid(v)) => Ok(Value::Uuid(v)),
            (ColumnType::Uuid, Value::Varchar(Some(v))) => {
                Ok(Value::Uuid(Some(Uuid::parse_str(&v).map_err(Error::new)?)))
            }
            (ty, raw) => Err(Error::msg(format!("Cannot read {raw:?} as {ty:?}"))),
        }
    }
}

/// A result column descriptor: name plus declared logical type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}
