use crate::{Error, Result, Value};
use rust_decimal::Decimal;
use time::OffsetDateTime;
use uuid::Uuid;

/// Conversion out of a [`Value`] into a concrete Rust type.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self>;
}

macro_rules! from_value {
    ($type:ty, $variant:ident) => {
        impl FromValue for $type {
            fn from_value(value: Value) -> Result<Self> {
                match value {
                    Value::$variant(Some(v)) => Ok(v.into()),
                    other => Err(Error::msg(format!(
                        "Cannot convert {other:?} to {}",
                        stringify!($type)
                    ))),
                }
            }
        }
    };
}

from_value!(bool, Boolean);
from_value!(i64, Int64);
from_value!(f64, Float64);
from_value!(Decimal, Decimal);
from_value!(String, Varchar);
from_value!(Vec<u8>, Blob);
from_value!(OffsetDateTime, Timestamp);
from_value!(Uuid, Uuid);

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(None);
        }
        T::from_value(value).map(Some)
    }
}
