//! Conversions between Rust field types and bound SQL values

pub use turso::Value;

use crate::error::Error;
use crate::error::Result;

/// Storage class a field's values are bound with.
///
/// Follows SQLite's type affinity: every Rust type an entity may hold maps
/// onto one of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Text,
    Blob,
    Null,
}

impl ColumnType {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Integer(_) => ColumnType::Integer,
            Value::Real(_) => ColumnType::Float,
            Value::Text(_) => ColumnType::Text,
            Value::Blob(_) => ColumnType::Blob,
            Value::Null => ColumnType::Null,
        }
    }
}

/// Converts a Rust value into a bound argument.
///
/// Anything implementing this can be used wherever an expression is
/// expected, e.g. `c("age").gt(18)`.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

/// Decodes a column value back into a Rust value.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self>;

    /// Like [`FromValue::from_value`] but maps NULL to `Default::default()`.
    fn from_value_opt(value: Value) -> Result<Self>
    where Self: Default {
        if matches!(value, Value::Null) { Ok(Self::default()) } else { Self::from_value(value) }
    }
}

/// Reports whether a value is the zero value of its storage class: NULL,
/// `0`, `0.0`, an empty string or an empty blob.
pub fn is_zero_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Integer(v) => *v == 0,
        Value::Real(v) => *v == 0.0,
        Value::Text(v) => v.is_empty(),
        Value::Blob(v) => v.is_empty(),
    }
}

fn mismatch(expected: &'static str, value: Value) -> Error {
    match value {
        Value::Null => Error::UnexpectedNull,
        other => Error::TypeConversion { expected, actual: format!("{:?}", other) },
    }
}

macro_rules! integer_value {
    ($($ty:ty),*) => {$(
        impl IntoValue for $ty {
            fn into_value(self) -> Value {
                Value::Integer(self as i64)
            }
        }

        impl FromValue for $ty {
            fn from_value(value: Value) -> Result<Self> {
                let wide = i64::from_value(value)?;
                <$ty>::try_from(wide).map_err(|_| Error::TypeConversion {
                    expected: stringify!($ty),
                    actual:   format!("Integer({})", wide),
                })
            }
        }
    )*};
}

integer_value!(i32, i16, i8, u32, u16, u8);

impl IntoValue for i64 {
    fn into_value(self) -> Value {
        Value::Integer(self)
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Integer(v) => Ok(v),
            Value::Real(v) => Ok(v as i64),
            other => Err(mismatch("Integer", other)),
        }
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Real(self)
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Real(v) => Ok(v),
            Value::Integer(v) => Ok(v as f64),
            other => Err(mismatch("Real", other)),
        }
    }
}

impl IntoValue for f32 {
    fn into_value(self) -> Value {
        Value::Real(self as f64)
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self> {
        f64::from_value(value).map(|v| v as f32)
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Integer(self as i64)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Integer(v) => Ok(v != 0),
            other => Err(mismatch("Integer (boolean)", other)),
        }
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Text(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::Text(self.to_string())
    }
}

impl IntoValue for &String {
    fn into_value(self) -> Value {
        Value::Text(self.clone())
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Text(v) => Ok(v),
            other => Err(mismatch("Text", other)),
        }
    }
}

impl IntoValue for Vec<u8> {
    fn into_value(self) -> Value {
        Value::Blob(self)
    }
}

impl IntoValue for &[u8] {
    fn into_value(self) -> Value {
        Value::Blob(self.to_vec())
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(v) => Ok(v),
            other => Err(mismatch("Blob", other)),
        }
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        self.map_or(Value::Null, IntoValue::into_value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }

    fn from_value_opt(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

#[cfg(feature = "with-chrono")]
mod chrono_impl {
    use chrono::DateTime;
    use chrono::NaiveDate;
    use chrono::NaiveDateTime;
    use chrono::Utc;

    use super::*;

    const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    impl IntoValue for NaiveDateTime {
        fn into_value(self) -> Value {
            Value::Text(self.format(DATETIME_FORMAT).to_string())
        }
    }

    impl FromValue for NaiveDateTime {
        fn from_value(value: Value) -> Result<Self> {
            match value {
                Value::Text(s) => NaiveDateTime::parse_from_str(&s, DATETIME_FORMAT)
                    .or_else(|_| NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S"))
                    .map_err(|_| Error::TypeConversion { expected: "NaiveDateTime", actual: s }),
                other => Err(mismatch("Text (datetime)", other)),
            }
        }
    }

    impl IntoValue for DateTime<Utc> {
        fn into_value(self) -> Value {
            self.naive_utc().into_value()
        }
    }

    impl FromValue for DateTime<Utc> {
        fn from_value(value: Value) -> Result<Self> {
            NaiveDateTime::from_value(value).map(|ndt| DateTime::from_naive_utc_and_offset(ndt, Utc))
        }
    }

    impl IntoValue for NaiveDate {
        fn into_value(self) -> Value {
            Value::Text(self.format("%Y-%m-%d").to_string())
        }
    }

    impl FromValue for NaiveDate {
        fn from_value(value: Value) -> Result<Self> {
            match value {
                Value::Text(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                    .map_err(|_| Error::TypeConversion { expected: "NaiveDate", actual: s }),
                other => Err(mismatch("Text (date)", other)),
            }
        }
    }
}

#[cfg(feature = "with-uuid")]
mod uuid_impl {
    use uuid::Uuid;

    use super::*;

    impl IntoValue for Uuid {
        fn into_value(self) -> Value {
            Value::Text(self.to_string())
        }
    }

    impl FromValue for Uuid {
        fn from_value(value: Value) -> Result<Self> {
            match value {
                Value::Text(s) => Uuid::parse_str(&s).map_err(|_| Error::TypeConversion { expected: "UUID", actual: s }),
                Value::Blob(b) => Uuid::from_slice(&b)
                    .map_err(|_| Error::TypeConversion { expected: "UUID", actual: format!("{:?}", b) }),
                other => Err(mismatch("Text or Blob (UUID)", other)),
            }
        }
    }
}

#[cfg(feature = "with-json")]
pub use json_impl::Json;

#[cfg(feature = "with-json")]
mod json_impl {
    use serde::Serialize;
    use serde::de::DeserializeOwned;

    use super::*;

    /// Stores `T` as a JSON text column.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Json<T>(pub T);

    impl<T: Serialize> IntoValue for Json<T> {
        fn into_value(self) -> Value {
            match serde_json::to_string(&self.0) {
                Ok(s) => Value::Text(s),
                Err(e) => {
                    tracing::warn!("failed to encode json column: {}", e);
                    Value::Null
                }
            }
        }
    }

    impl<T: DeserializeOwned> FromValue for Json<T> {
        fn from_value(value: Value) -> Result<Self> {
            match value {
                Value::Text(s) => Ok(Json(serde_json::from_str(&s)?)),
                other => Err(mismatch("Text (JSON)", other)),
            }
        }
    }
}
