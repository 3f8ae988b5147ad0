use crate::conv::{datetime_to_timestamp, timestamp_to_datetime};
use crate::proto::value::Kind;
use crate::proto::{self, Column, TypeCode};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use prost_types::Timestamp;

/// A native value passed as a parameter or read from a row.
///
/// `NUMERIC` and `REAL` columns both read back as [`Value::Real`]. A null of any column type
/// reads back as [`Value::Null`].
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Value {
    /// SQL `NULL`.
    #[default]
    Null,
    /// A 64-bit signed integer.
    Integer(i64),
    /// A 64-bit float.
    Real(f64),
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Blob(Vec<u8>),
    /// A boolean.
    Bool(bool),
    /// A UTC instant.
    Time(DateTime<Utc>),
}

/// Implement `From<$ty> for Value` by wrapping in `$variant`, converting as needed.
macro_rules! from_native {
    ($($variant:ident <- $($ty:ty),+;)*) => {$($(
        impl From<$ty> for Value {
            #[inline]
            fn from(value: $ty) -> Self {
                Self::$variant(value.into())
            }
        }
    )+)*};
}

from_native! {
    Integer <- i64, i32, i16, i8, u32, u16, u8;
    Real <- f64, f32;
    Text <- String, &str;
    Blob <- Vec<u8>, &[u8];
    Bool <- bool;
    Time <- DateTime<Utc>;
}

impl<T: Into<Self>> From<Option<T>> for Value {
    #[inline]
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl Value {
    /// Whether this is [`Value::Null`].
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The wire form of this value. Null carries no column type.
    pub(crate) fn into_wire(self) -> proto::Value {
        match self {
            Self::Null => proto::Value::generic_null(),
            Self::Integer(value) => proto::Value::integer(value),
            Self::Real(value) => proto::Value::real(value),
            Self::Text(value) => proto::Value::text(value),
            Self::Blob(value) => proto::Value::blob(value),
            Self::Bool(value) => proto::Value::boolean(value),
            Self::Time(value) => proto::Value::time(datetime_to_timestamp(value)),
        }
    }

    /// Read a wire value, requiring its variant to match the column type.
    pub(crate) fn from_wire(column: &Column, value: &proto::Value) -> Result<Self> {
        let expected = column.r#type();
        let native = match (expected, &value.kind) {
            (TypeCode::Null, _) => Some(Self::Null),
            (TypeCode::Integer, Some(Kind::IntegerValue(v))) => {
                v.valid.then_some(Self::Integer(v.value))
            }
            (TypeCode::Text, Some(Kind::TextValue(v))) => {
                v.valid.then(|| Self::Text(v.value.clone()))
            }
            (TypeCode::Blob, Some(Kind::BlobValue(v))) => {
                v.valid.then(|| Self::Blob(v.value.clone()))
            }
            (TypeCode::Real, Some(Kind::RealValue(v))) => v.valid.then_some(Self::Real(v.value)),
            (TypeCode::Numeric, Some(Kind::NumericValue(v))) => {
                v.valid.then_some(Self::Real(v.value))
            }
            (TypeCode::Bool, Some(Kind::BoolValue(v))) => v.valid.then_some(Self::Bool(v.value)),
            (TypeCode::Time, Some(Kind::TimeValue(v))) => v
                .value
                .as_ref()
                .filter(|_| v.valid)
                .map(|ts| {
                    timestamp_to_datetime(Timestamp {
                        seconds: ts.seconds,
                        nanos: ts.nanos,
                    })
                })
                .transpose()?
                .map(Self::Time),
            _ => {
                return Err(Error::ValueTypeMismatch {
                    column: column.name.clone(),
                    expected,
                });
            }
        };
        Ok(native.unwrap_or_default())
    }
}

/// A parameter bound to a 1-based position in the statement.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedValue {
    /// 1-based position of the placeholder.
    pub ordinal: usize,
    /// The bound value.
    pub value: Value,
}

impl NamedValue {
    /// Bind `value` to the placeholder at `ordinal`.
    #[inline]
    pub fn new(ordinal: usize, value: impl Into<Value>) -> Self {
        Self {
            ordinal,
            value: value.into(),
        }
    }

    /// Bind each value to the placeholder matching its position.
    pub fn positional<I>(values: I) -> Vec<Self>
    where
        I: IntoIterator<Item: Into<Value>>,
    {
        values
            .into_iter()
            .zip(1..)
            .map(|(value, ordinal)| Self::new(ordinal, value))
            .collect()
    }
}

/// Order parameters by ordinal. The ordinals must be exactly `1..=args.len()`, in any order.
pub(crate) fn to_parameters(args: Vec<NamedValue>) -> Result<Vec<proto::Value>> {
    let mut slots = vec![None; args.len()];
    for NamedValue { ordinal, value } in args {
        let slot = ordinal
            .checked_sub(1)
            .and_then(|idx| slots.get_mut(idx))
            .ok_or(Error::InvalidOrdinal(ordinal))?;
        if slot.replace(value.into_wire()).is_some() {
            return Err(Error::InvalidOrdinal(ordinal));
        }
    }
    // Every slot is filled: `n` distinct ordinals in `1..=n`.
    Ok(slots.into_iter().flatten().collect())
}
