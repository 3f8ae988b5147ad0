//! Conversion between wire values and the arguments the engine binds.

use crate::proto::value::Kind;
use crate::proto::{
    BlobValue, BoolValue, IntegerValue, NumericValue, RealValue, TextValue, TimeValue, Value,
};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use prost_types::Timestamp;
use rusqlite::types::{Null, ToSqlOutput};
use rusqlite::ToSql;

/// One positional argument, ready to be bound to a statement.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NativeArg {
    /// SQL `NULL`.
    Null,
    /// A 64-bit signed integer.
    Integer(i64),
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Blob(Vec<u8>),
    /// A 64-bit float, used for both `REAL` and `NUMERIC` values.
    Real(f64),
    /// A boolean, stored by the engine as `0` or `1`.
    Bool(bool),
    /// A point in time, stored by the engine as text.
    Time(DateTime<Utc>),
}

impl ToSql for NativeArg {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Self::Null => Ok(ToSqlOutput::from(Null)),
            Self::Integer(value) => value.to_sql(),
            Self::Text(value) => value.to_sql(),
            Self::Blob(value) => value.to_sql(),
            Self::Real(value) => value.to_sql(),
            Self::Bool(value) => value.to_sql(),
            Self::Time(value) => value.to_sql(),
        }
    }
}

/// Convert wire parameters into engine arguments, position for position.
///
/// A value whose `valid` flag is unset becomes `NULL` whatever its variant. An empty oneof has no
/// mapping and fails the whole conversion.
pub(crate) fn values_to_params(values: Vec<Value>) -> Result<Vec<NativeArg>> {
    values.into_iter().map(value_to_param).collect()
}

/// Convert a single wire parameter.
fn value_to_param(value: Value) -> Result<NativeArg> {
    let Some(kind) = value.kind else {
        return Err(Error::UnsupportedParameterType("value has no kind set"));
    };

    Ok(match kind {
        Kind::IntegerValue(IntegerValue { value, valid: true }) => NativeArg::Integer(value),
        Kind::TextValue(TextValue { value, valid: true }) => NativeArg::Text(value),
        Kind::BlobValue(BlobValue { value, valid: true }) => NativeArg::Blob(value),
        Kind::RealValue(RealValue { value, valid: true }) => NativeArg::Real(value),
        Kind::NumericValue(NumericValue { value, valid: true }) => NativeArg::Real(value),
        Kind::BoolValue(BoolValue { value, valid: true }) => NativeArg::Bool(value),
        Kind::TimeValue(TimeValue { value, valid: true }) => {
            NativeArg::Time(timestamp_to_datetime(value.unwrap_or_default())?)
        }
        Kind::IntegerValue(_)
        | Kind::TextValue(_)
        | Kind::BlobValue(_)
        | Kind::RealValue(_)
        | Kind::NumericValue(_)
        | Kind::BoolValue(_)
        | Kind::TimeValue(_)
        | Kind::NullValue(_) => NativeArg::Null,
    })
}

/// Convert a protobuf timestamp into the native time type.
pub(crate) fn timestamp_to_datetime(timestamp: Timestamp) -> Result<DateTime<Utc>> {
    let Timestamp { seconds, nanos } = timestamp;
    u32::try_from(nanos)
        .ok()
        .and_then(|nanos| DateTime::from_timestamp(seconds, nanos))
        .ok_or(Error::InvalidTimestamp { seconds, nanos })
}

/// Convert the native time type into a protobuf timestamp.
pub(crate) fn datetime_to_timestamp(datetime: DateTime<Utc>) -> Timestamp {
    Timestamp {
        seconds: datetime.timestamp(),
        // Always below 2 * 10^9, including during a leap second.
        nanos: datetime.timestamp_subsec_nanos() as i32,
    }
}
