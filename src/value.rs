//! Constructors and accessors for the wire-level [`Value`].

use crate::proto::value::Kind;
use crate::proto::{
    BlobValue, BoolValue, IntegerValue, NullValue, NumericValue, RealValue, TextValue, TimeValue,
    TypeCode, Value,
};
use prost_types::Timestamp;
use std::fmt;

/// Declare a valid and a typed-null constructor for each typed variant.
macro_rules! typed_constructors {
    ($($valid:ident, $null:ident: $value:ty => $variant:ident($message:ident);)*) => {$(
        #[doc = concat!("A non-null `", stringify!($message), "`.")]
        #[inline]
        #[must_use]
        pub fn $valid(value: impl Into<$value>) -> Self {
            Self {
                kind: Some(Kind::$variant($message {
                    value: value.into(),
                    valid: true,
                })),
            }
        }

        #[doc = concat!("A NULL that keeps the type of `", stringify!($message), "`.")]
        #[inline]
        #[must_use]
        pub fn $null() -> Self {
            Self {
                kind: Some(Kind::$variant($message::default())),
            }
        }
    )*};
}

impl Value {
    typed_constructors! {
        integer, null_integer: i64 => IntegerValue(IntegerValue);
        text, null_text: String => TextValue(TextValue);
        blob, null_blob: Vec<u8> => BlobValue(BlobValue);
        real, null_real: f64 => RealValue(RealValue);
        numeric, null_numeric: f64 => NumericValue(NumericValue);
        boolean, null_boolean: bool => BoolValue(BoolValue);
    }

    /// A non-null `TimeValue`.
    #[inline]
    #[must_use]
    pub fn time(value: impl Into<Timestamp>) -> Self {
        Self {
            kind: Some(Kind::TimeValue(TimeValue {
                value: Some(value.into()),
                valid: true,
            })),
        }
    }

    /// A NULL that keeps the type of `TimeValue`.
    #[inline]
    #[must_use]
    pub fn null_time() -> Self {
        Self {
            kind: Some(Kind::TimeValue(TimeValue::default())),
        }
    }

    /// A NULL with no type attached. The engine resolves it against the target column.
    #[inline]
    #[must_use]
    pub fn generic_null() -> Self {
        Self {
            kind: Some(Kind::NullValue(NullValue {})),
        }
    }

    /// The column type this value belongs to, if it carries one.
    #[must_use]
    pub const fn type_code(&self) -> Option<TypeCode> {
        match &self.kind {
            Some(Kind::IntegerValue(_)) => Some(TypeCode::Integer),
            Some(Kind::TextValue(_)) => Some(TypeCode::Text),
            Some(Kind::BlobValue(_)) => Some(TypeCode::Blob),
            Some(Kind::RealValue(_)) => Some(TypeCode::Real),
            Some(Kind::NumericValue(_)) => Some(TypeCode::Numeric),
            Some(Kind::BoolValue(_)) => Some(TypeCode::Bool),
            Some(Kind::TimeValue(_)) => Some(TypeCode::Time),
            Some(Kind::NullValue(_)) | None => None,
        }
    }

    /// Whether the value is non-null.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        match &self.kind {
            Some(Kind::IntegerValue(IntegerValue { valid, .. })
                | Kind::TextValue(TextValue { valid, .. })
                | Kind::BlobValue(BlobValue { valid, .. })
                | Kind::RealValue(RealValue { valid, .. })
                | Kind::NumericValue(NumericValue { valid, .. })
                | Kind::BoolValue(BoolValue { valid, .. })
                | Kind::TimeValue(TimeValue { valid, .. })) => *valid,
            Some(Kind::NullValue(_)) | None => false,
        }
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str_name())
    }
}
