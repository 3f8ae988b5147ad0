use crate::proto::TypeCode;

/// Map a declared column type to the [`TypeCode`] it is transmitted as.
///
/// `declared` is expected in upper case, as SQLite reports it after normalization. The rules are
/// checked in order and the first match wins:
///
/// | declared type                              | code      |
/// |--------------------------------------------|-----------|
/// | contains `INT`                             | `INTEGER` |
/// | `CLOB`, `TEXT`, or contains `CHAR`         | `TEXT`    |
/// | `BLOB`                                     | `BLOB`    |
/// | `REAL`, `FLOAT`, or contains `DOUBLE`      | `REAL`    |
/// | `DATE`, `DATETIME`, `TIMESTAMP`            | `TIME`    |
/// | `NUMERIC` or contains `DECIMAL`            | `NUMERIC` |
/// | `BOOLEAN`, `BOOL`                          | `BOOL`    |
///
/// Anything else, including the empty string reported for expression columns, yields
/// [`TypeCode::Null`], meaning the type could not be classified.
#[must_use]
pub fn classify(declared: &str) -> TypeCode {
    if declared.contains("INT") {
        TypeCode::Integer
    } else if matches!(declared, "CLOB" | "TEXT") || declared.contains("CHAR") {
        TypeCode::Text
    } else if declared == "BLOB" {
        TypeCode::Blob
    } else if matches!(declared, "REAL" | "FLOAT") || declared.contains("DOUBLE") {
        TypeCode::Real
    } else if matches!(declared, "DATE" | "DATETIME" | "TIMESTAMP") {
        TypeCode::Time
    } else if declared == "NUMERIC" || declared.contains("DECIMAL") {
        TypeCode::Numeric
    } else if matches!(declared, "BOOLEAN" | "BOOL") {
        TypeCode::Bool
    } else {
        TypeCode::Null
    }
}
