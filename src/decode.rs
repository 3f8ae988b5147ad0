//! Translation of an engine cursor into a fully materialized [`QueryResponse`].

use crate::conv::{datetime_to_timestamp, NativeArg};
use crate::proto::{Column, QueryResponse, Row, TypeCode, Value};
use crate::{classify, Error, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ValueRef};
use rusqlite::{params_from_iter, Statement};

/// Run a prepared statement and decode every row it produces.
///
/// Column types are classified once, before the first row is read, and every value in a column is
/// decoded according to that column's code. An error at any point, including one raised by the
/// engine after some rows have already been read, fails the whole call.
pub(crate) fn query_rows(
    statement: &mut Statement<'_>,
    params: &[NativeArg],
) -> Result<QueryResponse> {
    let columns = statement
        .columns()
        .iter()
        .map(|column| {
            let declared = column.decl_type().unwrap_or_default().to_ascii_uppercase();
            match classify(&declared) {
                TypeCode::Null => Err(Error::UnclassifiableColumnType {
                    column: column.name().to_owned(),
                    declared,
                }),
                code => Ok(Column {
                    name: column.name().to_owned(),
                    r#type: code.into(),
                }),
            }
        })
        .collect::<Result<Vec<_>>>()?;

    let mut response = QueryResponse {
        columns,
        rows: Vec::new(),
    };

    let mut rows = statement.query(params_from_iter(params))?;
    while let Some(row) = rows.next()? {
        let values = response
            .columns
            .iter()
            .enumerate()
            .map(|(idx, column)| scan(row, idx, column))
            .collect::<Result<_>>()?;
        response.rows.push(Row { values });
    }

    Ok(response)
}

/// Read the value at `idx` into the variant selected by the column's type code.
fn scan(row: &rusqlite::Row<'_>, idx: usize, column: &Column) -> Result<Value> {
    Ok(match column.r#type() {
        TypeCode::Integer => row
            .get::<_, Option<i64>>(idx)?
            .map_or_else(Value::null_integer, Value::integer),
        TypeCode::Text => row
            .get::<_, Option<String>>(idx)?
            .map_or_else(Value::null_text, Value::text),
        TypeCode::Blob => row
            .get::<_, Option<Vec<u8>>>(idx)?
            .map_or_else(Value::null_blob, Value::blob),
        TypeCode::Real => row
            .get::<_, Option<f64>>(idx)?
            .map_or_else(Value::null_real, Value::real),
        TypeCode::Numeric => row
            .get::<_, Option<f64>>(idx)?
            .map_or_else(Value::null_numeric, Value::numeric),
        TypeCode::Bool => row
            .get::<_, Option<bool>>(idx)?
            .map_or_else(Value::null_boolean, Value::boolean),
        TypeCode::Time => match row.get::<_, NullableTime>(idx)?.0 {
            Some(datetime) => Value::time(datetime_to_timestamp(datetime)),
            None => Value::null_time(),
        },
        // Columns are classified before any row is read, so this is unreachable in practice.
        TypeCode::Null => {
            return Err(Error::UnclassifiableColumnType {
                column: column.name.clone(),
                declared: String::new(),
            })
        }
    })
}

/// Scan target for `TIME` columns.
///
/// Text is parsed the way the engine's own chrono binding writes it. Integers are taken as Unix
/// seconds.
struct NullableTime(Option<DateTime<Utc>>);

impl FromSql for NullableTime {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Null => Ok(Self(None)),
            ValueRef::Integer(seconds) => DateTime::from_timestamp(seconds, 0)
                .map(|datetime| Self(Some(datetime)))
                .ok_or(FromSqlError::OutOfRange(seconds)),
            value => DateTime::<Utc>::column_result(value).map(|datetime| Self(Some(datetime))),
        }
    }
}
