use crate::driver::Value;
use crate::proto::{QueryResponse, TypeCode};
use crate::{Error, Result};

/// A fully received result set, read one row at a time.
#[derive(Debug)]
pub struct Rows {
    /// The result set, or `None` once closed.
    response: Option<QueryResponse>,
    /// Index of the next row to read.
    cursor: usize,
}

impl Rows {
    /// Rows positioned before the first row of `response`.
    pub(crate) const fn new(response: QueryResponse) -> Self {
        Self {
            response: Some(response),
            cursor: 0,
        }
    }

    /// Column names in result order. Empty once closed.
    #[must_use]
    pub fn columns(&self) -> Vec<String> {
        self.response
            .iter()
            .flat_map(|response| &response.columns)
            .map(|column| column.name.clone())
            .collect()
    }

    /// The type of column `idx`, or `None` when out of range or closed.
    #[must_use]
    pub fn column_type(&self, idx: usize) -> Option<TypeCode> {
        let column = self.response.as_ref()?.columns.get(idx)?;
        Some(column.r#type())
    }

    /// The SQL name of column `idx`'s type, or `None` when out of range or closed.
    ///
    /// A column without a usable type reports the empty string.
    #[must_use]
    pub fn column_type_database_type_name(&self, idx: usize) -> Option<&'static str> {
        Some(match self.column_type(idx)? {
            TypeCode::Null => "",
            TypeCode::Integer => "INTEGER",
            TypeCode::Text => "TEXT",
            TypeCode::Blob => "BLOB",
            TypeCode::Real => "REAL",
            TypeCode::Numeric => "NUMERIC",
            TypeCode::Bool => "BOOLEAN",
            TypeCode::Time => "TIMESTAMP",
        })
    }

    /// Copy the next row into `dest`, returning `false` once every row has been read.
    ///
    /// `dest` may be shorter than the row, in which case trailing values are skipped. The
    /// cursor only advances when the whole row was copied.
    pub fn next(&mut self, dest: &mut [Value]) -> Result<bool> {
        let QueryResponse { columns, rows } = self.response.as_ref().ok_or(Error::RowsClosed)?;
        let Some(row) = rows.get(self.cursor) else {
            return Ok(false);
        };
        if row.values.len() < dest.len() {
            return Err(Error::NotEnoughValues {
                values: row.values.len(),
                receivers: dest.len(),
            });
        }

        for ((slot, value), column) in dest.iter_mut().zip(&row.values).zip(columns) {
            *slot = Value::from_wire(column, value)?;
        }
        self.cursor += 1;
        Ok(true)
    }

    /// The next row as a new vector with one value per column, or `None` at the end.
    pub fn next_row(&mut self) -> Result<Option<Vec<Value>>> {
        let width = self.response.as_ref().ok_or(Error::RowsClosed)?.columns.len();
        let mut dest = vec![Value::Null; width];
        Ok(self.next(&mut dest)?.then_some(dest))
    }

    /// Release the result set. Closing twice is a no-op.
    #[inline]
    pub fn close(&mut self) -> Result<()> {
        self.response = None;
        Ok(())
    }
}
