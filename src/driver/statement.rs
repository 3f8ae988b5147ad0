use super::connector::Handle;
use super::value::to_parameters;
use crate::driver::{Context, NamedValue, Rows};
use crate::proto::{ExecRequest, QueryRequest};
use crate::tracing_shim::trace;
use crate::{Error, Result};

/// A prepared statement.
///
/// Preparing is local: the SQL text is sent with every execution, so statement-level errors
/// surface on the first `exec_context` or `query_context`.
#[derive(Debug)]
pub struct Statement {
    /// The owning connection's state, or `None` once this statement is closed.
    handle: Option<Handle>,
    /// The SQL text.
    sql: String,
}

/// The outcome of a statement run for its side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExecResult {
    /// Row id of the most recent successful insert on the server's connection.
    last_insert_id: i64,
    /// Rows changed by the statement.
    rows_affected: i64,
}

impl ExecResult {
    /// Row id of the most recent successful insert on the server's connection.
    #[inline]
    #[must_use]
    pub const fn last_insert_id(&self) -> i64 {
        self.last_insert_id
    }

    /// Rows changed by the statement.
    #[inline]
    #[must_use]
    pub const fn rows_affected(&self) -> i64 {
        self.rows_affected
    }
}

impl Statement {
    /// A statement on the connection behind `handle`.
    pub(crate) const fn new(handle: Handle, sql: String) -> Self {
        Self {
            handle: Some(handle),
            sql,
        }
    }

    /// The SQL text.
    #[inline]
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The number of placeholders. The count is not known before execution, so this is always
    /// `None` and no arity check is made locally.
    #[inline]
    #[must_use]
    pub const fn num_input(&self) -> Option<usize> {
        None
    }

    /// Execution without a [`Context`] is unsupported; use [`Statement::exec_context`].
    pub fn exec(&self, _args: Vec<NamedValue>) -> Result<ExecResult> {
        Err(Error::UnsupportedOperation(
            "exec is unsupported - use exec_context",
        ))
    }

    /// Querying without a [`Context`] is unsupported; use [`Statement::query_context`].
    pub fn query(&self, _args: Vec<NamedValue>) -> Result<Rows> {
        Err(Error::UnsupportedOperation(
            "query is unsupported - use query_context",
        ))
    }

    /// Run the statement for its side effects.
    pub async fn exec_context(&self, ctx: &Context, args: Vec<NamedValue>) -> Result<ExecResult> {
        let mut client = self.handle()?.client()?;
        let request = ctx.request(ExecRequest {
            sql: self.sql.clone(),
            parameters: to_parameters(args)?,
        })?;
        trace!(sql = %self.sql, "exec");
        let response = ctx.run(client.exec(request)).await?;
        Ok(ExecResult {
            last_insert_id: response.last_insert_id,
            rows_affected: response.rows_affected,
        })
    }

    /// Run the statement and collect its rows.
    pub async fn query_context(&self, ctx: &Context, args: Vec<NamedValue>) -> Result<Rows> {
        let mut client = self.handle()?.client()?;
        let request = ctx.request(QueryRequest {
            sql: self.sql.clone(),
            parameters: to_parameters(args)?,
        })?;
        trace!(sql = %self.sql, "query");
        let response = ctx.run(client.query(request)).await?;
        Ok(Rows::new(response))
    }

    /// Close the statement. Closing twice is a no-op.
    #[inline]
    pub fn close(&mut self) -> Result<()> {
        self.handle = None;
        Ok(())
    }

    /// The connection's state, or `StatementClosed`.
    fn handle(&self) -> Result<&Handle> {
        self.handle.as_ref().ok_or(Error::StatementClosed)
    }
}
