//! A client for the `Database` service, shaped like a conventional SQL driver.
//!
//! ```no_run
//! # async fn demo() -> sqliterpc::Result<()> {
//! use sqliterpc::driver::{Connector, Context, NamedValue, Value};
//!
//! let connection = Connector::new("http://127.0.0.1:8080")?.connect();
//! let statement = connection.prepare("SELECT name FROM users WHERE id = ?")?;
//! let mut rows = statement
//!     .query_context(&Context::background(), NamedValue::positional([7_i64]))
//!     .await?;
//!
//! let mut dest = vec![Value::Null; rows.columns().len()];
//! while rows.next(&mut dest)? {
//!     // use `dest`
//! }
//! rows.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! Every object has an open and a closed state. Closing is idempotent, and any other use after
//! closing fails with the matching `*Closed` error.

mod connector;
mod context;
mod rows;
mod statement;
mod value;

pub use self::connector::{Connection, Connector, Transaction};
pub use self::context::Context;
pub use self::rows::Rows;
pub use self::statement::{ExecResult, Statement};
pub use self::value::{NamedValue, Value};
