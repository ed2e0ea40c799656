//! Convenient imports for common functionality.
//!
//! Brings the capability traits into scope along with the wrappers and the types every call
//! site needs.

pub use crate::config::{PoolOptions, PoolOptionsBuilder};
pub use crate::context::Context;
pub use crate::error::SqlFacadeError;
pub use crate::scanner::{Row, Rows, Scanner};
pub use crate::traits::{Conn, Db, Stmt, Tx};
pub use crate::types::{Arg, IsolationLevel, NamedArg, QueryResult, TxOptions, Value, named};
pub use crate::{SqlConn, SqlDb, SqlStmt, SqlTx, args};
