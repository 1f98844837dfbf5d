//! Convenient imports for typical `freesql` usage.
//!
//! ```ignore
//! use freesql::prelude::*;
//! ```

pub use crate::expressions::{
    AND, LEFT_BRACKET, NOT, OR, RIGHT_BRACKET, between, bracket, column, column_expression, equal,
    expression, expression_when, expression_when_else, greater_than, greater_than_equals, in_,
    is_not_null, is_null, less_than, less_than_equals, like, not_equal, not_in, not_like, table,
    text,
};
pub use crate::{
    BuiltSql, DalConfig, DatabaseCategory, FreeSqlError, FreeSqlResult, Hints, ShardLocator,
    SqlBuilder, StatementParameters, TableRef, Token, Value,
};
