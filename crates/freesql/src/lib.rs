//! # freesql
//!
//! A free-form SQL template builder.
//!
//! ## Features
//!
//! - **Free-form**: statements are composed token by token, in any order
//! - **Optional predicates**: a predicate marked nullable with no value melts
//!   away together with the `AND`/`OR`/`NOT`, brackets and `WHERE` it leaves
//!   dangling
//! - **Values travel with predicates**: values bound to a dropped predicate are
//!   dropped with it, so placeholders and parameters always line up
//! - **Dialect aware**: identifier quoting, SQL Server read hints and `$n`
//!   placeholders for PostgreSQL
//! - **Table sharding**: logical tables resolve to physical shards through a
//!   [`ShardLocator`], by explicit shard id, shard value or routing hints
//!
//! ## Example
//!
//! ```ignore
//! use freesql::prelude::*;
//! use std::sync::Arc;
//!
//! let config = DalConfig::load("dal.toml")?;
//! let mut builder = SqlBuilder::with_locator(Arc::new(config));
//! builder.set_logic_db_name("orders")?;
//!
//! builder
//!     .select(["id", "name"])
//!     .from("person")
//!     .where_([equal("city_id")])
//!     .bind(city_id)
//!     .and()
//!     .like("name")
//!     .nullable(name_pattern)
//!     .order_by("id", true);
//!
//! // SELECT `id`, `name` FROM `person_3` WHERE `city_id` = ? ORDER BY `id` ASC
//! let built = builder.build()?;
//! let rows = client.query(&built.sql, &built.parameters.params_ref()).await?;
//! ```

pub mod builder;
pub mod config;
pub mod context;
pub mod dialect;
pub mod error;
pub mod expressions;
pub mod hints;
pub mod meltdown;
pub mod prelude;
pub mod render;
pub mod shard;
pub mod token;
pub mod value;

pub use builder::{IntoExpression, SqlBuilder};
pub use config::{DalConfig, DatabaseSet, TableShardConfig};
pub use context::BuilderContext;
pub use dialect::{DatabaseCategory, Dialect};
pub use error::{FreeSqlError, FreeSqlResult};
pub use hints::Hints;
pub use meltdown::meltdown;
pub use render::{BuiltSql, render};
pub use shard::ShardLocator;
pub use token::{
    Bracket, ColumnExpression, ColumnRef, Expression, Keyword, Operator, ShardSelector, TableRef,
    Token,
};
pub use value::{StatementParameter, StatementParameters, Value};
