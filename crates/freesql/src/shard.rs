//! Table shard resolution.
//!
//! The topology itself lives behind [`ShardLocator`]; this module only applies
//! the precedence rules for one [`TableRef`].

use crate::context::BuilderContext;
use crate::dialect::DatabaseCategory;
use crate::error::FreeSqlResult;
use crate::hints::Hints;
use crate::token::{ShardSelector, TableRef};
use crate::value::{StatementParameters, Value};

/// Maps logical tables to physical shards.
///
/// Implementations are shared read-only between builders, possibly across
/// threads. Every `resolve_*` method returns the suffix to append to the
/// logical table name and fails with
/// [`FreeSqlError::ShardResolution`](crate::FreeSqlError::ShardResolution) if
/// the table is unknown or not sharded.
pub trait ShardLocator: Send + Sync {
    /// Category of a logical database, `None` if unknown.
    fn database_category(&self, logic_db: &str) -> Option<DatabaseCategory>;

    fn is_table_sharding_enabled(&self, logic_db: &str, table: &str) -> bool;

    fn resolve_by_id(&self, logic_db: &str, table: &str, shard_id: &str) -> FreeSqlResult<String>;

    fn resolve_by_value(&self, logic_db: &str, table: &str, value: &Value) -> FreeSqlResult<String>;

    fn resolve_by_hints(
        &self,
        logic_db: &str,
        table: &str,
        hints: &Hints,
        params: &StatementParameters,
    ) -> FreeSqlResult<String>;
}

/// Physical (unquoted) name of `table`.
///
/// First match wins: disabled sharding, explicit id, explicit value, hints.
pub(crate) fn physical_table_name(
    table: &TableRef,
    ctx: &BuilderContext,
    params: &StatementParameters,
) -> FreeSqlResult<String> {
    let name = table.logical_name();

    let (Some(locator), Some(logic_db)) = (ctx.locator(), ctx.logic_db_name()) else {
        return Ok(name.to_string());
    };

    let suffix = match table.shard() {
        ShardSelector::Disabled => return Ok(name.to_string()),
        _ if !locator.is_table_sharding_enabled(logic_db, name) => return Ok(name.to_string()),
        ShardSelector::ExplicitId(id) => locator.resolve_by_id(logic_db, name, id)?,
        ShardSelector::ExplicitValue(v) => locator.resolve_by_value(logic_db, name, v)?,
        ShardSelector::HintDerived => {
            locator.resolve_by_hints(logic_db, name, ctx.hints(), params)?
        }
    };

    tracing::trace!(
        target: "freesql",
        table = name,
        suffix = %suffix,
        selector = ?table.shard(),
        "resolved table shard"
    );

    Ok(format!("{name}{suffix}"))
}
