//! Per-statement routing hints.

use crate::value::Value;
use std::collections::BTreeMap;

/// Inputs for hint-derived table sharding.
///
/// The builder keeps its own copy; mutating the original after handing it to
/// [`SqlBuilder::set_hints`](crate::SqlBuilder::set_hints) has no effect on
/// the builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hints {
    table_shard_id: Option<String>,
    table_shard_value: Option<Value>,
    shard_col_values: BTreeMap<String, Value>,
}

impl Hints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route every hint-derived table to the given shard id.
    pub fn in_table_shard(mut self, shard_id: impl Into<String>) -> Self {
        self.table_shard_id = Some(shard_id.into());
        self
    }

    /// Route every hint-derived table by the given shard value.
    pub fn table_shard_value(mut self, value: impl Into<Value>) -> Self {
        self.table_shard_value = Some(value.into());
        self
    }

    /// Provide the value of a shard column. Column names match
    /// case-insensitively.
    pub fn shard_col_value(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.shard_col_values
            .insert(column.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn table_shard_id(&self) -> Option<&str> {
        self.table_shard_id.as_deref()
    }

    pub fn shard_value(&self) -> Option<&Value> {
        self.table_shard_value.as_ref()
    }

    pub fn col_value(&self, column: &str) -> Option<&Value> {
        self.shard_col_values.get(&column.to_ascii_lowercase())
    }
}
