//! Logical database topology loaded from TOML.
//!
//! ```toml
//! [databases.orders]
//! category = "mysql"
//! table_shard_separator = "_"
//!
//! [databases.orders.tables.person]
//! shard_column = "city_id"
//! modulus = 4
//! ```
//!
//! [`DalConfig`] is the built-in [`ShardLocator`]: a sharded table maps a shard
//! column value to `value mod modulus`, and the physical table name is the
//! logical name followed by the separator and the shard id (`person_3`).

use crate::dialect::DatabaseCategory;
use crate::error::{FreeSqlError, FreeSqlResult};
use crate::hints::Hints;
use crate::shard::ShardLocator;
use crate::value::{StatementParameters, Value};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

fn default_separator() -> String {
    "_".to_string()
}

/// Root of the topology file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DalConfig {
    #[serde(default)]
    pub databases: BTreeMap<String, DatabaseSet>,
}

/// One logical database.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSet {
    pub category: DatabaseCategory,
    #[serde(default = "default_separator")]
    pub table_shard_separator: String,
    #[serde(default)]
    pub tables: BTreeMap<String, TableShardConfig>,
}

/// Shard strategy of one logical table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableShardConfig {
    pub shard_column: String,
    pub modulus: u32,
}

impl DatabaseSet {
    pub fn new(category: DatabaseCategory) -> Self {
        Self {
            category,
            table_shard_separator: default_separator(),
            tables: BTreeMap::new(),
        }
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.table_shard_separator = separator.into();
        self
    }

    /// Declare a table sharded by `shard_column mod modulus`.
    pub fn shard_table(
        mut self,
        table: impl Into<String>,
        shard_column: impl Into<String>,
        modulus: u32,
    ) -> Self {
        self.tables.insert(
            table.into(),
            TableShardConfig {
                shard_column: shard_column.into(),
                modulus,
            },
        );
        self
    }

    /// Look up a table's strategy; table names match case-insensitively.
    pub fn table(&self, name: &str) -> Option<&TableShardConfig> {
        self.tables
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }
}

impl DalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a logical database.
    pub fn database(mut self, name: impl Into<String>, set: DatabaseSet) -> Self {
        self.databases.insert(name.into(), set);
        self
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(raw: &str) -> FreeSqlResult<Self> {
        let config: DalConfig = toml::from_str(raw)?;
        config.validate()?;
        tracing::info!(
            target: "freesql",
            databases = config.databases.len(),
            "loaded database topology"
        );
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> FreeSqlResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            FreeSqlError::config(format!(
                "failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&raw).map_err(|e| match e {
            FreeSqlError::Config(msg) => FreeSqlError::config(format!(
                "failed to parse config file {}: {msg}",
                path.display()
            )),
            other => other,
        })
    }

    pub fn validate(&self) -> FreeSqlResult<()> {
        for (db, set) in &self.databases {
            for (table, shard) in &set.tables {
                if shard.modulus == 0 {
                    return Err(FreeSqlError::config(format!(
                        "table '{table}' in '{db}': modulus must be greater than 0"
                    )));
                }
                if shard.shard_column.trim().is_empty() {
                    return Err(FreeSqlError::config(format!(
                        "table '{table}' in '{db}': shard_column must not be empty"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn database_set(&self, logic_db: &str) -> Option<&DatabaseSet> {
        self.databases.get(logic_db)
    }

    fn sharded_table(&self, logic_db: &str, table: &str) -> FreeSqlResult<(&DatabaseSet, &TableShardConfig)> {
        let set = self.database_set(logic_db).ok_or_else(|| {
            FreeSqlError::shard(table, format!("unknown logical database '{logic_db}'"))
        })?;
        let shard = set.table(table).ok_or_else(|| {
            FreeSqlError::shard(
                table,
                format!("table is not configured for sharding in '{logic_db}'"),
            )
        })?;
        Ok((set, shard))
    }

    fn shard_id_of(table: &str, shard: &TableShardConfig, value: &Value) -> FreeSqlResult<i64> {
        let v = value.as_i64().ok_or_else(|| {
            FreeSqlError::shard(
                table,
                format!("cannot derive a shard id from value {value}"),
            )
        })?;
        Ok(v.rem_euclid(i64::from(shard.modulus)))
    }
}

impl ShardLocator for DalConfig {
    fn database_category(&self, logic_db: &str) -> Option<DatabaseCategory> {
        self.database_set(logic_db).map(|set| set.category)
    }

    fn is_table_sharding_enabled(&self, logic_db: &str, table: &str) -> bool {
        self.database_set(logic_db)
            .is_some_and(|set| set.table(table).is_some())
    }

    fn resolve_by_id(&self, logic_db: &str, table: &str, shard_id: &str) -> FreeSqlResult<String> {
        let (set, shard) = self.sharded_table(logic_db, table)?;
        let shard_id = shard_id.trim();
        if shard_id.is_empty() {
            return Err(FreeSqlError::shard(table, "empty shard id"));
        }
        if let Ok(n) = shard_id.parse::<u64>() {
            if n >= u64::from(shard.modulus) {
                return Err(FreeSqlError::shard(
                    table,
                    format!("shard id {n} out of range 0..{}", shard.modulus),
                ));
            }
        }
        Ok(format!("{}{shard_id}", set.table_shard_separator))
    }

    fn resolve_by_value(&self, logic_db: &str, table: &str, value: &Value) -> FreeSqlResult<String> {
        let (set, shard) = self.sharded_table(logic_db, table)?;
        let id = Self::shard_id_of(table, shard, value)?;
        Ok(format!("{}{id}", set.table_shard_separator))
    }

    fn resolve_by_hints(
        &self,
        logic_db: &str,
        table: &str,
        hints: &Hints,
        params: &StatementParameters,
    ) -> FreeSqlResult<String> {
        let (_, shard) = self.sharded_table(logic_db, table)?;

        if let Some(id) = hints.table_shard_id() {
            return self.resolve_by_id(logic_db, table, id);
        }
        if let Some(value) = hints.shard_value() {
            return self.resolve_by_value(logic_db, table, value);
        }
        if let Some(value) = hints.col_value(&shard.shard_column) {
            return self.resolve_by_value(logic_db, table, value);
        }
        if let Some(param) = params.find(&shard.shard_column) {
            return self.resolve_by_value(logic_db, table, &param.value);
        }

        Err(FreeSqlError::shard(
            table,
            format!(
                "no shard id, shard value or value for shard column '{}' in hints or parameters",
                shard.shard_column
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOPOLOGY: &str = r#"
[databases.orders]
category = "mysql"

[databases.orders.tables.person]
shard_column = "city_id"
modulus = 4

[databases.reports]
category = "sql_server"
table_shard_separator = "__"
"#;

    #[test]
    fn parses_topology() {
        let config = DalConfig::from_toml_str(TOPOLOGY).unwrap();
        assert_eq!(config.database_category("orders"), Some(DatabaseCategory::MySql));
        assert_eq!(
            config.database_category("reports"),
            Some(DatabaseCategory::SqlServer)
        );
        assert_eq!(config.database_set("reports").unwrap().table_shard_separator, "__");
        assert!(config.is_table_sharding_enabled("orders", "person"));
        assert!(config.is_table_sharding_enabled("orders", "PERSON"));
        assert!(!config.is_table_sharding_enabled("orders", "city"));
        assert!(!config.is_table_sharding_enabled("missing", "person"));
    }

    #[test]
    fn rejects_zero_modulus() {
        let raw = r#"
[databases.orders]
category = "mysql"
[databases.orders.tables.person]
shard_column = "city_id"
modulus = 0
"#;
        let err = DalConfig::from_toml_str(raw).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("modulus"));
    }

    #[test]
    fn rejects_unknown_category() {
        let raw = "[databases.orders]\ncategory = \"db2\"\n";
        assert!(DalConfig::from_toml_str(raw).unwrap_err().is_config());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = DalConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn resolve_by_value_uses_modulus() {
        let config = DalConfig::from_toml_str(TOPOLOGY).unwrap();
        let suffix = config
            .resolve_by_value("orders", "person", &Value::Int(10))
            .unwrap();
        assert_eq!(suffix, "_2");
        let suffix = config
            .resolve_by_value("orders", "person", &Value::Int(-1))
            .unwrap();
        assert_eq!(suffix, "_3");
        let suffix = config
            .resolve_by_value("orders", "person", &Value::from("7"))
            .unwrap();
        assert_eq!(suffix, "_3");
    }

    #[test]
    fn resolve_by_value_rejects_non_integral() {
        let config = DalConfig::from_toml_str(TOPOLOGY).unwrap();
        let err = config
            .resolve_by_value("orders", "person", &Value::from("abc"))
            .unwrap_err();
        assert!(err.is_shard_resolution());
    }

    #[test]
    fn resolve_by_id_checks_range() {
        let config = DalConfig::from_toml_str(TOPOLOGY).unwrap();
        assert_eq!(config.resolve_by_id("orders", "person", "3").unwrap(), "_3");
        assert!(config.resolve_by_id("orders", "person", "4").is_err());
        assert!(config.resolve_by_id("orders", "person", " ").is_err());
    }

    #[test]
    fn resolve_unknown_table_fails() {
        let config = DalConfig::from_toml_str(TOPOLOGY).unwrap();
        let err = config.resolve_by_id("orders", "city", "1").unwrap_err();
        assert!(err.is_shard_resolution());
        let err = config.resolve_by_id("missing", "person", "1").unwrap_err();
        assert!(err.to_string().contains("unknown logical database"));
    }

    #[test]
    fn resolve_by_hints_precedence() {
        let config = DalConfig::from_toml_str(TOPOLOGY).unwrap();
        let mut params = StatementParameters::new();
        params.push_named("city_id", 5);

        // Parameters are the last resort.
        let suffix = config
            .resolve_by_hints("orders", "person", &Hints::new(), &params)
            .unwrap();
        assert_eq!(suffix, "_1");

        let hints = Hints::new().shard_col_value("city_id", 6);
        let suffix = config
            .resolve_by_hints("orders", "person", &hints, &params)
            .unwrap();
        assert_eq!(suffix, "_2");

        let hints = hints.table_shard_value(7);
        let suffix = config
            .resolve_by_hints("orders", "person", &hints, &params)
            .unwrap();
        assert_eq!(suffix, "_3");

        let hints = hints.in_table_shard("0");
        let suffix = config
            .resolve_by_hints("orders", "person", &hints, &params)
            .unwrap();
        assert_eq!(suffix, "_0");
    }

    #[test]
    fn resolve_by_hints_without_inputs_fails() {
        let config = DalConfig::from_toml_str(TOPOLOGY).unwrap();
        let err = config
            .resolve_by_hints("orders", "person", &Hints::new(), &StatementParameters::new())
            .unwrap_err();
        assert!(err.is_shard_resolution());
        assert!(err.to_string().contains("city_id"));
    }

    #[test]
    fn builder_api_matches_toml() {
        let config = DalConfig::new().database(
            "orders",
            DatabaseSet::new(DatabaseCategory::MySql).shard_table("person", "city_id", 4),
        );
        assert!(config.validate().is_ok());
        assert!(config.is_table_sharding_enabled("orders", "person"));
    }
}
