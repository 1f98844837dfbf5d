//! Shared render context of one builder.

use crate::dialect::DatabaseCategory;
use crate::error::{FreeSqlError, FreeSqlResult};
use crate::hints::Hints;
use crate::shard::ShardLocator;
use crate::value::StatementParameters;
use std::fmt;
use std::sync::Arc;

/// Everything the renderer needs besides the tokens themselves.
///
/// Invariants:
/// - the dialect is either set explicitly or derived from the logical
///   database, and the two never disagree;
/// - a parameter list can only be attached while the current one is empty.
#[derive(Clone, Default)]
pub struct BuilderContext {
    dialect: Option<DatabaseCategory>,
    logic_db_name: Option<String>,
    hints: Hints,
    parameters: Option<StatementParameters>,
    locator: Option<Arc<dyn ShardLocator>>,
}

impl fmt::Debug for BuilderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuilderContext")
            .field("dialect", &self.dialect)
            .field("logic_db_name", &self.logic_db_name)
            .field("hints", &self.hints)
            .field("parameters", &self.parameters)
            .field("locator", &self.locator.as_ref().map(|_| "<dyn ShardLocator>"))
            .finish()
    }
}

impl BuilderContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locator(locator: Arc<dyn ShardLocator>) -> Self {
        Self {
            locator: Some(locator),
            ..Self::default()
        }
    }

    /// Bind the logical database and derive the dialect from it.
    pub fn set_logic_db_name(&mut self, name: impl Into<String>) -> FreeSqlResult<()> {
        let name = name.into();
        let locator = self.locator.as_ref().ok_or_else(|| {
            FreeSqlError::config(format!(
                "cannot resolve logical database '{name}': no topology configured"
            ))
        })?;
        let category = locator
            .database_category(&name)
            .ok_or_else(|| FreeSqlError::config(format!("unknown logical database '{name}'")))?;

        if let Some(dialect) = self.dialect {
            if dialect != category {
                return Err(FreeSqlError::config(format!(
                    "dialect {dialect} does not match logical database '{name}' ({category})"
                )));
            }
        }

        self.dialect = Some(category);
        self.logic_db_name = Some(name);
        Ok(())
    }

    /// Set the dialect explicitly. Redundant once a logical database is set.
    pub fn set_dialect(&mut self, dialect: DatabaseCategory) -> FreeSqlResult<()> {
        if let (Some(current), Some(db)) = (self.dialect, self.logic_db_name.as_deref()) {
            if current != dialect {
                return Err(FreeSqlError::config(format!(
                    "dialect {dialect} does not match logical database '{db}' ({current})"
                )));
            }
        }
        self.dialect = Some(dialect);
        Ok(())
    }

    pub fn set_hints(&mut self, hints: Hints) {
        self.hints = hints;
    }

    /// Attach the caller-managed parameter list.
    pub fn set_parameters(&mut self, parameters: StatementParameters) -> FreeSqlResult<()> {
        if self.parameters.as_ref().is_some_and(|p| !p.is_empty()) {
            return Err(FreeSqlError::state(
                "parameters have already been set and populated; set them before building",
            ));
        }
        self.parameters = Some(parameters);
        Ok(())
    }

    /// Effective dialect; MySQL when neither dialect nor database was set.
    pub fn dialect(&self) -> DatabaseCategory {
        self.dialect.unwrap_or_default()
    }

    pub fn logic_db_name(&self) -> Option<&str> {
        self.logic_db_name.as_deref()
    }

    pub fn hints(&self) -> &Hints {
        &self.hints
    }

    pub fn parameters(&self) -> Option<&StatementParameters> {
        self.parameters.as_ref()
    }

    pub fn locator(&self) -> Option<&dyn ShardLocator> {
        self.locator.as_deref()
    }
}
