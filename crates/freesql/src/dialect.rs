//! SQL dialect support.
//!
//! Different databases quote identifiers differently and some accept
//! vendor-specific table hints. The renderer only talks to the [`Dialect`]
//! trait; [`DatabaseCategory`] is the built-in implementation.

use serde::Deserialize;
use std::fmt;

/// Trait for SQL dialect-specific behavior.
pub trait Dialect {
    /// Quote an identifier (column or table name).
    fn quote(&self, ident: &str) -> String;

    /// Table hint appended after a table read through `FROM`.
    ///
    /// Empty for every dialect that has no such hint.
    fn read_hint_suffix(&self) -> &'static str {
        ""
    }

    /// Whether `?` placeholders are rendered as `$1, $2, ...`.
    fn numbered_placeholders(&self) -> bool {
        false
    }
}

/// Database categories known to the configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
pub enum DatabaseCategory {
    #[default]
    #[serde(rename = "mysql")]
    MySql,
    #[serde(rename = "sql_server", alias = "sqlserver")]
    SqlServer,
    #[serde(rename = "postgresql", alias = "postgres")]
    PostgreSql,
    #[serde(rename = "oracle")]
    Oracle,
}

impl DatabaseCategory {
    /// Returns the name of the dialect.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::SqlServer => "sql_server",
            Self::PostgreSql => "postgresql",
            Self::Oracle => "oracle",
        }
    }

    fn quote_chars(&self) -> (char, char) {
        match self {
            Self::MySql => ('`', '`'),
            Self::SqlServer => ('[', ']'),
            Self::PostgreSql | Self::Oracle => ('"', '"'),
        }
    }
}

impl fmt::Display for DatabaseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Dialect for DatabaseCategory {
    fn quote(&self, ident: &str) -> String {
        let (open, close) = self.quote_chars();
        let mut out = String::with_capacity(ident.len() + 2);
        out.push(open);
        for c in ident.chars() {
            // Escape the closing quote by doubling it.
            if c == close {
                out.push(close);
            }
            out.push(c);
        }
        out.push(close);
        out
    }

    fn read_hint_suffix(&self) -> &'static str {
        match self {
            Self::SqlServer => "WITH (NOLOCK)",
            _ => "",
        }
    }

    fn numbered_placeholders(&self) -> bool {
        matches!(self, Self::PostgreSql)
    }
}
