//! Final text assembly.
//!
//! Rendering happens in two passes over the (usually melted) tokens:
//!
//! 1. collect the bound parameters, one per surviving `?`, left to right;
//! 2. render each token (quoting, shard resolution, read hints, `$n`
//!    placeholders for PostgreSQL) and join the fragments with single spaces,
//!    except before a comma and next to a bracket.
//!
//! Parameters are collected first because hint-derived table sharding may
//! look up a shard column among them, and a table can precede the predicate
//! that binds that column.

use crate::context::BuilderContext;
use crate::dialect::Dialect;
use crate::error::{FreeSqlError, FreeSqlResult};
use crate::shard::physical_table_name;
use crate::token::{COLUMN_PLACEHOLDER, PLACEHOLDER, Token};
use crate::value::{StatementParameter, StatementParameters};
use serde::Serialize;

#[cfg(test)]
mod tests;

/// A rendered statement: SQL with placeholders and their values.
///
/// Placeholders are `?`, or `$1, $2, ...` for PostgreSQL, so `sql` and
/// `parameters.params_ref()` can go straight to `tokio-postgres`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuiltSql {
    pub sql: String,
    pub parameters: StatementParameters,
}

/// Render tokens into SQL text and the ordered parameter list.
///
/// A nullable expression reaching this point is a [`FreeSqlError::State`]:
/// it should have been removed by [`meltdown`](crate::meltdown::meltdown).
pub fn render(tokens: &[Token], ctx: &BuilderContext) -> FreeSqlResult<BuiltSql> {
    let visible: Vec<&Token> = tokens
        .iter()
        .filter(|t| !matches!(t, Token::Omitted))
        .collect();

    let parameters = collect_parameters(&visible, ctx)?;
    let dialect = ctx.dialect();

    let mut placeholders = Placeholders::new(dialect.numbered_placeholders());
    let mut sql = String::new();
    for (i, token) in visible.iter().enumerate() {
        sql.push_str(&render_token(token, ctx, &dialect, &parameters, &mut placeholders)?);

        let next = visible.get(i + 1);
        if token.is_bracket() || next.is_some_and(|n| n.is_bracket() || n.is_comma()) {
            continue;
        }
        sql.push(' ');
    }

    let sql = sql.trim().to_string();
    tracing::debug!(
        target: "freesql",
        sql = %sql,
        params = parameters.len(),
        dialect = %dialect,
        "built sql"
    );

    Ok(BuiltSql { sql, parameters })
}

fn placeholder_count(token: &Token) -> usize {
    let template = match token {
        Token::Text(s) => s.as_str(),
        Token::Expression(e) => e.template(),
        Token::ColumnExpression(e) => e.expression().template(),
        _ => return 0,
    };
    template.matches(PLACEHOLDER).count()
}

fn collect_parameters(tokens: &[&Token], ctx: &BuilderContext) -> FreeSqlResult<StatementParameters> {
    let mut out = StatementParameters::new();
    let mut external = ctx.parameters().into_iter().flat_map(|p| p.iter());

    for (position, token) in tokens.iter().enumerate() {
        if token.is_dead() {
            return Err(FreeSqlError::state(format!(
                "nullable expression at token {position} must be removed by meltdown before rendering"
            )));
        }

        let count = placeholder_count(token);
        let column = match token {
            Token::ColumnExpression(e) => Some(e.column()),
            _ => None,
        };
        let bound = token.bound_values();

        if !bound.is_empty() {
            if bound.len() != count {
                return Err(FreeSqlError::state(format!(
                    "token {position} has {count} placeholder(s) but {} bound value(s)",
                    bound.len()
                )));
            }
            for value in bound {
                out.push_entry(column.map(str::to_string), value.clone());
            }
            continue;
        }

        for _ in 0..count {
            let StatementParameter { name, value, .. } = external.next().ok_or_else(|| {
                FreeSqlError::state(format!(
                    "placeholder in token {position} has no bound value"
                ))
            })?;
            let name = name.clone().or_else(|| column.map(str::to_string));
            out.push_entry(name, value.clone());
        }
    }

    if external.next().is_some() {
        return Err(FreeSqlError::state(
            "more parameters than surviving placeholders",
        ));
    }

    Ok(out)
}

/// Placeholder numbering shared by every fragment of one statement.
struct Placeholders {
    numbered: bool,
    next: usize,
}

impl Placeholders {
    fn new(numbered: bool) -> Self {
        Self { numbered, next: 1 }
    }

    /// Rewrite each `?` as `$n`, continuing the statement-wide count.
    fn apply(&mut self, template: &str) -> String {
        if !self.numbered || !template.contains(PLACEHOLDER) {
            return template.to_string();
        }
        let mut out = String::with_capacity(template.len() + 4);
        for c in template.chars() {
            if c == PLACEHOLDER {
                out.push('$');
                out.push_str(&self.next.to_string());
                self.next += 1;
            } else {
                out.push(c);
            }
        }
        out
    }
}

fn render_token(
    token: &Token,
    ctx: &BuilderContext,
    dialect: &dyn Dialect,
    parameters: &StatementParameters,
    placeholders: &mut Placeholders,
) -> FreeSqlResult<String> {
    let rendered = match token {
        Token::Text(s) => placeholders.apply(s),
        Token::Keyword(k) => k.as_str().to_string(),
        Token::Operator(op) => op.as_str().to_string(),
        Token::Bracket(b) => b.as_str().to_string(),
        Token::Column(c) => with_alias(dialect.quote(c.name()), c.alias_name()),
        Token::Table(t) => {
            let physical = physical_table_name(t, ctx, parameters)?;
            let mut out = with_alias(dialect.quote(&physical), t.alias_name());
            let hint = dialect.read_hint_suffix();
            if t.has_read_hint() && !hint.is_empty() {
                out.push(' ');
                out.push_str(hint);
            }
            out
        }
        Token::Expression(e) => placeholders.apply(e.template()),
        Token::ColumnExpression(e) => {
            let template = e.expression().template();
            let slots = template.matches(COLUMN_PLACEHOLDER).count();
            if slots != 1 {
                return Err(FreeSqlError::state(format!(
                    "column expression template '{template}' needs exactly one {COLUMN_PLACEHOLDER} placeholder, found {slots}"
                )));
            }
            placeholders
                .apply(template)
                .replacen(COLUMN_PLACEHOLDER, &dialect.quote(e.column()), 1)
        }
        Token::Omitted => String::new(),
    };
    Ok(rendered)
}

fn with_alias(quoted: String, alias: Option<&str>) -> String {
    match alias {
        Some(alias) => format!("{quoted} AS {alias}"),
        None => quoted,
    }
}
