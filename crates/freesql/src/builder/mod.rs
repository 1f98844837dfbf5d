//! Fluent statement composer.

use crate::context::BuilderContext;
use crate::dialect::DatabaseCategory;
use crate::error::{FreeSqlError, FreeSqlResult};
use crate::expressions;
use crate::hints::Hints;
use crate::meltdown::meltdown;
use crate::render::{BuiltSql, render};
use crate::shard::ShardLocator;
use crate::token::{
    Bracket, ColumnExpression, ColumnRef, Expression, Keyword, Operator, TableRef, Token,
};
use crate::value::{StatementParameters, Value};
use std::borrow::Cow;
use std::sync::Arc;


/// Conversion used by the expression-oriented builder methods
/// (`where_`, `bracket`, `and_all`, `or_all`, `append_expressions`).
///
/// Strings become [`Expression`]s rather than text, so `nullable`/`bind` can
/// follow them. Every other token converts as-is.
pub trait IntoExpression {
    fn into_expression(self) -> Token;
}

impl IntoExpression for &str {
    fn into_expression(self) -> Token {
        Token::Expression(Expression::new(self))
    }
}

impl IntoExpression for String {
    fn into_expression(self) -> Token {
        Token::Expression(Expression::new(self))
    }
}

macro_rules! into_expression_via_token {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoExpression for $ty {
                fn into_expression(self) -> Token {
                    self.into()
                }
            }
        )*
    };
}

into_expression_via_token!(
    Token,
    Expression,
    ColumnExpression,
    ColumnRef,
    TableRef,
    Operator,
    Bracket,
    Keyword,
);

/// Composes a SQL statement as a flat token sequence.
///
/// Appending never fails. Calls that act on the last token (`nullable`,
/// `set_nullable`, `bind`) record the first misuse and [`build`](Self::build)
/// returns it. Context setters validate immediately and return a result.
///
/// # Example
/// ```ignore
/// let mut b = SqlBuilder::new();
/// b.select(["id", "name"])
///     .from("person")
///     .where_([expressions::equal("name")])
///     .nullable(name)
///     .and()
///     .greater_than("age").bind(18);
/// let built = b.build()?;
/// ```
#[must_use]
#[derive(Debug, Clone)]
pub struct SqlBuilder {
    tokens: Vec<Token>,
    context: BuilderContext,
    auto_meltdown: bool,
    build_error: Option<FreeSqlError>,
}

impl Default for SqlBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlBuilder {
    pub fn new() -> Self {
        Self::with_context(BuilderContext::new())
    }

    /// Builder resolving logical databases and table shards through `locator`.
    pub fn with_locator(locator: Arc<dyn ShardLocator>) -> Self {
        Self::with_context(BuilderContext::with_locator(locator))
    }

    fn with_context(context: BuilderContext) -> Self {
        Self {
            tokens: Vec::new(),
            context,
            auto_meltdown: true,
            build_error: None,
        }
    }

    // ==================== Context ====================

    pub fn set_logic_db_name(&mut self, name: impl Into<String>) -> FreeSqlResult<&mut Self> {
        self.context.set_logic_db_name(name)?;
        Ok(self)
    }

    pub fn set_dialect(&mut self, dialect: DatabaseCategory) -> FreeSqlResult<&mut Self> {
        self.context.set_dialect(dialect)?;
        Ok(self)
    }

    pub fn set_hints(&mut self, hints: Hints) -> &mut Self {
        self.context.set_hints(hints);
        self
    }

    /// Attach values for placeholders that carry no bound value.
    pub fn with_parameters(&mut self, parameters: StatementParameters) -> FreeSqlResult<&mut Self> {
        self.context.set_parameters(parameters)?;
        Ok(self)
    }

    /// Render the sequence as composed, without removing dead tokens.
    pub fn disable_auto_meltdown(&mut self) -> &mut Self {
        self.auto_meltdown = false;
        self
    }

    // ==================== Append ====================

    pub fn append(&mut self, token: impl Into<Token>) -> &mut Self {
        self.tokens.push(token.into());
        self
    }

    pub fn append_all<I, T>(&mut self, tokens: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        self.tokens.extend(tokens.into_iter().map(Into::into));
        self
    }

    /// Append `token` if `condition` holds. Otherwise a placeholder is
    /// appended that melts away, so a following `nullable`/`bind` is a no-op.
    pub fn append_when(&mut self, condition: bool, token: impl Into<Token>) -> &mut Self {
        if condition {
            self.append(token)
        } else {
            self.append(Token::Omitted)
        }
    }

    pub fn append_when_else(
        &mut self,
        condition: bool,
        token: impl Into<Token>,
        else_token: impl Into<Token>,
    ) -> &mut Self {
        if condition {
            self.append(token)
        } else {
            self.append(else_token)
        }
    }

    pub fn append_column(&mut self, name: impl Into<String>) -> &mut Self {
        self.append(ColumnRef::new(name))
    }

    pub fn append_column_as(&mut self, name: impl Into<String>, alias: impl Into<String>) -> &mut Self {
        self.append(ColumnRef::new(name).alias(alias))
    }

    pub fn append_table(&mut self, name: impl Into<String>) -> &mut Self {
        self.append(TableRef::new(name))
    }

    pub fn append_table_as(&mut self, name: impl Into<String>, alias: impl Into<String>) -> &mut Self {
        self.append(TableRef::new(name).alias(alias))
    }

    pub fn append_expression(&mut self, template: impl Into<String>) -> &mut Self {
        self.append(Expression::new(template))
    }

    /// Like [`append_all`](Self::append_all), but strings become expressions.
    pub fn append_expressions<I, T>(&mut self, expressions: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: IntoExpression,
    {
        self.tokens
            .extend(expressions.into_iter().map(IntoExpression::into_expression));
        self
    }

    // ==================== Clauses ====================

    /// `SELECT a, b, ...`
    pub fn select<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.append(Keyword::Select);
        for (i, column) in columns.into_iter().enumerate() {
            if i > 0 {
                self.append(Keyword::Comma);
            }
            self.append_column(column);
        }
        self
    }

    /// `FROM table`, with the dialect's read hint.
    pub fn from(&mut self, table: impl Into<String>) -> &mut Self {
        self.from_table(TableRef::new(table))
    }

    pub fn from_table(&mut self, table: TableRef) -> &mut Self {
        self.append(Keyword::From).append(table.with_read_hint())
    }

    /// `WHERE` followed by `expressions`. `WHERE` is dropped at build time if
    /// none of what follows it survives.
    pub fn where_<I, T>(&mut self, expressions: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: IntoExpression,
    {
        self.append(Keyword::Where).append_expressions(expressions)
    }

    pub fn order_by(&mut self, column: impl Into<String>, ascending: bool) -> &mut Self {
        self.append(Keyword::OrderBy)
            .append_column(column)
            .append_when_else(ascending, Keyword::Asc, Keyword::Desc)
    }

    pub fn group_by(&mut self, column: impl Into<String>) -> &mut Self {
        self.append(Keyword::GroupBy).append_column(column)
    }

    pub fn having(&mut self, condition: impl Into<String>) -> &mut Self {
        self.append(Keyword::Having).append_expression(condition)
    }

    /// `INSERT INTO table(a, b) VALUES(?, ?)`; values come from bound
    /// parameters.
    pub fn insert_into<I, S>(&mut self, table: impl Into<String>, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();

        self.append(Keyword::InsertInto)
            .append_table(table)
            .left_bracket();
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                self.append(Keyword::Comma);
            }
            self.append_column(column.as_str());
        }
        // Empty text keeps the space between `)` and `VALUES`.
        self.right_bracket()
            .append(Token::text(""))
            .append(Keyword::Values)
            .left_bracket();
        for i in 0..columns.len() {
            if i > 0 {
                self.append(Keyword::Comma);
            }
            self.append_expression("?");
        }
        self.right_bracket()
    }

    pub fn delete_from(&mut self, table: impl Into<String>) -> &mut Self {
        self.append(Keyword::DeleteFrom).append_table(table)
    }

    // ==================== Grouping & operators ====================

    pub fn left_bracket(&mut self) -> &mut Self {
        self.append(expressions::LEFT_BRACKET)
    }

    pub fn right_bracket(&mut self) -> &mut Self {
        self.append(expressions::RIGHT_BRACKET)
    }

    /// Wrap `expressions` in brackets.
    pub fn bracket<I, T>(&mut self, expressions: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: IntoExpression,
    {
        self.left_bracket()
            .append_expressions(expressions)
            .right_bracket()
    }

    pub fn and(&mut self) -> &mut Self {
        self.append(expressions::AND)
    }

    pub fn or(&mut self) -> &mut Self {
        self.append(expressions::OR)
    }

    pub fn not(&mut self) -> &mut Self {
        self.append(expressions::NOT)
    }

    /// Join `expressions` with `AND`.
    pub fn and_all<I, T>(&mut self, expressions: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: IntoExpression,
    {
        self.join(expressions, Operator::And)
    }

    /// Join `expressions` with `OR`.
    pub fn or_all<I, T>(&mut self, expressions: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: IntoExpression,
    {
        self.join(expressions, Operator::Or)
    }

    fn join<I, T>(&mut self, expressions: I, op: Operator) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: IntoExpression,
    {
        for (i, expression) in expressions.into_iter().enumerate() {
            if i > 0 {
                self.append(op);
            }
            self.append(expression.into_expression());
        }
        self
    }

    // ==================== Last-token mutators ====================

    /// Bind `value` to the last expression, or mark it dead when `None`.
    pub fn nullable<V: Into<Value>>(&mut self, value: Option<V>) -> &mut Self {
        let value = value.map(Into::into);
        self.with_last_expression("nullable", |e| e.apply_nullable(value))
    }

    pub fn set_nullable(&mut self, nullable: bool) -> &mut Self {
        self.with_last_expression("set_nullable", |e| e.set_nullable(nullable))
    }

    /// Bind the next placeholder value of the last expression.
    pub fn bind(&mut self, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        self.with_last_expression("bind", |e| e.push_value(value))
    }

    fn with_last_expression(&mut self, op: &str, f: impl FnOnce(&mut Expression)) -> &mut Self {
        let result = match self.tokens.last_mut() {
            None => Err(FreeSqlError::state(format!(
                "`{op}` called with no token appended"
            ))),
            // The skipped predicate carries nothing to mutate.
            Some(Token::Omitted) => Ok(()),
            Some(token) => match token.expression_mut() {
                Some(e) => {
                    f(e);
                    Ok(())
                }
                None => Err(FreeSqlError::state(format!(
                    "`{op}` requires the last token to be an expression, found {token:?}"
                ))),
            },
        };

        if let Err(err) = result {
            self.record_error(err);
        }
        self
    }

    fn record_error(&mut self, err: FreeSqlError) {
        if self.build_error.is_none() {
            self.build_error = Some(err);
        }
    }

    // ==================== Comparisons ====================

    pub fn equal(&mut self, column: impl Into<String>) -> &mut Self {
        self.append(expressions::equal(column))
    }

    pub fn not_equal(&mut self, column: impl Into<String>) -> &mut Self {
        self.append(expressions::not_equal(column))
    }

    pub fn greater_than(&mut self, column: impl Into<String>) -> &mut Self {
        self.append(expressions::greater_than(column))
    }

    pub fn greater_than_equals(&mut self, column: impl Into<String>) -> &mut Self {
        self.append(expressions::greater_than_equals(column))
    }

    pub fn less_than(&mut self, column: impl Into<String>) -> &mut Self {
        self.append(expressions::less_than(column))
    }

    pub fn less_than_equals(&mut self, column: impl Into<String>) -> &mut Self {
        self.append(expressions::less_than_equals(column))
    }

    pub fn between(&mut self, column: impl Into<String>) -> &mut Self {
        self.append(expressions::between(column))
    }

    pub fn like(&mut self, column: impl Into<String>) -> &mut Self {
        self.append(expressions::like(column))
    }

    pub fn not_like(&mut self, column: impl Into<String>) -> &mut Self {
        self.append(expressions::not_like(column))
    }

    pub fn in_(&mut self, column: impl Into<String>) -> &mut Self {
        self.append(expressions::in_(column))
    }

    pub fn not_in(&mut self, column: impl Into<String>) -> &mut Self {
        self.append(expressions::not_in(column))
    }

    pub fn is_null(&mut self, column: impl Into<String>) -> &mut Self {
        self.append(expressions::is_null(column))
    }

    pub fn is_not_null(&mut self, column: impl Into<String>) -> &mut Self {
        self.append(expressions::is_not_null(column))
    }

    // ==================== Build ====================

    /// Melt (unless disabled) and render. The composed sequence is left
    /// untouched, so `build` can be called repeatedly.
    pub fn build(&self) -> FreeSqlResult<BuiltSql> {
        if let Some(err) = &self.build_error {
            return Err(err.clone());
        }

        let tokens: Cow<'_, [Token]> = if self.auto_meltdown {
            Cow::Owned(meltdown(&self.tokens)?)
        } else {
            Cow::Borrowed(self.tokens.as_slice())
        };

        render(&tokens, &self.context)
    }

    /// The first recorded misuse, if any.
    pub fn build_error(&self) -> Option<&FreeSqlError> {
        self.build_error.as_ref()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn context(&self) -> &BuilderContext {
        &self.context
    }
}
