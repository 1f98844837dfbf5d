//! Token factories.
//!
//! Free functions building the tokens a [`SqlBuilder`](crate::SqlBuilder)
//! appends. Useful with [`SqlBuilder::append_all`](crate::SqlBuilder::append_all)
//! to write a whole predicate in one call:
//!
//! ```ignore
//! use freesql::expressions::*;
//!
//! builder.where_([
//!     Token::from(equal("name").when_present(name)),
//!     AND.into(),
//!     LEFT_BRACKET.into(),
//!     NOT.into(),
//!     like("email").bind("%@example.com").into(),
//!     OR.into(),
//!     expression("count > 0").into(),
//!     RIGHT_BRACKET.into(),
//! ]);
//! ```

use crate::token::{Bracket, ColumnExpression, ColumnRef, Expression, Operator, TableRef, Token};

pub const AND: Operator = Operator::And;
pub const OR: Operator = Operator::Or;
pub const NOT: Operator = Operator::Not;
pub const LEFT_BRACKET: Bracket = Bracket::Open;
pub const RIGHT_BRACKET: Bracket = Bracket::Close;

pub fn text(template: impl Into<String>) -> Token {
    Token::text(template)
}

pub fn column(name: impl Into<String>) -> ColumnRef {
    ColumnRef::new(name)
}

pub fn table(name: impl Into<String>) -> TableRef {
    TableRef::new(name)
}

pub fn expression(template: impl Into<String>) -> Expression {
    Expression::new(template)
}

/// `template` when `condition` holds, otherwise a token that always melts
/// away.
pub fn expression_when(condition: bool, template: impl Into<String>) -> Token {
    if condition {
        Token::Expression(Expression::new(template))
    } else {
        Token::Omitted
    }
}

pub fn expression_when_else(
    condition: bool,
    template: impl Into<String>,
    else_template: impl Into<String>,
) -> Expression {
    if condition {
        Expression::new(template)
    } else {
        Expression::new(else_template)
    }
}

/// Wrap tokens in a bracket pair.
pub fn bracket<I, T>(tokens: I) -> Vec<Token>
where
    I: IntoIterator<Item = T>,
    T: Into<Token>,
{
    let mut out = vec![Token::Bracket(Bracket::Open)];
    out.extend(tokens.into_iter().map(Into::into));
    out.push(Token::Bracket(Bracket::Close));
    out
}

/// A column expression from a `{}` template.
pub fn column_expression(template: impl Into<String>, column: impl Into<String>) -> ColumnExpression {
    ColumnExpression::new(template, column)
}

pub fn equal(column: impl Into<String>) -> ColumnExpression {
    column_expression("{} = ?", column)
}

pub fn not_equal(column: impl Into<String>) -> ColumnExpression {
    column_expression("{} <> ?", column)
}

pub fn greater_than(column: impl Into<String>) -> ColumnExpression {
    column_expression("{} > ?", column)
}

pub fn greater_than_equals(column: impl Into<String>) -> ColumnExpression {
    column_expression("{} >= ?", column)
}

pub fn less_than(column: impl Into<String>) -> ColumnExpression {
    column_expression("{} < ?", column)
}

pub fn less_than_equals(column: impl Into<String>) -> ColumnExpression {
    column_expression("{} <= ?", column)
}

pub fn between(column: impl Into<String>) -> ColumnExpression {
    column_expression("{} BETWEEN ? AND ?", column)
}

pub fn like(column: impl Into<String>) -> ColumnExpression {
    column_expression("{} LIKE ?", column)
}

pub fn not_like(column: impl Into<String>) -> ColumnExpression {
    column_expression("{} NOT LIKE ?", column)
}

pub fn in_(column: impl Into<String>) -> ColumnExpression {
    column_expression("{} IN(?)", column)
}

pub fn not_in(column: impl Into<String>) -> ColumnExpression {
    column_expression("{} NOT IN(?)", column)
}

pub fn is_null(column: impl Into<String>) -> ColumnExpression {
    column_expression("{} IS NULL", column)
}

pub fn is_not_null(column: impl Into<String>) -> ColumnExpression {
    column_expression("{} IS NOT NULL", column)
}
