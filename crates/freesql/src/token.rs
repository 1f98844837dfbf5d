//! SQL template tokens.
//!
//! A statement is composed as a flat, ordered list of [`Token`]s. Structure
//! (boolean connectives, bracket groups, clause keywords) is kept as tokens of
//! its own so that [`meltdown`](crate::meltdown) can drop the pieces left
//! dangling by omitted predicates.

use crate::value::Value;

/// Positional parameter placeholder used in every template.
pub const PLACEHOLDER: char = '?';

/// Identifier placeholder in a [`ColumnExpression`] template.
pub const COLUMN_PLACEHOLDER: &str = "{}";

/// Boolean connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
    Not,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Not => "NOT",
        }
    }

    /// `AND` / `OR` need an operand on both sides, `NOT` only on its right.
    pub fn is_binary(&self) -> bool {
        !matches!(self, Operator::Not)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket {
    Open,
    Close,
}

impl Bracket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bracket::Open => "(",
            Bracket::Close => ")",
        }
    }
}

/// Clause keywords emitted by the builder.
///
/// Keywords are live content, but boolean operators never take one as an
/// operand: `WHERE AND x` melts to `WHERE x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Select,
    From,
    Where,
    Having,
    OrderBy,
    GroupBy,
    Asc,
    Desc,
    InsertInto,
    Values,
    DeleteFrom,
    Comma,
}

impl Keyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Select => "SELECT",
            Keyword::From => "FROM",
            Keyword::Where => "WHERE",
            Keyword::Having => "HAVING",
            Keyword::OrderBy => "ORDER BY",
            Keyword::GroupBy => "GROUP BY",
            Keyword::Asc => "ASC",
            Keyword::Desc => "DESC",
            Keyword::InsertInto => "INSERT INTO",
            Keyword::Values => "VALUES",
            Keyword::DeleteFrom => "DELETE FROM",
            Keyword::Comma => ",",
        }
    }

    /// `WHERE` and `HAVING` own a predicate region and are dropped when
    /// nothing in it survives.
    pub fn is_predicate_lead(&self) -> bool {
        matches!(self, Keyword::Where | Keyword::Having)
    }
}

/// A column name, quoted by the dialect at render time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    name: String,
    alias: Option<String>,
}

impl ColumnRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    /// Render as `name AS alias`.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }
}

/// How a table reference picks its physical shard.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ShardSelector {
    /// Always render the logical name.
    Disabled,
    /// A fixed shard id; independent of any bound value.
    ExplicitId(String),
    /// A value the shard locator maps to a shard id.
    ExplicitValue(Value),
    /// Let the shard locator derive the shard from hints and parameters.
    #[default]
    HintDerived,
}

/// A logical table name, resolved to its physical shard at render time.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    logical_name: String,
    alias: Option<String>,
    shard: ShardSelector,
    read_hint: bool,
}

impl TableRef {
    pub fn new(logical_name: impl Into<String>) -> Self {
        Self {
            logical_name: logical_name.into(),
            alias: None,
            shard: ShardSelector::HintDerived,
            read_hint: false,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Pin the table to a shard id.
    pub fn in_shard(mut self, shard_id: impl Into<String>) -> Self {
        self.shard = ShardSelector::ExplicitId(shard_id.into());
        self
    }

    /// Route the table by a shard value.
    pub fn shard_value(mut self, value: impl Into<Value>) -> Self {
        self.shard = ShardSelector::ExplicitValue(value.into());
        self
    }

    /// Never shard this reference.
    pub fn no_shard(mut self) -> Self {
        self.shard = ShardSelector::Disabled;
        self
    }

    /// Append the dialect's read hint after the table (set by `FROM`).
    pub fn with_read_hint(mut self) -> Self {
        self.read_hint = true;
        self
    }

    pub fn logical_name(&self) -> &str {
        &self.logical_name
    }

    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn shard(&self) -> &ShardSelector {
        &self.shard
    }

    pub fn has_read_hint(&self) -> bool {
        self.read_hint
    }
}

/// A SQL fragment with `?` placeholders.
///
/// Values may be bound to the expression itself; they travel with it and are
/// dropped together with it when the expression melts away. An expression
/// without bound values takes its values from the builder's parameter list.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    template: String,
    nullable: bool,
    values: Vec<Value>,
}

impl Expression {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            nullable: false,
            values: Vec::new(),
        }
    }

    /// Bind the next placeholder value.
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.values.push(value.into());
        self
    }

    /// Bind `value` if present, otherwise mark the expression dead.
    pub fn when_present<V: Into<Value>>(mut self, value: Option<V>) -> Self {
        self.apply_nullable(value.map(Into::into));
        self
    }

    pub fn set_nullable(&mut self, nullable: bool) {
        self.nullable = nullable;
    }

    pub(crate) fn push_value(&mut self, value: Value) {
        self.values.push(value);
    }

    pub(crate) fn apply_nullable(&mut self, value: Option<Value>) {
        match value {
            Some(v) => {
                self.nullable = false;
                self.values.push(v);
            }
            None => self.nullable = true,
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// An expression whose template holds exactly one `{}`, filled with the
/// quoted column name.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnExpression {
    column: String,
    expression: Expression,
}

impl ColumnExpression {
    pub fn new(template: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            expression: Expression::new(template),
        }
    }

    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.expression = self.expression.bind(value);
        self
    }

    pub fn when_present<V: Into<Value>>(mut self, value: Option<V>) -> Self {
        self.expression = self.expression.when_present(value);
        self
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub(crate) fn expression_mut(&mut self) -> &mut Expression {
        &mut self.expression
    }
}

/// One unit of a SQL template.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Literal text, emitted verbatim.
    Text(String),
    Keyword(Keyword),
    Operator(Operator),
    Bracket(Bracket),
    Column(ColumnRef),
    Table(TableRef),
    Expression(Expression),
    ColumnExpression(ColumnExpression),
    /// Placeholder for a predicate skipped at composition time. Never rendered.
    Omitted,
}

impl Token {
    pub fn text(s: impl Into<String>) -> Self {
        Token::Text(s.into())
    }

    /// Expression-family tokens accept `nullable`/`bind`.
    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            Token::Expression(_) | Token::ColumnExpression(_) | Token::Omitted
        )
    }

    /// Dead on sight: removed by meltdown regardless of its neighbours.
    pub fn is_dead(&self) -> bool {
        match self {
            Token::Expression(e) => e.is_nullable(),
            Token::ColumnExpression(e) => e.expression().is_nullable(),
            Token::Omitted => true,
            _ => false,
        }
    }

    pub fn is_bracket(&self) -> bool {
        matches!(self, Token::Bracket(_))
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Token::Bracket(Bracket::Open))
    }

    pub fn is_close(&self) -> bool {
        matches!(self, Token::Bracket(Bracket::Close))
    }

    pub fn is_operator(&self) -> bool {
        matches!(self, Token::Operator(_))
    }

    pub fn is_not(&self) -> bool {
        matches!(self, Token::Operator(Operator::Not))
    }

    pub fn is_keyword(&self) -> bool {
        matches!(self, Token::Keyword(_))
    }

    pub fn is_comma(&self) -> bool {
        matches!(self, Token::Keyword(Keyword::Comma))
    }

    /// Mutable access to the expression behind an expression-family token.
    /// `Omitted` has none.
    pub(crate) fn expression_mut(&mut self) -> Option<&mut Expression> {
        match self {
            Token::Expression(e) => Some(e),
            Token::ColumnExpression(e) => Some(e.expression_mut()),
            _ => None,
        }
    }

    /// Values bound directly to this token.
    pub(crate) fn bound_values(&self) -> &[Value] {
        match self {
            Token::Expression(e) => e.values(),
            Token::ColumnExpression(e) => e.expression().values(),
            _ => &[],
        }
    }
}

impl From<&str> for Token {
    /// `","` becomes the comma keyword so it gets comma spacing; anything else
    /// is text.
    fn from(s: &str) -> Self {
        if s == Keyword::Comma.as_str() {
            Token::Keyword(Keyword::Comma)
        } else {
            Token::Text(s.to_string())
        }
    }
}

impl From<String> for Token {
    fn from(s: String) -> Self {
        Token::from(s.as_str())
    }
}

impl From<Keyword> for Token {
    fn from(k: Keyword) -> Self {
        Token::Keyword(k)
    }
}

impl From<Operator> for Token {
    fn from(op: Operator) -> Self {
        Token::Operator(op)
    }
}

impl From<Bracket> for Token {
    fn from(b: Bracket) -> Self {
        Token::Bracket(b)
    }
}

impl From<ColumnRef> for Token {
    fn from(c: ColumnRef) -> Self {
        Token::Column(c)
    }
}

impl From<TableRef> for Token {
    fn from(t: TableRef) -> Self {
        Token::Table(t)
    }
}

impl From<Expression> for Token {
    fn from(e: Expression) -> Self {
        Token::Expression(e)
    }
}

impl From<ColumnExpression> for Token {
    fn from(e: ColumnExpression) -> Self {
        Token::ColumnExpression(e)
    }
}
