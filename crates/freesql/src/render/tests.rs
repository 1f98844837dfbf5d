use super::*;
use crate::config::{DalConfig, DatabaseSet};
use crate::dialect::DatabaseCategory;
use crate::expressions::{self, AND, LEFT_BRACKET, OR, RIGHT_BRACKET};
use crate::hints::Hints;
use crate::token::{ColumnExpression, Expression, Keyword, TableRef};
use crate::value::Value;
use std::sync::Arc;

fn t<T: Into<Token>>(v: T) -> Token {
    v.into()
}

fn sharded_ctx() -> BuilderContext {
    let config = DalConfig::new()
        .database(
            "orders",
            DatabaseSet::new(DatabaseCategory::MySql).shard_table("person", "city_id", 4),
        )
        .database("reports", DatabaseSet::new(DatabaseCategory::SqlServer));
    let mut ctx = BuilderContext::with_locator(Arc::new(config));
    ctx.set_logic_db_name("orders").unwrap();
    ctx
}

#[test]
fn no_space_before_comma() {
    let tokens = vec![
        t(Keyword::Select),
        t(expressions::column("a")),
        t(Keyword::Comma),
        t(expressions::column("b")),
    ];
    let built = render(&tokens, &BuilderContext::new()).unwrap();
    assert_eq!(built.sql, "SELECT `a`, `b`");
    assert!(built.parameters.is_empty());
}

#[test]
fn no_space_around_brackets() {
    let tokens = vec![
        t(Keyword::Where),
        t(LEFT_BRACKET),
        t(expressions::equal("a").bind(1)),
        t(OR),
        t(expressions::equal("b").bind(2)),
        t(RIGHT_BRACKET),
        t(AND),
        t(expressions::is_null("c")),
    ];
    let built = render(&tokens, &BuilderContext::new()).unwrap();
    assert_eq!(built.sql, "WHERE(`a` = ? OR `b` = ?)AND `c` IS NULL");
}

#[test]
fn empty_text_forces_space_before_bracket() {
    let tokens = vec![
        t(Keyword::Where),
        Token::text(""),
        t(LEFT_BRACKET),
        t(expressions::equal("a").bind(1)),
        t(RIGHT_BRACKET),
    ];
    let built = render(&tokens, &BuilderContext::new()).unwrap();
    assert_eq!(built.sql, "WHERE (`a` = ?)");
}

#[test]
fn aliases_render_with_as() {
    let tokens = vec![
        t(Keyword::Select),
        t(expressions::column("name").alias("n")),
        t(Keyword::From),
        t(TableRef::new("person").alias("p")),
    ];
    let built = render(&tokens, &BuilderContext::new()).unwrap();
    assert_eq!(built.sql, "SELECT `name` AS n FROM `person` AS p");
}

#[test]
fn parameters_follow_placeholder_order() {
    let tokens = vec![
        t(expressions::between("age").bind(18).bind(30)),
        t(AND),
        t(expressions::equal("name").bind("alice")),
        t(AND),
        t(Expression::new("score > ?").bind(9.5)),
    ];
    let built = render(&tokens, &BuilderContext::new()).unwrap();
    assert_eq!(built.sql, "`age` BETWEEN ? AND ? AND `name` = ? AND score > ?");

    let values: Vec<&Value> = built.parameters.values().collect();
    assert_eq!(
        values,
        vec![
            &Value::Int(18),
            &Value::Int(30),
            &Value::from("alice"),
            &Value::Float(9.5)
        ]
    );
    let indices: Vec<usize> = built.parameters.iter().map(|p| p.index).collect();
    assert_eq!(indices, vec![1, 2, 3, 4]);
    assert_eq!(built.parameters.get(3).unwrap().name.as_deref(), Some("name"));
    assert_eq!(built.parameters.get(4).unwrap().name, None);
}

#[test]
fn context_parameters_fill_unbound_placeholders() {
    let mut ctx = BuilderContext::new();
    let mut params = StatementParameters::new();
    params.push(1);
    params.push_named("flag", true);
    ctx.set_parameters(params).unwrap();

    let tokens = vec![
        t(expressions::equal("id")),
        t(AND),
        t(expressions::equal("name").bind("x")),
        t(AND),
        Token::text("flag = ?"),
    ];
    let built = render(&tokens, &ctx).unwrap();
    assert_eq!(built.sql, "`id` = ? AND `name` = ? AND flag = ?");
    let names: Vec<Option<&str>> = built.parameters.iter().map(|p| p.name.as_deref()).collect();
    assert_eq!(names, vec![Some("id"), Some("name"), Some("flag")]);
    let values: Vec<&Value> = built.parameters.values().collect();
    assert_eq!(values, vec![&Value::Int(1), &Value::from("x"), &Value::Bool(true)]);
}

#[test]
fn missing_parameter_fails() {
    let tokens = vec![t(expressions::equal("id"))];
    let err = render(&tokens, &BuilderContext::new()).unwrap_err();
    assert!(err.is_state());
}

#[test]
fn leftover_parameters_fail() {
    let mut ctx = BuilderContext::new();
    let mut params = StatementParameters::new();
    params.push(1);
    params.push(2);
    ctx.set_parameters(params).unwrap();
    let err = render(&[t(expressions::equal("id"))], &ctx).unwrap_err();
    assert!(err.is_state());
}

#[test]
fn bound_value_count_must_match() {
    let tokens = vec![t(expressions::between("age").bind(1))];
    let err = render(&tokens, &BuilderContext::new()).unwrap_err();
    assert!(err.to_string().contains("2 placeholder(s) but 1 bound value(s)"));
}

#[test]
fn nullable_expression_is_rejected() {
    let tokens = vec![t(expressions::equal("a").when_present(None::<i32>))];
    let err = render(&tokens, &BuilderContext::new()).unwrap_err();
    assert!(err.is_state());
}

#[test]
fn omitted_renders_nothing() {
    let tokens = vec![
        t(Keyword::Select),
        Token::Omitted,
        Token::text("1"),
        Token::Omitted,
    ];
    let built = render(&tokens, &BuilderContext::new()).unwrap();
    assert_eq!(built.sql, "SELECT 1");
}

#[test]
fn column_template_without_placeholder_fails() {
    let tokens = vec![t(ColumnExpression::new("a = 1", "a"))];
    let err = render(&tokens, &BuilderContext::new()).unwrap_err();
    assert!(err.is_state());
}

#[test]
fn column_template_with_two_placeholders_fails() {
    let tokens = vec![t(ColumnExpression::new("{} = {}", "a"))];
    let err = render(&tokens, &BuilderContext::new()).unwrap_err();
    assert!(err.is_state());
    assert!(err.to_string().contains("found 2"));
}

#[test]
fn quoting_follows_dialect() {
    let mut ctx = BuilderContext::new();
    ctx.set_dialect(DatabaseCategory::PostgreSql).unwrap();
    let tokens = vec![t(expressions::not_equal("status").bind(0))];
    let built = render(&tokens, &ctx).unwrap();
    assert_eq!(built.sql, "\"status\" <> $1");
}

#[test]
fn postgres_numbers_placeholders_in_order() {
    let mut ctx = BuilderContext::new();
    ctx.set_dialect(DatabaseCategory::PostgreSql).unwrap();
    let tokens = vec![
        t(Keyword::Where),
        t(expressions::between("age").bind(18).bind(30)),
        t(AND),
        t(expressions::expression("name = ? OR nick = ?").bind("a").bind("b")),
        t(OR),
        t(expressions::equal("city").when_present(None::<i32>)),
        t(AND),
        t(expressions::equal("id").bind(7)),
    ];
    let melted = crate::meltdown::meltdown(&tokens).unwrap();
    let built = render(&melted, &ctx).unwrap();
    assert_eq!(
        built.sql,
        "WHERE \"age\" BETWEEN $1 AND $2 AND name = $3 OR nick = $4 AND \"id\" = $5"
    );
    assert_eq!(built.parameters.len(), 5);
    assert_eq!(built.parameters.get(5).unwrap().value, Value::Int(7));
}

#[test]
fn other_dialects_keep_question_marks() {
    let tokens = vec![t(expressions::equal("id").bind(1))];
    for dialect in [
        DatabaseCategory::MySql,
        DatabaseCategory::SqlServer,
        DatabaseCategory::Oracle,
    ] {
        let mut ctx = BuilderContext::new();
        ctx.set_dialect(dialect).unwrap();
        assert!(render(&tokens, &ctx).unwrap().sql.ends_with("= ?"));
    }
}

#[test]
fn read_hint_only_for_sql_server() {
    let table = TableRef::new("person").alias("p").with_read_hint();

    let mut ctx = BuilderContext::new();
    ctx.set_dialect(DatabaseCategory::SqlServer).unwrap();
    let built = render(&[t(Keyword::From), t(table.clone())], &ctx).unwrap();
    assert_eq!(built.sql, "FROM [person] AS p WITH (NOLOCK)");

    let built = render(&[t(Keyword::From), t(table)], &BuilderContext::new()).unwrap();
    assert_eq!(built.sql, "FROM `person` AS p");
}

#[test]
fn sharding_disabled_renders_logical_name() {
    let ctx = sharded_ctx();
    let built = render(&[t(TableRef::new("city"))], &ctx).unwrap();
    assert_eq!(built.sql, "`city`");

    let built = render(&[t(TableRef::new("person").no_shard())], &ctx).unwrap();
    assert_eq!(built.sql, "`person`");

    // Without a logical database nothing is sharded, whatever the selector.
    let built = render(&[t(TableRef::new("person").in_shard("1"))], &BuilderContext::new()).unwrap();
    assert_eq!(built.sql, "`person`");
}

#[test]
fn explicit_shard_id_ignores_parameters() {
    let tokens = |v: i32| {
        vec![
            t(TableRef::new("person").in_shard("2")),
            t(Keyword::Where),
            t(expressions::equal("city_id").bind(v)),
        ]
    };
    let ctx = sharded_ctx();
    let a = render(&tokens(1), &ctx).unwrap();
    let b = render(&tokens(3), &ctx).unwrap();
    assert_eq!(a.sql, "`person_2` WHERE `city_id` = ?");
    assert_eq!(a.sql, b.sql);
}

#[test]
fn explicit_shard_value_is_located() {
    let ctx = sharded_ctx();
    let built = render(&[t(TableRef::new("person").shard_value(11))], &ctx).unwrap();
    assert_eq!(built.sql, "`person_3`");
}

#[test]
fn hint_derived_shard_uses_later_parameter() {
    let ctx = sharded_ctx();
    let tokens = vec![
        t(Keyword::From),
        t(TableRef::new("person")),
        t(Keyword::Where),
        t(expressions::equal("city_id").bind(5)),
    ];
    let built = render(&tokens, &ctx).unwrap();
    assert_eq!(built.sql, "FROM `person_1` WHERE `city_id` = ?");
}

#[test]
fn hint_derived_shard_uses_hints() {
    let mut ctx = sharded_ctx();
    ctx.set_hints(Hints::new().in_table_shard("3"));
    let built = render(&[t(TableRef::new("person"))], &ctx).unwrap();
    assert_eq!(built.sql, "`person_3`");
}

#[test]
fn unresolvable_shard_fails() {
    let ctx = sharded_ctx();
    let err = render(&[t(TableRef::new("person"))], &ctx).unwrap_err();
    assert!(err.is_shard_resolution());
}
