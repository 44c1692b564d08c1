//! End-to-end rendering of staged queries.

mod common;

use common::{Account, Config, ShoppingCart};
use sqlweave::prelude::*;

// ============================================================================
// Basic queries
// ============================================================================

#[test]
fn test_select_where_param_standard() {
    let account = Account::new();
    let out = select(exprs![&account.id, &account.uuid])
        .from(&account)
        .where_(account.id.eq_param(1))
        .to_sql();

    assert_eq!(
        out.sql,
        "SELECT account.id, account.uuid FROM account WHERE account.id = ?"
    );
    assert_eq!(out.params, vec![Value::Int(1)]);
}

#[test]
fn test_select_where_param_postgres() {
    let account = Account::new();
    let out = select(exprs![&account.id, &account.uuid])
        .from(&account)
        .where_(account.id.eq_param(1))
        .to_sql_with(&PostgresDialect);

    assert_eq!(
        out.sql,
        "SELECT account.id, account.uuid FROM account WHERE account.id = $1"
    );
}

#[test]
fn test_select_star_variants() {
    let account = Account::new();
    assert_eq!(
        select_distinct_all().from(&account).to_sql().sql,
        "SELECT DISTINCT * FROM account"
    );
    assert_eq!(
        select([account.star()]).from(&account).to_sql().sql,
        "SELECT account.* FROM account"
    );
}

#[test]
fn test_aliased_column_in_where_and_order_by() {
    let account = Account::new();
    let acc_id = account.id.alias("accId");
    let out = select([&acc_id])
        .from(&account)
        .where_(acc_id.eq(&acc_id))
        .order_by([acc_id.asc()])
        .to_sql();

    assert_eq!(
        out.sql,
        "SELECT account.id AS accId FROM account WHERE account.id = account.id ORDER BY accId ASC"
    );
}

// ============================================================================
// Joins, grouping and pagination
// ============================================================================

#[test]
fn test_join_group_order() {
    let a = Account::new().alias("a");
    let sc = ShoppingCart::new().alias("sc");
    let cart_count = count_of(&sc.id).alias("cart_count");

    let out = select(exprs![&a.id, &cart_count])
        .from(&a)
        .join(&sc)
        .on(a.id.eq(&sc.owner_id))
        .where_(a.id.eq_param(1))
        .group_by([&a.id])
        .order_by([cart_count.desc()])
        .to_sql();

    assert_eq!(
        out.sql,
        "SELECT a.id, COUNT(sc.id) AS cart_count FROM account AS a \
         JOIN shopping_cart AS sc ON a.id = sc.owner_id WHERE a.id = ? \
         GROUP BY a.id ORDER BY cart_count DESC"
    );
    assert_eq!(out.params, vec![Value::Int(1)]);
}

#[test]
fn test_having() {
    let account = Account::new();
    let out = select([&account.id])
        .from(&account)
        .where_(account.id.gt_param(0))
        .group_by([&account.id])
        .having(count().gt_param(1))
        .to_sql();

    assert_eq!(
        out.sql,
        "SELECT account.id FROM account WHERE account.id > ? GROUP BY account.id HAVING COUNT(1) > ?"
    );
    assert_eq!(out.params, vec![Value::Int(0), Value::Int(1)]);
}

#[test]
fn test_limit_offset_are_literals() {
    let a = Account::new().alias("a");
    let out = select([&a.id])
        .from(&a)
        .order_by([a.id.asc()])
        .limit(10)
        .offset(0)
        .to_sql();

    assert_eq!(
        out.sql,
        "SELECT a.id FROM account AS a ORDER BY a.id ASC LIMIT 10 OFFSET 0"
    );
    assert!(!out.is_parameterized());
}

#[test]
fn test_grouped_condition_in_where() {
    let account = Account::new();
    let cond = account
        .kind
        .eq_param("admin")
        .or(account.kind.eq_param("owner"))
        .grouped()
        .and(account.created_ts.ge_param(1_700_000_000_i64));

    let out = select_all().from(&account).where_(cond).to_sql_with(&PostgresDialect);
    assert_eq!(
        out.sql,
        "SELECT * FROM account WHERE (account.type = $1 OR account.type = $2) AND account.created_ts >= $3"
    );
    assert_eq!(out.param_count(), 3);
}

// ============================================================================
// Subqueries
// ============================================================================

#[test]
fn test_named_subquery_as_source() {
    let account = Account::new();
    let acc = select([&account.id]).from(&account).as_named_subquery("acc");
    assert_eq!(
        select_all().from(&acc).to_sql().sql,
        "SELECT * FROM (SELECT account.id FROM account) AS acc"
    );
}

#[test]
fn test_derived_table_columns_use_alias() {
    let account = Account::new();
    let acc = select([&account.id]).from(&account).as_named_subquery("acc");
    let id = acc.column::<i64>("id");
    assert_eq!(
        select([&id]).from(&acc).where_(id.gt_param(3)).to_sql().sql,
        "SELECT acc.id FROM (SELECT account.id FROM account) AS acc WHERE acc.id > ?"
    );
}

#[test]
fn test_subquery_as_function_argument() {
    let account = Account::new();
    let cart = ShoppingCart::new();
    let cart_uuid = select([&cart.uuid])
        .from(&cart)
        .where_(cart.owner_id.eq(&account.id))
        .as_subquery();

    let out = select(exprs![
        &account.id,
        upper(cart_uuid.clone()).alias("u"),
        count_of(cart_uuid)
    ])
    .from(&account)
    .to_sql();
    assert_eq!(
        out.sql,
        "SELECT account.id, \
         UPPER((SELECT shopping_cart.uuid FROM shopping_cart WHERE shopping_cart.owner_id = account.id)) AS u, \
         COUNT((SELECT shopping_cart.uuid FROM shopping_cart WHERE shopping_cart.owner_id = account.id)) \
         FROM account"
    );
}

#[test]
fn test_scalar_subquery_shares_params() {
    let a = Account::new().alias("a");
    let c = ShoppingCart::new().alias("c");
    let cart_uuid = select([&c.uuid])
        .from(&c)
        .where_(c.owner_id.eq_param(1))
        .as_named_subquery("cart_uuid");

    let out = select(exprs![&cart_uuid, &a.id])
        .from(&a)
        .where_(a.id.eq_param(1).or(a.id.eq_param(2)))
        .to_sql_with(&PostgresDialect);

    assert_eq!(
        out.sql,
        "SELECT (SELECT c.uuid FROM shopping_cart AS c WHERE c.owner_id = $1) AS cart_uuid, a.id \
         FROM account AS a WHERE a.id = $1 OR a.id = $2"
    );
    assert_eq!(out.params, vec![Value::Int(1), Value::Int(2)]);
}

#[test]
fn test_subquery_joins_dedup_params() {
    let config = Config::new();
    let by_uuid = |uuid: &str, alias: &str| {
        select([&config.uuid])
            .from(&config)
            .where_(config.uuid.eq_param(uuid))
            .as_named_subquery(alias)
    };
    let t1 = by_uuid("1", "t1");
    let t2 = by_uuid("2", "t2");
    let t3 = by_uuid("2", "t3");
    let uuid = |t: &Table| t.column::<String>("uuid");

    let out = select_all()
        .from(&t1)
        .join(&t2)
        .on(uuid(&t1).eq(uuid(&t2)))
        .join(&t3)
        .on(uuid(&t2).eq(uuid(&t3)))
        .to_sql_with(&PostgresDialect);

    assert_eq!(
        out.sql,
        "SELECT * FROM (SELECT config.uuid FROM config WHERE config.uuid = $1) AS t1 \
         JOIN (SELECT config.uuid FROM config WHERE config.uuid = $2) AS t2 ON t1.uuid = t2.uuid \
         JOIN (SELECT config.uuid FROM config WHERE config.uuid = $2) AS t3 ON t2.uuid = t3.uuid"
    );
    assert_eq!(out.param_count(), 2);
}

#[test]
fn test_repeated_values_bind_once() {
    let account = Account::new();
    let out = select_all()
        .from(&account)
        .where_(
            account
                .id
                .eq_param(7)
                .and(account.id.eq_param(7))
                .and(account.uuid.eq_param("u-1")),
        )
        .to_sql_with(&PostgresDialect);

    assert_eq!(
        out.sql,
        "SELECT * FROM account WHERE account.id = $1 AND account.id = $1 AND account.uuid = $2"
    );
    assert_eq!(out.params, vec![Value::Int(7), Value::from("u-1")]);
}

#[test]
fn test_in_and_exists_subqueries() {
    let account = Account::new();
    let cart = ShoppingCart::new();

    let owners = select([&cart.owner_id]).from(&cart).as_subquery();
    assert_eq!(
        select([&account.id])
            .from(&account)
            .where_(account.id.in_(owners))
            .to_sql()
            .sql,
        "SELECT account.id FROM account WHERE account.id IN (SELECT shopping_cart.owner_id FROM shopping_cart)"
    );

    let has_cart = select([Expr::fixed(1)])
        .from(&cart)
        .where_(cart.owner_id.eq(&account.id))
        .as_subquery();
    assert_eq!(
        select_all()
            .from(&account)
            .where_(Condition::exists(has_cart))
            .to_sql()
            .sql,
        "SELECT * FROM account WHERE EXISTS(SELECT 1 FROM shopping_cart WHERE shopping_cart.owner_id = account.id)"
    );
}

#[test]
fn test_any_array_postgres() {
    let account = Account::new();
    let out = select([&account.id])
        .from(&account)
        .where_(account.id.eq_any(Expr::array([1, 2, 3])))
        .to_sql_with(&PostgresDialect);

    assert_eq!(out.sql, "SELECT account.id FROM account WHERE account.id = ANY($1)");
    assert_eq!(out.params, vec![Value::from(vec![1, 2, 3])]);
}

// ============================================================================
// Output
// ============================================================================

#[test]
fn test_render_is_idempotent() {
    let a = Account::new().alias("a");
    let query = select(exprs![&a.id, &a.uuid])
        .from(&a)
        .where_(a.uuid.eq_param("x").and(a.id.lt_param(10)));

    let first = query.to_sql_with(&PostgresDialect);
    let second = query.to_sql_with(&PostgresDialect);
    assert_eq!(first, second);
}

#[test]
fn test_rendered_query_snapshot() {
    let account = Account::new();
    let cart = ShoppingCart::new().alias("sc");
    let out = select(exprs![&account.uuid, sum(&cart.id).alias("ids")])
        .from(&account)
        .left_join(&cart)
        .on(account.id.eq(&cart.owner_id))
        .where_(account.kind.like_param("adm%"))
        .group_by([&account.uuid])
        .to_sql_with(&PostgresDialect);

    insta::assert_snapshot!(out.sql, @"SELECT account.uuid, SUM(sc.id) AS ids FROM account LEFT JOIN shopping_cart AS sc ON account.id = sc.owner_id WHERE account.type LIKE $1 GROUP BY account.uuid");
    insta::assert_snapshot!(
        serde_json::to_string(&out.params).unwrap(),
        @r#"["adm%"]"#
    );
}
