//! Integration tests for the qb module.

use crate::error::SqError;
use crate::placeholder::{PlaceholderFormat, placeholders};
use crate::qb::{
    BuiltQuery, IntoValue, Param, Predicate, StatementBuilder, WithBuilder, alias, and, case_value,
    delete, eq, expr, gt, insert, or, select, update, where_clause, with,
};

fn args(q: &BuiltQuery) -> Vec<String> {
    q.params.iter().map(Param::to_test_string).collect()
}

fn question(b: &impl StatementBuilder) -> BuiltQuery {
    b.to_sql_with(PlaceholderFormat::Question).unwrap()
}

// ==================== SELECT ====================

#[test]
fn test_select_all_clauses() {
    let sub_q = select(["aa", "bb"]).from("dd");
    let b = select(["a", "b"])
        .prefix(expr("WITH prefix AS ?").bind(0))
        .distinct()
        .columns(["c"])
        .column(
            expr(format!("IF(d IN ({}), 1, 0) as stat_column", placeholders(3))).bind_all([1, 2, 3]),
        )
        .column(expr("a > ?").bind(100))
        .column(alias(eq("b", vec![101, 102, 103]), "b_alias"))
        .column(alias(sub_q, "subq"))
        .from("e")
        .join_clause("CROSS JOIN j1")
        .join("j2")
        .left_join("j3")
        .right_join("j4")
        .and_where(expr("f = ?").bind(4))
        .and_where(eq("g", 5))
        .and_where(eq("h", 6))
        .and_where(eq("i", vec![7, 8, 9]))
        .and_where(or([
            Predicate::from(expr("j = ?").bind(10)),
            and([Predicate::from(eq("k", 11)), "true".into()]),
        ]))
        .group_by(["l"])
        .having("m = n")
        .order_by(["o ASC", "p DESC"])
        .limit(12)
        .offset(13)
        .suffix(expr("FETCH FIRST ? ROWS ONLY").bind(14));

    let q = b.to_sql().unwrap();
    let expected = concat!(
        "WITH prefix AS $1 ",
        "SELECT DISTINCT a, b, c, IF(d IN ($2,$3,$4), 1, 0) as stat_column, a > $5, ",
        "(b IN ($6,$7,$8)) AS b_alias, ",
        "(SELECT aa, bb FROM dd) AS subq ",
        "FROM e ",
        "CROSS JOIN j1 JOIN j2 LEFT JOIN j3 RIGHT JOIN j4 ",
        "WHERE f = $9 AND g = $10 AND h = $11 AND i IN ($12,$13,$14) AND (j = $15 OR (k = $16 AND true)) ",
        "GROUP BY l HAVING m = n ORDER BY o ASC, p DESC LIMIT 12 OFFSET 13 ",
        "FETCH FIRST $17 ROWS ONLY"
    );
    assert_eq!(q.sql, expected);
    assert_eq!(
        args(&q),
        [
            "0", "1", "2", "3", "100", "101", "102", "103", "4", "5", "6", "7", "8", "9", "10",
            "11", "14"
        ]
    );
}

#[test]
fn test_select_is_deterministic() {
    let b = select(["id"])
        .from("t")
        .and_where(eq("b", 1).with("a", vec![2, 3]).with("c", None::<i32>))
        .and_where(gt("d", expr("now() - ?::interval").bind("1 day")));

    let first = b.to_sql().unwrap();
    let second = b.to_sql().unwrap();
    assert_eq!(first.sql, second.sql);
    assert_eq!(args(&first), args(&second));
    assert_eq!(
        first.sql,
        "SELECT id FROM t WHERE a IN ($1,$2) AND b = $3 AND c IS NULL AND d > (now() - $4::interval)"
    );
}

#[test]
fn test_escaped_marker_is_not_a_parameter() {
    let q = select(["uuid", "\"data\" #> '{tags}' AS tags"])
        .from("nodes")
        .and_where(expr("\"data\" -> 'tags' ??| array[?]").bind("x"))
        .and_where(eq("enabled", true))
        .to_sql()
        .unwrap();
    assert_eq!(
        q.sql,
        "SELECT uuid, \"data\" #> '{tags}' AS tags FROM nodes WHERE \"data\" -> 'tags' ?| array[$1] AND enabled = $2"
    );
    assert_eq!(args(&q), ["x", "true"]);
}

#[test]
fn test_marker_count_must_match_parameters() {
    let err = select(["a"])
        .from("t")
        .and_where(expr("x = ? AND y = ?").bind(1))
        .to_sql()
        .unwrap_err();
    assert!(matches!(err, SqError::Placeholder(_)));
}

#[test]
fn test_case_as_aliased_column() {
    let rank = case_value("status")
        .when("'a'", expr("?").bind(1))
        .else_("0");
    let q = select(["id"])
        .column(alias(rank, "rank"))
        .from("t")
        .and_where(eq("owner", 9))
        .to_sql()
        .unwrap();
    assert_eq!(
        q.sql,
        "SELECT id, (CASE status WHEN 'a' THEN $1 ELSE 0 END) AS rank FROM t WHERE owner = $2"
    );
    assert_eq!(args(&q), ["1", "9"]);
}

#[test]
fn test_other_placeholder_formats() {
    let b = select(["a"]).from("t").and_where(eq("x", 1)).and_where(eq("y", 2));
    assert_eq!(
        b.to_sql_with(PlaceholderFormat::Colon).unwrap().sql,
        "SELECT a FROM t WHERE x = :1 AND y = :2"
    );
    assert_eq!(
        b.to_sql_with(PlaceholderFormat::AtP).unwrap().sql,
        "SELECT a FROM t WHERE x = @p1 AND y = @p2"
    );
}

// ==================== INSERT ====================

#[test]
fn test_insert_all_clauses() {
    let b = insert("")
        .prefix(expr("WITH prefix AS ?").bind(0))
        .into_table("a")
        .options(["DELAYED", "IGNORE"])
        .columns(["b", "c"])
        .values([1, 2])
        .values([3_i32.into_value(), expr("? + 1").bind(4).into_value()])
        .suffix(expr("RETURNING ?").bind(5));

    let q = b.to_sql().unwrap();
    assert_eq!(
        q.sql,
        "WITH prefix AS $1 INSERT DELAYED IGNORE INTO a (b,c) VALUES ($2,$3),($4,$5 + 1) RETURNING $6"
    );
    assert_eq!(args(&q), ["0", "1", "2", "3", "4", "5"]);
}

#[test]
fn test_insert_set_map() {
    let q = insert("table").set_map([("field1", 1)]).to_sql().unwrap();
    assert_eq!(q.sql, "INSERT INTO table (field1) VALUES ($1)");
    assert_eq!(args(&q), ["1"]);
}

#[test]
fn test_insert_nested_statement_numbering() {
    let max_plus = select(Vec::<String>::new())
        .column(expr("max(x) + ?").bind(7))
        .from("s")
        .and_where(gt("y", 8));
    let q = insert("t")
        .columns(["a", "b", "c"])
        .values([
            1_i32.into_value(),
            expr("(?)").bind(max_plus).into_value(),
            9_i32.into_value(),
        ])
        .to_sql()
        .unwrap();
    assert_eq!(
        q.sql,
        "INSERT INTO t (a,b,c) VALUES ($1,(SELECT max(x) + $2 FROM s WHERE y > $3),$4)"
    );
    assert_eq!(args(&q), ["1", "7", "8", "9"]);
}

// ==================== UPDATE ====================

#[test]
fn test_update_all_clauses() {
    let b = update("")
        .prefix(expr("WITH prefix AS ?").bind(0))
        .table("a")
        .set("b", expr("? + 1").bind(1))
        .set_map([("c", 2)])
        .from("f1")
        .from("f2")
        .and_where(expr("d = ?").bind(3))
        .order_by(["e"])
        .limit(4)
        .offset(5)
        .suffix(expr("RETURNING ?").bind(6));

    let q = question(&b);
    assert_eq!(
        q.sql,
        "WITH prefix AS ? UPDATE a SET b = ? + 1, c = ? FROM f1, f2 WHERE d = ? ORDER BY e LIMIT 4 OFFSET 5 RETURNING ?"
    );
    assert_eq!(args(&q), ["0", "1", "2", "3", "6"]);
}

// ==================== DELETE ====================

#[test]
fn test_delete_all_clauses() {
    let b = delete([""])
        .prefix(expr("WITH prefix AS ?").bind(0))
        .from("a")
        .and_where(expr("b = ?").bind(1))
        .order_by(["c"])
        .limit(2)
        .offset(3)
        .suffix(expr("RETURNING ?").bind(4));

    let q = b.to_sql().unwrap();
    assert_eq!(
        q.sql,
        "WITH prefix AS $1 DELETE FROM a WHERE b = $2 ORDER BY c LIMIT 2 OFFSET 3 RETURNING $3"
    );
    assert_eq!(args(&q), ["0", "1", "4"]);
}

#[test]
fn test_delete_multiple_tables() {
    let q = delete(["a1", "a2"])
        .from("z1 AS a1")
        .join_clause("INNER JOIN a2 ON a1.id = a2.ref_id")
        .join("a3")
        .and_where(expr("b = ?").bind(1))
        .to_sql()
        .unwrap();
    assert_eq!(
        q.sql,
        "DELETE a1, a2 FROM z1 AS a1 INNER JOIN a2 ON a1.id = a2.ref_id JOIN a3 WHERE b = $1"
    );
    assert_eq!(args(&q), ["1"]);
}

#[test]
fn test_delete_alias_differs_from_table() {
    let q = delete(["a"])
        .from("A a")
        .join("B b ON a.c = b.c")
        .and_where(expr("b.d = ?").bind(1))
        .limit(2)
        .to_sql()
        .unwrap();
    assert_eq!(
        q.sql,
        "DELETE a FROM A a JOIN B b ON a.c = b.c WHERE b.d = $1 LIMIT 2"
    );
}

#[test]
fn test_delete_zero_limit_and_offset() {
    let q = delete([""]).from("b").limit(0).offset(0).to_sql().unwrap();
    assert_eq!(q.sql, "DELETE FROM b LIMIT 0 OFFSET 0");
}

// ==================== WITH ====================

#[test]
fn test_with_single() {
    let b = with("hello")
        .as_(select(["name"]).from("test").and_where(gt("age", 50)))
        .select(["name"])
        .from("hello")
        .and_where(expr("name ILIKE ?").bind("m%"));

    let q = question(&b);
    assert_eq!(
        q.sql,
        "WITH hello AS (SELECT name FROM test WHERE age > ?) SELECT name FROM hello WHERE name ILIKE ?"
    );
    assert_eq!(args(&q), ["50", "m%"]);

    let q = b.to_sql().unwrap();
    assert_eq!(
        q.sql,
        "WITH hello AS (SELECT name FROM test WHERE age > $1) SELECT name FROM hello WHERE name ILIKE $2"
    );
}

#[test]
fn test_with_multiple() {
    let q = with("one")
        .as_(select(["a1"]).from("a"))
        .with("two")
        .as_(select(["b1"]).from("b"))
        .select(["a1"])
        .from("one")
        .to_sql()
        .unwrap();
    assert_eq!(
        q.sql,
        "WITH one AS (SELECT a1 FROM a), two AS (SELECT b1 FROM b) SELECT a1 FROM one"
    );
    assert!(q.params.is_empty());
}

#[test]
fn test_with_update_body() {
    let b = with("one")
        .as_(select(["a1"]).from("a"))
        .with("two")
        .as_(update("b").set_map([("b1", 1)]))
        .select(["a1"])
        .from("one");

    let q = question(&b);
    assert_eq!(
        q.sql,
        "WITH one AS (SELECT a1 FROM a), two AS (UPDATE b SET b1 = ?) SELECT a1 FROM one"
    );
    assert_eq!(args(&q), ["1"]);
}

#[test]
fn test_with_recursive() {
    let q = with("search_graph")
        .fields(["id", "link", "data", "depth"])
        .recursive()
        .as_(select(["g.id", "g.link", "g.data", "1"]).from("graph g"))
        .union_all(
            select(["g.id", "g.link", "g.data", "sg.depth + 1"])
                .from("graph g, search_graph sg")
                .and_where("g.id = sg.link"),
        )
        .select(["*"])
        .from("search_graph")
        .to_sql()
        .unwrap();

    let expected = concat!(
        "WITH RECURSIVE ",
        "search_graph(id, link, data, depth) AS (",
        "SELECT g.id, g.link, g.data, 1 FROM graph g ",
        "UNION ALL ",
        "SELECT g.id, g.link, g.data, sg.depth + 1 FROM graph g, search_graph sg WHERE g.id = sg.link",
        ") SELECT * FROM search_graph"
    );
    assert_eq!(q.sql, expected);
    assert!(q.params.is_empty());
}

#[test]
fn test_with_union() {
    let q = with("ids")
        .as_(select(["id"]).from("a"))
        .union(select(["id"]).from("b"))
        .select(["count(*)"])
        .from("ids")
        .to_sql()
        .unwrap();
    assert_eq!(
        q.sql,
        "WITH ids AS (SELECT id FROM a UNION SELECT id FROM b) SELECT count(*) FROM ids"
    );
}

#[test]
fn test_with_errors() {
    let err = WithBuilder::new()
        .as_(select(["t"]).from("test"))
        .select(["t"])
        .from("test")
        .to_sql()
        .unwrap_err();
    assert!(err.to_string().contains("with statements must have WITH"));

    let err = WithBuilder::new()
        .select(["t"])
        .from("test")
        .to_sql()
        .unwrap_err();
    assert!(err.to_string().contains("with statements must have WITH"));

    let err = with("")
        .as_(select(["t"]).from("test"))
        .select(["t"])
        .from("hello")
        .to_sql()
        .unwrap_err();
    assert!(err.to_string().contains("with statements must have a non-empty name"));

    let err = with("hello")
        .select(["t"])
        .from("hello")
        .to_sql()
        .unwrap_err();
    assert!(err.to_string().contains("with statements must have AS statement"));
    assert!(err.is_composition());
}

// ==================== WHERE builder ====================

#[test]
fn test_where_parts_skip_empty() {
    let q = select(["*"])
        .from("t")
        .and_where(expr("x = ?").bind(1))
        .and_where("")
        .and_where(eq("y", 2))
        .to_sql()
        .unwrap();
    assert_eq!(q.sql, "SELECT * FROM t WHERE x = $1 AND y = $2");
    assert_eq!(args(&q), ["1", "2"]);
}

#[test]
fn test_where_empty_list_error() {
    let err = select(["*"])
        .from("t")
        .and_where(eq("test", Vec::<String>::new()))
        .to_sql()
        .unwrap_err();
    assert!(matches!(err, SqError::EmptyParameterSet(_)));
}

#[test]
fn test_where_builder_to_select() {
    let q = where_clause(eq("hello", "world"))
        .select(["name"])
        .from("test")
        .to_sql()
        .unwrap();
    assert_eq!(q.sql, "SELECT name FROM test WHERE hello = $1");
    assert_eq!(args(&q), ["world"]);
}

#[test]
fn test_where_builder_to_delete() {
    let q = where_clause(eq("hello", "world"))
        .delete("test")
        .to_sql()
        .unwrap();
    assert_eq!(q.sql, "DELETE FROM test WHERE hello = $1");
    assert_eq!(args(&q), ["world"]);
}

#[test]
fn test_where_builder_to_update() {
    let q = where_clause(eq("hello", "world"))
        .update("test")
        .set("hello", "universe")
        .to_sql()
        .unwrap();
    assert_eq!(q.sql, "UPDATE test SET hello = $1 WHERE hello = $2");
    assert_eq!(args(&q), ["universe", "world"]);
}

#[test]
fn test_where_builder_is_reusable() {
    let scope = where_clause(eq("tenant_id", 4)).and_where("deleted_at IS NULL");
    let s = scope.clone().select(["id"]).from("docs").to_sql().unwrap();
    let d = scope.delete("docs").to_sql().unwrap();
    assert_eq!(
        s.sql,
        "SELECT id FROM docs WHERE tenant_id = $1 AND deleted_at IS NULL"
    );
    assert_eq!(d.sql, "DELETE FROM docs WHERE tenant_id = $1 AND deleted_at IS NULL");
}
