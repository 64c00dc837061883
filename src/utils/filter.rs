//! Dynamic filter predicates for the listing endpoints.
//!
//! Each entity declares an ordered table of [`FilterRule`]s mapping a query
//! parameter to a column and a matching strategy. [`push_filters`] walks the
//! table against the raw parameter map and appends one `AND` conjunct per
//! recognized, non-blank key to an [`sqlx::QueryBuilder`]. Unrecognized keys
//! are ignored and an empty map leaves the base `WHERE TRUE` untouched, so
//! the unfiltered listing falls out of the same code path.
//!
//! Values are always attached with `push_bind`; only whitelisted column
//! names from the rule tables ever reach the SQL text.

use std::collections::HashMap;

use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::utils::pagination::PageRequest;

#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// `column = value`, case-sensitive.
    Exact,
    /// `lower(column) = lower(value)`.
    ExactFold,
    /// `column ILIKE %value%`.
    Contains,
    /// `column ILIKE value%`.
    Prefix,
    /// `column = value` parsed as an integer; skipped when unparseable.
    IntExact,
}

#[derive(Debug, Clone, Copy)]
pub struct FilterRule {
    pub key: &'static str,
    pub column: &'static str,
    pub matcher: Matcher,
}

pub const fn rule(key: &'static str, column: &'static str, matcher: Matcher) -> FilterRule {
    FilterRule {
        key,
        column,
        matcher,
    }
}

pub(crate) fn contains_pattern(value: &str) -> String {
    format!("%{value}%")
}

pub(crate) fn prefix_pattern(value: &str) -> String {
    format!("{value}%")
}

/// Append one conjunct per recognized, non-blank parameter.
pub fn push_filters(
    builder: &mut QueryBuilder<'_, Postgres>,
    rules: &[FilterRule],
    params: &HashMap<String, String>,
) {
    for rule in rules {
        let Some(value) = params.get(rule.key) else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            // A present-but-blank key means "not provided", never "match blank".
            continue;
        }

        match rule.matcher {
            Matcher::Exact => {
                builder.push(format_args!(" AND {} = ", rule.column));
                builder.push_bind(value.to_string());
            }
            Matcher::ExactFold => {
                builder.push(format_args!(" AND lower({}) = lower(", rule.column));
                builder.push_bind(value.to_string());
                builder.push(")");
            }
            Matcher::Contains => {
                builder.push(format_args!(" AND {} ILIKE ", rule.column));
                builder.push_bind(contains_pattern(value));
            }
            Matcher::Prefix => {
                builder.push(format_args!(" AND {} ILIKE ", rule.column));
                builder.push_bind(prefix_pattern(value));
            }
            Matcher::IntExact => {
                let Ok(parsed) = value.parse::<i32>() else {
                    // Unparseable numeric filters are dropped, not errors.
                    continue;
                };
                builder.push(format_args!(" AND {} = ", rule.column));
                builder.push_bind(parsed);
            }
        }
    }
}

/// Echo the raw filter map back to the client, minus the paging controls.
pub fn echo_params(params: &HashMap<String, String>) -> serde_json::Value {
    let filters: serde_json::Map<String, serde_json::Value> = params
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), "page" | "size" | "sort"))
        .map(|(key, value)| (key.clone(), serde_json::Value::String(value.clone())))
        .collect();
    serde_json::Value::Object(filters)
}

pub struct Page<T> {
    pub rows: Vec<T>,
    pub total: i64,
}

/// Run the COUNT and page SELECT sharing one composed predicate, applying
/// the validated sort and paging from `request`.
pub async fn fetch_page<T>(
    db: &PgPool,
    mut count: QueryBuilder<'_, Postgres>,
    mut select: QueryBuilder<'_, Postgres>,
    request: &PageRequest,
) -> Result<Page<T>, sqlx::Error>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let total: i64 = count.build_query_scalar().fetch_one(db).await?;

    select.push(format_args!(" ORDER BY {}", request.order_by));
    select.push(" LIMIT ");
    select.push_bind(request.size);
    select.push(" OFFSET ");
    select.push_bind(request.offset());

    let rows = select.build_query_as::<T>().fetch_all(db).await?;

    Ok(Page { rows, total })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: &[FilterRule] = &[
        rule("title", "c.title", Matcher::Exact),
        rule("title_like", "c.title", Matcher::Contains),
        rule("creditHours", "c.credit_hours", Matcher::IntExact),
        rule("instructorName", "t.username", Matcher::Contains),
        rule("name_like", "u.username", Matcher::Prefix),
        rule("email", "u.email", Matcher::ExactFold),
    ];

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn built_sql(input: &HashMap<String, String>) -> String {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT 1 FROM t WHERE TRUE");
        push_filters(&mut builder, RULES, input);
        builder.into_sql()
    }

    #[test]
    fn empty_map_yields_identity_predicate() {
        assert_eq!(built_sql(&params(&[])), "SELECT 1 FROM t WHERE TRUE");
    }

    #[test]
    fn recognized_keys_compose_conjunctively() {
        let sql = built_sql(&params(&[("title", "Rust"), ("creditHours", "3")]));
        assert!(sql.contains("AND c.title = $1"));
        assert!(sql.contains("AND c.credit_hours = $2"));
    }

    #[test]
    fn unrecognized_keys_are_ignored() {
        let sql = built_sql(&params(&[("favouriteColour", "green")]));
        assert_eq!(sql, "SELECT 1 FROM t WHERE TRUE");
    }

    #[test]
    fn blank_values_are_treated_as_absent() {
        let sql = built_sql(&params(&[("title", "   "), ("email", "")]));
        assert_eq!(sql, "SELECT 1 FROM t WHERE TRUE");
    }

    #[test]
    fn unparseable_int_filter_is_skipped() {
        let sql = built_sql(&params(&[("creditHours", "three")]));
        assert_eq!(sql, "SELECT 1 FROM t WHERE TRUE");
    }

    #[test]
    fn substring_match_is_case_insensitive() {
        let sql = built_sql(&params(&[("instructorName", "smith")]));
        assert!(sql.contains("t.username ILIKE $1"));
        assert_eq!(contains_pattern("smith"), "%smith%");
    }

    #[test]
    fn prefix_match_anchors_at_start() {
        let sql = built_sql(&params(&[("name_like", "Al")]));
        assert!(sql.contains("u.username ILIKE $1"));
        assert_eq!(prefix_pattern("Al"), "Al%");
    }

    #[test]
    fn case_insensitive_exact_folds_both_sides() {
        let sql = built_sql(&params(&[("email", "Bob@Example.com")]));
        assert!(sql.contains("lower(u.email) = lower($1)"));
    }

    #[test]
    fn echoed_filters_keep_raw_values_but_drop_paging_controls() {
        let echoed = echo_params(&params(&[
            ("name", "Alice"),
            ("bogus", "x"),
            ("page", "0"),
            ("size", "10"),
            ("sort", "id,asc"),
        ]));
        assert_eq!(
            echoed,
            serde_json::json!({"name": "Alice", "bogus": "x"})
        );
    }

    #[test]
    fn filter_values_are_trimmed_before_matching() {
        let sql = built_sql(&params(&[("creditHours", " 4 ")]));
        assert!(sql.contains("c.credit_hours = $1"));
    }
}
