//! Integration tests for query translation
//!
//! These tests verify that:
//! - Documented listing scenarios resolve to the expected query
//! - Every accepted input shape normalizes to the same result
//! - Malformed values degrade to defaults instead of failing

use list_query::prelude::*;
use std::collections::{BTreeMap, HashMap};

fn listing_config() -> ListQueryConfig {
    ListQueryConfig::builder("created_at", SortDirection::Desc)
        .filter("status", ColumnFilter::new(Column::new("status")))
        .sortable("created_at", Column::new("created_at"))
        .build()
        .unwrap()
}

fn marketplace_config() -> ListQueryConfig {
    ListQueryConfig::builder("created_at", SortDirection::Desc)
        .filter("status", ColumnFilter::new(Column::new("status")))
        .filter(
            "min_price",
            ColumnFilter::new(Column::new("price"))
                .op(FilterOp::Gte)
                .coerce(coerce::integer()),
        )
        .filter(
            "max_price",
            ColumnFilter::new(Column::new("price"))
                .op(FilterOp::Lte)
                .coerce(coerce::integer()),
        )
        .filter(
            "tags",
            ColumnFilter::new(Column::new("tag")).op(FilterOp::In),
        )
        .filter(
            "q",
            ColumnFilter::new(Column::new("title")).op(FilterOp::Contains),
        )
        .custom_filter("mine", |raw| {
            (raw == "true").then(|| Column::new("owner_id").eq(42))
        })
        .sortable("created_at", Column::new("created_at"))
        .sortable("price", Column::new("price"))
        .build()
        .unwrap()
}

// =============================================================================
// Scenarios
// =============================================================================

mod scenario_tests {
    use super::*;

    #[test]
    fn test_single_status_filter_uses_defaults() {
        let parsed = listing_config().parse(vec![("status", "LISTED")]);

        assert_eq!(parsed.filter(), Some(&Column::new("status").eq("LISTED")));
        assert_eq!(parsed.order_by(), &Column::new("created_at").desc());
        assert_eq!(parsed.limit(), 20);
        assert_eq!(parsed.offset(), 0);
    }

    #[test]
    fn test_limit_above_max_is_clamped() {
        let parsed = listing_config().parse(vec![("limit", "500")]);
        assert_eq!(parsed.limit(), 100);
    }

    #[test]
    fn test_limit_zero_is_clamped_up() {
        let parsed = listing_config().parse(vec![("limit", "0")]);
        assert_eq!(parsed.limit(), 1);
    }

    #[test]
    fn test_unknown_sort_falls_back_to_default() {
        let parsed = listing_config().parse(vec![("sort", "bogus"), ("order", "asc")]);
        assert_eq!(parsed.order_by(), &Column::new("created_at").asc());
    }

    #[test]
    fn test_no_parameters_means_no_filter() {
        let parsed = listing_config().parse(QueryPairs::new());
        assert!(parsed.filter().is_none());
    }
}

// =============================================================================
// Filter resolution
// =============================================================================

mod filter_tests {
    use super::*;

    #[test]
    fn test_membership_splits_on_commas() {
        let parsed = marketplace_config().parse(vec![("tags", "a,b,c")]);
        assert_eq!(
            parsed.filter(),
            Some(&Column::new("tag").is_in(vec!["a".into(), "b".into(), "c".into()]))
        );

        let parsed = marketplace_config().parse(vec![("tags", "a")]);
        assert_eq!(
            parsed.filter(),
            Some(&Column::new("tag").is_in(vec!["a".into()]))
        );
    }

    #[test]
    fn test_contains_keeps_wildcards() {
        let parsed = marketplace_config().parse(vec![("q", "50%_off")]);
        assert_eq!(
            parsed.filter(),
            Some(&Column::new("title").like("%50%_off%"))
        );
    }

    #[test]
    fn test_range_filters_are_and_ed_in_input_order() {
        let parsed = marketplace_config().parse(vec![("max_price", "90"), ("min_price", "10")]);
        assert_eq!(
            parsed.filter(),
            Some(&Predicate::And(vec![
                Column::new("price").lte(90),
                Column::new("price").gte(10),
            ]))
        );
    }

    #[test]
    fn test_repeated_filter_yields_one_condition_each() {
        let parsed = marketplace_config().parse(vec![("status", "LISTED"), ("status", "SOLD")]);
        assert_eq!(
            parsed.filter(),
            Some(&Predicate::And(vec![
                Column::new("status").eq("LISTED"),
                Column::new("status").eq("SOLD"),
            ]))
        );
    }

    #[test]
    fn test_empty_values_are_absent() {
        let parsed = marketplace_config().parse(vec![("status", ""), ("q", "")]);
        assert!(parsed.filter().is_none());
    }

    #[test]
    fn test_custom_filter_can_decline() {
        let config = marketplace_config();

        let parsed = config.parse(vec![("mine", "true")]);
        assert_eq!(parsed.filter(), Some(&Column::new("owner_id").eq(42)));

        let parsed = config.parse(vec![("mine", "false")]);
        assert!(parsed.filter().is_none());
    }

    #[test]
    fn test_unparseable_coercion_becomes_null() {
        let parsed = marketplace_config().parse(vec![("min_price", "cheap")]);
        assert_eq!(
            parsed.filter(),
            Some(&Column::new("price").gte(FieldValue::Null))
        );
    }

    #[tokio::test]
    async fn test_contains_with_failed_coercion_selects_no_rows() {
        let config = ListQueryConfig::builder("created_at", SortDirection::Desc)
            .filter(
                "sku",
                ColumnFilter::new(Column::new("sku"))
                    .op(FilterOp::Contains)
                    .coerce(coerce::integer()),
            )
            .sortable("created_at", Column::new("created_at"))
            .build()
            .unwrap();

        let store = InMemoryStore::new();
        for (id, sku) in [(1, "1042"), (2, "2042"), (3, "3100")] {
            store
                .insert_json(
                    "items",
                    serde_json::json!({ "id": id, "sku": sku, "created_at": "2024-01-01" }),
                )
                .unwrap();
        }

        let result = run_list_query(&store, "items", config.parse(vec![("sku", "abc")]), None, true)
            .await
            .unwrap();
        assert!(result.rows.is_empty());
        assert_eq!(result.total, 0);

        let result = run_list_query(&store, "items", config.parse(vec![("sku", "42")]), None, true)
            .await
            .unwrap();
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.total, 2);
    }

    #[test]
    fn test_reserved_names_never_filter() {
        let config = ListQueryConfig::builder("created_at", SortDirection::Desc)
            .filter("limit", ColumnFilter::new(Column::new("limit")))
            .sortable("created_at", Column::new("created_at"))
            .build()
            .unwrap();

        let parsed = config.parse(vec![("limit", "5")]);
        assert!(parsed.filter().is_none());
        assert_eq!(parsed.limit(), 5);
    }

    #[test]
    fn test_base_condition_is_kept() {
        let scope = Column::new("owner_id").eq(7);
        let config = marketplace_config();

        let parsed = config.parse(QueryPairs::new());
        assert_eq!(parsed.filter_with(Some(&scope)), Some(scope.clone()));

        let parsed = config.parse(vec![("status", "LISTED")]);
        assert_eq!(
            parsed.filter_with(Some(&scope)),
            Some(Predicate::And(vec![
                scope.clone(),
                Column::new("status").eq("LISTED"),
            ]))
        );
        assert_eq!(
            parsed.filter_with(None),
            Some(Column::new("status").eq("LISTED"))
        );
    }
}

// =============================================================================
// Sorting and pagination
// =============================================================================

mod order_and_page_tests {
    use super::*;

    #[test]
    fn test_sort_and_order_last_occurrence_wins() {
        let parsed = marketplace_config().parse(vec![
            ("sort", "created_at"),
            ("order", "asc"),
            ("sort", "price"),
            ("order", "desc"),
        ]);
        assert_eq!(parsed.order_by(), &Column::new("price").desc());
    }

    #[test]
    fn test_order_must_match_exactly() {
        let parsed = marketplace_config().parse(vec![("order", "ASC")]);
        assert_eq!(parsed.order_by().direction, SortDirection::Desc);

        let parsed = marketplace_config().parse(vec![("order", "")]);
        assert_eq!(parsed.order_by().direction, SortDirection::Desc);
    }

    #[test]
    fn test_empty_sort_uses_default_key() {
        let parsed = marketplace_config().parse(vec![("sort", ""), ("order", "asc")]);
        assert_eq!(parsed.order_by(), &Column::new("created_at").asc());
    }

    #[test]
    fn test_fractional_and_suffixed_numbers_are_truncated() {
        let parsed = marketplace_config().parse(vec![("limit", "12.9"), ("offset", "30px")]);
        assert_eq!(parsed.limit(), 12);
        assert_eq!(parsed.offset(), 30);
    }

    #[test]
    fn test_garbage_pagination_uses_defaults() {
        let parsed = marketplace_config().parse(vec![("limit", "ten"), ("offset", "")]);
        assert_eq!(parsed.limit(), 20);
        assert_eq!(parsed.offset(), 0);
    }

    #[test]
    fn test_negative_offset_clamps_to_zero() {
        let parsed = marketplace_config().parse(vec![("offset", "-40")]);
        assert_eq!(parsed.offset(), 0);

        let parsed = marketplace_config().parse(vec![("limit", "-3")]);
        assert_eq!(parsed.limit(), 1);
    }

    #[test]
    fn test_huge_values_saturate() {
        let parsed = marketplace_config().parse(vec![
            ("limit", "99999999999999999999999"),
            ("offset", "99999999999999999999999"),
        ]);
        assert_eq!(parsed.limit(), 100);
        assert_eq!(parsed.offset(), i64::MAX as u64);
    }

    #[test]
    fn test_custom_limits() {
        let config = ListQueryConfig::builder("created_at", SortDirection::Desc)
            .sortable("created_at", Column::new("created_at"))
            .default_limit(5)
            .max_limit(10)
            .build()
            .unwrap();

        assert_eq!(config.parse(QueryPairs::new()).limit(), 5);
        assert_eq!(config.parse(vec![("limit", "11")]).limit(), 10);
    }
}

// =============================================================================
// Input shapes
// =============================================================================

mod input_shape_tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, Uri};
    use url::Url;

    const QUERY: &str = "status=LISTED&sort=price&order=asc&limit=5&offset=10";

    fn expected() -> ParsedListQuery {
        marketplace_config().parse(vec![
            ("status", "LISTED"),
            ("sort", "price"),
            ("order", "asc"),
            ("limit", "5"),
            ("offset", "10"),
        ])
    }

    #[test]
    fn test_query_string() {
        let parsed = marketplace_config().parse(QueryPairs::from_query_str(&format!("?{QUERY}")));
        assert_eq!(parsed, expected());
    }

    #[test]
    fn test_url() {
        let url = Url::parse(&format!("https://shop.example/listings?{QUERY}")).unwrap();
        assert_eq!(marketplace_config().parse(&url), expected());
        assert_eq!(marketplace_config().parse(url), expected());
    }

    #[test]
    fn test_request() {
        let request = Request::builder()
            .uri(format!("/listings?{QUERY}"))
            .body(Body::empty())
            .unwrap();
        assert_eq!(marketplace_config().parse(&request), expected());

        let uri: Uri = format!("/listings?{QUERY}").parse().unwrap();
        assert_eq!(marketplace_config().parse(uri), expected());
    }

    #[test]
    fn test_request_without_query() {
        let uri: Uri = "/listings".parse().unwrap();
        let parsed = marketplace_config().parse(uri);
        assert_eq!(parsed, marketplace_config().parse(QueryPairs::new()));
    }

    #[test]
    fn test_maps() {
        let map: BTreeMap<String, String> = [
            ("status", "LISTED"),
            ("sort", "price"),
            ("order", "asc"),
            ("limit", "5"),
            ("offset", "10"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let hash: HashMap<String, String> = map.clone().into_iter().collect();

        assert_eq!(marketplace_config().parse(map), expected());
        assert_eq!(marketplace_config().parse(hash), expected());
    }

    #[test]
    fn test_percent_encoded_values() {
        let parsed = marketplace_config()
            .parse(QueryPairs::from_query_str("q=desk+lamp&tags=a%2Cb"));
        assert_eq!(
            parsed.filter(),
            Some(&Predicate::And(vec![
                Column::new("title").like("%desk lamp%"),
                Column::new("tag").is_in(vec!["a".into(), "b".into()]),
            ]))
        );
    }
}
