//! Integration tests for running list queries against a store
//!
//! A scripted store checks exactly what reaches the backend and how totals
//! are derived; the in-memory store covers end-to-end behavior.

use anyhow::anyhow;
use list_query::prelude::*;
use serde_json::json;
use std::sync::Mutex;

// =============================================================================
// Scripted store
// =============================================================================

/// Store returning canned results and recording every call
#[derive(Default)]
struct ScriptedStore {
    rows: Vec<u32>,
    count: Option<u64>,
    fail_select: bool,
    fail_count: bool,
    selects: Mutex<Vec<SelectQuery>>,
    counts: Mutex<Vec<Option<Predicate>>>,
}

impl ScriptedStore {
    fn returning(rows: usize, count: Option<u64>) -> Self {
        Self {
            rows: (0..rows as u32).collect(),
            count,
            ..Default::default()
        }
    }

    fn selects(&self) -> Vec<SelectQuery> {
        self.selects.lock().unwrap().clone()
    }

    fn counts(&self) -> Vec<Option<Predicate>> {
        self.counts.lock().unwrap().clone()
    }
}

#[async_trait]
impl DataStore for ScriptedStore {
    type Row = u32;

    async fn select(&self, _table: &str, query: &SelectQuery) -> Result<Vec<u32>> {
        self.selects.lock().unwrap().push(query.clone());
        if self.fail_select {
            return Err(anyhow!("connection reset"));
        }
        Ok(self.rows.clone())
    }

    async fn count(&self, _table: &str, filter: Option<&Predicate>) -> Result<Option<u64>> {
        self.counts.lock().unwrap().push(filter.cloned());
        if self.fail_count {
            return Err(anyhow!("count timed out"));
        }
        Ok(self.count)
    }
}

fn config() -> ListQueryConfig {
    ListQueryConfig::builder("created_at", SortDirection::Desc)
        .filter("status", ColumnFilter::new(Column::new("status")))
        .sortable("created_at", Column::new("created_at"))
        .sortable("price", Column::new("price"))
        .build()
        .unwrap()
}

mod totals_tests {
    use super::*;

    #[tokio::test]
    async fn test_heuristic_total_is_a_lower_bound() {
        let store = ScriptedStore::returning(2, Some(999));
        let parsed = config().parse(vec![("limit", "20"), ("offset", "10")]);

        let result = run_list_query(&store, "items", parsed, None, false)
            .await
            .unwrap();

        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.total, 12);
        assert!(!result.has_more);
        assert!(store.counts().is_empty());
    }

    #[tokio::test]
    async fn test_heuristic_full_page_suggests_more() {
        let store = ScriptedStore::returning(5, None);
        let parsed = config().parse(vec![("limit", "5")]);

        let result = run_list_query(&store, "items", parsed, None, false)
            .await
            .unwrap();

        assert_eq!(result.total, 5);
        assert!(result.has_more);
    }

    #[tokio::test]
    async fn test_exact_total_comes_from_count() {
        let store = ScriptedStore::returning(20, Some(45));
        let parsed = config().parse(vec![("offset", "20")]);

        let result = run_list_query(&store, "items", parsed, None, true)
            .await
            .unwrap();

        assert_eq!(result.total, 45);
        assert!(result.has_more);
        assert_eq!(store.selects().len(), 1);
        assert_eq!(store.counts().len(), 1);
    }

    #[tokio::test]
    async fn test_exact_last_page_has_no_more() {
        let store = ScriptedStore::returning(5, Some(45));
        let parsed = config().parse(vec![("offset", "40")]);

        let result = run_list_query(&store, "items", parsed, None, true)
            .await
            .unwrap();

        assert!(!result.has_more);
    }

    #[tokio::test]
    async fn test_empty_count_result_defaults_to_zero() {
        let store = ScriptedStore::returning(0, None);
        let parsed = config().parse(QueryPairs::new());

        let result = run_list_query(&store, "items", parsed, None, true)
            .await
            .unwrap();

        assert_eq!(result.total, 0);
        assert!(!result.has_more);
    }
}

mod condition_tests {
    use super::*;

    #[tokio::test]
    async fn test_base_condition_alone() {
        let store = ScriptedStore::returning(0, Some(0));
        let scope = Column::new("owner_id").eq(7);

        run_list_query(&store, "items", config().parse(QueryPairs::new()), Some(scope.clone()), true)
            .await
            .unwrap();

        assert_eq!(store.selects()[0].filter, Some(scope.clone()));
        assert_eq!(store.counts(), vec![Some(scope)]);
    }

    #[tokio::test]
    async fn test_base_condition_and_filter_are_combined() {
        let store = ScriptedStore::returning(0, Some(0));
        let scope = Column::new("owner_id").eq(7);
        let parsed = config().parse(vec![("status", "LISTED"), ("owner_id", "8")]);

        run_list_query(&store, "items", parsed, Some(scope.clone()), true)
            .await
            .unwrap();

        let expected = Predicate::And(vec![scope, Column::new("status").eq("LISTED")]);
        assert_eq!(store.selects()[0].filter, Some(expected.clone()));
        assert_eq!(store.counts(), vec![Some(expected)]);
    }

    #[tokio::test]
    async fn test_no_condition_at_all() {
        let store = ScriptedStore::returning(0, Some(0));

        run_list_query(&store, "items", config().parse(QueryPairs::new()), None, true)
            .await
            .unwrap();

        assert_eq!(store.selects()[0].filter, None);
        assert_eq!(store.counts(), vec![None]);
    }

    #[tokio::test]
    async fn test_order_and_page_reach_the_store() {
        let store = ScriptedStore::returning(0, Some(0));
        let parsed = config().parse(vec![
            ("sort", "price"),
            ("order", "asc"),
            ("limit", "7"),
            ("offset", "14"),
        ]);

        run_list_query(&store, "items", parsed, None, false)
            .await
            .unwrap();

        let query = &store.selects()[0];
        assert_eq!(query.order_by, Column::new("price").asc());
        assert_eq!(query.limit, 7);
        assert_eq!(query.offset, 14);
    }
}

mod error_tests {
    use super::*;

    #[tokio::test]
    async fn test_select_error_propagates_unchanged() {
        let store = ScriptedStore {
            fail_select: true,
            ..ScriptedStore::returning(3, Some(3))
        };

        let err = run_list_query(&store, "items", config().parse(QueryPairs::new()), None, false)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "connection reset");
    }

    #[tokio::test]
    async fn test_count_error_fails_the_whole_query() {
        let store = ScriptedStore {
            fail_count: true,
            ..ScriptedStore::returning(3, Some(3))
        };

        let err = run_list_envelope(&store, "items", config().parse(QueryPairs::new()), None, true)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "count timed out");
    }

    #[tokio::test]
    async fn test_storage_error_converts_to_list_query_error() {
        let store = ScriptedStore {
            fail_select: true,
            ..Default::default()
        };

        let err: ListQueryError =
            run_list_query(&store, "items", config().parse(QueryPairs::new()), None, false)
                .await
                .unwrap_err()
                .into();

        assert_eq!(err.error_code(), "STORAGE_ERROR");
        assert_eq!(err.to_string(), "connection reset");
    }
}

mod output_tests {
    use super::*;

    #[tokio::test]
    async fn test_execute_raw_input_in_rows_mode() {
        let store = ScriptedStore::returning(3, Some(10));
        let config = config();

        let output = execute(
            &store,
            "items",
            ListSource::raw(vec![("limit", "3")], &config),
            None,
            RunOptions::default(),
        )
        .await
        .unwrap();

        let rows = output.into_rows().unwrap();
        assert_eq!(rows.rows, vec![0, 1, 2]);
        assert_eq!(rows.total, 10);
        assert!(rows.has_more);
        assert_eq!(store.selects()[0].limit, 3);
    }

    #[tokio::test]
    async fn test_execute_envelope_mode() {
        let store = ScriptedStore::returning(3, Some(10));
        let config = config();
        let parsed = config.parse(vec![("limit", "3"), ("offset", "3")]);

        let output = execute(
            &store,
            "items",
            parsed,
            None,
            RunOptions::default().envelope(),
        )
        .await
        .unwrap();

        let envelope = output.into_envelope().unwrap();
        assert_eq!(envelope.data, vec![0, 1, 2]);
        assert_eq!(
            envelope.meta,
            ListMeta {
                total: 10,
                limit: 3,
                offset: 3,
                has_more: true,
                next_offset: Some(6),
            }
        );
    }

    #[tokio::test]
    async fn test_execute_without_count_skips_count_query() {
        let store = ScriptedStore::returning(1, Some(10));
        let config = config();

        let output = execute(
            &store,
            "items",
            ListSource::raw(QueryPairs::new(), &config),
            None,
            RunOptions::default().without_count().envelope(),
        )
        .await
        .unwrap();

        let envelope = output.into_envelope().unwrap();
        assert_eq!(envelope.meta.total, 1);
        assert!(!envelope.meta.has_more);
        assert_eq!(envelope.meta.next_offset, None);
        assert!(store.counts().is_empty());
    }
}

mod concurrency_tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::Barrier;

    /// Both queries must be in flight at once to get past the barrier
    struct RendezvousStore {
        barrier: Barrier,
    }

    #[async_trait]
    impl DataStore for RendezvousStore {
        type Row = u32;

        async fn select(&self, _table: &str, _query: &SelectQuery) -> Result<Vec<u32>> {
            self.barrier.wait().await;
            Ok(vec![1])
        }

        async fn count(&self, _table: &str, _filter: Option<&Predicate>) -> Result<Option<u64>> {
            self.barrier.wait().await;
            Ok(Some(1))
        }
    }

    #[tokio::test]
    async fn test_row_and_count_queries_run_concurrently() {
        let store = RendezvousStore {
            barrier: Barrier::new(2),
        };

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            run_list_query(&store, "items", config().parse(QueryPairs::new()), None, true),
        )
        .await
        .expect("queries were not issued concurrently")
        .unwrap();

        assert_eq!(result.total, 1);
    }
}

// =============================================================================
// In-memory store end to end
// =============================================================================

mod in_memory_tests {
    use super::*;

    fn seeded() -> InMemoryStore {
        let store = InMemoryStore::new();
        let rows = [
            (1, 7, "LISTED", 40, "2024-01-01"),
            (2, 7, "SOLD", 10, "2024-01-02"),
            (3, 8, "LISTED", 25, "2024-01-03"),
            (4, 7, "LISTED", 15, "2024-01-04"),
            (5, 7, "LISTED", 90, "2024-01-05"),
        ];
        for (id, owner_id, status, price, created_at) in rows {
            store
                .insert_json(
                    "listings",
                    json!({
                        "id": id,
                        "owner_id": owner_id,
                        "status": status,
                        "price": price,
                        "created_at": created_at,
                    }),
                )
                .unwrap();
        }
        store
    }

    fn ids(rows: &[Record]) -> Vec<i64> {
        rows.iter()
            .map(|r| r.get("id").and_then(FieldValue::as_integer).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_scoped_listing_with_exact_count() {
        let store = seeded();
        let parsed = config().parse(vec![
            ("status", "LISTED"),
            ("sort", "price"),
            ("order", "asc"),
            ("limit", "2"),
        ]);

        let envelope = run_list_envelope(
            &store,
            "listings",
            parsed,
            Some(Column::new("owner_id").eq(7)),
            true,
        )
        .await
        .unwrap();

        assert_eq!(ids(&envelope.data), vec![4, 1]);
        assert_eq!(envelope.meta.total, 3);
        assert!(envelope.meta.has_more);
        assert_eq!(envelope.meta.next_offset, Some(2));
    }

    #[tokio::test]
    async fn test_default_order_is_newest_first() {
        let store = seeded();

        let result = run_list_query(&store, "listings", config().parse(QueryPairs::new()), None, true)
            .await
            .unwrap();

        assert_eq!(ids(&result.rows), vec![5, 4, 3, 2, 1]);
        assert_eq!(result.total, 5);
        assert!(!result.has_more);
    }

    #[tokio::test]
    async fn test_unknown_table_error_reaches_caller() {
        let store = InMemoryStore::new();

        let result =
            run_list_query(&store, "missing", config().parse(QueryPairs::new()), None, true).await;

        assert!(result.is_err());
    }
}
