//! Listing API example: a marketplace listing endpoint backed by the in-memory store
//!
//! Try:
//! - `GET /listings?status=LISTED&sort=price&order=asc`
//! - `GET /listings?q=lamp&limit=2&offset=2`
//! - `GET /my/listings?tags=vintage,wood` with header `x-user-id: 1`

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::get;
use axum::Router;
use list_query::prelude::*;
use serde_json::json;
use std::sync::Arc;

const LISTINGS_YAML: &str = r#"
endpoints:
  listings:
    filters:
      status: { column: status, coerce: uppercase }
      min_price: { column: price, op: gte, coerce: integer }
      max_price: { column: price, op: lte, coerce: integer }
      q: { column: title, op: contains, coerce: trimmed }
      tags: { column: tag, op: in, coerce: lowercase }
    sortable:
      created_at: created_at
      price: price
      title: title
    default_sort: { key: created_at, direction: desc }
    max_limit: 50
"#;

fn seed(store: &InMemoryStore) -> Result<()> {
    let rows = [
        (1, 1, "Oak desk lamp", "LISTED", 45, "wood", "2024-03-01T10:00:00Z"),
        (2, 1, "Brass floor lamp", "SOLD", 120, "vintage", "2024-03-02T10:00:00Z"),
        (3, 2, "Walnut bookshelf", "LISTED", 300, "wood", "2024-03-03T10:00:00Z"),
        (4, 2, "Ceramic vase", "LISTED", 25, "vintage", "2024-03-04T10:00:00Z"),
        (5, 1, "Pine stool", "DRAFT", 15, "wood", "2024-03-05T10:00:00Z"),
        (6, 3, "Glass pendant lamp", "LISTED", 80, "modern", "2024-03-06T10:00:00Z"),
    ];

    store.create_table("listings")?;
    for (id, owner_id, title, status, price, tag, created_at) in rows {
        store.insert_json(
            "listings",
            json!({
                "id": id,
                "owner_id": owner_id,
                "title": title,
                "status": status,
                "price": price,
                "tag": tag,
                "created_at": created_at,
            }),
        )?;
    }
    Ok(())
}

async fn list_listings(
    State(route): State<ListRoute<InMemoryStore>>,
    ListParams(params): ListParams,
) -> std::result::Result<ListEnvelope<Record>, ListQueryError> {
    route.list(&params, None).await
}

/// Listings of the caller only; the owner scope survives any query parameter
async fn list_my_listings(
    State(route): State<ListRoute<InMemoryStore>>,
    headers: HeaderMap,
    ListParams(params): ListParams,
) -> std::result::Result<ListEnvelope<Record>, ListQueryError> {
    let owner_id = headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<i64>().ok())
        .unwrap_or(0);

    route
        .list(&params, Some(Column::new("owner_id").eq(owner_id)))
        .await
}

async fn describe(State(route): State<ListRoute<InMemoryStore>>) -> ItemEnvelope<serde_json::Value> {
    let config = route.config();
    build_item_envelope(json!({
        "table": route.table(),
        "sortable": config.sortable_keys().collect::<Vec<_>>(),
        "default_sort": {
            "key": config.default_sort().key,
            "direction": config.default_sort().direction.as_str(),
        },
        "default_limit": config.default_limit(),
        "max_limit": config.max_limit(),
    }))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let store = Arc::new(InMemoryStore::new());
    seed(&store)?;
    tracing::info!(rows = store.len("listings")?, "seeded listings table");

    // custom filters are closures, so they are attached after loading the YAML
    let endpoints = ListEndpointsConfig::from_yaml_str(LISTINGS_YAML)?;
    let config = endpoints
        .endpoint("listings")
        .ok_or_else(|| anyhow::anyhow!("listings endpoint missing"))?
        .to_builder()
        .custom_filter("cheap", |raw| {
            (raw == "true").then(|| Column::new("price").lt(50))
        })
        .build()?;

    let route = ListRoute::new(store, "listings", config);

    let app = Router::new()
        .route("/listings", get(list_listings))
        .route("/my/listings", get(list_my_listings))
        .route("/listings/_config", get(describe))
        .with_state(route);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;

    println!("🚀 Listing API running on http://127.0.0.1:3000");
    println!("📚 Try: curl 'http://127.0.0.1:3000/listings?status=listed&sort=price&order=asc'");

    axum::serve(listener, app).await?;

    Ok(())
}
