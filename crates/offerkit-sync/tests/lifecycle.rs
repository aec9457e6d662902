//! Lifecycle integration tests: activation, revert, and sweep against a
//! fresh Postgres database and a mocked Admin GraphQL API.
//!
//! The three GraphQL operations share one endpoint, so mocks discriminate on
//! the operation name inside the posted document (`VariantBySku`,
//! `VariantPriceUpdate`, `ProductTagsUpdate`) plus the variables that matter
//! to the scenario.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use offerkit_db::{get_offer, list_offer_items, mark_item_reverted, mark_item_synced, OfferItemRow};
use offerkit_shopify::AdminClient;
use offerkit_sync::{activate, revert, run_sweep, SyncError};

const GRAPHQL_PATH: &str = "/admin/api/2025-07/graphql.json";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Builds an `AdminClient` aimed at the mock server, no retries.
fn admin(server: &MockServer) -> AdminClient {
    let endpoint = format!("{}{}", server.uri(), GRAPHQL_PATH);
    AdminClient::new(&endpoint, "shpat_test_token", 5, "offerkit-test/0.1", 0, 0)
        .expect("failed to build test AdminClient")
}

/// Insert an offer row directly in an arbitrary status and return its id.
async fn seed_offer(pool: &sqlx::PgPool, status: &str, price_type: &str, tags: &str) -> i64 {
    seed_offer_with_window(pool, status, price_type, tags, None, None).await
}

async fn seed_offer_with_window(
    pool: &sqlx::PgPool,
    status: &str,
    price_type: &str,
    tags: &str,
    starts_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO offers (vendor, tags, status, price_type, starts_at, ends_at) \
         VALUES ('Acme', $1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(tags)
    .bind(status)
    .bind(price_type)
    .bind(starts_at)
    .bind(ends_at)
    .fetch_one(pool)
    .await
    .unwrap_or_else(|e| panic!("seed_offer failed: {e}"))
}

/// Insert an item row and return its id.
async fn seed_item(pool: &sqlx::PgPool, offer_id: i64, sku: &str, cents: i64) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO offer_items (offer_id, sku, offer_price) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(offer_id)
    .bind(sku)
    .bind(Decimal::new(cents, 2))
    .fetch_one(pool)
    .await
    .unwrap_or_else(|e| panic!("seed_item failed for sku '{sku}': {e}"))
}

async fn find_item(pool: &sqlx::PgPool, offer_id: i64, sku: &str) -> OfferItemRow {
    list_offer_items(pool, offer_id)
        .await
        .expect("list_offer_items failed")
        .into_iter()
        .find(|item| item.sku == sku)
        .unwrap_or_else(|| panic!("no item with sku '{sku}'"))
}

async fn offer_status(pool: &sqlx::PgPool, offer_id: i64) -> String {
    get_offer(pool, offer_id)
        .await
        .expect("get_offer failed")
        .expect("offer should exist")
        .status
}

/// Lookup response fixture with one matching variant.
fn lookup_hit(variant_id: &str, product_id: &str, price: &str, tags: &[&str]) -> serde_json::Value {
    json!({
        "data": {
            "productVariants": {
                "edges": [{
                    "node": {
                        "id": variant_id,
                        "price": price,
                        "product": { "id": product_id, "tags": tags }
                    }
                }]
            }
        }
    })
}

fn lookup_miss() -> serde_json::Value {
    json!({ "data": { "productVariants": { "edges": [] } } })
}

fn price_update_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "data": { "productVariantsBulkUpdate": { "productVariants": [], "userErrors": [] } }
    }))
}

fn tags_update_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "data": { "productUpdate": { "product": { "id": "gid://shopify/Product/0" }, "userErrors": [] } }
    }))
}

async fn mount_lookup(server: &MockServer, sku: &str, response: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("VariantBySku"))
        .and(body_partial_json(
            json!({ "variables": { "query": format!("sku:{sku}") } }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(&response))
        .mount(server)
        .await;
}

/// Price mutation mock pinned to the exact variant id and price expected.
async fn mount_price_update(server: &MockServer, variant_id: &str, price: &str) {
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("VariantPriceUpdate"))
        .and(body_partial_json(json!({
            "variables": { "variants": [{ "id": variant_id, "price": price }] }
        })))
        .respond_with(price_update_ok())
        .expect(1)
        .mount(server)
        .await;
}

/// Tag mutation mock pinned to the exact replacement array expected.
async fn mount_tags_update(server: &MockServer, product_id: &str, tags: &[&str]) {
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("ProductTagsUpdate"))
        .and(body_partial_json(json!({
            "variables": { "input": { "id": product_id, "tags": tags } }
        })))
        .respond_with(tags_update_ok())
        .expect(1)
        .mount(server)
        .await;
}

/// Guard mock asserting that no request at all reaches the API.
async fn mount_no_traffic_guard(server: &MockServer) {
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Activation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn activate_pushes_price_merges_tags_and_records_original(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    let offer_id = seed_offer(&pool, "pending", "offer", "sale").await;
    seed_item(&pool, offer_id, "SHIRT-RED-S", 1999).await;

    mount_lookup(
        &server,
        "SHIRT-RED-S",
        lookup_hit(
            "gid://shopify/ProductVariant/111",
            "gid://shopify/Product/222",
            "24.99",
            &["new"],
        ),
    )
    .await;
    mount_price_update(&server, "gid://shopify/ProductVariant/111", "19.99").await;
    mount_tags_update(&server, "gid://shopify/Product/222", &["new", "sale"]).await;

    let report = activate(&pool, &admin(&server), offer_id)
        .await
        .expect("activation failed");

    assert_eq!(report.matched, 1);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.failed, 0);

    assert_eq!(offer_status(&pool, offer_id).await, "active");
    let item = find_item(&pool, offer_id, "SHIRT-RED-S").await;
    assert_eq!(item.original_price, Some(Decimal::new(2499, 2)));
    assert!(item.synced_at.is_some(), "item should carry a sync marker");
    assert!(item.reverted_at.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn activate_regular_offer_records_offer_price_as_original(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    let offer_id = seed_offer(&pool, "pending", "regular", "").await;
    seed_item(&pool, offer_id, "MUG-01", 1250).await;

    mount_lookup(
        &server,
        "MUG-01",
        lookup_hit(
            "gid://shopify/ProductVariant/111",
            "gid://shopify/Product/222",
            "15.00",
            &[],
        ),
    )
    .await;
    mount_price_update(&server, "gid://shopify/ProductVariant/111", "12.50").await;
    // No tags on the offer, so the product must never be touched.
    Mock::given(method("POST"))
        .and(body_string_contains("ProductTagsUpdate"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let report = activate(&pool, &admin(&server), offer_id)
        .await
        .expect("activation failed");
    assert_eq!(report.matched, 1);

    // A permanent change records the new price itself, not the catalog's.
    let item = find_item(&pool, offer_id, "MUG-01").await;
    assert_eq!(item.original_price, Some(Decimal::new(1250, 2)));
}

#[sqlx::test(migrations = "../../migrations")]
async fn activate_rejects_non_pending_offer_without_remote_calls(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    mount_no_traffic_guard(&server).await;
    let offer_id = seed_offer(&pool, "completed", "offer", "").await;
    seed_item(&pool, offer_id, "SKU-1", 1000).await;

    let err = activate(&pool, &admin(&server), offer_id)
        .await
        .expect_err("completed offer must not activate");
    assert!(matches!(err, SyncError::InvalidTransition { .. }));
    assert_eq!(offer_status(&pool, offer_id).await, "completed");
}

#[sqlx::test(migrations = "../../migrations")]
async fn activate_unknown_offer_is_not_found(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    mount_no_traffic_guard(&server).await;

    let err = activate(&pool, &admin(&server), 9999)
        .await
        .expect_err("missing offer must error");
    assert!(matches!(err, SyncError::OfferNotFound(9999)));
}

#[sqlx::test(migrations = "../../migrations")]
async fn activate_skips_unknown_sku_and_continues(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    let offer_id = seed_offer(&pool, "pending", "offer", "").await;
    seed_item(&pool, offer_id, "GHOST", 500).await;
    seed_item(&pool, offer_id, "REAL-1", 2000).await;

    mount_lookup(&server, "GHOST", lookup_miss()).await;
    mount_lookup(
        &server,
        "REAL-1",
        lookup_hit(
            "gid://shopify/ProductVariant/333",
            "gid://shopify/Product/444",
            "25.00",
            &[],
        ),
    )
    .await;
    mount_price_update(&server, "gid://shopify/ProductVariant/333", "20.00").await;

    let report = activate(&pool, &admin(&server), offer_id)
        .await
        .expect("activation failed");

    assert_eq!(report.matched, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.failed, 0);

    // The offer still activates; only the unmatched item stays unmarked.
    assert_eq!(offer_status(&pool, offer_id).await, "active");
    assert!(find_item(&pool, offer_id, "GHOST").await.synced_at.is_none());
    assert!(find_item(&pool, offer_id, "REAL-1").await.synced_at.is_some());
}

#[sqlx::test(migrations = "../../migrations")]
async fn activate_leaves_item_unsynced_when_price_rejected(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    let offer_id = seed_offer(&pool, "pending", "offer", "").await;
    seed_item(&pool, offer_id, "SKU-1", 1999).await;

    mount_lookup(
        &server,
        "SKU-1",
        lookup_hit(
            "gid://shopify/ProductVariant/111",
            "gid://shopify/Product/222",
            "24.99",
            &[],
        ),
    )
    .await;
    Mock::given(method("POST"))
        .and(body_string_contains("VariantPriceUpdate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "productVariantsBulkUpdate": {
                    "productVariants": [],
                    "userErrors": [{ "field": ["variants", "price"], "message": "Price must be positive" }]
                }
            }
        })))
        .mount(&server)
        .await;

    let report = activate(&pool, &admin(&server), offer_id)
        .await
        .expect("activation itself should not error");

    assert_eq!(report.matched, 0);
    assert_eq!(report.failed, 1);

    // Status advanced but the item keeps no marker, so a later pass retries.
    assert_eq!(offer_status(&pool, offer_id).await, "active");
    let item = find_item(&pool, offer_id, "SKU-1").await;
    assert!(item.synced_at.is_none());
    assert_eq!(item.original_price, None);
}

#[sqlx::test(migrations = "../../migrations")]
async fn activate_resumes_active_offer_with_unsynced_items(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    let offer_id = seed_offer(&pool, "active", "offer", "").await;
    let done = seed_item(&pool, offer_id, "DONE-1", 1000).await;
    seed_item(&pool, offer_id, "LEFT-1", 2000).await;
    mark_item_synced(&pool, done, Decimal::new(1500, 2))
        .await
        .expect("failed to seed sync marker");

    // Only the leftover item may generate traffic.
    mount_lookup(
        &server,
        "LEFT-1",
        lookup_hit(
            "gid://shopify/ProductVariant/333",
            "gid://shopify/Product/444",
            "30.00",
            &[],
        ),
    )
    .await;
    mount_price_update(&server, "gid://shopify/ProductVariant/333", "20.00").await;

    let report = activate(&pool, &admin(&server), offer_id)
        .await
        .expect("resume failed");

    assert_eq!(report.matched, 1, "resume only counts this pass's items");
    assert_eq!(report.failed, 0);
    assert!(find_item(&pool, offer_id, "LEFT-1").await.synced_at.is_some());

    // The already-synced item keeps its first captured price.
    let done_item = find_item(&pool, offer_id, "DONE-1").await;
    assert_eq!(done_item.original_price, Some(Decimal::new(1500, 2)));
}

#[sqlx::test(migrations = "../../migrations")]
async fn activate_rejects_active_offer_with_nothing_left(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    mount_no_traffic_guard(&server).await;
    let offer_id = seed_offer(&pool, "active", "offer", "").await;
    let item = seed_item(&pool, offer_id, "SKU-1", 1000).await;
    mark_item_synced(&pool, item, Decimal::new(1200, 2))
        .await
        .expect("failed to seed sync marker");

    let err = activate(&pool, &admin(&server), offer_id)
        .await
        .expect_err("fully-synced active offer must not re-activate");
    assert!(matches!(err, SyncError::InvalidTransition { .. }));
}

// ---------------------------------------------------------------------------
// Revert
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn revert_restores_price_and_strips_tags(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    let offer_id = seed_offer(&pool, "active", "offer", "sale").await;
    let item = seed_item(&pool, offer_id, "SHIRT-RED-S", 1999).await;
    mark_item_synced(&pool, item, Decimal::new(2499, 2))
        .await
        .expect("failed to seed sync marker");

    // Catalog currently shows the offer price and the merged tags.
    mount_lookup(
        &server,
        "SHIRT-RED-S",
        lookup_hit(
            "gid://shopify/ProductVariant/111",
            "gid://shopify/Product/222",
            "19.99",
            &["new", "sale"],
        ),
    )
    .await;
    mount_price_update(&server, "gid://shopify/ProductVariant/111", "24.99").await;
    mount_tags_update(&server, "gid://shopify/Product/222", &["new"]).await;

    let report = revert(&pool, &admin(&server), offer_id)
        .await
        .expect("revert failed");

    assert_eq!(report.matched, 1);
    assert_eq!(offer_status(&pool, offer_id).await, "completed");
    let item = find_item(&pool, offer_id, "SHIRT-RED-S").await;
    assert!(item.reverted_at.is_some(), "item should carry a revert marker");
}

#[sqlx::test(migrations = "../../migrations")]
async fn revert_ignores_items_that_never_synced(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    let offer_id = seed_offer(&pool, "active", "offer", "").await;
    let synced = seed_item(&pool, offer_id, "DONE-1", 1000).await;
    seed_item(&pool, offer_id, "NEVER-1", 2000).await;
    mark_item_synced(&pool, synced, Decimal::new(1500, 2))
        .await
        .expect("failed to seed sync marker");

    mount_lookup(
        &server,
        "DONE-1",
        lookup_hit(
            "gid://shopify/ProductVariant/111",
            "gid://shopify/Product/222",
            "10.00",
            &[],
        ),
    )
    .await;
    mount_price_update(&server, "gid://shopify/ProductVariant/111", "15.00").await;

    let report = revert(&pool, &admin(&server), offer_id)
        .await
        .expect("revert failed");

    // The never-synced item has no captured price and is not part of the pass.
    assert_eq!(report.matched, 1);
    assert_eq!(report.skipped, 0);
    assert_eq!(offer_status(&pool, offer_id).await, "completed");
    assert!(find_item(&pool, offer_id, "NEVER-1").await.reverted_at.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn revert_rejects_non_active_offer(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    mount_no_traffic_guard(&server).await;
    let offer_id = seed_offer(&pool, "pending", "offer", "").await;

    let err = revert(&pool, &admin(&server), offer_id)
        .await
        .expect_err("pending offer must not revert");
    assert!(matches!(err, SyncError::InvalidTransition { .. }));
    assert_eq!(offer_status(&pool, offer_id).await, "pending");
}

#[sqlx::test(migrations = "../../migrations")]
async fn revert_resumes_completed_offer_with_unreverted_items(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    let offer_id = seed_offer(&pool, "completed", "offer", "").await;
    let item = seed_item(&pool, offer_id, "SKU-1", 1999).await;
    mark_item_synced(&pool, item, Decimal::new(2499, 2))
        .await
        .expect("failed to seed sync marker");

    mount_lookup(
        &server,
        "SKU-1",
        lookup_hit(
            "gid://shopify/ProductVariant/111",
            "gid://shopify/Product/222",
            "19.99",
            &[],
        ),
    )
    .await;
    mount_price_update(&server, "gid://shopify/ProductVariant/111", "24.99").await;

    let report = revert(&pool, &admin(&server), offer_id)
        .await
        .expect("resume failed");
    assert_eq!(report.matched, 1);
    assert!(find_item(&pool, offer_id, "SKU-1").await.reverted_at.is_some());
}

#[sqlx::test(migrations = "../../migrations")]
async fn revert_rejects_completed_offer_with_nothing_left(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    mount_no_traffic_guard(&server).await;
    let offer_id = seed_offer(&pool, "completed", "offer", "").await;
    let item = seed_item(&pool, offer_id, "SKU-1", 1999).await;
    mark_item_synced(&pool, item, Decimal::new(2499, 2))
        .await
        .expect("failed to seed sync marker");
    mark_item_reverted(&pool, item)
        .await
        .expect("failed to seed revert marker");

    let err = revert(&pool, &admin(&server), offer_id)
        .await
        .expect_err("fully-reverted offer must not re-revert");
    assert!(matches!(err, SyncError::InvalidTransition { .. }));
}

// ---------------------------------------------------------------------------
// Sweep
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn sweep_activates_due_and_reverts_expired(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    let now = Utc::now();

    // Window opened an hour ago: due for activation.
    let due = seed_offer_with_window(
        &pool,
        "pending",
        "offer",
        "",
        Some(now - Duration::hours(1)),
        Some(now + Duration::hours(1)),
    )
    .await;
    seed_item(&pool, due, "OPEN-1", 1000).await;

    // Window closed an hour ago: due for revert.
    let expired = seed_offer_with_window(
        &pool,
        "active",
        "offer",
        "",
        Some(now - Duration::hours(3)),
        Some(now - Duration::hours(1)),
    )
    .await;
    let expired_item = seed_item(&pool, expired, "SHUT-1", 2000).await;
    mark_item_synced(&pool, expired_item, Decimal::new(2500, 2))
        .await
        .expect("failed to seed sync marker");

    mount_lookup(
        &server,
        "OPEN-1",
        lookup_hit(
            "gid://shopify/ProductVariant/111",
            "gid://shopify/Product/222",
            "12.00",
            &[],
        ),
    )
    .await;
    mount_price_update(&server, "gid://shopify/ProductVariant/111", "10.00").await;
    mount_lookup(
        &server,
        "SHUT-1",
        lookup_hit(
            "gid://shopify/ProductVariant/333",
            "gid://shopify/Product/444",
            "20.00",
            &[],
        ),
    )
    .await;
    mount_price_update(&server, "gid://shopify/ProductVariant/333", "25.00").await;

    let report = run_sweep(&pool, &admin(&server))
        .await
        .expect("sweep failed");

    assert_eq!(report.activated, 1);
    assert_eq!(report.reverted, 1);
    assert_eq!(offer_status(&pool, due).await, "active");
    assert_eq!(offer_status(&pool, expired).await, "completed");
}

#[sqlx::test(migrations = "../../migrations")]
async fn sweep_ignores_offers_outside_their_window(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    mount_no_traffic_guard(&server).await;
    let now = Utc::now();

    // Starts tomorrow: not yet due.
    let future = seed_offer_with_window(
        &pool,
        "pending",
        "offer",
        "",
        Some(now + Duration::days(1)),
        Some(now + Duration::days(2)),
    )
    .await;
    // Still inside its window: not yet expired.
    let running = seed_offer_with_window(
        &pool,
        "active",
        "offer",
        "",
        Some(now - Duration::hours(1)),
        Some(now + Duration::hours(1)),
    )
    .await;
    // No window at all: only ever moved manually.
    let manual = seed_offer(&pool, "pending", "offer", "").await;

    let report = run_sweep(&pool, &admin(&server))
        .await
        .expect("sweep failed");

    assert_eq!(report.activated, 0);
    assert_eq!(report.reverted, 0);
    assert_eq!(offer_status(&pool, future).await, "pending");
    assert_eq!(offer_status(&pool, running).await, "active");
    assert_eq!(offer_status(&pool, manual).await, "pending");
}

#[sqlx::test(migrations = "../../migrations")]
async fn sweep_continues_past_remote_failures(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    let now = Utc::now();

    let broken = seed_offer_with_window(
        &pool,
        "pending",
        "offer",
        "",
        Some(now - Duration::hours(2)),
        Some(now + Duration::hours(2)),
    )
    .await;
    seed_item(&pool, broken, "BAD-1", 1000).await;

    let healthy = seed_offer_with_window(
        &pool,
        "pending",
        "offer",
        "",
        Some(now - Duration::hours(1)),
        Some(now + Duration::hours(1)),
    )
    .await;
    seed_item(&pool, healthy, "GOOD-1", 2000).await;

    // The first offer's lookup blows up server-side; the second is clean.
    Mock::given(method("POST"))
        .and(body_string_contains("VariantBySku"))
        .and(body_partial_json(json!({ "variables": { "query": "sku:BAD-1" } })))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_lookup(
        &server,
        "GOOD-1",
        lookup_hit(
            "gid://shopify/ProductVariant/333",
            "gid://shopify/Product/444",
            "25.00",
            &[],
        ),
    )
    .await;
    mount_price_update(&server, "gid://shopify/ProductVariant/333", "20.00").await;

    let report = run_sweep(&pool, &admin(&server))
        .await
        .expect("sweep failed");

    // Both offers claim their transition; the broken one's item stays
    // unmarked so a later pass retries it.
    assert_eq!(report.activated, 2);
    assert!(find_item(&pool, broken, "BAD-1").await.synced_at.is_none());
    assert!(find_item(&pool, healthy, "GOOD-1").await.synced_at.is_some());
}

#[sqlx::test(migrations = "../../migrations")]
async fn sweep_moves_an_offer_through_its_whole_window(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    let now = Utc::now();

    let offer_id = seed_offer_with_window(
        &pool,
        "pending",
        "offer",
        "clearance",
        Some(now - Duration::hours(1)),
        Some(now + Duration::hours(1)),
    )
    .await;
    seed_item(&pool, offer_id, "SK1", 10000).await;

    mount_lookup(
        &server,
        "SK1",
        lookup_hit(
            "gid://shopify/ProductVariant/111",
            "gid://shopify/Product/222",
            "120.00",
            &["new"],
        ),
    )
    .await;
    mount_price_update(&server, "gid://shopify/ProductVariant/111", "100.00").await;
    mount_tags_update(&server, "gid://shopify/Product/222", &["new", "clearance"]).await;

    let opened = run_sweep(&pool, &admin(&server)).await.expect("sweep failed");
    assert_eq!(opened.activated, 1);
    assert_eq!(offer_status(&pool, offer_id).await, "active");
    let item = find_item(&pool, offer_id, "SK1").await;
    assert_eq!(item.original_price, Some(Decimal::new(12000, 2)));

    // Close the window and sweep again: the catalog now shows the offer
    // price and merged tags, and the sweep puts both back.
    sqlx::query("UPDATE offers SET ends_at = $2 WHERE id = $1")
        .bind(offer_id)
        .bind(now - Duration::minutes(5))
        .execute(&pool)
        .await
        .expect("failed to close window");

    server.reset().await;
    mount_lookup(
        &server,
        "SK1",
        lookup_hit(
            "gid://shopify/ProductVariant/111",
            "gid://shopify/Product/222",
            "100.00",
            &["new", "clearance"],
        ),
    )
    .await;
    mount_price_update(&server, "gid://shopify/ProductVariant/111", "120.00").await;
    mount_tags_update(&server, "gid://shopify/Product/222", &["new"]).await;

    let closed = run_sweep(&pool, &admin(&server)).await.expect("sweep failed");
    assert_eq!(closed.reverted, 1);
    assert_eq!(offer_status(&pool, offer_id).await, "completed");
    let item = find_item(&pool, offer_id, "SK1").await;
    assert!(item.reverted_at.is_some());
    assert_eq!(item.original_price, Some(Decimal::new(12000, 2)));
}
