use axum::http::StatusCode;
use boxoffice::api;
use boxoffice::db::init_db;
use boxoffice::domain::{
    Currency, EntryType, LedgerEntry, Money, OwnerAccount, OwnerAccountId, OwnerAccountStatus,
    Purchase, PurchaseId, PurchaseStatus, ReferenceType, TimeMs,
};
use boxoffice::{Repository, SettlementWriter};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

// 2026-01-15 and 2026-02-15 (UTC)
const JAN_MS: i64 = 1_768_435_200_000;
const FEB_MS: i64 = 1_771_113_600_000;

struct TestApp {
    app: axum::Router,
    repo: Arc<Repository>,
    _temp: TempDir,
}

async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");
    let repo = Arc::new(Repository::new(pool));
    let writer = Arc::new(SettlementWriter::new(repo.clone()));
    let app = api::create_router(api::AppState::new(repo.clone(), writer));

    repo.upsert_owner_account(&OwnerAccount {
        id: OwnerAccountId::new("own_1"),
        payout_provider_ref: "acct_1".to_string(),
        status: OwnerAccountStatus::Active,
    })
    .await
    .unwrap();

    TestApp {
        app,
        repo,
        _temp: temp_dir,
    }
}

async fn request(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("GET")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn usd(cents: i64) -> Money {
    Money::new(cents, Currency::new("USD"))
}

fn purchase_entry(
    entry_type: EntryType,
    cents: i64,
    reference_id: &str,
    at_ms: i64,
) -> LedgerEntry {
    LedgerEntry {
        created_at: TimeMs::new(at_ms),
        ..LedgerEntry::new(
            OwnerAccountId::new("own_1"),
            entry_type,
            usd(cents),
            ReferenceType::Purchase,
            reference_id,
            "test entry",
        )
    }
}

fn paid_purchase(id: &str, gross: i64) -> Purchase {
    Purchase {
        id: PurchaseId::new(id),
        owner_account_id: OwnerAccountId::new("own_1"),
        gross: usd(gross),
        platform_fee: usd(0),
        processor_fee: usd(0),
        owner_net: usd(gross),
        platform_fee_percent: 0,
        status: PurchaseStatus::Paid,
        paid_at: Some(TimeMs::new(JAN_MS)),
    }
}

/// One January settlement (1000 gross, 100 platform fee, 59 processor
/// fee) and one February settlement (2500 gross only).
async fn seed_two_months(repo: &Repository) {
    repo.record_purchase_settlement_atomic(
        &paid_purchase("pur_jan", 1000),
        &[
            purchase_entry(EntryType::Charge, 1000, "pur_jan", JAN_MS),
            purchase_entry(EntryType::PlatformFee, -100, "pur_jan", JAN_MS),
            purchase_entry(EntryType::ProcessorFee, -59, "pur_jan", JAN_MS),
        ],
    )
    .await
    .unwrap();
    repo.record_purchase_settlement_atomic(
        &paid_purchase("pur_feb", 2500),
        &[purchase_entry(EntryType::Charge, 2500, "pur_feb", FEB_MS)],
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_revenue_totals_by_entry_type() {
    let test_app = setup_test_app().await;
    seed_two_months(&test_app.repo).await;

    let (status, body) = request(test_app.app, "/v1/revenue?ownerAccountId=own_1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ownerAccountId"], "own_1");

    let totals = body["totals"].as_array().unwrap();
    assert_eq!(totals.len(), 1, "one currency bucket");
    let t = &totals[0];
    assert_eq!(t["currency"], "USD");
    assert_eq!(t["chargeCents"], 3500);
    assert_eq!(t["platformFeeCents"], -100);
    assert_eq!(t["processorFeeCents"], -59);
    assert_eq!(t["refundCents"], 0);
    assert_eq!(t["netCents"], 3341);
}

#[tokio::test]
async fn test_revenue_months_are_bucketed() {
    let test_app = setup_test_app().await;
    seed_two_months(&test_app.repo).await;

    let (_status, body) = request(test_app.app, "/v1/revenue?ownerAccountId=own_1").await;

    let months = body["months"].as_array().unwrap();
    assert_eq!(months.len(), 2);
    assert_eq!(months[0]["month"], "2026-01");
    assert_eq!(months[0]["chargeCents"], 1000);
    assert_eq!(months[0]["netCents"], 841);
    assert_eq!(months[1]["month"], "2026-02");
    assert_eq!(months[1]["chargeCents"], 2500);
    assert_eq!(months[1]["netCents"], 2500);
}

#[tokio::test]
async fn test_revenue_window_filters_months() {
    let test_app = setup_test_app().await;
    seed_two_months(&test_app.repo).await;

    let (_status, body) = request(
        test_app.app,
        &format!("/v1/revenue?ownerAccountId=own_1&fromMs=0&toMs={}", JAN_MS + 1),
    )
    .await;

    let months = body["months"].as_array().unwrap();
    assert_eq!(months.len(), 1);
    assert_eq!(months[0]["month"], "2026-01");
    assert_eq!(body["totals"][0]["netCents"], 841);
}

#[tokio::test]
async fn test_revenue_empty_for_unknown_owner() {
    let test_app = setup_test_app().await;
    seed_two_months(&test_app.repo).await;

    let (status, body) = request(test_app.app, "/v1/revenue?ownerAccountId=own_other").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["totals"].as_array().unwrap().is_empty());
    assert!(body["months"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_revenue_requires_owner() {
    let test_app = setup_test_app().await;

    let (status, _body) = request(test_app.app, "/v1/revenue").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_revenue_rejects_invalid_time_window() {
    let test_app = setup_test_app().await;

    let (status, _body) = request(
        test_app.app,
        "/v1/revenue?ownerAccountId=own_1&fromMs=2&toMs=1",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_revenue_response_deterministic() {
    let test_app = setup_test_app().await;
    seed_two_months(&test_app.repo).await;

    let uri = "/v1/revenue?ownerAccountId=own_1";
    let (_s1, b1) = request(test_app.app.clone(), uri).await;
    let (_s2, b2) = request(test_app.app, uri).await;
    assert_eq!(b1, b2, "responses must be identical");
}
