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

fn entry(entry_type: EntryType, cents: i64, reference_id: &str, at_ms: i64) -> LedgerEntry {
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

fn paid_purchase(id: &str) -> Purchase {
    Purchase {
        id: PurchaseId::new(id),
        owner_account_id: OwnerAccountId::new("own_1"),
        gross: usd(1000),
        platform_fee: usd(100),
        processor_fee: usd(59),
        owner_net: usd(841),
        platform_fee_percent: 10,
        status: PurchaseStatus::Paid,
        paid_at: Some(TimeMs::new(1_700_000_000_000)),
    }
}

async fn seed_entries(repo: &Repository) {
    repo.record_purchase_settlement_atomic(
        &paid_purchase("pur_1"),
        &[
            entry(EntryType::Charge, 1000, "pur_1", 1000),
            entry(EntryType::PlatformFee, -100, "pur_1", 1000),
            entry(EntryType::ProcessorFee, -59, "pur_1", 1000),
        ],
    )
    .await
    .unwrap();
    repo.record_purchase_settlement_atomic(
        &paid_purchase("pur_2"),
        &[entry(EntryType::Charge, 2500, "pur_2", 5000)],
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_entries_response_has_required_fields() {
    let test_app = setup_test_app().await;
    seed_entries(&test_app.repo).await;

    let (status, body) = request(test_app.app, "/v1/entries?ownerAccountId=own_1").await;
    assert_eq!(status, StatusCode::OK);

    assert!(body["entryCount"].is_i64());
    assert!(body["entries"].is_array());

    let entry = &body["entries"][0];
    assert!(entry["id"].is_string());
    assert_eq!(entry["ownerAccountId"], "own_1");
    assert!(entry["entryType"].is_string());
    assert!(entry["amountCents"].is_i64());
    assert_eq!(entry["currency"], "USD");
    assert!(entry["referenceType"].is_string());
    assert!(entry["referenceId"].is_string());
    assert!(entry["description"].is_string());
    assert!(entry["createdAtMs"].is_i64());
}

#[tokio::test]
async fn test_entries_filtered_by_time_window() {
    let test_app = setup_test_app().await;
    seed_entries(&test_app.repo).await;

    let (_status, body) = request(
        test_app.app,
        "/v1/entries?ownerAccountId=own_1&fromMs=0&toMs=2000",
    )
    .await;

    assert_eq!(body["entryCount"], 3);
    assert!(body["entries"]
        .as_array()
        .unwrap()
        .iter()
        .all(|e| e["referenceId"] == "pur_1"));
}

#[tokio::test]
async fn test_entries_timeline_by_reference() {
    let test_app = setup_test_app().await;
    seed_entries(&test_app.repo).await;

    let (status, body) = request(
        test_app.app,
        "/v1/entries?referenceType=purchase&referenceId=pur_2",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entryCount"], 1);
    assert_eq!(body["entries"][0]["amountCents"], 2500);
}

#[tokio::test]
async fn test_entries_empty_for_unknown_owner() {
    let test_app = setup_test_app().await;
    seed_entries(&test_app.repo).await;

    let (status, body) = request(test_app.app, "/v1/entries?ownerAccountId=own_other").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entryCount"], 0);
}

#[tokio::test]
async fn test_entries_requires_owner_or_reference() {
    let test_app = setup_test_app().await;

    let (status, _body) = request(test_app.app, "/v1/entries").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_entries_rejects_reference_id_without_type() {
    let test_app = setup_test_app().await;

    let (status, _body) = request(test_app.app, "/v1/entries?referenceId=pur_1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_entries_rejects_unknown_reference_type() {
    let test_app = setup_test_app().await;

    let (status, _body) = request(
        test_app.app,
        "/v1/entries?referenceType=dispute&referenceId=pur_1",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_entries_rejects_invalid_time_window() {
    let test_app = setup_test_app().await;

    let (status, _body) = request(
        test_app.app,
        "/v1/entries?ownerAccountId=own_1&fromMs=2000&toMs=1000",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_entries_sorted_oldest_first() {
    let test_app = setup_test_app().await;
    seed_entries(&test_app.repo).await;

    let (_status, body) = request(test_app.app, "/v1/entries?ownerAccountId=own_1").await;

    let times: Vec<i64> = body["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["createdAtMs"].as_i64().unwrap())
        .collect();
    let mut sorted = times.clone();
    sorted.sort();
    assert_eq!(times, sorted);
}
