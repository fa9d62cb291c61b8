//! Inbound settlement triggers: the purchase-paid and refund-issued
//! events delivered by the checkout/payment-processing subsystem.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::entries::EntryDto;
use crate::api::AppState;
use crate::domain::{
    Currency, Money, OwnerAccountId, Purchase, PurchaseId, PurchaseStatus, RefundId, TimeMs,
};
use crate::engine::FeeSplit;
use crate::error::AppError;

/// "Purchase paid" event: the purchase, the split it was sold under, and
/// optionally the processor's actual fee reported at settlement time.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseSettlementRequest {
    pub purchase_id: String,
    pub owner_account_id: String,
    pub currency: String,
    pub gross_cents: i64,
    pub platform_fee_percent: u8,
    pub platform_fee_cents: i64,
    pub processor_fee_cents: i64,
    pub owner_net_cents: i64,
    #[serde(default)]
    pub actual_processor_fee_cents: Option<i64>,
    #[serde(default)]
    pub paid_at_ms: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementResponse {
    pub newly_recorded: bool,
    pub entry_count: i64,
    pub entries: Vec<EntryDto>,
}

pub async fn post_purchase_settlement(
    State(state): State<AppState>,
    Json(req): Json<PurchaseSettlementRequest>,
) -> Result<Json<SettlementResponse>, AppError> {
    if req.purchase_id.trim().is_empty() {
        return Err(AppError::BadRequest("purchaseId is required".into()));
    }

    let currency = Currency::new(req.currency);
    let split = FeeSplit {
        gross_cents: req.gross_cents,
        platform_fee_percent: req.platform_fee_percent,
        platform_fee_cents: req.platform_fee_cents,
        processor_fee_cents: req.processor_fee_cents,
        owner_net_cents: req.owner_net_cents,
    };
    let purchase = Purchase {
        id: PurchaseId::new(req.purchase_id),
        owner_account_id: OwnerAccountId::new(req.owner_account_id),
        gross: Money::new(split.gross_cents, currency.clone()),
        platform_fee: Money::new(split.platform_fee_cents, currency.clone()),
        processor_fee: Money::new(split.processor_fee_cents, currency.clone()),
        owner_net: Money::new(split.owner_net_cents, currency),
        platform_fee_percent: split.platform_fee_percent,
        status: PurchaseStatus::Pending,
        paid_at: req.paid_at_ms.map(TimeMs::new),
    };

    let result = state
        .writer
        .record_purchase_settlement(&purchase, &split, req.actual_processor_fee_cents)
        .await?;

    Ok(Json(SettlementResponse {
        newly_recorded: result.newly_recorded,
        entry_count: result.entries.len() as i64,
        entries: result.entries.into_iter().map(EntryDto::from).collect(),
    }))
}

/// "Refund issued" event against a previously settled purchase.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundSettlementRequest {
    pub purchase_id: String,
    pub refund_id: String,
    pub refund_cents: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundSettlementResponse {
    pub newly_recorded: bool,
    pub platform_fee_reversal_cents: i64,
    pub entry_count: i64,
    pub entries: Vec<EntryDto>,
}

pub async fn post_refund_settlement(
    State(state): State<AppState>,
    Json(req): Json<RefundSettlementRequest>,
) -> Result<Json<RefundSettlementResponse>, AppError> {
    if req.refund_id.trim().is_empty() {
        return Err(AppError::BadRequest("refundId is required".into()));
    }

    let purchase_id = PurchaseId::new(req.purchase_id);
    let purchase = state
        .repo
        .get_purchase(&purchase_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("purchase {} has no recorded settlement", purchase_id))
        })?;

    let result = state
        .writer
        .record_refund_settlement(&purchase, req.refund_cents, &RefundId::new(req.refund_id))
        .await?;

    Ok(Json(RefundSettlementResponse {
        newly_recorded: result.newly_recorded,
        platform_fee_reversal_cents: result.platform_fee_reversal_cents,
        entry_count: result.entries.len() as i64,
        entries: result.entries.into_iter().map(EntryDto::from).collect(),
    }))
}
