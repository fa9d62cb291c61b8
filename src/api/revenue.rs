use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::api::AppState;
use crate::domain::{EntryType, OwnerAccountId};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueQuery {
    pub owner_account_id: String,
    pub from_ms: Option<i64>,
    pub to_ms: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueResponse {
    pub owner_account_id: String,
    pub totals: Vec<RevenueBucketDto>,
    pub months: Vec<RevenueBucketDto>,
}

/// Signed sums by entry type for one aggregation bucket. `net_cents` is
/// the signed sum over every entry in the bucket: the owner's net
/// position movement.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueBucketDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    pub currency: String,
    pub charge_cents: i64,
    pub platform_fee_cents: i64,
    pub processor_fee_cents: i64,
    pub refund_cents: i64,
    pub net_cents: i64,
}

impl RevenueBucketDto {
    fn accumulate(&mut self, entry_type: EntryType, total_cents: i64) {
        match entry_type {
            EntryType::Charge => self.charge_cents += total_cents,
            EntryType::PlatformFee => self.platform_fee_cents += total_cents,
            EntryType::ProcessorFee => self.processor_fee_cents += total_cents,
            EntryType::Refund => self.refund_cents += total_cents,
        }
        self.net_cents += total_cents;
    }
}

/// Revenue aggregation for dashboards: per-currency totals plus a
/// month-by-month breakdown of signed sums by entry type.
pub async fn get_revenue(
    Query(params): Query<RevenueQuery>,
    State(state): State<AppState>,
) -> Result<Json<RevenueResponse>, AppError> {
    let owner = params.owner_account_id.trim();
    if owner.is_empty() {
        return Err(AppError::BadRequest("ownerAccountId is required".into()));
    }

    if let (Some(from), Some(to)) = (params.from_ms, params.to_ms) {
        if from > to {
            return Err(AppError::BadRequest("fromMs must be <= toMs".into()));
        }
    }

    let rows = state
        .repo
        .revenue_rows(
            &OwnerAccountId::new(owner),
            params.from_ms.unwrap_or(0),
            params.to_ms.unwrap_or(i64::MAX),
        )
        .await?;

    let mut months: BTreeMap<(String, String), RevenueBucketDto> = BTreeMap::new();
    let mut totals: BTreeMap<String, RevenueBucketDto> = BTreeMap::new();

    for row in rows {
        let currency = row.currency.to_string();

        let month_bucket = months
            .entry((row.month.clone(), currency.clone()))
            .or_insert_with(|| RevenueBucketDto {
                month: Some(row.month.clone()),
                currency: currency.clone(),
                ..Default::default()
            });
        month_bucket.accumulate(row.entry_type, row.total_cents);

        let total_bucket = totals
            .entry(currency.clone())
            .or_insert_with(|| RevenueBucketDto {
                month: None,
                currency,
                ..Default::default()
            });
        total_bucket.accumulate(row.entry_type, row.total_cents);
    }

    Ok(Json(RevenueResponse {
        owner_account_id: owner.to_string(),
        totals: totals.into_values().collect(),
        months: months.into_values().collect(),
    }))
}
