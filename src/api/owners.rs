//! Minimal owner account provisioning so the fee recipient resolves
//! before settlements arrive.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::api::AppState;
use crate::domain::{OwnerAccount, OwnerAccountId, OwnerAccountStatus};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerAccountRequest {
    pub owner_account_id: String,
    pub payout_provider_ref: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerAccountResponse {
    pub owner_account_id: String,
    pub payout_provider_ref: String,
    pub status: String,
}

pub async fn upsert_owner_account(
    State(state): State<AppState>,
    Json(req): Json<OwnerAccountRequest>,
) -> Result<Json<OwnerAccountResponse>, AppError> {
    if req.owner_account_id.trim().is_empty() {
        return Err(AppError::BadRequest("ownerAccountId is required".into()));
    }
    if req.payout_provider_ref.trim().is_empty() {
        return Err(AppError::BadRequest("payoutProviderRef is required".into()));
    }

    let status = match req.status.as_deref() {
        None => OwnerAccountStatus::Active,
        Some(s) => OwnerAccountStatus::from_str(s)
            .map_err(|_| AppError::BadRequest("status must be active or disabled".into()))?,
    };

    let account = OwnerAccount {
        id: OwnerAccountId::new(req.owner_account_id.trim()),
        payout_provider_ref: req.payout_provider_ref.trim().to_string(),
        status,
    };
    state.repo.upsert_owner_account(&account).await?;

    Ok(Json(OwnerAccountResponse {
        owner_account_id: account.id.to_string(),
        payout_provider_ref: account.payout_provider_ref,
        status: account.status.as_str().to_string(),
    }))
}
