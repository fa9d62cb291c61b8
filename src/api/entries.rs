use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::api::AppState;
use crate::domain::{LedgerEntry, OwnerAccountId, ReferenceType};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntriesQuery {
    pub owner_account_id: Option<String>,
    pub reference_type: Option<String>,
    pub reference_id: Option<String>,
    pub from_ms: Option<i64>,
    pub to_ms: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntriesResponse {
    pub entry_count: i64,
    pub entries: Vec<EntryDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDto {
    pub id: String,
    pub owner_account_id: String,
    pub entry_type: String,
    pub amount_cents: i64,
    pub currency: String,
    pub reference_type: String,
    pub reference_id: String,
    pub description: String,
    pub created_at_ms: i64,
}

impl From<LedgerEntry> for EntryDto {
    fn from(e: LedgerEntry) -> Self {
        EntryDto {
            id: e.id,
            owner_account_id: e.owner_account_id.to_string(),
            entry_type: e.entry_type.as_str().to_string(),
            amount_cents: e.amount.cents(),
            currency: e.amount.currency().to_string(),
            reference_type: e.reference_type.as_str().to_string(),
            reference_id: e.reference_id,
            description: e.description,
            created_at_ms: e.created_at.as_ms(),
        }
    }
}

/// Audit/timeline reads: either all entries for one reference, or an
/// owner's entries within a time window.
pub async fn get_entries(
    Query(params): Query<EntriesQuery>,
    State(state): State<AppState>,
) -> Result<Json<EntriesResponse>, AppError> {
    let entries = if let Some(reference_id) = params.reference_id.as_deref() {
        let reference_type = params
            .reference_type
            .as_deref()
            .ok_or_else(|| {
                AppError::BadRequest("referenceType is required with referenceId".into())
            })
            .and_then(|s| {
                ReferenceType::from_str(s).map_err(|_| {
                    AppError::BadRequest("referenceType must be purchase or refund".into())
                })
            })?;

        state
            .repo
            .entries_for_reference(reference_type, reference_id)
            .await?
    } else {
        let owner = params
            .owner_account_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                AppError::BadRequest("ownerAccountId or referenceId is required".into())
            })?;

        if let (Some(from), Some(to)) = (params.from_ms, params.to_ms) {
            if from > to {
                return Err(AppError::BadRequest("fromMs must be <= toMs".into()));
            }
        }

        state
            .repo
            .query_entries(
                &OwnerAccountId::new(owner),
                params.from_ms.unwrap_or(0),
                params.to_ms.unwrap_or(i64::MAX),
            )
            .await?
    };

    let entry_count = entries.len() as i64;
    let entries = entries.into_iter().map(EntryDto::from).collect();

    Ok(Json(EntriesResponse {
        entry_count,
        entries,
    }))
}
