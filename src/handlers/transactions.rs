use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::NaiveTime;
use serde::Deserialize;
use serde_json::json;
use sqlx::types::BigDecimal;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db::queries::TransactionFilter;
use crate::error::AppError;
use crate::services::CreateTransfer;
use crate::validation;
use crate::AppState;

pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

const DEFAULT_PAGE_LIMIT: i64 = 20;
const MAX_PAGE_LIMIT: i64 = 100;
const MAX_PAGE_OFFSET: i64 = 5000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionPayload {
    pub recipient_identifier: String,
    pub source_currency: String,
    pub amount: BigDecimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub status: Option<String>,
    pub source_currency: Option<String>,
    pub search: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

pub async fn create_transaction(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    headers: HeaderMap,
    Json(payload): Json<CreateTransactionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let recipient_identifier = validation::validate_recipient_identifier(&payload.recipient_identifier)?;
    let source_currency = validation::validate_currency_code(&payload.source_currency)?;
    validation::validate_amount(&payload.amount)?;

    let idempotency_key = match headers.get(IDEMPOTENCY_KEY_HEADER) {
        Some(value) => {
            let raw = value.to_str().map_err(|_| {
                AppError::Validation("Invalid Idempotency-Key header".to_string())
            })?;
            validation::validate_idempotency_key(raw)?;
            Some(raw.to_string())
        }
        None => None,
    };

    let outcome = state
        .transfers
        .create_transfer(CreateTransfer {
            sender: user_id,
            recipient_identifier,
            source_currency,
            amount: payload.amount,
            idempotency_key,
        })
        .await?;

    let status = if outcome.reused {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };

    Ok((status, Json(outcome.transaction)))
}

pub async fn list_transactions(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<TransactionsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);
    let offset = query.offset.unwrap_or(0).clamp(0, MAX_PAGE_OFFSET);

    let mut filter = TransactionFilter::default();

    if let Some(status) = &query.status {
        validation::validate_transaction_status(status)?;
        filter.status = Some(status.clone());
    }
    if let Some(currency) = &query.source_currency {
        filter.currency = Some(validation::validate_currency_code(currency)?);
    }
    if let Some(search) = &query.search {
        filter.search = Some(validation::validate_search_term(search)?);
    }

    let from = query
        .from
        .as_deref()
        .map(|raw| validation::parse_date_ymd("from", raw))
        .transpose()?;
    let to = query
        .to
        .as_deref()
        .map(|raw| validation::parse_date_ymd("to", raw))
        .transpose()?;

    if let (Some(from), Some(to)) = (from, to) {
        validation::validate_date_range(from, to)?;
    }

    filter.from = from.map(|date| date.and_time(NaiveTime::MIN).and_utc());
    // The `to` day is inclusive: filter up to the start of the next day.
    filter.until = to
        .map(|date| {
            date.succ_opt()
                .ok_or_else(|| AppError::Validation("to: date out of range".to_string()))
        })
        .transpose()?
        .map(|date| date.and_time(NaiveTime::MIN).and_utc());

    let page = state
        .transfers
        .list_transfers(user_id, &filter, limit, offset)
        .await?;

    Ok(Json(json!({
        "transactions": page.transactions,
        "meta": {
            "total": page.total,
            "hasMore": page.has_more,
            "limit": limit,
            "offset": offset,
        },
    })))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let transaction = state
        .transfers
        .get_transfer(user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Transaction {} not found", id)))?;

    Ok(Json(transaction))
}
