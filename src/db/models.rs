use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;
use sqlx::FromRow;
use uuid::Uuid;

pub const WALLET_STATUS_ACTIVE: &str = "active";
pub const WALLET_STATUS_FROZEN: &str = "frozen";
pub const WALLET_STATUS_CLOSED: &str = "closed";

pub const TRANSACTION_STATUS_SUCCESS: &str = "success";

pub const EVENT_TRANSACTION_CREATED: &str = "transaction_created";
pub const EVENT_TRANSACTION_COMPLETED: &str = "transaction_completed";

/// Per-user, per-currency balance record. One row per (user_id, currency);
/// the balance is only ever mutated by the transfer orchestrator's debit.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub currency: String,
    pub balance: BigDecimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Immutable record of one transfer that reached persistence.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub sender_user_id: Uuid,
    pub recipient_identifier: String,
    pub source_currency: String,
    pub destination_currency: String,
    pub amount: BigDecimal,
    pub fee_amount: BigDecimal,
    pub net_amount: BigDecimal,
    pub status: String,
    pub source_wallet_id: Uuid,
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Builds a transaction row for a same-currency transfer. Settlement is
    /// synchronous, so rows are born in their terminal `success` status.
    pub fn new(
        sender_user_id: Uuid,
        recipient_identifier: String,
        source_currency: String,
        amount: BigDecimal,
        fee_amount: BigDecimal,
        net_amount: BigDecimal,
        source_wallet_id: Uuid,
        idempotency_key: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_user_id,
            recipient_identifier,
            destination_currency: source_currency.clone(),
            source_currency,
            amount,
            fee_amount,
            net_amount,
            status: TRANSACTION_STATUS_SUCCESS.to_string(),
            source_wallet_id,
            idempotency_key,
            created_at: Utc::now(),
        }
    }
}

/// Append-only audit entry attached to a transaction.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEvent {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub event_type: String,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
