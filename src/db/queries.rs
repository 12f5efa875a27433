use chrono::{DateTime, Utc};
use sqlx::types::BigDecimal;
use sqlx::{PgPool, Postgres, QueryBuilder, Result, Transaction as SqlxTransaction};
use uuid::Uuid;

use crate::currency::DEFAULT_WALLET_CURRENCIES;
use crate::db::models::{
    Transaction, Wallet, EVENT_TRANSACTION_COMPLETED, EVENT_TRANSACTION_CREATED,
    WALLET_STATUS_ACTIVE,
};

// --- Wallet queries ---

pub async fn list_wallets(pool: &PgPool, user_id: Uuid) -> Result<Vec<Wallet>> {
    sqlx::query_as::<_, Wallet>("SELECT * FROM wallets WHERE user_id = $1 ORDER BY currency")
        .bind(user_id)
        .fetch_all(pool)
        .await
}

/// Seeds the fixed initial wallet set for a newly registered user.
/// Safe to call more than once.
pub async fn create_default_wallets(pool: &PgPool, user_id: Uuid) -> Result<()> {
    let currencies: Vec<String> = DEFAULT_WALLET_CURRENCIES
        .iter()
        .map(|code| code.to_string())
        .collect();

    sqlx::query(
        r#"
        INSERT INTO wallets (user_id, currency)
        SELECT $1, unnest($2::text[])
        ON CONFLICT (user_id, currency) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(&currencies)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetches the sender's active wallet in the given currency, taking an
/// exclusive row lock for the rest of the enclosing transaction. Concurrent
/// debits against the same wallet serialize here.
pub async fn get_active_wallet_for_update(
    executor: &mut SqlxTransaction<'_, Postgres>,
    user_id: Uuid,
    currency: &str,
) -> Result<Option<Wallet>> {
    sqlx::query_as::<_, Wallet>(
        r#"
        SELECT * FROM wallets
        WHERE user_id = $1 AND currency = $2 AND status = $3
        FOR UPDATE
        "#,
    )
    .bind(user_id)
    .bind(currency)
    .bind(WALLET_STATUS_ACTIVE)
    .fetch_optional(&mut **executor)
    .await
}

/// Unconditional decrement. The caller must have verified sufficiency under
/// the same row lock.
pub async fn debit_wallet(
    executor: &mut SqlxTransaction<'_, Postgres>,
    wallet_id: Uuid,
    amount: &BigDecimal,
) -> Result<()> {
    sqlx::query("UPDATE wallets SET balance = balance - $2, updated_at = NOW() WHERE id = $1")
        .bind(wallet_id)
        .bind(amount)
        .execute(&mut **executor)
        .await?;

    Ok(())
}

// --- Transaction queries ---

pub async fn find_transaction_by_idempotency_key<'e, E>(
    executor: E,
    sender_user_id: Uuid,
    idempotency_key: &str,
) -> Result<Option<Transaction>>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query_as::<_, Transaction>(
        r#"
        SELECT * FROM transactions
        WHERE sender_user_id = $1 AND idempotency_key = $2
        LIMIT 1
        "#,
    )
    .bind(sender_user_id)
    .bind(idempotency_key)
    .fetch_optional(executor)
    .await
}

pub async fn insert_transaction(
    executor: &mut SqlxTransaction<'_, Postgres>,
    tx: &Transaction,
) -> Result<Transaction> {
    sqlx::query_as::<_, Transaction>(
        r#"
        INSERT INTO transactions (
            id, sender_user_id, recipient_identifier, source_currency, destination_currency,
            amount, fee_amount, net_amount, status, source_wallet_id, idempotency_key, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *
        "#,
    )
    .bind(tx.id)
    .bind(tx.sender_user_id)
    .bind(&tx.recipient_identifier)
    .bind(&tx.source_currency)
    .bind(&tx.destination_currency)
    .bind(&tx.amount)
    .bind(&tx.fee_amount)
    .bind(&tx.net_amount)
    .bind(&tx.status)
    .bind(tx.source_wallet_id)
    .bind(&tx.idempotency_key)
    .bind(tx.created_at)
    .fetch_one(&mut **executor)
    .await
}

pub async fn get_transaction(
    pool: &PgPool,
    sender_user_id: Uuid,
    id: Uuid,
) -> Result<Option<Transaction>> {
    sqlx::query_as::<_, Transaction>(
        "SELECT * FROM transactions WHERE sender_user_id = $1 AND id = $2 LIMIT 1",
    )
    .bind(sender_user_id)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Listing filters. `until` is an exclusive upper bound on created_at.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub status: Option<String>,
    pub currency: Option<String>,
    pub search: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, sender_user_id: Uuid, filter: &TransactionFilter) {
    builder.push(" WHERE sender_user_id = ").push_bind(sender_user_id);

    if let Some(status) = &filter.status {
        builder.push(" AND status = ").push_bind(status.clone());
    }
    if let Some(currency) = &filter.currency {
        builder.push(" AND source_currency = ").push_bind(currency.clone());
    }
    if let Some(search) = &filter.search {
        builder
            .push(" AND recipient_identifier ILIKE ")
            .push_bind(format!("%{}%", escape_like(search)));
    }
    if let Some(from) = filter.from {
        builder.push(" AND created_at >= ").push_bind(from);
    }
    if let Some(until) = filter.until {
        builder.push(" AND created_at < ").push_bind(until);
    }
}

pub async fn count_transactions(
    pool: &PgPool,
    sender_user_id: Uuid,
    filter: &TransactionFilter,
) -> Result<i64> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM transactions");
    push_filters(&mut builder, sender_user_id, filter);

    let (total,): (i64,) = builder.build_query_as().fetch_one(pool).await?;
    Ok(total)
}

/// Ordered by (created_at DESC, id DESC); the id tie-break keeps pagination
/// stable for rows created in the same instant.
pub async fn list_transactions(
    pool: &PgPool,
    sender_user_id: Uuid,
    filter: &TransactionFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Transaction>> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM transactions");
    push_filters(&mut builder, sender_user_id, filter);
    builder
        .push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    builder.build_query_as::<Transaction>().fetch_all(pool).await
}

fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

// --- Transaction event queries ---

/// Appends the `created` and `completed` audit events for a transfer in a
/// single statement, inside the same unit of work as the ledger insert.
pub async fn insert_transaction_events(
    executor: &mut SqlxTransaction<'_, Postgres>,
    transaction_id: Uuid,
    created_details: serde_json::Value,
    completed_details: serde_json::Value,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO transaction_events (transaction_id, event_type, details)
        VALUES ($1, $2, $3), ($1, $4, $5)
        "#,
    )
    .bind(transaction_id)
    .bind(EVENT_TRANSACTION_CREATED)
    .bind(created_details)
    .bind(EVENT_TRANSACTION_COMPLETED)
    .bind(completed_details)
    .execute(&mut **executor)
    .await?;

    Ok(())
}
