//! Transfer orchestration: the only code path that moves money.
//!
//! Every transfer runs inside one database transaction: lock wallet,
//! validate, compute fee, insert the ledger row, debit the wallet, append
//! audit events, commit. Any failure rolls the whole unit of work back, so
//! no partial ledger row or partial debit can ever persist.

use serde_json::json;
use sqlx::types::BigDecimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::currency;
use crate::db::models::Transaction;
use crate::db::queries::{self, TransactionFilter};
use crate::error::AppError;
use crate::fees;

#[derive(Debug, Clone)]
pub struct CreateTransfer {
    pub sender: Uuid,
    pub recipient_identifier: String,
    pub source_currency: String,
    pub amount: BigDecimal,
    pub idempotency_key: Option<String>,
}

#[derive(Debug)]
pub struct TransferOutcome {
    pub transaction: Transaction,
    /// True when an earlier transfer with the same idempotency key was
    /// returned instead of creating a new one.
    pub reused: bool,
}

#[derive(Debug)]
pub struct TransferPage {
    pub transactions: Vec<Transaction>,
    pub total: i64,
    pub has_more: bool,
}

#[derive(Clone)]
pub struct TransferService {
    pool: PgPool,
}

impl TransferService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_transfer(
        &self,
        request: CreateTransfer,
    ) -> Result<TransferOutcome, AppError> {
        let class = currency::classify(&request.source_currency).ok_or_else(|| {
            AppError::Validation(format!(
                "currency: unsupported currency: {}",
                request.source_currency
            ))
        })?;

        let mut tx = self.pool.begin().await?;

        // Fast path: a retry of an already-committed transfer short-circuits
        // before any wallet work.
        if let Some(key) = request.idempotency_key.as_deref() {
            if let Some(existing) =
                queries::find_transaction_by_idempotency_key(&mut *tx, request.sender, key).await?
            {
                tx.commit().await?;
                return Ok(TransferOutcome {
                    transaction: existing,
                    reused: true,
                });
            }
        }

        let wallet =
            queries::get_active_wallet_for_update(&mut tx, request.sender, &request.source_currency)
                .await?
                .ok_or(AppError::WalletNotFound)?;

        if wallet.balance < request.amount {
            // A concurrent duplicate may have debited this wallet while we
            // waited on its lock; prefer its committed row over a spurious
            // failure.
            tx.rollback().await?;
            if let Some(existing) = self
                .resolve_duplicate(request.sender, request.idempotency_key.as_deref())
                .await?
            {
                return Ok(TransferOutcome {
                    transaction: existing,
                    reused: true,
                });
            }
            return Err(AppError::InsufficientBalance);
        }

        let breakdown = fees::compute_fee(&request.amount, class)?;

        let record = Transaction::new(
            request.sender,
            request.recipient_identifier.clone(),
            request.source_currency.clone(),
            request.amount.clone(),
            breakdown.fee,
            breakdown.net,
            wallet.id,
            request.idempotency_key.clone(),
        );

        let inserted = match queries::insert_transaction(&mut tx, &record).await {
            Ok(inserted) => inserted,
            Err(err) if is_unique_violation(&err) => {
                // Lost the insert race to a concurrent request with the same
                // key. The unique constraint guarantees the winner's row is
                // committed by now; resolve against it.
                tx.rollback().await?;
                if let Some(existing) = self
                    .resolve_duplicate(request.sender, request.idempotency_key.as_deref())
                    .await?
                {
                    return Ok(TransferOutcome {
                        transaction: existing,
                        reused: true,
                    });
                }
                return Err(err.into());
            }
            Err(err) => return Err(err.into()),
        };

        queries::debit_wallet(&mut tx, wallet.id, &request.amount).await?;

        queries::insert_transaction_events(
            &mut tx,
            inserted.id,
            json!({
                "user_id": inserted.sender_user_id,
                "amount": inserted.amount.to_string(),
                "currency": inserted.source_currency,
            }),
            json!({ "status": inserted.status }),
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            transaction_id = %inserted.id,
            sender = %inserted.sender_user_id,
            currency = %inserted.source_currency,
            amount = %inserted.amount,
            fee = %inserted.fee_amount,
            "transfer created"
        );

        Ok(TransferOutcome {
            transaction: inserted,
            reused: false,
        })
    }

    /// Fallback lookup for the loser of an idempotency race, run outside the
    /// aborted unit of work.
    async fn resolve_duplicate(
        &self,
        sender: Uuid,
        idempotency_key: Option<&str>,
    ) -> Result<Option<Transaction>, AppError> {
        match idempotency_key {
            Some(key) => Ok(queries::find_transaction_by_idempotency_key(
                &self.pool, sender, key,
            )
            .await?),
            None => Ok(None),
        }
    }

    pub async fn list_transfers(
        &self,
        sender: Uuid,
        filter: &TransactionFilter,
        limit: i64,
        offset: i64,
    ) -> Result<TransferPage, AppError> {
        let total = queries::count_transactions(&self.pool, sender, filter).await?;
        let transactions =
            queries::list_transactions(&self.pool, sender, filter, limit, offset).await?;

        Ok(TransferPage {
            transactions,
            total,
            has_more: offset + limit < total,
        })
    }

    pub async fn get_transfer(
        &self,
        sender: Uuid,
        id: Uuid,
    ) -> Result<Option<Transaction>, AppError> {
        Ok(queries::get_transaction(&self.pool, sender, id).await?)
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map_or(false, |db| db.is_unique_violation())
}
