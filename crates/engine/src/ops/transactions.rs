use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::{
    ActiveValue, Condition, ConnectionTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*,
};

use crate::{
    Currency, Engine, EngineError, MoneyCents, ResultEngine, Transaction, TransactionKind,
    accounts, transactions,
};

use super::normalize_optional_text;

/// Payload for a new income or expense entry.
///
/// `amount` is the positive magnitude; the kind defines the stored sign.
#[derive(Clone, Debug)]
pub struct NewTransaction {
    pub account_id: Uuid,
    pub amount: MoneyCents,
    pub category: Option<String>,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Payload for a transfer between two of the user's accounts.
#[derive(Clone, Debug)]
pub struct TransferCmd {
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    pub amount: MoneyCents,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Filters for listing transactions.
///
/// `from` is inclusive and `to` is exclusive (`[from, to)`), both in UTC.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub account_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// If present, acts as an allow-list of kinds to return.
    pub kinds: Option<Vec<TransactionKind>>,
}

fn validate_list_filter(filter: &TransactionListFilter) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from >= to
    {
        return Err(EngineError::InvalidAmount(
            "invalid range: from must be < to".to_string(),
        ));
    }
    if filter.kinds.as_ref().is_some_and(|k| k.is_empty()) {
        return Err(EngineError::InvalidAmount(
            "kinds must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct TransactionsCursor {
    occurred_at: DateTime<Utc>,
    transaction_id: String,
}

impl TransactionsCursor {
    fn encode(&self) -> ResultEngine<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| EngineError::InvalidCursor("invalid transactions cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultEngine<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| EngineError::InvalidCursor("invalid transactions cursor".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| EngineError::InvalidCursor("invalid transactions cursor".to_string()))
    }
}

impl Engine {
    /// Records an income entry (increases the account balance).
    pub async fn income(&self, user_id: &str, cmd: NewTransaction) -> ResultEngine<Uuid> {
        self.record(user_id, TransactionKind::Income, cmd).await
    }

    /// Records an expense entry (decreases the account balance).
    pub async fn expense(&self, user_id: &str, cmd: NewTransaction) -> ResultEngine<Uuid> {
        self.record(user_id, TransactionKind::Expense, cmd).await
    }

    async fn record(
        &self,
        user_id: &str,
        kind: TransactionKind,
        cmd: NewTransaction,
    ) -> ResultEngine<Uuid> {
        if !cmd.amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }

        let db_tx = self.database.begin().await?;

        let account = self.require_account(&db_tx, cmd.account_id, user_id).await?;
        if !account.active {
            return Err(EngineError::InvalidAccount(
                "account is inactive".to_string(),
            ));
        }

        let signed = match kind {
            TransactionKind::Expense => -cmd.amount,
            TransactionKind::Income | TransactionKind::Transfer => cmd.amount,
        };
        let tx = Transaction::new(
            cmd.account_id,
            user_id.to_string(),
            kind,
            cmd.occurred_at,
            signed,
            Currency::try_from(account.currency.as_str()).unwrap_or_default(),
            normalize_optional_text(cmd.category.as_deref()),
            normalize_optional_text(cmd.note.as_deref()),
        );
        transactions::ActiveModel::from(&tx).insert(&db_tx).await?;

        Self::apply_balance_delta(&db_tx, &account, signed.cents()).await?;

        db_tx.commit().await?;
        Ok(tx.id)
    }

    /// Moves money between two of the user's accounts.
    ///
    /// Writes one negative and one positive `transfer` row atomically; the
    /// pair never contributes to income/expense aggregates.
    pub async fn transfer(&self, user_id: &str, cmd: TransferCmd) -> ResultEngine<(Uuid, Uuid)> {
        if !cmd.amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }
        if cmd.from_account_id == cmd.to_account_id {
            return Err(EngineError::InvalidAccount(
                "from_account_id and to_account_id must differ".to_string(),
            ));
        }

        let db_tx = self.database.begin().await?;

        let from = self
            .require_account(&db_tx, cmd.from_account_id, user_id)
            .await?;
        let to = self
            .require_account(&db_tx, cmd.to_account_id, user_id)
            .await?;
        if from.currency != to.currency {
            return Err(EngineError::CurrencyMismatch(format!(
                "cannot transfer {} into {}",
                from.currency, to.currency
            )));
        }

        let currency = Currency::try_from(from.currency.as_str()).unwrap_or_default();
        let note = normalize_optional_text(cmd.note.as_deref());
        let out = Transaction::new(
            cmd.from_account_id,
            user_id.to_string(),
            TransactionKind::Transfer,
            cmd.occurred_at,
            -cmd.amount,
            currency,
            None,
            note.clone(),
        );
        let into = Transaction::new(
            cmd.to_account_id,
            user_id.to_string(),
            TransactionKind::Transfer,
            cmd.occurred_at,
            cmd.amount,
            currency,
            None,
            note,
        );
        transactions::ActiveModel::from(&out).insert(&db_tx).await?;
        transactions::ActiveModel::from(&into).insert(&db_tx).await?;

        Self::apply_balance_delta(&db_tx, &from, -cmd.amount.cents()).await?;
        Self::apply_balance_delta(&db_tx, &to, cmd.amount.cents()).await?;

        db_tx.commit().await?;
        Ok((out.id, into.id))
    }

    /// Sets or clears the category label of an existing transaction.
    pub async fn categorize_transaction(
        &self,
        user_id: &str,
        transaction_id: Uuid,
        category: Option<&str>,
    ) -> ResultEngine<()> {
        let model = self
            .require_transaction(&self.database, transaction_id, user_id)
            .await?;

        let tx_model = transactions::ActiveModel {
            id: ActiveValue::Set(model.id),
            category: ActiveValue::Set(normalize_optional_text(category)),
            ..Default::default()
        };
        tx_model.update(&self.database).await?;
        Ok(())
    }

    /// Deletes a transaction and reverts its balance effect atomically.
    pub async fn delete_transaction(
        &self,
        user_id: &str,
        transaction_id: Uuid,
    ) -> ResultEngine<()> {
        let db_tx = self.database.begin().await?;

        let model = self
            .require_transaction(&db_tx, transaction_id, user_id)
            .await?;
        let account_id = Uuid::parse_str(&model.account_id)
            .map_err(|_| EngineError::KeyNotFound("account not exists".to_string()))?;
        let account = self.require_account(&db_tx, account_id, user_id).await?;

        transactions::Entity::delete_by_id(model.id.clone())
            .exec(&db_tx)
            .await?;
        Self::apply_balance_delta(&db_tx, &account, -model.amount_minor).await?;

        db_tx.commit().await?;
        Ok(())
    }

    /// Lists a user's transactions, newest first, with cursor-based
    /// pagination.
    ///
    /// Pagination is newest → older by `(occurred_at DESC, id DESC)`; the
    /// returned cursor is opaque to clients.
    pub async fn list_transactions(
        &self,
        user_id: &str,
        limit: u64,
        cursor: Option<&str>,
        filter: &TransactionListFilter,
    ) -> ResultEngine<(Vec<Transaction>, Option<String>)> {
        validate_list_filter(filter)?;

        let mut query = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .order_by_desc(transactions::Column::OccurredAt)
            .order_by_desc(transactions::Column::Id)
            .limit(limit.saturating_add(1));

        if let Some(account_id) = filter.account_id {
            query = query.filter(transactions::Column::AccountId.eq(account_id.to_string()));
        }
        if let Some(from) = filter.from {
            query = query.filter(transactions::Column::OccurredAt.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(transactions::Column::OccurredAt.lt(to));
        }
        if let Some(kinds) = &filter.kinds {
            let kinds: Vec<String> = kinds.iter().map(|k| k.as_str().to_string()).collect();
            query = query.filter(transactions::Column::Kind.is_in(kinds));
        }

        if let Some(cursor) = cursor {
            let cursor = TransactionsCursor::decode(cursor)?;
            query = query.filter(
                Condition::any()
                    .add(transactions::Column::OccurredAt.lt(cursor.occurred_at))
                    .add(
                        Condition::all()
                            .add(transactions::Column::OccurredAt.eq(cursor.occurred_at))
                            .add(transactions::Column::Id.lt(cursor.transaction_id)),
                    ),
            );
        }

        let mut models = query.all(&self.database).await?;

        let next_cursor = if models.len() as u64 > limit {
            models.truncate(limit as usize);
            match models.last() {
                Some(last) => Some(
                    TransactionsCursor {
                        occurred_at: last.occurred_at,
                        transaction_id: last.id.clone(),
                    }
                    .encode()?,
                ),
                None => None,
            }
        } else {
            None
        };

        let transactions = models
            .into_iter()
            .map(Transaction::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;

        Ok((transactions, next_cursor))
    }

    async fn apply_balance_delta<C: ConnectionTrait>(
        db: &C,
        account: &accounts::Model,
        delta_minor: i64,
    ) -> ResultEngine<()> {
        let account_model = accounts::ActiveModel {
            id: ActiveValue::Set(account.id.clone()),
            balance_minor: ActiveValue::Set(account.balance_minor + delta_minor),
            ..Default::default()
        };
        account_model.update(db).await?;
        Ok(())
    }

    /// Fetches a transaction model, hiding other users' rows behind
    /// `KeyNotFound`.
    async fn require_transaction<C: ConnectionTrait>(
        &self,
        db: &C,
        transaction_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<transactions::Model> {
        let model = transactions::Entity::find_by_id(transaction_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;

        if model.user_id != user_id {
            return Err(EngineError::KeyNotFound(
                "transaction not exists".to_string(),
            ));
        }
        Ok(model)
    }
}
