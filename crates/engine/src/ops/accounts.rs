use chrono::{DateTime, Utc};
use uuid::Uuid;

use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, Statement, TransactionTrait, prelude::*};

use crate::{Account, AccountKind, Currency, Engine, EngineError, MoneyCents, ResultEngine, accounts};

use super::normalize_required_name;

impl Engine {
    /// Creates an account for a user.
    ///
    /// Account names are unique per user. The opening balance seeds both the
    /// live balance and the sync anchor.
    pub async fn create_account(
        &self,
        user_id: &str,
        name: &str,
        kind: AccountKind,
        opening_balance: MoneyCents,
        currency: Option<Currency>,
    ) -> ResultEngine<Account> {
        let name = normalize_required_name(name, "account")?;

        let existing = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id))
            .filter(accounts::Column::Name.eq(name.clone()))
            .one(&self.database)
            .await?;
        if existing.is_some() {
            return Err(EngineError::ExistingKey(name));
        }

        let account = Account::new(
            user_id.to_string(),
            name,
            kind,
            opening_balance,
            currency.unwrap_or_default(),
        );
        accounts::ActiveModel::from(&account)
            .insert(&self.database)
            .await?;

        Ok(account)
    }

    /// Lists all of a user's accounts, inactive included, in name order.
    pub async fn list_accounts(&self, user_id: &str) -> ResultEngine<Vec<Account>> {
        let models = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id))
            .order_by_asc(accounts::Column::Name)
            .all(&self.database)
            .await?;

        models.into_iter().map(Account::try_from).collect()
    }

    /// Returns one account owned by the user.
    pub async fn account(&self, account_id: Uuid, user_id: &str) -> ResultEngine<Account> {
        let model = self
            .require_account(&self.database, account_id, user_id)
            .await?;
        Account::try_from(model)
    }

    /// Marks an account inactive. Inactive accounts reject new transactions
    /// but still count toward the total balance.
    pub async fn deactivate_account(&self, account_id: Uuid, user_id: &str) -> ResultEngine<()> {
        let model = self
            .require_account(&self.database, account_id, user_id)
            .await?;

        let account_model = accounts::ActiveModel {
            id: ActiveValue::Set(model.id),
            active: ActiveValue::Set(false),
            ..Default::default()
        };
        account_model.update(&self.database).await?;
        Ok(())
    }

    /// Simulated bank sync: replays the account's full transaction history
    /// over the opening balance and writes the authoritative result.
    ///
    /// This is the only flow that recomputes a balance from history; normal
    /// writes adjust it incrementally.
    pub async fn sync_account(
        &self,
        account_id: Uuid,
        user_id: &str,
        synced_at: DateTime<Utc>,
    ) -> ResultEngine<Account> {
        let db_tx = self.database.begin().await?;

        let model = self.require_account(&db_tx, account_id, user_id).await?;

        let backend = self.database.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            "SELECT COALESCE(SUM(amount_minor), 0) AS sum \
             FROM transactions \
             WHERE account_id = ?",
            vec![account_id.to_string().into()],
        );
        let row = db_tx.query_one(stmt).await?;
        let ledger_delta: i64 = row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0);

        let balance_minor = model.opening_balance_minor + ledger_delta;
        let account_model = accounts::ActiveModel {
            id: ActiveValue::Set(model.id.clone()),
            balance_minor: ActiveValue::Set(balance_minor),
            last_synced_at: ActiveValue::Set(Some(synced_at)),
            ..Default::default()
        };
        account_model.update(&db_tx).await?;

        db_tx.commit().await?;

        Account::try_from(accounts::Model {
            balance_minor,
            last_synced_at: Some(synced_at),
            ..model
        })
    }

    /// Fetches an account model, hiding other users' accounts behind
    /// `KeyNotFound` instead of revealing their existence.
    pub(crate) async fn require_account<C: ConnectionTrait>(
        &self,
        db: &C,
        account_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<accounts::Model> {
        let model = accounts::Entity::find_by_id(account_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;

        if model.user_id != user_id {
            return Err(EngineError::KeyNotFound("account not exists".to_string()));
        }
        Ok(model)
    }
}
