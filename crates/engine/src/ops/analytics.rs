use chrono::{DateTime, Utc};

use sea_orm::{QueryFilter, QueryOrder, prelude::*};

use crate::{
    CategorySpend, Engine, EngineError, FinancialSummary, ResultEngine, RunwayScenario,
    ScenarioProjection, Transaction, analytics, forecast, transactions,
};

/// Longest accepted projection horizon.
const MAX_PROJECTION_MONTHS: u32 = 120;

impl Engine {
    /// Month-to-date financial summary for one user: total balance across
    /// all accounts, revenue/expenses/burn for the calendar month around
    /// `now`, and the resulting runway.
    pub async fn financial_summary(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<FinancialSummary> {
        let accounts = self.list_accounts(user_id).await?;
        let month = self.month_transactions(user_id, now).await?;
        Ok(analytics::summarize(&accounts, &month))
    }

    /// Current month's expenses grouped by category.
    pub async fn expense_breakdown(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Vec<CategorySpend>> {
        let month = self.month_transactions(user_id, now).await?;
        Ok(analytics::expense_breakdown(&month))
    }

    /// Projects the current run rate forward under a growth/burn scenario.
    pub async fn runway_projection(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
        scenario: &RunwayScenario,
    ) -> ResultEngine<ScenarioProjection> {
        if scenario.months == 0 || scenario.months > MAX_PROJECTION_MONTHS {
            return Err(EngineError::InvalidAmount(format!(
                "projection horizon must be between 1 and {MAX_PROJECTION_MONTHS} months"
            )));
        }

        let summary = self.financial_summary(user_id, now).await?;
        Ok(forecast::project(&summary, scenario))
    }

    /// All of the user's transactions inside the calendar month around
    /// `now`, oldest first.
    async fn month_transactions(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Vec<Transaction>> {
        let (start, end) = analytics::month_bounds(now);

        let models = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::OccurredAt.gte(start))
            .filter(transactions::Column::OccurredAt.lt(end))
            .order_by_asc(transactions::Column::OccurredAt)
            .all(&self.database)
            .await?;

        models.into_iter().map(Transaction::try_from).collect()
    }
}
