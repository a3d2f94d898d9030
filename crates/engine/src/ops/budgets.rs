use chrono::{DateTime, Utc};

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, prelude::*};

use crate::{Budget, BudgetStatus, Engine, EngineError, MoneyCents, ResultEngine, budgets};

use super::normalize_required_name;

impl Engine {
    /// Creates or replaces the monthly budget for one category.
    pub async fn set_budget(
        &self,
        user_id: &str,
        category: &str,
        monthly_limit: MoneyCents,
    ) -> ResultEngine<Budget> {
        if !monthly_limit.is_positive() {
            return Err(EngineError::InvalidAmount(
                "monthly limit must be > 0".to_string(),
            ));
        }
        let category = normalize_required_name(category, "category")?;

        let existing = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id))
            .filter(budgets::Column::Category.eq(category.clone()))
            .one(&self.database)
            .await?;

        match existing {
            Some(model) => {
                let budget_model = budgets::ActiveModel {
                    id: ActiveValue::Set(model.id.clone()),
                    monthly_limit_minor: ActiveValue::Set(monthly_limit.cents()),
                    ..Default::default()
                };
                budget_model.update(&self.database).await?;
                Budget::try_from(budgets::Model {
                    monthly_limit_minor: monthly_limit.cents(),
                    ..model
                })
            }
            None => {
                let budget = Budget::new(user_id.to_string(), category, monthly_limit);
                budgets::ActiveModel::from(&budget)
                    .insert(&self.database)
                    .await?;
                Ok(budget)
            }
        }
    }

    /// Lists a user's budgets in category order.
    pub async fn list_budgets(&self, user_id: &str) -> ResultEngine<Vec<Budget>> {
        let models = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id))
            .order_by_asc(budgets::Column::Category)
            .all(&self.database)
            .await?;

        models.into_iter().map(Budget::try_from).collect()
    }

    /// Removes the budget for one category.
    pub async fn delete_budget(&self, user_id: &str, category: &str) -> ResultEngine<()> {
        let category = normalize_required_name(category, "category")?;
        let model = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id))
            .filter(budgets::Column::Category.eq(category.clone()))
            .one(&self.database)
            .await?
            .ok_or(EngineError::KeyNotFound(category))?;

        budgets::Entity::delete_by_id(model.id)
            .exec(&self.database)
            .await?;
        Ok(())
    }

    /// Compares each budget against the current month's actual spend in its
    /// category (same grouping rules as the expense breakdown, so a budget
    /// may target `"Uncategorized"`).
    pub async fn budget_report(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Vec<BudgetStatus>> {
        let budgets = self.list_budgets(user_id).await?;
        let breakdown = self.expense_breakdown(user_id, now).await?;

        Ok(budgets
            .into_iter()
            .map(|budget| {
                let spent = breakdown
                    .iter()
                    .find(|slice| slice.category == budget.category)
                    .map(|slice| slice.amount)
                    .unwrap_or(MoneyCents::ZERO);
                BudgetStatus {
                    remaining: budget.monthly_limit - spent,
                    category: budget.category,
                    monthly_limit: budget.monthly_limit,
                    spent,
                }
            })
            .collect())
    }
}
