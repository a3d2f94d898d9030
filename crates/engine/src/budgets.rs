//! Budget primitives.
//!
//! A `Budget` caps the monthly spend of one expense category for one user.
//! Budgets do not block transactions; `Engine::budget_report` compares them
//! against the current month's actual spend.

use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, MoneyCents};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Budget {
    pub id: Uuid,
    pub user_id: String,
    pub category: String,
    pub monthly_limit: MoneyCents,
}

impl Budget {
    pub fn new(user_id: String, category: String, monthly_limit: MoneyCents) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            category,
            monthly_limit,
        }
    }
}

/// Current-month spend of a budgeted category versus its limit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BudgetStatus {
    pub category: String,
    pub monthly_limit: MoneyCents,
    pub spent: MoneyCents,
    /// `monthly_limit - spent`; negative when over budget.
    pub remaining: MoneyCents,
}

impl BudgetStatus {
    #[must_use]
    pub fn over_limit(&self) -> bool {
        self.remaining.is_negative()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub category: String,
    pub monthly_limit_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Budget> for ActiveModel {
    fn from(budget: &Budget) -> Self {
        Self {
            id: ActiveValue::Set(budget.id.to_string()),
            user_id: ActiveValue::Set(budget.user_id.clone()),
            category: ActiveValue::Set(budget.category.clone()),
            monthly_limit_minor: ActiveValue::Set(budget.monthly_limit.cents()),
        }
    }
}

impl TryFrom<Model> for Budget {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("budget not exists".to_string()))?,
            user_id: model.user_id,
            category: model.category,
            monthly_limit: MoneyCents::new(model.monthly_limit_minor),
        })
    }
}
