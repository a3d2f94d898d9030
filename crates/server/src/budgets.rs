//! Budgets API endpoints

use api_types::budget::{
    BudgetReportResponse, BudgetSet, BudgetStatusView, BudgetView, BudgetsResponse,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{Budget, MoneyCents};

use crate::{ServerError, server::ServerState, user};

fn view(budget: Budget) -> BudgetView {
    BudgetView {
        id: budget.id,
        category: budget.category,
        monthly_limit: budget.monthly_limit.to_string(),
    }
}

pub async fn set(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetSet>,
) -> Result<(StatusCode, Json<BudgetView>), ServerError> {
    let monthly_limit: MoneyCents = payload.monthly_limit.parse()?;

    let budget = state
        .engine
        .set_budget(&user.username, &payload.category, monthly_limit)
        .await?;

    Ok((StatusCode::CREATED, Json(view(budget))))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<BudgetsResponse>, ServerError> {
    let budgets = state
        .engine
        .list_budgets(&user.username)
        .await?
        .into_iter()
        .map(view)
        .collect();

    Ok(Json(BudgetsResponse { budgets }))
}

pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(category): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_budget(&user.username, &category).await?;
    Ok(StatusCode::OK)
}

/// Current-month spend per budgeted category.
pub async fn report(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<BudgetReportResponse>, ServerError> {
    let budgets = state
        .engine
        .budget_report(&user.username, Utc::now())
        .await?
        .into_iter()
        .map(|status| BudgetStatusView {
            over_limit: status.over_limit(),
            category: status.category,
            monthly_limit: status.monthly_limit.to_string(),
            spent: status.spent.to_string(),
            remaining: status.remaining.to_string(),
        })
        .collect();

    Ok(Json(BudgetReportResponse { budgets }))
}
