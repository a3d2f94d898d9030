//! Analytics API endpoints: summary, expense breakdown, runway projection.

use api_types::analytics::{
    CategorySpendView, ExpenseBreakdownResponse, FinancialSummaryResponse, MonthProjectionView,
    RunwayProjectionResponse, RunwayScenarioRequest,
};
use axum::{Extension, Json, extract::State};
use chrono::Utc;
use engine::RunwayScenario;

use crate::{ServerError, server::ServerState, user};

/// Month-to-date totals and runway for the authenticated user.
pub async fn summary(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<FinancialSummaryResponse>, ServerError> {
    let summary = state
        .engine
        .financial_summary(&user.username, Utc::now())
        .await?;

    Ok(Json(FinancialSummaryResponse {
        total_balance: summary.total_balance.to_major_f64(),
        monthly_revenue: summary.monthly_revenue.to_major_f64(),
        monthly_expenses: summary.monthly_expenses.to_major_f64(),
        monthly_burn: summary.monthly_burn.to_major_f64(),
        runway_months: summary.runway_months,
    }))
}

/// Current month's expenses grouped by category.
pub async fn breakdown(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<ExpenseBreakdownResponse>, ServerError> {
    let categories = state
        .engine
        .expense_breakdown(&user.username, Utc::now())
        .await?
        .into_iter()
        .map(|slice| CategorySpendView {
            category: slice.category,
            amount: slice.amount.to_major_f64(),
            percentage: slice.percentage,
        })
        .collect();

    Ok(Json(ExpenseBreakdownResponse { categories }))
}

/// What-if projection of the current run rate.
pub async fn projection(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<RunwayScenarioRequest>,
) -> Result<Json<RunwayProjectionResponse>, ServerError> {
    let defaults = RunwayScenario::default();
    let scenario = RunwayScenario {
        months: payload.months.unwrap_or(defaults.months),
        revenue_growth_pct: payload
            .revenue_growth_pct
            .unwrap_or(defaults.revenue_growth_pct),
        expense_growth_pct: payload
            .expense_growth_pct
            .unwrap_or(defaults.expense_growth_pct),
    };

    let projection = state
        .engine
        .runway_projection(&user.username, Utc::now(), &scenario)
        .await?;

    Ok(Json(RunwayProjectionResponse {
        months: projection
            .months
            .into_iter()
            .map(|month| MonthProjectionView {
                month: month.month,
                revenue: month.revenue.to_major_f64(),
                expenses: month.expenses.to_major_f64(),
                net: month.net.to_major_f64(),
                ending_balance: month.ending_balance.to_major_f64(),
            })
            .collect(),
        cash_out_month: projection.cash_out_month,
    }))
}
