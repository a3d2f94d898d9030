//! Runway projection under growth/burn scenarios.
//!
//! Month-by-month extrapolation of the current run rate. Month 1 repeats the
//! summary's observed revenue/expenses; growth compounds from month 2.

use crate::{FinancialSummary, MoneyCents};

/// A what-if scenario applied to the current run rate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunwayScenario {
    /// Projection horizon in months.
    pub months: u32,
    /// Monthly revenue growth in percent, compounding.
    pub revenue_growth_pct: f64,
    /// Monthly expense growth in percent, compounding.
    pub expense_growth_pct: f64,
}

impl Default for RunwayScenario {
    fn default() -> Self {
        Self {
            months: 12,
            revenue_growth_pct: 0.0,
            expense_growth_pct: 0.0,
        }
    }
}

/// Projected cash position at the end of one month.
#[derive(Clone, Debug, PartialEq)]
pub struct MonthProjection {
    /// 1-based month offset from now.
    pub month: u32,
    pub revenue: MoneyCents,
    pub expenses: MoneyCents,
    pub net: MoneyCents,
    pub ending_balance: MoneyCents,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioProjection {
    pub months: Vec<MonthProjection>,
    /// First month whose ending balance is negative, if any within the
    /// horizon.
    pub cash_out_month: Option<u32>,
}

/// Projects the summary's run rate forward under the given scenario.
pub fn project(summary: &FinancialSummary, scenario: &RunwayScenario) -> ScenarioProjection {
    let revenue_factor = 1.0 + scenario.revenue_growth_pct / 100.0;
    let expense_factor = 1.0 + scenario.expense_growth_pct / 100.0;

    let mut months = Vec::with_capacity(scenario.months as usize);
    let mut balance = summary.total_balance;
    let mut revenue = summary.monthly_revenue;
    let mut expenses = summary.monthly_expenses;
    let mut cash_out_month = None;

    for month in 1..=scenario.months {
        if month > 1 {
            revenue = scale(revenue, revenue_factor);
            expenses = scale(expenses, expense_factor);
        }

        let net = revenue - expenses;
        balance += net;
        if cash_out_month.is_none() && balance.is_negative() {
            cash_out_month = Some(month);
        }

        months.push(MonthProjection {
            month,
            revenue,
            expenses,
            net,
            ending_balance: balance,
        });
    }

    ScenarioProjection {
        months,
        cash_out_month,
    }
}

fn scale(amount: MoneyCents, factor: f64) -> MoneyCents {
    MoneyCents::new((amount.cents() as f64 * factor).round() as i64)
}
