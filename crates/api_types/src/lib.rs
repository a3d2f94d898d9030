//! Request/response types shared by the Glidepath server and its clients.
//!
//! Monetary amounts in CRUD payloads travel as decimal strings and are
//! validated server-side on ingestion; analytics responses use `f64` because
//! they carry ratios alongside sums.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
}

pub mod account {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AccountKind {
        Checking,
        Savings,
        Credit,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub name: String,
        pub kind: AccountKind,
        /// Decimal string, e.g. `"45000.00"`.
        pub opening_balance: String,
        pub currency: Option<Currency>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: Uuid,
        pub name: String,
        pub kind: AccountKind,
        /// Decimal string, e.g. `"45000.00"`.
        pub balance: String,
        pub currency: Currency,
        pub active: bool,
        /// RFC3339 timestamp of the last simulated bank sync, if any.
        pub last_synced_at: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountsResponse {
        pub accounts: Vec<AccountView>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Income,
        Expense,
        Transfer,
    }

    /// Body for `POST /income` and `POST /expense`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryNew {
        pub account_id: Uuid,
        /// Positive decimal string; the endpoint defines the sign.
        pub amount: String,
        pub category: Option<String>,
        pub note: Option<String>,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub occurred_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferNew {
        pub from_account_id: Uuid,
        pub to_account_id: Uuid,
        /// Positive decimal string.
        pub amount: String,
        pub note: Option<String>,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub occurred_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferCreated {
        pub out_id: Uuid,
        pub in_id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionList {
        pub account_id: Option<Uuid>,
        pub from: Option<DateTime<FixedOffset>>,
        pub to: Option<DateTime<FixedOffset>>,
        pub kinds: Option<Vec<TransactionKind>>,
        pub limit: Option<u64>,
        /// Opaque pagination cursor (base64), from `next_cursor`.
        ///
        /// Newest → older pagination.
        pub cursor: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub account_id: Uuid,
        pub kind: TransactionKind,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub occurred_at: DateTime<FixedOffset>,
        /// Signed decimal string: income positive, expense negative.
        pub amount: String,
        pub category: Option<String>,
        pub note: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
        /// Opaque cursor for fetching the next page (older items).
        pub next_cursor: Option<String>,
    }

    /// Body for `PATCH /transactions/{id}/category`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        /// `None` clears the category.
        pub category: Option<String>,
    }
}

pub mod budget {
    use super::*;

    /// Body for `POST /budgets` (upsert per category).
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetSet {
        pub category: String,
        /// Positive decimal string.
        pub monthly_limit: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetView {
        pub id: Uuid,
        pub category: String,
        pub monthly_limit: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetsResponse {
        pub budgets: Vec<BudgetView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetStatusView {
        pub category: String,
        pub monthly_limit: String,
        pub spent: String,
        /// Negative when over budget.
        pub remaining: String,
        pub over_limit: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetReportResponse {
        pub budgets: Vec<BudgetStatusView>,
    }
}

pub mod analytics {
    use super::*;

    /// Month-to-date position. Amounts are major units as `f64`;
    /// `runway_months` is `999` when the burn is zero or negative.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct FinancialSummaryResponse {
        pub total_balance: f64,
        pub monthly_revenue: f64,
        pub monthly_expenses: f64,
        pub monthly_burn: f64,
        pub runway_months: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategorySpendView {
        pub category: String,
        pub amount: f64,
        pub percentage: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseBreakdownResponse {
        pub categories: Vec<CategorySpendView>,
    }

    /// Body for `POST /runway/projection`. Missing fields fall back to a
    /// flat 12-month scenario.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RunwayScenarioRequest {
        pub months: Option<u32>,
        pub revenue_growth_pct: Option<f64>,
        pub expense_growth_pct: Option<f64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthProjectionView {
        pub month: u32,
        pub revenue: f64,
        pub expenses: f64,
        pub net: f64,
        pub ending_balance: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RunwayProjectionResponse {
        pub months: Vec<MonthProjectionView>,
        /// First projected month whose ending balance is negative, if any.
        pub cash_out_month: Option<u32>,
    }
}
