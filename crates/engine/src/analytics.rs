//! Financial analytics over one user's accounts and transactions.
//!
//! Pure aggregation: these functions take already-fetched collections and
//! never touch storage, so `Engine` ops and tests share the same arithmetic.
//! All sums run on [`MoneyCents`]; `f64` appears only in ratios (runway,
//! percentages).

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};

use crate::{Account, MoneyCents, Transaction, TransactionKind};

/// Runway reported when the user is not burning cash.
///
/// Kept at `999` for dashboard compatibility; clients render it as
/// "effectively infinite".
pub const INFINITE_RUNWAY_MONTHS: f64 = 999.0;

/// Group label for expenses without a category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// One user's month-to-date financial position.
#[derive(Clone, Debug, PartialEq)]
pub struct FinancialSummary {
    /// Sum over **all** accounts, inactive included.
    pub total_balance: MoneyCents,
    pub monthly_revenue: MoneyCents,
    /// Absolute spend; stored expense signs do not matter.
    pub monthly_expenses: MoneyCents,
    /// `monthly_expenses - monthly_revenue`; negative means net positive
    /// cash flow.
    pub monthly_burn: MoneyCents,
    /// `total_balance / monthly_burn` months, or [`INFINITE_RUNWAY_MONTHS`]
    /// when the burn is zero or negative.
    pub runway_months: f64,
}

/// Month-to-date spend of one expense category.
#[derive(Clone, Debug, PartialEq)]
pub struct CategorySpend {
    pub category: String,
    pub amount: MoneyCents,
    /// Share of the month's total expenses, `0` when there are none.
    pub percentage: f64,
}

/// Calendar-month window around `now`: `[first day 00:00, first day of the
/// next month 00:00)`, on the UTC calendar.
pub fn month_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let (year, month) = (now.year(), now.month());
    let start = start_of_month(year, month);
    let end = if month == 12 {
        start_of_month(year + 1, 1)
    } else {
        start_of_month(year, month + 1)
    };
    (start, end)
}

fn start_of_month(year: i32, month: u32) -> DateTime<Utc> {
    // Day 1 exists in every month; the fallback is unreachable.
    NaiveDate::from_ymd_opt(year, month, 1)
        .unwrap_or(NaiveDate::MIN)
        .and_time(NaiveTime::MIN)
        .and_utc()
}

/// Computes the financial summary from a user's accounts and their current
/// month's transactions.
///
/// Transfers are excluded from both revenue and expenses. Expense amounts are
/// summed as absolute values, income amounts as stored.
pub fn summarize(accounts: &[Account], month_transactions: &[Transaction]) -> FinancialSummary {
    let total_balance: MoneyCents = accounts.iter().map(|account| account.balance).sum();

    let (monthly_revenue, monthly_expenses) = month_transactions.iter().fold(
        (MoneyCents::ZERO, MoneyCents::ZERO),
        |(revenue, expenses), tx| match tx.kind {
            TransactionKind::Income => (revenue + tx.amount, expenses),
            TransactionKind::Expense => (revenue, expenses + tx.amount.abs()),
            TransactionKind::Transfer => (revenue, expenses),
        },
    );

    let monthly_burn = monthly_expenses - monthly_revenue;
    let runway_months = if monthly_burn.is_positive() {
        total_balance.cents() as f64 / monthly_burn.cents() as f64
    } else {
        INFINITE_RUNWAY_MONTHS
    };

    FinancialSummary {
        total_balance,
        monthly_revenue,
        monthly_expenses,
        monthly_burn,
        runway_months,
    }
}

/// Groups the current month's expenses by category.
///
/// Null, empty, and whitespace-only categories fall under
/// [`UNCATEGORIZED`]. Groups keep first-seen order; callers must not rely on
/// it.
pub fn expense_breakdown(month_transactions: &[Transaction]) -> Vec<CategorySpend> {
    let mut groups: Vec<(String, MoneyCents)> = Vec::new();

    for tx in month_transactions
        .iter()
        .filter(|tx| tx.kind == TransactionKind::Expense)
    {
        let label = tx
            .category
            .as_deref()
            .map(str::trim)
            .filter(|category| !category.is_empty())
            .unwrap_or(UNCATEGORIZED);

        match groups.iter_mut().find(|(name, _)| name == label) {
            Some((_, total)) => *total += tx.amount.abs(),
            None => groups.push((label.to_string(), tx.amount.abs())),
        }
    }

    let total_expenses: MoneyCents = groups.iter().map(|(_, amount)| *amount).sum();

    groups
        .into_iter()
        .map(|(category, amount)| {
            let percentage = if total_expenses.is_positive() {
                amount.cents() as f64 / total_expenses.cents() as f64 * 100.0
            } else {
                0.0
            };
            CategorySpend {
                category,
                amount,
                percentage,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use uuid::Uuid;

    use crate::{AccountKind, Currency};

    use super::*;

    fn account(balance: &str) -> Account {
        Account::new(
            "founder".to_string(),
            "Mercury Checking".to_string(),
            AccountKind::Checking,
            balance.parse().expect("valid balance literal"),
            Currency::Usd,
        )
    }

    fn tx(kind: TransactionKind, amount: &str, category: Option<&str>) -> Transaction {
        Transaction::new(
            Uuid::new_v4(),
            "founder".to_string(),
            kind,
            Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap(),
            amount.parse().expect("valid amount literal"),
            Currency::Usd,
            category.map(str::to_string),
            None,
        )
    }

    #[test]
    fn empty_accounts_sum_to_zero() {
        let summary = summarize(&[], &[]);
        assert_eq!(summary.total_balance, MoneyCents::ZERO);
    }

    #[test]
    fn empty_month_reports_infinite_runway() {
        let accounts = [account("45000.00")];
        let summary = summarize(&accounts, &[]);
        assert_eq!(summary.monthly_burn, MoneyCents::ZERO);
        assert_eq!(summary.runway_months, INFINITE_RUNWAY_MONTHS);
    }

    #[test]
    fn net_positive_cash_flow_hits_sentinel() {
        let accounts = [account("45000.00"), account("125000.00")];
        let month = [
            tx(TransactionKind::Expense, "-2847.00", Some("Engineering")),
            tx(TransactionKind::Income, "45000.00", Some("Revenue")),
        ];

        let summary = summarize(&accounts, &month);

        assert_eq!(summary.total_balance.to_major_f64(), 170000.0);
        assert_eq!(summary.monthly_expenses.to_major_f64(), 2847.0);
        assert_eq!(summary.monthly_revenue.to_major_f64(), 45000.0);
        assert_eq!(summary.monthly_burn.to_major_f64(), -42153.0);
        assert_eq!(summary.runway_months, INFINITE_RUNWAY_MONTHS);
    }

    #[test]
    fn positive_burn_divides_balance() {
        let accounts = [account("45000.00"), account("125000.00")];
        let month = [
            tx(TransactionKind::Expense, "-6000.00", Some("Payroll")),
            tx(TransactionKind::Income, "1000.00", Some("Revenue")),
        ];

        let summary = summarize(&accounts, &month);

        assert_eq!(summary.monthly_burn.to_major_f64(), 5000.0);
        assert!((summary.runway_months - 34.0).abs() < f64::EPSILON);
    }

    #[test]
    fn inactive_accounts_still_count() {
        let mut dormant = account("100.00");
        dormant.active = false;
        let accounts = [account("50.00"), dormant];

        let summary = summarize(&accounts, &[]);
        assert_eq!(summary.total_balance.cents(), 15000);
    }

    #[test]
    fn expense_sums_ignore_stored_sign() {
        let accounts = [account("1000.00")];
        let negative = [tx(TransactionKind::Expense, "-40.00", None)];
        let positive = [tx(TransactionKind::Expense, "40.00", None)];

        assert_eq!(
            summarize(&accounts, &negative).monthly_expenses,
            summarize(&accounts, &positive).monthly_expenses,
        );
    }

    #[test]
    fn transfers_do_not_touch_burn() {
        let accounts = [account("1000.00")];
        let month = [
            tx(TransactionKind::Transfer, "-500.00", None),
            tx(TransactionKind::Transfer, "500.00", None),
        ];

        let summary = summarize(&accounts, &month);
        assert_eq!(summary.monthly_burn, MoneyCents::ZERO);
        assert_eq!(summary.runway_months, INFINITE_RUNWAY_MONTHS);
    }

    #[test]
    fn breakdown_groups_blank_categories_as_uncategorized() {
        let month = [
            tx(TransactionKind::Expense, "-1500.00", Some("Engineering")),
            tx(TransactionKind::Expense, "-1500.00", Some("Engineering")),
            tx(TransactionKind::Expense, "-600.00", None),
            tx(TransactionKind::Expense, "-400.00", Some("   ")),
        ];

        let breakdown = expense_breakdown(&month);

        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].category, "Engineering");
        assert_eq!(breakdown[0].amount.to_major_f64(), 3000.0);
        assert!((breakdown[0].percentage - 75.0).abs() < f64::EPSILON);
        assert_eq!(breakdown[1].category, UNCATEGORIZED);
        assert_eq!(breakdown[1].amount.to_major_f64(), 1000.0);
        assert!((breakdown[1].percentage - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn breakdown_percentages_sum_to_one_hundred() {
        let month = [
            tx(TransactionKind::Expense, "-33.33", Some("Tooling")),
            tx(TransactionKind::Expense, "-66.67", Some("Hosting")),
            tx(TransactionKind::Expense, "-0.07", Some("Fees")),
        ];

        let breakdown = expense_breakdown(&month);
        let total: f64 = breakdown.iter().map(|slice| slice.percentage).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn breakdown_of_empty_month_is_empty() {
        assert!(expense_breakdown(&[]).is_empty());
    }

    #[test]
    fn breakdown_ignores_income_and_transfers() {
        let month = [
            tx(TransactionKind::Income, "500.00", Some("Revenue")),
            tx(TransactionKind::Transfer, "-200.00", None),
            tx(TransactionKind::Expense, "-10.00", Some("Fees")),
        ];

        let breakdown = expense_breakdown(&month);
        assert_eq!(breakdown.len(), 1);
        assert_eq!(breakdown[0].category, "Fees");
    }

    #[test]
    fn month_bounds_cover_the_calendar_month() {
        let now = Utc.with_ymd_and_hms(2026, 1, 17, 15, 30, 12).unwrap();
        let (start, end) = month_bounds(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn month_bounds_roll_over_december() {
        let now = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap();
        let (start, end) = month_bounds(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn month_bounds_handle_leap_february() {
        let now = Utc.with_ymd_and_hms(2028, 2, 29, 8, 0, 0).unwrap();
        let (start, end) = month_bounds(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2028, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2028, 3, 1, 0, 0, 0).unwrap());
    }
}
