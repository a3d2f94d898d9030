//! Glidepath domain engine.
//!
//! Owns the domain model (accounts, transactions, budgets), the storage
//! operations over sea-orm, and the financial analytics (monthly summary,
//! expense breakdown, runway projection). The analytics arithmetic lives in
//! pure functions (`summarize`, `expense_breakdown`, `project`); `Engine`
//! methods fetch the inputs and delegate.

use sea_orm::DatabaseConnection;

pub use accounts::{Account, AccountKind};
pub use analytics::{
    CategorySpend, FinancialSummary, INFINITE_RUNWAY_MONTHS, UNCATEGORIZED, expense_breakdown,
    month_bounds, summarize,
};
pub use budgets::{Budget, BudgetStatus};
pub use currency::Currency;
pub use error::EngineError;
pub use forecast::{MonthProjection, RunwayScenario, ScenarioProjection, project};
pub use money::MoneyCents;
pub use ops::{NewTransaction, TransactionListFilter, TransferCmd};
pub use transactions::{Transaction, TransactionKind};

mod accounts;
mod analytics;
mod budgets;
mod currency;
mod error;
mod forecast;
mod money;
mod ops;
mod transactions;

type ResultEngine<T> = Result<T, EngineError>;

/// Storage-backed entry point for all domain operations.
///
/// The database connection is injected at construction; the engine holds no
/// other state, so one instance serves every user.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
