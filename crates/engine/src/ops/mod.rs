//! Storage operations, one module per concern.

mod accounts;
mod analytics;
mod budgets;
mod transactions;

pub use transactions::{NewTransaction, TransactionListFilter, TransferCmd};

use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine};

/// Trim and NFC-normalize a user-supplied name so lookups and grouping keys
/// compare cleanly.
fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let normalized: String = value.trim().nfc().collect();
    if normalized.is_empty() {
        return Err(EngineError::InvalidAmount(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(normalized)
}

/// Trim and NFC-normalize optional text; blank input collapses to `None`.
fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(|s| s.trim().nfc().collect::<String>())
        .filter(|s| !s.is_empty())
}
