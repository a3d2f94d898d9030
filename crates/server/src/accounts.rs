//! Accounts API endpoints

use api_types::account::{
    AccountKind as ApiAccountKind, AccountNew, AccountView, AccountsResponse,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{FixedOffset, Utc};
use engine::{Account, MoneyCents};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn map_currency(currency: engine::Currency) -> api_types::Currency {
    match currency {
        engine::Currency::Usd => api_types::Currency::Usd,
        engine::Currency::Eur => api_types::Currency::Eur,
    }
}

fn engine_currency(currency: api_types::Currency) -> engine::Currency {
    match currency {
        api_types::Currency::Usd => engine::Currency::Usd,
        api_types::Currency::Eur => engine::Currency::Eur,
    }
}

fn map_kind(kind: engine::AccountKind) -> ApiAccountKind {
    match kind {
        engine::AccountKind::Checking => ApiAccountKind::Checking,
        engine::AccountKind::Savings => ApiAccountKind::Savings,
        engine::AccountKind::Credit => ApiAccountKind::Credit,
    }
}

fn engine_kind(kind: ApiAccountKind) -> engine::AccountKind {
    match kind {
        ApiAccountKind::Checking => engine::AccountKind::Checking,
        ApiAccountKind::Savings => engine::AccountKind::Savings,
        ApiAccountKind::Credit => engine::AccountKind::Credit,
    }
}

fn view(account: Account) -> Result<AccountView, ServerError> {
    let utc = FixedOffset::east_opt(0)
        .ok_or_else(|| ServerError::Generic("invalid UTC offset".to_string()))?;
    Ok(AccountView {
        id: account.id,
        name: account.name,
        kind: map_kind(account.kind),
        balance: account.balance.to_string(),
        currency: map_currency(account.currency),
        active: account.active,
        last_synced_at: account.last_synced_at.map(|dt| dt.with_timezone(&utc)),
    })
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<AccountNew>,
) -> Result<(StatusCode, Json<AccountView>), ServerError> {
    let opening_balance: MoneyCents = payload.opening_balance.parse()?;

    let account = state
        .engine
        .create_account(
            &user.username,
            &payload.name,
            engine_kind(payload.kind),
            opening_balance,
            payload.currency.map(engine_currency),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(view(account)?)))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<AccountsResponse>, ServerError> {
    let accounts = state
        .engine
        .list_accounts(&user.username)
        .await?
        .into_iter()
        .map(view)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(AccountsResponse { accounts }))
}

pub async fn deactivate(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.deactivate_account(id, &user.username).await?;
    Ok(StatusCode::OK)
}

/// Simulated bank sync: the "bank" is the ledger itself, replayed over the
/// opening balance.
pub async fn sync(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state
        .engine
        .sync_account(id, &user.username, Utc::now())
        .await?;
    Ok(Json(view(account)?))
}
