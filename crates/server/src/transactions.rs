//! Transactions API endpoints

use api_types::transaction::{
    CategoryUpdate, EntryNew, TransactionCreated, TransactionKind as ApiKind, TransactionList,
    TransactionListResponse, TransactionView, TransferCreated, TransferNew,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{FixedOffset, Utc};
use engine::MoneyCents;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn map_kind(kind: engine::TransactionKind) -> ApiKind {
    match kind {
        engine::TransactionKind::Income => ApiKind::Income,
        engine::TransactionKind::Expense => ApiKind::Expense,
        engine::TransactionKind::Transfer => ApiKind::Transfer,
    }
}

fn engine_kind(kind: ApiKind) -> engine::TransactionKind {
    match kind {
        ApiKind::Income => engine::TransactionKind::Income,
        ApiKind::Expense => engine::TransactionKind::Expense,
        ApiKind::Transfer => engine::TransactionKind::Transfer,
    }
}

fn new_transaction(payload: EntryNew) -> Result<engine::NewTransaction, ServerError> {
    let amount: MoneyCents = payload.amount.parse()?;
    Ok(engine::NewTransaction {
        account_id: payload.account_id,
        amount,
        category: payload.category,
        note: payload.note,
        occurred_at: payload.occurred_at.with_timezone(&Utc),
    })
}

pub async fn income_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<EntryNew>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    let id = state
        .engine
        .income(&user.username, new_transaction(payload)?)
        .await?;

    Ok((StatusCode::CREATED, Json(TransactionCreated { id })))
}

pub async fn expense_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<EntryNew>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    let id = state
        .engine
        .expense(&user.username, new_transaction(payload)?)
        .await?;

    Ok((StatusCode::CREATED, Json(TransactionCreated { id })))
}

pub async fn transfer_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TransferNew>,
) -> Result<(StatusCode, Json<TransferCreated>), ServerError> {
    let amount: MoneyCents = payload.amount.parse()?;
    let (out_id, in_id) = state
        .engine
        .transfer(
            &user.username,
            engine::TransferCmd {
                from_account_id: payload.from_account_id,
                to_account_id: payload.to_account_id,
                amount,
                note: payload.note,
                occurred_at: payload.occurred_at.with_timezone(&Utc),
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(TransferCreated { out_id, in_id })))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionList>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let limit = payload.limit.unwrap_or(50);
    let filter = engine::TransactionListFilter {
        account_id: payload.account_id,
        from: payload.from.map(|dt| dt.with_timezone(&Utc)),
        to: payload.to.map(|dt| dt.with_timezone(&Utc)),
        kinds: payload
            .kinds
            .map(|kinds| kinds.into_iter().map(engine_kind).collect()),
    };

    let (txs, next_cursor) = state
        .engine
        .list_transactions(&user.username, limit, payload.cursor.as_deref(), &filter)
        .await?;

    let utc = FixedOffset::east_opt(0)
        .ok_or_else(|| ServerError::Generic("invalid UTC offset".to_string()))?;
    let transactions = txs
        .into_iter()
        .map(|tx| TransactionView {
            id: tx.id,
            account_id: tx.account_id,
            kind: map_kind(tx.kind),
            occurred_at: tx.occurred_at.with_timezone(&utc),
            amount: tx.amount.to_string(),
            category: tx.category,
            note: tx.note,
        })
        .collect();

    Ok(Json(TransactionListResponse {
        transactions,
        next_cursor,
    }))
}

pub async fn categorize(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryUpdate>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .categorize_transaction(&user.username, id, payload.category.as_deref())
        .await?;

    Ok(StatusCode::OK)
}

pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_transaction(&user.username, id).await?;
    Ok(StatusCode::OK)
}
