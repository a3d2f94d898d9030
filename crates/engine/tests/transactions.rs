use chrono::{TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, Statement};
use uuid::Uuid;

use engine::{
    AccountKind, Engine, EngineError, MoneyCents, NewTransaction, TransactionKind,
    TransactionListFilter, TransferCmd,
};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for user in ["alice", "bob"] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password) VALUES (?, ?)",
            vec![user.into(), "password".into()],
        ))
        .await
        .unwrap();
    }
    Engine::builder().database(db).build().await.unwrap()
}

fn cents(literal: &str) -> MoneyCents {
    literal.parse().unwrap()
}

fn at(day: u32, hour: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, day, hour, 0, 0).unwrap()
}

async fn checking(engine: &Engine, user: &str, name: &str, opening: &str) -> Uuid {
    engine
        .create_account(user, name, AccountKind::Checking, cents(opening), None)
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn income_and_expense_move_the_balance() {
    let engine = engine_with_db().await;
    let account_id = checking(&engine, "alice", "Operating", "1000.00").await;

    engine
        .income(
            "alice",
            NewTransaction {
                account_id,
                amount: cents("250.00"),
                category: Some("Revenue".to_string()),
                note: None,
                occurred_at: at(2, 9),
            },
        )
        .await
        .unwrap();

    engine
        .expense(
            "alice",
            NewTransaction {
                account_id,
                amount: cents("100.00"),
                category: Some("Hosting".to_string()),
                note: Some("June invoice".to_string()),
                occurred_at: at(3, 9),
            },
        )
        .await
        .unwrap();

    let account = engine.account(account_id, "alice").await.unwrap();
    assert_eq!(account.balance, cents("1150.00"));
}

#[tokio::test]
async fn non_positive_amounts_are_rejected() {
    let engine = engine_with_db().await;
    let account_id = checking(&engine, "alice", "Operating", "0.00").await;

    let err = engine
        .expense(
            "alice",
            NewTransaction {
                account_id,
                amount: MoneyCents::ZERO,
                category: None,
                note: None,
                occurred_at: at(2, 9),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn duplicate_account_names_conflict_per_user() {
    let engine = engine_with_db().await;
    checking(&engine, "alice", "Operating", "0.00").await;

    let err = engine
        .create_account("alice", "Operating", AccountKind::Savings, MoneyCents::ZERO, None)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("Operating".to_string()));

    // Another user may reuse the name.
    checking(&engine, "bob", "Operating", "0.00").await;
}

#[tokio::test]
async fn accounts_of_other_users_are_hidden() {
    let engine = engine_with_db().await;
    let account_id = checking(&engine, "alice", "Operating", "500.00").await;

    let err = engine.account(account_id, "bob").await.unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("account not exists".to_string())
    );

    let err = engine
        .expense(
            "bob",
            NewTransaction {
                account_id,
                amount: cents("10.00"),
                category: None,
                note: None,
                occurred_at: at(2, 9),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("account not exists".to_string())
    );
}

#[tokio::test]
async fn inactive_accounts_reject_new_entries() {
    let engine = engine_with_db().await;
    let account_id = checking(&engine, "alice", "Old Card", "100.00").await;

    engine.deactivate_account(account_id, "alice").await.unwrap();

    let err = engine
        .expense(
            "alice",
            NewTransaction {
                account_id,
                amount: cents("10.00"),
                category: None,
                note: None,
                occurred_at: at(2, 9),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAccount(_)));
}

#[tokio::test]
async fn transfer_moves_money_between_accounts() {
    let engine = engine_with_db().await;
    let from = checking(&engine, "alice", "Operating", "1000.00").await;
    let to = checking(&engine, "alice", "Payroll Reserve", "0.00").await;

    engine
        .transfer(
            "alice",
            TransferCmd {
                from_account_id: from,
                to_account_id: to,
                amount: cents("400.00"),
                note: None,
                occurred_at: at(5, 9),
            },
        )
        .await
        .unwrap();

    assert_eq!(
        engine.account(from, "alice").await.unwrap().balance,
        cents("600.00")
    );
    assert_eq!(
        engine.account(to, "alice").await.unwrap().balance,
        cents("400.00")
    );
}

#[tokio::test]
async fn transfer_to_the_same_account_is_rejected() {
    let engine = engine_with_db().await;
    let account_id = checking(&engine, "alice", "Operating", "1000.00").await;

    let err = engine
        .transfer(
            "alice",
            TransferCmd {
                from_account_id: account_id,
                to_account_id: account_id,
                amount: cents("1.00"),
                note: None,
                occurred_at: at(5, 9),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAccount(_)));
}

#[tokio::test]
async fn delete_transaction_reverts_the_balance_effect() {
    let engine = engine_with_db().await;
    let account_id = checking(&engine, "alice", "Operating", "1000.00").await;

    let tx_id = engine
        .expense(
            "alice",
            NewTransaction {
                account_id,
                amount: cents("200.00"),
                category: Some("Hosting".to_string()),
                note: None,
                occurred_at: at(3, 9),
            },
        )
        .await
        .unwrap();
    assert_eq!(
        engine.account(account_id, "alice").await.unwrap().balance,
        cents("800.00")
    );

    engine.delete_transaction("alice", tx_id).await.unwrap();
    assert_eq!(
        engine.account(account_id, "alice").await.unwrap().balance,
        cents("1000.00")
    );

    let (transactions, _) = engine
        .list_transactions("alice", 10, None, &TransactionListFilter::default())
        .await
        .unwrap();
    assert!(transactions.is_empty());
}

#[tokio::test]
async fn categorize_sets_and_clears_the_label() {
    let engine = engine_with_db().await;
    let account_id = checking(&engine, "alice", "Operating", "1000.00").await;

    let tx_id = engine
        .expense(
            "alice",
            NewTransaction {
                account_id,
                amount: cents("50.00"),
                category: None,
                note: None,
                occurred_at: at(3, 9),
            },
        )
        .await
        .unwrap();

    engine
        .categorize_transaction("alice", tx_id, Some("  Tooling "))
        .await
        .unwrap();
    let (transactions, _) = engine
        .list_transactions("alice", 10, None, &TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(transactions[0].category.as_deref(), Some("Tooling"));

    engine
        .categorize_transaction("alice", tx_id, None)
        .await
        .unwrap();
    let (transactions, _) = engine
        .list_transactions("alice", 10, None, &TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(transactions[0].category, None);
}

#[tokio::test]
async fn listing_pages_newest_first() {
    let engine = engine_with_db().await;
    let account_id = checking(&engine, "alice", "Operating", "1000.00").await;

    for day in 1..=3 {
        engine
            .expense(
                "alice",
                NewTransaction {
                    account_id,
                    amount: cents("10.00"),
                    category: Some(format!("Day {day}")),
                    note: None,
                    occurred_at: at(day, 9),
                },
            )
            .await
            .unwrap();
    }

    let (first_page, cursor) = engine
        .list_transactions("alice", 2, None, &TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(first_page.len(), 2);
    assert_eq!(first_page[0].category.as_deref(), Some("Day 3"));
    assert_eq!(first_page[1].category.as_deref(), Some("Day 2"));
    let cursor = cursor.expect("expected a next page");

    let (second_page, cursor) = engine
        .list_transactions("alice", 2, Some(&cursor), &TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(second_page.len(), 1);
    assert_eq!(second_page[0].category.as_deref(), Some("Day 1"));
    assert!(cursor.is_none());
}

#[tokio::test]
async fn listing_filters_by_kind_and_range() {
    let engine = engine_with_db().await;
    let account_id = checking(&engine, "alice", "Operating", "1000.00").await;

    engine
        .income(
            "alice",
            NewTransaction {
                account_id,
                amount: cents("100.00"),
                category: None,
                note: None,
                occurred_at: at(1, 9),
            },
        )
        .await
        .unwrap();
    engine
        .expense(
            "alice",
            NewTransaction {
                account_id,
                amount: cents("25.00"),
                category: None,
                note: None,
                occurred_at: at(10, 9),
            },
        )
        .await
        .unwrap();

    let filter = TransactionListFilter {
        kinds: Some(vec![TransactionKind::Expense]),
        ..TransactionListFilter::default()
    };
    let (expenses, _) = engine
        .list_transactions("alice", 10, None, &filter)
        .await
        .unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].kind, TransactionKind::Expense);

    let filter = TransactionListFilter {
        from: Some(at(5, 0)),
        to: Some(at(20, 0)),
        ..TransactionListFilter::default()
    };
    let (ranged, _) = engine
        .list_transactions("alice", 10, None, &filter)
        .await
        .unwrap();
    assert_eq!(ranged.len(), 1);
    assert_eq!(ranged[0].occurred_at, at(10, 9));
}

#[tokio::test]
async fn garbage_cursors_are_rejected() {
    let engine = engine_with_db().await;

    let err = engine
        .list_transactions("alice", 10, Some("not-a-cursor"), &TransactionListFilter::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidCursor(_)));
}
