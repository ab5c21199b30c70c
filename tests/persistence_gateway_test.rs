// Account-then-transaction writes and id remapping

mod common;

use std::collections::HashMap;
use uuid::Uuid;

use account_link_core::{
    db::InMemoryStore,
    models::{AnnualPercentageRate, NewAccount, NewTransaction},
    services::{
        normalizer::NormalizedDetails,
        persistence::{persist_account_details, persist_transactions, Persistence},
    },
    utils::{ServiceError, WriteStage},
};
use common::FailingStore;

fn new_account(plaid_id: &str) -> NewAccount {
    NewAccount {
        plaid_account_id: plaid_id.to_string(),
        account_type: "credit".to_string(),
        current_balance: 1250.0,
        available_balance: 750.0,
        credit_limit: 2000.0,
        aprs: vec![
            AnnualPercentageRate {
                apr_percentage: 22.99,
                apr_type: "purchase_apr".to_string(),
                ..Default::default()
            },
            AnnualPercentageRate {
                apr_percentage: 27.99,
                apr_type: "cash_apr".to_string(),
                ..Default::default()
            },
        ]
        .into(),
        ..Default::default()
    }
}

fn new_transaction(plaid_tx: &str, plaid_account: &str) -> NewTransaction {
    NewTransaction {
        plaid_transaction_id: plaid_tx.to_string(),
        plaid_account_id: plaid_account.to_string(),
        amount: 12.0,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_transactions_reference_internal_account_ids() {
    let store = InMemoryStore::new();
    let details = NormalizedDetails {
        accounts: vec![new_account("a1"), new_account("a2")],
        transactions: vec![
            new_transaction("t1", "a1"),
            new_transaction("t2", "a2"),
            new_transaction("t3", "a1"),
        ],
    };

    let persisted = persist_account_details(&store, details).await.unwrap();

    let by_plaid: HashMap<&str, Uuid> = persisted
        .accounts
        .iter()
        .map(|a| (a.plaid_account_id.as_str(), a.id))
        .collect();
    for tx in &persisted.transactions {
        assert_eq!(tx.account_id, Some(by_plaid[tx.plaid_account_id.as_str()]));
    }
    assert_eq!(store.transactions().await.len(), 3);
}

#[tokio::test]
async fn test_unmapped_account_leaves_empty_reference() {
    let store = InMemoryStore::new();
    let details = NormalizedDetails {
        accounts: vec![new_account("a1")],
        transactions: vec![new_transaction("t1", "a1"), new_transaction("t2", "dropped")],
    };

    let persisted = persist_account_details(&store, details).await.unwrap();

    assert!(persisted.transactions[0].account_id.is_some());
    assert_eq!(persisted.transactions[1].account_id, None);
}

#[tokio::test]
async fn test_skipping_account_writes_leaves_references_empty() {
    let store = InMemoryStore::new();

    let written = persist_transactions(
        &store,
        vec![new_transaction("t1", "a1")],
        &HashMap::new(),
    )
    .await
    .unwrap();

    assert_eq!(written[0].account_id, None);
}

#[tokio::test]
async fn test_account_round_trip_keeps_aprs_and_balances() {
    let store = InMemoryStore::new();
    let created = store.create_account(new_account("a1")).await.unwrap();

    let read = store.get_account(created.id).await.unwrap();

    assert_eq!(read.aprs.len(), 2);
    assert_eq!(read.current_balance, 1250.0);
    assert_eq!(read.available_balance, 750.0);
    assert_eq!(read.credit_limit, 2000.0);
}

#[tokio::test]
async fn test_account_failure_aborts_before_transactions() {
    let inner = InMemoryStore::new();
    let store = FailingStore {
        accounts_before_failure: Some(1),
        ..FailingStore::new(inner.clone())
    };
    let details = NormalizedDetails {
        accounts: vec![new_account("a1"), new_account("a2"), new_account("a3")],
        transactions: vec![new_transaction("t1", "a1")],
    };

    let err = persist_account_details(&store, details).await.unwrap_err();

    match err {
        ServiceError::PartialWriteFailure { stage, written, .. } => {
            assert_eq!(stage, WriteStage::Accounts);
            assert_eq!(written, 1);
        },
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(inner.accounts().await.len(), 1);
    assert!(inner.transactions().await.is_empty());
}

#[tokio::test]
async fn test_transaction_failure_keeps_earlier_rows() {
    let inner = InMemoryStore::new();
    let store = FailingStore {
        transactions_before_failure: Some(2),
        ..FailingStore::new(inner.clone())
    };
    let details = NormalizedDetails {
        accounts: vec![new_account("a1")],
        transactions: vec![
            new_transaction("t1", "a1"),
            new_transaction("t2", "a1"),
            new_transaction("t3", "a1"),
            new_transaction("t4", "a1"),
        ],
    };

    let err = persist_account_details(&store, details).await.unwrap_err();

    assert!(matches!(
        err,
        ServiceError::PartialWriteFailure {
            stage: WriteStage::Transactions,
            written: 2,
            ..
        }
    ));
    assert_eq!(inner.accounts().await.len(), 1);
    assert_eq!(inner.transactions().await.len(), 2);
}
