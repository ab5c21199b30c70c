// Normalizer
// Maps raw aggregator liabilities/accounts/transactions onto canonical records.
//
// Accounts are inner-joined against liabilities on the external account id:
// an account with no liability record is dropped. Transactions are always
// emitted, still keyed by external account id; the internal account reference
// is resolved at persistence time.

use std::collections::HashMap;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{AnnualPercentageRate, AprList, NewAccount, NewTransaction, TransactionDetails};
use crate::services::account_details::AccountDetails;
use crate::services::aggregator::types::{Apr, CreditCardLiability};
use crate::services::aggregator::{AccountBase, RawTransaction};
use crate::utils::ServiceError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedDetails {
    pub accounts: Vec<NewAccount>,
    pub transactions: Vec<NewTransaction>,
}

pub fn normalize(details: AccountDetails, user_id: Uuid) -> Result<NormalizedDetails, ServiceError> {
    let liabilities = index_liabilities(details.liabilities.credit)?;

    let accounts: Vec<NewAccount> = details
        .accounts
        .into_iter()
        .filter_map(|account| match liabilities.get(account.account_id.as_str()) {
            Some(liability) => Some(normalize_account(account, liability, user_id)),
            None => {
                warn!(
                    "Dropping account {} with no liability record",
                    account.account_id
                );
                None
            },
        })
        .collect();

    let transactions: Vec<NewTransaction> = details
        .transactions
        .into_iter()
        .map(|tx| normalize_transaction(tx, user_id))
        .collect();

    debug!(
        "Normalized {} accounts and {} transactions",
        accounts.len(),
        transactions.len()
    );

    Ok(NormalizedDetails {
        accounts,
        transactions,
    })
}

/// Index credit liabilities by external account id.
/// A liability without an account id cannot be joined and fails the batch.
fn index_liabilities(
    credit: Vec<CreditCardLiability>,
) -> Result<HashMap<String, CreditCardLiability>, ServiceError> {
    let mut by_account = HashMap::with_capacity(credit.len());
    for liability in credit {
        let Some(account_id) = liability.account_id.clone() else {
            return Err(ServiceError::UpstreamFailure(
                "liability record is missing account_id".to_string(),
            ));
        };
        by_account.insert(account_id, liability);
    }
    Ok(by_account)
}

fn normalize_apr(apr: Apr) -> AnnualPercentageRate {
    AnnualPercentageRate {
        apr_percentage: apr.apr_percentage,
        apr_type: apr.apr_type,
        balance_subject_to_apr: apr.balance_subject_to_apr.unwrap_or_default(),
        interest_charge_amount: apr.interest_charge_amount.unwrap_or_default(),
    }
}

fn normalize_account(
    account: AccountBase,
    liability: &CreditCardLiability,
    user_id: Uuid,
) -> NewAccount {
    let aprs: Vec<AnnualPercentageRate> = liability.aprs.iter().cloned().map(normalize_apr).collect();

    NewAccount {
        plaid_account_id: account.account_id,
        user_id,
        name: account.name,
        official_name: account.official_name.unwrap_or_default(),
        account_type: account.account_type,
        subtype: account.subtype.unwrap_or_default(),
        available_balance: account.balances.available.unwrap_or_default(),
        current_balance: account.balances.current.unwrap_or_default(),
        credit_limit: account.balances.limit.unwrap_or_default(),
        iso_currency_code: account.balances.iso_currency_code.unwrap_or_default(),
        aprs: AprList::from(aprs),
        is_overdue: liability.is_overdue.unwrap_or_default(),
        last_payment_amount: liability.last_payment_amount.unwrap_or_default(),
        last_payment_date: liability.last_payment_date.clone().unwrap_or_default(),
        last_statement_issue_date: liability.last_statement_issue_date.clone().unwrap_or_default(),
        last_statement_balance: liability.last_statement_balance.unwrap_or_default(),
        minimum_payment_amount: liability.minimum_payment_amount.unwrap_or_default(),
        next_payment_due_date: liability.next_payment_due_date.clone().unwrap_or_default(),
    }
}

fn normalize_transaction(tx: RawTransaction, user_id: Uuid) -> NewTransaction {
    let location = tx.location;
    let details = TransactionDetails {
        address: location.address.unwrap_or_default(),
        city: location.city.unwrap_or_default(),
        state: location.region.unwrap_or_default(),
        zipcode: location.postal_code.unwrap_or_default(),
        country: location.country.unwrap_or_default(),
        store_number: location.store_number.unwrap_or_default(),
        reference_number: tx.payment_meta.reference_number.unwrap_or_default(),
    };
    let (primary_category, detailed_category) = tx
        .personal_finance_category
        .map(|pfc| (pfc.primary, pfc.detailed))
        .unwrap_or_default();

    NewTransaction {
        plaid_transaction_id: tx.transaction_id,
        account_id: None,
        plaid_account_id: tx.account_id,
        user_id,
        transaction_type: tx.transaction_type.unwrap_or_default(),
        pending_transaction_id: tx.pending_transaction_id.unwrap_or_default(),
        category_id: tx.category_id.unwrap_or_default(),
        category: tx.category.unwrap_or_default(),
        details,
        name: tx.name,
        original_description: tx.original_description.unwrap_or_default(),
        amount: tx.amount,
        iso_currency_code: tx.iso_currency_code.unwrap_or_default(),
        date: tx.date,
        pending: tx.pending,
        merchant_name: tx.merchant_name.unwrap_or_default(),
        payment_channel: tx.payment_channel,
        authorized_date: tx.authorized_date.unwrap_or_default(),
        primary_category,
        detailed_category,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::aggregator::types::{
        AccountBalances, Location, PaymentMeta, PersonalFinanceCategory,
    };
    use crate::services::aggregator::LiabilitiesSnapshot;

    fn credit_account(id: &str) -> AccountBase {
        AccountBase {
            account_id: id.to_string(),
            name: format!("Card {}", id),
            account_type: "credit".to_string(),
            balances: AccountBalances {
                current: Some(410.0),
                limit: Some(2000.0),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn liability(id: &str) -> CreditCardLiability {
        CreditCardLiability {
            account_id: Some(id.to_string()),
            aprs: vec![Apr {
                apr_percentage: 15.24,
                apr_type: "purchase_apr".to_string(),
                balance_subject_to_apr: Some(1562.32),
                interest_charge_amount: None,
            }],
            is_overdue: Some(false),
            last_statement_balance: Some(1708.77),
            next_payment_due_date: Some("2024-05-28".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_accounts_inner_join_on_liabilities() {
        let user_id = Uuid::new_v4();
        let details = AccountDetails {
            liabilities: LiabilitiesSnapshot {
                credit: vec![liability("a1")],
            },
            accounts: vec![credit_account("a1"), credit_account("a2")],
            transactions: vec![],
        };

        let normalized = normalize(details, user_id).unwrap();

        assert_eq!(normalized.accounts.len(), 1);
        let account = &normalized.accounts[0];
        assert_eq!(account.plaid_account_id, "a1");
        assert_eq!(account.user_id, user_id);
        assert_eq!(account.current_balance, 410.0);
        assert_eq!(account.available_balance, 0.0);
        assert_eq!(account.official_name, "");
        assert_eq!(account.aprs.len(), 1);
        assert_eq!(account.aprs.0[0].interest_charge_amount, 0.0);
        assert_eq!(account.last_statement_balance, 1708.77);
        assert_eq!(account.last_payment_date, "");
    }

    #[test]
    fn test_transactions_emitted_for_dropped_accounts() {
        let details = AccountDetails {
            liabilities: LiabilitiesSnapshot {
                credit: vec![liability("a1")],
            },
            accounts: vec![credit_account("a1"), credit_account("a2")],
            transactions: vec![
                RawTransaction {
                    transaction_id: "t1".to_string(),
                    account_id: "a1".to_string(),
                    ..Default::default()
                },
                RawTransaction {
                    transaction_id: "t2".to_string(),
                    account_id: "a2".to_string(),
                    ..Default::default()
                },
            ],
        };

        let normalized = normalize(details, Uuid::new_v4()).unwrap();

        assert_eq!(normalized.transactions.len(), 2);
        assert!(normalized.transactions.iter().all(|t| t.account_id.is_none()));
        assert_eq!(normalized.transactions[1].plaid_account_id, "a2");
    }

    #[test]
    fn test_transaction_fields_copied_with_defaults() {
        let raw = RawTransaction {
            transaction_id: "t1".to_string(),
            account_id: "a1".to_string(),
            amount: 89.4,
            date: "2024-03-02".to_string(),
            name: "SparkFun".to_string(),
            category: Some(vec!["Shops".to_string(), "Computers".to_string()]),
            location: Location {
                city: Some("Boulder".to_string()),
                region: Some("CO".to_string()),
                postal_code: Some("80301".to_string()),
                ..Default::default()
            },
            payment_meta: PaymentMeta {
                reference_number: Some("ref-9".to_string()),
            },
            personal_finance_category: Some(PersonalFinanceCategory {
                primary: "GENERAL_MERCHANDISE".to_string(),
                detailed: "GENERAL_MERCHANDISE_ELECTRONICS".to_string(),
            }),
            ..Default::default()
        };

        let tx = normalize_transaction(raw, Uuid::nil());

        assert_eq!(tx.details.state, "CO");
        assert_eq!(tx.details.zipcode, "80301");
        assert_eq!(tx.details.address, "");
        assert_eq!(tx.details.reference_number, "ref-9");
        assert_eq!(tx.category, vec!["Shops", "Computers"]);
        assert_eq!(tx.primary_category, "GENERAL_MERCHANDISE");
        assert_eq!(tx.merchant_name, "");
        assert_eq!(tx.iso_currency_code, "");
        assert_eq!(tx.amount, 89.4);
    }

    #[test]
    fn test_liability_without_account_id_fails() {
        let details = AccountDetails {
            liabilities: LiabilitiesSnapshot {
                credit: vec![CreditCardLiability::default()],
            },
            accounts: vec![credit_account("a1")],
            transactions: vec![],
        };

        let err = normalize(details, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, ServiceError::UpstreamFailure(_)));
    }
}
