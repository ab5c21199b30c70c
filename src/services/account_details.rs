// Account details fetch
// Liabilities plus a trailing window of credit-account transactions for one item

use chrono::{Months, NaiveDate};
use std::collections::HashSet;
use tracing::{debug, instrument};

use crate::services::aggregator::{
    AccountBase, Aggregator, LiabilitiesSnapshot, RawTransaction,
};
use crate::utils::ServiceError;

/// Raw aggregator data for one access token, already narrowed to credit accounts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountDetails {
    pub liabilities: LiabilitiesSnapshot,
    pub accounts: Vec<AccountBase>,
    pub transactions: Vec<RawTransaction>,
}

/// Start of the trailing window ending at `end_date`
pub fn window_start(end_date: NaiveDate, lookback_months: u32) -> NaiveDate {
    end_date
        .checked_sub_months(Months::new(lookback_months))
        .unwrap_or(NaiveDate::MIN)
}

/// Keep credit accounts, then keep transactions posted against one of them
pub fn retain_credit_activity(
    accounts: Vec<AccountBase>,
    transactions: Vec<RawTransaction>,
) -> (Vec<AccountBase>, Vec<RawTransaction>) {
    let accounts: Vec<AccountBase> = accounts.into_iter().filter(|a| a.is_credit()).collect();

    let credit_ids: HashSet<&str> = accounts.iter().map(|a| a.account_id.as_str()).collect();
    let transactions = transactions
        .into_iter()
        .filter(|tx| credit_ids.contains(tx.account_id.as_str()))
        .collect();

    (accounts, transactions)
}

/// Liabilities first, then transactions over `[today - lookback, today]`.
/// Aggregator failures surface unchanged as `UpstreamFailure`.
#[instrument(skip(aggregator, access_token))]
pub async fn fetch_account_details(
    aggregator: &dyn Aggregator,
    access_token: &str,
    today: NaiveDate,
    lookback_months: u32,
) -> Result<AccountDetails, ServiceError> {
    let liabilities = aggregator.get_liabilities(access_token).await?;

    let start_date = window_start(today, lookback_months);
    let snapshot = aggregator
        .get_transactions(access_token, start_date, today)
        .await?;

    let fetched_accounts = snapshot.accounts.len();
    let fetched_transactions = snapshot.transactions.len();
    let (accounts, transactions) = retain_credit_activity(snapshot.accounts, snapshot.transactions);

    debug!(
        "Kept {}/{} accounts and {}/{} transactions after credit filter",
        accounts.len(),
        fetched_accounts,
        transactions.len(),
        fetched_transactions
    );

    Ok(AccountDetails {
        liabilities,
        accounts,
        transactions,
    })
}
