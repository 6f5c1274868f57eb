//! Transaction service - the sales ledger

use std::sync::Arc;

use crate::domain::result::{Error, Result};
use crate::domain::{NewTransaction, Transaction};
use crate::ports::RecordStore;

/// Service for ledger operations
///
/// The ledger is read-only over HTTP. [`record`](Self::record) serves the
/// point-of-sale client and seeding.
pub struct TransactionService {
    store: Arc<dyn RecordStore>,
}

impl TransactionService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Transaction>> {
        let transactions = self.store.list_transactions().await?;
        if transactions.is_empty() {
            return Err(Error::not_found("No transactions found"));
        }
        Ok(transactions)
    }

    /// Append a ledger entry
    pub async fn record(&self, entry: NewTransaction) -> Result<Transaction> {
        entry.validate().map_err(Error::validation)?;
        let tx = self.store.insert_transaction(&entry).await?;
        tracing::debug!(transaction_id = tx.transaction_id, "transaction recorded");
        Ok(tx)
    }
}
