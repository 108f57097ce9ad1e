use crate::{Transaction, TransactionId, UtxoPool};
use std::collections::HashSet;
use std::iter::FromIterator;
use tracing::debug;

/// The candidate transactions proposed for one epoch.
///
/// Missing entries are dropped and repeated transactions are kept once, in the order they
/// were first seen.
#[derive(Debug, Clone, Default)]
pub struct EpochBatch {
    transactions: Vec<Transaction>,
}

impl EpochBatch {
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn into_transactions(self) -> Vec<Transaction> {
        self.transactions
    }
}

impl<T: Into<Option<Transaction>>> FromIterator<T> for EpochBatch {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut seen: HashSet<TransactionId> = HashSet::new();
        let transactions = iter
            .into_iter()
            .filter_map(|entry| -> Option<Transaction> { entry.into() })
            .filter(|transaction| seen.insert(*transaction.id()))
            .collect();
        Self { transactions }
    }
}

/// Processes one epoch at a time against a privately owned pool.
pub trait EpochHandler {
    /// The pool as of the end of the last epoch.
    fn utxo_pool(&self) -> &UtxoPool;

    /// Whether `transaction` is valid against the current pool.
    fn is_valid_tx(&self, transaction: &Transaction) -> bool;

    /// Accepts a mutually valid subset of `batch`, commits it to the pool and returns it in
    /// the order the transactions were accepted. Rejected transactions are omitted.
    fn handle_batch(&mut self, batch: EpochBatch) -> Vec<Transaction>;

    /// Like [`EpochHandler::handle_batch`], for any sequence of transactions or optional
    /// transactions.
    fn handle_txs<I, T>(&mut self, batch: I) -> Vec<Transaction>
    where
        Self: Sized,
        I: IntoIterator<Item = T>,
        T: Into<Option<Transaction>>,
    {
        self.handle_batch(batch.into_iter().collect())
    }
}

pub(crate) fn commit(pool: &mut UtxoPool, transaction: Transaction, accepted: &mut Vec<Transaction>) {
    debug!(
        transaction = %transaction.id(),
        inputs = transaction.inputs().len(),
        outputs = transaction.outputs().len(),
        "Accepted transaction"
    );
    pool.apply_transaction(&transaction);
    accepted.push(transaction);
}
