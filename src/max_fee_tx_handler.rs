use crate::epoch_handler::commit;
use crate::{
    Coin, Ed25519Verifier, EpochBatch, EpochHandler, SignatureVerifier, Transaction,
    TransactionValidator, UtxoPool,
};
use std::cmp::Ordering;
use tracing::{debug, info, trace};

/// Accepts transactions greedily by fee.
///
/// Every round validates the remaining candidates against the current pool and commits the
/// valid one with the highest fee; equal fees go to the smallest transaction id. Rounds
/// repeat until no candidate is valid.
///
/// This is a heuristic. Each commit is locally optimal, but committing a transaction can
/// invalidate or enable others, so the collected total is not guaranteed to be the
/// maximum over all mutually valid subsets.
pub struct MaxFeeTxHandler<V = Ed25519Verifier> {
    utxo_pool: UtxoPool,
    verifier: V,
    last_total_fee: Coin,
}

impl MaxFeeTxHandler {
    pub fn new(utxo_pool: UtxoPool) -> Self {
        Self::with_verifier(utxo_pool, Ed25519Verifier)
    }
}

impl<V: SignatureVerifier> MaxFeeTxHandler<V> {
    pub fn with_verifier(utxo_pool: UtxoPool, verifier: V) -> Self {
        Self {
            utxo_pool,
            verifier,
            last_total_fee: Coin::zero(),
        }
    }

    /// Total fee of the transactions accepted by the last epoch.
    pub fn last_total_fee(&self) -> Coin {
        self.last_total_fee
    }

    pub fn into_utxo_pool(self) -> UtxoPool {
        self.utxo_pool
    }

    /// Index and fee of the best currently valid candidate.
    fn select_best(&self, candidates: &[Transaction]) -> Option<(usize, Coin)> {
        let mut best: Option<(usize, Coin)> = None;
        for (index, transaction) in candidates.iter().enumerate() {
            let fee = match TransactionValidator::validate(
                transaction,
                &self.utxo_pool,
                &self.verifier,
            ) {
                Ok(validated) => validated.fee,
                Err(reason) => {
                    trace!(transaction = %transaction.id(), %reason, "Rejected transaction");
                    continue;
                }
            };
            let better = match best {
                None => true,
                Some((best_index, best_fee)) => match fee.cmp(&best_fee) {
                    Ordering::Greater => true,
                    Ordering::Equal => transaction.id() < candidates[best_index].id(),
                    Ordering::Less => false,
                },
            };
            if better {
                best = Some((index, fee));
            }
        }
        best
    }
}

impl<V: SignatureVerifier> EpochHandler for MaxFeeTxHandler<V> {
    fn utxo_pool(&self) -> &UtxoPool {
        &self.utxo_pool
    }

    fn is_valid_tx(&self, transaction: &Transaction) -> bool {
        TransactionValidator::is_valid(transaction, &self.utxo_pool, &self.verifier)
    }

    fn handle_batch(&mut self, batch: EpochBatch) -> Vec<Transaction> {
        let candidates = batch.len();
        let mut remaining = batch.into_transactions();
        let mut accepted = Vec::new();
        let mut total_fee = Coin::zero();

        while let Some((index, fee)) = self.select_best(&remaining) {
            let transaction = remaining.swap_remove(index);
            debug!(transaction = %transaction.id(), %fee, "Selected highest fee transaction");
            total_fee = total_fee.saturating_add(fee);
            commit(&mut self.utxo_pool, transaction, &mut accepted);
        }

        self.last_total_fee = total_fee;
        info!(
            candidates,
            accepted = accepted.len(),
            total_fee = %total_fee,
            "Processed epoch"
        );
        accepted
    }
}
