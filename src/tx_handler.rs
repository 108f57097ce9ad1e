use crate::epoch_handler::commit;
use crate::{
    Ed25519Verifier, EpochBatch, EpochHandler, SignatureVerifier, Transaction,
    TransactionValidator, UtxoPool,
};
use tracing::info;

/// Accepts every transaction that becomes valid while the epoch is processed.
///
/// The batch is unordered, so a transaction may spend an output created by another
/// transaction of the same batch listed after it. Candidates are therefore scanned in
/// passes until a pass accepts nothing. The result is some mutually valid subset, not
/// necessarily the largest one.
pub struct TxHandler<V = Ed25519Verifier> {
    utxo_pool: UtxoPool,
    verifier: V,
    last_passes: usize,
}

impl TxHandler {
    pub fn new(utxo_pool: UtxoPool) -> Self {
        Self::with_verifier(utxo_pool, Ed25519Verifier)
    }
}

impl<V: SignatureVerifier> TxHandler<V> {
    pub fn with_verifier(utxo_pool: UtxoPool, verifier: V) -> Self {
        Self {
            utxo_pool,
            verifier,
            last_passes: 0,
        }
    }

    /// Number of passes over the candidates made by the last epoch.
    pub fn last_passes(&self) -> usize {
        self.last_passes
    }

    pub fn into_utxo_pool(self) -> UtxoPool {
        self.utxo_pool
    }
}

impl<V: SignatureVerifier> EpochHandler for TxHandler<V> {
    fn utxo_pool(&self) -> &UtxoPool {
        &self.utxo_pool
    }

    fn is_valid_tx(&self, transaction: &Transaction) -> bool {
        TransactionValidator::is_valid(transaction, &self.utxo_pool, &self.verifier)
    }

    fn handle_batch(&mut self, batch: EpochBatch) -> Vec<Transaction> {
        let candidates = batch.len();
        let mut pending = batch.into_transactions();
        let mut accepted = Vec::new();
        let mut passes = 0;

        // Each pass that accepts anything shrinks `pending`, so there are at most
        // `candidates + 1` passes.
        loop {
            passes += 1;
            let mut rejected = Vec::with_capacity(pending.len());
            let accepted_before = accepted.len();
            for transaction in pending {
                if self.is_valid_tx(&transaction) {
                    commit(&mut self.utxo_pool, transaction, &mut accepted);
                } else {
                    rejected.push(transaction);
                }
            }
            pending = rejected;
            if accepted.len() == accepted_before || pending.is_empty() {
                break;
            }
        }

        self.last_passes = passes;
        info!(
            candidates,
            accepted = accepted.len(),
            passes,
            "Processed epoch"
        );
        accepted
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Coin, EpochHandler, KeyPair, OutputIndex, Sha256, Transaction, TransactionBuilder,
        TransactionId, TransactionOutput, TxHandler, Utxo, UtxoPool,
    };

    fn origin() -> TransactionId {
        TransactionId::new(Sha256::digest(b"genesis"))
    }

    fn key(seed: u8) -> KeyPair {
        KeyPair::from_seed(&[seed; 32])
    }

    fn pool() -> UtxoPool {
        let mut pool = UtxoPool::new();
        pool.add(
            Utxo::new(origin(), OutputIndex::new(0)),
            TransactionOutput::new(key(0).public_key(), Coin::from_coins(10)),
        );
        pool
    }

    fn spend(
        from: TransactionId,
        index: u32,
        owner: &KeyPair,
        to: &KeyPair,
        amount: i64,
    ) -> Transaction {
        TransactionBuilder::new()
            .input(from, index)
            .output(to.public_key(), Coin::from_coins(amount))
            .sign_input(0, owner)
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn accepts_chain_listed_in_reverse() {
        let tx1 = spend(origin(), 0, &key(0), &key(1), 9);
        let tx2 = spend(*tx1.id(), 0, &key(1), &key(2), 8);
        let tx3 = spend(*tx2.id(), 0, &key(2), &key(3), 7);

        let mut handler = TxHandler::new(pool());
        let accepted = handler.handle_txs(vec![tx3.clone(), tx2.clone(), tx1.clone()]);

        assert_eq!(accepted, vec![tx1.clone(), tx2.clone(), tx3.clone()]);
        // One transaction becomes valid per pass.
        assert_eq!(handler.last_passes(), 3);
        let pool = handler.utxo_pool();
        assert_eq!(pool.len(), 1);
        assert!(pool.contains(&Utxo::new(*tx3.id(), OutputIndex::new(0))));
        assert!(!pool.contains(&Utxo::new(origin(), OutputIndex::new(0))));
    }

    #[test]
    fn first_of_two_conflicting_transactions_wins() {
        let first = spend(origin(), 0, &key(0), &key(1), 5);
        let second = spend(origin(), 0, &key(0), &key(2), 9);

        let mut handler = TxHandler::new(pool());
        assert_eq!(
            handler.handle_txs(vec![first.clone(), second.clone()]),
            vec![first]
        );
        assert!(!handler.is_valid_tx(&second));
    }

    #[test]
    fn skips_missing_and_repeated_entries() {
        let tx = spend(origin(), 0, &key(0), &key(1), 5);
        let mut handler = TxHandler::new(pool());
        let accepted = handler.handle_txs(vec![None, Some(tx.clone()), Some(tx.clone()), None]);
        assert_eq!(accepted, vec![tx]);
    }

    #[test]
    fn invalid_transactions_are_omitted() {
        let bad_signature = spend(origin(), 0, &key(5), &key(1), 5);
        let unknown = spend(TransactionId::new(Sha256::digest(b"x")), 0, &key(0), &key(1), 1);

        let mut handler = TxHandler::new(pool());
        assert!(handler.handle_txs(vec![bad_signature, unknown]).is_empty());
        assert_eq!(handler.utxo_pool(), &pool());
    }

    #[test]
    fn constructor_pool_is_not_shared() {
        let original = pool();
        let mut handler = TxHandler::new(original.clone());
        handler.handle_txs(vec![spend(origin(), 0, &key(0), &key(1), 5)]);
        assert_eq!(original, pool());
        assert_ne!(handler.utxo_pool(), &original);
    }

    #[test]
    fn empty_batch_accepts_nothing() {
        let mut handler = TxHandler::new(pool());
        assert!(handler.handle_txs(Vec::<Transaction>::new()).is_empty());
        assert_eq!(handler.last_passes(), 1);
        assert_eq!(handler.into_utxo_pool(), pool());
    }
}
