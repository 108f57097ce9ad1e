use crate::{OutputIndex, Transaction, TransactionId, TransactionOutput};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// Identifies one output of one past transaction.
#[derive(Debug, Hash, Ord, PartialOrd, Eq, PartialEq, Copy, Clone)]
pub struct Utxo {
    transaction_id: TransactionId,
    output_index: OutputIndex,
}

impl Utxo {
    pub fn new(transaction_id: TransactionId, output_index: OutputIndex) -> Self {
        Self {
            transaction_id,
            output_index,
        }
    }

    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    pub fn output_index(&self) -> &OutputIndex {
        &self.output_index
    }
}

impl Display for Utxo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.transaction_id, self.output_index)
    }
}

/// A pool of confirmed and unspent transaction outputs.
///
/// A reference is present iff the output it denotes has not been spent by a committed
/// transaction. Cloning the pool yields an independent copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UtxoPool {
    utxos: HashMap<Utxo, TransactionOutput>,
}

impl UtxoPool {
    pub fn new() -> Self {
        Self {
            utxos: HashMap::new(),
        }
    }

    pub fn contains(&self, utxo: &Utxo) -> bool {
        self.utxos.contains_key(utxo)
    }

    pub fn get(&self, utxo: &Utxo) -> Option<&TransactionOutput> {
        self.utxos.get(utxo)
    }

    /// Inserts the output, replacing any output previously stored under the same reference.
    pub fn add(&mut self, utxo: Utxo, output: TransactionOutput) {
        self.utxos.insert(utxo, output);
    }

    pub fn remove(&mut self, utxo: &Utxo) -> Option<TransactionOutput> {
        self.utxos.remove(utxo)
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    /// Iterates the pool ordered by reference, so output is reproducible.
    pub fn iter(&self) -> impl Iterator<Item = (&Utxo, &TransactionOutput)> {
        let mut entries = self.utxos.iter().collect::<Vec<_>>();
        entries.sort_by(|(lhs, _), (rhs, _)| lhs.cmp(rhs));
        entries.into_iter()
    }

    /// Commits the transaction: its claimed outputs are spent and its own outputs become
    /// spendable. The caller is responsible for having validated it against this pool.
    pub fn apply_transaction(&mut self, transaction: &Transaction) {
        for input in transaction.inputs() {
            self.remove(&input.utxo());
        }
        for (utxo, output) in transaction.created_utxos() {
            self.add(utxo, output.clone());
        }
    }
}

impl std::iter::FromIterator<(Utxo, TransactionOutput)> for UtxoPool {
    fn from_iter<I: IntoIterator<Item = (Utxo, TransactionOutput)>>(iter: I) -> Self {
        Self {
            utxos: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Coin, KeyPair, OutputIndex, Sha256, TransactionBuilder, TransactionId, TransactionOutput,
        Utxo, UtxoPool,
    };

    fn utxo(seed: &[u8], index: u32) -> Utxo {
        Utxo::new(
            TransactionId::new(Sha256::digest(seed)),
            OutputIndex::new(index),
        )
    }

    #[test]
    fn add_get_remove() {
        let owner = KeyPair::from_seed(&[1; 32]).public_key();
        let mut pool = UtxoPool::new();
        assert!(pool.is_empty());

        pool.add(utxo(b"a", 0), TransactionOutput::new(owner, Coin::from_coins(10)));
        assert!(pool.contains(&utxo(b"a", 0)));
        assert!(!pool.contains(&utxo(b"a", 1)));
        assert_eq!(
            pool.get(&utxo(b"a", 0)).map(TransactionOutput::amount),
            Some(Coin::from_coins(10))
        );

        assert!(pool.remove(&utxo(b"a", 0)).is_some());
        assert!(pool.remove(&utxo(b"a", 0)).is_none());
        assert!(pool.is_empty());
    }

    #[test]
    fn clone_is_independent() {
        let owner = KeyPair::from_seed(&[1; 32]).public_key();
        let mut original = UtxoPool::new();
        original.add(utxo(b"a", 0), TransactionOutput::new(owner, Coin::from_coins(1)));

        let mut copy = original.clone();
        copy.remove(&utxo(b"a", 0));
        copy.add(utxo(b"b", 0), TransactionOutput::new(owner, Coin::from_coins(2)));

        assert!(original.contains(&utxo(b"a", 0)));
        assert!(!original.contains(&utxo(b"b", 0)));
        assert_eq!(original.len(), 1);
    }

    #[test]
    fn apply_transaction_moves_outputs() {
        let owner = KeyPair::from_seed(&[1; 32]).public_key();
        let spent = utxo(b"a", 0);
        let mut pool = UtxoPool::new();
        pool.add(spent, TransactionOutput::new(owner, Coin::from_coins(3)));

        let tx = TransactionBuilder::new()
            .input(*spent.transaction_id(), 0)
            .output(owner, Coin::from_coins(1))
            .output(owner, Coin::from_coins(2))
            .build()
            .unwrap();
        pool.apply_transaction(&tx);

        assert!(!pool.contains(&spent));
        assert_eq!(pool.len(), 2);
        assert!(pool.contains(&Utxo::new(*tx.id(), OutputIndex::new(0))));
        assert!(pool.contains(&Utxo::new(*tx.id(), OutputIndex::new(1))));
    }

    #[test]
    fn iter_is_sorted() {
        let owner = KeyPair::from_seed(&[1; 32]).public_key();
        let pool = vec![utxo(b"x", 2), utxo(b"y", 0), utxo(b"x", 1)]
            .into_iter()
            .map(|u| (u, TransactionOutput::new(owner, Coin::zero())))
            .collect::<UtxoPool>();
        let keys = pool.iter().map(|(u, _)| *u).collect::<Vec<_>>();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(keys.len(), 3);
    }
}
