use crate::{
    Coin, KeyPair, OutputIndex, PublicKey, Sha256, Signature, Transaction, TransactionBuilder,
    TransactionError, TransactionId, TransactionInput, TransactionOutput, Utxo, UtxoPool,
};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EpochFileError {
    #[error("failed to access epoch file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed epoch file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

fn invalid(field: &'static str) -> impl Fn(String) -> EpochFileError {
    move |reason| EpochFileError::InvalidField { field, reason }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoEntry {
    pub transaction_id: String,
    pub output_index: u32,
    pub owner: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEntry {
    pub transaction_id: String,
    pub output_index: u32,
    #[serde(default)]
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputEntry {
    pub owner: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEntry {
    pub inputs: Vec<InputEntry>,
    pub outputs: Vec<OutputEntry>,
}

/// A pool snapshot and the batch proposed against it, as stored on disk.
///
/// Hashes, keys and signatures are hex strings; amounts are decimal coin strings so no
/// precision is lost. Transaction ids are always derived, never read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochFile {
    pub utxos: Vec<UtxoEntry>,
    pub transactions: Vec<Option<TransactionEntry>>,
}

impl EpochFile {
    pub fn new(pool: &UtxoPool, batch: &[Option<Transaction>]) -> Self {
        let utxos = pool
            .iter()
            .map(|(utxo, output)| UtxoEntry {
                transaction_id: utxo.transaction_id().to_string(),
                output_index: utxo.output_index().value(),
                owner: output.owner().to_hex(),
                amount: output.amount().to_string(),
            })
            .collect();
        let transactions = batch
            .iter()
            .map(|entry| entry.as_ref().map(TransactionEntry::from))
            .collect();
        Self {
            utxos,
            transactions,
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EpochFileError> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), EpochFileError> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    pub fn utxo_pool(&self) -> Result<UtxoPool, EpochFileError> {
        let mut pool = UtxoPool::new();
        for entry in &self.utxos {
            let transaction_id =
                TransactionId::from_hex(&entry.transaction_id).map_err(invalid("utxo id"))?;
            let owner = PublicKey::from_hex(&entry.owner).map_err(invalid("utxo owner"))?;
            let amount = entry.amount.parse::<Coin>().map_err(invalid("utxo amount"))?;
            if amount.is_negative() {
                return Err(invalid("utxo amount")(format!(
                    "{} is negative: {}",
                    Utxo::new(transaction_id, OutputIndex::new(entry.output_index)),
                    entry.amount
                )));
            }
            pool.add(
                Utxo::new(transaction_id, OutputIndex::new(entry.output_index)),
                TransactionOutput::new(owner, amount),
            );
        }
        Ok(pool)
    }

    pub fn batch(&self) -> Result<Vec<Option<Transaction>>, EpochFileError> {
        self.transactions
            .iter()
            .map(|entry| entry.as_ref().map(Transaction::try_from).transpose())
            .collect()
    }

    /// A small signed sample epoch: a two step payment chain listed out of order, two
    /// transactions spending the same output, a negative output, a missing entry and a
    /// repeated transaction.
    pub fn demo(seed: u8) -> Result<Self, EpochFileError> {
        let scrooge = KeyPair::from_seed(&[seed; 32]);
        let alice = KeyPair::from_seed(&[seed.wrapping_add(1); 32]);
        let bob = KeyPair::from_seed(&[seed.wrapping_add(2); 32]);
        let genesis = TransactionId::new(Sha256::digest(&[b'g', seed]));

        let mut pool = UtxoPool::new();
        pool.add(
            Utxo::new(genesis, OutputIndex::new(0)),
            TransactionOutput::new(scrooge.public_key(), Coin::from_coins(10)),
        );
        pool.add(
            Utxo::new(genesis, OutputIndex::new(1)),
            TransactionOutput::new(scrooge.public_key(), Coin::from_coins(5)),
        );

        let pay_alice = TransactionBuilder::new()
            .input(genesis, 0)
            .output(alice.public_key(), Coin::from_coins(7))
            .sign_input(0, &scrooge)?
            .build()?;
        let alice_pays_bob = TransactionBuilder::new()
            .input(*pay_alice.id(), 0)
            .output(bob.public_key(), Coin::from_coins(6))
            .sign_input(0, &alice)?
            .build()?;
        let pay_bob = TransactionBuilder::new()
            .input(genesis, 1)
            .output(bob.public_key(), Coin::from_coins(4))
            .sign_input(0, &scrooge)?
            .build()?;
        let pay_alice_instead = TransactionBuilder::new()
            .input(genesis, 1)
            .output(alice.public_key(), Coin::from_coins(2))
            .sign_input(0, &scrooge)?
            .build()?;
        let negative = TransactionBuilder::new()
            .input(genesis, 1)
            .output(alice.public_key(), Coin::from_coins(-1))
            .sign_input(0, &scrooge)?
            .build()?;

        let batch = vec![
            Some(alice_pays_bob),
            None,
            Some(pay_bob),
            Some(pay_alice.clone()),
            Some(pay_alice_instead),
            Some(negative),
            Some(pay_alice),
        ];
        Ok(Self::new(&pool, &batch))
    }
}

impl From<&Transaction> for TransactionEntry {
    fn from(transaction: &Transaction) -> Self {
        Self {
            inputs: transaction
                .inputs()
                .iter()
                .map(|input| InputEntry {
                    transaction_id: input.utxo_id().to_string(),
                    output_index: input.output_index().value(),
                    signature: input.signature().to_hex(),
                })
                .collect(),
            outputs: transaction
                .outputs()
                .iter()
                .map(|output| OutputEntry {
                    owner: output.owner().to_hex(),
                    amount: output.amount().to_string(),
                })
                .collect(),
        }
    }
}

impl TryFrom<&TransactionEntry> for Transaction {
    type Error = EpochFileError;

    fn try_from(entry: &TransactionEntry) -> Result<Self, Self::Error> {
        let inputs = entry
            .inputs
            .iter()
            .map(|input| {
                Ok(TransactionInput::new(
                    TransactionId::from_hex(&input.transaction_id)
                        .map_err(invalid("input transaction id"))?,
                    OutputIndex::new(input.output_index),
                    Signature::from_hex(&input.signature).map_err(invalid("input signature"))?,
                ))
            })
            .collect::<Result<Vec<_>, EpochFileError>>()?;
        let outputs = entry
            .outputs
            .iter()
            .map(|output| {
                Ok(TransactionOutput::new(
                    PublicKey::from_hex(&output.owner).map_err(invalid("output owner"))?,
                    output
                        .amount
                        .parse::<Coin>()
                        .map_err(invalid("output amount"))?,
                ))
            })
            .collect::<Result<Vec<_>, EpochFileError>>()?;
        Ok(Transaction::new(inputs, outputs)?)
    }
}
