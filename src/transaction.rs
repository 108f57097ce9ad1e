use crate::{Coin, KeyPair, PublicKey, Sha256, Signature, Utxo};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// A double SHA-256 hash of the transaction data.
#[derive(Debug, Hash, Ord, PartialOrd, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct TransactionId(Sha256);

impl Display for TransactionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TransactionId {
    pub fn new(data: Sha256) -> Self {
        Self(data)
    }

    pub fn from_hex(s: &str) -> Result<Self, String> {
        Sha256::from_hex(s).map(Self)
    }
}

/// The index of the transaction output.
#[derive(Debug, Hash, Ord, PartialOrd, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct OutputIndex(u32);

impl Display for OutputIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OutputIndex {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("failed to encode transaction data: {0}")]
    Encoding(#[from] bincode::Error),
    #[error("input index {index} is out of range for a transaction with {inputs} inputs")]
    InputIndexOutOfRange { index: usize, inputs: usize },
    #[error("output index {0} does not fit into 32 bits")]
    TooManyOutputs(usize),
}

#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransactionInput {
    // 32 bytes. A pointer to the transaction containing the UTXO to be spent.
    utxo_id: TransactionId,
    // 4 bytes. The number of UTXO to be spent, the first one is 0.
    output_index: OutputIndex,
    // Signature by the owner of the spent output over the input's signable payload.
    signature: Signature,
}

impl Display for TransactionInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.utxo_id, self.output_index)
    }
}

impl TransactionInput {
    pub fn new(utxo_id: TransactionId, output_index: OutputIndex, signature: Signature) -> Self {
        Self {
            utxo_id,
            output_index,
            signature,
        }
    }

    pub fn unsigned(utxo_id: TransactionId, output_index: OutputIndex) -> Self {
        Self::new(utxo_id, output_index, Signature::default())
    }

    pub fn utxo_id(&self) -> &TransactionId {
        &self.utxo_id
    }

    pub fn output_index(&self) -> &OutputIndex {
        &self.output_index
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The pool entry this input claims.
    pub fn utxo(&self) -> Utxo {
        Utxo::new(self.utxo_id, self.output_index)
    }
}

#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransactionOutput {
    owner: PublicKey,
    amount: Coin,
}

impl Display for TransactionOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.amount, self.owner)
    }
}

impl TransactionOutput {
    pub fn new(owner: PublicKey, amount: Coin) -> Self {
        Self { owner, amount }
    }

    pub fn owner(&self) -> &PublicKey {
        &self.owner
    }

    pub fn amount(&self) -> Coin {
        self.amount
    }
}

// What the owner of a spent output signs: the claimed output and every output of the
// transaction. Signatures are excluded so each input can be signed independently.
#[derive(Serialize)]
struct SignablePayload<'a> {
    utxo_id: &'a TransactionId,
    output_index: &'a OutputIndex,
    outputs: &'a [TransactionOutput],
}

#[derive(Serialize)]
struct TransactionData<'a> {
    inputs: &'a [TransactionInput],
    outputs: &'a [TransactionOutput],
}

/// An immutable transaction. Its id is derived from the contents once, at construction.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct Transaction {
    id: TransactionId,
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl Display for Transaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl Transaction {
    pub fn new(
        inputs: Vec<TransactionInput>,
        outputs: Vec<TransactionOutput>,
    ) -> Result<Self, TransactionError> {
        if outputs.len() > u32::MAX as usize {
            return Err(TransactionError::TooManyOutputs(outputs.len()));
        }
        let id = Self::hash_transaction_data(&inputs, &outputs)?;
        Ok(Self {
            id,
            inputs,
            outputs,
        })
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn inputs(&self) -> &[TransactionInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TransactionOutput] {
        &self.outputs
    }

    /// The UTXOs this transaction creates once committed, keyed by its own id.
    pub fn created_utxos(&self) -> impl Iterator<Item = (Utxo, &TransactionOutput)> + '_ {
        self.outputs.iter().enumerate().map(move |(index, output)| {
            (
                Utxo::new(self.id, OutputIndex::new(index as u32)),
                output,
            )
        })
    }

    /// Returns the bytes the owner of the output claimed by input `index` must sign.
    pub fn raw_data_to_sign(&self, index: usize) -> Result<Vec<u8>, TransactionError> {
        Self::signable_payload(&self.inputs, &self.outputs, index)
    }

    fn signable_payload(
        inputs: &[TransactionInput],
        outputs: &[TransactionOutput],
        index: usize,
    ) -> Result<Vec<u8>, TransactionError> {
        let input = inputs
            .get(index)
            .ok_or(TransactionError::InputIndexOutOfRange {
                index,
                inputs: inputs.len(),
            })?;
        let payload = SignablePayload {
            utxo_id: &input.utxo_id,
            output_index: &input.output_index,
            outputs,
        };
        Ok(bincode::serialize(&payload)?)
    }

    fn hash_transaction_data(
        inputs: &[TransactionInput],
        outputs: &[TransactionOutput],
    ) -> Result<TransactionId, TransactionError> {
        let data = bincode::serialize(&TransactionData { inputs, outputs })?;
        Ok(TransactionId(Sha256::double_digest(&data)))
    }
}

/// Assembles a transaction input by input, signing each claim before the id is fixed.
#[derive(Debug, Default, Clone)]
pub struct TransactionBuilder {
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(mut self, utxo_id: TransactionId, output_index: u32) -> Self {
        self.inputs.push(TransactionInput::unsigned(
            utxo_id,
            OutputIndex::new(output_index),
        ));
        self
    }

    pub fn output(mut self, owner: PublicKey, amount: Coin) -> Self {
        self.outputs.push(TransactionOutput::new(owner, amount));
        self
    }

    /// Signs input `index` with `key_pair` over the outputs added so far.
    /// Outputs added afterwards invalidate the signature.
    pub fn sign_input(mut self, index: usize, key_pair: &KeyPair) -> Result<Self, TransactionError> {
        let payload = Transaction::signable_payload(&self.inputs, &self.outputs, index)?;
        self.inputs[index].signature = key_pair.sign(&payload);
        Ok(self)
    }

    /// Attaches an arbitrary signature to input `index`.
    pub fn signature(mut self, index: usize, signature: Signature) -> Result<Self, TransactionError> {
        let inputs = self.inputs.len();
        let input = self
            .inputs
            .get_mut(index)
            .ok_or(TransactionError::InputIndexOutOfRange { index, inputs })?;
        input.signature = signature;
        Ok(self)
    }

    pub fn build(self) -> Result<Transaction, TransactionError> {
        Transaction::new(self.inputs, self.outputs)
    }
}
