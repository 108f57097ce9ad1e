use crate::{Coin, SignatureVerifier, Transaction, TransactionOutput, Utxo, UtxoPool};
use std::collections::HashSet;
use thiserror::Error;
use tracing::trace;

/// The reason a transaction is not acceptable against a pool.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidTransaction {
    #[error("input claims {0}, which is unknown or already spent")]
    MissingUtxo(Utxo),
    #[error("signature of input {index} does not authorize spending {utxo}")]
    InvalidSignature { index: usize, utxo: Utxo },
    #[error("{0} is claimed more than once")]
    DoubleSpend(Utxo),
    #[error("output {index} has negative value {amount}")]
    NegativeOutput { index: usize, amount: Coin },
    #[error("outputs total {outputs} exceeds inputs total {inputs}")]
    InsufficientInputs { inputs: Coin, outputs: Coin },
    #[error("value total does not fit into the amount range")]
    ValueOverflow,
}

/// Totals of a transaction that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedTransaction {
    pub total_input: Coin,
    pub total_output: Coin,
    /// Never negative.
    pub fee: Coin,
}

/// Checks transactions against a pool snapshot. Validation never mutates the pool.
pub struct TransactionValidator {}

impl TransactionValidator {
    /// Valid iff:
    ///   1. every input claims an output present in the pool,
    ///   2. every input is signed by the owner of the output it claims,
    ///   3. no output is claimed twice,
    ///   4. no output value is negative,
    ///   5. the inputs total at least as much as the outputs.
    ///
    /// Checks run per input in that order, then per output, then the balance.
    /// The first failure is reported.
    pub fn validate<V: SignatureVerifier>(
        transaction: &Transaction,
        pool: &UtxoPool,
        verifier: &V,
    ) -> Result<ValidatedTransaction, InvalidTransaction> {
        let mut claimed = HashSet::with_capacity(transaction.inputs().len());
        let mut total_input = Coin::zero();

        for (index, input) in transaction.inputs().iter().enumerate() {
            let utxo = input.utxo();
            let spent_output = pool
                .get(&utxo)
                .ok_or(InvalidTransaction::MissingUtxo(utxo))?;

            let authorized = transaction
                .raw_data_to_sign(index)
                .map(|payload| verifier.verify(spent_output.owner(), &payload, input.signature()))
                .unwrap_or(false);
            if !authorized {
                return Err(InvalidTransaction::InvalidSignature { index, utxo });
            }

            if !claimed.insert(utxo) {
                return Err(InvalidTransaction::DoubleSpend(utxo));
            }

            total_input = total_input
                .checked_add(spent_output.amount())
                .ok_or(InvalidTransaction::ValueOverflow)?;
        }

        let mut total_output = Coin::zero();
        for (index, output) in transaction.outputs().iter().enumerate() {
            if output.amount().is_negative() {
                return Err(InvalidTransaction::NegativeOutput {
                    index,
                    amount: output.amount(),
                });
            }
            total_output = total_output
                .checked_add(output.amount())
                .ok_or(InvalidTransaction::ValueOverflow)?;
        }

        if total_input < total_output {
            return Err(InvalidTransaction::InsufficientInputs {
                inputs: total_input,
                outputs: total_output,
            });
        }

        // Both totals are non-negative here, so the difference cannot overflow.
        let fee = total_input
            .checked_sub(total_output)
            .ok_or(InvalidTransaction::ValueOverflow)?;
        Ok(ValidatedTransaction {
            total_input,
            total_output,
            fee,
        })
    }

    pub fn is_valid<V: SignatureVerifier>(
        transaction: &Transaction,
        pool: &UtxoPool,
        verifier: &V,
    ) -> bool {
        match Self::validate(transaction, pool, verifier) {
            Ok(_) => true,
            Err(reason) => {
                trace!(transaction = %transaction.id(), %reason, "Rejected transaction");
                false
            }
        }
    }

    /// Inputs total minus outputs total, priced against the pool.
    ///
    /// Only meaningful for a transaction that is valid against `pool`; a claimed output
    /// missing from the pool is reported rather than counted as zero.
    pub fn fee(transaction: &Transaction, pool: &UtxoPool) -> Result<Coin, InvalidTransaction> {
        let spent_outputs = transaction
            .inputs()
            .iter()
            .map(|input| {
                let utxo = input.utxo();
                pool.get(&utxo)
                    .map(TransactionOutput::amount)
                    .ok_or(InvalidTransaction::MissingUtxo(utxo))
            })
            .collect::<Result<Vec<Coin>, InvalidTransaction>>()?;
        let total_input =
            Coin::checked_sum(spent_outputs).ok_or(InvalidTransaction::ValueOverflow)?;
        let total_output = Coin::checked_sum(transaction.outputs().iter().map(|o| o.amount()))
            .ok_or(InvalidTransaction::ValueOverflow)?;
        total_input
            .checked_sub(total_output)
            .ok_or(InvalidTransaction::ValueOverflow)
    }
}
