pub mod coin;
pub mod commands;
pub mod epoch_file;
pub mod epoch_handler;
pub mod hash;
pub mod max_fee_tx_handler;
pub mod public_key;
pub mod signature;
pub mod transaction;
pub mod tx_handler;
pub mod utxo_pool;
pub mod validation;

pub use self::{
    coin::*, epoch_file::*, epoch_handler::*, hash::*, max_fee_tx_handler::*, public_key::*,
    signature::*, transaction::*, tx_handler::*, utxo_pool::*, validation::*,
};
