use crate::{
    Coin, EpochFile, EpochHandler, MaxFeeTxHandler, Transaction, TransactionValidator, TxHandler,
    UtxoPool,
};
use clap::{Arg, ArgMatches, Command};
use std::error::Error;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HandlerKind {
    Basic,
    MaxFee,
}

struct EpochCliOptions {
    file: PathBuf,
    handler: HandlerKind,
}

impl EpochCliOptions {
    pub fn parse(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        let file = matches
            .value_of("file")
            .ok_or("Missing epoch file argument.")?;
        let handler = match matches.value_of("handler") {
            Some("max-fee") => HandlerKind::MaxFee,
            Some("basic") | None => HandlerKind::Basic,
            Some(other) => return Err(format!("Unknown handler: {}", other).into()),
        };
        Ok(Self {
            file: PathBuf::from(file),
            handler,
        })
    }
}

pub fn epoch_command() -> Command<'static> {
    Command::new("epoch")
        .version("0.1")
        .about("Processes one epoch: validates the batch against the pool and commits the accepted transactions.")
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("PATH")
                .help("JSON file with the pool snapshot and the proposed transactions.")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("handler")
                .long("handler")
                .value_name("HANDLER")
                .help("Selection strategy for the epoch.")
                .takes_value(true)
                .possible_values(["basic", "max-fee"])
                .default_value("basic"),
        )
}

pub fn run_epoch_command(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let options = EpochCliOptions::parse(matches)?;
    let epoch_file = EpochFile::load(&options.file)?;
    let pool = epoch_file.utxo_pool()?;
    let batch = epoch_file.batch()?;

    let (accepted, final_pool) = match options.handler {
        HandlerKind::Basic => {
            let mut handler = TxHandler::new(pool.clone());
            let accepted = handler.handle_txs(batch.clone());
            (accepted, handler.into_utxo_pool())
        }
        HandlerKind::MaxFee => {
            let mut handler = MaxFeeTxHandler::new(pool.clone());
            let accepted = handler.handle_txs(batch.clone());
            (accepted, handler.into_utxo_pool())
        }
    };

    println!(
        "Accepted {} of {} proposed transactions",
        accepted.len(),
        batch.len()
    );
    let fees = replay_fees(&pool, &accepted)?;
    for (transaction, fee) in accepted.iter().zip(fees.iter()) {
        println!("{} fee {}", transaction.id(), fee);
    }
    println!(
        "Total fee: {}",
        Coin::checked_sum(fees).ok_or("Total fee out of range.")?
    );
    println!("Unspent outputs: {}", final_pool.len());
    for (utxo, output) in final_pool.iter() {
        println!("{} -> {}", utxo, output);
    }
    Ok(())
}

/// Fees of the accepted transactions, priced against the pool as it was when each one was
/// committed.
fn replay_fees(pool: &UtxoPool, accepted: &[Transaction]) -> Result<Vec<Coin>, Box<dyn Error>> {
    let mut replay = pool.clone();
    let mut fees = Vec::with_capacity(accepted.len());
    for transaction in accepted {
        fees.push(TransactionValidator::fee(transaction, &replay)?);
        replay.apply_transaction(transaction);
    }
    Ok(fees)
}
