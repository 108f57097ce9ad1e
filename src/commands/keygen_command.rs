use crate::{KeyPair, Sha256};
use clap::{Arg, ArgMatches, Command};
use std::error::Error;

struct KeygenCliOptions {
    seed: Option<[u8; 32]>,
}

impl KeygenCliOptions {
    pub fn parse(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        let seed = match matches.value_of("seed") {
            // Any 32-byte hex string is a valid Ed25519 seed.
            Some(hex) => {
                let mut seed = [0; 32];
                seed.copy_from_slice(Sha256::from_hex(hex)?.as_slice());
                Some(seed)
            }
            None => None,
        };
        Ok(Self { seed })
    }
}

pub fn keygen_command() -> Command<'static> {
    Command::new("keygen")
        .version("0.1")
        .about("Generates a key pair for signing transaction inputs.")
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("HEX")
                .help("32-byte hex seed. A random key pair is generated when omitted.")
                .takes_value(true)
                .required(false),
        )
}

pub fn run_keygen_command(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let options = KeygenCliOptions::parse(matches)?;
    let key_pair = match options.seed {
        Some(seed) => KeyPair::from_seed(&seed),
        None => KeyPair::generate(),
    };
    println!("secret: {}", hex::encode(key_pair.seed()));
    println!("public: {}", key_pair.public_key());
    Ok(())
}
