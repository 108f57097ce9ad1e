use crate::EpochFile;
use clap::{Arg, ArgMatches, Command};
use std::error::Error;
use std::path::PathBuf;

struct DemoCliOptions {
    out: PathBuf,
    seed: u8,
}

impl DemoCliOptions {
    pub fn parse(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            out: matches
                .value_of("out")
                .map(PathBuf::from)
                .ok_or("Missing output path argument.")?,
            seed: matches.value_of_t::<u8>("seed")?,
        })
    }
}

pub fn demo_command() -> Command<'static> {
    Command::new("demo")
        .version("0.1")
        .about("Writes a signed sample epoch file that can be fed to the epoch command.")
        .arg(
            Arg::new("out")
                .short('o')
                .long("out")
                .value_name("PATH")
                .help("Where to write the epoch file.")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("SEED")
                .help("Seed of the sample keys, 0-255.")
                .takes_value(true)
                .default_value("0"),
        )
}

pub fn run_demo_command(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let options = DemoCliOptions::parse(matches)?;
    let demo = EpochFile::demo(options.seed)?;
    demo.save(&options.out)?;
    println!(
        "Wrote {} unspent outputs and {} proposed transactions to {}",
        demo.utxos.len(),
        demo.transactions.len(),
        options.out.display()
    );
    Ok(())
}
