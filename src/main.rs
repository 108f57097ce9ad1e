use clap::Command;
use std::error::Error;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,scroogecoin_lib=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("scroogecoin")
        .about("ScroogeCoin epoch processing tools.")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(scroogecoin_lib::commands::epoch_command())
        .subcommand(scroogecoin_lib::commands::demo_command())
        .subcommand(scroogecoin_lib::commands::keygen_command())
        .get_matches();

    if let Some(matches) = matches.subcommand_matches("epoch") {
        scroogecoin_lib::commands::run_epoch_command(matches)
    } else if let Some(matches) = matches.subcommand_matches("demo") {
        scroogecoin_lib::commands::run_demo_command(matches)
    } else if let Some(matches) = matches.subcommand_matches("keygen") {
        scroogecoin_lib::commands::run_keygen_command(matches)
    } else {
        panic!("Should report help.");
    }
}
