use datamirror_core::logging;

mod cli;

use crate::cli::Cli;

fn main() {
    logging::init();

    if let Err(err) = Cli::run_from_args() {
        // Usage errors keep clap's rendering and exit code.
        if let Some(usage) = err.downcast_ref::<clap::Error>() {
            usage.exit();
        }
        eprintln!("datamirror error: {:#}", err);
        std::process::exit(1);
    }
}
