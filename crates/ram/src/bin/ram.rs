use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    cli_support::install("ram", env!("CARGO_PKG_VERSION"));
    let cli = ram::Cli::parse();
    cli_support::init_tracing(cli.args.verbose);

    match ram::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            ExitCode::FAILURE
        }
    }
}
