use std::process::ExitCode;

use clap::Parser;

mod args;
mod cmd;
mod logging;
mod output;

fn main() -> ExitCode {
    let cli = args::Cli::parse();
    logging::init(cli.verbose, cli.quiet);
    let out = output::Output::new(cli.json);

    match cmd::dispatch(&cli, &out) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            out.error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
