use anyhow::Context;
use clap::Parser;
use clusteradm::cli::{self, Cli, CliError};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("ERROR: {:#}", e);
            match e.downcast_ref::<CliError>() {
                Some(cli_error) => cli_error.exit_code(),
                None => ExitCode::from(2),
            }
        }
    }
}

async fn run(args: Cli) -> anyhow::Result<ExitCode> {
    cli::execute(args)
        .await
        .context("clusteradm could not run the command")
}
