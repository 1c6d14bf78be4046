//! `schemasync`: regenerate a frontend API client from a running backend.

use std::process::ExitCode;

use schemasync_cli::error::{exit_code_from_error, report};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match schemasync_cli::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::from(exit_code_from_error(&err))
        },
    }
}
