//! Shop - Local-first shopping lists

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = shoplist::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
