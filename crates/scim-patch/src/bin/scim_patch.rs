//! `scim-patch`: apply a SCIM PATCH request to a resource document.
//!
//! Usage:
//!   scim-patch [--resource FILE] [--schema FILE]... [--changed] '<request-json>'
//!
//! The resource is read from stdin unless `--resource` is given. The request
//! may be a PatchOp message, a list of operations, or a single operation.
//! Errors are printed to stderr; PATCH errors as a SCIM error body.

use std::process;

use clap::Parser;
use scim_patch::cli::{init_tracing, run, Args, CliError};
use scim_patch::codec::error_to_json;

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("{e}");
                process::exit(2);
            }
        },
        Err(CliError::Patch(err)) => {
            eprintln!("{}", error_to_json(&err));
            process::exit(1);
        }
        Err(e) => {
            eprintln!("{e}");
            process::exit(2);
        }
    }
}
