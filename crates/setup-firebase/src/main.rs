//! setup-firebase CLI entry point.

// CLI binary needs to output to stdout/stderr - this is intentional
#![allow(clippy::print_stdout, clippy::print_stderr)]

use clap::Parser;
use setup_firebase::cli::{Cli, CliError, EXIT_OK, OkEnvelope, exit_code_for, render_error};
use setup_firebase::{Outcome, logging, run};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_tracing(cli.verbose, cli.json) {
        let err = CliError::config(e.to_string());
        render_error(&err, cli.json);
        std::process::exit(exit_code_for(&err));
    }

    let code = match run(&cli).await {
        Ok(outcome) => {
            print_outcome(&outcome, cli.json);
            EXIT_OK
        }
        Err(err) => {
            render_error(&err, cli.json);
            exit_code_for(&err)
        }
    };
    std::process::exit(code);
}

fn print_outcome(outcome: &Outcome, json: bool) {
    match (outcome, json) {
        (Outcome::Installed(tool), false) => println!("{}", tool.bin_dir.display()),
        (Outcome::Installed(tool), true) => print_json(&serde_json::json!({
            "version": tool.version.as_str(),
            "path": tool.bin_dir,
            "installRoot": tool.install_root,
            "cacheHit": tool.cache_hit,
        })),
        (Outcome::Listed(versions), false) => {
            for version in versions {
                println!("{version}");
            }
        }
        (Outcome::Listed(versions), true) => {
            print_json(&serde_json::json!({ "versions": versions }));
        }
    }
}

fn print_json(data: &serde_json::Value) {
    match serde_json::to_string(&OkEnvelope::new(data)) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Error serializing response: {e}"),
    }
}
