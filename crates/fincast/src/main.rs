//! `fincast` -- scenario-comparing projection CLI.
//!
//! This is the entry point for the fincast tool. It parses CLI arguments
//! with clap, resolves the runtime context, and dispatches to command
//! handlers.

mod cli;
mod commands;
mod config;
mod context;
mod output;

use clap::Parser;

use cli::{Cli, Commands};
use context::RuntimeContext;

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Build runtime context from global args and config file
    let ctx = match RuntimeContext::from_global_args(&cli.global) {
        Ok(ctx) => ctx,
        Err(e) => exit_with_error(cli.global.json, &e.into()),
    };

    // Set up logging based on verbosity
    if ctx.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("fincast=debug")
            .with_writer(std::io::stderr)
            .init();
    }

    // Dispatch to command handler
    let result = match cli.command {
        Some(Commands::Eval(args)) => commands::eval::run(&ctx, &args),
        Some(Commands::Key(args)) => commands::key::run(&ctx, &args),
        Some(Commands::Params(args)) => commands::params::run(&ctx, &args),
        Some(Commands::Check(args)) => commands::check::run(&ctx, &args),
        Some(Commands::Completion(args)) => commands::completion::run(&ctx, &args),
        None => {
            // No subcommand -- print help
            use clap::CommandFactory;
            Cli::command().print_help().ok();
            println!();
            Ok(())
        }
    };

    if let Err(e) = result {
        exit_with_error(ctx.json, &e);
    }
}

/// Print an error (as JSON when requested) and exit with code 1.
fn exit_with_error(json: bool, e: &anyhow::Error) -> ! {
    if json {
        let err_json = serde_json::json!({
            "error": format!("{:#}", e),
        });
        if let Ok(s) = serde_json::to_string_pretty(&err_json) {
            eprintln!("{}", s);
        }
    } else {
        eprintln!("Error: {:#}", e);
    }
    std::process::exit(1);
}
