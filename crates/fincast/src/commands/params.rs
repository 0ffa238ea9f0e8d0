//! `fincast params` -- list the parameters a model declares.

use anyhow::Result;

use fincast_engine::model;

use crate::cli::ParamsArgs;
use crate::context::RuntimeContext;
use crate::output::{output_json, render_kind};

/// Execute the `fincast params` command.
pub fn run(ctx: &RuntimeContext, args: &ParamsArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let path = model::find_model(&args.model, &cwd)?;
    let model = model::load_model(&path)?;

    // Building the context compiles every formula, so a listing doubles as
    // a syntax check.
    let context = model.builder().build()?;

    if ctx.json {
        output_json(context.parameters());
        return Ok(());
    }

    println!("Model: {} ({})", model.name, model.source);
    if !model.description.is_empty() {
        println!("{}", model.description);
    }
    println!("Parameters ({}):", context.parameters().len());
    for parameter in context.parameters().values() {
        let deps = if parameter.dependencies.is_empty() {
            String::new()
        } else {
            format!(" (depends on: {})", parameter.dependencies.join(", "))
        };
        let variants = if parameter.cardinality > 1 {
            format!(" x{}", parameter.cardinality)
        } else {
            String::new()
        };
        println!(
            "  {} [{}]{}: {}{}",
            parameter.key,
            render_kind(parameter.kind()),
            variants,
            parameter.name,
            deps,
        );
    }

    if !ctx.quiet {
        println!();
        println!("{} scenario(s) when evaluated", context.scenario_count());
    }
    Ok(())
}
