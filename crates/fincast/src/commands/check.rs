//! `fincast check` -- validate a model end to end.
//!
//! Parses every formula, builds the context, and evaluates the full
//! scenario set, so parse errors, unknown symbols, cycles, and cap
//! violations all surface before a model is relied on.

use anyhow::Result;

use fincast_engine::{Bindings, model};

use crate::cli::CheckArgs;
use crate::context::RuntimeContext;
use crate::output::{ICON_PASS, output_json, render_pass};

use super::eval::build_context;

/// Execute the `fincast check` command.
pub fn run(ctx: &RuntimeContext, args: &CheckArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let path = model::find_model(&args.model, &cwd)?;
    let model = model::load_model(&path)?;

    let context = build_context(ctx, &model, &args.given, args.given_file.as_deref())?;
    let results = context.evaluate(&Bindings::new())?;

    if ctx.json {
        output_json(&serde_json::json!({
            "model": model.name,
            "source": model.source,
            "parameters": context.parameters().len(),
            "scenarios": results.len(),
            "ok": true,
        }));
        return Ok(());
    }

    println!(
        "{} {}: {} parameters, {} scenario(s)",
        render_pass(ICON_PASS),
        model.name,
        context.parameters().len(),
        results.len(),
    );
    Ok(())
}
