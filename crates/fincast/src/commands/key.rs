//! `fincast key` -- evaluate a single key across all scenarios.

use anyhow::Result;
use tracing::debug;

use fincast_engine::{Bindings, model};

use crate::cli::KeyArgs;
use crate::context::RuntimeContext;
use crate::output::{format_value, output_json, output_table};

use super::eval::{build_context, parse_binding_flags};

/// Execute the `fincast key` command.
pub fn run(ctx: &RuntimeContext, args: &KeyArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let path = model::find_model(&args.model, &cwd)?;
    let model = model::load_model(&path)?;

    let context = build_context(ctx, &model, &args.given, args.given_file.as_deref())?;

    let posttext = Bindings::from_pairs(parse_binding_flags(&args.set)?);
    let evaluated = context.evaluate_key(&args.key, &posttext)?;
    debug!(key = %args.key, scenarios = evaluated.len(), "evaluated key");

    if ctx.json {
        output_json(&evaluated);
        return Ok(());
    }

    let precision = args.precision.unwrap_or(ctx.precision);
    let rows: Vec<Vec<String>> = evaluated
        .iter()
        .enumerate()
        .map(|(i, e)| {
            vec![
                format!("S{}", i + 1),
                format_value(e.value, precision),
                e.formula.clone(),
            ]
        })
        .collect();
    output_table(&["SCENARIO", "VALUE", "FORMULA"], &rows);
    Ok(())
}
