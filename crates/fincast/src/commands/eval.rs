//! `fincast eval` -- evaluate every scenario of a model.
//!
//! Loads a model file, applies pretext bindings from flags and files,
//! evaluates the full scenario set, and prints the results side by side,
//! one column per scenario.

use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::debug;

use fincast_engine::{Bindings, Model, ResultMap, model};

use crate::cli::EvalArgs;
use crate::context::RuntimeContext;
use crate::output::{format_value, output_json, output_table};

/// Execute the `fincast eval` command.
pub fn run(ctx: &RuntimeContext, args: &EvalArgs) -> Result<()> {
    // 1. Find and load the model
    let cwd = std::env::current_dir()?;
    let path = model::find_model(&args.model, &cwd)?;
    let model = model::load_model(&path)?;

    // 2. Build the context with pretext from --given-file and --given
    let context = build_context(ctx, &model, &args.given, args.given_file.as_deref())?;

    // 3. Evaluate with --set overrides as posttext
    let posttext = Bindings::from_pairs(parse_binding_flags(&args.set)?);
    let results = context.evaluate(&posttext)?;
    debug!(model = %model.name, scenarios = results.len(), "evaluated model");

    if ctx.json {
        output_json(&results);
        return Ok(());
    }

    print_results(ctx, args.precision.unwrap_or(ctx.precision), &results);
    Ok(())
}

/// Parse `--given key=value` / `--set key=value` flags into pairs.
pub(crate) fn parse_binding_flags(flags: &[String]) -> Result<Vec<(String, f64)>> {
    let mut pairs = Vec::with_capacity(flags.len());
    for flag in flags {
        let parts: Vec<&str> = flag.splitn(2, '=').collect();
        if parts.len() != 2 {
            bail!("invalid binding format '{}': expected key=value", flag);
        }
        let value: f64 = match parts[1].trim().parse() {
            Ok(value) => value,
            Err(_) => bail!("invalid numeric value in '{}': expected key=number", flag),
        };
        pairs.push((parts[0].trim().to_string(), value));
    }
    Ok(pairs)
}

/// Read a JSON object of `key: number` pairs as bindings.
///
/// The `plain` map of a prior `eval --json` run is a valid input, which is
/// how chained projections pass state forward.
pub(crate) fn read_bindings_file(path: &Path) -> Result<Bindings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read bindings file: {}", path.display()))?;
    let bindings: Bindings = serde_json::from_str(&content)
        .with_context(|| format!("invalid bindings file: {}", path.display()))?;
    Ok(bindings)
}

/// Build an evaluation context from a model plus `--given`/`--given-file`
/// bindings, capped by the runtime scenario limit.
///
/// File bindings apply first, so individual `--given` flags win.
pub(crate) fn build_context(
    ctx: &RuntimeContext,
    model: &Model,
    given: &[String],
    given_file: Option<&Path>,
) -> Result<fincast_engine::Context> {
    let mut builder = model.builder().max_cardinality(ctx.max_scenarios);
    if let Some(file) = given_file {
        for (key, value) in read_bindings_file(file)?.iter() {
            builder = builder.given(key.clone(), *value);
        }
    }
    for (key, value) in parse_binding_flags(given)? {
        builder = builder.given(key, value);
    }
    Ok(builder.build()?)
}

/// Print results as a table, one column per scenario.
fn print_results(ctx: &RuntimeContext, precision: u8, results: &[ResultMap]) {
    let Some(first) = results.first() else {
        return;
    };

    let mut headers: Vec<String> = Vec::with_capacity(results.len() + 1);
    headers.push("KEY".to_string());
    for i in 1..=results.len() {
        headers.push(format!("S{}", i));
    }
    let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();

    let mut rows: Vec<Vec<String>> = Vec::with_capacity(first.evaluated.len());
    for key in first.evaluated.keys() {
        let mut row = Vec::with_capacity(results.len() + 1);
        row.push(key.clone());
        for result in results {
            row.push(match result.value(key) {
                Some(value) => format_value(value, precision),
                None => "-".to_string(),
            });
        }
        rows.push(row);
    }
    output_table(&header_refs, &rows);

    // Legend mapping scenario columns to the comparison choices behind them.
    if !ctx.quiet && results.iter().any(|r| !r.hash.is_empty()) {
        println!();
        for (i, result) in results.iter().enumerate() {
            let hash = if result.hash.is_empty() {
                "-"
            } else {
                result.hash.as_str()
            };
            println!("S{}: {}", i + 1, hash);
        }
    }
}
