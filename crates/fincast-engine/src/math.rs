//! Wrapper around the `evalexpr` collaborator.
//!
//! This is the only module that touches arithmetic. Formulas are compiled
//! once into an operator tree; the tree yields the referenced variable
//! identifiers and is evaluated against a numeric scope. Arithmetic
//! semantics (precedence, `^` exponentiation, int/float coercion) are
//! evalexpr's own and are treated as authoritative.

use evalexpr::{ContextWithMutableVariables, Node};

use crate::bindings::Bindings;
use crate::error::{EngineError, Result};

/// Compiles a formula into an operator tree.
///
/// Fails with [`EngineError::MalformedExpression`] if the formula does not
/// parse.
pub fn compile(formula: &str) -> Result<Node> {
    evalexpr::build_operator_tree(formula).map_err(|source| EngineError::MalformedExpression {
        formula: formula.to_string(),
        source,
    })
}

/// Collects the variable identifiers referenced by a compiled formula,
/// first-seen order, deduplicated.
///
/// Function identifiers are not variables: `min(a, b)` references `a` and
/// `b` only.
pub fn variables(node: &Node) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for identifier in node.iter_variable_identifiers() {
        if !seen.iter().any(|s| s == identifier) {
            seen.push(identifier.to_string());
        }
    }
    seen
}

/// Parses a formula and returns the symbols it references.
pub fn extract_symbols(formula: &str) -> Result<Vec<String>> {
    Ok(variables(&compile(formula)?))
}

/// Evaluates a compiled formula against a numeric scope.
///
/// Integer results are widened to `f64`. The raw evalexpr error is returned
/// so callers can attach the formula and owning key.
pub(crate) fn evaluate(node: &Node, scope: &Bindings) -> std::result::Result<f64, evalexpr::EvalexprError> {
    let mut context = evalexpr::HashMapContext::new();
    for (name, value) in scope.iter() {
        context.set_value(name.clone(), evalexpr::Value::from(*value))?;
    }
    node.eval_number_with_context(&context)
}
