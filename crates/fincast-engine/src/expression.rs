//! Expressions and their evaluated form.
//!
//! An [`Expression`] is one candidate formula bound to a parameter key. It
//! is compiled once at construction; the compiled tree provides the
//! dependency list and is reused for every evaluation. Dependencies already
//! satisfied by the pretext are pre-satisfied and never recursed into, which
//! is what `argument_dependencies` captures.

use evalexpr::Node;
use serde::Serialize;

use crate::bindings::Bindings;
use crate::error::{EngineError, Result};
use crate::math;

/// One candidate formula of a parameter.
#[derive(Debug, Clone, Serialize)]
pub struct Expression {
    /// Key of the owning parameter.
    pub key: String,

    /// Human-readable name of the owning parameter.
    pub name: String,

    /// The formula text as declared.
    pub formula: String,

    /// Variant count of the owning parameter.
    pub cardinality: usize,

    /// Symbols the formula references, first-seen order.
    pub dependencies: Vec<String>,

    /// Dependencies not satisfied by the pretext; these are resolved by
    /// recursion at evaluation time.
    pub argument_dependencies: Vec<String>,

    /// Compiled operator tree (built once, reused per evaluation).
    #[serde(skip)]
    node: Node,
}

impl Expression {
    /// Compiles `formula` for the parameter `key`.
    ///
    /// Fails with [`EngineError::MalformedExpression`] if the formula does
    /// not parse.
    pub(crate) fn new(
        key: &str,
        name: &str,
        cardinality: usize,
        formula: &str,
        pretext: &Bindings,
    ) -> Result<Self> {
        let node = math::compile(formula)?;
        let dependencies = math::variables(&node);
        let argument_dependencies = dependencies
            .iter()
            .filter(|dep| !pretext.contains_key(dep))
            .cloned()
            .collect();

        Ok(Self {
            key: key.to_string(),
            name: name.to_string(),
            formula: formula.to_string(),
            cardinality,
            dependencies,
            argument_dependencies,
            node,
        })
    }

    /// Evaluates the formula against `pretext` ∪ `arguments` ∪ `posttext`.
    ///
    /// `arguments` holds the computed values of this expression's argument
    /// dependencies. Every dependency must be present in the merged scope;
    /// the first missing symbol fails with [`EngineError::MissingScopeKey`].
    /// A rejection by the expression library at evaluation time surfaces as
    /// [`EngineError::Evaluation`].
    pub fn evaluate(
        &self,
        arguments: Bindings,
        pretext: &Bindings,
        posttext: &Bindings,
    ) -> Result<EvaluatedExpression> {
        let mut scope = pretext.clone();
        scope.extend_from(&arguments);
        scope.extend_from(posttext);

        for dep in &self.dependencies {
            if !scope.contains_key(dep) {
                return Err(EngineError::MissingScopeKey {
                    key: dep.clone(),
                    formula: self.formula.clone(),
                });
            }
        }

        let value = math::evaluate(&self.node, &scope).map_err(|source| EngineError::Evaluation {
            formula: self.formula.clone(),
            key: self.key.clone(),
            source,
        })?;

        Ok(EvaluatedExpression {
            key: self.key.clone(),
            name: self.name.clone(),
            formula: self.formula.clone(),
            cardinality: self.cardinality,
            arguments,
            value,
        })
    }

    /// Stable identity of this variant, `"<key>=<formula>"`.
    pub fn identity(&self) -> String {
        format!("{}={}", self.key, self.formula)
    }
}

/// The numeric outcome of evaluating one [`Expression`] within one scenario.
///
/// Owned by the scenario's memo; never mutated after creation.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluatedExpression {
    /// Key of the owning parameter.
    pub key: String,

    /// Human-readable name of the owning parameter.
    pub name: String,

    /// The formula that produced `value`.
    pub formula: String,

    /// Variant count of the owning parameter. Scenario hashes only include
    /// evaluated expressions with cardinality above one.
    pub cardinality: usize,

    /// Resolved values of the computed dependencies (pretext and posttext
    /// pass-throughs are excluded).
    pub arguments: Bindings,

    /// The evaluated numeric result.
    pub value: f64,
}

impl EvaluatedExpression {
    /// Stable identity of the chosen variant, `"<key>=<formula>"`.
    ///
    /// Used for display and for scenario hashing.
    pub fn identity(&self) -> String {
        format!("{}={}", self.key, self.formula)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_dependencies_by_pretext() {
        let pretext = Bindings::from_pairs([("month", 3.0)]);
        let expr = Expression::new(
            "account_value",
            "Account value",
            1,
            "starting_value * month + monthly_investment",
            &pretext,
        )
        .unwrap();

        assert_eq!(
            expr.dependencies,
            ["starting_value", "month", "monthly_investment"]
        );
        assert_eq!(
            expr.argument_dependencies,
            ["starting_value", "monthly_investment"]
        );
    }

    #[test]
    fn evaluates_with_computed_arguments() {
        let pretext = Bindings::new();
        let expr = Expression::new("total", "Total", 1, "rent + other", &pretext).unwrap();
        let args = Bindings::from_pairs([("rent", 900.0), ("other", 2500.0)]);

        let evaluated = expr.evaluate(args, &pretext, &Bindings::new()).unwrap();
        assert_eq!(evaluated.value, 3400.0);
        assert_eq!(evaluated.identity(), "total=rent + other");
        assert_eq!(evaluated.arguments.get("rent"), Some(900.0));
    }

    #[test]
    fn missing_dependency_reports_the_symbol() {
        let pretext = Bindings::new();
        let expr = Expression::new("b", "B", 1, "a + z", &pretext).unwrap();
        let args = Bindings::from_pairs([("a", 1.0)]);

        let err = expr.evaluate(args, &pretext, &Bindings::new()).unwrap_err();
        match err {
            EngineError::MissingScopeKey { key, formula } => {
                assert_eq!(key, "z");
                assert_eq!(formula, "a + z");
            }
            other => panic!("expected MissingScopeKey, got {other:?}"),
        }
    }

    #[test]
    fn posttext_wins_in_scope() {
        let pretext = Bindings::new();
        let expr = Expression::new("b", "B", 1, "a + 1", &pretext).unwrap();
        let args = Bindings::from_pairs([("a", 1.0)]);
        let posttext = Bindings::from_pairs([("a", 5.0)]);

        let evaluated = expr.evaluate(args, &pretext, &posttext).unwrap();
        assert_eq!(evaluated.value, 6.0);
    }

    #[test]
    fn pretext_satisfies_dependencies_without_arguments() {
        let pretext = Bindings::from_pairs([("interest_rate", 0.07)]);
        let expr = Expression::new("growth", "Growth", 1, "1 + interest_rate", &pretext).unwrap();
        assert!(expr.argument_dependencies.is_empty());

        let evaluated = expr
            .evaluate(Bindings::new(), &pretext, &Bindings::new())
            .unwrap();
        assert_eq!(evaluated.value, 1.07);
    }
}
