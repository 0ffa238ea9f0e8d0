//! The context: root object owning parameters and pretext.

use indexmap::IndexMap;
use tracing::debug;

use crate::bindings::Bindings;
use crate::error::{EngineError, Result};
use crate::expression::EvaluatedExpression;
use crate::parameter::Parameter;
use crate::result::ResultMap;
use crate::scenario::{self, Scenario};

/// Default cap on the number of scenarios a context may expand to.
pub const DEFAULT_MAX_CARDINALITY: usize = 1000;

/// The root object: an ordered parameter set plus the externally supplied
/// pretext.
///
/// Scenario generation happens on every evaluate call; nothing is cached
/// across calls, so re-evaluating the same context with identical input is
/// deterministic and side-effect-free.
#[derive(Debug, Clone)]
pub struct Context {
    parameters: IndexMap<String, Parameter>,
    pretext: Bindings,
    max_cardinality: usize,
}

impl Context {
    /// Starts building a context.
    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }

    /// The declared parameters, in declaration order.
    pub fn parameters(&self) -> &IndexMap<String, Parameter> {
        &self.parameters
    }

    /// Looks up a single parameter.
    pub fn parameter(&self, key: &str) -> Option<&Parameter> {
        self.parameters.get(key)
    }

    /// The externally supplied bindings.
    pub fn pretext(&self) -> &Bindings {
        &self.pretext
    }

    /// The configured scenario cap.
    pub fn max_cardinality(&self) -> usize {
        self.max_cardinality
    }

    /// The number of scenarios a full expansion would produce
    /// (the product of all parameter cardinalities).
    pub fn scenario_count(&self) -> usize {
        self.parameters
            .values()
            .fold(1usize, |acc, p| acc.saturating_mul(p.cardinality))
    }

    /// Expands the parameters into scenarios.
    ///
    /// Fails with [`EngineError::CardinalityExceeded`] if expansion would
    /// exceed the configured cap.
    pub fn scenarios(&self) -> Result<Vec<Scenario<'_>>> {
        scenario::expand(&self.parameters, &self.pretext, self.max_cardinality)
    }

    /// Evaluates every scenario fully.
    ///
    /// Scenarios are regenerated from scratch on each call.
    pub fn evaluate(&self, posttext: &Bindings) -> Result<Vec<ResultMap>> {
        let scenarios = self.scenarios()?;
        debug!(scenarios = scenarios.len(), "evaluating context");
        scenarios.iter().map(|s| s.evaluate(posttext)).collect()
    }

    /// Evaluates a single key across every scenario.
    ///
    /// Pays the full expansion cost but only evaluates the requested key
    /// (and its dependencies) per scenario.
    pub fn evaluate_key(&self, key: &str, posttext: &Bindings) -> Result<Vec<EvaluatedExpression>> {
        if !self.parameters.contains_key(key) {
            return Err(EngineError::unknown_parameter(key));
        }
        let scenarios = self.scenarios()?;
        debug!(key, scenarios = scenarios.len(), "evaluating key");
        scenarios.iter().map(|s| s.evaluate_key(key, posttext)).collect()
    }
}

/// Builder for constructing a [`Context`] with a fluent API.
///
/// Formula compilation happens in [`build`](Self::build), so parse failures
/// and duplicate keys surface before any evaluation. Formulas the expression
/// library parses but cannot execute are only rejected at evaluation time.
#[derive(Debug, Default)]
pub struct ContextBuilder {
    declarations: Vec<(String, String, Vec<String>)>,
    pretext: Bindings,
    max_cardinality: Option<usize>,
}

impl ContextBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a parameter. Declaration order is preserved.
    pub fn parameter<K, N, F, I>(mut self, key: K, name: N, formulas: I) -> Self
    where
        K: Into<String>,
        N: Into<String>,
        F: Into<String>,
        I: IntoIterator<Item = F>,
    {
        self.declarations.push((
            key.into(),
            name.into(),
            formulas.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Replaces the pretext with the given bindings.
    pub fn pretext(mut self, pretext: Bindings) -> Self {
        self.pretext = pretext;
        self
    }

    /// Binds a single pretext value, overriding any existing binding.
    pub fn given(mut self, key: impl Into<String>, value: f64) -> Self {
        self.pretext.insert(key, value);
        self
    }

    /// Caps scenario expansion (default [`DEFAULT_MAX_CARDINALITY`]).
    pub fn max_cardinality(mut self, limit: usize) -> Self {
        self.max_cardinality = Some(limit);
        self
    }

    /// Compiles the declarations into a [`Context`].
    pub fn build(self) -> Result<Context> {
        let mut parameters: IndexMap<String, Parameter> =
            IndexMap::with_capacity(self.declarations.len());
        for (key, name, formulas) in &self.declarations {
            if parameters.contains_key(key) {
                return Err(EngineError::declaration(format!(
                    "duplicate parameter key \"{key}\""
                )));
            }
            let parameter = Parameter::new(key, name, formulas, &self.pretext)?;
            parameters.insert(key.clone(), parameter);
        }

        Ok(Context {
            parameters,
            pretext: self.pretext,
            max_cardinality: self.max_cardinality.unwrap_or(DEFAULT_MAX_CARDINALITY),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn comparison_context() -> Context {
        Context::builder()
            .parameter("a", "A", ["1", "2"])
            .parameter("b", "B", ["a + 1"])
            .build()
            .unwrap()
    }

    #[test]
    fn evaluates_the_cartesian_product() {
        let ctx = comparison_context();
        let results = ctx.evaluate(&Bindings::new()).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(ctx.scenario_count(), 2);

        assert_eq!(results[0].value("a"), Some(1.0));
        assert_eq!(results[0].value("b"), Some(2.0));
        assert_eq!(results[1].value("a"), Some(2.0));
        assert_eq!(results[1].value("b"), Some(3.0));
    }

    #[test]
    fn hash_distinguishes_scenarios_by_comparison_choice() {
        let ctx = comparison_context();
        let results = ctx.evaluate(&Bindings::new()).unwrap();

        // `b` has cardinality 1 and never contributes.
        assert_eq!(results[0].hash, "a=1");
        assert_eq!(results[1].hash, "a=2");
    }

    #[test]
    fn evaluate_key_matches_full_evaluation() {
        let ctx = comparison_context();
        let full = ctx.evaluate(&Bindings::new()).unwrap();
        let single = ctx.evaluate_key("b", &Bindings::new()).unwrap();

        assert_eq!(single.len(), full.len());
        for (evaluated, result) in single.iter().zip(&full) {
            assert_eq!(Some(evaluated.value), result.value("b"));
        }
    }

    #[test]
    fn constants_are_identical_across_scenarios() {
        let ctx = Context::builder()
            .parameter("rate", "Rate", ["0.05", "0.07"])
            .parameter("rent", "Rent", ["900"])
            .build()
            .unwrap();

        let results = ctx.evaluate(&Bindings::new()).unwrap();
        assert_eq!(results.len(), 2);
        for result in &results {
            assert_eq!(result.value("rent"), Some(900.0));
        }
    }

    #[test]
    fn repeated_evaluation_is_deterministic() {
        let ctx = Context::builder()
            .parameter("a", "A", ["1", "2"])
            .parameter("b", "B", ["a * 3", "a - 1"])
            .parameter("c", "C", ["a + b"])
            .build()
            .unwrap();

        let first = serde_json::to_string(&ctx.evaluate(&Bindings::new()).unwrap()).unwrap();
        let second = serde_json::to_string(&ctx.evaluate(&Bindings::new()).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_key_is_rejected_up_front() {
        let ctx = comparison_context();
        let err = ctx.evaluate_key("nope", &Bindings::new()).unwrap_err();
        assert!(matches!(err, EngineError::UnknownParameter { .. }));
    }

    #[test]
    fn duplicate_declarations_are_rejected() {
        let err = Context::builder()
            .parameter("a", "A", ["1"])
            .parameter("a", "A again", ["2"])
            .build()
            .unwrap_err();
        assert!(matches!(err, EngineError::Declaration(_)));
    }

    #[test]
    fn malformed_formula_fails_at_build() {
        let err = Context::builder()
            .parameter("a", "A", ["(a"])
            .build()
            .unwrap_err();
        assert!(matches!(err, EngineError::MalformedExpression { .. }));
    }

    #[test]
    fn operator_arity_garbage_fails_at_evaluation_not_build() {
        // `1 +* 2` parses under evalexpr, so it survives the build and is
        // rejected per scenario at evaluation time.
        let ctx = Context::builder()
            .parameter("a", "A", ["1 +* 2"])
            .build()
            .unwrap();
        let err = ctx.evaluate(&Bindings::new()).unwrap_err();
        assert!(matches!(err, EngineError::Evaluation { .. }));
    }

    #[test]
    fn cap_applies_to_evaluation() {
        let ctx = Context::builder()
            .parameter("a", "A", ["1", "2", "3"])
            .parameter("b", "B", ["1", "2", "3"])
            .max_cardinality(4)
            .build()
            .unwrap();

        let err = ctx.evaluate(&Bindings::new()).unwrap_err();
        assert!(matches!(err, EngineError::CardinalityExceeded { limit: 4, .. }));
    }

    #[test]
    fn posttext_overrides_flow_into_dependents_and_results() {
        let ctx = Context::builder()
            .parameter("rent", "Rent", ["900"])
            .parameter("total", "Total", ["rent * 12"])
            .build()
            .unwrap();

        let posttext = Bindings::from_pairs([("rent", 1000.0)]);
        let results = ctx.evaluate(&posttext).unwrap();

        assert_eq!(results[0].value("total"), Some(12_000.0));
        // The posttext value is authoritative in the plain view.
        assert_eq!(results[0].value("rent"), Some(1000.0));
    }

    #[test]
    fn chained_contexts_consume_prior_results_as_pretext() {
        let yearly = Context::builder()
            .parameter("base_salary", "Base salary", ["149000"])
            .parameter("monthly_salary", "Monthly salary", ["base_salary / 12"])
            .build()
            .unwrap();
        let results = yearly.evaluate(&Bindings::new()).unwrap();

        let monthly = Context::builder()
            .pretext(results[0].plain.clone())
            .parameter("budget", "Budget", ["monthly_salary * 0.8"])
            .build()
            .unwrap();
        let results = monthly.evaluate(&Bindings::new()).unwrap();

        assert_eq!(results[0].value("budget"), Some(149_000.0 / 12.0 * 0.8));
    }
}
