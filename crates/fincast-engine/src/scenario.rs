//! Scenario expansion and per-scenario evaluation.
//!
//! The generator expands an ordered parameter collection into the cartesian
//! product of "one chosen expression per parameter" bindings, enforcing the
//! cardinality cap during expansion (never after full materialization). Each
//! resulting [`Scenario`] evaluates keys on demand through a resolver that
//! keeps one memo table and an explicit path stack, so a diamond dependency
//! is evaluated exactly once per scenario while a true cycle is rejected
//! with its full path.

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::bindings::Bindings;
use crate::error::{EngineError, Result};
use crate::expression::{EvaluatedExpression, Expression};
use crate::parameter::Parameter;
use crate::result::ResultMap;

/// One total choice of variants: exactly one expression per parameter key,
/// paired with the context's pretext.
///
/// Scenarios are produced by [`expand`] and borrow their expressions from
/// the owning context. Evaluation state never crosses scenario boundaries.
#[derive(Debug)]
pub struct Scenario<'c> {
    bindings: IndexMap<String, &'c Expression>,
    pretext: &'c Bindings,
}

/// Expands parameters into the full cartesian product of variant choices.
///
/// The working list starts with one empty partial binding. A parameter's
/// first variant is written into every existing partial binding; each
/// subsequent variant clones the partial bindings still holding the first
/// variant and replaces the entry. Whenever an expansion step grows the
/// working list beyond `max_cardinality`, expansion stops with
/// [`EngineError::CardinalityExceeded`].
pub(crate) fn expand<'c>(
    parameters: &'c IndexMap<String, Parameter>,
    pretext: &'c Bindings,
    max_cardinality: usize,
) -> Result<Vec<Scenario<'c>>> {
    // Partial bindings map key -> chosen variant index.
    let mut working: Vec<IndexMap<String, usize>> = vec![IndexMap::new()];

    for (key, parameter) in parameters {
        for variant in 0..parameter.cardinality {
            if variant == 0 {
                for partial in &mut working {
                    partial.insert(key.clone(), 0);
                }
            } else {
                let clones: Vec<IndexMap<String, usize>> = working
                    .iter()
                    .filter(|partial| partial.get(key) == Some(&0))
                    .map(|partial| {
                        let mut clone = partial.clone();
                        clone.insert(key.clone(), variant);
                        clone
                    })
                    .collect();
                working.extend(clones);

                if working.len() > max_cardinality {
                    return Err(EngineError::CardinalityExceeded {
                        count: working.len(),
                        limit: max_cardinality,
                    });
                }
            }
        }
    }

    debug!(
        parameters = parameters.len(),
        scenarios = working.len(),
        "expanded scenario set"
    );

    let scenarios = working
        .iter()
        .map(|choice| {
            let mut bindings: IndexMap<String, &'c Expression> =
                IndexMap::with_capacity(parameters.len());
            for (key, parameter) in parameters {
                if let Some(&variant) = choice.get(key) {
                    bindings.insert(key.clone(), &parameter.expressions[variant]);
                }
            }
            Scenario { bindings, pretext }
        })
        .collect();

    Ok(scenarios)
}

impl<'c> Scenario<'c> {
    /// Bound parameter keys, declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.bindings.keys()
    }

    /// The expression chosen for `key` in this scenario.
    pub fn expression(&self, key: &str) -> Option<&Expression> {
        self.bindings.get(key).copied()
    }

    /// Number of bound parameters.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` if the scenario binds no parameters.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Evaluates a single key, resolving its dependencies as needed.
    ///
    /// A key with no bound expression fails with
    /// [`EngineError::UnknownParameter`]; a dependency chain that reaches
    /// back into itself fails with [`EngineError::CircularDependency`]
    /// before any numeric evaluation of the cycle.
    pub fn evaluate_key(&self, key: &str, posttext: &Bindings) -> Result<EvaluatedExpression> {
        let mut resolver = Resolver::new(self, posttext);
        let index = resolver.resolve(key)?;
        Ok(resolver.memo[index].clone())
    }

    /// Evaluates every bound key and packages the results.
    ///
    /// All keys share one memo, so each expression is evaluated exactly once
    /// per scenario regardless of how many dependents it has.
    pub fn evaluate(&self, posttext: &Bindings) -> Result<ResultMap> {
        let mut resolver = Resolver::new(self, posttext);
        for key in self.bindings.keys() {
            resolver.resolve(key)?;
        }
        debug!(
            keys = self.bindings.len(),
            evaluations = resolver.trace.len(),
            "scenario evaluated"
        );

        // The memo is in evaluation order (dependencies first); results are
        // reported in declaration order.
        let mut memo = resolver.memo;
        let mut evaluated = IndexMap::with_capacity(memo.len());
        for key in self.bindings.keys() {
            if let Some(entry) = memo.shift_remove(key) {
                evaluated.insert(key.clone(), entry);
            }
        }

        Ok(ResultMap::new(
            evaluated,
            self.pretext.clone(),
            posttext.clone(),
        ))
    }
}

/// Per-evaluation state: one memo table, one path stack.
///
/// The stack makes cycle detection path-sensitive: reaching an
/// already-memoized key through a second path is a memo hit, while reaching
/// a key that is still being resolved is a cycle. `trace` records the keys
/// actually evaluated, in order.
struct Resolver<'s, 'c> {
    scenario: &'s Scenario<'c>,
    posttext: &'s Bindings,
    memo: IndexMap<String, EvaluatedExpression>,
    stack: Vec<String>,
    trace: Vec<String>,
}

impl<'s, 'c> Resolver<'s, 'c> {
    fn new(scenario: &'s Scenario<'c>, posttext: &'s Bindings) -> Self {
        Self {
            scenario,
            posttext,
            memo: IndexMap::new(),
            stack: Vec::new(),
            trace: Vec::new(),
        }
    }

    /// Resolves `key` and returns its index in the memo table.
    fn resolve(&mut self, key: &str) -> Result<usize> {
        if self.stack.iter().any(|k| k == key) {
            let mut path = self.stack.clone();
            path.push(key.to_string());
            return Err(EngineError::CircularDependency { path });
        }

        if let Some(index) = self.memo.get_index_of(key) {
            trace!(key, "memo hit");
            return Ok(index);
        }

        let Some(&expression) = self.scenario.bindings.get(key) else {
            return Err(EngineError::unknown_parameter(key));
        };

        self.stack.push(key.to_string());
        let mut arguments = Bindings::new();
        for dep in &expression.argument_dependencies {
            if self.posttext.contains_key(dep) {
                continue;
            }
            // Symbols with no bound expression are left to scope validation,
            // which reports the missing symbol itself.
            if !self.scenario.bindings.contains_key(dep) {
                continue;
            }
            let index = self.resolve(dep)?;
            arguments.insert(dep.clone(), self.memo[index].value);
        }
        self.stack.pop();

        let evaluated = expression.evaluate(arguments, self.scenario.pretext, self.posttext)?;
        trace!(key, value = evaluated.value, "evaluated expression");
        self.trace.push(key.to_string());
        self.memo.insert(key.to_string(), evaluated);
        Ok(self.memo.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parameters(specs: &[(&str, &[&str])]) -> IndexMap<String, Parameter> {
        parameters_with_pretext(specs, &Bindings::new())
    }

    fn parameters_with_pretext(
        specs: &[(&str, &[&str])],
        pretext: &Bindings,
    ) -> IndexMap<String, Parameter> {
        specs
            .iter()
            .map(|(key, formulas)| {
                let formulas: Vec<String> = formulas.iter().map(|f| f.to_string()).collect();
                let parameter = Parameter::new(key, key, &formulas, pretext).unwrap();
                (key.to_string(), parameter)
            })
            .collect()
    }

    fn chosen_formulas(scenario: &Scenario<'_>, keys: &[&str]) -> Vec<String> {
        keys.iter()
            .map(|k| scenario.expression(k).unwrap().formula.clone())
            .collect()
    }

    #[test]
    fn expands_full_cartesian_product_in_order() {
        let params = parameters(&[("a", &["1", "2"]), ("b", &["a + 1"]), ("c", &["3", "4", "5"])]);
        let pretext = Bindings::new();
        let scenarios = expand(&params, &pretext, 1000).unwrap();

        assert_eq!(scenarios.len(), 6);
        let combos: Vec<Vec<String>> = scenarios
            .iter()
            .map(|s| chosen_formulas(s, &["a", "c"]))
            .collect();
        // First variants fill existing bindings; later variants append clones.
        assert_eq!(
            combos,
            [
                ["1", "3"],
                ["2", "3"],
                ["1", "4"],
                ["2", "4"],
                ["1", "5"],
                ["2", "5"],
            ]
            .map(|pair| pair.map(String::from).to_vec())
        );
    }

    #[test]
    fn no_parameters_yield_one_empty_scenario() {
        let params = parameters(&[]);
        let pretext = Bindings::new();
        let scenarios = expand(&params, &pretext, 1000).unwrap();
        assert_eq!(scenarios.len(), 1);
        assert!(scenarios[0].is_empty());
    }

    #[test]
    fn cap_trips_during_expansion() {
        let params = parameters(&[
            ("a", &["1", "2", "3"]),
            ("b", &["1", "2", "3"]),
            ("c", &["1", "2", "3"]),
        ]);
        let pretext = Bindings::new();
        let err = expand(&params, &pretext, 3).unwrap_err();
        match err {
            EngineError::CardinalityExceeded { count, limit } => {
                // Tripped while expanding `b`, long before the full 27.
                assert_eq!(limit, 3);
                assert!(count <= 6, "cap must fire mid-expansion, saw {count}");
            }
            other => panic!("expected CardinalityExceeded, got {other:?}"),
        }
    }

    #[test]
    fn cap_allows_exactly_the_limit() {
        let params = parameters(&[("a", &["1", "2"]), ("b", &["3", "4"])]);
        let pretext = Bindings::new();
        let scenarios = expand(&params, &pretext, 4).unwrap();
        assert_eq!(scenarios.len(), 4);
    }

    #[test]
    fn resolves_chain_through_dependencies() {
        let params = parameters(&[
            ("rent", &["900"]),
            ("other", &["2500"]),
            ("total", &["rent + other"]),
        ]);
        let pretext = Bindings::new();
        let scenarios = expand(&params, &pretext, 1000).unwrap();

        let evaluated = scenarios[0].evaluate_key("total", &Bindings::new()).unwrap();
        assert_eq!(evaluated.value, 3400.0);
        assert_eq!(evaluated.arguments.get("rent"), Some(900.0));
        assert_eq!(evaluated.arguments.get("other"), Some(2500.0));
    }

    #[test]
    fn diamond_dependency_evaluates_shared_leaf_once() {
        let params = parameters(&[
            ("a", &["b + c"]),
            ("b", &["d * 2"]),
            ("c", &["d + 1"]),
            ("d", &["5"]),
        ]);
        let pretext = Bindings::new();
        let posttext = Bindings::new();
        let scenarios = expand(&params, &pretext, 1000).unwrap();

        let mut resolver = Resolver::new(&scenarios[0], &posttext);
        let index = resolver.resolve("a").unwrap();
        assert_eq!(resolver.memo[index].value, 16.0);
        // d feeds both b and c but is evaluated a single time.
        assert_eq!(resolver.trace, ["d", "b", "c", "a"]);
    }

    #[test]
    fn shared_memo_spans_a_whole_scenario() {
        let params = parameters(&[
            ("d", &["5"]),
            ("b", &["d * 2"]),
            ("c", &["d + 1"]),
        ]);
        let pretext = Bindings::new();
        let posttext = Bindings::new();
        let scenarios = expand(&params, &pretext, 1000).unwrap();

        let mut resolver = Resolver::new(&scenarios[0], &posttext);
        for key in ["d", "b", "c"] {
            resolver.resolve(key).unwrap();
        }
        assert_eq!(resolver.trace, ["d", "b", "c"]);
    }

    #[test]
    fn cycle_fails_before_any_evaluation() {
        let params = parameters(&[("x", &["y"]), ("y", &["x"])]);
        let pretext = Bindings::new();
        let posttext = Bindings::new();
        let scenarios = expand(&params, &pretext, 1000).unwrap();

        let mut resolver = Resolver::new(&scenarios[0], &posttext);
        let err = resolver.resolve("x").unwrap_err();
        match err {
            EngineError::CircularDependency { path } => {
                assert_eq!(path, ["x", "y", "x"]);
            }
            other => panic!("expected CircularDependency, got {other:?}"),
        }
        assert!(resolver.trace.is_empty(), "cycle must fail before evaluating");
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let params = parameters(&[("x", &["x + 1"])]);
        let pretext = Bindings::new();
        let scenarios = expand(&params, &pretext, 1000).unwrap();

        let err = scenarios[0].evaluate_key("x", &Bindings::new()).unwrap_err();
        assert!(err.is_cycle());
    }

    #[test]
    fn undeclared_symbol_surfaces_as_missing_scope_key() {
        let params = parameters(&[("a", &["1"]), ("b", &["a + z"])]);
        let pretext = Bindings::new();
        let scenarios = expand(&params, &pretext, 1000).unwrap();

        let err = scenarios[0].evaluate_key("b", &Bindings::new()).unwrap_err();
        match err {
            EngineError::MissingScopeKey { key, .. } => assert_eq!(key, "z"),
            other => panic!("expected MissingScopeKey, got {other:?}"),
        }
    }

    #[test]
    fn requesting_an_unbound_key_is_unknown_parameter() {
        let params = parameters(&[("a", &["1"])]);
        let pretext = Bindings::new();
        let scenarios = expand(&params, &pretext, 1000).unwrap();

        let err = scenarios[0]
            .evaluate_key("nope", &Bindings::new())
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownParameter { key } if key == "nope"));
    }

    #[test]
    fn posttext_short_circuits_recursion() {
        // `a` cannot be evaluated (undeclared `z`), but a posttext value for
        // `a` means it is never recursed into.
        let params = parameters(&[("a", &["z"]), ("b", &["a + 1"])]);
        let pretext = Bindings::new();
        let scenarios = expand(&params, &pretext, 1000).unwrap();

        let posttext = Bindings::from_pairs([("a", 5.0)]);
        let evaluated = scenarios[0].evaluate_key("b", &posttext).unwrap();
        assert_eq!(evaluated.value, 6.0);
        assert!(evaluated.arguments.is_empty());
    }

    #[test]
    fn pretext_satisfies_dependencies_across_the_scenario() {
        let pretext = Bindings::from_pairs([("month", 3.0)]);
        let params = parameters_with_pretext(&[("due", &["month * 10"])], &pretext);
        let scenarios = expand(&params, &pretext, 1000).unwrap();

        let evaluated = scenarios[0].evaluate_key("due", &Bindings::new()).unwrap();
        assert_eq!(evaluated.value, 30.0);
        assert!(evaluated.arguments.is_empty());
    }
}
