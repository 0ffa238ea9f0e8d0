//! Flattened, read-only output of one evaluated scenario.

use indexmap::IndexMap;
use serde::Serialize;

use crate::bindings::Bindings;
use crate::expression::EvaluatedExpression;

/// Separator between variant identities in a scenario hash.
const HASH_SEPARATOR: &str = ";";

/// Every parameter key of one scenario mapped to its evaluated expression,
/// plus the merged plain view and a scenario-distinguishing hash.
///
/// Immutable once constructed.
#[derive(Debug, Clone, Serialize)]
pub struct ResultMap {
    /// Evaluated expressions by key, parameter declaration order.
    pub evaluated: IndexMap<String, EvaluatedExpression>,

    /// The externally supplied bindings the scenario was evaluated under.
    pub pretext: Bindings,

    /// The post-hoc overrides the scenario was evaluated with.
    pub posttext: Bindings,

    /// Flat symbol-to-number view: pretext, then evaluated values, then
    /// posttext. Posttext is applied last, so its keys are authoritative
    /// when they overlap with computed keys.
    pub plain: Bindings,

    /// Identities of the multi-variant choices, `";"`-joined in declaration
    /// order. Constant and single-variant parameters never contribute, so
    /// the hash distinguishes exactly the scenarios that can differ.
    pub hash: String,
}

impl ResultMap {
    /// Packages one scenario's evaluated expressions.
    pub(crate) fn new(
        evaluated: IndexMap<String, EvaluatedExpression>,
        pretext: Bindings,
        posttext: Bindings,
    ) -> Self {
        let mut plain = pretext.clone();
        for (key, expression) in &evaluated {
            plain.insert(key.clone(), expression.value);
        }
        plain.extend_from(&posttext);

        let hash = evaluated
            .values()
            .filter(|e| e.cardinality > 1)
            .map(EvaluatedExpression::identity)
            .collect::<Vec<_>>()
            .join(HASH_SEPARATOR);

        Self {
            evaluated,
            pretext,
            posttext,
            plain,
            hash,
        }
    }

    /// The evaluated value for `key`, from the plain view.
    pub fn value(&self, key: &str) -> Option<f64> {
        self.plain.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn evaluated(key: &str, formula: &str, cardinality: usize, value: f64) -> EvaluatedExpression {
        EvaluatedExpression {
            key: key.to_string(),
            name: key.to_string(),
            formula: formula.to_string(),
            cardinality,
            arguments: Bindings::new(),
            value,
        }
    }

    #[test]
    fn plain_merges_pretext_evaluated_posttext() {
        let mut map = IndexMap::new();
        map.insert("a".to_string(), evaluated("a", "1", 1, 1.0));
        map.insert("b".to_string(), evaluated("b", "a + 1", 1, 2.0));

        let pretext = Bindings::from_pairs([("base", 10.0)]);
        let posttext = Bindings::from_pairs([("b", 99.0)]);
        let result = ResultMap::new(map, pretext, posttext);

        assert_eq!(result.value("base"), Some(10.0));
        assert_eq!(result.value("a"), Some(1.0));
        // Posttext is applied last and wins over the computed value.
        assert_eq!(result.value("b"), Some(99.0));
        let keys: Vec<&String> = result.plain.keys().collect();
        assert_eq!(keys, ["base", "a", "b"]);
    }

    #[test]
    fn hash_includes_only_multi_variant_choices() {
        let mut map = IndexMap::new();
        map.insert("a".to_string(), evaluated("a", "2", 2, 2.0));
        map.insert("b".to_string(), evaluated("b", "a + 1", 1, 3.0));
        map.insert("c".to_string(), evaluated("c", "500000", 3, 500_000.0));

        let result = ResultMap::new(map, Bindings::new(), Bindings::new());
        assert_eq!(result.hash, "a=2;c=500000");
    }

    #[test]
    fn all_single_variant_hash_is_empty() {
        let mut map = IndexMap::new();
        map.insert("a".to_string(), evaluated("a", "1", 1, 1.0));

        let result = ResultMap::new(map, Bindings::new(), Bindings::new());
        assert_eq!(result.hash, "");
    }
}
