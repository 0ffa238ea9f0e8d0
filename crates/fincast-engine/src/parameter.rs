//! Parameters: named variables with one or more candidate formulas.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bindings::Bindings;
use crate::error::{EngineError, Result};
use crate::expression::Expression;

/// A named variable holding one or more formula variants.
///
/// `dependencies` is the first-seen ordered union over all variants and is
/// deliberately not filtered by the pretext: a parameter whose only
/// dependency is a pretext symbol still depends on something, so it is not
/// constant. Immutable after construction.
#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    /// Symbol under which this parameter is declared.
    pub key: String,

    /// Human-readable name.
    pub name: String,

    /// The formula variants, in declaration order.
    pub expressions: Vec<Expression>,

    /// Union of every variant's dependencies, first-seen order.
    pub dependencies: Vec<String>,

    /// Number of variants. The product of all cardinalities is the
    /// scenario count.
    pub cardinality: usize,

    /// `true` when the parameter has a single variant and no dependencies.
    pub constant: bool,
}

impl Parameter {
    /// Builds a parameter from its declared formula strings.
    ///
    /// One [`Expression`] is compiled per formula, in declaration order. An
    /// empty formula list is a declaration error; any formula that fails to
    /// parse surfaces as [`EngineError::MalformedExpression`].
    pub fn new(key: &str, name: &str, formulas: &[String], pretext: &Bindings) -> Result<Self> {
        if formulas.is_empty() {
            return Err(EngineError::declaration(format!(
                "parameter \"{key}\" has no expressions"
            )));
        }

        let cardinality = formulas.len();
        let expressions = formulas
            .iter()
            .map(|formula| Expression::new(key, name, cardinality, formula, pretext))
            .collect::<Result<Vec<_>>>()?;

        let mut dependencies: Vec<String> = Vec::new();
        for expression in &expressions {
            for dep in &expression.dependencies {
                if !dependencies.contains(dep) {
                    dependencies.push(dep.clone());
                }
            }
        }

        let constant = dependencies.is_empty() && cardinality == 1;

        Ok(Self {
            key: key.to_string(),
            name: name.to_string(),
            expressions,
            dependencies,
            cardinality,
            constant,
        })
    }

    /// Presentation grouping of this parameter.
    pub fn kind(&self) -> ParameterKind {
        if self.cardinality > 1 {
            ParameterKind::Comparison
        } else if self.constant {
            ParameterKind::Constant
        } else {
            ParameterKind::Calculated
        }
    }
}

/// How a parameter behaves across scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    /// More than one variant; the choice distinguishes scenarios.
    Comparison,
    /// A single literal variant with no dependencies.
    Constant,
    /// A single variant computed from other symbols.
    Calculated,
}

impl ParameterKind {
    /// Returns the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comparison => "comparison",
            Self::Constant => "constant",
            Self::Calculated => "calculated",
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
