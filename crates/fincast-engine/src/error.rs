//! Engine error types.

/// Errors that can occur while building or evaluating a context.
///
/// All variants represent configuration or data errors in the parameter
/// declarations, not transient failures: they are raised synchronously at
/// the point of detection and never retried internally. Evaluation state is
/// scenario-local, so an error in one scenario leaves every other scenario
/// unaffected.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A formula could not be parsed by the expression library.
    #[error("malformed expression \"{formula}\": {source}")]
    MalformedExpression {
        /// The formula text that failed to parse.
        formula: String,
        /// The underlying parse error.
        source: evalexpr::EvalexprError,
    },

    /// A referenced symbol has no value in pretext, arguments, or posttext.
    #[error("scope is missing key \"{key}\" required by \"{formula}\"")]
    MissingScopeKey {
        /// The symbol that could not be resolved.
        key: String,
        /// The formula that referenced it.
        formula: String,
    },

    /// A key transitively depends on itself.
    #[error("circular dependency: {}", path.join(" -> "))]
    CircularDependency {
        /// The full cycle path, ending with the key that closed the cycle.
        path: Vec<String>,
    },

    /// A requested key has no declared parameter.
    #[error("unknown parameter: \"{key}\"")]
    UnknownParameter {
        /// The key that was requested.
        key: String,
    },

    /// Scenario expansion would exceed the configured cap.
    #[error("scenario cardinality exceeded: {count} > {limit}")]
    CardinalityExceeded {
        /// The working-list size that tripped the cap.
        count: usize,
        /// The configured cap.
        limit: usize,
    },

    /// The expression library rejected a formula at evaluation time.
    #[error("error evaluating \"{formula}\" for key \"{key}\": {source}")]
    Evaluation {
        /// The formula that failed.
        formula: String,
        /// The parameter key being evaluated.
        key: String,
        /// The underlying evaluation error.
        source: evalexpr::EvalexprError,
    },

    /// A model declaration was malformed (duplicate key, empty variant
    /// list, unparseable file).
    #[error("invalid declaration: {0}")]
    Declaration(String),

    /// A model file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the engine crate.
pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    /// Creates a [`EngineError::Declaration`] with the given reason.
    pub fn declaration(reason: impl Into<String>) -> Self {
        Self::Declaration(reason.into())
    }

    /// Creates a [`EngineError::UnknownParameter`] for the given key.
    pub fn unknown_parameter(key: impl Into<String>) -> Self {
        Self::UnknownParameter { key: key.into() }
    }

    /// Returns `true` if this is a [`EngineError::CircularDependency`].
    pub fn is_cycle(&self) -> bool {
        matches!(self, Self::CircularDependency { .. })
    }
}
