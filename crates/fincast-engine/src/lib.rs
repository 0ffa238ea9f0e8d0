//! Scenario-generating expression engine for the fincast system.
//!
//! A [`Context`] holds an ordered set of named parameters, each declaring one
//! or more formula variants. Evaluation expands the variants into the full
//! cartesian product of scenarios, resolves inter-parameter dependencies
//! within each scenario, and returns one [`ResultMap`] per scenario. Supplying
//! several variants for a parameter therefore compares alternatives
//! ("what if rent were 900 vs 1200?") in a single evaluation pass.
//!
//! Values come from three layers: `pretext` bindings supplied up front,
//! computed parameter results, and `posttext` overrides applied at
//! evaluation time. Posttext wins on conflict, which lets chained contexts
//! feed a prior result forward and selectively pin values.

pub mod bindings;
pub mod context;
pub mod error;
pub mod expression;
pub mod math;
pub mod model;
pub mod parameter;
pub mod result;
pub mod scenario;

// Re-exports for convenience.
pub use bindings::Bindings;
pub use context::{Context, ContextBuilder, DEFAULT_MAX_CARDINALITY};
pub use error::{EngineError, Result};
pub use expression::{EvaluatedExpression, Expression};
pub use model::{Model, ParamDecl};
pub use parameter::{Parameter, ParameterKind};
pub use result::ResultMap;
pub use scenario::Scenario;
