//! Parse model files (TOML and JSON) and resolve model paths.
//!
//! A model file declares a named set of parameters plus optional `given`
//! bindings. Parameters keep their file order, which fixes scenario
//! expansion order and result layout.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::bindings::Bindings;
use crate::context::ContextBuilder;
use crate::error::{EngineError, Result};

/// Root structure for `.model.toml` / `.model.json` files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    /// Unique name for this model.
    pub name: String,

    /// Human-readable description.
    #[serde(default)]
    pub description: String,

    /// Externally supplied values visible to every formula.
    #[serde(default)]
    pub given: Bindings,

    /// Parameter declarations, in file order.
    #[serde(default)]
    pub params: Vec<ParamDecl>,

    /// Where this model was loaded from (set by the parser).
    #[serde(skip)]
    pub source: String,
}

/// A single parameter declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDecl {
    /// Unique key within the model; the symbol other formulas reference.
    pub key: String,

    /// Display name (falls back to the key).
    #[serde(default)]
    pub name: String,

    /// Formula variants. A single entry is an ordinary parameter; several
    /// entries make this a comparison parameter.
    pub expressions: Vec<String>,
}

impl Model {
    /// Starts a [`ContextBuilder`] seeded with this model's declarations
    /// and givens.
    ///
    /// Duplicate keys and empty expression lists are reported when the
    /// builder is built, not here.
    pub fn builder(&self) -> ContextBuilder {
        let mut builder = ContextBuilder::new().pretext(self.given.clone());
        for param in &self.params {
            let name = if param.name.is_empty() {
                &param.key
            } else {
                &param.name
            };
            builder = builder.parameter(&param.key, name, &param.expressions);
        }
        builder
    }
}

/// Parse a model from a TOML string.
pub fn parse_toml(content: &str) -> Result<Model> {
    toml::from_str(content).map_err(|e| EngineError::declaration(e.to_string()))
}

/// Parse a model from a JSON string.
pub fn parse_json(content: &str) -> Result<Model> {
    serde_json::from_str(content).map_err(|e| EngineError::declaration(e.to_string()))
}

/// Load a model from a file path (auto-detect TOML vs JSON by extension).
pub fn load_model(path: &Path) -> Result<Model> {
    let content = std::fs::read_to_string(path)?;
    let mut model = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => parse_toml(&content)?,
        Some("json") => parse_json(&content)?,
        _ => {
            // Try JSON first, then TOML
            parse_json(&content).or_else(|_| parse_toml(&content))?
        }
    };
    model.source = path.display().to_string();
    Ok(model)
}

/// Search for a model by name relative to `cwd`.
///
/// Search order:
/// 1. Exact path (if it exists as-is)
/// 2. `cwd` with standard extensions appended
pub fn find_model(name: &str, cwd: &Path) -> Result<PathBuf> {
    let exact = Path::new(name);
    if exact.is_absolute() && exact.exists() {
        return Ok(exact.to_path_buf());
    }
    let relative = cwd.join(name);
    if relative.exists() {
        return Ok(relative);
    }

    let suffixes = [".model.toml", ".model.json", ".toml", ".json"];
    for suffix in &suffixes {
        let candidate = cwd.join(format!("{}{}", name, suffix));
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    Err(EngineError::declaration(format!(
        "model '{}' not found (searched {} and standard extensions)",
        name,
        cwd.display()
    )))
}
