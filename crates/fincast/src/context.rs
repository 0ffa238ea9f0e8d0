//! Runtime context for command execution.
//!
//! The [`RuntimeContext`] holds all the state a command handler needs:
//! resolved output mode, verbosity, and the effective scenario cap and
//! display precision.

use crate::cli::GlobalArgs;
use crate::config;

/// Runtime context passed to every command handler.
///
/// Constructed once in `main` after CLI parsing, before command dispatch.
#[derive(Debug)]
pub struct RuntimeContext {
    /// Whether to produce JSON output.
    pub json: bool,

    /// Verbose output.
    pub verbose: bool,

    /// Quiet mode: suppress non-essential output.
    pub quiet: bool,

    /// Effective cap on generated scenarios.
    pub max_scenarios: usize,

    /// Effective decimal places for table output.
    pub precision: u8,
}

impl RuntimeContext {
    /// Build a `RuntimeContext` from parsed global arguments.
    ///
    /// The scenario cap resolves with priority: `--max-scenarios` flag >
    /// `FINCAST_MAX_SCENARIOS` env (clap folds the env var into the flag) >
    /// config file > 1000.
    pub fn from_global_args(global: &GlobalArgs) -> config::Result<Self> {
        let config = config::load_config(global.config.as_deref())?;

        Ok(Self {
            json: global.json,
            verbose: global.verbose,
            quiet: global.quiet,
            max_scenarios: global.max_scenarios.unwrap_or(config.max_scenarios),
            precision: config.precision,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global_args() -> GlobalArgs {
        GlobalArgs {
            json: false,
            config: None,
            max_scenarios: None,
            verbose: false,
            quiet: false,
        }
    }

    #[test]
    fn flag_overrides_config_cap() {
        let mut global = global_args();
        global.max_scenarios = Some(7);
        let ctx = RuntimeContext::from_global_args(&global).unwrap();
        assert_eq!(ctx.max_scenarios, 7);
    }

    #[test]
    fn explicit_config_file_supplies_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".fincast.yml");
        std::fs::write(&path, "max-scenarios: 25\nprecision: 0\n").unwrap();

        let mut global = global_args();
        global.config = Some(path);
        let ctx = RuntimeContext::from_global_args(&global).unwrap();
        assert_eq!(ctx.max_scenarios, 25);
        assert_eq!(ctx.precision, 0);
    }
}
