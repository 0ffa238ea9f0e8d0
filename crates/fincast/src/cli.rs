//! Clap CLI definitions for the `fincast` command.
//!
//! This module defines the complete CLI structure using clap 4 derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// fincast -- scenario-comparing projections.
///
/// Evaluates parameter models over every combination of their formula
/// variants, so alternative assumptions can be compared side by side.
#[derive(Parser, Debug)]
#[command(
    name = "fincast",
    about = "Scenario-comparing projection calculator",
    long_about = "Evaluates parameter models over every combination of their formula variants, so alternative assumptions can be compared side by side.",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global flags available to all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Output in JSON format.
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file path (default: walk up from cwd to find .fincast.yml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Cap on generated scenarios (default: config value, or 1000).
    #[arg(long, global = true, env = "FINCAST_MAX_SCENARIOS")]
    pub max_scenarios: Option<usize>,

    /// Enable verbose/debug output.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output (errors only).
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,
}

/// All available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate every scenario of a model.
    #[command(alias = "run")]
    Eval(EvalArgs),

    /// Evaluate a single key across all scenarios.
    Key(KeyArgs),

    /// List the parameters a model declares.
    Params(ParamsArgs),

    /// Validate a model: parse every formula and evaluate every scenario.
    Check(CheckArgs),

    /// Generate shell completions.
    Completion(CompletionArgs),
}

// ---------------------------------------------------------------------------
// Eval
// ---------------------------------------------------------------------------

/// Arguments for `fincast eval`.
#[derive(Args, Debug)]
pub struct EvalArgs {
    /// Model name or file path.
    pub model: String,

    /// Pretext binding (key=value), repeatable.
    #[arg(long = "given", num_args = 1..)]
    pub given: Vec<String>,

    /// JSON file of pretext bindings (e.g. the `plain` map of a prior run).
    #[arg(long)]
    pub given_file: Option<PathBuf>,

    /// Posttext override (key=value), repeatable. Wins over computed values.
    #[arg(long = "set", num_args = 1..)]
    pub set: Vec<String>,

    /// Decimal places for table output (default: config value, or 2).
    #[arg(long)]
    pub precision: Option<u8>,
}

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// Arguments for `fincast key`.
#[derive(Args, Debug)]
pub struct KeyArgs {
    /// Model name or file path.
    pub model: String,

    /// Parameter key to evaluate.
    pub key: String,

    /// Pretext binding (key=value), repeatable.
    #[arg(long = "given", num_args = 1..)]
    pub given: Vec<String>,

    /// JSON file of pretext bindings.
    #[arg(long)]
    pub given_file: Option<PathBuf>,

    /// Posttext override (key=value), repeatable.
    #[arg(long = "set", num_args = 1..)]
    pub set: Vec<String>,

    /// Decimal places for table output.
    #[arg(long)]
    pub precision: Option<u8>,
}

// ---------------------------------------------------------------------------
// Params
// ---------------------------------------------------------------------------

/// Arguments for `fincast params`.
#[derive(Args, Debug)]
pub struct ParamsArgs {
    /// Model name or file path.
    pub model: String,
}

// ---------------------------------------------------------------------------
// Check
// ---------------------------------------------------------------------------

/// Arguments for `fincast check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Model name or file path.
    pub model: String,

    /// Pretext binding (key=value), repeatable.
    #[arg(long = "given", num_args = 1..)]
    pub given: Vec<String>,

    /// JSON file of pretext bindings.
    #[arg(long)]
    pub given_file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// Arguments for `fincast completion`.
#[derive(Args, Debug)]
pub struct CompletionArgs {
    #[command(subcommand)]
    pub command: CompletionCommands,
}

/// Supported completion shells.
#[derive(Subcommand, Debug)]
pub enum CompletionCommands {
    /// Generate Bash completions.
    Bash,
    /// Generate Zsh completions.
    Zsh,
    /// Generate Fish completions.
    Fish,
    /// Generate PowerShell completions.
    Powershell,
}
