//! Error types for the analysis engine

use thiserror::Error;

/// Errors that can arise from engine-internal helper paths.
///
/// `AmlRule::evaluate` never returns `Result` — a misbehaving rule is caught
/// by the engine via `catch_unwind` and logged, never propagated. This type
/// exists for the smaller set of operations that can genuinely fail outright,
/// such as constructing a rule with an invalid configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// A rule was constructed with an invalid parameter.
    #[error("invalid rule configuration: {0}")]
    InvalidConfig(String),

    /// A rule panicked during evaluation and was caught by the engine.
    #[error("rule '{rule_name}' failed during evaluation: {reason}")]
    RuleFailed {
        /// Name of the rule that failed.
        rule_name: String,
        /// Best-effort description of the panic payload.
        reason: String,
    },
}

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, Error>;
