use thiserror::Error;

/// Any error that aborts a generation run before output is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    /// The inputs are malformed or inconsistent.
    #[error("Invalid test configuration\nCaused by:\n  {0}")]
    Config(#[from] ConfigError),

    /// The inputs are well formed but request something that can't be generated.
    #[error("Unsupported test configuration\nCaused by:\n  {0}")]
    Unsupported(#[from] UnsupportedError),
}

/// Malformed or inconsistent generation inputs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The per-testcase lists can't be broadcast to a common length.
    #[error(
        "Sizes of m, n, k, dynamicity, and accumulate must match or be 1. Sizes are: m={m}, n={n}, k={k}, dynamicity={dynamicity}, accumulate={accumulate}"
    )]
    LengthMismatch {
        m: usize,
        n: usize,
        k: usize,
        dynamicity: usize,
        accumulate: usize,
    },

    /// A value is not one of the accepted tags of an option.
    #[error("Unknown {option} value {value:?}, expected one of: {expected}")]
    UnknownValue {
        option: &'static str,
        value: String,
        expected: String,
    },

    /// A matrix dimension isn't a positive integer.
    #[error("Invalid value {value:?} for dimension {dim}, expected a positive integer")]
    InvalidDimension { dim: &'static str, value: String },

    /// The operand element type must always be provided.
    #[error("The lhs/rhs element type must be set")]
    MissingOperandType,
}

/// Configurations that are recognized but can't be generated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnsupportedError {
    #[error("Mixed dynamicity is not currently supported")]
    MixedDynamicity,

    #[error("accumulate=true is not yet supported by these tests")]
    Accumulate,
}
