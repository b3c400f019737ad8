use thiserror::Error;

pub type Result<T> = std::result::Result<T, PowerFlowError>;

/// Errors raised while building a network or solving the power flow.
///
/// Failing to converge is not an error, see [`crate::Convergence`].
#[derive(Debug, Error)]
pub enum PowerFlowError {
    #[error("topology error: {0}")]
    Topology(String),

    #[error("line {line} ({from_bus}-{to_bus}) has zero impedance")]
    DegenerateLine {
        line: usize,
        from_bus: usize,
        to_bus: usize,
    },

    #[error("ill-conditioned Jacobian: {0}")]
    IllConditionedSystem(String),

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("malformed record at row {row}: {reason}")]
    MalformedRecord { row: usize, reason: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
