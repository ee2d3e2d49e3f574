//! Unified error type for the robust dynamic-programming engine.
//!
//! Every construction-time failure across the crate (ambiguity sets,
//! marginals, systems, properties, problems) surfaces through [`ImdpError`].
//! The inner solve loop is pure once a `Problem` has been built, so these
//! variants are raised only at construction, never mid-iteration — except
//! [`ImdpError::Resource`], which is reserved for the alternative (GPU)
//! backend.

use thiserror::Error;

/// Unified error type for the engine's data model and solver selection.
#[derive(Error, Debug)]
pub enum ImdpError {
    /// `lower`/`upper`/`gap` violated non-negativity, `lower + gap <= 1`, or
    /// the per-column feasibility band `sum_lower <= 1 <= sum_lower + sum_gap`.
    #[error("invalid interval at column {column}, row {row}: {reason}")]
    InvalidInterval {
        column: usize,
        row: usize,
        reason: String,
    },

    /// A shape mismatch between two objects that must agree (reward array vs.
    /// state shape, marginal dependence set vs. system axes, `stateptr` vs.
    /// action block count, ...).
    #[error("dimension mismatch: {context}: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        context: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// An index in reach/avoid/safe/terminal (or a strategy action tuple) was
    /// out of range, or had the wrong tuple arity.
    #[error("invalid state index {index} for axis of size {axis_size} ({context})")]
    InvalidState {
        index: usize,
        axis_size: usize,
        context: String,
    },

    /// A scalar parameter (horizon, tolerance, discount) violated its domain,
    /// or reach/avoid overlapped.
    #[error("domain error: {0}")]
    Domain(String),

    /// Two otherwise-valid objects cannot be combined: time-varying strategy
    /// with an infinite-time property, a basic property against a product
    /// system, a given strategy against a synthesis problem, and so on.
    #[error("incompatible combination: {0}")]
    Incompatibility(String),

    /// Failure reported abstractly by an alternative (non-CPU) backend, e.g.
    /// out-of-shared-memory on a GPU path. Never raised by the core kernels.
    #[error("resource exhausted on alternative backend: {0}")]
    Resource(String),

    /// The requested named `BellmanAlgorithm` or LP backend is not
    /// registered, or is registered but unavailable in this build.
    #[error("solver error: {0}")]
    Solver(String),

    /// Passthrough for I/O failures in the boundary crates (PRISM/bmdp-tool/
    /// netCDF+JSON readers and writers).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the engine.
pub type ImdpResult<T> = Result<T, ImdpError>;

impl From<String> for ImdpError {
    fn from(s: String) -> Self {
        ImdpError::Domain(s)
    }
}

impl From<&str> for ImdpError {
    fn from(s: &str) -> Self {
        ImdpError::Domain(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_interval_display() {
        let err = ImdpError::InvalidInterval {
            column: 2,
            row: 1,
            reason: "lower + gap > 1".to_string(),
        };
        assert!(err.to_string().contains("column 2"));
    }

    #[test]
    fn io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ImdpError = io_err.into();
        assert!(matches!(err, ImdpError::Io(_)));
    }

    #[test]
    fn result_type_alias() {
        let ok: ImdpResult<i32> = Ok(5);
        assert_eq!(ok.unwrap(), 5);
    }

    #[test]
    fn string_conversion_yields_domain_error() {
        let err: ImdpError = "bad horizon".into();
        assert!(matches!(err, ImdpError::Domain(_)));
    }

    #[test]
    fn question_mark_operator_propagates() {
        fn inner() -> ImdpResult<()> {
            Err(ImdpError::Domain("test".into()))
        }
        fn outer() -> ImdpResult<()> {
            inner()?;
            Ok(())
        }
        assert!(outer().is_err());
    }
}
