//! Error types for the mining core

use thiserror::Error;

/// Result type for mining and rule generation
pub type MiningResult<T> = std::result::Result<T, MiningError>;

/// Configuration errors reported before any computation starts.
///
/// Empty inputs and empty results are not errors: they come back as empty
/// collections.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MiningError {
    #[error("Invalid {name}: {value} (expected {expected})")]
    InvalidThreshold {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("Invalid max itemset length: must be at least 1")]
    InvalidMaxLength,
}

impl MiningError {
    pub(crate) fn threshold(name: &'static str, value: f64, expected: &'static str) -> Self {
        MiningError::InvalidThreshold {
            name,
            value,
            expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MiningError::threshold("min_support", 0.0, "a value in (0, 1]");
        assert_eq!(
            err.to_string(),
            "Invalid min_support: 0 (expected a value in (0, 1])"
        );
        assert_eq!(
            MiningError::InvalidMaxLength.to_string(),
            "Invalid max itemset length: must be at least 1"
        );
    }
}
