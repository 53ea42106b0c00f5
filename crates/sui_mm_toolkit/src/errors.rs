use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MmError {
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),
    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),
    /// Transport or node failure. The only retryable kind.
    #[error("chain unavailable: {0}")]
    Unavailable(String),
    #[error("swap failed after {attempts} attempts: {last_error}")]
    SwapFailed { attempts: u32, last_error: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("transaction {digest} failed: {error}")]
    ExecutionFailed { digest: String, error: String },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl MmError {
    pub fn insufficient(required: impl std::fmt::Display, available: impl std::fmt::Display) -> Self {
        Self::InsufficientFunds(format!("required {}, available {}", required, available))
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

static INSUFFICIENT_FUNDS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(InsufficientCoinBalance|InsufficientGas|GasBalanceTooLow|Balance of gas object \d+ is lower than|insufficient (coin )?balance|Cannot find gas coin)",
    )
    .unwrap_or_else(|err| panic!("invalid insufficient funds regex: {:?}", err))
});

/// Map a raw chain/transport error message to an error kind.
pub fn classify_chain_error(msg: impl Into<String>) -> MmError {
    let msg = msg.into();
    if INSUFFICIENT_FUNDS_RE.is_match(&msg) {
        MmError::InsufficientFunds(msg)
    } else {
        MmError::Unavailable(msg)
    }
}

/// Map the error of a transaction whose effects status is failure. A balance
/// shortfall detected on chain is `InsufficientFunds`.
pub fn classify_execution_failure(digest: impl Into<String>, error: impl Into<String>) -> MmError {
    let (digest, error) = (digest.into(), error.into());
    if INSUFFICIENT_FUNDS_RE.is_match(&error) {
        MmError::InsufficientFunds(format!("transaction {} failed: {}", digest, error))
    } else {
        MmError::ExecutionFailed { digest, error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_balance_errors_as_insufficient_funds() {
        for msg in [
            "Error checking transaction input objects: InsufficientCoinBalance",
            "InsufficientGas",
            "GasBalanceTooLow { gas_balance: 10, needed_gas_amount: 20 }",
            "Balance of gas object 1000 is lower than the needed amount: 2000",
        ] {
            assert!(
                matches!(classify_chain_error(msg), MmError::InsufficientFunds(_)),
                "{}",
                msg
            );
        }
    }

    #[test]
    fn everything_else_is_unavailable_and_transient() {
        let err = classify_chain_error("error trying to connect: dns error");
        assert!(matches!(err, MmError::Unavailable(_)));
        assert!(err.is_transient());
        assert!(!MmError::insufficient(10, 5).is_transient());
        assert_eq!(
            MmError::insufficient(10, 5).to_string(),
            "insufficient funds: required 10, available 5"
        );
    }

    #[test]
    fn failed_effects_with_a_shortfall_are_insufficient_funds() {
        assert_eq!(
            classify_execution_failure("9xKt", "InsufficientCoinBalance in command 0"),
            MmError::InsufficientFunds(
                "transaction 9xKt failed: InsufficientCoinBalance in command 0".to_string()
            )
        );
        assert!(matches!(
            classify_execution_failure("9xKt", "InsufficientGas"),
            MmError::InsufficientFunds(_)
        ));
    }

    #[test]
    fn other_failed_effects_stay_execution_failures() {
        let err = classify_execution_failure(
            "9xKt",
            "MoveAbort(MoveLocation { module: pool }, 5) in command 2",
        );
        assert_eq!(
            err,
            MmError::ExecutionFailed {
                digest: "9xKt".to_string(),
                error: "MoveAbort(MoveLocation { module: pool }, 5) in command 2".to_string(),
            }
        );
        assert!(!err.is_transient());
    }
}
