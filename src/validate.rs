//! Input validation for user-supplied chat text
//!
//! All checks are pure: the same text always yields the same verdict.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").unwrap());
static ADDRESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[0-9a-fA-F]{1,64}$").unwrap());

/// Rejected user input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("amount must be a positive integer, got {0:?}")]
    InvalidAmount(String),
    #[error("amount must be greater than zero")]
    ZeroAmount,
    #[error("address must be 0x followed by 1-64 hex characters, got {0:?}")]
    InvalidAddress(String),
    #[error("strategy index must be a non-negative integer, got {0:?}")]
    InvalidIndex(String),
    #[error("strategy index {index} is out of range (0..{len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// A positive integer amount, kept as the decimal string the user typed.
///
/// Values are not converted to a machine integer; on-chain amounts may
/// exceed 64 bits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Amount(String);

impl Amount {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A syntactically valid account address (`0x` + 1..=64 hex digits)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accept ASCII digits only, with a numeric value above zero.
///
/// Leading zeros are allowed (`"007"` is seven); `"0"`, signs, decimal
/// points and separators are not.
pub fn validate_amount(text: &str) -> Result<Amount, ValidationError> {
    if !AMOUNT_RE.is_match(text) {
        return Err(ValidationError::InvalidAmount(text.to_string()));
    }
    if text.bytes().all(|b| b == b'0') {
        return Err(ValidationError::ZeroAmount);
    }
    Ok(Amount(text.to_string()))
}

pub fn validate_address(text: &str) -> Result<Address, ValidationError> {
    if ADDRESS_RE.is_match(text) {
        Ok(Address(text.to_string()))
    } else {
        Err(ValidationError::InvalidAddress(text.to_string()))
    }
}

/// Parse a zero-based selection into a list of `len` items.
pub fn validate_strategy_index(text: &str, len: usize) -> Result<usize, ValidationError> {
    let index: usize = text
        .parse()
        .map_err(|_| ValidationError::InvalidIndex(text.to_string()))?;
    if index >= len {
        return Err(ValidationError::IndexOutOfRange { index, len });
    }
    Ok(index)
}
