//! Input validation shared by the domain services.

use std::fmt;
use std::str::FromStr;

use zerionkit_core::error::ApiError;

/// Checks the `0x` + 40 hex chars EVM address format.
pub fn is_valid_address(address: &str) -> bool {
    let hex = match address.strip_prefix("0x") {
        Some(hex) => hex,
        None => return false,
    };
    hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Lowercase a validated address; malformed input is a validation error.
pub fn normalize_address(address: &str) -> Result<String, ApiError> {
    if !is_valid_address(address) {
        return Err(ApiError::Validation(format!(
            "invalid address format: {address}"
        )));
    }
    Ok(address.to_ascii_lowercase())
}

/// An NFT identified by `chain_id:contract_address:token_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NftReference {
    pub chain_id: String,
    pub contract_address: String,
    pub token_id: String,
}

impl NftReference {
    pub fn new(
        chain_id: impl Into<String>,
        contract_address: impl Into<String>,
        token_id: impl Into<String>,
    ) -> Self {
        Self {
            chain_id: chain_id.into(),
            contract_address: contract_address.into(),
            token_id: token_id.into(),
        }
    }
}

impl FromStr for NftReference {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [chain_id, contract_address, token_id]
                if !chain_id.is_empty() && !contract_address.is_empty() && !token_id.is_empty() =>
            {
                Ok(Self::new(*chain_id, *contract_address, *token_id))
            }
            _ => Err(ApiError::Validation(format!(
                "invalid NFT reference format: {s} (expected chain_id:contract_address:token_id)"
            ))),
        }
    }
}

impl fmt::Display for NftReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.chain_id, self.contract_address, self.token_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_validation() {
        assert!(is_valid_address("0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D"));
        assert!(!is_valid_address("7a250d5630B4cF539739dF2C5dAcb4c659F2488D"));
        assert!(!is_valid_address("0x7a25"));
        assert!(!is_valid_address("0xZZ50d5630B4cF539739dF2C5dAcb4c659F2488D"));
    }

    #[test]
    fn normalize_lowercases() {
        let normalized = normalize_address("0x7A250D5630B4CF539739DF2C5DACB4C659F2488D").unwrap();
        assert_eq!(normalized, "0x7a250d5630b4cf539739df2c5dacb4c659f2488d");
        assert!(matches!(
            normalize_address("nope"),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn reference_round_trips() {
        let reference: NftReference = "ethereum:0xabc:42".parse().unwrap();
        assert_eq!(reference.chain_id, "ethereum");
        assert_eq!(reference.contract_address, "0xabc");
        assert_eq!(reference.token_id, "42");
        assert_eq!(reference.to_string(), "ethereum:0xabc:42");
    }

    #[test]
    fn two_segment_reference_is_a_validation_error_not_a_panic() {
        let err = "invalid:format".parse::<NftReference>().unwrap_err();
        match err {
            ApiError::Validation(message) => assert!(message.contains("invalid:format")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn empty_segments_are_rejected() {
        assert!("ethereum::42".parse::<NftReference>().is_err());
        assert!(":0xabc:42".parse::<NftReference>().is_err());
    }
}
