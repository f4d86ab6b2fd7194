//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DappConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use alloy::primitives::Address;

use crate::config::schema::DappConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Parse the configured contract address.
pub fn contract_address(config: &DappConfig) -> Result<Address, ValidationError> {
    let raw = config.contract.address.trim();
    if raw.is_empty() {
        return Err(ValidationError::new("contract.address", "is required"));
    }
    let address: Address = raw
        .parse()
        .map_err(|e| ValidationError::new("contract.address", format!("invalid address: {e}")))?;
    if address == Address::ZERO {
        return Err(ValidationError::new("contract.address", "must not be the zero address"));
    }
    Ok(address)
}

fn check_urls(field: &str, urls: &[String], errors: &mut Vec<ValidationError>) {
    for url in urls {
        if let Err(e) = url.parse::<url::Url>() {
            errors.push(ValidationError::new(field, format!("invalid URL '{url}': {e}")));
        }
    }
}

pub fn validate_config(config: &DappConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let network = &config.network;

    if network.chain_id == 0 {
        errors.push(ValidationError::new("network.chain_id", "must be non-zero"));
    }
    if network.name.trim().is_empty() {
        errors.push(ValidationError::new("network.name", "must not be empty"));
    }
    if network.native_currency.symbol.trim().is_empty() {
        errors.push(ValidationError::new(
            "network.native_currency.symbol",
            "must not be empty",
        ));
    }
    if network.rpc_urls.is_empty() {
        errors.push(ValidationError::new("network.rpc_urls", "at least one RPC URL is required"));
    }
    check_urls("network.rpc_urls", &network.rpc_urls, &mut errors);
    check_urls(
        "network.block_explorer_urls",
        &network.block_explorer_urls,
        &mut errors,
    );

    if let Err(e) = contract_address(config) {
        errors.push(e);
    }
    if config.contract.confirmation_poll_ms == 0 {
        errors.push(ValidationError::new("contract.confirmation_poll_ms", "must be > 0"));
    }

    if config.wallet.preferred_wallet.trim().is_empty() {
        errors.push(ValidationError::new("wallet.preferred_wallet", "must not be empty"));
    }
    check_urls(
        "wallet.home_rpc_url",
        std::slice::from_ref(&config.wallet.home_rpc_url),
        &mut errors,
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
