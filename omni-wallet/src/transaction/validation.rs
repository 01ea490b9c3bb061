//! Request field validation shared by the protocol encoders
//!
//! Every rule fails with the first violation it finds; nothing is built
//! until a request passes all of them.

use ethers::types::{Address, U256};

use crate::account::validate_address;
use crate::error::{Error, Result};
use crate::protocol::Protocol;

/// A required field, present and non-empty
pub fn require<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::validation(format!("Missing {}", field))),
    }
}

/// A well-formed address for `protocol`
pub fn require_address<'a>(value: &'a Option<String>, field: &str, protocol: Protocol) -> Result<&'a str> {
    let address = require(value, field)?;
    check_address(address, field, protocol)?;
    Ok(address)
}

pub fn check_address(address: &str, field: &str, protocol: Protocol) -> Result<()> {
    if !validate_address(address, protocol) {
        return Err(Error::validation(format!("Invalid {} address: {}", field, address)));
    }
    Ok(())
}

/// A required EVM address, parsed
pub fn require_evm_address(value: &Option<String>, field: &str, protocol: Protocol) -> Result<Address> {
    let address = require_address(value, field, protocol)?;
    address
        .parse()
        .map_err(|_| Error::validation(format!("Invalid {} address: {}", field, address)))
}

/// A token id: decimal, or hex with a `0x` prefix
pub fn parse_token_id(value: &str) -> Result<U256> {
    let value = value.trim();
    let parsed = match value.strip_prefix("0x") {
        Some(hex) if is_digits(hex, 16) => U256::from_str_radix(hex, 16).ok(),
        Some(_) => None,
        None if is_digits(value, 10) => U256::from_dec_str(value).ok(),
        None => None,
    };
    parsed.ok_or_else(|| Error::validation(format!("Invalid token id: {}", value)))
}

/// Sign check for an optional amount: present amounts must be non-negative integers
pub fn check_amount(amount: Option<&str>) -> Result<()> {
    match amount {
        Some(amount) => parse_amount(amount).map(|_| ()),
        None => Ok(()),
    }
}

/// A required non-negative integer amount
pub fn require_amount(amount: Option<&str>) -> Result<U256> {
    match amount {
        Some(amount) => parse_amount(amount),
        None => Err(Error::InvalidAmount("Amount is required".to_string())),
    }
}

fn parse_amount(amount: &str) -> Result<U256> {
    let amount = amount.trim();
    if amount.starts_with('-') {
        return Err(Error::InvalidAmount(format!("Amount must not be negative: {}", amount)));
    }
    if amount.is_empty() {
        return Err(Error::InvalidAmount("Amount is required".to_string()));
    }
    if !is_digits(amount, 10) {
        return Err(Error::InvalidAmount(format!("Amount is not a number: {}", amount)));
    }
    U256::from_dec_str(amount).map_err(|_| Error::InvalidAmount(format!("Amount is not a number: {}", amount)))
}

// Non-empty and every char a digit of `radix`
fn is_digits(value: &str, radix: u32) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_digit(radix))
}

/// A positive amount of indivisible token units
pub fn parse_units(amount: &str, field: &str) -> Result<u64> {
    match amount.trim().parse::<u64>() {
        Ok(units) if units > 0 => Ok(units),
        _ => Err(Error::validation(format!("Invalid {}: {}", field, amount))),
    }
}
