use alloy::primitives::U256;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub const MAX_DECIMALS: u32 = 18;
pub const MAX_LOGO_LENGTH: usize = 100_000;

static SYMBOL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("valid symbol pattern"));
static DENOM_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_]+$").expect("valid denom pattern"));

/// Token creation form as submitted by the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenCreationRequest {
    pub name: String,
    pub symbol: String,
    pub denom: String,
    pub total_supply: String,
    pub decimals: u32,
    #[serde(default)]
    pub logo_base64: Option<String>,
}

/// A request that passed every rule, with the supply scaled to on-chain units
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub name: String,
    pub symbol: String,
    pub denom: String,
    pub total_supply: String,
    pub total_supply_raw: U256,
    pub decimals: u8,
    pub logo_base64: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Token name is required")]
    EmptyName,

    #[error("Token symbol is required")]
    EmptySymbol,

    #[error("Token symbol must contain only letters and numbers")]
    InvalidSymbol,

    #[error("Denom is required")]
    EmptyDenom,

    #[error("Denom must contain only lowercase letters, numbers and underscores")]
    InvalidDenom,

    #[error("Total supply must be a positive number")]
    InvalidSupply,

    #[error("Total supply has more than {0} decimal places")]
    SupplyPrecision(u32),

    #[error("Total supply is too large for {0} decimals")]
    SupplyOverflow(u32),

    #[error("Decimals must be between 0 and 18")]
    InvalidDecimals(u32),

    #[error("Logo is too large ({0} characters, maximum 100000)")]
    LogoTooLarge(usize),
}

/// Check a creation request. Rules run in order and the first failure is returned.
pub fn validate_request(request: &TokenCreationRequest) -> Result<ValidatedRequest, ValidationError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }

    let symbol = request.symbol.trim();
    if symbol.is_empty() {
        return Err(ValidationError::EmptySymbol);
    }
    if !SYMBOL_PATTERN.is_match(symbol) {
        return Err(ValidationError::InvalidSymbol);
    }

    let denom = request.denom.trim();
    if denom.is_empty() {
        return Err(ValidationError::EmptyDenom);
    }
    if !DENOM_PATTERN.is_match(denom) {
        return Err(ValidationError::InvalidDenom);
    }

    let supply = parse_decimal(&request.total_supply)?;
    let total_supply_raw = supply.scale(request.decimals)?;

    if request.decimals > MAX_DECIMALS {
        return Err(ValidationError::InvalidDecimals(request.decimals));
    }

    if let Some(logo) = &request.logo_base64 {
        if logo.len() > MAX_LOGO_LENGTH {
            return Err(ValidationError::LogoTooLarge(logo.len()));
        }
    }

    Ok(ValidatedRequest {
        name: name.to_string(),
        symbol: symbol.to_string(),
        denom: denom.to_string(),
        total_supply: request.total_supply.trim().to_string(),
        total_supply_raw,
        decimals: request.decimals as u8,
        logo_base64: request.logo_base64.clone().filter(|logo| !logo.is_empty()),
    })
}

/// Scale a human amount such as "1000.5" by 10^decimals
pub fn scale_amount(amount: &str, decimals: u32) -> Result<U256, ValidationError> {
    parse_decimal(amount)?.scale(decimals)
}

struct DecimalAmount<'a> {
    integer: &'a str,
    fraction: &'a str,
}

fn parse_decimal(raw: &str) -> Result<DecimalAmount<'_>, ValidationError> {
    let raw = raw.trim();
    let (integer, fraction) = raw.split_once('.').unwrap_or((raw, ""));

    if integer.is_empty() && fraction.is_empty() {
        return Err(ValidationError::InvalidSupply);
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(integer) || !all_digits(fraction) {
        return Err(ValidationError::InvalidSupply);
    }
    if !integer.bytes().chain(fraction.bytes()).any(|b| b != b'0') {
        return Err(ValidationError::InvalidSupply);
    }

    Ok(DecimalAmount {
        integer,
        // trailing zeros carry no precision
        fraction: fraction.trim_end_matches('0'),
    })
}

impl DecimalAmount<'_> {
    fn scale(&self, decimals: u32) -> Result<U256, ValidationError> {
        // an out-of-range exponent would otherwise surface as an overflow
        if decimals > MAX_DECIMALS {
            return Err(ValidationError::InvalidDecimals(decimals));
        }
        let fraction_len = self.fraction.len() as u32;
        if fraction_len > decimals {
            return Err(ValidationError::SupplyPrecision(decimals));
        }

        let ten = U256::from(10u8);
        let overflow = || ValidationError::SupplyOverflow(decimals);

        let mut value = U256::ZERO;
        for digit in self.integer.bytes().chain(self.fraction.bytes()) {
            value = value
                .checked_mul(ten)
                .and_then(|v| v.checked_add(U256::from(digit - b'0')))
                .ok_or_else(overflow)?;
        }

        let multiplier = ten
            .checked_pow(U256::from(decimals - fraction_len))
            .ok_or_else(overflow)?;
        value.checked_mul(multiplier).ok_or_else(overflow)
    }
}
