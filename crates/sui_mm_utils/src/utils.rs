use std::str::FromStr;

use rust_decimal::{prelude::ToPrimitive, Decimal};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnitsError {
    #[error("invalid amount {0:?}")]
    InvalidAmount(String),
    #[error("negative amount {0:?}")]
    Negative(String),
    #[error("amount {0:?} overflows with {1} decimals")]
    Overflow(String, u8),
}

/// Human amount to base units, dropping digits beyond `decimals`.
pub fn parse_units(amount: &str, decimals: u8) -> Result<u64, UnitsError> {
    let trimmed = amount.trim();
    let value =
        Decimal::from_str(trimmed).map_err(|_| UnitsError::InvalidAmount(trimmed.to_string()))?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(UnitsError::Negative(trimmed.to_string()));
    }
    let overflow = || UnitsError::Overflow(trimmed.to_string(), decimals);
    let scale = 10u64
        .checked_pow(decimals as u32)
        .map(Decimal::from)
        .ok_or_else(overflow)?;
    value
        .checked_mul(scale)
        .ok_or_else(overflow)?
        .trunc()
        .to_u64()
        .ok_or_else(overflow)
}

/// Base units to a human amount without trailing zeros.
pub fn format_units(amount: u128, decimals: u8) -> String {
    i128::try_from(amount)
        .ok()
        .and_then(|amount| Decimal::try_from_i128_with_scale(amount, decimals as u32).ok())
        .map(|value| value.normalize().to_string())
        .unwrap_or_else(|| amount.to_string())
}

/// Comma separated human amounts, e.g. `0.1,0.25,1`.
pub fn parse_amount_list(list: &str, decimals: u8) -> Result<Vec<u64>, UnitsError> {
    list.split(',')
        .filter(|item| !item.trim().is_empty())
        .map(|item| parse_units(item, decimals))
        .collect()
}

/// Expand every address of a Move type to its full 32-byte hex form,
/// e.g. `0x2::sui::SUI` becomes `0x000..02::sui::SUI`.
pub fn normalize_coin_type(coin_type: &str) -> String {
    let mut normalized = String::with_capacity(coin_type.len() + 64);
    let mut token = String::new();
    for ch in coin_type.trim().chars() {
        if matches!(ch, '<' | '>' | ',' | ' ') {
            normalized.push_str(&normalize_type_token(&token));
            token.clear();
            if ch != ' ' {
                normalized.push(ch);
            }
        } else {
            token.push(ch);
        }
    }
    normalized.push_str(&normalize_type_token(&token));
    normalized
}

fn normalize_type_token(token: &str) -> String {
    let Some((address, rest)) = token.split_once("::") else {
        return token.to_string();
    };
    let hex = address.trim_start_matches("0x").to_lowercase();
    if hex.is_empty() || hex.len() > 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return token.to_string();
    }
    format!("0x{:0>64}::{}", hex, rest)
}

pub fn is_same_coin_type(a: &str, b: &str) -> bool {
    normalize_coin_type(a) == normalize_coin_type(b)
}

/// Struct name of a coin type, `0x..::my_coin::MY_COIN` gives `MY_COIN`.
pub fn coin_symbol(coin_type: &str) -> &str {
    let base = coin_type.split('<').next().unwrap_or(coin_type);
    base.rsplit("::").next().unwrap_or(base)
}

pub fn format_bmk(number: &str, fixed: usize) -> String {
    let Ok(value) = Decimal::from_str(number) else {
        return number.to_string();
    };
    let (divisor, suffix) = if value >= Decimal::from(1_000_000_000u64) {
        (Decimal::from(1_000_000_000u64), "B")
    } else if value >= Decimal::from(1_000_000u64) {
        (Decimal::from(1_000_000u64), "M")
    } else if value >= Decimal::from(1_000u64) {
        (Decimal::from(1_000u64), "K")
    } else {
        (Decimal::ONE, "")
    };
    format!("{}{}", (value / divisor).round_dp(fixed as u32).normalize(), suffix)
}
