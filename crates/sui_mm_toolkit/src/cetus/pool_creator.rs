use rust_decimal::{prelude::ToPrimitive, Decimal, MathematicalOps};
use sui_mm_utils::constants::CETUS_ALLOWED_TICK_SPACINGS;

use super::swap::{MAX_SQRT_PRICE, MIN_SQRT_PRICE};
use crate::errors::MmError;

pub const MAX_TICK_INDEX: i32 = 443_636;

const Q64: i128 = 1 << 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePoolParams {
    pub coin_type_a: String,
    pub coin_type_b: String,
    pub tick_spacing: u32,
    /// Price of one coin A in coin B, human units.
    pub initial_price: Decimal,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialLiquidity {
    /// Base units of the fixed side.
    pub amount: u64,
    pub fix_amount_a: bool,
}

pub fn validate_tick_spacing(tick_spacing: u32) -> Result<(), MmError> {
    if CETUS_ALLOWED_TICK_SPACINGS.contains(&tick_spacing) {
        Ok(())
    } else {
        Err(MmError::InvalidInput(format!(
            "tick spacing {} not in {:?}",
            tick_spacing, CETUS_ALLOWED_TICK_SPACINGS
        )))
    }
}

/// `sqrt(price * 10^(decimals_b - decimals_a)) * 2^64`, rounded to nearest and
/// clamped to the pool bounds.
pub fn price_to_sqrt_price_x64(
    price: Decimal,
    decimals_a: u8,
    decimals_b: u8,
) -> Result<u128, MmError> {
    if price <= Decimal::ZERO {
        return Err(MmError::InvalidInput(format!("initial price {} must be positive", price)));
    }
    let out_of_range = || MmError::InvalidInput(format!("initial price {} out of range", price));
    let shift = decimals_b as i64 - decimals_a as i64;
    let factor = Decimal::TEN.checked_powi(shift.abs()).ok_or_else(out_of_range)?;
    let scaled = if shift >= 0 {
        price.checked_mul(factor)
    } else {
        price.checked_div(factor)
    }
    .ok_or_else(out_of_range)?;
    let q64 = Decimal::from_i128_with_scale(Q64, 0);
    let min_root = Decimal::from_i128_with_scale(MIN_SQRT_PRICE as i128, 0) / q64;
    let max_root = Decimal::from_i128_with_scale(MAX_SQRT_PRICE as i128, 0) / q64;
    if scaled <= min_root * min_root {
        return Ok(MIN_SQRT_PRICE);
    }
    if scaled >= max_root * max_root {
        return Ok(MAX_SQRT_PRICE);
    }
    let root = scaled.sqrt().ok_or_else(out_of_range)?;

    // integer and fractional halves are shifted separately to stay inside 96 bits
    let whole = root.trunc();
    let fraction = (root - whole)
        .checked_mul(q64)
        .ok_or_else(out_of_range)?
        .round();
    let whole = whole.to_u128().ok_or_else(out_of_range)?;
    let fraction = fraction.to_u128().ok_or_else(out_of_range)?;
    let sqrt_price = whole
        .checked_shl(64)
        .filter(|shifted| shifted >> 64 == whole)
        .and_then(|shifted| shifted.checked_add(fraction))
        .unwrap_or(u128::MAX);
    Ok(sqrt_price.clamp(MIN_SQRT_PRICE, MAX_SQRT_PRICE))
}

/// Widest tick range aligned to `tick_spacing`.
pub fn full_range_ticks(tick_spacing: u32) -> Result<(i32, i32), MmError> {
    validate_tick_spacing(tick_spacing)?;
    let spacing = tick_spacing as i32;
    let upper = MAX_TICK_INDEX - MAX_TICK_INDEX % spacing;
    Ok((-upper, upper))
}

/// Move takes tick indexes as the two's complement `u32`.
pub fn tick_as_u32(tick: i32) -> u32 {
    tick as u32
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn unit_price_with_equal_decimals_is_q64() {
        assert_eq!(
            price_to_sqrt_price_x64(Decimal::ONE, 9, 9),
            Ok(18_446_744_073_709_551_616)
        );
    }

    #[test]
    fn decimals_shift_the_price() {
        // 4 = price 0.04 scaled by 10^(9 - 7)
        let sqrt_price =
            price_to_sqrt_price_x64(Decimal::from_str("0.04").unwrap(), 7, 9).unwrap();
        assert_eq!(sqrt_price, 2 * 18_446_744_073_709_551_616);
    }

    #[test]
    fn irrational_roots_keep_full_precision() {
        // sqrt(2) * 2^64 = 26087635650665564424.699...
        assert_eq!(
            price_to_sqrt_price_x64(Decimal::TWO, 9, 9),
            Ok(26_087_635_650_665_564_425)
        );
        // sqrt(1.5) * 2^64 = 22592555198148962256.195...
        assert_eq!(
            price_to_sqrt_price_x64(Decimal::from_str("1.5").unwrap(), 6, 6),
            Ok(22_592_555_198_148_962_256)
        );
        assert_eq!(
            price_to_sqrt_price_x64(Decimal::from_str("0.0625").unwrap(), 9, 11),
            Ok(46_116_860_184_273_879_040)
        );
    }

    #[test]
    fn clamps_and_rejects_prices() {
        assert_eq!(
            price_to_sqrt_price_x64(Decimal::from_str("0.0000000000000000000000000001").unwrap(), 0, 0),
            Ok(MIN_SQRT_PRICE)
        );
        assert!(price_to_sqrt_price_x64(Decimal::ZERO, 9, 9).is_err());
        assert!(price_to_sqrt_price_x64(Decimal::from(-1), 9, 9).is_err());
    }

    #[test]
    fn full_range_is_aligned_to_spacing() {
        assert_eq!(full_range_ticks(200), Ok((-443_600, 443_600)));
        assert_eq!(full_range_ticks(60), Ok((-443_580, 443_580)));
        assert_eq!(full_range_ticks(2), Ok((-443_636, 443_636)));
        assert!(matches!(
            full_range_ticks(100),
            Err(MmError::InvalidInput(_))
        ));
    }

    #[test]
    fn negative_ticks_wrap_to_u32() {
        assert_eq!(tick_as_u32(-443_600), 4_294_523_696);
        assert_eq!(tick_as_u32(443_600), 443_600);
    }
}
