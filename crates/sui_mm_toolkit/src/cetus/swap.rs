use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde_json::Value;
use sui_sdk::types::base_types::ObjectID;

use super::pool::{json_u64, move_field};
use crate::{chain::EventRecord, errors::MmError};

pub const MIN_SQRT_PRICE: u128 = 4_295_048_016;
pub const MAX_SQRT_PRICE: u128 = 79_226_673_515_401_279_992_447_579_055;

pub const CALCULATED_SWAP_RESULT_EVENT: &str = "::fetcher_script::CalculatedSwapResultEvent";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapQuote {
    pub amount_in: u64,
    pub amount_out: u64,
    pub fee_amount: u64,
    /// The pool cannot fill the whole amount.
    pub is_exceed: bool,
}

impl SwapQuote {
    pub fn from_events(events: &[EventRecord]) -> Result<Self, MmError> {
        let event = events
            .iter()
            .find(|event| event.event_type.ends_with(CALCULATED_SWAP_RESULT_EVENT))
            .ok_or_else(|| MmError::NotFound("CalculatedSwapResultEvent".to_string()))?;
        Self::from_json(&event.parsed_json)
    }

    pub fn from_json(json: &Value) -> Result<Self, MmError> {
        let data = json.get("data").unwrap_or(json);
        let field = |name: &str| {
            move_field(data, name)
                .and_then(json_u64)
                .ok_or_else(|| MmError::NotFound(format!("swap result field {}", name)))
        };
        Ok(Self {
            amount_in: field("amount_in")?,
            amount_out: field("amount_out")?,
            fee_amount: field("fee_amount")?,
            is_exceed: move_field(data, "is_exceed")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapParams {
    pub pool_id: ObjectID,
    pub a2b: bool,
    pub by_amount_in: bool,
    pub amount: u64,
    /// Percent, strictly between 0 and 100.
    pub slippage: Decimal,
}

impl SwapParams {
    pub fn validate(&self) -> Result<(), MmError> {
        if self.slippage <= Decimal::ZERO || self.slippage >= Decimal::ONE_HUNDRED {
            return Err(MmError::InvalidInput(format!(
                "slippage {}% must be in (0, 100)",
                self.slippage
            )));
        }
        if self.amount == 0 {
            return Err(MmError::InvalidInput("swap amount is zero".to_string()));
        }
        Ok(())
    }

    pub fn sqrt_price_limit(&self) -> u128 {
        if self.a2b {
            MIN_SQRT_PRICE
        } else {
            MAX_SQRT_PRICE
        }
    }
}

/// Slippage bound on the side opposite to the fixed amount:
/// the minimum output for exact-in, the maximum input for exact-out. Floors.
pub fn amount_limit(quote: &SwapQuote, by_amount_in: bool, slippage: Decimal) -> Result<u64, MmError> {
    let hundred = Decimal::ONE_HUNDRED;
    let limit = if by_amount_in {
        Decimal::from(quote.amount_out) * (hundred - slippage) / hundred
    } else {
        Decimal::from(quote.amount_in) * (hundred + slippage) / hundred
    };
    limit
        .floor()
        .to_u64()
        .ok_or_else(|| MmError::InvalidInput(format!("amount limit {} out of range", limit)))
}
