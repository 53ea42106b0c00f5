use serde_json::Value;
use sui_mm_utils::utils::normalize_coin_type;
use sui_sdk::types::base_types::{ObjectID, SequenceNumber};

use crate::{chain::ObjectInfo, errors::MmError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    pub pool_id: ObjectID,
    pub coin_type_a: String,
    pub coin_type_b: String,
    pub current_sqrt_price: u128,
    pub tick_spacing: u32,
    pub liquidity: u128,
    pub fee_rate: u64,
    pub is_pause: bool,
    pub initial_shared_version: SequenceNumber,
}

/// Move integers come back as JSON strings (u64 and wider) or numbers.
pub fn json_u128(value: &Value) -> Option<u128> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64().map(u128::from),
        _ => None,
    }
}

pub fn json_u64(value: &Value) -> Option<u64> {
    json_u128(value).and_then(|v| u64::try_from(v).ok())
}

/// Field of a Move struct, whether or not it is wrapped as `{type, fields}`.
pub fn move_field<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
    value
        .get(name)
        .or_else(|| value.get("fields").and_then(|fields| fields.get(name)))
}

/// Top-level type parameters of a Move type, `a::b::C<X, Y<Z>>` gives `[X, Y<Z>]`.
pub fn type_params(type_str: &str) -> Vec<String> {
    let Some(start) = type_str.find('<') else {
        return vec![];
    };
    let rest = type_str[start + 1..].trim_end();
    let inner = rest.strip_suffix('>').unwrap_or(rest);
    let mut params = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for ch in inner.chars() {
        match ch {
            '<' => {
                depth += 1;
                current.push(ch);
            }
            '>' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if depth == 0 => {
                params.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        params.push(current.trim().to_string());
    }
    params
}

impl Pool {
    pub fn from_object(object: &ObjectInfo) -> Result<Self, MmError> {
        let pool_id = object.object_id();
        let not_a_pool = |reason: &str| MmError::NotFound(format!("Cetus pool {}: {}", pool_id, reason));

        let object_type = object
            .object_type
            .as_deref()
            .ok_or_else(|| not_a_pool("missing type"))?;
        if !object_type.contains("::pool::Pool<") {
            return Err(not_a_pool(object_type));
        }
        let [coin_type_a, coin_type_b]: [String; 2] = type_params(object_type)
            .try_into()
            .map_err(|_| not_a_pool(object_type))?;
        let initial_shared_version = object
            .initial_shared_version
            .ok_or_else(|| not_a_pool("not a shared object"))?;

        let fields = &object.fields;
        let field_u128 = |name: &str| {
            move_field(fields, name)
                .and_then(json_u128)
                .ok_or_else(|| not_a_pool(&format!("missing field {}", name)))
        };

        Ok(Self {
            pool_id,
            coin_type_a: normalize_coin_type(&coin_type_a),
            coin_type_b: normalize_coin_type(&coin_type_b),
            current_sqrt_price: field_u128("current_sqrt_price")?,
            tick_spacing: u32::try_from(field_u128("tick_spacing")?)
                .map_err(|_| not_a_pool("tick_spacing out of range"))?,
            liquidity: field_u128("liquidity")?,
            fee_rate: u64::try_from(field_u128("fee_rate")?)
                .map_err(|_| not_a_pool("fee_rate out of range"))?,
            is_pause: move_field(fields, "is_pause")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            initial_shared_version,
        })
    }
}

/// Parsed `factory::CreatePoolEvent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolCreated {
    pub pool_id: ObjectID,
    pub coin_type_a: String,
    pub coin_type_b: String,
    pub tick_spacing: u32,
}

impl PoolCreated {
    pub fn from_json(json: &Value) -> Option<Self> {
        let pool_id = json.get("pool_id")?.as_str()?.parse().ok()?;
        Some(Self {
            pool_id,
            coin_type_a: normalize_coin_type(json.get("coin_type_a")?.as_str()?),
            coin_type_b: normalize_coin_type(json.get("coin_type_b")?.as_str()?),
            tick_spacing: json.get("tick_spacing").and_then(json_u64).unwrap_or_default() as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use sui_sdk::types::base_types::ObjectDigest;

    use super::*;

    const TOKEN: &str = "0x00000000000000000000000000000000000000000000000000000000000000ab::token::TOKEN";
    const SUI: &str = "0x0000000000000000000000000000000000000000000000000000000000000002::sui::SUI";

    fn pool_object(object_type: &str, fields: Value) -> ObjectInfo {
        ObjectInfo {
            object_ref: (
                ObjectID::random(),
                SequenceNumber::from_u64(7),
                ObjectDigest::random(),
            ),
            object_type: Some(object_type.to_string()),
            initial_shared_version: Some(SequenceNumber::from_u64(3)),
            fields,
        }
    }

    #[test]
    fn parses_pool_fields() {
        let object = pool_object(
            "0xcafe::pool::Pool<0xab::token::TOKEN, 0x2::sui::SUI>",
            json!({
                "current_sqrt_price": "18446744073709551616",
                "liquidity": "1000",
                "tick_spacing": 200,
                "fee_rate": "10000",
                "is_pause": false,
                "coin_a": "5",
            }),
        );
        let pool = Pool::from_object(&object).unwrap();
        assert_eq!(pool.coin_type_a, TOKEN);
        assert_eq!(pool.coin_type_b, SUI);
        assert_eq!(pool.current_sqrt_price, 1u128 << 64);
        assert_eq!(pool.tick_spacing, 200);
        assert_eq!(pool.liquidity, 1000);
        assert_eq!(pool.fee_rate, 10000);
        assert!(!pool.is_pause);
        assert_eq!(pool.initial_shared_version, SequenceNumber::from_u64(3));
    }

    #[test]
    fn reads_fields_wrapped_with_their_type() {
        let object = pool_object(
            "0xcafe::pool::Pool<0xab::token::TOKEN, 0x2::sui::SUI>",
            json!({
                "type": "0xcafe::pool::Pool<0xab::token::TOKEN, 0x2::sui::SUI>",
                "fields": {
                    "current_sqrt_price": "1",
                    "liquidity": "0",
                    "tick_spacing": "60",
                    "fee_rate": 2500,
                    "is_pause": true,
                }
            }),
        );
        let pool = Pool::from_object(&object).unwrap();
        assert_eq!(pool.tick_spacing, 60);
        assert_eq!(pool.fee_rate, 2500);
        assert!(pool.is_pause);
    }

    #[test]
    fn rejects_objects_that_are_not_pools() {
        let object = pool_object("0x2::coin::Coin<0x2::sui::SUI>", json!({"balance": "1"}));
        assert!(matches!(
            Pool::from_object(&object),
            Err(MmError::NotFound(_))
        ));

        let object = pool_object(
            "0xcafe::pool::Pool<0xab::token::TOKEN, 0x2::sui::SUI>",
            json!({"liquidity": "1"}),
        );
        assert!(matches!(
            Pool::from_object(&object),
            Err(MmError::NotFound(_))
        ));
    }

    #[test]
    fn splits_type_params_at_top_level() {
        assert_eq!(
            type_params("0x1::pool::Pool<0x2::a::A<0x3::b::B, 0x4::c::C>, 0x2::sui::SUI>"),
            vec!["0x2::a::A<0x3::b::B, 0x4::c::C>", "0x2::sui::SUI"]
        );
        assert!(type_params("0x2::sui::SUI").is_empty());
    }

    #[test]
    fn parses_create_pool_events() {
        let event = PoolCreated::from_json(&json!({
            "pool_id": "0x0000000000000000000000000000000000000000000000000000000000000abc",
            "coin_type_a": "00000000000000000000000000000000000000000000000000000000000000ab::token::TOKEN",
            "coin_type_b": "0000000000000000000000000000000000000000000000000000000000000002::sui::SUI",
            "tick_spacing": 200,
        }))
        .unwrap();
        assert_eq!(event.coin_type_a, TOKEN);
        assert_eq!(event.coin_type_b, SUI);
        assert_eq!(event.tick_spacing, 200);
        assert!(PoolCreated::from_json(&json!({"pool_id": "bad"})).is_none());
    }
}
