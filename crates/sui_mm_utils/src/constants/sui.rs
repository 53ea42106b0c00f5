pub const SUI_COIN_TYPE: &str = "0x2::sui::SUI";
pub const SUI_DECIMALS: u8 = 9;

/// Decimals assumed for a coin whose metadata cannot be read.
pub const DEFAULT_COIN_DECIMALS: u8 = 9;

pub const DEFAULT_GAS_BUDGET: u64 = 50_000_000;
pub const PUBLISH_GAS_BUDGET: u64 = 500_000_000;

/// Protocol limit on gas payment objects per transaction.
pub const MAX_GAS_OBJECTS: usize = 256;
