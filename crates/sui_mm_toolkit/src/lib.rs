pub mod cetus;
pub mod chain;
pub mod coin;
pub mod common;
pub mod contract_builder;
pub mod errors;
pub mod retry;
pub mod tx;
pub mod wallet;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
