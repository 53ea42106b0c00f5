mod pool_service;
mod swap_service;
mod token_service;
mod wallet_service;

pub use pool_service::*;
pub use swap_service::*;
pub use token_service::*;
pub use wallet_service::*;
