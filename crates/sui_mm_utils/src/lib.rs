pub mod constants;
pub mod env;
pub mod log;
pub mod utils;
