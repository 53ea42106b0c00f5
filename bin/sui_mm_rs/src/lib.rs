pub mod constants;
pub mod core;
pub mod types;
pub mod utils;
