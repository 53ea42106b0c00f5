mod common_types;
mod token_types;

pub use common_types::*;
pub use token_types::*;
