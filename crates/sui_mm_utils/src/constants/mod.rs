mod cetus;
mod sui;
mod timing;

pub use cetus::*;
pub use sui::*;
pub use timing::*;
