use std::time::Duration;

pub const SWAP_RETRY_ATTEMPTS: u32 = 3;
pub const SWAP_RETRY_DELAY: Duration = Duration::from_millis(2000);

/// Wait after a successful disperse so later reads observe the new coins.
pub const DISPERSE_SETTLE_DELAY: Duration = Duration::from_millis(3000);

/// Pause between two wallets of a refund run.
pub const REFUND_DELAY: Duration = Duration::from_millis(2000);
