use serde::Serialize;
use sui_sdk::types::base_types::SuiAddress;

/// Ordered (recipient, amount) pairs paid from one funding wallet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferPlan {
    pub transfers: Vec<(SuiAddress, u64)>,
}

impl TransferPlan {
    pub fn new(transfers: Vec<(SuiAddress, u64)>) -> Self {
        Self { transfers }
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    pub fn total(&self) -> u128 {
        self.transfers.iter().map(|(_, amount)| *amount as u128).sum()
    }

    pub fn amounts(&self) -> Vec<u64> {
        self.transfers.iter().map(|(_, amount)| *amount).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefundReport {
    pub refunded: Vec<SuiAddress>,
    pub skipped: Vec<SuiAddress>,
    pub failed: Vec<SuiAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletReport {
    pub index: usize,
    pub address: SuiAddress,
    pub sui_balance: Option<u128>,
    pub token_balance: Option<u128>,
}
