use serde::{Deserialize, Serialize};
use sui_mm_toolkit::contract_builder::BuildContractRequest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTokenParams {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub description: String,
    /// Whole tokens, not base units.
    pub supply: u64,
    pub icon_url: String,
}

impl From<&CreateTokenParams> for BuildContractRequest {
    fn from(params: &CreateTokenParams) -> Self {
        Self {
            name: params.name.clone(),
            symbol: params.symbol.clone(),
            decimals: params.decimals.to_string(),
            description: params.description.clone(),
            supply: params.supply.to_string(),
            icon_url: params.icon_url.clone(),
        }
    }
}
