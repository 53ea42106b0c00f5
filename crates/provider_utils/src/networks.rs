use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::enums::ENetwork;

#[derive(Debug, Clone, Default)]
pub struct NetworkConfig {
    pub network: ENetwork,
    pub chain_name: &'static str,
    pub rpc_url: Vec<String>,
    pub explorer_tx_url: &'static str,
}

impl NetworkConfig {
    pub fn tx_link(&self, digest: &str) -> String {
        format!("{}{}", self.explorer_tx_url, digest)
    }
}

pub static NETWORKS: Lazy<HashMap<ENetwork, NetworkConfig>> = Lazy::new(|| {
    HashMap::from([
        (
            ENetwork::SuiMainnet,
            NetworkConfig {
                network: ENetwork::SuiMainnet,
                chain_name: "mainnet",
                rpc_url: vec![
                    "https://fullnode.mainnet.sui.io:443".to_string(),
                    "https://sui-mainnet-endpoint.blockvision.org".to_string(),
                ],
                explorer_tx_url: "https://suivision.xyz/txblock/",
            },
        ),
        (
            ENetwork::SuiTestnet,
            NetworkConfig {
                network: ENetwork::SuiTestnet,
                chain_name: "testnet",
                rpc_url: vec![
                    "https://fullnode.testnet.sui.io:443".to_string(),
                    "https://sui-testnet-endpoint.blockvision.org".to_string(),
                ],
                explorer_tx_url: "https://testnet.suivision.xyz/txblock/",
            },
        ),
    ])
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_network_has_rpc_urls() {
        for (network, config) in NETWORKS.iter() {
            assert_eq!(*network, config.network);
            assert!(!config.rpc_url.is_empty(), "{:?} has no rpc url", network);
        }
    }

    #[test]
    fn builds_explorer_links() {
        let testnet = NETWORKS.get(&ENetwork::SuiTestnet).unwrap();
        assert_eq!(
            testnet.tx_link("AbC"),
            "https://testnet.suivision.xyz/txblock/AbC"
        );
    }
}
