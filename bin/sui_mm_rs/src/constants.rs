use std::str::FromStr;

use provider_utils::{enums::ENetwork, networks::NETWORKS};
use sui_mm_utils::{
    constants::DEFAULT_GAS_BUDGET,
    env::{get_env, get_env_opt, get_env_parsed},
};

#[derive(Debug, Clone, Default)]
pub struct Env {
    pub listen_network: ENetwork,
    pub gas_budget: u64,
    pub wallets_file: String,
    pub backend_server_url: String,
    /// Tried before the network's default endpoints.
    pub rpc_url: Option<String>,
}

impl Env {
    pub fn new() -> Self {
        let network_str = get_env("LISTEN_NETWORK", None);
        let Ok(listen_network) = ENetwork::from_str(&network_str) else {
            panic!("LISTEN_NETWORK {:?} invalid", network_str);
        };
        if !NETWORKS.contains_key(&listen_network) {
            panic!("NETWORKS {:?} not found", listen_network);
        }

        Self {
            listen_network,
            gas_budget: get_env_parsed("GAS_BUDGET", Some(DEFAULT_GAS_BUDGET)),
            wallets_file: get_env("WALLETS_FILE", Some("wallets.txt".to_string())),
            backend_server_url: get_env("BACKEND_SERVER_URL", Some(String::new())),
            rpc_url: get_env_opt("SUI_RPC_URL"),
        }
    }

    /// Explorer link of a transaction digest.
    pub fn tx_link(&self, digest: &str) -> String {
        NETWORKS
            .get(&self.listen_network)
            .map(|network| network.tx_link(digest))
            .unwrap_or_else(|| digest.to_string())
    }
}
