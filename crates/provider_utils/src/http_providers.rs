use anyhow::anyhow;
use sui_sdk::{SuiClient, SuiClientBuilder};

use crate::{
    constants::{is_connection_error, PROVIDER_REQUEST_TIMEOUT},
    enums::ENetwork,
    networks::NETWORKS,
};

pub struct HttpProviders;

impl HttpProviders {
    /// Candidate RPC urls, the custom one (if any) first.
    pub fn get_rpc_urls(network: &ENetwork, custom_rpc: Option<&str>) -> Vec<String> {
        let Some(network_config) = NETWORKS.get(network) else {
            panic!("NETWORKS {:?} not found", network);
        };

        let mut urls = Vec::with_capacity(network_config.rpc_url.len() + 1);
        if let Some(custom_rpc) = custom_rpc.filter(|url| !url.trim().is_empty()) {
            urls.push(custom_rpc.trim().to_string());
        }
        for url in &network_config.rpc_url {
            if !urls.contains(url) {
                urls.push(url.clone());
            }
        }
        urls
    }

    pub async fn get_provider(url: &str) -> anyhow::Result<SuiClient> {
        let client = SuiClientBuilder::default()
            .request_timeout(PROVIDER_REQUEST_TIMEOUT)
            .build(url)
            .await?;
        Ok(client)
    }

    pub async fn get_healthy_provider(
        network: &ENetwork,
        custom_rpc: Option<&str>,
    ) -> anyhow::Result<SuiClient> {
        for url in Self::get_rpc_urls(network, custom_rpc) {
            let client = match Self::get_provider(&url).await {
                Ok(client) => client,
                Err(err) => {
                    if is_connection_error(&err.to_string()) {
                        log::info!("Provider {:?} is unavailable !!", url);
                        continue;
                    }
                    return Err(err);
                }
            };

            match client.read_api().get_chain_identifier().await {
                Ok(chain_id) => {
                    log::info!("Provider {:?} healthy, chain_id {:?}", url, chain_id);
                    return Ok(client);
                }
                Err(err) => {
                    log::info!("Provider {:?} is unavailable: {:?}", url, err);
                    continue;
                }
            }
        }

        Err(anyhow!(
            "All providers of {:?} failed to return the chain identifier",
            network
        ))
    }
}
