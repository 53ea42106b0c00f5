use std::str::FromStr;

use provider_utils::enums::ENetwork;
use sui_mm_utils::{constants::CETUS_IDS, env::get_env_opt};
use sui_sdk::types::base_types::ObjectID;

use crate::errors::MmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CetusConfig {
    pub clmm_package_id: ObjectID,
    pub integrate_published_at: ObjectID,
    pub global_config_id: ObjectID,
    pub pools_id: ObjectID,
}

fn parse_id(name: &str, value: &str) -> Result<ObjectID, MmError> {
    ObjectID::from_str(value)
        .map_err(|err| MmError::InvalidInput(format!("{} {:?}: {}", name, value, err)))
}

impl CetusConfig {
    /// Deployment ids of `network`. Each id can be overridden with its
    /// `CETUS_*` env var, e.g. `CETUS_INTEGRATE_PUBLISHED_AT`.
    pub fn for_network(network: &ENetwork) -> Result<Self, MmError> {
        let Some(ids) = CETUS_IDS.get(network) else {
            return Err(MmError::NotFound(format!(
                "Cetus deployment for {:?}",
                network
            )));
        };
        let pick = |name: &str, default: &str| {
            let value = get_env_opt(name).unwrap_or_else(|| default.to_string());
            parse_id(name, &value)
        };

        Ok(Self {
            clmm_package_id: pick("CETUS_CLMM_PACKAGE_ID", ids.clmm_package_id)?,
            integrate_published_at: pick(
                "CETUS_INTEGRATE_PUBLISHED_AT",
                ids.integrate_published_at,
            )?,
            global_config_id: pick("CETUS_GLOBAL_CONFIG_ID", ids.global_config_id)?,
            pools_id: pick("CETUS_POOLS_ID", ids.pools_id)?,
        })
    }

    pub fn create_pool_event_type(&self) -> String {
        format!("{}::factory::CreatePoolEvent", self.clmm_package_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_known_deployment() {
        for network in [ENetwork::SuiMainnet, ENetwork::SuiTestnet] {
            let config = CetusConfig::for_network(&network).unwrap();
            assert_ne!(config.global_config_id, config.pools_id);
            assert!(config
                .create_pool_event_type()
                .ends_with("::factory::CreatePoolEvent"));
        }
    }
}
