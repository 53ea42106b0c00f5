use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use sui_sdk::types::base_types::ObjectID;

use crate::{
    common::{Relay, RelayError},
    errors::MmError,
};

pub const TOKEN_CREATOR_ENDPOINT: &str = "/token_creator";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildContractRequest {
    pub name: String,
    pub symbol: String,
    // the backend expects this spelling
    #[serde(rename = "decials")]
    pub decimals: String,
    pub description: String,
    pub supply: String,
    pub icon_url: String,
}

/// Compiled module, either base64 or a raw byte array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ModuleBytes {
    Base64(String),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BuildContractResponse {
    #[serde(default)]
    pub modules: Vec<ModuleBytes>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub module_name: String,
}

impl BuildContractResponse {
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty() || self.module_name.is_empty()
    }

    pub fn module_bytes(&self) -> Result<Vec<Vec<u8>>, MmError> {
        self.modules
            .iter()
            .map(|module| match module {
                ModuleBytes::Base64(encoded) => STANDARD
                    .decode(encoded)
                    .map_err(|err| MmError::InvalidInput(format!("module base64: {}", err))),
                ModuleBytes::Bytes(bytes) => Ok(bytes.clone()),
            })
            .collect()
    }

    pub fn dependency_ids(&self) -> Result<Vec<ObjectID>, MmError> {
        self.dependencies
            .iter()
            .map(|dependency| {
                ObjectID::from_str(dependency).map_err(|err| {
                    MmError::InvalidInput(format!("dependency {:?}: {}", dependency, err))
                })
            })
            .collect()
    }
}

/// Client of the service compiling coin modules from token parameters.
#[derive(Debug, Clone)]
pub struct ContractBuilderApi {
    relay: Relay,
}

impl ContractBuilderApi {
    pub fn new(base_url: &str) -> Result<Self, RelayError> {
        Ok(Self {
            relay: Relay::new(base_url)?,
        })
    }

    /// Empty response on any failure; the failure is logged.
    pub async fn build_token_contract(&self, request: &BuildContractRequest) -> BuildContractResponse {
        match self
            .relay
            .post::<_, BuildContractResponse>(TOKEN_CREATOR_ENDPOINT, request)
            .await
        {
            Ok(response) => response,
            Err(err) => {
                log::error!(
                    "token contract build failed, symbol {:?}: {}",
                    request.symbol,
                    err
                );
                BuildContractResponse::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_uses_the_backend_field_names() {
        let request = BuildContractRequest {
            name: "Token-A".to_string(),
            symbol: "$A".to_string(),
            decimals: "9".to_string(),
            description: "test".to_string(),
            supply: "4444444444".to_string(),
            icon_url: "https://example.com/a.png".to_string(),
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["decials"], "9");
        assert!(body.get("decimals").is_none());
        assert_eq!(body["icon_url"], "https://example.com/a.png");
    }

    #[test]
    fn decodes_build_responses() {
        let response: BuildContractResponse = serde_json::from_value(json!({
            "modules": ["oRzrCwYAAAA=", [1, 2, 3]],
            "dependencies": ["0x1", "0x2"],
            "module_name": "token_a",
        }))
        .unwrap();
        assert!(!response.is_empty());
        let modules = response.module_bytes().unwrap();
        assert_eq!(modules[0], vec![0xa1, 0x1c, 0xeb, 0x0b, 0x06, 0, 0, 0]);
        assert_eq!(modules[1], vec![1, 2, 3]);
        assert_eq!(
            response.dependency_ids().unwrap(),
            vec![ObjectID::from_single_byte(1), ObjectID::from_single_byte(2)]
        );
    }

    #[test]
    fn missing_fields_mean_an_empty_build() {
        let response: BuildContractResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.is_empty());
        assert!(response.module_bytes().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreachable_backend_gives_an_empty_build() {
        let api = ContractBuilderApi::new("http://127.0.0.1:1").unwrap();
        let request = BuildContractRequest {
            name: "n".to_string(),
            symbol: "S".to_string(),
            decimals: "9".to_string(),
            description: String::new(),
            supply: "1".to_string(),
            icon_url: String::new(),
        };
        assert!(api.build_token_contract(&request).await.is_empty());
    }
}
