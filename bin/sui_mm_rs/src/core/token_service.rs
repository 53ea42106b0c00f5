use std::sync::Arc;

use sui_mm_toolkit::{
    cetus::type_params,
    chain::{ChainClient, TxOutcome},
    coin::gas_payment,
    contract_builder::{BuildContractRequest, BuildContractResponse, ContractBuilderApi},
    errors::MmError,
    tx::{build_tx_data, TxCtx},
    wallet::Wallet,
};
use sui_mm_utils::{constants::PUBLISH_GAS_BUDGET, utils::normalize_coin_type};

use crate::{constants::Env, types::CreateTokenParams};

const TREASURY_CAP_PATTERN: &str = "::coin::TreasuryCap<";

pub struct TokenService {
    env: Env,
    chain: Arc<dyn ChainClient>,
}

impl TokenService {
    pub fn new(env: Env, chain: Arc<dyn ChainClient>) -> Self {
        Self { env, chain }
    }

    /// Build the coin module remotely and publish it. Returns the coin type.
    pub async fn create_token(&self, wallet: &Wallet, params: &CreateTokenParams) -> Result<String, MmError> {
        let api = ContractBuilderApi::new(&self.env.backend_server_url)
            .map_err(|err| MmError::InvalidInput(format!("BACKEND_SERVER_URL: {}", err)))?;
        let request = BuildContractRequest::from(params);
        log::info!("build token contract {:?} ({})", params.name, params.symbol);

        let build = api.build_token_contract(&request).await;
        if build.is_empty() {
            return Err(MmError::Unavailable(format!(
                "no contract built for {:?}",
                params.symbol
            )));
        }
        self.publish_token(wallet, &build).await
    }

    /// Publish built modules, keep the upgrade cap with the creator.
    pub async fn publish_token(&self, wallet: &Wallet, build: &BuildContractResponse) -> Result<String, MmError> {
        let mut ctx = TxCtx::default();
        let upgrade_cap = ctx.publish(build.module_bytes()?, build.dependency_ids()?);
        ctx.transfer(wallet.address, vec![upgrade_cap])?;

        let (gas, _) = gas_payment(self.chain.as_ref(), wallet.address, &[]).await?;
        let gas_price = self.chain.reference_gas_price().await?;
        let data = build_tx_data(
            wallet.address,
            None,
            gas,
            ctx.finish(),
            PUBLISH_GAS_BUDGET,
            gas_price,
        );
        let signature = wallet.sign(&data);
        let outcome = self.chain.execute(data, vec![signature]).await?;
        log::info!(
            "publish success digest {:?} {}",
            outcome.digest,
            self.env.tx_link(&outcome.digest)
        );

        let coin_type = coin_type_of(&outcome, &build.module_name)?;
        log::info!("token created {:?}", coin_type);
        Ok(coin_type)
    }
}

/// From the created `TreasuryCap<T>`, else `{package}::{module}::{MODULE}`.
fn coin_type_of(outcome: &TxOutcome, module_name: &str) -> Result<String, MmError> {
    if let Some(cap) = outcome.find_created(TREASURY_CAP_PATTERN) {
        if let Some(coin_type) = type_params(&cap.object_type).into_iter().next() {
            return Ok(normalize_coin_type(&coin_type));
        }
    }
    let package_id = outcome
        .published_package
        .ok_or_else(|| MmError::NotFound(format!("published package in {}", outcome.digest)))?;
    Ok(normalize_coin_type(&format!(
        "{}::{}::{}",
        package_id,
        module_name,
        module_name.to_uppercase()
    )))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use sui_mm_toolkit::{chain::CreatedObject, testing::MockChain};
    use sui_mm_utils::constants::SUI_COIN_TYPE;
    use sui_sdk::types::base_types::ObjectID;

    use super::*;

    fn build() -> BuildContractResponse {
        serde_json::from_value(json!({
            "modules": ["oRzrCwYAAAA="],
            "dependencies": ["0x1", "0x2"],
            "module_name": "moon_cat",
        }))
        .unwrap()
    }

    fn setup(backend_server_url: &str) -> (Arc<MockChain>, TokenService, Wallet) {
        let chain = Arc::new(MockChain::new());
        let wallet = Wallet::from_secret(&"5a".repeat(32)).unwrap();
        chain.mint(wallet.address, SUI_COIN_TYPE, 2_000_000_000);
        let env = Env {
            backend_server_url: backend_server_url.to_string(),
            ..Default::default()
        };
        (chain.clone(), TokenService::new(env, chain), wallet)
    }

    #[tokio::test]
    async fn coin_type_comes_from_the_treasury_cap() {
        let (chain, service, wallet) = setup("http://127.0.0.1:1");
        chain.push_created(CreatedObject {
            object_id: ObjectID::random(),
            object_type: "0x2::package::UpgradeCap".to_string(),
        });
        chain.push_created(CreatedObject {
            object_id: ObjectID::random(),
            object_type: "0x2::coin::TreasuryCap<0xbeef::moon_cat::MOON_CAT>".to_string(),
        });

        let coin_type = service.publish_token(&wallet, &build()).await.unwrap();
        assert_eq!(coin_type, normalize_coin_type("0xbeef::moon_cat::MOON_CAT"));
        assert_eq!(chain.execute_calls(), 1);
    }

    #[tokio::test]
    async fn coin_type_falls_back_to_the_published_package() {
        let (chain, service, wallet) = setup("http://127.0.0.1:1");
        let package_id = ObjectID::random();
        chain.push_published(package_id);

        let coin_type = service.publish_token(&wallet, &build()).await.unwrap();
        assert_eq!(
            coin_type,
            normalize_coin_type(&format!("{}::moon_cat::MOON_CAT", package_id))
        );
    }

    #[tokio::test]
    async fn publishing_needs_the_publish_gas_budget() {
        let (chain, service, _) = setup("http://127.0.0.1:1");
        let poor = Wallet::from_secret(&"5b".repeat(32)).unwrap();
        chain.mint(poor.address, SUI_COIN_TYPE, 1_000_000);
        assert!(matches!(
            service.publish_token(&poor, &build()).await,
            Err(MmError::InsufficientFunds(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_builder_is_unavailable() {
        let (chain, service, wallet) = setup("http://127.0.0.1:1");
        let params = CreateTokenParams {
            name: "Moon Cat".to_string(),
            symbol: "MCAT".to_string(),
            decimals: 9,
            description: "meow".to_string(),
            supply: 1_000_000_000,
            icon_url: String::new(),
        };
        assert!(matches!(
            service.create_token(&wallet, &params).await,
            Err(MmError::Unavailable(_))
        ));
        assert_eq!(chain.execute_calls(), 0);
    }
}
