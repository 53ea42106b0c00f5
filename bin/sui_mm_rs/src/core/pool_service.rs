use std::sync::Arc;

use sui_mm_toolkit::{
    cetus::{CetusClmm, CreatePoolParams, InitialLiquidity, Pool},
    chain::{ChainClient, TxOutcome},
    errors::MmError,
    wallet::Wallet,
};
use sui_sdk::types::{base_types::ObjectID, transaction::TransactionData};

use crate::constants::Env;

const POOL_TYPE_PATTERN: &str = "::pool::Pool<";

pub struct PoolService {
    env: Env,
    chain: Arc<dyn ChainClient>,
    clmm: Arc<CetusClmm>,
}

impl PoolService {
    pub fn new(env: Env, chain: Arc<dyn ChainClient>, clmm: Arc<CetusClmm>) -> Self {
        Self { env, chain, clmm }
    }

    async fn submit(&self, wallet: &Wallet, data: TransactionData) -> Result<TxOutcome, MmError> {
        let signature = wallet.sign(&data);
        let outcome = self.chain.execute(data, vec![signature]).await?;
        log::info!(
            "create pool success digest {:?} {}",
            outcome.digest,
            self.env.tx_link(&outcome.digest)
        );
        Ok(outcome)
    }

    /// Empty pool at `initial_price`.
    pub async fn create_pool(&self, wallet: &Wallet, params: &CreatePoolParams) -> Result<TxOutcome, MmError> {
        log::info!("create pool {:#?}", params);
        let data = self
            .clmm
            .build_create_pool_tx(wallet.address, params, self.env.gas_budget)
            .await?;
        self.submit(wallet, data).await
    }

    /// Pool with a full-range position; returns the new pool id.
    pub async fn create_pool_with_initial_liquidity(
        &self,
        wallet: &Wallet,
        params: &CreatePoolParams,
        liquidity: &InitialLiquidity,
    ) -> Result<ObjectID, MmError> {
        log::info!("create pool {:#?} with liquidity {:?}", params, liquidity);
        let data = self
            .clmm
            .build_create_pool_with_liquidity_tx(wallet.address, params, liquidity, self.env.gas_budget)
            .await?;
        let outcome = self.submit(wallet, data).await?;
        let pool = outcome
            .find_created(POOL_TYPE_PATTERN)
            .ok_or_else(|| MmError::NotFound(format!("created pool in {}", outcome.digest)))?;
        log::info!("pool id {:?}", pool.object_id);
        Ok(pool.object_id)
    }

    pub async fn find_pool_by_coin(&self, coin_type: &str) -> Result<Pool, MmError> {
        self.clmm.find_pool_by_coin(coin_type).await
    }
}
