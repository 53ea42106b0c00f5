use std::{env, sync::Arc};

use sui_mm_rs::{constants::Env, core::PoolService, utils::connect_chain};
use sui_mm_toolkit::cetus::{CetusClmm, CetusConfig};
use sui_mm_utils::log::setup_logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    setup_logger(None)?;

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        log::warn!("Function {} need 1 param: <COIN_TYPE>", args[0]);
        return Ok(());
    }

    let env = Env::new();
    let chain = connect_chain(&env).await?;
    let clmm = Arc::new(CetusClmm::new(
        chain.clone(),
        CetusConfig::for_network(&env.listen_network)?,
    ));
    let pool_service = PoolService::new(env.clone(), chain, clmm);

    let pool = pool_service.find_pool_by_coin(&args[1]).await?;
    log::info!("pool {:#?}", pool);
    Ok(())
}
