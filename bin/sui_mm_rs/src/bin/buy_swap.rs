use std::{env, str::FromStr, sync::Arc};

use rust_decimal::Decimal;
use sui_mm_rs::{
    constants::Env,
    core::SwapService,
    utils::{connect_chain, wallet_from_env},
};
use sui_mm_toolkit::cetus::{CetusClmm, CetusConfig};
use sui_mm_utils::{constants::SUI_DECIMALS, log::setup_logger, utils::parse_units};
use sui_sdk::types::base_types::ObjectID;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    setup_logger(None)?;

    let args: Vec<String> = env::args().collect();
    if args.len() != 4 {
        log::warn!(
            "Function {} need 3 params: <POOL_ID> <AMOUNT_SUI> <SLIPPAGE_PERCENT>",
            args[0]
        );
        return Ok(());
    }

    let env = Env::new();
    let pool_id = ObjectID::from_str(&args[1])?;
    let amount = parse_units(&args[2], SUI_DECIMALS)?;
    let slippage = Decimal::from_str(&args[3])?;
    log::info!(
        "Config params:\nPOOL_ID: {:#?}\nAMOUNT_SUI: {:#?}\nSLIPPAGE_PERCENT: {:#?}",
        pool_id,
        args[2],
        slippage
    );

    let wallet = wallet_from_env("PRIVATE_KEY")?;
    let chain = connect_chain(&env).await?;
    let clmm = Arc::new(CetusClmm::new(
        chain.clone(),
        CetusConfig::for_network(&env.listen_network)?,
    ));
    let swap_service = SwapService::new(env.clone(), chain, clmm);

    if !swap_service.buy_swap(&wallet, amount, slippage, pool_id).await {
        log::warn!("buy swap did not go through");
    }
    Ok(())
}
