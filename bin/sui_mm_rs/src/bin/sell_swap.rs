use std::{env, str::FromStr, sync::Arc};

use rust_decimal::Decimal;
use sui_mm_rs::{
    constants::Env,
    core::SwapService,
    utils::{coin_decimals, connect_chain, wallet_from_env},
};
use sui_mm_toolkit::cetus::{CetusClmm, CetusConfig};
use sui_mm_utils::{constants::SUI_DECIMALS, log::setup_logger, utils::parse_units};
use sui_sdk::types::base_types::ObjectID;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    setup_logger(None)?;

    let args: Vec<String> = env::args().collect();
    if args.len() != 4 && args.len() != 5 {
        log::warn!(
            "Function {} need 3 params: <POOL_ID> <AMOUNT> <SLIPPAGE_PERCENT> [in|out]",
            args[0]
        );
        return Ok(());
    }

    let env = Env::new();
    let pool_id = ObjectID::from_str(&args[1])?;
    let slippage = Decimal::from_str(&args[3])?;
    let by_amount_in = match args.get(4).map(String::as_str) {
        None | Some("in") => true,
        Some("out") => false,
        Some(other) => {
            log::warn!("Swap side must be in or out, got {:?}", other);
            return Ok(());
        }
    };

    let wallet = wallet_from_env("PRIVATE_KEY")?;
    let chain = connect_chain(&env).await?;
    let clmm = Arc::new(CetusClmm::new(
        chain.clone(),
        CetusConfig::for_network(&env.listen_network)?,
    ));

    // exact in counts the token, exact out counts SUI
    let decimals = if by_amount_in {
        let pool = clmm.get_pool(pool_id).await?;
        coin_decimals(chain.as_ref(), &pool.coin_type_a).await
    } else {
        SUI_DECIMALS
    };
    let amount = parse_units(&args[2], decimals)?;
    log::info!(
        "Config params:\nPOOL_ID: {:#?}\nAMOUNT: {:#?}\nSLIPPAGE_PERCENT: {:#?}\nBY_AMOUNT_IN: {:#?}",
        pool_id,
        args[2],
        slippage,
        by_amount_in
    );

    let swap_service = SwapService::new(env.clone(), chain, clmm);
    if !swap_service
        .sell_swap(&wallet, amount, slippage, pool_id, by_amount_in)
        .await
    {
        log::warn!("sell swap did not go through");
    }
    Ok(())
}
