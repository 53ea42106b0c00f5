use std::{env, str::FromStr, sync::Arc};

use rust_decimal::Decimal;
use sui_mm_rs::{
    constants::Env,
    core::PoolService,
    utils::{coin_decimals, connect_chain, wallet_from_env},
};
use sui_mm_toolkit::cetus::{CetusClmm, CetusConfig, CreatePoolParams, InitialLiquidity};
use sui_mm_utils::{
    constants::{CETUS_DEFAULT_TICK_SPACING, CETUS_POOL_URL},
    log::setup_logger,
    utils::parse_units,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    setup_logger(None)?;

    let args: Vec<String> = env::args().collect();
    if !(4..=7).contains(&args.len()) {
        log::warn!(
            "Function {} need 3 params: <COIN_TYPE_A> <COIN_TYPE_B> <INITIAL_PRICE> [TICK_SPACING] [LIQUIDITY_AMOUNT] [a|b]",
            args[0]
        );
        return Ok(());
    }

    let env = Env::new();
    let params = CreatePoolParams {
        coin_type_a: args[1].clone(),
        coin_type_b: args[2].clone(),
        initial_price: Decimal::from_str(&args[3])?,
        tick_spacing: match args.get(4) {
            Some(tick_spacing) => tick_spacing.parse()?,
            None => CETUS_DEFAULT_TICK_SPACING,
        },
        url: CETUS_POOL_URL.to_string(),
    };
    let fix_amount_a = match args.get(6).map(String::as_str) {
        None | Some("a") => true,
        Some("b") => false,
        Some(other) => {
            log::warn!("Fixed side must be a or b, got {:?}", other);
            return Ok(());
        }
    };
    log::info!("Config params:\n{:#?}", params);

    let wallet = wallet_from_env("PRIVATE_KEY")?;
    let chain = connect_chain(&env).await?;
    let clmm = Arc::new(CetusClmm::new(
        chain.clone(),
        CetusConfig::for_network(&env.listen_network)?,
    ));
    let pool_service = PoolService::new(env.clone(), chain.clone(), clmm);

    match args.get(5) {
        Some(amount) => {
            let fixed_coin = if fix_amount_a {
                &params.coin_type_a
            } else {
                &params.coin_type_b
            };
            let decimals = coin_decimals(chain.as_ref(), fixed_coin).await;
            let liquidity = InitialLiquidity {
                amount: parse_units(amount, decimals)?,
                fix_amount_a,
            };
            let pool_id = pool_service
                .create_pool_with_initial_liquidity(&wallet, &params, &liquidity)
                .await?;
            log::info!("POOL_ID: {}", pool_id);
        }
        None => {
            pool_service.create_pool(&wallet, &params).await?;
        }
    }
    Ok(())
}
