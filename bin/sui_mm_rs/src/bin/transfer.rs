use std::{env, str::FromStr};

use sui_mm_rs::{
    constants::Env,
    core::WalletService,
    utils::{coin_decimals, connect_chain, wallet_from_env},
};
use sui_mm_utils::{
    constants::SUI_COIN_TYPE,
    log::setup_logger,
    utils::{is_same_coin_type, parse_units},
};
use sui_sdk::types::base_types::SuiAddress;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    setup_logger(None)?;

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 && args.len() != 4 {
        log::warn!(
            "Function {} need 2 params: <TO_ADDRESS> <AMOUNT> [COIN_TYPE]",
            args[0]
        );
        return Ok(());
    }

    let env = Env::new();
    let to = SuiAddress::from_str(&args[1])?;
    let coin_type = args.get(3).map(String::as_str).unwrap_or(SUI_COIN_TYPE);
    let from = wallet_from_env("PRIVATE_KEY")?;

    let chain = connect_chain(&env).await?;
    let decimals = coin_decimals(chain.as_ref(), coin_type).await;
    let amount = parse_units(&args[2], decimals)?;
    log::info!(
        "Config params:\nTO_ADDRESS: {:#?}\nAMOUNT: {:#?}\nCOIN_TYPE: {:#?}",
        to,
        args[2],
        coin_type
    );

    let wallet_service = WalletService::new(env.clone(), chain);
    if is_same_coin_type(coin_type, SUI_COIN_TYPE) {
        wallet_service.transfer_sui(&from, to, amount).await?;
    } else {
        wallet_service
            .transfer_token(&from, coin_type, to, amount)
            .await?;
    }
    Ok(())
}
