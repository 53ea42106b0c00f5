use std::env;

use sui_mm_rs::{
    constants::Env,
    core::WalletService,
    utils::{build_plan, coin_decimals, connect_chain, load_wallet_range, random_amounts, wallet_from_env},
};
use sui_mm_utils::{log::setup_logger, utils::parse_units};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    setup_logger(None)?;

    let args: Vec<String> = env::args().collect();
    if args.len() != 6 {
        log::warn!(
            "Function {} need 5 params: <COIN_TYPE> <WALLET_INDEX_FROM> <WALLET_INDEX_TO> <AMOUNT_MIN> <AMOUNT_MAX>",
            args[0]
        );
        return Ok(());
    }

    let env = Env::new();
    let coin_type = &args[1];
    let index_from: usize = args[2].parse()?;
    let index_to: usize = args[3].parse()?;

    let funding = wallet_from_env("PRIVATE_KEY")?;
    let wallets = load_wallet_range(&env.wallets_file, index_from, index_to)?;
    let chain = connect_chain(&env).await?;
    let decimals = coin_decimals(chain.as_ref(), coin_type).await;

    let amount_min = parse_units(&args[4], decimals)?;
    let amount_max = parse_units(&args[5], decimals)?;
    log::info!(
        "Config params:\nCOIN_TYPE: {:#?}\nWALLET_INDEX_FROM: {:#?}\nWALLET_INDEX_TO: {:#?}\nAMOUNT_MIN: {:#?}\nAMOUNT_MAX: {:#?}",
        coin_type,
        index_from,
        index_to,
        args[4],
        args[5]
    );

    let recipients: Vec<_> = wallets.iter().map(|wallet| wallet.address).collect();
    let amounts = random_amounts(amount_min, amount_max, recipients.len())?;
    let plan = build_plan(&recipients, &amounts)?;

    let wallet_service = WalletService::new(env.clone(), chain);
    wallet_service.disperse_tokens(&funding, coin_type, &plan).await?;
    Ok(())
}
