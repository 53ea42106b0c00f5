use std::env;

use sui_mm_rs::{
    constants::Env,
    core::WalletService,
    utils::{build_plan, connect_chain, load_wallet_range, wallet_from_env},
};
use sui_mm_utils::{constants::SUI_DECIMALS, log::setup_logger, utils::parse_amount_list};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    setup_logger(None)?;

    let args: Vec<String> = env::args().collect();
    if args.len() != 4 {
        log::warn!(
            "Function {} need 3 params: <DISPERSE_SUI_AMOUNTS> <DISPERSE_SUI_WALLET_INDEX_FROM> <DISPERSE_SUI_WALLET_INDEX_TO>",
            args[0]
        );
        return Ok(());
    }

    let env = Env::new();
    let amounts = parse_amount_list(&args[1], SUI_DECIMALS)?;
    let index_from: usize = args[2].parse()?;
    let index_to: usize = args[3].parse()?;
    log::info!(
        "Config params:\nDISPERSE_SUI_AMOUNTS: {:#?}\nDISPERSE_SUI_WALLET_INDEX_FROM: {:#?}\nDISPERSE_SUI_WALLET_INDEX_TO: {:#?}",
        args[1],
        index_from,
        index_to
    );

    let funding = wallet_from_env("PRIVATE_KEY")?;
    let wallets = load_wallet_range(&env.wallets_file, index_from, index_to)?;
    let recipients: Vec<_> = wallets.iter().map(|wallet| wallet.address).collect();
    let plan = build_plan(&recipients, &amounts)?;

    let chain = connect_chain(&env).await?;
    let wallet_service = WalletService::new(env.clone(), chain);
    wallet_service.disperse_sui(&funding, &plan).await?;
    Ok(())
}
