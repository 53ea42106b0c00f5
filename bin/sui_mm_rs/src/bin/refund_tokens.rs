use std::{env, str::FromStr};

use sui_mm_rs::{
    constants::Env,
    core::WalletService,
    utils::{connect_chain, load_wallet_range, wallet_from_env},
};
use sui_mm_utils::log::setup_logger;
use sui_sdk::types::base_types::SuiAddress;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    setup_logger(None)?;

    let args: Vec<String> = env::args().collect();
    if args.len() != 4 && args.len() != 5 {
        log::warn!(
            "Function {} need 3 params: <COIN_TYPE> <WALLET_INDEX_FROM> <WALLET_INDEX_TO> [COLLECTOR_ADDRESS]",
            args[0]
        );
        return Ok(());
    }

    let env = Env::new();
    let coin_type = &args[1];
    let index_from: usize = args[2].parse()?;
    let index_to: usize = args[3].parse()?;

    let funding = wallet_from_env("PRIVATE_KEY")?;
    let collector = match args.get(4) {
        Some(address) => SuiAddress::from_str(address)?,
        None => funding.address,
    };
    let wallets = load_wallet_range(&env.wallets_file, index_from, index_to)?;

    let chain = connect_chain(&env).await?;
    let wallet_service = WalletService::new(env.clone(), chain);
    let report = wallet_service
        .refund_tokens(&funding, collector, coin_type, &wallets)
        .await;
    log::info!("refund report {}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
