use std::env;

use itertools::Itertools;
use sui_mm_rs::{
    constants::Env,
    core::WalletService,
    utils::{coin_decimals, connect_chain},
};
use sui_mm_toolkit::wallet::load_wallets;
use sui_mm_utils::{
    constants::SUI_DECIMALS,
    log::setup_logger,
    utils::{format_bmk, format_units},
};

fn show(balance: Option<u128>, decimals: u8) -> String {
    balance
        .map(|balance| format_bmk(&format_units(balance, decimals), 2))
        .unwrap_or_else(|| "?".to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    setup_logger(None)?;

    let args: Vec<String> = env::args().collect();
    if args.len() > 2 {
        log::warn!("Function {} takes 1 optional param: [COIN_TYPE]", args[0]);
        return Ok(());
    }

    let env = Env::new();
    let wallets = load_wallets(&env.wallets_file)?;
    let chain = connect_chain(&env).await?;
    let token = match args.get(1) {
        Some(coin_type) => Some((
            coin_type.as_str(),
            coin_decimals(chain.as_ref(), coin_type).await,
        )),
        None => None,
    };
    let token_decimals = token.map(|(_, decimals)| decimals).unwrap_or(SUI_DECIMALS);

    let wallet_service = WalletService::new(env.clone(), chain);
    let reports = wallet_service.check_wallets(&wallets, token).await;
    let lines = reports
        .iter()
        .map(|report| {
            format!(
                "{:>4} {} SUI {} TOKEN {}",
                report.index,
                report.address,
                show(report.sui_balance, SUI_DECIMALS),
                show(report.token_balance, token_decimals)
            )
        })
        .join("\n");
    log::info!("{} wallets\n{}", reports.len(), lines);
    Ok(())
}
