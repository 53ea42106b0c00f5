use std::env;

use sui_mm_rs::{
    constants::Env,
    core::TokenService,
    types::CreateTokenParams,
    utils::{connect_chain, wallet_from_env},
};
use sui_mm_utils::log::setup_logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    setup_logger(None)?;

    let args: Vec<String> = env::args().collect();
    if !(5..=7).contains(&args.len()) {
        log::warn!(
            "Function {} need 4 params: <NAME> <SYMBOL> <DECIMALS> <SUPPLY> [DESCRIPTION] [ICON_URL]",
            args[0]
        );
        return Ok(());
    }

    let env = Env::new();
    if env.backend_server_url.is_empty() {
        log::warn!("Please config BACKEND_SERVER_URL");
        return Ok(());
    }
    let params = CreateTokenParams {
        name: args[1].clone(),
        symbol: args[2].clone(),
        decimals: args[3].parse()?,
        supply: args[4].parse()?,
        description: args.get(5).cloned().unwrap_or_default(),
        icon_url: args.get(6).cloned().unwrap_or_default(),
    };
    log::info!("Config params:\n{:#?}", params);

    let wallet = wallet_from_env("PRIVATE_KEY")?;
    let chain = connect_chain(&env).await?;
    let token_service = TokenService::new(env.clone(), chain);
    let coin_type = token_service.create_token(&wallet, &params).await?;
    log::info!("COIN_TYPE: {}", coin_type);
    Ok(())
}
