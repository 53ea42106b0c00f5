use std::sync::Arc;

use anyhow::anyhow;
use provider_utils::http_providers::HttpProviders;
use rand::Rng;
use sui_mm_toolkit::{
    chain::{ChainClient, SuiChainClient},
    errors::MmError,
    wallet::{load_wallets, Wallet},
};
use sui_mm_utils::{constants::DEFAULT_COIN_DECIMALS, env::get_env};
use sui_sdk::types::base_types::SuiAddress;

use crate::{constants::Env, types::TransferPlan};

pub async fn connect_chain(env: &Env) -> anyhow::Result<Arc<SuiChainClient>> {
    let client =
        HttpProviders::get_healthy_provider(&env.listen_network, env.rpc_url.as_deref()).await?;
    Ok(Arc::new(SuiChainClient::new(client)))
}

/// Wallet from the secret stored in env var `key`.
pub fn wallet_from_env(key: &str) -> anyhow::Result<Wallet> {
    Ok(Wallet::from_secret(&get_env(key, None))?)
}

/// Decimals from the coin metadata, `DEFAULT_COIN_DECIMALS` when unknown.
pub async fn coin_decimals(chain: &dyn ChainClient, coin_type: &str) -> u8 {
    match chain.get_coin_metadata(coin_type).await {
        Ok(Some(metadata)) => metadata.decimals,
        _ => {
            log::warn!(
                "no metadata for {:?}, assume {} decimals",
                coin_type,
                DEFAULT_COIN_DECIMALS
            );
            DEFAULT_COIN_DECIMALS
        }
    }
}

/// Wallets `index_from..=index_to` of the wallets file.
pub fn load_wallet_range(path: &str, index_from: usize, index_to: usize) -> anyhow::Result<Vec<Wallet>> {
    if index_from > index_to {
        return Err(anyhow!(
            "wallet index from {} is greater than index to {}",
            index_from,
            index_to
        ));
    }
    let wallets = load_wallets(path)?;
    if index_to >= wallets.len() {
        return Err(anyhow!(
            "wallet index {} out of range, {} has {} wallets",
            index_to,
            path,
            wallets.len()
        ));
    }
    Ok(wallets[index_from..=index_to].to_vec())
}

/// One amount for every recipient, or exactly one amount per recipient.
pub fn build_plan(recipients: &[SuiAddress], amounts: &[u64]) -> Result<TransferPlan, MmError> {
    let transfers = match amounts {
        [] => return Err(MmError::InvalidInput("no amount given".to_string())),
        [amount] => recipients.iter().map(|address| (*address, *amount)).collect(),
        _ if amounts.len() == recipients.len() => recipients
            .iter()
            .copied()
            .zip(amounts.iter().copied())
            .collect(),
        _ => {
            return Err(MmError::InvalidInput(format!(
                "{} amounts for {} recipients",
                amounts.len(),
                recipients.len()
            )))
        }
    };
    Ok(TransferPlan::new(transfers))
}

/// `count` uniform amounts in `[min, max]`.
pub fn random_amounts(min: u64, max: u64, count: usize) -> Result<Vec<u64>, MmError> {
    if min > max {
        return Err(MmError::InvalidInput(format!(
            "amount min {} is greater than max {}",
            min, max
        )));
    }
    let mut rng = rand::thread_rng();
    Ok((0..count).map(|_| rng.gen_range(min..=max)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addresses(count: usize) -> Vec<SuiAddress> {
        (0..count)
            .map(|_| SuiAddress::random_for_testing_only())
            .collect()
    }

    #[test]
    fn single_amount_applies_to_every_recipient() {
        let recipients = addresses(3);
        let plan = build_plan(&recipients, &[5]).unwrap();
        assert_eq!(plan.amounts(), vec![5, 5, 5]);
        assert_eq!(plan.total(), 15);
        assert_eq!(plan.transfers[2].0, recipients[2]);
    }

    #[test]
    fn amount_list_must_match_recipients() {
        let recipients = addresses(2);
        assert_eq!(build_plan(&recipients, &[1, 2]).unwrap().amounts(), vec![1, 2]);
        assert!(matches!(
            build_plan(&recipients, &[1, 2, 3]),
            Err(MmError::InvalidInput(_))
        ));
        assert!(matches!(
            build_plan(&recipients, &[]),
            Err(MmError::InvalidInput(_))
        ));
    }

    #[test]
    fn random_amounts_stay_in_range() {
        let amounts = random_amounts(10, 20, 50).unwrap();
        assert_eq!(amounts.len(), 50);
        assert!(amounts.iter().all(|amount| (10..=20).contains(amount)));
        assert_eq!(random_amounts(7, 7, 2).unwrap(), vec![7, 7]);
        assert!(random_amounts(2, 1, 1).is_err());
    }

    #[test]
    fn rejects_bad_wallet_ranges() {
        assert!(load_wallet_range("does-not-matter.txt", 3, 1).is_err());
        assert!(load_wallet_range("/nonexistent/wallets.txt", 0, 1).is_err());
    }
}
