use std::sync::Arc;

use sui_mm_utils::constants::{MAX_GAS_OBJECTS, SUI_COIN_TYPE};
use sui_sdk::types::{
    base_types::{ObjectID, ObjectRef, SuiAddress},
    transaction::{Argument, ObjectArg},
};

use crate::{
    chain::{ChainClient, CoinObject},
    errors::MmError,
    tx::TxCtx,
};

/// Balance reads with the lenient (`Option`) and strict (`Result`) shapes.
#[derive(Clone)]
pub struct BalanceReader {
    chain: Arc<dyn ChainClient>,
}

impl BalanceReader {
    pub fn new(chain: Arc<dyn ChainClient>) -> Self {
        Self { chain }
    }

    pub async fn try_get_balance(
        &self,
        owner: SuiAddress,
        coin_type: &str,
    ) -> Result<u128, MmError> {
        self.chain.get_balance(owner, coin_type).await
    }

    /// `None` when the balance cannot be read; the failure is logged.
    pub async fn get_balance(&self, owner: SuiAddress, coin_type: &str) -> Option<u128> {
        match self.try_get_balance(owner, coin_type).await {
            Ok(balance) => Some(balance),
            Err(err) => {
                log::error!(
                    "get_balance failed, owner {:?}, coin_type {:?}: {}",
                    owner,
                    coin_type,
                    err
                );
                None
            }
        }
    }
}

/// Refuse when the balance is unknown or below `amount`.
pub fn ensure_sufficient(balance: Option<u128>, amount: u64) -> Result<u128, MmError> {
    match balance {
        Some(balance) if balance >= amount as u128 => Ok(balance),
        Some(balance) => Err(MmError::insufficient(amount, balance)),
        None => Err(MmError::insufficient(amount, "unknown")),
    }
}

/// Merge `coins` into the first one inside `ctx`. Nothing is submitted.
/// Returns the merged coin argument and its total balance.
pub fn coalesce_coins(
    ctx: &mut TxCtx,
    coins: &[CoinObject],
    required: u64,
) -> Result<(Argument, u64), MmError> {
    let Some((first, rest)) = coins.split_first() else {
        return Err(MmError::insufficient(required, 0));
    };
    let total: u128 = coins.iter().map(|coin| coin.balance as u128).sum();
    if total < required as u128 {
        return Err(MmError::insufficient(required, total));
    }

    let target = ctx.obj_arg(ObjectArg::ImmOrOwnedObject(first.object_ref))?;
    let sources = rest
        .iter()
        .map(|coin| ctx.obj_arg(ObjectArg::ImmOrOwnedObject(coin.object_ref)))
        .collect::<Result<Vec<_>, _>>()?;
    ctx.merge_coins(target, sources);

    Ok((target, u64::try_from(total).unwrap_or(u64::MAX)))
}

/// Fetch then coalesce the coins of `owner`.
pub async fn fetch_and_coalesce(
    chain: &dyn ChainClient,
    ctx: &mut TxCtx,
    owner: SuiAddress,
    coin_type: &str,
    required: u64,
) -> Result<(Argument, u64), MmError> {
    let coins = chain.get_coins(owner, coin_type).await?;
    log::debug!(
        "coalescing {} coins of {:?} owned by {:?}",
        coins.len(),
        coin_type,
        owner
    );
    coalesce_coins(ctx, &coins, required)
}

/// SUI coins of `owner` for gas payment, largest first. Gas smashing merges
/// them into the first one at execution.
pub async fn gas_payment(
    chain: &dyn ChainClient,
    owner: SuiAddress,
    exclude: &[ObjectID],
) -> Result<(Vec<ObjectRef>, u128), MmError> {
    let mut coins = chain.get_coins(owner, SUI_COIN_TYPE).await?;
    coins.retain(|coin| !exclude.contains(&coin.object_id()));
    coins.sort_by(|a, b| b.balance.cmp(&a.balance));
    coins.truncate(MAX_GAS_OBJECTS);
    if coins.is_empty() {
        return Err(MmError::InsufficientFunds(format!(
            "no gas coin owned by {}",
            owner
        )));
    }
    let total = coins.iter().map(|coin| coin.balance as u128).sum();
    Ok((coins.iter().map(|coin| coin.object_ref).collect(), total))
}
