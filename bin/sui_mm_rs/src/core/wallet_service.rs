use std::sync::Arc;

use sui_mm_toolkit::{
    chain::{ChainClient, TxOutcome},
    coin::{fetch_and_coalesce, gas_payment, BalanceReader},
    errors::MmError,
    tx::{build_tx_data, TxCtx},
    wallet::Wallet,
};
use sui_mm_utils::{
    constants::{DISPERSE_SETTLE_DELAY, REFUND_DELAY, SUI_COIN_TYPE, SUI_DECIMALS},
    utils::{format_bmk, format_units, is_same_coin_type},
};
use sui_sdk::types::{base_types::SuiAddress, transaction::Argument};

use crate::{
    constants::Env,
    types::{RefundReport, TransferPlan, WalletReport},
};

#[derive(Clone)]
pub struct WalletService {
    env: Env,
    chain: Arc<dyn ChainClient>,
    balances: BalanceReader,
}

impl WalletService {
    pub fn new(env: Env, chain: Arc<dyn ChainClient>) -> Self {
        Self {
            env,
            balances: BalanceReader::new(chain.clone()),
            chain,
        }
    }

    /// Split the funding SUI into every amount of `plan` and send each to
    /// its recipient, in one transaction. Waits for the settle delay after.
    pub async fn disperse_sui(&self, funding: &Wallet, plan: &TransferPlan) -> Result<TxOutcome, MmError> {
        self.disperse(funding, SUI_COIN_TYPE, plan).await
    }

    /// Same as `disperse_sui` for any coin type; the token coins are merged first.
    pub async fn disperse_tokens(
        &self,
        funding: &Wallet,
        coin_type: &str,
        plan: &TransferPlan,
    ) -> Result<TxOutcome, MmError> {
        self.disperse(funding, coin_type, plan).await
    }

    async fn disperse(&self, funding: &Wallet, coin_type: &str, plan: &TransferPlan) -> Result<TxOutcome, MmError> {
        if plan.is_empty() {
            return Err(MmError::InvalidInput("empty disperse plan".to_string()));
        }
        log::info!(
            "disperse {:?} from {:?} to {} wallets, total {:?}",
            coin_type,
            funding.address,
            plan.len(),
            plan.total()
        );

        let outcome = self.send_split(funding, coin_type, plan).await?;
        log::info!(
            "disperse success digest {:?} {}",
            outcome.digest,
            self.env.tx_link(&outcome.digest)
        );
        tokio::time::sleep(DISPERSE_SETTLE_DELAY).await;
        Ok(outcome)
    }

    /// Send exactly `amount` SUI to `to`.
    pub async fn transfer_sui(&self, from: &Wallet, to: SuiAddress, amount: u64) -> Result<TxOutcome, MmError> {
        self.transfer_token(from, SUI_COIN_TYPE, to, amount).await
    }

    /// Send exactly `amount` of `coin_type` to `to`.
    pub async fn transfer_token(
        &self,
        from: &Wallet,
        coin_type: &str,
        to: SuiAddress,
        amount: u64,
    ) -> Result<TxOutcome, MmError> {
        let plan = TransferPlan::new(vec![(to, amount)]);
        let outcome = self.send_split(from, coin_type, &plan).await?;
        log::info!(
            "transfer {} of {:?} from {:?} to {:?}, digest {:?}",
            amount,
            coin_type,
            from.address,
            to,
            outcome.digest
        );
        Ok(outcome)
    }

    async fn send_split(&self, funding: &Wallet, coin_type: &str, plan: &TransferPlan) -> Result<TxOutcome, MmError> {
        let is_sui = is_same_coin_type(coin_type, SUI_COIN_TYPE);
        let required = plan.total() + if is_sui { self.env.gas_budget as u128 } else { 0 };
        let balance = self.balances.try_get_balance(funding.address, coin_type).await?;
        if balance < required {
            return Err(MmError::insufficient(required, balance));
        }

        let mut ctx = TxCtx::default();
        let source = if is_sui {
            Argument::GasCoin
        } else {
            let total = u64::try_from(plan.total())
                .map_err(|_| MmError::InvalidInput("plan total overflows u64".to_string()))?;
            fetch_and_coalesce(self.chain.as_ref(), &mut ctx, funding.address, coin_type, total)
                .await?
                .0
        };
        let outputs = ctx.split_coins(source, &plan.amounts())?;
        for (output, (recipient, _)) in outputs.into_iter().zip(plan.transfers.iter()) {
            ctx.transfer(*recipient, vec![output])?;
        }

        let (gas, _) = gas_payment(self.chain.as_ref(), funding.address, &[]).await?;
        let gas_price = self.chain.reference_gas_price().await?;
        let data = build_tx_data(
            funding.address,
            None,
            gas,
            ctx.finish(),
            self.env.gas_budget,
            gas_price,
        );
        let signature = funding.sign(&data);
        self.chain.execute(data, vec![signature]).await
    }

    /// Send every SUI of each wallet back to `collector`, gas paid by `funding`.
    pub async fn refund_sui(&self, funding: &Wallet, collector: SuiAddress, wallets: &[Wallet]) -> RefundReport {
        self.refund_tokens(funding, collector, SUI_COIN_TYPE, wallets).await
    }

    /// One sponsored transaction per wallet, sequentially. A failing wallet
    /// is recorded and the run goes on.
    pub async fn refund_tokens(
        &self,
        funding: &Wallet,
        collector: SuiAddress,
        coin_type: &str,
        wallets: &[Wallet],
    ) -> RefundReport {
        let mut report = RefundReport::default();
        for (index, wallet) in wallets.iter().enumerate() {
            if wallet.address == funding.address {
                log::info!("wallet index {:?} is the funding wallet, skip", index);
                report.skipped.push(wallet.address);
                continue;
            }
            let balance = match self.balances.try_get_balance(wallet.address, coin_type).await {
                Ok(balance) => balance,
                Err(err) => {
                    log::info!(
                        "wallet index {:?} address {:?} balance unreadable, skip: {}",
                        index,
                        wallet.address,
                        err
                    );
                    report.skipped.push(wallet.address);
                    continue;
                }
            };
            if balance == 0 {
                log::info!(
                    "wallet index {:?} address {:?} has zero balance, skip",
                    index,
                    wallet.address
                );
                report.skipped.push(wallet.address);
                continue;
            }

            match self.refund_one(funding, collector, coin_type, wallet).await {
                Ok(outcome) => {
                    log::info!(
                        "refund wallet index {:?} address {:?} amount {:?} digest {:?}",
                        index,
                        wallet.address,
                        balance,
                        outcome.digest
                    );
                    report.refunded.push(wallet.address);
                }
                Err(err) => {
                    log::error!(
                        "refund wallet index {:?} address {:?} failed: {}",
                        index,
                        wallet.address,
                        err
                    );
                    report.failed.push(wallet.address);
                }
            }
            tokio::time::sleep(REFUND_DELAY).await;
        }

        log::info!(
            "REFUND REPORT: refunded {:?}, skipped {:?}, failed {:?}",
            report.refunded.len(),
            report.skipped.len(),
            report.failed.len()
        );
        report
    }

    async fn refund_one(
        &self,
        funding: &Wallet,
        collector: SuiAddress,
        coin_type: &str,
        wallet: &Wallet,
    ) -> Result<TxOutcome, MmError> {
        let mut ctx = TxCtx::default();
        let (merged, _) =
            fetch_and_coalesce(self.chain.as_ref(), &mut ctx, wallet.address, coin_type, 1).await?;
        ctx.transfer(collector, vec![merged])?;

        let (gas, _) = gas_payment(self.chain.as_ref(), funding.address, &[]).await?;
        let gas_price = self.chain.reference_gas_price().await?;
        let data = build_tx_data(
            wallet.address,
            Some(funding.address),
            gas,
            ctx.finish(),
            self.env.gas_budget,
            gas_price,
        );
        let signatures = vec![wallet.sign(&data), funding.sign(&data)];
        self.chain.execute(data, signatures).await
    }

    /// Log SUI (and token) balance of every wallet, then the totals.
    pub async fn check_wallets(&self, wallets: &[Wallet], token: Option<(&str, u8)>) -> Vec<WalletReport> {
        let mut reports = Vec::with_capacity(wallets.len());
        let (mut total_sui, mut total_token) = (0u128, 0u128);
        for (index, wallet) in wallets.iter().enumerate() {
            let sui_balance = self.balances.get_balance(wallet.address, SUI_COIN_TYPE).await;
            let token_balance = match token {
                Some((coin_type, _)) => self.balances.get_balance(wallet.address, coin_type).await,
                None => None,
            };
            total_sui += sui_balance.unwrap_or_default();
            total_token += token_balance.unwrap_or_default();

            log::info!(
                "wallet_index {:?}, address {:?}, sui_balance {:?}, token_balance {:?}",
                index,
                wallet.address,
                sui_balance.map(|balance| format_units(balance, SUI_DECIMALS)),
                token_balance
                    .zip(token)
                    .map(|(balance, (_, decimals))| format_bmk(&format_units(balance, decimals), 3)),
            );
            reports.push(WalletReport {
                index,
                address: wallet.address,
                sui_balance,
                token_balance,
            });
        }

        log::info!(
            "TOTAL REPORT: total_sui_balance {:?}, total_token_balance {:?}",
            format_units(total_sui, SUI_DECIMALS),
            token.map(|(_, decimals)| format_bmk(&format_units(total_token, decimals), 3)),
        );
        reports
    }
}
