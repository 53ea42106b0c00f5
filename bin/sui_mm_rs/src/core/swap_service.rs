use std::sync::Arc;

use rust_decimal::Decimal;
use sui_mm_toolkit::{
    cetus::{amount_limit, CetusClmm, SwapParams},
    chain::{ChainClient, TxOutcome},
    coin::{ensure_sufficient, BalanceReader},
    errors::MmError,
    retry::RetryPolicy,
    wallet::Wallet,
};
use sui_mm_utils::utils::format_units;
use sui_sdk::types::base_types::ObjectID;

use crate::{constants::Env, utils::coin_decimals};

pub struct SwapService {
    env: Env,
    chain: Arc<dyn ChainClient>,
    clmm: Arc<CetusClmm>,
    balances: BalanceReader,
    retry_policy: RetryPolicy,
}

impl SwapService {
    pub fn new(env: Env, chain: Arc<dyn ChainClient>, clmm: Arc<CetusClmm>) -> Self {
        Self {
            env,
            balances: BalanceReader::new(chain.clone()),
            chain,
            clmm,
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// SUI to token, exact `amount` of SUI in (base units).
    pub async fn buy_swap(&self, wallet: &Wallet, amount: u64, slippage: Decimal, pool_id: ObjectID) -> bool {
        let params = SwapParams {
            pool_id,
            a2b: false,
            by_amount_in: true,
            amount,
            slippage,
        };
        self.report("buy", self.try_swap(wallet, &params).await)
    }

    /// Token to SUI. With `by_amount_in`, `amount` is the token input;
    /// otherwise it is the SUI output.
    pub async fn sell_swap(
        &self,
        wallet: &Wallet,
        amount: u64,
        slippage: Decimal,
        pool_id: ObjectID,
        by_amount_in: bool,
    ) -> bool {
        let params = SwapParams {
            pool_id,
            a2b: true,
            by_amount_in,
            amount,
            slippage,
        };
        let result = match self.check_sell_balance(wallet, &params).await {
            Ok(()) => self.try_swap(wallet, &params).await,
            Err(err) => Err(err),
        };
        self.report("sell", result)
    }

    async fn check_sell_balance(&self, wallet: &Wallet, params: &SwapParams) -> Result<(), MmError> {
        if !params.by_amount_in {
            return Ok(());
        }
        let pool = self.clmm.get_pool(params.pool_id).await?;
        let balance = self.balances.get_balance(wallet.address, &pool.coin_type_a).await;
        ensure_sufficient(balance, params.amount)?;
        Ok(())
    }

    fn report(&self, side: &str, result: Result<TxOutcome, MmError>) -> bool {
        match result {
            Ok(outcome) => {
                log::info!(
                    "{} swap success digest {:?} {}",
                    side,
                    outcome.digest,
                    self.env.tx_link(&outcome.digest)
                );
                true
            }
            Err(err) => {
                log::error!("{} swap failed: {}", side, err);
                false
            }
        }
    }

    /// Quote, bound by slippage, then build, sign and submit under the
    /// retry policy. Running out of attempts is `SwapFailed`.
    pub async fn try_swap(&self, wallet: &Wallet, params: &SwapParams) -> Result<TxOutcome, MmError> {
        params.validate()?;
        let pool = self.clmm.get_pool(params.pool_id).await?;
        if pool.is_pause {
            return Err(MmError::InvalidInput(format!("pool {} is paused", pool.pool_id)));
        }
        let decimals_a = coin_decimals(self.chain.as_ref(), &pool.coin_type_a).await;
        let decimals_b = coin_decimals(self.chain.as_ref(), &pool.coin_type_b).await;

        let quote = self
            .clmm
            .preswap(wallet.address, &pool, params.a2b, params.by_amount_in, params.amount)
            .await?;
        if quote.is_exceed {
            return Err(MmError::InvalidInput(format!(
                "amount {} exceeds the liquidity of pool {}",
                params.amount, pool.pool_id
            )));
        }
        let limit = amount_limit(&quote, params.by_amount_in, params.slippage)?;

        let (decimals_in, decimals_out) = if params.a2b {
            (decimals_a, decimals_b)
        } else {
            (decimals_b, decimals_a)
        };
        log::info!(
            "swap quote pool {:?} a2b {:?} by_amount_in {:?}: amount_in {}, amount_out {}, fee {}, limit {} ({}% slippage)",
            pool.pool_id,
            params.a2b,
            params.by_amount_in,
            format_units(quote.amount_in as u128, decimals_in),
            format_units(quote.amount_out as u128, decimals_out),
            quote.fee_amount,
            limit,
            params.slippage
        );

        let clmm = self.clmm.as_ref();
        let chain = self.chain.as_ref();
        let pool = &pool;
        let gas_budget = self.env.gas_budget;
        self.retry_policy
            .run("swap", |attempt| async move {
                log::info!("swap attempt {:?} from {:?}", attempt, wallet.address);
                let data = clmm
                    .build_swap_tx(wallet.address, pool, params, limit, gas_budget)
                    .await?;
                let signature = wallet.sign(&data);
                chain.execute(data, vec![signature]).await
            })
            .await
            .map_err(|failure| {
                if failure.exhausted {
                    MmError::SwapFailed {
                        attempts: failure.attempts,
                        last_error: failure.last_error.to_string(),
                    }
                } else {
                    failure.last_error
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use sui_mm_toolkit::{
        cetus::{CetusConfig, CALCULATED_SWAP_RESULT_EVENT},
        chain::{EventRecord, ObjectInfo},
        testing::MockChain,
    };
    use sui_mm_utils::constants::SUI_COIN_TYPE;
    use sui_sdk::types::base_types::{ObjectDigest, SequenceNumber};
    use tokio::time::Instant;

    use super::*;

    const TOKEN: &str = "0xab::token::TOKEN";

    struct Fixture {
        chain: Arc<MockChain>,
        service: SwapService,
        pool_id: ObjectID,
        wallet: Wallet,
    }

    fn shared_object(object_type: String, fields: serde_json::Value) -> ObjectInfo {
        ObjectInfo {
            object_ref: (
                ObjectID::random(),
                SequenceNumber::from_u64(3),
                ObjectDigest::random(),
            ),
            object_type: Some(object_type),
            initial_shared_version: Some(SequenceNumber::from_u64(1)),
            fields,
        }
    }

    fn fixture(amount_out: u64, is_exceed: bool) -> Fixture {
        let chain = Arc::new(MockChain::new());
        let mut config =
            CetusConfig::for_network(&provider_utils::enums::ENetwork::SuiTestnet).unwrap();
        let global_config = shared_object("0xcafe::config::GlobalConfig".to_string(), json!({}));
        config.global_config_id = global_config.object_id();
        chain.insert_object(global_config);

        let pool = shared_object(
            format!("0xcafe::pool::Pool<{}, {}>", TOKEN, SUI_COIN_TYPE),
            json!({
                "current_sqrt_price": "18446744073709551616",
                "liquidity": "1000000000000",
                "tick_spacing": 200,
                "fee_rate": "2500",
                "is_pause": false,
            }),
        );
        let pool_id = pool.object_id();
        chain.insert_object(pool);
        chain.set_metadata(TOKEN, 6);
        chain.set_inspect_events(vec![EventRecord {
            event_type: format!("0xd55d{}", CALCULATED_SWAP_RESULT_EVENT),
            parsed_json: json!({"data": {
                "amount_in": "100000",
                "amount_out": amount_out.to_string(),
                "fee_amount": "250",
                "is_exceed": is_exceed,
            }}),
        }]);

        let wallet = Wallet::from_secret(&"42".repeat(32)).unwrap();
        chain.mint(wallet.address, SUI_COIN_TYPE, 1_000_000_000);

        let env = Env {
            gas_budget: 10_000_000,
            ..Default::default()
        };
        let clmm = Arc::new(CetusClmm::new(chain.clone(), config));
        let service = SwapService::new(env, chain.clone(), clmm);
        Fixture {
            chain,
            service,
            pool_id,
            wallet,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn buy_succeeds_on_the_first_attempt() {
        let f = fixture(5_000, false);
        assert!(
            f.service
                .buy_swap(&f.wallet, 100_000, Decimal::from(10), f.pool_id)
                .await
        );
        assert_eq!(f.chain.execute_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn buy_gives_up_after_three_transient_failures() {
        let f = fixture(5_000, false);
        for _ in 0..3 {
            f.chain.fail_next(MmError::Unavailable("connection reset".to_string()));
        }

        let started = Instant::now();
        let ok = f
            .service
            .buy_swap(&f.wallet, 100_000, Decimal::from(10), f.pool_id)
            .await;

        assert!(!ok);
        assert_eq!(f.chain.execute_calls(), 3);
        assert_eq!(started.elapsed(), Duration::from_millis(4000));
        assert_eq!(f.chain.balance(f.wallet.address, SUI_COIN_TYPE), 1_000_000_000);
    }

    #[tokio::test(start_paused = true)]
    async fn swap_recovers_after_two_failures() {
        let f = fixture(5_000, false);
        f.chain.fail_next(MmError::Unavailable("timeout".to_string()));
        f.chain.fail_next(MmError::Unavailable("timeout".to_string()));

        let params = SwapParams {
            pool_id: f.pool_id,
            a2b: false,
            by_amount_in: true,
            amount: 100_000,
            slippage: Decimal::from(5),
        };
        let outcome = f.service.try_swap(&f.wallet, &params).await.unwrap();
        assert_eq!(outcome.digest, "mock-digest-1");
        assert_eq!(f.chain.execute_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_are_swap_failed() {
        let f = fixture(5_000, false);
        for _ in 0..3 {
            f.chain.fail_next(MmError::Unavailable("503".to_string()));
        }
        let params = SwapParams {
            pool_id: f.pool_id,
            a2b: false,
            by_amount_in: true,
            amount: 100_000,
            slippage: Decimal::from(5),
        };
        assert_eq!(
            f.service.try_swap(&f.wallet, &params).await,
            Err(MmError::SwapFailed {
                attempts: 3,
                last_error: "chain unavailable: 503".to_string()
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn execution_failure_is_not_retried() {
        let f = fixture(5_000, false);
        f.chain.fail_next(MmError::ExecutionFailed {
            digest: "abc".to_string(),
            error: "MoveAbort".to_string(),
        });
        let ok = f
            .service
            .buy_swap(&f.wallet, 100_000, Decimal::from(10), f.pool_id)
            .await;
        assert!(!ok);
        assert_eq!(f.chain.execute_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn sell_refuses_without_a_token_balance() {
        let f = fixture(5_000, false);
        assert!(
            !f.service
                .sell_swap(&f.wallet, 10, Decimal::from(10), f.pool_id, true)
                .await
        );

        f.chain.set_unavailable(f.wallet.address);
        assert!(
            !f.service
                .sell_swap(&f.wallet, 10, Decimal::from(10), f.pool_id, true)
                .await
        );
        assert_eq!(f.chain.execute_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn sell_with_enough_tokens_goes_through() {
        let f = fixture(5_000, false);
        f.chain.mint(f.wallet.address, TOKEN, 40);
        f.chain.mint(f.wallet.address, TOKEN, 60);
        assert!(
            f.service
                .sell_swap(&f.wallet, 100, Decimal::from(10), f.pool_id, true)
                .await
        );
        assert_eq!(f.chain.execute_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rejects_bad_slippage_and_exceeding_quotes() {
        let f = fixture(5_000, false);
        let mut params = SwapParams {
            pool_id: f.pool_id,
            a2b: false,
            by_amount_in: true,
            amount: 100_000,
            slippage: Decimal::from(100),
        };
        assert!(matches!(
            f.service.try_swap(&f.wallet, &params).await,
            Err(MmError::InvalidInput(_))
        ));

        let f = fixture(5_000, true);
        params.pool_id = f.pool_id;
        params.slippage = Decimal::from(1);
        assert!(matches!(
            f.service.try_swap(&f.wallet, &params).await,
            Err(MmError::InvalidInput(_))
        ));
        assert_eq!(f.chain.execute_calls(), 0);
    }
}
