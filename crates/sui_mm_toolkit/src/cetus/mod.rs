mod config;
mod pool;
mod pool_creator;
mod swap;

pub use config::*;
pub use pool::*;
pub use pool_creator::*;
pub use swap::*;

use std::sync::Arc;

use sui_mm_utils::{
    constants::SUI_COIN_TYPE,
    utils::{is_same_coin_type, normalize_coin_type},
};
use sui_sdk::types::{
    base_types::{ObjectID, SuiAddress},
    parse_sui_type_tag,
    transaction::{Argument, ObjectArg, TransactionData},
    TypeTag, SUI_CLOCK_OBJECT_ID, SUI_CLOCK_OBJECT_SHARED_VERSION,
};
use tokio::sync::OnceCell;

use crate::{
    chain::{ChainClient, ObjectInfo},
    coin::{fetch_and_coalesce, gas_payment},
    errors::MmError,
    tx::{build_tx_data, nested, TxCtx},
};

/// Largest page the full node serves.
const EVENTS_PAGE_SIZE: usize = 50;

pub fn parse_type_tag(coin_type: &str) -> Result<TypeTag, MmError> {
    parse_sui_type_tag(coin_type)
        .map_err(|err| MmError::InvalidInput(format!("coin type {:?}: {}", coin_type, err)))
}

fn clock_arg() -> ObjectArg {
    ObjectArg::SharedObject {
        id: SUI_CLOCK_OBJECT_ID,
        initial_shared_version: SUI_CLOCK_OBJECT_SHARED_VERSION,
        mutable: false,
    }
}

/// Cetus CLMM adapter: pool reads, quotes and transaction payloads.
pub struct CetusClmm {
    chain: Arc<dyn ChainClient>,
    pub config: CetusConfig,
    global_config: OnceCell<ObjectInfo>,
    pools_registry: OnceCell<ObjectInfo>,
}

impl CetusClmm {
    pub fn new(chain: Arc<dyn ChainClient>, config: CetusConfig) -> Self {
        Self {
            chain,
            config,
            global_config: OnceCell::new(),
            pools_registry: OnceCell::new(),
        }
    }

    async fn global_config_arg(&self) -> Result<ObjectArg, MmError> {
        let object = self
            .global_config
            .get_or_try_init(|| self.chain.get_object(self.config.global_config_id))
            .await?;
        Ok(object.object_arg(false))
    }

    async fn pools_registry_arg(&self) -> Result<ObjectArg, MmError> {
        let object = self
            .pools_registry
            .get_or_try_init(|| self.chain.get_object(self.config.pools_id))
            .await?;
        Ok(object.object_arg(true))
    }

    pub async fn get_pool(&self, pool_id: ObjectID) -> Result<Pool, MmError> {
        let object = self.chain.get_object(pool_id).await?;
        Pool::from_object(&object)
    }

    /// Most recent pool whose coin A is `coin_type`.
    pub async fn find_pool_by_coin(&self, coin_type: &str) -> Result<Pool, MmError> {
        let coin_type = normalize_coin_type(coin_type);
        let event_type = self.config.create_pool_event_type();
        let mut cursor = None;
        loop {
            let page = self
                .chain
                .query_events(&event_type, cursor, EVENTS_PAGE_SIZE)
                .await?;
            let created = page
                .data
                .iter()
                .filter_map(|event| PoolCreated::from_json(&event.parsed_json))
                .find(|created| created.coin_type_a == coin_type);
            if let Some(created) = created {
                log::info!("found pool {:#?}", created);
                return self.get_pool(created.pool_id).await;
            }
            match page.next_cursor {
                Some(next) if page.has_next_page => cursor = Some(next),
                _ => return Err(MmError::NotFound(format!("pool with coin A {}", coin_type))),
            }
        }
    }

    /// Quote from the on-chain swap simulation.
    pub async fn preswap(
        &self,
        sender: SuiAddress,
        pool: &Pool,
        a2b: bool,
        by_amount_in: bool,
        amount: u64,
    ) -> Result<SwapQuote, MmError> {
        let mut ctx = TxCtx::default();
        let pool_arg = ctx.obj_arg(ObjectArg::SharedObject {
            id: pool.pool_id,
            initial_shared_version: pool.initial_shared_version,
            mutable: false,
        })?;
        let args = vec![
            pool_arg,
            ctx.pure_arg(a2b)?,
            ctx.pure_arg(by_amount_in)?,
            ctx.pure_arg(amount)?,
        ];
        ctx.move_call(
            self.config.integrate_published_at,
            "fetcher_script",
            "calculate_swap_result",
            self.pool_type_args(pool)?,
            args,
        )?;

        let events = self.chain.dev_inspect(sender, ctx.finish()).await?;
        SwapQuote::from_events(&events)
    }

    fn pool_type_args(&self, pool: &Pool) -> Result<Vec<TypeTag>, MmError> {
        Ok(vec![
            parse_type_tag(&pool.coin_type_a)?,
            parse_type_tag(&pool.coin_type_b)?,
        ])
    }

    /// `pool_script_v2::swap_a2b` / `swap_b2a`. The input coin is split from
    /// the gas coin for SUI, from the coalesced token coins otherwise.
    pub async fn build_swap_tx(
        &self,
        sender: SuiAddress,
        pool: &Pool,
        params: &SwapParams,
        amount_limit: u64,
        gas_budget: u64,
    ) -> Result<TransactionData, MmError> {
        let (input_type, output_type) = if params.a2b {
            (&pool.coin_type_a, &pool.coin_type_b)
        } else {
            (&pool.coin_type_b, &pool.coin_type_a)
        };
        let input_amount = if params.by_amount_in {
            params.amount
        } else {
            amount_limit
        };

        let mut ctx = TxCtx::default();
        let input_coin = self
            .split_input_coin(&mut ctx, sender, input_type, input_amount)
            .await?;
        let zero_coin = ctx.zero_coin(parse_type_tag(output_type)?)?;
        let (coin_a, coin_b) = if params.a2b {
            (input_coin, zero_coin)
        } else {
            (zero_coin, input_coin)
        };

        let args = vec![
            ctx.obj_arg(self.global_config_arg().await?)?,
            ctx.obj_arg(ObjectArg::SharedObject {
                id: pool.pool_id,
                initial_shared_version: pool.initial_shared_version,
                mutable: true,
            })?,
            coin_a,
            coin_b,
            ctx.pure_arg(params.by_amount_in)?,
            ctx.pure_arg(params.amount)?,
            ctx.pure_arg(amount_limit)?,
            ctx.pure_arg(params.sqrt_price_limit())?,
            ctx.obj_arg(clock_arg())?,
        ];
        let function = if params.a2b { "swap_a2b" } else { "swap_b2a" };
        ctx.move_call(
            self.config.integrate_published_at,
            "pool_script_v2",
            function,
            self.pool_type_args(pool)?,
            args,
        )?;

        self.finish_tx(ctx, sender, gas_budget).await
    }

    async fn split_input_coin(
        &self,
        ctx: &mut TxCtx,
        sender: SuiAddress,
        coin_type: &str,
        amount: u64,
    ) -> Result<Argument, MmError> {
        let source = if is_same_coin_type(coin_type, SUI_COIN_TYPE) {
            Argument::GasCoin
        } else {
            fetch_and_coalesce(self.chain.as_ref(), ctx, sender, coin_type, amount)
                .await?
                .0
        };
        let mut split = ctx.split_coins(source, &[amount])?;
        split
            .pop()
            .ok_or_else(|| MmError::InvalidInput("empty split".to_string()))
    }

    async fn finish_tx(
        &self,
        ctx: TxCtx,
        sender: SuiAddress,
        gas_budget: u64,
    ) -> Result<TransactionData, MmError> {
        let (gas, _) = gas_payment(self.chain.as_ref(), sender, &[]).await?;
        let gas_price = self.chain.reference_gas_price().await?;
        Ok(build_tx_data(
            sender,
            None,
            gas,
            ctx.finish(),
            gas_budget,
            gas_price,
        ))
    }

    async fn coin_decimals(&self, coin_type: &str) -> Result<(u8, ObjectArg), MmError> {
        let metadata = self
            .chain
            .get_coin_metadata(coin_type)
            .await?
            .ok_or_else(|| MmError::NotFound(format!("coin metadata of {}", coin_type)))?;
        let metadata_id = metadata
            .id
            .ok_or_else(|| MmError::NotFound(format!("coin metadata object of {}", coin_type)))?;
        let object = self.chain.get_object(metadata_id).await?;
        Ok((metadata.decimals, object.object_arg(false)))
    }

    /// `pool_script::create_pool`, an empty pool at `initial_price`.
    pub async fn build_create_pool_tx(
        &self,
        sender: SuiAddress,
        params: &CreatePoolParams,
        gas_budget: u64,
    ) -> Result<TransactionData, MmError> {
        validate_tick_spacing(params.tick_spacing)?;
        let (decimals_a, _) = self.coin_decimals(&params.coin_type_a).await?;
        let (decimals_b, _) = self.coin_decimals(&params.coin_type_b).await?;
        let sqrt_price = price_to_sqrt_price_x64(params.initial_price, decimals_a, decimals_b)?;

        let mut ctx = TxCtx::default();
        let args = vec![
            ctx.obj_arg(self.global_config_arg().await?)?,
            ctx.obj_arg(self.pools_registry_arg().await?)?,
            ctx.pure_arg(params.tick_spacing)?,
            ctx.pure_arg(sqrt_price)?,
            ctx.pure_arg(params.url.clone())?,
            ctx.obj_arg(clock_arg())?,
        ];
        ctx.move_call(
            self.config.integrate_published_at,
            "pool_script",
            "create_pool",
            vec![
                parse_type_tag(&params.coin_type_a)?,
                parse_type_tag(&params.coin_type_b)?,
            ],
            args,
        )?;

        self.finish_tx(ctx, sender, gas_budget).await
    }

    /// `pool_creator::create_pool_v2` with a full-range position. The fixed
    /// side gets exactly `liquidity.amount`; the other side offers its whole
    /// balance (SUI minus the gas budget) and the leftovers come back.
    pub async fn build_create_pool_with_liquidity_tx(
        &self,
        sender: SuiAddress,
        params: &CreatePoolParams,
        liquidity: &InitialLiquidity,
        gas_budget: u64,
    ) -> Result<TransactionData, MmError> {
        let (tick_lower, tick_upper) = full_range_ticks(params.tick_spacing)?;
        let (decimals_a, metadata_a) = self.coin_decimals(&params.coin_type_a).await?;
        let (decimals_b, metadata_b) = self.coin_decimals(&params.coin_type_b).await?;
        let sqrt_price = price_to_sqrt_price_x64(params.initial_price, decimals_a, decimals_b)?;

        let mut ctx = TxCtx::default();
        let coin_a = self
            .liquidity_coin(
                &mut ctx,
                sender,
                &params.coin_type_a,
                liquidity.fix_amount_a.then_some(liquidity.amount),
                gas_budget,
            )
            .await?;
        let coin_b = self
            .liquidity_coin(
                &mut ctx,
                sender,
                &params.coin_type_b,
                (!liquidity.fix_amount_a).then_some(liquidity.amount),
                gas_budget,
            )
            .await?;

        let args = vec![
            ctx.obj_arg(self.global_config_arg().await?)?,
            ctx.obj_arg(self.pools_registry_arg().await?)?,
            ctx.pure_arg(params.tick_spacing)?,
            ctx.pure_arg(sqrt_price)?,
            ctx.pure_arg(params.url.clone())?,
            ctx.pure_arg(tick_as_u32(tick_lower))?,
            ctx.pure_arg(tick_as_u32(tick_upper))?,
            coin_a,
            coin_b,
            ctx.obj_arg(metadata_a)?,
            ctx.obj_arg(metadata_b)?,
            ctx.pure_arg(liquidity.fix_amount_a)?,
            ctx.obj_arg(clock_arg())?,
        ];
        let result = ctx.move_call(
            self.config.integrate_published_at,
            "pool_creator",
            "create_pool_v2",
            vec![
                parse_type_tag(&params.coin_type_a)?,
                parse_type_tag(&params.coin_type_b)?,
            ],
            args,
        )?;
        // (Position, Coin<A>, Coin<B>)
        let outputs = (0..3)
            .map(|i| nested(result, i))
            .collect::<Result<Vec<_>, _>>()?;
        ctx.transfer(sender, outputs)?;

        self.finish_tx(ctx, sender, gas_budget).await
    }

    async fn liquidity_coin(
        &self,
        ctx: &mut TxCtx,
        sender: SuiAddress,
        coin_type: &str,
        fixed_amount: Option<u64>,
        gas_budget: u64,
    ) -> Result<Argument, MmError> {
        if let Some(amount) = fixed_amount {
            return self.split_input_coin(ctx, sender, coin_type, amount).await;
        }
        if is_same_coin_type(coin_type, SUI_COIN_TYPE) {
            let balance = self.chain.get_balance(sender, SUI_COIN_TYPE).await?;
            let available = balance.saturating_sub(gas_budget as u128);
            if available == 0 {
                return Err(MmError::insufficient(gas_budget, balance));
            }
            let amount = u64::try_from(available).unwrap_or(u64::MAX);
            let mut split = ctx.split_coins(Argument::GasCoin, &[amount])?;
            return split
                .pop()
                .ok_or_else(|| MmError::InvalidInput("empty split".to_string()));
        }
        Ok(fetch_and_coalesce(self.chain.as_ref(), ctx, sender, coin_type, 1)
            .await?
            .0)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use sui_sdk::types::{
        base_types::{ObjectDigest, SequenceNumber},
        transaction::{Command, TransactionDataAPI, TransactionKind},
    };

    use super::*;
    use crate::{chain::EventRecord, testing::MockChain};
    use provider_utils::enums::ENetwork;

    const TOKEN: &str = "0xab::token::TOKEN";

    fn shared_object(object_type: &str, fields: serde_json::Value) -> ObjectInfo {
        ObjectInfo {
            object_ref: (
                ObjectID::random(),
                SequenceNumber::from_u64(5),
                ObjectDigest::random(),
            ),
            object_type: Some(object_type.to_string()),
            initial_shared_version: Some(SequenceNumber::from_u64(2)),
            fields,
        }
    }

    fn setup() -> (Arc<MockChain>, CetusClmm, Pool) {
        let chain = Arc::new(MockChain::new());
        let mut config = CetusConfig::for_network(&ENetwork::SuiTestnet).unwrap();
        let global_config = shared_object("0xcafe::config::GlobalConfig", json!({}));
        config.global_config_id = global_config.object_id();
        chain.insert_object(global_config);

        let pool_object = shared_object(
            &format!("0xcafe::pool::Pool<{}, {}>", TOKEN, SUI_COIN_TYPE),
            json!({
                "current_sqrt_price": "18446744073709551616",
                "liquidity": "5000000000",
                "tick_spacing": 200,
                "fee_rate": "10000",
                "is_pause": false,
            }),
        );
        let pool = Pool::from_object(&pool_object).unwrap();
        chain.insert_object(pool_object);

        let clmm = CetusClmm::new(chain.clone(), config);
        (chain, clmm, pool)
    }

    #[tokio::test]
    async fn finds_the_latest_pool_of_a_coin() {
        let (chain, clmm, pool) = setup();
        let event_type = clmm.config.create_pool_event_type();
        chain.push_event(
            &event_type,
            json!({
                "pool_id": pool.pool_id.to_string(),
                "coin_type_a": "00000000000000000000000000000000000000000000000000000000000000ab::token::TOKEN",
                "coin_type_b": "0000000000000000000000000000000000000000000000000000000000000002::sui::SUI",
                "tick_spacing": 200,
            }),
        );
        chain.push_event(
            &event_type,
            json!({
                "pool_id": ObjectID::random().to_string(),
                "coin_type_a": "00000000000000000000000000000000000000000000000000000000000000cd::other::OTHER",
                "coin_type_b": "0000000000000000000000000000000000000000000000000000000000000002::sui::SUI",
                "tick_spacing": 60,
            }),
        );

        assert_eq!(clmm.find_pool_by_coin(TOKEN).await.unwrap(), pool);
        assert!(matches!(
            clmm.find_pool_by_coin("0xef::missing::MISSING").await,
            Err(MmError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn pages_back_to_an_old_pool() {
        let (chain, clmm, pool) = setup();
        let event_type = clmm.config.create_pool_event_type();
        chain.push_event(
            &event_type,
            json!({
                "pool_id": pool.pool_id.to_string(),
                "coin_type_a": "0xab::token::TOKEN",
                "coin_type_b": SUI_COIN_TYPE,
                "tick_spacing": 200,
            }),
        );
        for _ in 0..200 {
            chain.push_event(
                &event_type,
                json!({
                    "pool_id": ObjectID::random().to_string(),
                    "coin_type_a": "0xcd::other::OTHER",
                    "coin_type_b": SUI_COIN_TYPE,
                    "tick_spacing": 60,
                }),
            );
        }

        assert_eq!(clmm.find_pool_by_coin(TOKEN).await.unwrap(), pool);
        assert_eq!(chain.event_queries(), 5);

        assert!(matches!(
            clmm.find_pool_by_coin("0xef::missing::MISSING").await,
            Err(MmError::NotFound(_))
        ));
        assert_eq!(chain.event_queries(), 10);
    }

    #[tokio::test]
    async fn missing_pool_is_not_found() {
        let (_, clmm, _) = setup();
        assert!(matches!(
            clmm.get_pool(ObjectID::random()).await,
            Err(MmError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn preswap_reads_the_simulated_result() {
        let (chain, clmm, pool) = setup();
        chain.set_inspect_events(vec![EventRecord {
            event_type: format!(
                "{}{}",
                clmm.config.integrate_published_at, CALCULATED_SWAP_RESULT_EVENT
            ),
            parsed_json: json!({"data": {
                "amount_in": "100000",
                "amount_out": "99000",
                "fee_amount": "1000",
                "is_exceed": false,
            }}),
        }]);
        let quote = clmm
            .preswap(SuiAddress::random_for_testing_only(), &pool, false, true, 100_000)
            .await
            .unwrap();
        assert_eq!(quote.amount_out, 99_000);
        assert_eq!(quote.fee_amount, 1000);
    }

    #[tokio::test]
    async fn buy_splits_the_input_from_the_gas_coin() {
        let (chain, clmm, pool) = setup();
        let sender = SuiAddress::random_for_testing_only();
        chain.mint(sender, SUI_COIN_TYPE, 2_000_000_000);
        let params = SwapParams {
            pool_id: pool.pool_id,
            a2b: false,
            by_amount_in: true,
            amount: 100_000,
            slippage: rust_decimal::Decimal::from(10),
        };

        let data = clmm
            .build_swap_tx(sender, &pool, &params, 89_100, 50_000_000)
            .await
            .unwrap();
        let TransactionKind::ProgrammableTransaction(pt) = data.kind() else {
            panic!("not programmable");
        };
        assert!(matches!(pt.commands[0], Command::SplitCoins(Argument::GasCoin, _)));
        let Command::MoveCall(call) = &pt.commands[2] else {
            panic!("swap call expected, got {:?}", pt.commands[2]);
        };
        assert_eq!(call.module.as_str(), "pool_script_v2");
        assert_eq!(call.function.as_str(), "swap_b2a");
        assert_eq!(call.package, clmm.config.integrate_published_at);
        assert_eq!(data.gas().len(), 1);
    }

    #[tokio::test]
    async fn sell_without_token_coins_is_insufficient() {
        let (chain, clmm, pool) = setup();
        let sender = SuiAddress::random_for_testing_only();
        chain.mint(sender, SUI_COIN_TYPE, 2_000_000_000);
        let params = SwapParams {
            pool_id: pool.pool_id,
            a2b: true,
            by_amount_in: true,
            amount: 5,
            slippage: rust_decimal::Decimal::from(1),
        };
        assert!(matches!(
            clmm.build_swap_tx(sender, &pool, &params, 1, 50_000_000).await,
            Err(MmError::InsufficientFunds(_))
        ));
    }
}
