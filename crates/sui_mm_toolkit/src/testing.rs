//! In-memory ledger behind `ChainClient`.
//!
//! Transactions are interpreted command by command on a scratch copy of the
//! ledger: `SplitCoins`, `MergeCoins` and `TransferObjects` move balances,
//! Move calls and publishes only yield opaque results. A failing transaction
//! leaves the ledger untouched. Gas coins are smashed into the first one and
//! charged a flat `MOCK_GAS_FEE`.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::Mutex,
};

use async_trait::async_trait;
use serde_json::Value;
use sui_mm_utils::{constants::SUI_COIN_TYPE, utils::is_same_coin_type, utils::normalize_coin_type};
use sui_sdk::types::{
    base_types::{ObjectDigest, ObjectID, SequenceNumber, SuiAddress},
    crypto::Signature,
    digests::TransactionDigest,
    event::EventID,
    transaction::{
        Argument, CallArg, Command, ObjectArg, ProgrammableTransaction, TransactionData,
        TransactionDataAPI, TransactionKind,
    },
};

use crate::{
    chain::{
        ChainClient, CoinMetadataInfo, CoinObject, CreatedObject, EventPage, EventRecord,
        ObjectInfo, TxOutcome,
    },
    errors::MmError,
};

pub const MOCK_GAS_FEE: u64 = 1_000_000;
pub const MOCK_GAS_PRICE: u64 = 1_000;

#[derive(Debug, Clone)]
struct OwnedCoin {
    owner: SuiAddress,
    coin: CoinObject,
}

#[derive(Default)]
struct Ledger {
    coins: Vec<OwnedCoin>,
    metadata: HashMap<String, CoinMetadataInfo>,
    objects: HashMap<ObjectID, ObjectInfo>,
    events: HashMap<String, Vec<EventRecord>>,
    inspect_events: Vec<EventRecord>,
    fail_plan: VecDeque<MmError>,
    unavailable: HashSet<SuiAddress>,
    created_on_next: Vec<CreatedObject>,
    published_on_next: Option<ObjectID>,
    executed: Vec<TransactionData>,
    execute_calls: usize,
    event_queries: usize,
}

#[derive(Default)]
pub struct MockChain {
    ledger: Mutex<Ledger>,
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Coin(ObjectID),
    Opaque,
}

fn new_coin_ref() -> (ObjectID, SequenceNumber, ObjectDigest) {
    (
        ObjectID::random(),
        SequenceNumber::from_u64(1),
        ObjectDigest::random(),
    )
}

fn lock_poisoned() -> MmError {
    MmError::Unavailable("mock ledger lock poisoned".to_string())
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_ledger<R>(&self, f: impl FnOnce(&mut Ledger) -> R) -> R {
        let mut ledger = self
            .ledger
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut ledger)
    }

    /// New coin object of `amount` owned by `owner`.
    pub fn mint(&self, owner: SuiAddress, coin_type: &str, amount: u64) -> ObjectID {
        let object_ref = new_coin_ref();
        self.with_ledger(|ledger| {
            ledger.coins.push(OwnedCoin {
                owner,
                coin: CoinObject {
                    object_ref,
                    coin_type: normalize_coin_type(coin_type),
                    balance: amount,
                },
            })
        });
        object_ref.0
    }

    pub fn balance(&self, owner: SuiAddress, coin_type: &str) -> u128 {
        self.with_ledger(|ledger| {
            ledger
                .coins
                .iter()
                .filter(|c| c.owner == owner && is_same_coin_type(&c.coin.coin_type, coin_type))
                .map(|c| c.coin.balance as u128)
                .sum()
        })
    }

    pub fn coin_count(&self, owner: SuiAddress, coin_type: &str) -> usize {
        self.with_ledger(|ledger| {
            ledger
                .coins
                .iter()
                .filter(|c| c.owner == owner && is_same_coin_type(&c.coin.coin_type, coin_type))
                .count()
        })
    }

    /// The next `execute` returns `err` without touching the ledger.
    pub fn fail_next(&self, err: MmError) {
        self.with_ledger(|ledger| ledger.fail_plan.push_back(err));
    }

    /// Balance and coin reads of `owner` fail as `Unavailable`.
    pub fn set_unavailable(&self, owner: SuiAddress) {
        self.with_ledger(|ledger| {
            ledger.unavailable.insert(owner);
        });
    }

    pub fn insert_object(&self, object: ObjectInfo) {
        self.with_ledger(|ledger| {
            ledger.objects.insert(object.object_id(), object);
        });
    }

    /// Metadata of `coin_type`, stored as an immutable object.
    pub fn set_metadata(&self, coin_type: &str, decimals: u8) -> ObjectID {
        let object_ref = new_coin_ref();
        let symbol = sui_mm_utils::utils::coin_symbol(coin_type).to_string();
        self.insert_object(ObjectInfo {
            object_ref,
            object_type: Some(format!("0x2::coin::CoinMetadata<{}>", coin_type)),
            initial_shared_version: None,
            fields: Value::Null,
        });
        self.with_ledger(|ledger| {
            ledger.metadata.insert(
                normalize_coin_type(coin_type),
                CoinMetadataInfo {
                    id: Some(object_ref.0),
                    decimals,
                    name: symbol.clone(),
                    symbol,
                },
            )
        });
        object_ref.0
    }

    /// Events come back most recent first, so push oldest first.
    pub fn push_event(&self, event_type: &str, parsed_json: Value) {
        self.with_ledger(|ledger| {
            ledger
                .events
                .entry(event_type.to_string())
                .or_default()
                .insert(
                    0,
                    EventRecord {
                        event_type: event_type.to_string(),
                        parsed_json,
                    },
                )
        });
    }

    pub fn set_inspect_events(&self, events: Vec<EventRecord>) {
        self.with_ledger(|ledger| ledger.inspect_events = events);
    }

    /// Reported as created by the next successful `execute`.
    pub fn push_created(&self, object: CreatedObject) {
        self.with_ledger(|ledger| ledger.created_on_next.push(object));
    }

    /// Reported as the published package of the next successful `execute`.
    pub fn push_published(&self, package_id: ObjectID) {
        self.with_ledger(|ledger| ledger.published_on_next = Some(package_id));
    }

    pub fn executed(&self) -> Vec<TransactionData> {
        self.with_ledger(|ledger| ledger.executed.clone())
    }

    /// Pages served by `query_events`.
    pub fn event_queries(&self) -> usize {
        self.with_ledger(|ledger| ledger.event_queries)
    }

    /// Every `execute` call, failed ones included.
    pub fn execute_calls(&self) -> usize {
        self.with_ledger(|ledger| ledger.execute_calls)
    }
}

fn owned_coins<'a>(
    ledger: &'a Ledger,
    owner: SuiAddress,
    coin_type: &'a str,
) -> Result<impl Iterator<Item = &'a OwnedCoin> + 'a, MmError> {
    if ledger.unavailable.contains(&owner) {
        return Err(MmError::Unavailable(format!("node cannot serve {}", owner)));
    }
    Ok(ledger
        .coins
        .iter()
        .filter(move |c| c.owner == owner && is_same_coin_type(&c.coin.coin_type, coin_type)))
}

struct Execution<'a> {
    coins: Vec<OwnedCoin>,
    sender: SuiAddress,
    pt: &'a ProgrammableTransaction,
    gas_coin: ObjectID,
    gas_reserved: u64,
    results: Vec<Vec<Slot>>,
}

impl<'a> Execution<'a> {
    fn coin_mut(&mut self, id: ObjectID) -> Result<&mut OwnedCoin, MmError> {
        self.coins
            .iter_mut()
            .find(|c| c.coin.object_id() == id)
            .ok_or_else(|| MmError::NotFound(format!("coin {}", id)))
    }

    fn pure<T: serde::de::DeserializeOwned>(&self, arg: &Argument) -> Result<T, MmError> {
        let Argument::Input(i) = arg else {
            return Err(MmError::InvalidInput(format!("{:?} is not a pure input", arg)));
        };
        match self.pt.inputs.get(*i as usize) {
            Some(CallArg::Pure(bytes)) => bcs::from_bytes(bytes)
                .map_err(|err| MmError::InvalidInput(format!("pure input {}: {}", i, err))),
            other => Err(MmError::InvalidInput(format!("input {} is {:?}", i, other))),
        }
    }

    fn resolve(&self, arg: &Argument) -> Result<Slot, MmError> {
        match arg {
            Argument::GasCoin => Ok(Slot::Coin(self.gas_coin)),
            Argument::Input(i) => match self.pt.inputs.get(*i as usize) {
                Some(CallArg::Object(ObjectArg::ImmOrOwnedObject(object_ref))) => {
                    match self.coins.iter().find(|c| c.coin.object_id() == object_ref.0) {
                        Some(coin) if coin.owner != self.sender => Err(MmError::InvalidInput(
                            format!("coin {} not owned by {}", object_ref.0, self.sender),
                        )),
                        Some(_) => Ok(Slot::Coin(object_ref.0)),
                        None => Ok(Slot::Opaque),
                    }
                }
                _ => Ok(Slot::Opaque),
            },
            Argument::Result(i) => self
                .results
                .get(*i as usize)
                .and_then(|slots| slots.first().copied())
                .ok_or_else(|| MmError::InvalidInput(format!("no result {}", i))),
            Argument::NestedResult(i, j) => self
                .results
                .get(*i as usize)
                .and_then(|slots| slots.get(*j as usize).copied())
                .ok_or_else(|| MmError::InvalidInput(format!("no result {}.{}", i, j))),
        }
    }

    fn resolve_coin(&self, arg: &Argument) -> Result<ObjectID, MmError> {
        match self.resolve(arg)? {
            Slot::Coin(id) => Ok(id),
            Slot::Opaque => Err(MmError::InvalidInput(format!("{:?} is not a known coin", arg))),
        }
    }

    fn run(&mut self, command: &Command) -> Result<Vec<Slot>, MmError> {
        match command {
            Command::SplitCoins(source, amounts) => {
                let source_id = self.resolve_coin(source)?;
                let amounts = amounts
                    .iter()
                    .map(|amount| self.pure::<u64>(amount))
                    .collect::<Result<Vec<_>, _>>()?;
                let total: u128 = amounts.iter().map(|a| *a as u128).sum();
                let reserved = if source_id == self.gas_coin {
                    self.gas_reserved
                } else {
                    0
                };
                let sender = self.sender;
                let source = self.coin_mut(source_id)?;
                let available = source.coin.balance.saturating_sub(reserved);
                if total > available as u128 {
                    return Err(MmError::InsufficientFunds(format!(
                        "InsufficientCoinBalance: split {} from {}",
                        total, available
                    )));
                }
                source.coin.balance -= total as u64;
                let coin_type = source.coin.coin_type.clone();

                let mut slots = Vec::with_capacity(amounts.len());
                for amount in amounts {
                    let object_ref = new_coin_ref();
                    self.coins.push(OwnedCoin {
                        owner: sender,
                        coin: CoinObject {
                            object_ref,
                            coin_type: coin_type.clone(),
                            balance: amount,
                        },
                    });
                    slots.push(Slot::Coin(object_ref.0));
                }
                Ok(slots)
            }
            Command::MergeCoins(target, sources) => {
                let target_id = self.resolve_coin(target)?;
                let mut merged = 0u64;
                for source in sources {
                    let source_id = self.resolve_coin(source)?;
                    let position = self
                        .coins
                        .iter()
                        .position(|c| c.coin.object_id() == source_id)
                        .ok_or_else(|| MmError::NotFound(format!("coin {}", source_id)))?;
                    merged += self.coins.remove(position).coin.balance;
                }
                self.coin_mut(target_id)?.coin.balance += merged;
                Ok(vec![])
            }
            Command::TransferObjects(objects, recipient) => {
                let recipient: SuiAddress = self.pure(recipient)?;
                for object in objects {
                    if let Slot::Coin(id) = self.resolve(object)? {
                        if id == self.gas_coin {
                            return Err(MmError::InvalidInput("gas coin transfer".to_string()));
                        }
                        self.coin_mut(id)?.owner = recipient;
                    }
                }
                Ok(vec![])
            }
            _ => Ok(vec![Slot::Opaque; 3]),
        }
    }
}

fn execute_on(ledger: &mut Ledger, data: &TransactionData, signatures: usize) -> Result<TxOutcome, MmError> {
    let sender = data.sender();
    let gas_owner = data.gas_owner();
    let signers = if sender == gas_owner { 1 } else { 2 };
    if signatures != signers {
        return Err(MmError::InvalidInput(format!(
            "expected {} signatures, got {}",
            signers, signatures
        )));
    }
    let TransactionKind::ProgrammableTransaction(pt) = data.kind() else {
        return Err(MmError::InvalidInput("not a programmable transaction".to_string()));
    };

    let mut coins = ledger.coins.clone();
    let gas_budget = data.gas_budget();
    let gas_ids: Vec<ObjectID> = data.gas().iter().map(|object_ref| object_ref.0).collect();
    let Some(gas_coin) = gas_ids.first().copied() else {
        return Err(MmError::InsufficientFunds("Cannot find gas coin".to_string()));
    };
    let mut gas_total = 0u64;
    for id in &gas_ids {
        let coin = coins
            .iter()
            .find(|c| c.coin.object_id() == *id)
            .ok_or_else(|| MmError::NotFound(format!("gas coin {}", id)))?;
        if coin.owner != gas_owner || !is_same_coin_type(&coin.coin.coin_type, SUI_COIN_TYPE) {
            return Err(MmError::InvalidInput(format!("bad gas coin {}", id)));
        }
        gas_total += coin.coin.balance;
    }
    if gas_total < gas_budget {
        return Err(MmError::InsufficientFunds(format!(
            "GasBalanceTooLow: {} < {}",
            gas_total, gas_budget
        )));
    }
    coins.retain(|c| !gas_ids[1..].contains(&c.coin.object_id()));
    if let Some(gas) = coins.iter_mut().find(|c| c.coin.object_id() == gas_coin) {
        gas.coin.balance = gas_total;
    }

    let mut execution = Execution {
        coins,
        sender,
        pt,
        gas_coin,
        gas_reserved: gas_budget,
        results: Vec::with_capacity(pt.commands.len()),
    };
    for command in &pt.commands {
        let slots = execution.run(command)?;
        execution.results.push(slots);
    }
    if let Ok(gas) = execution.coin_mut(gas_coin) {
        gas.coin.balance = gas.coin.balance.saturating_sub(MOCK_GAS_FEE.min(gas_budget));
    }

    ledger.coins = execution.coins;
    ledger.executed.push(data.clone());
    Ok(TxOutcome {
        digest: format!("mock-digest-{}", ledger.executed.len()),
        created: std::mem::take(&mut ledger.created_on_next),
        published_package: ledger.published_on_next.take(),
    })
}

#[async_trait]
impl ChainClient for MockChain {
    async fn get_balance(&self, owner: SuiAddress, coin_type: &str) -> Result<u128, MmError> {
        let ledger = self.ledger.lock().map_err(|_| lock_poisoned())?;
        Ok(owned_coins(&ledger, owner, coin_type)?
            .map(|c| c.coin.balance as u128)
            .sum())
    }

    async fn get_coins(
        &self,
        owner: SuiAddress,
        coin_type: &str,
    ) -> Result<Vec<CoinObject>, MmError> {
        let ledger = self.ledger.lock().map_err(|_| lock_poisoned())?;
        Ok(owned_coins(&ledger, owner, coin_type)?
            .map(|c| c.coin.clone())
            .collect())
    }

    async fn get_coin_metadata(
        &self,
        coin_type: &str,
    ) -> Result<Option<CoinMetadataInfo>, MmError> {
        let ledger = self.ledger.lock().map_err(|_| lock_poisoned())?;
        Ok(ledger.metadata.get(&normalize_coin_type(coin_type)).cloned())
    }

    async fn get_object(&self, object_id: ObjectID) -> Result<ObjectInfo, MmError> {
        let ledger = self.ledger.lock().map_err(|_| lock_poisoned())?;
        ledger
            .objects
            .get(&object_id)
            .cloned()
            .ok_or_else(|| MmError::NotFound(format!("object {}", object_id)))
    }

    async fn query_events(
        &self,
        event_type: &str,
        cursor: Option<EventID>,
        limit: usize,
    ) -> Result<EventPage, MmError> {
        let mut ledger = self.ledger.lock().map_err(|_| lock_poisoned())?;
        ledger.event_queries += 1;
        let events = ledger.events.get(event_type).cloned().unwrap_or_default();
        // the cursor is the offset of the next event
        let offset = cursor.map(|cursor| cursor.event_seq as usize).unwrap_or(0);
        let data: Vec<EventRecord> = events.iter().skip(offset).take(limit).cloned().collect();
        let next = offset + data.len();
        let has_next_page = next < events.len();
        Ok(EventPage {
            data,
            next_cursor: has_next_page.then(|| EventID {
                tx_digest: TransactionDigest::new([0; 32]),
                event_seq: next as u64,
            }),
            has_next_page,
        })
    }

    async fn dev_inspect(
        &self,
        _sender: SuiAddress,
        _pt: ProgrammableTransaction,
    ) -> Result<Vec<EventRecord>, MmError> {
        let ledger = self.ledger.lock().map_err(|_| lock_poisoned())?;
        Ok(ledger.inspect_events.clone())
    }

    async fn reference_gas_price(&self) -> Result<u64, MmError> {
        Ok(MOCK_GAS_PRICE)
    }

    async fn execute(
        &self,
        data: TransactionData,
        signatures: Vec<Signature>,
    ) -> Result<TxOutcome, MmError> {
        let mut ledger = self.ledger.lock().map_err(|_| lock_poisoned())?;
        ledger.execute_calls += 1;
        if let Some(err) = ledger.fail_plan.pop_front() {
            return Err(err);
        }
        execute_on(&mut ledger, &data, signatures.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{tx::build_tx_data, tx::TxCtx, wallet::Wallet};

    fn wallet(byte: u8) -> Wallet {
        Wallet::from_secret(&hex::encode([byte; 32])).unwrap()
    }

    #[tokio::test]
    async fn failed_transactions_leave_the_ledger_untouched() {
        let chain = MockChain::new();
        let owner = wallet(1);
        let gas = chain.mint(owner.address, SUI_COIN_TYPE, 10_000_000);
        let gas_ref = chain.get_coins(owner.address, SUI_COIN_TYPE).await.unwrap()[0].object_ref;
        assert_eq!(gas_ref.0, gas);

        let mut ctx = TxCtx::default();
        let outputs = ctx.split_coins(Argument::GasCoin, &[9_000_000]).unwrap();
        ctx.transfer(wallet(2).address, outputs).unwrap();
        let data = build_tx_data(owner.address, None, vec![gas_ref], ctx.finish(), 5_000_000, 1);
        let sig = owner.sign(&data);

        assert!(matches!(
            chain.execute(data, vec![sig]).await,
            Err(MmError::InsufficientFunds(_))
        ));
        assert_eq!(chain.balance(owner.address, SUI_COIN_TYPE), 10_000_000);
        assert_eq!(chain.execute_calls(), 1);
        assert!(chain.executed().is_empty());
    }

    #[tokio::test]
    async fn sponsored_transactions_need_both_signatures() {
        let chain = MockChain::new();
        let (sender, sponsor) = (wallet(1), wallet(2));
        chain.mint(sponsor.address, SUI_COIN_TYPE, 100_000_000);
        let gas_ref = chain.get_coins(sponsor.address, SUI_COIN_TYPE).await.unwrap()[0].object_ref;

        let data = build_tx_data(
            sender.address,
            Some(sponsor.address),
            vec![gas_ref],
            TxCtx::default().finish(),
            10_000_000,
            1,
        );
        let sender_sig = sender.sign(&data);
        assert!(matches!(
            chain.execute(data.clone(), vec![sender_sig.clone()]).await,
            Err(MmError::InvalidInput(_))
        ));
        let sponsor_sig = sponsor.sign(&data);
        chain.execute(data, vec![sender_sig, sponsor_sig]).await.unwrap();
        assert_eq!(
            chain.balance(sponsor.address, SUI_COIN_TYPE),
            100_000_000 - MOCK_GAS_FEE as u128
        );
    }
}
