mod sui_client;

pub use sui_client::*;

use async_trait::async_trait;
use serde_json::Value;
use sui_sdk::types::{
    base_types::{ObjectID, ObjectRef, SequenceNumber, SuiAddress},
    crypto::Signature,
    event::EventID,
    transaction::{ObjectArg, ProgrammableTransaction, TransactionData},
};

use crate::errors::MmError;

/// One discrete coin object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinObject {
    pub object_ref: ObjectRef,
    pub coin_type: String,
    pub balance: u64,
}

impl CoinObject {
    pub fn object_id(&self) -> ObjectID {
        self.object_ref.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinMetadataInfo {
    pub id: Option<ObjectID>,
    pub decimals: u8,
    pub symbol: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct ObjectInfo {
    pub object_ref: ObjectRef,
    pub object_type: Option<String>,
    /// Set for shared objects only.
    pub initial_shared_version: Option<SequenceNumber>,
    /// Move fields as JSON.
    pub fields: Value,
}

impl ObjectInfo {
    pub fn object_id(&self) -> ObjectID {
        self.object_ref.0
    }

    pub fn object_arg(&self, mutable: bool) -> ObjectArg {
        match self.initial_shared_version {
            Some(initial_shared_version) => ObjectArg::SharedObject {
                id: self.object_ref.0,
                initial_shared_version,
                mutable,
            },
            None => ObjectArg::ImmOrOwnedObject(self.object_ref),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub event_type: String,
    pub parsed_json: Value,
}

/// One page of events; pass `next_cursor` back to continue.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPage {
    pub data: Vec<EventRecord>,
    pub next_cursor: Option<EventID>,
    pub has_next_page: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedObject {
    pub object_id: ObjectID,
    pub object_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxOutcome {
    pub digest: String,
    pub created: Vec<CreatedObject>,
    pub published_package: Option<ObjectID>,
}

impl TxOutcome {
    /// First created object whose type contains `pattern`.
    pub fn find_created(&self, pattern: &str) -> Option<&CreatedObject> {
        self.created
            .iter()
            .find(|object| object.object_type.contains(pattern))
    }
}

/// Every chain interaction goes through this trait.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn get_balance(&self, owner: SuiAddress, coin_type: &str) -> Result<u128, MmError>;

    /// All coin objects of `coin_type`, every page.
    async fn get_coins(
        &self,
        owner: SuiAddress,
        coin_type: &str,
    ) -> Result<Vec<CoinObject>, MmError>;

    async fn get_coin_metadata(
        &self,
        coin_type: &str,
    ) -> Result<Option<CoinMetadataInfo>, MmError>;

    /// `NotFound` when the object does not exist.
    async fn get_object(&self, object_id: ObjectID) -> Result<ObjectInfo, MmError>;

    /// Most recent first, starting after `cursor`.
    async fn query_events(
        &self,
        event_type: &str,
        cursor: Option<EventID>,
        limit: usize,
    ) -> Result<EventPage, MmError>;

    /// Run without committing and return the emitted events.
    async fn dev_inspect(
        &self,
        sender: SuiAddress,
        pt: ProgrammableTransaction,
    ) -> Result<Vec<EventRecord>, MmError>;

    async fn reference_gas_price(&self) -> Result<u64, MmError>;

    /// Submit a signed transaction and wait for local execution.
    /// A failed effects status is `ExecutionFailed`.
    async fn execute(
        &self,
        data: TransactionData,
        signatures: Vec<Signature>,
    ) -> Result<TxOutcome, MmError>;
}
