use async_trait::async_trait;
use sui_sdk::{
    rpc_types::{
        EventFilter, ObjectChange, SuiExecutionStatus, SuiObjectDataOptions, SuiParsedData,
        SuiTransactionBlockEffectsAPI, SuiTransactionBlockResponseOptions,
    },
    types::{
        base_types::{ObjectID, SuiAddress},
        crypto::Signature,
        event::EventID,
        object::Owner,
        parse_sui_struct_tag,
        quorum_driver_types::ExecuteTransactionRequestType,
        transaction::{ProgrammableTransaction, Transaction, TransactionData, TransactionKind},
    },
    SuiClient,
};

use super::{
    ChainClient, CoinMetadataInfo, CoinObject, CreatedObject, EventPage, EventRecord, ObjectInfo,
    TxOutcome,
};
use crate::errors::{classify_chain_error, classify_execution_failure, MmError};

/// `ChainClient` over a Sui JSON-RPC full node.
#[derive(Clone)]
pub struct SuiChainClient {
    client: SuiClient,
}

impl SuiChainClient {
    pub fn new(client: SuiClient) -> Self {
        Self { client }
    }

    pub fn inner(&self) -> &SuiClient {
        &self.client
    }
}

fn rpc_error(err: impl ToString) -> MmError {
    classify_chain_error(err.to_string())
}

#[async_trait]
impl ChainClient for SuiChainClient {
    async fn get_balance(&self, owner: SuiAddress, coin_type: &str) -> Result<u128, MmError> {
        let balance = self
            .client
            .coin_read_api()
            .get_balance(owner, Some(coin_type.to_string()))
            .await
            .map_err(rpc_error)?;
        Ok(balance.total_balance)
    }

    async fn get_coins(
        &self,
        owner: SuiAddress,
        coin_type: &str,
    ) -> Result<Vec<CoinObject>, MmError> {
        let mut coins = Vec::new();
        let mut cursor = None;
        loop {
            let page = self
                .client
                .coin_read_api()
                .get_coins(owner, Some(coin_type.to_string()), cursor, None)
                .await
                .map_err(rpc_error)?;
            coins.extend(page.data.into_iter().map(|coin| CoinObject {
                object_ref: coin.object_ref(),
                coin_type: coin.coin_type,
                balance: coin.balance,
            }));
            if !page.has_next_page || page.next_cursor.is_none() {
                break;
            }
            cursor = page.next_cursor;
        }
        Ok(coins)
    }

    async fn get_coin_metadata(
        &self,
        coin_type: &str,
    ) -> Result<Option<CoinMetadataInfo>, MmError> {
        let metadata = self
            .client
            .coin_read_api()
            .get_coin_metadata(coin_type.to_string())
            .await
            .map_err(rpc_error)?;
        Ok(metadata.map(|metadata| CoinMetadataInfo {
            id: metadata.id,
            decimals: metadata.decimals,
            symbol: metadata.symbol,
            name: metadata.name,
        }))
    }

    async fn get_object(&self, object_id: ObjectID) -> Result<ObjectInfo, MmError> {
        let response = self
            .client
            .read_api()
            .get_object_with_options(
                object_id,
                SuiObjectDataOptions::new()
                    .with_type()
                    .with_owner()
                    .with_content(),
            )
            .await
            .map_err(rpc_error)?;
        let Some(data) = response.data else {
            return Err(MmError::NotFound(format!(
                "object {} ({:?})",
                object_id, response.error
            )));
        };

        let initial_shared_version = match &data.owner {
            Some(Owner::Shared {
                initial_shared_version,
            }) => Some(*initial_shared_version),
            _ => None,
        };
        let fields = match &data.content {
            Some(SuiParsedData::MoveObject(object)) => serde_json::to_value(&object.fields)
                .map_err(|err| MmError::Unavailable(format!("object {} fields: {}", object_id, err)))?,
            _ => serde_json::Value::Null,
        };

        Ok(ObjectInfo {
            object_ref: data.object_ref(),
            object_type: data.type_.as_ref().map(|object_type| object_type.to_string()),
            initial_shared_version,
            fields,
        })
    }

    async fn query_events(
        &self,
        event_type: &str,
        cursor: Option<EventID>,
        limit: usize,
    ) -> Result<EventPage, MmError> {
        let struct_tag = parse_sui_struct_tag(event_type)
            .map_err(|err| MmError::InvalidInput(format!("event type {}: {}", event_type, err)))?;
        let page = self
            .client
            .event_api()
            .query_events(EventFilter::MoveEventType(struct_tag), cursor, Some(limit), true)
            .await
            .map_err(rpc_error)?;
        Ok(EventPage {
            data: page
                .data
                .into_iter()
                .map(|event| EventRecord {
                    event_type: event.type_.to_string(),
                    parsed_json: event.parsed_json,
                })
                .collect(),
            next_cursor: page.next_cursor,
            has_next_page: page.has_next_page,
        })
    }

    async fn dev_inspect(
        &self,
        sender: SuiAddress,
        pt: ProgrammableTransaction,
    ) -> Result<Vec<EventRecord>, MmError> {
        let results = self
            .client
            .read_api()
            .dev_inspect_transaction_block(
                sender,
                TransactionKind::ProgrammableTransaction(pt),
                None,
                None,
                None,
            )
            .await
            .map_err(rpc_error)?;
        if let Some(error) = results.error {
            return Err(classify_execution_failure("dev-inspect", error));
        }
        Ok(results
            .events
            .data
            .into_iter()
            .map(|event| EventRecord {
                event_type: event.type_.to_string(),
                parsed_json: event.parsed_json,
            })
            .collect())
    }

    async fn reference_gas_price(&self) -> Result<u64, MmError> {
        self.client
            .read_api()
            .get_reference_gas_price()
            .await
            .map_err(rpc_error)
    }

    async fn execute(
        &self,
        data: TransactionData,
        signatures: Vec<Signature>,
    ) -> Result<TxOutcome, MmError> {
        let response = self
            .client
            .quorum_driver_api()
            .execute_transaction_block(
                Transaction::from_data(data, signatures),
                SuiTransactionBlockResponseOptions::new()
                    .with_effects()
                    .with_object_changes(),
                Some(ExecuteTransactionRequestType::WaitForLocalExecution),
            )
            .await
            .map_err(rpc_error)?;

        let digest = response.digest.to_string();
        if let Some(effects) = &response.effects {
            if let SuiExecutionStatus::Failure { error } = effects.status() {
                return Err(classify_execution_failure(digest, error.clone()));
            }
        }

        let mut outcome = TxOutcome {
            digest,
            ..Default::default()
        };
        for change in response.object_changes.unwrap_or_default() {
            match change {
                ObjectChange::Created {
                    object_id,
                    object_type,
                    ..
                } => outcome.created.push(CreatedObject {
                    object_id,
                    object_type: object_type.to_string(),
                }),
                ObjectChange::Published { package_id, .. } => {
                    outcome.published_package = Some(package_id)
                }
                _ => {}
            }
        }
        Ok(outcome)
    }
}
