// Copyright (c) 2023-2024 IOTA Stiftung

//! Wallet-facing operation model
//!
//! Translates ledger transactions into the immutable [Operation] records
//! consumed by the wallet's operation history.

use serde::{Deserialize, Serialize};

use crate::client::{NodeClient, NodeError};
use crate::types::{AddressError, TransactionPayload};

/// Direction of value flow relative to the account
#[derive(Copy, Clone, PartialEq, Eq, Debug, strum::Display, Serialize, Deserialize)]
pub enum Direction {
    #[strum(serialize = "IN")]
    #[serde(rename = "IN")]
    In,
    #[strum(serialize = "OUT")]
    #[serde(rename = "OUT")]
    Out,
}

/// Operation translation errors
#[derive(Clone, PartialEq, Debug, thiserror::Error)]
pub enum OperationError {
    /// Consumed-output lookup failed
    #[error("node query failed: {0}")]
    Node(#[from] NodeError),

    /// Address encoding failed
    #[error("address encoding failed: {0}")]
    Address(#[from] AddressError),
}

/// A wallet operation derived from one ledger transaction.
///
/// Immutable once constructed.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Operation {
    /// Operation id, transaction id qualified by direction
    pub id: String,

    /// Transaction id
    pub hash: String,

    /// Value flow direction
    pub direction: Direction,

    /// Value moved, in base units
    pub value: u64,

    /// Fee paid (feeless ledger, always zero)
    pub fee: u64,

    /// Sender addresses, bech32
    pub senders: Vec<String>,

    /// Recipient addresses, bech32
    pub recipients: Vec<String>,

    /// Owning wallet account id
    pub account_id: String,

    /// Booking timestamp, unix seconds
    pub timestamp: u64,

    /// Height the transaction was confirmed at
    pub block_height: u32,
}

impl Operation {
    /// Optimistic outgoing operation recorded immediately after signing,
    /// before the transaction is observed on the ledger
    pub fn optimistic_out(
        account_id: &str,
        value: u64,
        senders: Vec<String>,
        recipients: Vec<String>,
        timestamp: u64,
    ) -> Self {
        Self {
            id: format!("{account_id}--OUT"),
            hash: String::new(),
            direction: Direction::Out,
            value,
            fee: 0,
            senders,
            recipients,
            account_id: account_id.to_string(),
            timestamp,
            block_height: 0,
        }
    }
}

/// Translate a transaction payload into an [Operation] for the account
/// holding `address`.
///
/// Senders are resolved by fetching each input's consumed output through
/// the node client; the operation is outgoing when the account address
/// appears among them. Incoming value counts amounts received by the
/// account; outgoing value counts amounts paid to other addresses, so a
/// remainder back to the sender never inflates the value.
#[allow(clippy::too_many_arguments)]
pub async fn operation_from_transaction<C: NodeClient>(
    client: &C,
    payload: &TransactionPayload,
    account_id: &str,
    address: &str,
    hrp: &str,
    transaction_id: &str,
    timestamp: u64,
    block_height: u32,
) -> Result<Operation, OperationError> {
    let mut senders = Vec::new();
    let mut direction = Direction::In;

    for input in &payload.essence.inputs {
        let consumed = client.output(&input.output_id()).await?;
        let sender = consumed.output.address.to_bech32(hrp)?;

        if sender == address {
            direction = Direction::Out;
        }
        senders.push(sender);
    }

    let mut recipients = Vec::new();
    let mut value = 0u64;

    for output in &payload.essence.outputs {
        let recipient = output.address.to_bech32(hrp)?;

        match direction {
            Direction::In if recipient == address => value += output.amount,
            Direction::Out if recipient != address => value += output.amount,
            _ => (),
        }

        recipients.push(recipient);
    }

    Ok(Operation {
        id: format!("{transaction_id}-{direction}"),
        hash: transaction_id.to_string(),
        direction,
        value,
        fee: 0,
        senders,
        recipients,
        account_id: account_id.to_string(),
        timestamp,
        block_height,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn optimistic_operation_shape() {
        let op = Operation::optimistic_out(
            "js:2:shimmer:smr1xyz",
            1_000_000,
            vec!["smr1sender".to_string()],
            vec!["smr1recipient".to_string()],
            1_700_000_000,
        );

        assert_eq!(op.id, "js:2:shimmer:smr1xyz--OUT");
        assert_eq!(op.direction, Direction::Out);
        assert_eq!(op.fee, 0);
        assert_eq!(op.block_height, 0);
    }

    #[test]
    fn direction_display() {
        assert_eq!(Direction::In.to_string(), "IN");
        assert_eq!(Direction::Out.to_string(), "OUT");
    }

    #[test]
    fn operation_serde_round_trip() {
        let op = Operation::optimistic_out("acct", 5, vec![], vec![], 0);

        let json = serde_json::to_string(&op).unwrap();
        assert!(json.contains("\"OUT\""));

        let back: Operation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, op);
    }
}
