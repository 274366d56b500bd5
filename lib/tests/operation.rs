// Copyright (c) 2023-2024 IOTA Stiftung

use ledger_stardust::client::{OutputMetadata, OutputResponse};
use ledger_stardust::operation::{operation_from_transaction, Direction};
use ledger_stardust::types::{
    BasicOutput, Ed25519Address, OutputId, TransactionEssence, TransactionId, TransactionPayload,
    UtxoInput,
};

mod helpers;
use helpers::{init_logging, MockNode};

const SENDER: Ed25519Address = Ed25519Address([0xab; 32]);
const RECIPIENT: Ed25519Address = Ed25519Address([0xcd; 32]);

const TX_ID: &str = "0x2222222222222222222222222222222222222222222222222222222222222222";

/// A transfer of 10 Mi from SENDER to RECIPIENT with a 5 Mi remainder
fn payload() -> TransactionPayload {
    TransactionPayload {
        essence: TransactionEssence {
            network_id: 14364762045254553490,
            inputs_commitment: [0; 32],
            inputs: vec![UtxoInput::new(TransactionId([0x11; 32]), 0)],
            outputs: vec![
                BasicOutput::new(RECIPIENT, 10_000_000),
                BasicOutput::new(SENDER, 5_000_000),
            ],
            payload: None,
        },
        unlocks: vec![],
    }
}

fn node() -> MockNode {
    let id = OutputId::new(TransactionId([0x11; 32]), 0);
    let consumed = OutputResponse {
        output: BasicOutput::new(SENDER, 15_000_000),
        metadata: OutputMetadata {
            transaction_id: TransactionId([0x11; 32]),
            output_index: 0,
            is_spent: true,
            milestone_timestamp_booked: 1_700_000_000,
        },
    };
    MockNode::new(vec![], vec![(id, consumed)])
}

#[tokio::test]
async fn outgoing_operation_excludes_remainder() -> anyhow::Result<()> {
    init_logging();

    let node = node();
    let sender_bech32 = SENDER.to_bech32("smr")?;

    let op = operation_from_transaction(
        &node,
        &payload(),
        "js:2:shimmer:abc",
        &sender_bech32,
        "smr",
        TX_ID,
        1_700_000_000,
        10,
    )
    .await?;

    assert_eq!(op.direction, Direction::Out);
    assert_eq!(op.id, format!("{TX_ID}-OUT"));
    assert_eq!(op.hash, TX_ID);
    // the remainder back to the sender does not count into the value
    assert_eq!(op.value, 10_000_000);
    assert_eq!(op.fee, 0);
    assert_eq!(op.senders, vec![sender_bech32]);
    assert_eq!(op.recipients.len(), 2);
    assert_eq!(op.block_height, 10);

    Ok(())
}

#[tokio::test]
async fn incoming_operation_counts_received_amounts() -> anyhow::Result<()> {
    init_logging();

    let node = node();
    let recipient_bech32 = RECIPIENT.to_bech32("smr")?;

    let op = operation_from_transaction(
        &node,
        &payload(),
        "js:2:shimmer:def",
        &recipient_bech32,
        "smr",
        TX_ID,
        1_700_000_000,
        10,
    )
    .await?;

    assert_eq!(op.direction, Direction::In);
    assert_eq!(op.id, format!("{TX_ID}-IN"));
    assert_eq!(op.value, 10_000_000);
    assert_eq!(op.timestamp, 1_700_000_000);

    Ok(())
}
