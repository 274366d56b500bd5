// Copyright (c) 2023-2024 IOTA Stiftung

//! UTXO input selection
//!
//! Greedily accumulates unspent outputs owned by an address until a target
//! amount is covered. Outputs are consumed in the order the index returns
//! them; reordering would change the device-visible essence between reruns
//! with identical node state.

use std::collections::HashSet;

use log::{debug, trace};

use crate::client::{NodeClient, NodeError};
use crate::types::{BasicOutput, UtxoInput};

/// Default bound on consecutive queries yielding no usable outputs
pub const DEFAULT_MAX_CONSECUTIVE_EMPTY: usize = 5;

/// Input selection errors
#[derive(Clone, PartialEq, Debug, thiserror::Error)]
pub enum SelectionError {
    /// Node query failed; selection aborts with no partial result
    #[error("node query failed: {0}")]
    Node(#[from] NodeError),

    /// Selection terminated short of the required amount
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: u64, available: u64 },
}

/// An input selected for consumption, paired with the output it consumes
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SelectedInput {
    pub input: UtxoInput,
    pub output: BasicOutput,
}

/// Result of input selection
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct InputSelection {
    /// Selected inputs in index-query order
    pub inputs: Vec<SelectedInput>,

    /// Total amount consumed
    pub consumed: u64,

    /// Excess over the required amount, payable back to the sender's own
    /// address; the caller appends the remainder output before
    /// serialization
    pub remainder: u64,
}

/// Select inputs covering `required` base units from the unspent outputs
/// owned by `address`.
///
/// Zero-amount outputs count toward the consecutive-empty tally rather
/// than toward consumption, as does any query round that consumes nothing;
/// the tally reaching `max_consecutive_empty` terminates the loop and
/// yields [`SelectionError::InsufficientFunds`] when the target is not
/// covered.
pub async fn select_inputs<C: NodeClient>(
    client: &C,
    address: &str,
    required: u64,
    max_consecutive_empty: usize,
) -> Result<InputSelection, SelectionError> {
    let mut inputs: Vec<SelectedInput> = Vec::new();
    let mut seen = HashSet::new();
    let mut consumed = 0u64;
    let mut empty = 0usize;
    let mut finished = false;

    while !finished {
        let output_ids = client.basic_output_ids(address).await?;
        trace!(
            "Index query returned {} outputs for {}",
            output_ids.len(),
            address
        );

        if output_ids.is_empty() {
            empty += 1;
            if empty >= max_consecutive_empty {
                break;
            }
            continue;
        }

        let consumed_before = consumed;
        let empty_before = empty;

        for id in &output_ids {
            if seen.contains(id) {
                continue;
            }

            let response = client.output(id).await?;

            if response.metadata.is_spent || consumed >= required {
                continue;
            }

            if response.output.amount == 0 {
                // dust, tallied as an empty result so it cannot stall the loop
                empty += 1;
                if empty >= max_consecutive_empty {
                    finished = true;
                    break;
                }
                continue;
            }

            consumed += response.output.amount;
            seen.insert(*id);
            inputs.push(SelectedInput {
                input: UtxoInput::new(
                    response.metadata.transaction_id,
                    response.metadata.output_index,
                ),
                output: response.output,
            });

            debug!("Consuming output {} ({})", id, response.output.amount);

            if consumed >= required {
                finished = true;
                break;
            }
        }

        // a round that added nothing counts as an empty result as well
        if !finished && consumed == consumed_before && empty == empty_before {
            empty += 1;
            if empty >= max_consecutive_empty {
                break;
            }
        }
    }

    if consumed < required {
        return Err(SelectionError::InsufficientFunds {
            required,
            available: consumed,
        });
    }

    Ok(InputSelection {
        inputs,
        consumed,
        remainder: consumed - required,
    })
}
