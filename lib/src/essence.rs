// Copyright (c) 2023-2024 IOTA Stiftung

//! Transaction essence assembly and inputs commitment

use blake2::{digest::consts::U32, Blake2b, Digest};
use log::trace;

use crate::select::SelectedInput;
use crate::types::{BasicOutput, TransactionEssence};

/// BLAKE2b with 256-bit output
type Blake2b256 = Blake2b<U32>;

/// Essence construction errors
#[derive(Clone, PartialEq, Debug, thiserror::Error)]
pub enum EssenceError {
    /// Signing requires at least one input and one output
    #[error("essence requires at least one input and one output")]
    Empty,

    /// Created outputs exceed the consumed amount
    #[error("output total {outputs} exceeds consumed input total {inputs}")]
    OutputsExceedInputs { inputs: u64, outputs: u64 },
}

/// An essence together with its canonical serialization
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BuiltEssence {
    pub essence: TransactionEssence,
    pub bytes: Vec<u8>,
}

/// Compute the inputs commitment over the serialized bytes of each consumed
/// output, in input order.
///
/// Each consumed output is hashed individually and the commitment is the
/// hash of the concatenated per-output hashes; this binds every input to
/// the exact output content it spends, preventing substitution.
pub fn inputs_commitment<I, B>(consumed_outputs: I) -> [u8; 32]
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut hasher = Blake2b256::new();

    for bytes in consumed_outputs {
        hasher.update(Blake2b256::digest(bytes.as_ref()));
    }

    hasher.finalize().into()
}

/// Build a transaction essence over the selected inputs and outputs,
/// returning the essence and its canonical byte serialization.
pub fn build_essence(
    network_id: u64,
    inputs: &[SelectedInput],
    outputs: &[BasicOutput],
) -> Result<BuiltEssence, EssenceError> {
    if inputs.is_empty() || outputs.is_empty() {
        return Err(EssenceError::Empty);
    }

    let consumed: u128 = inputs.iter().map(|i| i.output.amount as u128).sum();
    let created: u128 = outputs.iter().map(|o| o.amount as u128).sum();
    if created > consumed {
        return Err(EssenceError::OutputsExceedInputs {
            inputs: consumed as u64,
            outputs: created as u64,
        });
    }

    let commitment = inputs_commitment(inputs.iter().map(|i| i.output.to_bytes()));

    let essence = TransactionEssence {
        network_id,
        inputs_commitment: commitment,
        inputs: inputs.iter().map(|i| i.input).collect(),
        outputs: outputs.to_vec(),
        payload: None,
    };

    let bytes = essence.to_bytes();
    trace!("Built essence: {} bytes", bytes.len());

    Ok(BuiltEssence { essence, bytes })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::{Ed25519Address, TransactionId, UtxoInput};

    fn selected(amount: u64, tag: u8) -> SelectedInput {
        SelectedInput {
            input: UtxoInput::new(TransactionId([tag; 32]), 0),
            output: BasicOutput::new(Ed25519Address([tag; 32]), amount),
        }
    }

    fn outputs(amount: u64) -> Vec<BasicOutput> {
        vec![BasicOutput::new(Ed25519Address([0x99; 32]), amount)]
    }

    #[test]
    fn essence_is_deterministic() {
        let inputs = vec![selected(10_000_000, 1), selected(5_000_000, 2)];
        let outs = outputs(12_000_000);

        let a = build_essence(42, &inputs, &outs).unwrap();
        let b = build_essence(42, &inputs, &outs).unwrap();

        assert_eq!(a.bytes, b.bytes);
        assert_eq!(a.essence.inputs_commitment, b.essence.inputs_commitment);
    }

    #[test]
    fn commitment_changes_with_consumed_amount() {
        let a = inputs_commitment([selected(10_000_000, 1).output.to_bytes()]);
        let b = inputs_commitment([selected(10_000_001, 1).output.to_bytes()]);

        assert_ne!(a, b);
    }

    #[test]
    fn commitment_changes_with_order() {
        let x = selected(1, 1).output.to_bytes();
        let y = selected(2, 2).output.to_bytes();

        let a = inputs_commitment([x.clone(), y.clone()]);
        let b = inputs_commitment([y, x]);

        assert_ne!(a, b);
    }

    #[test]
    fn commitment_stable_for_fixed_set() {
        let x = selected(1, 1).output.to_bytes();
        let y = selected(2, 2).output.to_bytes();

        let a = inputs_commitment([x.clone(), y.clone()]);
        let b = inputs_commitment([x, y]);

        assert_eq!(a, b);
    }

    #[test]
    fn rejects_empty_sides() {
        assert_eq!(
            build_essence(42, &[], &outputs(1)),
            Err(EssenceError::Empty)
        );
        assert_eq!(
            build_essence(42, &[selected(1, 1)], &[]),
            Err(EssenceError::Empty)
        );
    }

    #[test]
    fn rejects_outputs_exceeding_inputs() {
        let r = build_essence(42, &[selected(10, 1)], &outputs(11));

        assert_eq!(
            r,
            Err(EssenceError::OutputsExceedInputs {
                inputs: 10,
                outputs: 11
            })
        );
    }

    #[test]
    fn commitment_binds_consumed_outputs_not_inputs() {
        // same consumed outputs under different input ids commit identically
        let a = selected(5, 1);
        let mut b = a.clone();
        b.input = UtxoInput::new(TransactionId([0x7f; 32]), 9);

        let ca = inputs_commitment([a.output.to_bytes()]);
        let cb = inputs_commitment([b.output.to_bytes()]);
        assert_eq!(ca, cb);

        // but the essence bytes still differ through the input list
        let ea = build_essence(42, &[a], &outputs(5)).unwrap();
        let eb = build_essence(42, &[b], &outputs(5)).unwrap();
        assert_ne!(ea.bytes, eb.bytes);
    }
}
