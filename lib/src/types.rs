// Copyright (c) 2023-2024 IOTA Stiftung

//! Stardust transaction types and binary serialization
//!
//! Canonical little-endian wire encodings for addresses, outputs, inputs,
//! essences and payloads. The device verifies a hash over these exact
//! bytes before signing, so serialization must be byte-identical on every
//! run; everything here is `Vec`-ordered with fixed field layouts.

use core::fmt;
use core::str::FromStr;

use bech32::{FromBase32, ToBase32, Variant};
use encdec::Encode;

use ledger_stardust_apdu::{signing::Unlock, ApduError};

/// Output kind discriminator for basic outputs
pub const OUTPUT_KIND_BASIC: u8 = 0x03;

/// Input kind discriminator for UTXO inputs
pub const INPUT_KIND_UTXO: u8 = 0x00;

/// Address kind discriminator for ed25519 addresses
pub const ADDRESS_KIND_ED25519: u8 = 0x00;

/// Unlock condition kind for plain address unlock conditions
pub const UNLOCK_CONDITION_KIND_ADDRESS: u8 = 0x00;

/// Payload kind for transaction payloads
pub const PAYLOAD_KIND_TRANSACTION: u32 = 6;

/// Transaction id length in bytes
pub const TRANSACTION_ID_LENGTH: usize = 32;

/// Address encode / decode errors
#[derive(Clone, PartialEq, Debug, thiserror::Error)]
pub enum AddressError {
    /// Bech32 level failure
    #[error("bech32 codec failed: {0}")]
    Bech32(#[from] bech32::Error),

    /// Leading address kind byte not recognised
    #[error("unexpected address kind 0x{0:02x}")]
    Kind(u8),

    /// Wrong number of address bytes
    #[error("invalid address length: {0}")]
    Length(usize),
}

/// Id parsing errors
#[derive(Clone, PartialEq, Debug, thiserror::Error)]
pub enum IdError {
    /// Not valid hex
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Wrong number of bytes
    #[error("invalid id length: {0}")]
    Length(usize),
}

/// BLAKE2b-256 hash identifying the transaction an output was created by
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct TransactionId(pub [u8; TRANSACTION_ID_LENGTH]);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for TransactionId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim_start_matches("0x"))?;
        if bytes.len() != TRANSACTION_ID_LENGTH {
            return Err(IdError::Length(bytes.len()));
        }

        let mut d = [0u8; TRANSACTION_ID_LENGTH];
        d.copy_from_slice(&bytes);
        Ok(Self(d))
    }
}

/// Identifier of a single output: transaction id plus output index
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct OutputId {
    pub transaction_id: TransactionId,
    pub index: u16,
}

impl OutputId {
    /// Create a new [`OutputId`]
    pub fn new(transaction_id: TransactionId, index: u16) -> Self {
        Self {
            transaction_id,
            index,
        }
    }
}

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "0x{}{}",
            hex::encode(self.transaction_id.0),
            hex::encode(self.index.to_le_bytes())
        )
    }
}

impl FromStr for OutputId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim_start_matches("0x"))?;
        if bytes.len() != TRANSACTION_ID_LENGTH + 2 {
            return Err(IdError::Length(bytes.len()));
        }

        let mut d = [0u8; TRANSACTION_ID_LENGTH];
        d.copy_from_slice(&bytes[..TRANSACTION_ID_LENGTH]);

        let index = u16::from_le_bytes([bytes[32], bytes[33]]);

        Ok(Self::new(TransactionId(d), index))
    }
}

/// BLAKE2b-256 hash of an ed25519 public key
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Ed25519Address(pub [u8; 32]);

impl Ed25519Address {
    /// Bech32 encode with the given human-readable prefix
    pub fn to_bech32(&self, hrp: &str) -> Result<String, AddressError> {
        let mut data = Vec::with_capacity(33);
        data.push(ADDRESS_KIND_ED25519);
        data.extend_from_slice(&self.0);

        Ok(bech32::encode(hrp, data.to_base32(), Variant::Bech32)?)
    }

    /// Decode from a bech32 string, returning the prefix and address
    pub fn from_bech32(s: &str) -> Result<(String, Self), AddressError> {
        let (hrp, data, _variant) = bech32::decode(s)?;
        let bytes = Vec::<u8>::from_base32(&data)?;

        Ok((hrp, Self::from_prefixed_bytes(&bytes)?))
    }

    /// Parse kind-prefixed address bytes as produced by the device
    pub fn from_prefixed_bytes(data: &[u8]) -> Result<Self, AddressError> {
        if data.len() != 33 {
            return Err(AddressError::Length(data.len()));
        }
        if data[0] != ADDRESS_KIND_ED25519 {
            return Err(AddressError::Kind(data[0]));
        }

        let mut d = [0u8; 32];
        d.copy_from_slice(&data[1..]);
        Ok(Self(d))
    }
}

/// Bech32 encode raw kind-prefixed address bytes as read from the device
pub fn address_to_bech32(hrp: &str, data: &[u8]) -> Result<String, AddressError> {
    Ok(bech32::encode(hrp, data.to_base32(), Variant::Bech32)?)
}

/// Basic output: an amount deposited to a single ed25519 address.
///
/// Immutable once created by a transaction; consumed exactly once by a
/// later transaction's input.
///
/// ## Encoding:
/// kind (u8) ‖ amount (u64) ‖ native token count (u8, 0) ‖
/// unlock condition count (u8, 1) ‖ address unlock condition kind (u8) ‖
/// address kind (u8) ‖ public key hash (32 bytes) ‖ feature count (u8, 0)
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct BasicOutput {
    /// Deposit amount in base units
    pub amount: u64,

    /// Deposited-to address
    pub address: Ed25519Address,
}

impl BasicOutput {
    /// Create a new [`BasicOutput`]
    pub fn new(address: Ed25519Address, amount: u64) -> Self {
        Self { amount, address }
    }

    /// Serialize to the fixed binary output encoding
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = Vec::with_capacity(46);

        w.push(OUTPUT_KIND_BASIC);
        w.extend_from_slice(&self.amount.to_le_bytes());
        w.push(0); // native token count
        w.push(1); // unlock condition count
        w.push(UNLOCK_CONDITION_KIND_ADDRESS);
        w.push(ADDRESS_KIND_ED25519);
        w.extend_from_slice(&self.address.0);
        w.push(0); // feature count

        w
    }
}

/// Reference to the unspent output consumed by a transaction.
///
/// Exists only inside a [`TransactionEssence`], never persisted
/// independently.
///
/// ## Encoding:
/// kind (u8) ‖ transaction id (32 bytes) ‖ output index (u16)
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct UtxoInput {
    /// Transaction the consumed output was created by
    pub transaction_id: TransactionId,

    /// Index of the consumed output within that transaction
    pub output_index: u16,
}

impl UtxoInput {
    /// Create a new [`UtxoInput`]
    pub fn new(transaction_id: TransactionId, output_index: u16) -> Self {
        Self {
            transaction_id,
            output_index,
        }
    }

    /// Id of the output this input consumes
    pub fn output_id(&self) -> OutputId {
        OutputId::new(self.transaction_id, self.output_index)
    }

    /// Serialize to the fixed binary input encoding
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = Vec::with_capacity(35);

        w.push(INPUT_KIND_UTXO);
        w.extend_from_slice(&self.transaction_id.0);
        w.extend_from_slice(&self.output_index.to_le_bytes());

        w
    }
}

/// Transaction essence: the canonical signed body of a transaction.
///
/// ## Encoding:
/// network id (u64) ‖ inputs commitment (32 bytes) ‖
/// input count (u16) ‖ inputs ‖ output count (u16) ‖ outputs ‖
/// payload length (u32) ‖ optional embedded payload
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TransactionEssence {
    /// Network the transaction is valid on
    pub network_id: u64,

    /// Commitment over the serialized bytes of every consumed output,
    /// in input order
    pub inputs_commitment: [u8; 32],

    /// Consumed inputs, order is device-visible and fixed
    pub inputs: Vec<UtxoInput>,

    /// Created outputs
    pub outputs: Vec<BasicOutput>,

    /// Optional embedded sub-payload
    pub payload: Option<Vec<u8>>,
}

impl TransactionEssence {
    /// Serialize to the canonical essence byte sequence
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = Vec::new();

        w.extend_from_slice(&self.network_id.to_le_bytes());
        w.extend_from_slice(&self.inputs_commitment);

        w.extend_from_slice(&(self.inputs.len() as u16).to_le_bytes());
        for input in &self.inputs {
            w.extend_from_slice(&input.to_bytes());
        }

        w.extend_from_slice(&(self.outputs.len() as u16).to_le_bytes());
        for output in &self.outputs {
            w.extend_from_slice(&output.to_bytes());
        }

        match &self.payload {
            Some(p) => {
                w.extend_from_slice(&(p.len() as u32).to_le_bytes());
                w.extend_from_slice(p);
            }
            None => w.extend_from_slice(&0u32.to_le_bytes()),
        }

        w
    }
}

/// Assembled transaction: essence plus one unlock per input
#[derive(Clone, PartialEq, Debug)]
pub struct TransactionPayload {
    pub essence: TransactionEssence,
    pub unlocks: Vec<Unlock>,
}

impl TransactionPayload {
    /// Serialize for node submission
    pub fn to_bytes(&self) -> Result<Vec<u8>, ApduError> {
        let mut w = Vec::new();

        w.extend_from_slice(&PAYLOAD_KIND_TRANSACTION.to_le_bytes());
        w.extend_from_slice(&self.essence.to_bytes());

        w.extend_from_slice(&(self.unlocks.len() as u16).to_le_bytes());
        for unlock in &self.unlocks {
            let mut buff = vec![0u8; unlock.encode_len()?];
            unlock.encode(&mut buff)?;
            w.extend_from_slice(&buff);
        }

        Ok(w)
    }
}
