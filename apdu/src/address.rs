// Copyright (c) 2023-2024 IOTA Stiftung

//! Address generation APDUs

use encdec::Encode;

use crate::{ApduError, ApduStatic, Instruction};

/// Generate address APDU.
///
/// Derives `count` addresses for the active account starting at the given
/// change / index levels and places them in the data buffer for readback.
/// With the verify flag set the device displays the address and blocks
/// until the user accepts or rejects it.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                          BIP32_INDEX                          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                          BIP32_CHANGE                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                             COUNT                             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct GenerateAddressReq {
    /// BIP32 address index (hardened)
    pub bip32_index: u32,

    /// BIP32 change level (hardened)
    pub bip32_change: u32,

    /// Number of addresses to derive
    pub count: u32,

    /// Display the address for user verification
    pub verify: bool,
}

impl GenerateAddressReq {
    /// Create a new [`GenerateAddressReq`] request
    pub fn new(bip32_index: u32, bip32_change: u32, count: u32, verify: bool) -> Self {
        Self {
            bip32_index,
            bip32_change,
            count,
            verify,
        }
    }
}

impl ApduStatic for GenerateAddressReq {
    const INS: Instruction = Instruction::GenerateAddress;

    fn p1(&self) -> u8 {
        self.verify as u8
    }
}

impl Encode for GenerateAddressReq {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(12)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        if buff.len() < 12 {
            return Err(ApduError::InvalidLength);
        }

        buff[..4].copy_from_slice(&self.bip32_index.to_le_bytes());
        buff[4..8].copy_from_slice(&self.bip32_change.to_le_bytes());
        buff[8..12].copy_from_slice(&self.count.to_le_bytes());

        Ok(12)
    }
}
