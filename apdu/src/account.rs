// Copyright (c) 2023-2024 IOTA Stiftung

//! Account selection APDUs

use encdec::{DecodeOwned, Encode};
use num_enum::TryFromPrimitive;
use strum::Display;

use crate::{ApduError, ApduStatic, Instruction};

/// Application mode, selects the network the device derives and displays
/// addresses for. Carried in P1 of [`SetAccountReq`].
#[derive(Copy, Clone, PartialEq, Debug, Display, TryFromPrimitive)]
#[repr(u8)]
pub enum AppMode {
    IotaStardust = 0x01,
    Shimmer = 0x03,
}

/// Set active account APDU.
///
/// Selects the account index used for subsequent address generation and
/// signing. The index must already be hardened.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         ACCOUNT_INDEX                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SetAccountReq {
    /// Application mode for the target network
    pub mode: AppMode,

    /// BIP32 account index (hardened)
    pub account: u32,
}

impl SetAccountReq {
    /// Create a new [`SetAccountReq`] request
    pub fn new(mode: AppMode, account: u32) -> Self {
        Self { mode, account }
    }
}

impl ApduStatic for SetAccountReq {
    const INS: Instruction = Instruction::SetAccount;

    fn p1(&self) -> u8 {
        self.mode as u8
    }
}

impl Encode for SetAccountReq {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(4)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        if buff.len() < 4 {
            return Err(ApduError::InvalidLength);
        }

        buff[..4].copy_from_slice(&self.account.to_le_bytes());

        Ok(4)
    }
}

impl DecodeOwned for AppMode {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), ApduError> {
        if buff.is_empty() {
            return Err(ApduError::InvalidLength);
        }

        match Self::try_from(buff[0]) {
            Ok(v) => Ok((v, 1)),
            Err(_) => Err(ApduError::InvalidEncoding),
        }
    }
}
