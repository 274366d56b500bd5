// Copyright (c) 2023-2024 IOTA Stiftung

//! Protocol / APDU definitions for Stardust hardware wallet communication
//!
//! This module provides a protocol specification and reference implementation
//! for communication with the Stardust (IOTA / Shimmer) Ledger application.
//!
//! APDUs use a primitive binary encoding equivalent to packed c structures,
//! with all fields little-endian. Field order and width are fixed per
//! instruction and must be reproduced byte-for-byte for the device firmware
//! to accept a command.

use encdec::Encode;

pub mod account;
pub mod address;
pub mod app_config;
pub mod data_buffer;
pub mod flow;
pub mod prelude;
pub mod reset;
pub mod signing;
pub mod status;

/// Stardust APDU class
pub const STARDUST_APDU_CLA: u8 = 0x7b;

/// Stardust APDU instruction codes
#[derive(Copy, Clone, Debug, PartialEq)]
#[repr(u8)]
pub enum Instruction {
    // General instructions
    NoOperation = 0x00,

    /// Fetch application configuration / version
    GetAppConfig = 0x10,

    /// Select the active account (and application mode)
    SetAccount = 0x11,

    /// Fetch the data buffer state
    GetDataBufferState = 0x80,

    /// Write one block to the data buffer
    WriteDataBlock = 0x81,

    /// Read one block from the data buffer
    ReadDataBlock = 0x82,

    /// Clear the data buffer, must precede any write
    ClearDataBuffer = 0x83,

    /// Show a UI flow
    ShowFlow = 0x90,

    /// Declare the remainder output ahead of signing
    PrepareSigning = 0xa0,

    /// Generate addresses for the active account
    GenerateAddress = 0xa1,

    /// Display the uploaded essence for user confirmation
    UserConfirmEssence = 0xa3,

    /// Fetch the unlock for a single input
    SignSingle = 0xa4,

    /// Reset application state
    Reset = 0xff,
}

/// APDU encode / decode error type
#[derive(Copy, Clone, Debug, PartialEq, thiserror::Error)]
pub enum ApduError {
    /// Buffer too short for the fixed-layout encoding
    #[error("invalid buffer length")]
    InvalidLength,

    /// Field value outside the encodable range
    #[error("invalid encoding")]
    InvalidEncoding,

    /// Invalid UTF-8 in a string field
    #[error("invalid utf8 string")]
    Utf8,

    /// Unrecognised discriminator in a tagged response
    #[error("invalid variant discriminator 0x{0:02x}")]
    InvalidVariant(u8),
}

impl From<encdec::Error> for ApduError {
    fn from(e: encdec::Error) -> Self {
        match e {
            encdec::Error::Length => ApduError::InvalidLength,
            _ => ApduError::InvalidEncoding,
        }
    }
}

/// APDU command header (class, instruction, parameter bytes)
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ApduHeader {
    pub cla: u8,
    pub ins: u8,
    pub p1: u8,
    pub p2: u8,
}

/// Static header trait for request APDUs.
///
/// Implementors provide the instruction code and may override the
/// parameter bytes where an instruction carries values in P1 / P2.
pub trait ApduStatic {
    /// APDU instruction for this request
    const INS: Instruction;

    /// First parameter byte, zero unless overridden
    fn p1(&self) -> u8 {
        0
    }

    /// Second parameter byte, zero unless overridden
    fn p2(&self) -> u8 {
        0
    }
}

/// Request trait for issuing APDUs, blanket implemented for encodable
/// [`ApduStatic`] types
pub trait ApduReq: Encode<Error = ApduError> {
    /// Fetch the command header for this request
    fn header(&self) -> ApduHeader;
}

impl<T: ApduStatic + Encode<Error = ApduError>> ApduReq for T {
    fn header(&self) -> ApduHeader {
        ApduHeader {
            cla: STARDUST_APDU_CLA,
            ins: T::INS as u8,
            p1: self.p1(),
            p2: self.p2(),
        }
    }
}
