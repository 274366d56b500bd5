// Copyright (c) 2023-2024 IOTA Stiftung

//! Data buffer APDUs
//!
//! The device exposes a single block-granular data buffer used to upload
//! transaction essences and to read back generated addresses and
//! signatures. Writes are only permitted while the buffer is
//! [`DataType::Empty`]; total content must not exceed
//! `data_block_size * data_block_count` bytes.

use encdec::{Decode, DecodeOwned, Encode};
use num_enum::TryFromPrimitive;
use strum::Display;

use crate::{ApduError, ApduStatic, Instruction};

/// Content type of the device data buffer
#[derive(Copy, Clone, PartialEq, Debug, Display, TryFromPrimitive)]
#[repr(u8)]
pub enum DataType {
    /// Buffer cleared, writable
    Empty = 0x00,
    /// Addresses generated by the device
    GeneratedAddresses = 0x01,
    /// Uploaded essence, validated by the device
    ValidatedEssence = 0x02,
    /// Essence confirmed by the user
    UserConfirmedEssence = 0x03,
    /// Signatures produced by the device
    Signatures = 0x04,
    /// Buffer locked mid-operation
    Locked = 0x05,
}

impl Encode for DataType {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(1)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        if buff.is_empty() {
            return Err(ApduError::InvalidLength);
        }

        buff[0] = *self as u8;
        Ok(1)
    }
}

impl DecodeOwned for DataType {
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

/// Fetch data buffer state APDU
#[derive(Copy, Clone, PartialEq, Debug, Default, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct DataBufferStateReq;

impl ApduStatic for DataBufferStateReq {
    const INS: Instruction = Instruction::GetDataBufferState;
}

/// Data buffer state response APDU.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |          DATA_LENGTH          |   DATA_TYPE   |   BLOCK_SIZE  |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  BLOCK_COUNT  |
/// +-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct DataBufferStateResp {
    /// Logical content length in bytes, may be shorter than the block total
    pub data_length: u16,

    /// Buffer content type
    pub data_type: DataType,

    /// Fixed transfer block size in bytes
    pub data_block_size: u8,

    /// Number of blocks available
    pub data_block_count: u8,
}

impl DataBufferStateResp {
    /// Total buffer capacity in bytes
    pub fn capacity(&self) -> usize {
        self.data_block_size as usize * self.data_block_count as usize
    }
}

/// Write data block APDU, block index in P1.
///
/// Blocks must be written sequentially and padded to exactly
/// `data_block_size` bytes; the final block write may trigger a
/// user-visible confirmation on-device.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct WriteDataBlockReq<'a> {
    /// Block index
    pub block: u8,

    /// Block payload, padded to the fixed block size
    pub data: &'a [u8],
}

impl<'a> WriteDataBlockReq<'a> {
    /// Create a new [`WriteDataBlockReq`] request
    pub fn new(block: u8, data: &'a [u8]) -> Self {
        Self { block, data }
    }
}

impl<'a> ApduStatic for WriteDataBlockReq<'a> {
    const INS: Instruction = Instruction::WriteDataBlock;

    fn p1(&self) -> u8 {
        self.block
    }
}

impl<'a> Encode for WriteDataBlockReq<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(self.data.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        if buff.len() < self.data.len() {
            return Err(ApduError::InvalidLength);
        }

        buff[..self.data.len()].copy_from_slice(self.data);

        Ok(self.data.len())
    }
}

/// Read data block APDU, block index in P1, returns one raw block
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ReadDataBlockReq {
    /// Block index
    pub block: u8,
}

impl ReadDataBlockReq {
    /// Create a new [`ReadDataBlockReq`] request
    pub fn new(block: u8) -> Self {
        Self { block }
    }
}

impl ApduStatic for ReadDataBlockReq {
    const INS: Instruction = Instruction::ReadDataBlock;

    fn p1(&self) -> u8 {
        self.block
    }
}

impl Encode for ReadDataBlockReq {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(0)
    }

    fn encode(&self, _buff: &mut [u8]) -> Result<usize, ApduError> {
        Ok(0)
    }
}

/// Clear data buffer APDU, resets the buffer to [`DataType::Empty`]
#[derive(Copy, Clone, PartialEq, Debug, Default, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct ClearDataBufferReq;

impl ApduStatic for ClearDataBufferReq {
    const INS: Instruction = Instruction::ClearDataBuffer;
}
