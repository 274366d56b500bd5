// Copyright (c) 2023-2024 IOTA Stiftung

//! UI flow APDUs

use encdec::{DecodeOwned, Encode};
use num_enum::TryFromPrimitive;
use strum::Display;

use crate::{ApduError, ApduStatic, Instruction};

/// UI flows the host can place the device in
#[derive(Copy, Clone, PartialEq, Debug, Display, TryFromPrimitive)]
#[repr(u8)]
pub enum Flow {
    MainMenu = 0x00,
    GeneratingAddresses = 0x01,
    GenericError = 0x02,
    Rejected = 0x03,
    SignedSuccessfully = 0x04,
    Signing = 0x05,
}

impl DecodeOwned for Flow {
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

/// Show flow APDU, flow id in P1
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ShowFlowReq {
    /// Flow to display
    pub flow: Flow,
}

impl ShowFlowReq {
    /// Create a new [`ShowFlowReq`] request
    pub fn new(flow: Flow) -> Self {
        Self { flow }
    }
}

impl ApduStatic for ShowFlowReq {
    const INS: Instruction = Instruction::ShowFlow;

    fn p1(&self) -> u8 {
        self.flow as u8
    }
}

impl Encode for ShowFlowReq {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(0)
    }

    fn encode(&self, _buff: &mut [u8]) -> Result<usize, ApduError> {
        Ok(0)
    }
}
