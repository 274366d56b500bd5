// Copyright (c) 2023-2024 IOTA Stiftung

//! Shared test helpers: a software twin of the device state machine and an
//! in-memory node client

#![allow(unused)]

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use log::LevelFilter;
use simplelog::SimpleLogger;

use ledger_apdu::{APDUAnswer, APDUCommand};

use ledger_stardust::apdu::prelude::{
    DataType, Instruction, SIGNATURE_KIND_ED25519, STARDUST_APDU_CLA, UNLOCK_KIND_REFERENCE,
    UNLOCK_KIND_SIGNATURE,
};
use ledger_stardust::apdu::status::{
    SW_COMMAND_NOT_ALLOWED, SW_DENIED_BY_USER, SW_INCORRECT_LENGTH, SW_INCORRECT_P1P2, SW_OK,
};
use ledger_stardust::client::{NodeClient, NodeError, OutputMetadata, OutputResponse};
use ledger_stardust::transport::Transport;
use ledger_stardust::types::{OutputId, TransactionPayload};

/// Block size reported by the mock device
pub const BLOCK_SIZE: u8 = 64;

/// Block count reported by the mock device
pub const BLOCK_COUNT: u8 = 8;

/// Setup logging for tests
pub fn init_logging() {
    let log_level = match std::env::var("LOG_LEVEL").map(|v| LevelFilter::from_str(&v)) {
        Ok(Ok(l)) => l,
        _ => LevelFilter::Debug,
    };

    let _ = SimpleLogger::init(log_level, simplelog::Config::default());
}

/// Mock transport error type (the mock itself never fails at the
/// transport level, errors are expressed as status words)
#[derive(Debug, thiserror::Error)]
#[error("mock transport error")]
pub struct MockError;

/// Software twin of the device: account selection, the block-granular
/// data buffer, address generation, essence confirmation and per-input
/// unlock responses
pub struct MockDevice {
    /// Selected (app mode, account index)
    pub account: Option<(u8, u32)>,

    /// Block-granular buffer storage
    pub buffer: Vec<u8>,

    /// Logical buffer content length
    pub data_length: u16,

    /// Current buffer content type
    pub data_type: DataType,

    /// Kind-prefixed address bytes served on GenerateAddress
    pub address_data: Vec<u8>,

    /// Raw SignSingle response per input index
    pub sign_responses: Vec<Vec<u8>>,

    /// Whether the user approves the essence
    pub approve_essence: bool,

    /// Whether the user rejects a verified address
    pub reject_address: bool,

    /// Leave the buffer state untouched on ClearDataBuffer (stuck device)
    pub ignore_clear: bool,

    /// Recorded (p2, payload) of the last PrepareSigning
    pub prepared: Option<(u8, Vec<u8>)>,

    /// Instruction trace for ordering assertions
    pub instructions: Vec<u8>,
}

impl MockDevice {
    pub fn new(address_data: Vec<u8>, sign_responses: Vec<Vec<u8>>) -> Self {
        Self {
            account: None,
            buffer: vec![0u8; BLOCK_SIZE as usize * BLOCK_COUNT as usize],
            data_length: 0,
            data_type: DataType::Empty,
            address_data,
            sign_responses,
            approve_essence: true,
            reject_address: false,
            ignore_clear: false,
            prepared: None,
            instructions: Vec::new(),
        }
    }

    /// Bytes uploaded to the buffer, truncated to `n`
    pub fn uploaded(&self, n: usize) -> &[u8] {
        &self.buffer[..n]
    }

    /// Whether the given instruction was ever issued
    pub fn saw(&self, ins: Instruction) -> bool {
        self.instructions.contains(&(ins as u8))
    }

    fn handle(&mut self, command: &APDUCommand<Vec<u8>>) -> (Vec<u8>, u16) {
        if command.cla != STARDUST_APDU_CLA {
            return (vec![], 0x6e00);
        }

        let block_size = BLOCK_SIZE as usize;

        match command.ins {
            // GetAppConfig
            0x10 => (vec![0, 8, 7, 0, 1, 0], SW_OK),

            // SetAccount
            0x11 => {
                if command.data.len() != 4 {
                    return (vec![], SW_INCORRECT_LENGTH);
                }
                let account = u32::from_le_bytes([
                    command.data[0],
                    command.data[1],
                    command.data[2],
                    command.data[3],
                ]);
                self.account = Some((command.p1, account));
                (vec![], SW_OK)
            }

            // GetDataBufferState
            0x80 => {
                let mut resp = Vec::with_capacity(5);
                resp.extend_from_slice(&self.data_length.to_le_bytes());
                resp.push(self.data_type as u8);
                resp.push(BLOCK_SIZE);
                resp.push(BLOCK_COUNT);
                (resp, SW_OK)
            }

            // WriteDataBlock
            0x81 => {
                let block = command.p1 as usize;
                if block >= BLOCK_COUNT as usize {
                    return (vec![], SW_INCORRECT_P1P2);
                }
                // blocks must arrive padded to exactly the block size
                if command.data.len() != block_size {
                    return (vec![], SW_INCORRECT_LENGTH);
                }
                if self.data_type != DataType::Empty {
                    return (vec![], SW_COMMAND_NOT_ALLOWED);
                }

                self.buffer[block * block_size..(block + 1) * block_size]
                    .copy_from_slice(&command.data);
                self.data_length = ((block + 1) * block_size) as u16;
                (vec![], SW_OK)
            }

            // ReadDataBlock
            0x82 => {
                let block = command.p1 as usize;
                if block >= BLOCK_COUNT as usize {
                    return (vec![], SW_INCORRECT_P1P2);
                }
                (
                    self.buffer[block * block_size..(block + 1) * block_size].to_vec(),
                    SW_OK,
                )
            }

            // ClearDataBuffer
            0x83 => {
                if !self.ignore_clear {
                    self.buffer.fill(0);
                    self.data_length = 0;
                    self.data_type = DataType::Empty;
                }
                (vec![], SW_OK)
            }

            // ShowFlow
            0x90 => (vec![], SW_OK),

            // PrepareSigning
            0xa0 => {
                if self.data_length == 0 {
                    return (vec![], SW_COMMAND_NOT_ALLOWED);
                }
                self.prepared = Some((command.p2, command.data.clone()));
                self.data_type = DataType::ValidatedEssence;
                (vec![], SW_OK)
            }

            // GenerateAddress
            0xa1 => {
                if self.account.is_none() {
                    return (vec![], SW_COMMAND_NOT_ALLOWED);
                }
                if command.p1 == 1 && self.reject_address {
                    return (vec![], SW_DENIED_BY_USER);
                }

                self.buffer.fill(0);
                self.buffer[..self.address_data.len()].copy_from_slice(&self.address_data);
                self.data_length = self.address_data.len() as u16;
                self.data_type = DataType::GeneratedAddresses;
                (vec![], SW_OK)
            }

            // UserConfirmEssence
            0xa3 => {
                if self.data_type != DataType::ValidatedEssence {
                    return (vec![], SW_COMMAND_NOT_ALLOWED);
                }
                if !self.approve_essence {
                    return (vec![], SW_DENIED_BY_USER);
                }
                self.data_type = DataType::UserConfirmedEssence;
                (vec![], SW_OK)
            }

            // SignSingle
            0xa4 => {
                if self.data_type != DataType::UserConfirmedEssence {
                    return (vec![], SW_COMMAND_NOT_ALLOWED);
                }
                match self.sign_responses.get(command.p1 as usize) {
                    Some(r) => (r.clone(), SW_OK),
                    None => (vec![], SW_INCORRECT_P1P2),
                }
            }

            // Reset
            0xff => {
                self.account = None;
                self.buffer.fill(0);
                self.data_length = 0;
                self.data_type = DataType::Empty;
                self.prepared = None;
                (vec![], SW_OK)
            }

            _ => (vec![], 0x6d00),
        }
    }
}

#[async_trait]
impl Transport for MockDevice {
    type Error = MockError;

    async fn exchange(
        &mut self,
        command: &APDUCommand<Vec<u8>>,
        _timeout: Duration,
    ) -> Result<APDUAnswer<Vec<u8>>, Self::Error> {
        self.instructions.push(command.ins);

        let (mut resp, status) = self.handle(command);
        resp.extend_from_slice(&status.to_be_bytes());

        Ok(APDUAnswer::from_answer(resp).expect("mock answer framing"))
    }
}

/// A signature unlock response as produced by the device
pub fn signature_unlock_response(tag: u8) -> Vec<u8> {
    let mut r = Vec::with_capacity(98);
    r.push(UNLOCK_KIND_SIGNATURE);
    r.push(SIGNATURE_KIND_ED25519);
    r.extend_from_slice(&[tag; 32]);
    r.extend_from_slice(&[tag ^ 0xff; 64]);
    r
}

/// A reference unlock response pointing at a prior unlock
pub fn reference_unlock_response(index: u16) -> Vec<u8> {
    let mut r = Vec::with_capacity(3);
    r.push(UNLOCK_KIND_REFERENCE);
    r.extend_from_slice(&index.to_le_bytes());
    r
}

/// In-memory node client serving scripted index pages and outputs
pub struct MockNode {
    /// Successive responses to basic_output_ids; the last page repeats
    /// once exhausted
    pub pages: Vec<Vec<OutputId>>,

    /// Outputs by id
    pub outputs: HashMap<OutputId, OutputResponse>,

    cursor: Mutex<usize>,
}

impl MockNode {
    pub fn new(pages: Vec<Vec<OutputId>>, outputs: Vec<(OutputId, OutputResponse)>) -> Self {
        Self {
            pages,
            outputs: outputs.into_iter().collect(),
            cursor: Mutex::new(0),
        }
    }

    /// Number of index queries served
    pub fn queries(&self) -> usize {
        *self.cursor.lock().unwrap()
    }
}

#[async_trait]
impl NodeClient for MockNode {
    async fn basic_output_ids(&self, _address: &str) -> Result<Vec<OutputId>, NodeError> {
        let mut cursor = self.cursor.lock().unwrap();
        let page = match self.pages.get(*cursor) {
            Some(p) => p.clone(),
            None => self.pages.last().cloned().unwrap_or_default(),
        };
        *cursor += 1;
        Ok(page)
    }

    async fn output(&self, id: &OutputId) -> Result<OutputResponse, NodeError> {
        match self.outputs.get(id) {
            Some(o) => Ok(*o),
            None => Err(NodeError::NotFound(id.to_string())),
        }
    }

    async fn submit(&self, _payload: &TransactionPayload) -> Result<String, NodeError> {
        Ok("0xblock".to_string())
    }
}
