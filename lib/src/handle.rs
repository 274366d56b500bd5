// Copyright (c) 2023-2024 IOTA Stiftung

//! Handle for connected Stardust devices
//!
//! Provides the APDU request plumbing (status word decode, per-command
//! timeout classes) plus the administrative, address and data-buffer
//! operations of the application. The handle owns its [Transport]
//! exclusively; see [crate::tx] for the signing session built on top.

use std::time::Duration;

use encdec::{Decode, Encode};
use ledger_apdu::APDUCommand;
use log::debug;

use ledger_stardust_apdu::{
    account::SetAccountReq,
    address::GenerateAddressReq,
    app_config::{AppConfigReq, AppConfigResp},
    data_buffer::{
        ClearDataBufferReq, DataBufferStateReq, DataBufferStateResp, DataType, ReadDataBlockReq,
        WriteDataBlockReq,
    },
    flow::{Flow, ShowFlowReq},
    reset::ResetReq,
    status::{self, SW_DENIED_BY_USER, SW_OK},
    ApduError, ApduReq,
};

use crate::{
    currency::Currency,
    path::Bip32Path,
    transport::{Transport, TIMEOUT_CMD_NON_USER_INTERACTION, TIMEOUT_CMD_USER_INTERACTION},
    types::address_to_bech32,
    Error,
};

/// Stardust handle for a connected Ledger device.
///
/// The handle owns the underlying transport exclusively for its lifetime:
/// commands are strictly ordered and each response fully consumed before
/// the next command is issued.
pub struct DeviceHandle<T: Transport> {
    t: T,
}

/// Create a [DeviceHandle] wrapper from a type implementing [Transport]
impl<T: Transport> From<T> for DeviceHandle<T> {
    fn from(t: T) -> Self {
        Self { t }
    }
}

impl<T: Transport> DeviceHandle<T> {
    /// Create a new device handle
    pub fn new(t: T) -> Self {
        Self::from(t)
    }

    /// Access the underlying transport
    pub fn transport(&self) -> &T {
        &self.t
    }

    /// Recover the underlying transport, consuming the handle
    pub fn into_inner(self) -> T {
        self.t
    }

    /// Issue a request APDU, returning the raw response payload.
    ///
    /// Decodes non-success status words into [Error::Device] (or
    /// [Error::UserRejected] for an on-device denial); transport failures
    /// propagate raw.
    pub(crate) async fn request_raw(
        &mut self,
        req: impl ApduReq + Send,
        timeout: Duration,
    ) -> Result<Vec<u8>, Error<T::Error>> {
        let h = req.header();

        let mut data = vec![0u8; req.encode_len()?];
        req.encode(&mut data)?;

        let command = APDUCommand {
            cla: h.cla,
            ins: h.ins,
            p1: h.p1,
            p2: h.p2,
            data,
        };

        let answer = self
            .t
            .exchange(&command, timeout)
            .await
            .map_err(Error::Transport)?;

        match answer.retcode() {
            SW_OK => Ok(answer.apdu_data().to_vec()),
            SW_DENIED_BY_USER => Err(Error::UserRejected),
            code => Err(Error::Device {
                code,
                message: status::status_message(code),
            }),
        }
    }

    /// Issue a request APDU and decode the typed response
    pub(crate) async fn request<R>(
        &mut self,
        req: impl ApduReq + Send,
        timeout: Duration,
    ) -> Result<R, Error<T::Error>>
    where
        R: for<'a> Decode<'a, Output = R, Error = ApduError>,
    {
        let resp = self.request_raw(req, timeout).await?;
        let (v, _n) = R::decode(&resp)?;
        Ok(v)
    }

    /// Issue a request APDU, discarding the response payload
    pub(crate) async fn command(
        &mut self,
        req: impl ApduReq + Send,
        timeout: Duration,
    ) -> Result<(), Error<T::Error>> {
        let _ = self.request_raw(req, timeout).await?;
        Ok(())
    }

    /// Fetch application configuration / version information
    pub async fn app_config(&mut self) -> Result<AppConfigResp, Error<T::Error>> {
        debug!("Requesting app config");

        self.request::<AppConfigResp>(AppConfigReq, TIMEOUT_CMD_NON_USER_INTERACTION)
            .await
    }

    /// Select the active account for the given currency.
    ///
    /// The account index must already be hardened (see
    /// [Bip32Path::account]).
    pub async fn set_account(
        &mut self,
        currency: Currency,
        account: u32,
    ) -> Result<(), Error<T::Error>> {
        let config = currency.config();

        debug!("Setting account {:#x} (mode {})", account, config.app_mode);

        self.command(
            SetAccountReq::new(config.app_mode, account),
            TIMEOUT_CMD_NON_USER_INTERACTION,
        )
        .await
    }

    /// Generate addresses for the active account, placing them in the data
    /// buffer for readback. With `verify` set the device blocks until the
    /// user accepts or rejects the displayed address.
    pub async fn generate_address(
        &mut self,
        change: u32,
        index: u32,
        count: u32,
        verify: bool,
    ) -> Result<(), Error<T::Error>> {
        debug!("Generating {count} address(es) at {change:#x}/{index:#x} (verify: {verify})");

        let timeout = match verify {
            true => TIMEOUT_CMD_USER_INTERACTION,
            false => TIMEOUT_CMD_NON_USER_INTERACTION,
        };

        self.command(GenerateAddressReq::new(index, change, count, verify), timeout)
            .await
    }

    /// Derive and bech32-encode the address for a five-level path,
    /// optionally verifying it on-device
    pub async fn get_address(
        &mut self,
        path: &Bip32Path,
        currency: Currency,
        verify: bool,
    ) -> Result<String, Error<T::Error>> {
        self.set_account(currency, path.account()).await?;
        self.generate_address(path.change(), path.index(), 1, verify)
            .await?;

        let data = self.read_buffer().await?;
        let address = address_to_bech32(currency.config().bech32_hrp, &data)?;

        Ok(address)
    }

    /// Fetch the device data buffer state
    pub async fn buffer_state(&mut self) -> Result<DataBufferStateResp, Error<T::Error>> {
        self.request::<DataBufferStateResp>(DataBufferStateReq, TIMEOUT_CMD_NON_USER_INTERACTION)
            .await
    }

    /// Clear the device data buffer; must precede any write
    pub async fn clear_buffer(&mut self) -> Result<(), Error<T::Error>> {
        self.command(ClearDataBufferReq, TIMEOUT_CMD_NON_USER_INTERACTION)
            .await
    }

    /// Upload a byte blob to the device data buffer in fixed-size blocks.
    ///
    /// Clears the buffer first and checks the device reports it writable;
    /// the final block is zero-padded to the block size. Fails with
    /// [Error::Capacity] when the blob needs more blocks than the device
    /// provides.
    pub async fn write_buffer(&mut self, data: &[u8]) -> Result<(), Error<T::Error>> {
        self.clear_buffer().await?;

        let state = self.buffer_state().await?;

        if state.data_type != DataType::Empty {
            return Err(Error::Precondition("data buffer not empty before write"));
        }

        let block_size = state.data_block_size as usize;
        if block_size == 0 {
            return Err(Error::Precondition("device reported zero block size"));
        }

        let blocks_needed = (data.len() + block_size - 1) / block_size;
        if blocks_needed > state.data_block_count as usize {
            return Err(Error::Capacity {
                required: data.len(),
                capacity: state.capacity(),
            });
        }

        debug!("Writing {} bytes in {} blocks", data.len(), blocks_needed);

        let mut block = vec![0u8; block_size];
        for (i, chunk) in data.chunks(block_size).enumerate() {
            block[..chunk.len()].copy_from_slice(chunk);
            block[chunk.len()..].fill(0);

            // the final block write may trigger user confirmation on-device
            self.command(
                WriteDataBlockReq::new(i as u8, &block),
                TIMEOUT_CMD_USER_INTERACTION,
            )
            .await?;
        }

        Ok(())
    }

    /// Download the device-held byte blob, truncated to its logical length.
    ///
    /// The buffer is block-granular; the logical content may be shorter
    /// than the last block.
    pub async fn read_buffer(&mut self) -> Result<Vec<u8>, Error<T::Error>> {
        let state = self.buffer_state().await?;

        let block_size = state.data_block_size as usize;
        if block_size == 0 {
            return Err(Error::Precondition("device reported zero block size"));
        }

        let blocks = (state.data_length as usize + block_size - 1) / block_size;

        let mut data = Vec::with_capacity(blocks * block_size);
        for i in 0..blocks {
            let block = self
                .request_raw(ReadDataBlockReq::new(i as u8), TIMEOUT_CMD_NON_USER_INTERACTION)
                .await?;
            data.extend_from_slice(&block);
        }

        data.truncate(state.data_length as usize);

        Ok(data)
    }

    /// Show a UI flow on the device
    pub async fn show_flow(&mut self, flow: Flow) -> Result<(), Error<T::Error>> {
        self.command(ShowFlowReq::new(flow), TIMEOUT_CMD_NON_USER_INTERACTION)
            .await
    }

    /// Reset device application state
    pub async fn reset(&mut self, partial: bool) -> Result<(), Error<T::Error>> {
        self.command(ResetReq::new(partial), TIMEOUT_CMD_NON_USER_INTERACTION)
            .await
    }
}
