// Copyright (c) 2023-2024 IOTA Stiftung

//! Transport abstraction for Stardust hardware wallets
//!
//! The physical channel (HID, TCP to a simulator, etc.) is an injected
//! collaborator; this module only defines the contract the library
//! consumes: a single send primitive with a per-command exchange timeout.

use core::fmt::{Debug, Display};
use std::time::Duration;

use async_trait::async_trait;

pub use ledger_apdu::{APDUAnswer, APDUCommand};

/// Exchange timeout for commands with no user interaction
pub const TIMEOUT_CMD_NON_USER_INTERACTION: Duration = Duration::from_secs(10);

/// Exchange timeout for commands blocking on user interaction on-device
pub const TIMEOUT_CMD_USER_INTERACTION: Duration = Duration::from_secs(150);

/// Transport for exchanging APDUs with a device.
///
/// A transport is owned exclusively by one [DeviceHandle][crate::DeviceHandle]
/// for its lifetime. The device's buffer state is global per physical
/// device, so a second concurrent session against the same device corrupts
/// state; `&mut self` keeps commands strictly ordered.
#[async_trait]
pub trait Transport {
    /// Transport-level error type
    type Error: Display + Debug + Send + Sync + 'static;

    /// Exchange one command with the device, bounding the wait to `timeout`.
    ///
    /// Interactive commands (address verification, essence confirmation)
    /// require materially longer timeouts than administrative ones; callers
    /// pass the appropriate class per command.
    async fn exchange(
        &mut self,
        command: &APDUCommand<Vec<u8>>,
        timeout: Duration,
    ) -> Result<APDUAnswer<Vec<u8>>, Self::Error>;
}
