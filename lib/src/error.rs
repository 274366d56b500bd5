// Copyright (c) 2023-2024 IOTA Stiftung

use core::fmt::{Debug, Display};

use ledger_stardust_apdu::ApduError;

use crate::currency::UnknownCurrency;
use crate::essence::EssenceError;
use crate::path::PathError;
use crate::select::SelectionError;
use crate::tx::SessionState;
use crate::types::AddressError;

/// Stardust Ledger API error type
///
/// Errors are raised at the point of detection and propagate unhandled to
/// the caller; nothing is retried automatically. [Error::UserRejected] and
/// [Error::Selection] must stay distinguishable from transport failures so
/// a calling UI can offer "retry" versus "edit transaction".
#[derive(Debug, thiserror::Error)]
pub enum Error<E: Display + Debug> {
    /// Transport error, propagated raw
    #[error("Transport error: {0}")]
    Transport(E),

    /// Non-success status word from the device, with decoded message
    #[error("Device error 0x{code:04x}: {message}")]
    Device { code: u16, message: &'static str },

    /// User declined an on-device prompt
    #[error("Operation rejected by user")]
    UserRejected,

    /// Operation attempted against invalid device or host state
    #[error("Precondition violated: {0}")]
    Precondition(&'static str),

    /// Signing session operation out of order
    #[error("Invalid session state (actual: {0}, expected: {1})")]
    InvalidState(SessionState, SessionState),

    /// Payload exceeds the device data buffer capacity
    #[error("Payload of {required} bytes exceeds device buffer capacity of {capacity}")]
    Capacity { required: usize, capacity: usize },

    /// Unexpected discriminator in a device response, indicates a
    /// firmware / host protocol mismatch
    #[error("Unrecognised response variant 0x{0:02x}")]
    InvalidVariant(u8),

    /// Input selection failed
    #[error("Input selection failed: {0}")]
    Selection(#[from] SelectionError),

    /// Essence construction failed
    #[error("Essence construction failed: {0}")]
    Essence(#[from] EssenceError),

    /// Unmapped currency identifier
    #[error(transparent)]
    UnsupportedCurrency(#[from] UnknownCurrency),

    /// Derivation path invalid
    #[error("Invalid derivation path: {0}")]
    InvalidPath(#[from] PathError),

    /// Address encode / decode failure
    #[error("Address handling failed: {0}")]
    Address(#[from] AddressError),

    /// APDU encode / decode failure
    #[error("APDU codec error: {0}")]
    Apdu(ApduError),
}

impl<E: Display + Debug> From<ApduError> for Error<E> {
    fn from(e: ApduError) -> Self {
        match e {
            ApduError::InvalidVariant(v) => Error::InvalidVariant(v),
            e => Error::Apdu(e),
        }
    }
}
