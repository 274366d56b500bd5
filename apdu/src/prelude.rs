// Copyright (c) 2023-2024 IOTA Stiftung

//! Common APDU types for consumer use

pub use crate::account::{AppMode, SetAccountReq};
pub use crate::address::GenerateAddressReq;
pub use crate::app_config::{AppConfigReq, AppConfigResp};
pub use crate::data_buffer::{
    ClearDataBufferReq, DataBufferStateReq, DataBufferStateResp, DataType, ReadDataBlockReq,
    WriteDataBlockReq,
};
pub use crate::flow::{Flow, ShowFlowReq};
pub use crate::reset::ResetReq;
pub use crate::signing::{
    PrepareSigningReq, SignSingleReq, Unlock, UserConfirmEssenceReq, ED25519_PUBLIC_KEY_LENGTH,
    ED25519_SIGNATURE_LENGTH, SIGNATURE_KIND_ED25519, UNLOCK_KIND_REFERENCE, UNLOCK_KIND_SIGNATURE,
};
pub use crate::{ApduError, ApduHeader, ApduReq, ApduStatic, Instruction, STARDUST_APDU_CLA};
