// Copyright (c) 2023-2024 IOTA Stiftung

//! Application configuration APDUs

use encdec::{Decode, Encode};

use crate::{ApduError, ApduStatic, Instruction};

/// Fetch application configuration APDU
#[derive(Copy, Clone, PartialEq, Debug, Default, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct AppConfigReq;

impl ApduStatic for AppConfigReq {
    const INS: Instruction = Instruction::GetAppConfig;
}

/// Application configuration response APDU.
///
/// Contains the application version, flags and target device.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | VERSION_MAJOR | VERSION_MINOR | VERSION_PATCH |     FLAGS     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     DEVICE    |     DEBUG     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct AppConfigResp {
    /// Application major version
    pub version_major: u8,
    /// Application minor version
    pub version_minor: u8,
    /// Application patch version
    pub version_patch: u8,
    /// Application flags
    pub flags: u8,
    /// Target device identifier
    pub device: u8,
    /// Non-zero for debug builds
    pub debug: u8,
}

impl AppConfigResp {
    /// Application version as a semantic version string
    pub fn version(&self) -> String {
        format!(
            "{}.{}.{}",
            self.version_major, self.version_minor, self.version_patch
        )
    }
}
