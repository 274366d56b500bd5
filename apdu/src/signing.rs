// Copyright (c) 2023-2024 IOTA Stiftung

//! Signing APDUs
//!
//! Signing runs against an essence previously uploaded through the data
//! buffer: [`PrepareSigningReq`] declares the remainder output (if any),
//! [`UserConfirmEssenceReq`] blocks on user approval, and one
//! [`SignSingleReq`] per input fetches a signature or back-reference
//! [`Unlock`].

use encdec::{Decode, DecodeOwned, Encode};

use crate::{ApduError, ApduStatic, Instruction};

/// Ed25519 public key length in bytes
pub const ED25519_PUBLIC_KEY_LENGTH: usize = 32;

/// Ed25519 signature length in bytes
pub const ED25519_SIGNATURE_LENGTH: usize = 64;

/// Unlock kind discriminator for signature unlocks
pub const UNLOCK_KIND_SIGNATURE: u8 = 0x00;

/// Unlock kind discriminator for reference unlocks
pub const UNLOCK_KIND_REFERENCE: u8 = 0x01;

/// Signature scheme discriminator for ed25519 signatures
pub const SIGNATURE_KIND_ED25519: u8 = 0x00;

/// Prepare signing APDU.
///
/// Declares which output index (if any) is a remainder back to the
/// signer's own address, and the derivation indices that produced it.
/// Zeroed fields with the P2 flag clear mean no remainder.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |        REMAINDER_INDEX        |     REMAINDER_BIP32_INDEX     :
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// :  (u32, cont.)                 |     REMAINDER_BIP32_CHANGE    :
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// :  (u32, cont.)                 |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct PrepareSigningReq {
    /// Index of the remainder output within the essence outputs
    pub remainder_index: u16,

    /// BIP32 address index of the remainder address (hardened)
    pub remainder_bip32_index: u32,

    /// BIP32 change level of the remainder address (hardened)
    pub remainder_bip32_change: u32,

    /// Whether the essence carries a remainder output
    pub has_remainder: bool,
}

impl PrepareSigningReq {
    /// Prepare signing for an essence with a remainder output
    pub fn with_remainder(
        remainder_index: u16,
        remainder_bip32_index: u32,
        remainder_bip32_change: u32,
    ) -> Self {
        Self {
            remainder_index,
            remainder_bip32_index,
            remainder_bip32_change,
            has_remainder: true,
        }
    }

    /// Prepare signing for an essence without a remainder
    pub fn no_remainder() -> Self {
        Self {
            remainder_index: 0,
            remainder_bip32_index: 0,
            remainder_bip32_change: 0,
            has_remainder: false,
        }
    }
}

impl ApduStatic for PrepareSigningReq {
    const INS: Instruction = Instruction::PrepareSigning;

    fn p1(&self) -> u8 {
        1
    }

    fn p2(&self) -> u8 {
        self.has_remainder as u8
    }
}

impl Encode for PrepareSigningReq {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(10)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        if buff.len() < 10 {
            return Err(ApduError::InvalidLength);
        }

        buff[..2].copy_from_slice(&self.remainder_index.to_le_bytes());
        buff[2..6].copy_from_slice(&self.remainder_bip32_index.to_le_bytes());
        buff[6..10].copy_from_slice(&self.remainder_bip32_change.to_le_bytes());

        Ok(10)
    }
}

/// User confirm essence APDU.
///
/// Triggers on-device display of the uploaded essence and blocks until
/// the user accepts or rejects it. Rejection surfaces as a denied status
/// word and aborts the session.
#[derive(Copy, Clone, PartialEq, Debug, Default, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct UserConfirmEssenceReq;

impl ApduStatic for UserConfirmEssenceReq {
    const INS: Instruction = Instruction::UserConfirmEssence;
}

/// Sign single input APDU, input index in P1, answered with an [`Unlock`]
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SignSingleReq {
    /// Input index within the essence
    pub input: u8,
}

impl SignSingleReq {
    /// Create a new [`SignSingleReq`] request
    pub fn new(input: u8) -> Self {
        Self { input }
    }
}

impl ApduStatic for SignSingleReq {
    const INS: Instruction = Instruction::SignSingle;

    fn p1(&self) -> u8 {
        self.input
    }
}

impl Encode for SignSingleReq {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(0)
    }

    fn encode(&self, _buff: &mut [u8]) -> Result<usize, ApduError> {
        Ok(0)
    }
}

/// Unlock authorising the consumption of one input, discriminated by the
/// leading byte of the response. The discriminator values are firmware
/// defined and must match exactly; anything else is a fatal protocol
/// mismatch.
///
/// ## Encoding:
/// ```text
/// Signature unlock:
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+- ~ -+-+-+-+-+- ~ -+-+-+-+
/// |      0x00     |      0x00     |  PUBLIC_KEY  |    SIGNATURE    |
/// |  UNLOCK_KIND  |   SIG_KIND    |  (32 bytes)  |    (64 bytes)   |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+- ~ -+-+-+-+-+- ~ -+-+-+-+
///
/// Reference unlock:
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |      0x01     |        UNLOCK_INDEX (u16)      |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug)]
pub enum Unlock {
    /// Ed25519 signature over the essence digest
    Signature {
        public_key: [u8; ED25519_PUBLIC_KEY_LENGTH],
        signature: [u8; ED25519_SIGNATURE_LENGTH],
    },

    /// Back-reference to a prior unlock by the same address
    Reference { index: u16 },
}

impl Encode for Unlock {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        match self {
            Unlock::Signature { .. } => {
                Ok(2 + ED25519_PUBLIC_KEY_LENGTH + ED25519_SIGNATURE_LENGTH)
            }
            Unlock::Reference { .. } => Ok(3),
        }
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let n = self.encode_len()?;
        if buff.len() < n {
            return Err(ApduError::InvalidLength);
        }

        match self {
            Unlock::Signature {
                public_key,
                signature,
            } => {
                buff[0] = UNLOCK_KIND_SIGNATURE;
                buff[1] = SIGNATURE_KIND_ED25519;
                buff[2..34].copy_from_slice(public_key);
                buff[34..98].copy_from_slice(signature);
            }
            Unlock::Reference { index } => {
                buff[0] = UNLOCK_KIND_REFERENCE;
                buff[1..3].copy_from_slice(&index.to_le_bytes());
            }
        }

        Ok(n)
    }
}

impl DecodeOwned for Unlock {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), ApduError> {
        if buff.is_empty() {
            return Err(ApduError::InvalidLength);
        }

        match buff[0] {
            UNLOCK_KIND_SIGNATURE => {
                if buff.len() < 2 + ED25519_PUBLIC_KEY_LENGTH + ED25519_SIGNATURE_LENGTH {
                    return Err(ApduError::InvalidLength);
                }
                if buff[1] != SIGNATURE_KIND_ED25519 {
                    return Err(ApduError::InvalidEncoding);
                }

                let mut public_key = [0u8; ED25519_PUBLIC_KEY_LENGTH];
                public_key.copy_from_slice(&buff[2..34]);

                let mut signature = [0u8; ED25519_SIGNATURE_LENGTH];
                signature.copy_from_slice(&buff[34..98]);

                Ok((
                    Unlock::Signature {
                        public_key,
                        signature,
                    },
                    98,
                ))
            }
            UNLOCK_KIND_REFERENCE => {
                if buff.len() < 3 {
                    return Err(ApduError::InvalidLength);
                }

                let index = u16::from_le_bytes([buff[1], buff[2]]);

                Ok((Unlock::Reference { index }, 3))
            }
            v => Err(ApduError::InvalidVariant(v)),
        }
    }
}
