// Copyright (c) 2023-2024 IOTA Stiftung

//! Application reset APDU

use encdec::Encode;

use crate::{ApduError, ApduStatic, Instruction};

/// Reset application state, partial flag in P1.
///
/// A partial reset clears the transaction state while keeping the active
/// account; a full reset returns the application to its initial state.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ResetReq {
    /// Keep the active account selection
    pub partial: bool,
}

impl ResetReq {
    /// Create a new [`ResetReq`] request
    pub fn new(partial: bool) -> Self {
        Self { partial }
    }
}

impl ApduStatic for ResetReq {
    const INS: Instruction = Instruction::Reset;

    fn p1(&self) -> u8 {
        self.partial as u8
    }
}

impl Encode for ResetReq {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(0)
    }

    fn encode(&self, _buff: &mut [u8]) -> Result<usize, ApduError> {
        Ok(0)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ApduReq;

    #[test]
    fn reset_apdu() {
        assert_eq!(ResetReq::new(true).header().p1, 1);
        assert_eq!(ResetReq::new(false).header().p1, 0);
    }
}
