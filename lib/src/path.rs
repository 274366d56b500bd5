// Copyright (c) 2023-2024 IOTA Stiftung

//! BIP32 derivation path handling
//!
//! Stardust derivations use exactly five levels
//! (purpose / coin type / account / change / index), all hardened.

use core::fmt;
use core::str::FromStr;

/// Hardened derivation flag
pub const HARDENED: u32 = 0x8000_0000;

/// Number of levels in a Stardust derivation path
pub const PATH_LEVELS: usize = 5;

/// Derivation path errors
#[derive(Clone, PartialEq, Debug, thiserror::Error)]
pub enum PathError {
    /// Wrong number of levels
    #[error("invalid path length: {0} (expected {PATH_LEVELS} levels)")]
    Length(usize),

    /// Unparseable segment
    #[error("invalid path segment: '{0}'")]
    Segment(String),
}

/// Five-level BIP32 derivation path.
///
/// Segments given as bare zero are promoted to hardened zero; other
/// segments are passed through unchanged.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Bip32Path([u32; PATH_LEVELS]);

impl Bip32Path {
    /// Build a path from raw segments, promoting bare zeros to hardened
    pub fn new(segments: [u32; PATH_LEVELS]) -> Self {
        let mut s = segments;
        for v in s.iter_mut() {
            if *v == 0 {
                *v = HARDENED;
            }
        }
        Self(s)
    }

    /// Raw path segments
    pub fn segments(&self) -> &[u32; PATH_LEVELS] {
        &self.0
    }

    /// Account level
    pub fn account(&self) -> u32 {
        self.0[2]
    }

    /// Change level
    pub fn change(&self) -> u32 {
        self.0[3]
    }

    /// Address index level
    pub fn index(&self) -> u32 {
        self.0[4]
    }
}

impl FromStr for Bip32Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim_start_matches("m/");

        let mut segments = [0u32; PATH_LEVELS];
        let mut count = 0;

        for part in s.split('/') {
            if count >= PATH_LEVELS {
                return Err(PathError::Length(count + 1));
            }

            let (value, hardened) = if let Some(v) = part.strip_suffix('\'') {
                (v, true)
            } else if let Some(v) = part.strip_suffix('h') {
                (v, true)
            } else {
                (part, false)
            };

            let v = value
                .parse::<u32>()
                .map_err(|_| PathError::Segment(part.to_string()))?;

            if hardened && v >= HARDENED {
                return Err(PathError::Segment(part.to_string()));
            }

            segments[count] = match hardened {
                true => v | HARDENED,
                false => v,
            };
            count += 1;
        }

        if count != PATH_LEVELS {
            return Err(PathError::Length(count));
        }

        Ok(Self::new(segments))
    }
}

impl fmt::Display for Bip32Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i != 0 {
                write!(f, "/")?;
            }
            match v & HARDENED {
                0 => write!(f, "{v}")?,
                _ => write!(f, "{}'", v & !HARDENED)?,
            }
        }
        Ok(())
    }
}
