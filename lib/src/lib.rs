// Copyright (c) 2023-2024 IOTA Stiftung

//! Stardust (IOTA / Shimmer) Ledger API library
//!
//! Host-side support for driving the Stardust hardware wallet application:
//! APDU exchange over an injected [Transport], the block-granular data
//! buffer protocol, address derivation, UTXO input selection against a
//! [client::NodeClient], canonical transaction essence serialization, and
//! the signing session producing one [apdu::signing::Unlock] per input.
//!
//! The device conversation is strictly sequential: one session object owns
//! one transport for its lifetime and no two commands are ever in flight
//! concurrently.

/// Re-export `ledger-stardust-apdu` for consumers
pub use ledger_stardust_apdu as apdu;

pub mod transport;
pub use transport::Transport;

mod handle;
pub use handle::DeviceHandle;

mod error;
pub use error::Error;

pub mod client;
pub mod currency;
pub mod essence;
pub mod operation;
pub mod path;
pub mod select;
pub mod tx;
pub mod types;
