// Copyright (c) 2023-2024 IOTA Stiftung

//! Node / output-index boundary
//!
//! The node's core API and output indexer are external collaborators; this
//! module defines the three primitives the library consumes. REST plumbing
//! lives with the embedding application.

use async_trait::async_trait;

use crate::types::{BasicOutput, OutputId, TransactionId, TransactionPayload};

/// Errors surfaced by node client implementations
#[derive(Clone, PartialEq, Debug, thiserror::Error)]
pub enum NodeError {
    /// Output or transaction not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Node answered with a non-success status
    #[error("node returned status {0}")]
    Status(u16),

    /// Request-level failure (connectivity, timeout, malformed response)
    #[error("request failed: {0}")]
    Request(String),
}

/// Booking metadata for a ledger output
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct OutputMetadata {
    /// Transaction the output was created by
    pub transaction_id: TransactionId,

    /// Index of the output within that transaction
    pub output_index: u16,

    /// Whether the output has already been consumed
    pub is_spent: bool,

    /// Milestone timestamp the output was booked at (unix seconds)
    pub milestone_timestamp_booked: u64,
}

/// A ledger output together with its booking metadata
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct OutputResponse {
    pub output: BasicOutput,
    pub metadata: OutputMetadata,
}

/// Client boundary for the node core API and output indexer
#[async_trait]
pub trait NodeClient {
    /// Unspent basic output ids owned by a bech32 address, in indexer order
    async fn basic_output_ids(&self, address: &str) -> Result<Vec<OutputId>, NodeError>;

    /// Fetch a single output with its metadata
    async fn output(&self, id: &OutputId) -> Result<OutputResponse, NodeError>;

    /// Submit an assembled transaction payload, returning the block id
    async fn submit(&self, payload: &TransactionPayload) -> Result<String, NodeError>;
}
