//! # Network Messages
//!
//! What nodes exchange over the simulated network. A [`Message`] is stamped
//! with the simulated time it becomes visible to its receiver; the sender
//! computes that time from its latency model when broadcasting.

use crate::entities::{Block, NodeId, SimTime, TxId};
use serde::{Deserialize, Serialize};

/// Content carried by a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Payload {
    /// Gossip of a transaction generated at `timestamp`.
    Transaction { id: TxId, timestamp: SimTime },
    /// A freshly proposed block.
    Block(Block),
}

impl Payload {
    /// Size on the wire for latency purposes.
    pub fn size_bytes(&self, header_bytes: u64, tx_size_bytes: u64) -> u64 {
        match self {
            Payload::Transaction { .. } => tx_size_bytes,
            Payload::Block(block) => block.size_bytes(header_bytes, tx_size_bytes),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Payload::Transaction { .. } => "transaction",
            Payload::Block(_) => "block",
        }
    }
}

/// A payload in flight, due at `deliver_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub deliver_at: SimTime,
    pub sender: NodeId,
    pub payload: Payload,
}

/// A message addressed to one neighbor.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub to: NodeId,
    pub message: Message,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{BlockId, BlockType};

    #[test]
    fn test_payload_sizes() {
        let tx = Payload::Transaction {
            id: TxId::from_u128(1),
            timestamp: 0.0,
        };
        assert_eq!(tx.size_bytes(80, 250), 250);

        let block = Block::new(BlockId::from_u128(5), Some(BlockId::GENESIS), BlockType::Tree, 1.0)
            .with_transactions(vec![TxId::from_u128(1); 4]);
        assert_eq!(Payload::Block(block).size_bytes(80, 250), 1080);
    }
}
