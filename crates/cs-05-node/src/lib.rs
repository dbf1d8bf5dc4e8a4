//! # cs-05-node
//!
//! One simulated participant.
//!
//! ## Architecture
//!
//! ```text
//!   receive_and_buffer(msg) ──► Inbox (min-heap on deliver_at)
//!                                   │
//!   process_buffer(cutoff) ◄────────┘
//!        ├── Transaction ──► PendingQueue (generation order)
//!        └── Block ──► ForkChoiceAlgorithm::insert_block
//!                          ├── Inserted
//!                          └── Orphan ──► OrphanPool ──► retry to fixpoint
//!
//!   propose(proposal) = process_buffer(proposal.timestamp)
//!                     + select txs not on any main chain
//!                     + ForkChoiceAlgorithm::add_block
//!
//!   broadcast(payload) ──► one Envelope per neighbor, deliver_at += delay(size)
//! ```
//!
//! Nodes never relay what they receive; every message reaches exactly the
//! neighbors of its sender.

pub mod domain;
pub mod error;
pub mod metrics;

pub use domain::*;
pub use error::{NodeError, NodeResult};
