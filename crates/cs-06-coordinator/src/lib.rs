//! # cs-06-coordinator
//!
//! Runs a whole simulation.
//!
//! ## Architecture
//!
//! ```text
//!   SimConfig ──► generators ──► transactions (time-ordered)
//!                            └─► proposals    (time-ordered, 1 or 2 streams)
//!
//!   Coordinator::run
//!     loop: earlier of next tx / next proposal (proposal wins ties)
//!       tx        → source node learns it, broadcasts
//!       proposal  → pick proposer (BitcoinNG micro: current leader)
//!                   node.propose → global view ← same block
//!                   broadcast, stamp main-chain arrivals, finalize
//!     end:  every node drains its inbox
//!
//!   Coordinator::report ──► SimulationReport (serde)
//! ```
//!
//! All randomness comes from one `ChaCha8Rng` seeded by `SimConfig::seed`,
//! so equal configurations yield equal reports.

pub mod config;
pub mod domain;
pub mod error;

pub use config::{ConfigError, SimConfig, TransactionDataset};
pub use domain::*;
pub use error::{CoordinatorError, CoordinatorResult};
