//! Coordinator domain

pub mod coordinator;
pub mod generators;
pub mod report;
pub mod topology;

pub use coordinator::*;
pub use generators::{generate_proposals, generate_transactions, Arrival};
pub use report::{BlockRecord, SimulationReport, TransactionRecord};
pub use topology::connect_complete;
