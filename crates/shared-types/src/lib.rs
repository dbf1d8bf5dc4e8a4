//! # Shared Types Crate
//!
//! This crate contains the simulation entities (blocks, transactions,
//! proposals) and the message envelope nodes exchange over the simulated
//! network.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: all cross-crate types are defined here.
//! - **Identity by key**: blocks and transactions are always referred to by
//!   their immutable [`BlockId`] / [`TxId`], never by reference identity.
//! - **Explicit time**: simulation time is a plain [`SimTime`] value passed
//!   down the call chain. There is no ambient clock.

pub mod entities;
pub mod messages;

pub use entities::*;
pub use messages::*;
