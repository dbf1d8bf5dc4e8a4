//! # cs-01-block-tree
//!
//! Block tree arena for the consensus simulator.
//!
//! ## Architecture
//!
//! A [`BlockTree`] owns every block reachable from its genesis root. Blocks
//! live in an arena indexed by insertion position, with a bidirectional
//! `BlockId <-> index` map, parent/children adjacency and a per-depth index.
//! Trees only grow: blocks are never removed.
//!
//! ```text
//!   insert_by_parent(parent, block)      caller already resolved the parent
//!   insert_by_parent_id(block)           parent looked up from block.parent_id
//!          │
//!          ├── Linkage::Inserted  → depth = depth(parent) + 1
//!          └── Linkage::Orphan    → no mutation, block handed back
//!                                      │
//!                                      ↓
//!                             OrphanPool (retry to fixpoint)
//! ```
//!
//! ## Invariants
//!
//! - `depth(genesis) == 0` and `depth(b) == depth(parent(b)) + 1`
//! - ids are unique within one tree
//! - a block's parent is present before the block is linked
//!
//! ## Usage
//!
//! ```rust
//! use cs_01_block_tree::{BlockTree, Linkage, OrphanPool};
//! use shared_types::{Block, BlockId, BlockType};
//!
//! let mut tree = BlockTree::new();
//! let mut orphans = OrphanPool::new();
//!
//! let a = BlockId::from_u128(1);
//! let b = BlockId::from_u128(2);
//!
//! // b arrives before its parent a
//! let early = Block::new(b, Some(a), BlockType::Tree, 2.0);
//! if let Linkage::Orphan(block) = tree.insert_by_parent_id(early).unwrap() {
//!     orphans.push(block);
//! }
//! tree.insert_by_parent_id(Block::new(a, Some(BlockId::GENESIS), BlockType::Tree, 1.0)).unwrap();
//! orphans.resolve_into(&mut tree);
//!
//! assert_eq!(tree.depth_of(&b), Some(2));
//! ```

pub mod domain;
pub mod metrics;

pub use domain::{BlockTree, Linkage, OrphanPool, Resolution, TreeError, TreeResult};
