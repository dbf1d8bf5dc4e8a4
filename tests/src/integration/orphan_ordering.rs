//! # Out-of-Order Delivery
//!
//! Blocks reach a node in whatever order the per-edge delays produce. A
//! block whose parent or references are missing is buffered as an orphan
//! and retried until nothing more links. Whatever the arrival order, the
//! final tree must be the same.

#[cfg(test)]
mod tests {
    use cs_01_block_tree::{BlockTree, Linkage, OrphanPool};
    use cs_02_fork_choice::{ForkChoiceAlgorithm, ForkChoiceKind, ForkChoiceParams};
    use cs_05_node::{Node, NodeConfig};
    use shared_types::{Block, BlockId, BlockType, Message, NodeId, Payload};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn id(n: u128) -> BlockId {
        BlockId::from_u128(n)
    }

    /// genesis -> a -> b -> c
    fn chain_blocks() -> [Block; 3] {
        [
            Block::new(id(1), Some(BlockId::GENESIS), BlockType::Tree, 1.0),
            Block::new(id(2), Some(id(1)), BlockType::Tree, 2.0),
            Block::new(id(3), Some(id(2)), BlockType::Tree, 3.0),
        ]
    }

    const ORDERS: [[usize; 3]; 3] = [[0, 1, 2], [2, 1, 0], [1, 2, 0]];

    fn node(kind: ForkChoiceKind) -> Node {
        Node::new(
            NodeId(0),
            NodeConfig::default(),
            ForkChoiceAlgorithm::new(kind, &ForkChoiceParams::default()),
        )
    }

    fn deliver(node: &mut Node, blocks: impl IntoIterator<Item = Block>) {
        for block in blocks {
            node.receive_and_buffer(Message {
                deliver_at: 5.0,
                sender: NodeId(1),
                payload: Payload::Block(block),
            });
        }
    }

    /// `(id, parent, depth)` of every non-genesis block, sorted by id.
    fn shape(blocks: impl Iterator<Item = Block>) -> Vec<(BlockId, Option<BlockId>, u64)> {
        let mut shape: Vec<_> = blocks
            .filter(|b| !b.is_genesis())
            .map(|b| (b.id, b.parent_id, b.depth))
            .collect();
        shape.sort();
        shape
    }

    // =============================================================================
    // TREE-LEVEL FIXPOINT
    // =============================================================================

    #[test]
    fn test_tree_shape_independent_of_arrival_order() {
        let expected = vec![
            (id(1), Some(BlockId::GENESIS), 1),
            (id(2), Some(id(1)), 2),
            (id(3), Some(id(2)), 3),
        ];

        for order in ORDERS {
            let blocks = chain_blocks();
            let mut tree = BlockTree::new();
            let mut orphans = OrphanPool::new();
            for i in order {
                match tree.insert_by_parent_id(blocks[i].clone()).unwrap() {
                    Linkage::Inserted { .. } => {
                        orphans.resolve_into(&mut tree);
                    }
                    Linkage::Orphan(block) => {
                        orphans.push(block);
                    }
                }
            }

            assert!(orphans.is_empty(), "order {order:?} left orphans");
            assert_eq!(shape(tree.iter().cloned()), expected, "order {order:?}");
            assert_eq!(tree.path_to_root(&id(3)).unwrap(), vec![BlockId::GENESIS, id(1), id(2), id(3)]);
        }
    }

    // =============================================================================
    // NODE-LEVEL DELIVERY
    // =============================================================================

    #[test]
    fn test_node_converges_for_every_delivery_order() {
        let mut shapes = Vec::new();
        for order in ORDERS {
            let blocks = chain_blocks();
            let mut node = node(ForkChoiceKind::LongestChain);
            deliver(&mut node, order.iter().map(|&i| blocks[i].clone()));

            let stats = node.drain().unwrap();
            assert_eq!(stats.delivered, 3);
            assert_eq!(stats.blocks_linked + stats.orphans_resolved, 3);
            assert_eq!(node.orphans_outstanding(), 0);
            assert_eq!(node.algorithm().fork_choice_rule(), vec![id(3)]);
            shapes.push(shape(node.algorithm().blocks().cloned()));
        }
        assert!(shapes.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[test]
    fn test_messages_not_due_stay_buffered() {
        let [a, b, _] = chain_blocks();
        let mut node = node(ForkChoiceKind::Ghost);
        node.receive_and_buffer(Message {
            deliver_at: 10.0,
            sender: NodeId(1),
            payload: Payload::Block(a),
        });
        deliver(&mut node, [b]);

        let early = node.process_buffer(5.0).unwrap();
        assert_eq!(early.orphaned, 1);
        assert_eq!(node.orphan_ids(), vec![id(2)]);
        assert_eq!(node.inbox_len(), 1);

        let late = node.process_buffer(10.0).unwrap();
        assert_eq!(late.blocks_linked, 1);
        assert_eq!(late.orphans_resolved, 1);
        assert_eq!(node.orphans_outstanding(), 0);
        assert_eq!(node.algorithm().head_depth(), 2);
    }

    #[test]
    fn test_prism_vote_waits_for_voted_proposer_block() {
        let proposer = Block::new(id(1), Some(BlockId::GENESIS), BlockType::Proposer, 1.0);
        let vote = Block::new(id(10), Some(BlockId::GENESIS), BlockType::Voter { chain: 0 }, 2.0)
            .with_references(vec![id(1)]);

        let mut node = node(ForkChoiceKind::Prism);
        deliver(&mut node, [vote, proposer]);
        let stats = node.drain().unwrap();

        assert_eq!(stats.orphaned, 1);
        assert_eq!(stats.orphans_resolved, 1);
        assert_eq!(
            node.algorithm().main_chains()[0],
            vec![BlockId::GENESIS, id(10), id(1)]
        );
    }

    #[test]
    fn test_conflux_reference_waits_for_referenced_block() {
        // b extends a and also references the sibling fork c.
        let a = Block::new(id(1), Some(BlockId::GENESIS), BlockType::Tree, 1.0);
        let c = Block::new(id(3), Some(BlockId::GENESIS), BlockType::Tree, 1.5);
        let b = Block::new(id(2), Some(id(1)), BlockType::Tree, 2.0).with_references(vec![id(3)]);

        let mut node = node(ForkChoiceKind::Conflux);
        deliver(&mut node, [a, b, c]);
        let stats = node.drain().unwrap();

        assert_eq!(stats.orphaned, 1);
        assert_eq!(node.orphans_outstanding(), 0);
        let chain = &node.algorithm().main_chains()[0];
        assert_eq!(chain.len(), 4);
        assert_eq!(chain.last(), Some(&id(2)));
        assert!(chain.contains(&id(3)));
    }

    #[test]
    fn test_pool_reference_waits_for_pool_block() {
        let pool = Block::new(id(1), None, BlockType::Pool, 1.0);
        let tree = Block::new(id(2), Some(BlockId::GENESIS), BlockType::Tree, 2.0)
            .with_references(vec![id(1)]);

        let mut node = node(ForkChoiceKind::LongestChainWithPool);
        deliver(&mut node, [tree, pool]);
        node.drain().unwrap();

        assert_eq!(node.orphans_outstanding(), 0);
        assert_eq!(
            node.algorithm().main_chains()[0],
            vec![BlockId::GENESIS, id(1), id(2)]
        );
    }
}
