//! # Consensus Core Properties
//!
//! Behaviour every fork-choice variant and the finality analysis must show,
//! checked through the public APIs of the core crates:
//!
//! 1. Parent links and cached depths agree in every tree after a full run
//! 2. Longest-Chain reports every deepest block as a head
//! 3. GHOST follows the heaviest subtree at every fork
//! 4. The common prefix stops where main chains diverge
//! 5. Finalization depth never grows as epsilon loosens
//! 6. Prism splices winning votes before the proposer block they elect
//! 7. Pool blocks are spliced before the tree block that references them

#[cfg(test)]
mod tests {
    use cs_02_fork_choice::{
        common_prefix, BlockTemplate, ForkChoiceAlgorithm, ForkChoiceKind, ForkChoiceParams, Prism,
    };
    use cs_03_finality::compute_finalization_depth;
    use cs_04_network_model::NetworkModel;
    use cs_06_coordinator::{Coordinator, SimConfig};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use shared_types::{Block, BlockId, BlockType, ProposalType};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const ALL_PROTOCOLS: [ForkChoiceKind; 6] = [
        ForkChoiceKind::LongestChain,
        ForkChoiceKind::Ghost,
        ForkChoiceKind::Prism,
        ForkChoiceKind::Conflux,
        ForkChoiceKind::BitcoinNg,
        ForkChoiceKind::LongestChainWithPool,
    ];

    fn id(n: u128) -> BlockId {
        BlockId::from_u128(n)
    }

    fn tree_block(n: u128, parent: BlockId) -> Block {
        Block::new(id(n), Some(parent), BlockType::Tree, n as f64)
    }

    fn algorithm(kind: ForkChoiceKind) -> ForkChoiceAlgorithm {
        ForkChoiceAlgorithm::new(kind, &ForkChoiceParams::default())
    }

    fn link(algorithm: &mut ForkChoiceAlgorithm, block: Block) {
        let admission = algorithm.insert_block(block).unwrap();
        assert!(admission.is_inserted());
    }

    fn busy_config(kind: ForkChoiceKind, seed: u64) -> SimConfig {
        SimConfig {
            num_nodes: 6,
            fork_choice_rule: kind,
            proposal_rate: 0.5,
            secondary_proposal_rate: kind.secondary_proposal().map(|_| 1.0),
            transaction_rate: 2.0,
            duration: 60.0,
            network_model: NetworkModel::DeckerWattenhofer,
            prism_voter_chains: 3,
            seed,
            ..SimConfig::default()
        }
    }

    fn assert_depths_consistent(algorithm: &ForkChoiceAlgorithm) {
        let genesis = algorithm.lookup(&BlockId::GENESIS).unwrap();
        assert_eq!(genesis.depth, 0);

        for block in algorithm.blocks() {
            let Some(parent_id) = block.parent_id else {
                assert_eq!(block.block_type, BlockType::Pool, "only pool blocks lack a parent");
                continue;
            };
            let parent = algorithm.lookup(&parent_id).unwrap();
            assert_eq!(
                block.depth,
                parent.depth + 1,
                "{} block {} at depth {} under parent at depth {}",
                algorithm.name(),
                block.id,
                block.depth,
                parent.depth
            );
        }
    }

    // =============================================================================
    // TREE AND FORK-CHOICE PROPERTIES
    // =============================================================================

    #[test]
    fn test_depth_invariant_holds_after_full_runs() {
        for kind in ALL_PROTOCOLS {
            let mut coordinator = Coordinator::new(busy_config(kind, 5)).unwrap();
            coordinator.run().unwrap();

            assert!(coordinator.global().blocks().count() > 0, "{kind} produced no blocks");
            assert_depths_consistent(coordinator.global());
            for node in coordinator.nodes() {
                assert_depths_consistent(node.algorithm());
            }
        }
    }

    #[test]
    fn test_longest_chain_reports_all_deepest_blocks() {
        // genesis -> a
        // genesis -> b -> c
        //              -> d
        let mut chain = algorithm(ForkChoiceKind::LongestChain);
        link(&mut chain, tree_block(1, BlockId::GENESIS));
        link(&mut chain, tree_block(2, BlockId::GENESIS));
        link(&mut chain, tree_block(3, id(2)));
        link(&mut chain, tree_block(4, id(2)));

        let mut heads = chain.fork_choice_rule();
        heads.sort();
        assert_eq!(heads, vec![id(3), id(4)]);
        assert_eq!(chain.main_chains().len(), 2);
        assert_eq!(chain.common_prefix(), vec![BlockId::GENESIS, id(2)]);
    }

    #[test]
    fn test_ghost_follows_heaviest_branch_at_every_fork() {
        // genesis -> a -> a1 -> a2      (a: 4 descendants)
        //                    -> a3
        //              -> a4
        //         -> b -> b1            (b: 1 descendant)
        let mut ghost = algorithm(ForkChoiceKind::Ghost);
        link(&mut ghost, tree_block(1, BlockId::GENESIS));
        link(&mut ghost, tree_block(11, id(1)));
        link(&mut ghost, tree_block(12, id(11)));
        link(&mut ghost, tree_block(13, id(11)));
        link(&mut ghost, tree_block(14, id(1)));
        link(&mut ghost, tree_block(2, BlockId::GENESIS));
        link(&mut ghost, tree_block(21, id(2)));

        let mut heads = ghost.fork_choice_rule();
        heads.sort();
        assert_eq!(heads, vec![id(12), id(13)]);
        for chain in ghost.main_chains() {
            assert_eq!(&chain[..3], &[BlockId::GENESIS, id(1), id(11)]);
        }
    }

    #[test]
    fn test_ghost_prefers_weight_over_length() {
        // genesis -> a -> a1 -> a2 -> a3   (a: 3 descendants, depth 4)
        //         -> b -> b1, b2, b3, b4   (b: 4 descendants, depth 2)
        let mut ghost = algorithm(ForkChoiceKind::Ghost);
        let mut longest = algorithm(ForkChoiceKind::LongestChain);
        let blocks = [
            tree_block(1, BlockId::GENESIS),
            tree_block(11, id(1)),
            tree_block(12, id(11)),
            tree_block(13, id(12)),
            tree_block(2, BlockId::GENESIS),
            tree_block(21, id(2)),
            tree_block(22, id(2)),
            tree_block(23, id(2)),
            tree_block(24, id(2)),
        ];
        for block in blocks {
            link(&mut ghost, block.clone());
            link(&mut longest, block);
        }

        assert_eq!(longest.fork_choice_rule(), vec![id(13)]);
        let mut heads = ghost.fork_choice_rule();
        heads.sort();
        assert_eq!(heads, vec![id(21), id(22), id(23), id(24)]);
    }

    #[test]
    fn test_common_prefix_stops_at_divergence() {
        let chains = vec![
            vec![BlockId::GENESIS, id(1), id(2)],
            vec![BlockId::GENESIS, id(1), id(3)],
        ];
        assert_eq!(common_prefix(&chains), vec![BlockId::GENESIS, id(1)]);

        let single = vec![vec![BlockId::GENESIS, id(1)]];
        assert_eq!(common_prefix(&single), vec![BlockId::GENESIS, id(1)]);
    }

    // =============================================================================
    // FINALITY PROPERTIES
    // =============================================================================

    #[test]
    fn test_finalization_depth_is_monotone_in_epsilon() {
        let epsilons = [1e-9, 1e-6, 1e-3, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0];
        for adversaries in 0..=4 {
            let depths: Vec<u64> = epsilons
                .iter()
                .map(|&eps| compute_finalization_depth(eps, 10, adversaries).unwrap())
                .collect();
            for pair in depths.windows(2) {
                assert!(
                    pair[0] >= pair[1],
                    "adversaries={adversaries}: depths {depths:?} not non-increasing"
                );
            }
        }
    }

    #[test]
    fn test_finalization_depth_grows_with_adversary_share() {
        let depths: Vec<u64> = (0..=4)
            .map(|adversaries| compute_finalization_depth(1e-3, 10, adversaries).unwrap())
            .collect();
        for pair in depths.windows(2) {
            assert!(pair[0] <= pair[1], "{depths:?}");
        }
        assert_eq!(depths[1], 5);
        assert_eq!(depths[3], 24);
    }

    // =============================================================================
    // SPLICED MAIN CHAINS
    // =============================================================================

    #[test]
    fn test_prism_votes_accumulate_before_elected_block() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let mut prism = Prism::new(2);
        let template = |n: u128| BlockTemplate::new(id(n), ProposalType::Tree, n as f64);

        let a = prism.add_block_to_lane(template(1), 0, &mut rng).unwrap();
        let vote0 = prism.add_block_to_lane(template(100), 1, &mut rng).unwrap();
        let vote1 = prism.add_block_to_lane(template(200), 2, &mut rng).unwrap();
        assert_eq!(
            prism.main_chains()[0],
            vec![BlockId::GENESIS, vote0.id, vote1.id, a.id]
        );

        let b = prism.add_block_to_lane(template(2), 0, &mut rng).unwrap();
        assert_eq!(b.parent_id, Some(a.id));
        let vote0b = prism.add_block_to_lane(template(101), 1, &mut rng).unwrap();
        assert_eq!(vote0b.parent_id, Some(vote0.id));
        assert_eq!(
            prism.main_chains()[0],
            vec![BlockId::GENESIS, vote0.id, vote1.id, a.id, vote0b.id, b.id]
        );
    }

    #[test]
    fn test_pool_blocks_spliced_in_insertion_order() {
        let mut rng = ChaCha8Rng::seed_from_u64(23);
        let mut pooled = algorithm(ForkChoiceKind::LongestChainWithPool);

        let first = pooled
            .add_block(BlockTemplate::new(id(1), ProposalType::Pool, 1.0), &mut rng)
            .unwrap();
        let second = pooled
            .add_block(BlockTemplate::new(id(2), ProposalType::Pool, 2.0), &mut rng)
            .unwrap();
        assert_eq!(first.parent_id, None);
        assert_eq!(pooled.main_chains()[0], vec![BlockId::GENESIS]);

        let tree = pooled
            .add_block(BlockTemplate::new(id(3), ProposalType::Tree, 3.0), &mut rng)
            .unwrap();
        assert_eq!(tree.reference_ids, vec![first.id, second.id]);
        assert_eq!(
            pooled.main_chains()[0],
            vec![BlockId::GENESIS, first.id, second.id, tree.id]
        );
    }
}
