//! # End-to-End Runs
//!
//! Whole simulations driven from a [`SimConfig`](cs_06_coordinator::SimConfig):
//! every protocol runs to completion, equal seeds give equal reports, all
//! in-flight messages land, and finality shows up on long enough runs.

#[cfg(test)]
mod tests {
    use cs_02_fork_choice::ForkChoiceKind;
    use cs_04_network_model::NetworkModel;
    use cs_05_node::SchedulingRule;
    use cs_06_coordinator::{simulate, Coordinator, SimConfig, SimulationReport, TransactionDataset};
    use shared_types::{BlockId, BlockType, NodeId};
    use std::collections::HashSet;

    const ALL_PROTOCOLS: [ForkChoiceKind; 6] = [
        ForkChoiceKind::LongestChain,
        ForkChoiceKind::Ghost,
        ForkChoiceKind::Prism,
        ForkChoiceKind::Conflux,
        ForkChoiceKind::BitcoinNg,
        ForkChoiceKind::LongestChainWithPool,
    ];

    fn config(kind: ForkChoiceKind, network_model: NetworkModel, seed: u64) -> SimConfig {
        SimConfig {
            num_nodes: 5,
            num_adversaries: 1,
            max_block_size: 20,
            fork_choice_rule: kind,
            network_model,
            proposal_rate: 0.3,
            secondary_proposal_rate: kind.secondary_proposal().map(|_| 0.6),
            transaction_rate: 2.0,
            duration: 80.0,
            prism_voter_chains: 4,
            seed,
            ..SimConfig::default()
        }
    }

    fn block_ids(report: &SimulationReport) -> HashSet<BlockId> {
        report.blocks.iter().map(|b| b.id).collect()
    }

    // =============================================================================
    // DETERMINISM
    // =============================================================================

    #[test]
    fn test_same_seed_same_report() {
        for kind in ALL_PROTOCOLS {
            let first = simulate(config(kind, NetworkModel::DeckerWattenhofer, 21)).unwrap();
            let second = simulate(config(kind, NetworkModel::DeckerWattenhofer, 21)).unwrap();
            assert_eq!(first, second, "{kind} is not reproducible");
        }
    }

    #[test]
    fn test_different_seed_different_blocks() {
        let first = simulate(config(ForkChoiceKind::Ghost, NetworkModel::Zero, 1)).unwrap();
        let second = simulate(config(ForkChoiceKind::Ghost, NetworkModel::Zero, 2)).unwrap();
        assert_ne!(block_ids(&first), block_ids(&second));
    }

    #[test]
    fn test_deterministic_dataset_and_probabilistic_scheduling_are_reproducible() {
        let settings = SimConfig {
            transaction_dataset: TransactionDataset::Deterministic,
            transaction_scheduling_rule: SchedulingRule::Probabilistic,
            ..config(ForkChoiceKind::LongestChain, NetworkModel::ConstantDeckerWattenhofer, 4)
        };
        let first = simulate(settings.clone()).unwrap();
        let second = simulate(settings).unwrap();
        assert_eq!(first, second);
        // One transaction every 1 / rate seconds, the first one interval in.
        assert_eq!(first.transactions.len(), 159);
    }

    // =============================================================================
    // EVERY PROTOCOL, EVERY NETWORK MODEL
    // =============================================================================

    #[test]
    fn test_every_protocol_runs_and_drains() {
        for kind in ALL_PROTOCOLS {
            for network in [
                NetworkModel::Zero,
                NetworkModel::ConstantDeckerWattenhofer,
                NetworkModel::DeckerWattenhofer,
            ] {
                let mut coordinator = Coordinator::new(config(kind, network, 9)).unwrap();
                coordinator.run().unwrap();
                let report = coordinator.report();

                assert_eq!(report.fork_choice_rule, kind);
                assert_eq!(report.blocks.len(), coordinator.stats().proposals_processed);
                assert_eq!(block_ids(&report).len(), report.blocks.len(), "duplicate block ids");
                assert_eq!(report.orphans_outstanding, 0, "{kind} over {network:?}");
                assert!(report.common_prefix_length >= 1);
                assert!(report.main_chain_length >= report.common_prefix_length);

                // Complete graph and a final drain: every node holds every block.
                let global: HashSet<BlockId> = coordinator.global().blocks().map(|b| b.id).collect();
                for node in coordinator.nodes() {
                    let local: HashSet<BlockId> = node.algorithm().blocks().map(|b| b.id).collect();
                    assert_eq!(local, global, "{kind} over {network:?}: {} diverged", node.id());
                }
            }
        }
    }

    #[test]
    fn test_zero_latency_nodes_agree_on_heads() {
        for kind in [ForkChoiceKind::LongestChain, ForkChoiceKind::Ghost] {
            let mut coordinator = Coordinator::new(config(kind, NetworkModel::Zero, 13)).unwrap();
            coordinator.run().unwrap();

            let mut expected = coordinator.global().fork_choice_rule();
            expected.sort();
            for node in coordinator.nodes() {
                let mut heads = node.algorithm().fork_choice_rule();
                heads.sort();
                assert_eq!(heads, expected, "{kind}: {}", node.id());
            }
        }
    }

    #[test]
    fn test_bitcoin_ng_micro_blocks_come_from_current_leader() {
        let report = simulate(config(ForkChoiceKind::BitcoinNg, NetworkModel::Zero, 31)).unwrap();
        let mut blocks = report.blocks.clone();
        blocks.sort_by(|a, b| a.proposal_timestamp.total_cmp(&b.proposal_timestamp));

        let mut leader: Option<NodeId> = None;
        let mut micro_after_key = 0;
        for block in &blocks {
            match block.block_type {
                BlockType::Key => leader = block.proposer,
                BlockType::Micro => {
                    assert!(block.transactions.len() <= 20);
                    if let Some(leader) = leader {
                        assert_eq!(block.proposer, Some(leader));
                        micro_after_key += 1;
                    }
                }
                other => panic!("unexpected {other:?} block under BitcoinNG"),
            }
        }
        assert!(micro_after_key > 0);
    }

    #[test]
    fn test_prism_voter_blocks_carry_no_transactions() {
        let report = simulate(config(ForkChoiceKind::Prism, NetworkModel::Zero, 8)).unwrap();
        for block in &report.blocks {
            if let BlockType::Voter { chain } = block.block_type {
                assert!(chain < 4);
                assert!(block.transactions.is_empty());
            }
        }
    }

    // =============================================================================
    // FINALITY AND METRICS
    // =============================================================================

    #[test]
    fn test_long_run_finalizes_blocks_and_transactions() {
        let settings = SimConfig {
            num_nodes: 10,
            num_adversaries: 1,
            tx_error_prob: 0.01,
            proposal_rate: 0.1,
            transaction_rate: 0.5,
            duration: 1500.0,
            ..config(ForkChoiceKind::LongestChain, NetworkModel::DeckerWattenhofer, 77)
        };
        let report = simulate(settings).unwrap();

        assert!(report.finalization_depth > 0);
        assert!(report.finalized_blocks() > 0);
        assert!(report.completed_transactions() > 0);
        assert!(report.throughput_tx_per_sec > 0.0);

        let finalization = report.mean_finalization_latency.unwrap();
        let arrival = report.mean_main_chain_latency.unwrap();
        assert!(finalization > 0.0);
        assert!(arrival > 0.0);

        for block in report.blocks.iter().filter(|b| b.finalization_timestamp.is_some()) {
            assert!(block.finalization_timestamp >= Some(block.proposal_timestamp));
        }
        for tx in report.transactions.iter().filter(|t| t.complete) {
            assert!(!tx.finalization_timestamps.is_empty());
            assert!(tx.main_chain_arrival_timestamp.is_some());
            assert!(tx.finalization_timestamps[0] >= tx.timestamp);
        }
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = simulate(config(ForkChoiceKind::Conflux, NetworkModel::Zero, 2)).unwrap();
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["fork_choice_rule"], "Conflux");
        assert_eq!(
            value["blocks"].as_array().map(Vec::len),
            Some(report.blocks.len())
        );
        let decoded: SimulationReport = serde_json::from_value(value).unwrap();
        assert_eq!(decoded.blocks.len(), report.blocks.len());
    }
}
