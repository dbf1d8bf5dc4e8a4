//! # Fork-Choice Benchmarks
//!
//! | Operation | Claim |
//! |-----------|-------|
//! | GHOST insert | subtree counts updated along one ancestor path |
//! | GHOST fork choice | one walk from genesis, O(depth) |
//! | Longest-Chain fork choice | read of the deepest depth bucket |
//! | Conflux main chain | epoch walk bounded by the traversal limit |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use cs_02_fork_choice::{BlockTemplate, ForkChoiceAlgorithm, ForkChoiceKind, ForkChoiceParams};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use shared_types::{Block, BlockId, BlockType, ProposalType};

// ============================================================================
// FIXTURES
// ============================================================================

fn algorithm(kind: ForkChoiceKind) -> ForkChoiceAlgorithm {
    ForkChoiceAlgorithm::new(kind, &ForkChoiceParams::default())
}

/// A spine of `depth` blocks with a short side fork every tenth block.
fn deep_tree(kind: ForkChoiceKind, depth: u128) -> ForkChoiceAlgorithm {
    let mut tree = algorithm(kind);
    let mut parent = BlockId::GENESIS;
    for n in 1..=depth {
        let id = BlockId::from_u128(n);
        let block = Block::new(id, Some(parent), BlockType::Tree, n as f64);
        let _ = tree.insert_block(block);
        if n % 10 == 0 {
            let side = BlockId::from_u128(1_000_000 + n);
            let _ = tree.insert_block(Block::new(side, Some(parent), BlockType::Tree, n as f64));
        }
        parent = id;
    }
    tree
}

// ============================================================================
// INSERTION
// ============================================================================

fn bench_ghost_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("cs-02-ghost-insert");

    for size in [100u128, 1_000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("add_block", size), &size, |b, &size| {
            b.iter(|| {
                let mut rng = ChaCha8Rng::seed_from_u64(7);
                let mut ghost = algorithm(ForkChoiceKind::Ghost);
                for n in 1..=size {
                    let template = BlockTemplate::new(BlockId::from_u128(n), ProposalType::Tree, n as f64);
                    let _ = black_box(ghost.add_block(template, &mut rng));
                }
                ghost
            })
        });
    }

    group.finish();
}

// ============================================================================
// FORK CHOICE ON A DEEP TREE
// ============================================================================

fn bench_fork_choice_rule(c: &mut Criterion) {
    let mut group = c.benchmark_group("cs-02-fork-choice-rule");

    for depth in [1_000u128, 5_000] {
        for kind in [ForkChoiceKind::LongestChain, ForkChoiceKind::Ghost] {
            let tree = deep_tree(kind, depth);
            group.bench_with_input(BenchmarkId::new(kind.as_str(), depth), &tree, |b, tree| {
                b.iter(|| black_box(tree.fork_choice_rule()))
            });
        }
    }

    group.finish();
}

fn bench_conflux_main_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("cs-02-conflux-main-chain");

    for size in [200u128, 1_000] {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut conflux = algorithm(ForkChoiceKind::Conflux);
        for n in 1..=size {
            let template = BlockTemplate::new(BlockId::from_u128(n), ProposalType::Tree, n as f64);
            let _ = conflux.add_block(template, &mut rng);
        }
        group.bench_with_input(BenchmarkId::new("main_chains", size), &conflux, |b, conflux| {
            b.iter(|| black_box(conflux.main_chains()))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_ghost_insert,
    bench_fork_choice_rule,
    bench_conflux_main_chain
);
criterion_main!(benches);
