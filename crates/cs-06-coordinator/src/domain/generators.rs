//! Event generators
//!
//! Every generator draws from the caller's RNG, so a seeded run replays
//! the same arrivals. Events are emitted strictly before `start + duration`.

use crate::config::TransactionDataset;
use cs_02_fork_choice::ForkChoiceKind;
use rand::Rng;
use shared_types::{NodeId, Proposal, ProposalType, SimTime, Transaction, TxId};

/// A timestamped event attributed to a source node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrival {
    pub timestamp: SimTime,
    pub source: NodeId,
}

/// One exponential inter-arrival time, drawn by inverse CDF.
pub fn exponential<R: Rng + ?Sized>(rate: f64, rng: &mut R) -> SimTime {
    // gen() is in [0, 1), so 1 - u is in (0, 1]
    -(1.0 - rng.gen::<f64>()).ln() / rate
}

/// Poisson process at `rate` events per second.
pub fn poisson_times<R: Rng + ?Sized>(rate: f64, start: SimTime, duration: SimTime, rng: &mut R) -> Vec<SimTime> {
    let end = start + duration;
    let mut times = Vec::new();
    let mut t = start;
    loop {
        t += exponential(rate, rng);
        if t >= end {
            return times;
        }
        times.push(t);
    }
}

/// Evenly spaced events every `interval` seconds.
pub fn deterministic_times(interval: SimTime, start: SimTime, duration: SimTime) -> Vec<SimTime> {
    let end = start + duration;
    (1..)
        .map(|i| start + interval * i as f64)
        .take_while(|t| *t < end)
        .collect()
}

fn attribute<R: Rng + ?Sized>(times: Vec<SimTime>, num_nodes: usize, rng: &mut R) -> Vec<Arrival> {
    times
        .into_iter()
        .map(|timestamp| Arrival {
            timestamp,
            source: NodeId(rng.gen_range(0..num_nodes)),
        })
        .collect()
}

pub fn poisson<R: Rng + ?Sized>(
    rate: f64,
    duration: SimTime,
    start: SimTime,
    num_nodes: usize,
    rng: &mut R,
) -> Vec<Arrival> {
    let times = poisson_times(rate, start, duration, rng);
    attribute(times, num_nodes, rng)
}

pub fn deterministic<R: Rng + ?Sized>(
    interval: SimTime,
    duration: SimTime,
    start: SimTime,
    num_nodes: usize,
    rng: &mut R,
) -> Vec<Arrival> {
    attribute(deterministic_times(interval, start, duration), num_nodes, rng)
}

/// Transactions for a run, in generation order.
pub fn generate_transactions<R: Rng + ?Sized>(
    dataset: TransactionDataset,
    rate: f64,
    duration: SimTime,
    num_nodes: usize,
    rng: &mut R,
) -> Vec<Transaction> {
    let arrivals = match dataset {
        TransactionDataset::Poisson => poisson(rate, duration, 0.0, num_nodes, rng),
        TransactionDataset::Deterministic => deterministic(1.0 / rate, duration, 0.0, num_nodes, rng),
    };
    arrivals
        .into_iter()
        .map(|arrival| Transaction::new(TxId::random(rng), arrival.source, arrival.timestamp))
        .collect()
}

/// Proposal slots for a run: the primary stream at `rate` and, for
/// protocols with one, the secondary stream at `secondary_rate`. Merged in
/// time order; on equal timestamps the primary slot comes first.
pub fn generate_proposals<R: Rng + ?Sized>(
    kind: ForkChoiceKind,
    rate: f64,
    secondary_rate: Option<f64>,
    duration: SimTime,
    rng: &mut R,
) -> Vec<Proposal> {
    let primary = poisson_times(rate, 0.0, duration, rng)
        .into_iter()
        .map(|t| Proposal::new(t, kind.primary_proposal()));
    let mut proposals: Vec<Proposal> = primary.collect();

    if let (Some(secondary), Some(rate)) = (kind.secondary_proposal(), secondary_rate) {
        proposals.extend(
            poisson_times(rate, 0.0, duration, rng)
                .into_iter()
                .map(|t| Proposal::new(t, secondary)),
        );
        // stable, so primary slots stay ahead on ties
        proposals.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
    }
    proposals
}

/// Proposal kinds in a schedule, for logging.
pub fn count_by_type(proposals: &[Proposal], kind: ProposalType) -> usize {
    proposals.iter().filter(|p| p.proposal_type == kind).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_poisson_rate_and_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let arrivals = poisson(2.0, 1000.0, 0.0, 5, &mut rng);
        // mean 2000, sd ~45
        assert!((1800..2200).contains(&arrivals.len()), "{}", arrivals.len());
        assert!(arrivals.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        assert!(arrivals.iter().all(|a| a.timestamp > 0.0 && a.timestamp < 1000.0));
        assert!(arrivals.iter().all(|a| a.source.0 < 5));
    }

    #[test]
    fn test_deterministic_spacing() {
        let times = deterministic_times(0.5, 10.0, 2.0);
        assert_eq!(times, vec![10.5, 11.0, 11.5]);
    }

    #[test]
    fn test_generators_are_reproducible() {
        let run = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            generate_transactions(TransactionDataset::Poisson, 1.0, 50.0, 4, &mut rng)
        };
        assert_eq!(run(3), run(3));
        assert_ne!(run(3), run(4));
    }

    #[test]
    fn test_bitcoin_ng_schedule_interleaves_key_and_micro() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let proposals = generate_proposals(ForkChoiceKind::BitcoinNg, 0.1, Some(1.0), 500.0, &mut rng);
        assert!(proposals.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        assert!(count_by_type(&proposals, ProposalType::Key) > 0);
        assert!(count_by_type(&proposals, ProposalType::Micro) > count_by_type(&proposals, ProposalType::Key));
        assert_eq!(count_by_type(&proposals, ProposalType::Tree), 0);
    }

    #[test]
    fn test_single_stream_protocols_ignore_secondary_rate() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let proposals = generate_proposals(ForkChoiceKind::Ghost, 0.5, Some(5.0), 100.0, &mut rng);
        assert!(proposals.iter().all(|p| p.proposal_type == ProposalType::Tree));
    }
}
