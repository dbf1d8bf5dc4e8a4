//! Pending transaction queue and block-filling policy

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use shared_types::{SimTime, TxId};
use std::collections::{HashSet, VecDeque};

/// How a proposer picks transactions from its pending queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SchedulingRule {
    /// Oldest eligible transactions first.
    #[default]
    #[serde(rename = "FIFO")]
    Fifo,
    /// Uniform sample of eligible transactions, without replacement.
    #[serde(rename = "probabilistic")]
    Probabilistic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingTx {
    pub id: TxId,
    pub timestamp: SimTime,
}

/// Transactions known to a node, ordered by generation time.
///
/// Only transactions no main chain carries are selectable. Committed ones
/// are parked in `settled` and come back if a reorg drops them from every
/// main chain.
#[derive(Debug, Clone, Default)]
pub struct PendingQueue {
    queue: VecDeque<PendingTx>,
    settled: Vec<PendingTx>,
    known: HashSet<TxId>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert keeping generation-time order. Returns `false` for a
    /// transaction already known.
    pub fn insert(&mut self, id: TxId, timestamp: SimTime) -> bool {
        if !self.known.insert(id) {
            return false;
        }
        self.enqueue(PendingTx { id, timestamp });
        true
    }

    fn enqueue(&mut self, tx: PendingTx) {
        // ties go after existing entries
        let at = self
            .queue
            .partition_point(|queued| queued.timestamp.total_cmp(&tx.timestamp).is_le());
        self.queue.insert(at, tx);
    }

    /// Sync with the transactions carried by the current main chains.
    ///
    /// Committed transactions leave the selectable queue; settled ones no
    /// longer in `committed` are queued again. Returns the number parked.
    pub fn settle(&mut self, committed: &HashSet<TxId>) -> usize {
        let (restored, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.settled)
            .into_iter()
            .partition(|tx| !committed.contains(&tx.id));
        self.settled = kept;

        let before = self.queue.len();
        let settled = &mut self.settled;
        self.queue.retain(|tx| {
            let done = committed.contains(&tx.id);
            if done {
                settled.push(*tx);
            }
            !done
        });
        let parked = before - self.queue.len();

        for tx in restored {
            self.enqueue(tx);
        }
        parked
    }

    pub fn contains(&self, id: &TxId) -> bool {
        self.known.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingTx> {
        self.queue.iter()
    }

    /// Committed transactions held back from selection.
    pub fn settled_len(&self) -> usize {
        self.settled.len()
    }

    /// Selectable transactions.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Pick at most `max` selectable transactions.
    pub fn select<R: Rng + ?Sized>(&self, rule: SchedulingRule, max: usize, rng: &mut R) -> Vec<TxId> {
        let eligible = self.queue.iter();
        match rule {
            SchedulingRule::Fifo => eligible.take(max).map(|tx| tx.id).collect(),
            SchedulingRule::Probabilistic => {
                let eligible: Vec<TxId> = eligible.map(|tx| tx.id).collect();
                eligible.choose_multiple(rng, max).copied().collect()
            }
        }
    }
}
