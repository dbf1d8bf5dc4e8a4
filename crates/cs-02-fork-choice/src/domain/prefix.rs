//! Common prefix of competing main chains

use shared_types::BlockId;

/// Longest prefix shared by every chain, compared position-wise until the
/// ids diverge. Empty input yields an empty prefix.
pub fn common_prefix(chains: &[Vec<BlockId>]) -> Vec<BlockId> {
    let Some((first, rest)) = chains.split_first() else {
        return Vec::new();
    };
    let shared = first
        .iter()
        .enumerate()
        .take_while(|(i, id)| rest.iter().all(|chain| chain.get(*i) == Some(*id)))
        .count();
    first[..shared].to_vec()
}
