//! Stamp matching policy.

use std::time::Duration;

use contracts::{Stamp, SyncConfig, SyncMode};

use crate::buffer::Candidate;

/// Exact or bounded-skew matching rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPolicy {
    pub mode: SyncMode,
    /// Tolerance for approximate mode; ignored by exact mode
    pub max_interval: Duration,
}

impl MatchPolicy {
    pub fn exact() -> Self {
        Self {
            mode: SyncMode::Exact,
            max_interval: Duration::ZERO,
        }
    }

    pub fn approximate(max_interval: Duration) -> Self {
        Self {
            mode: SyncMode::Approximate,
            max_interval,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        match config.mode {
            SyncMode::Exact => Self::exact(),
            SyncMode::Approximate => Self::approximate(config.max_interval()),
        }
    }

    /// Whether a group whose stamps span `spread` is acceptable.
    #[inline]
    pub fn accepts(&self, spread: Duration) -> bool {
        match self.mode {
            SyncMode::Exact => spread.is_zero(),
            SyncMode::Approximate => spread <= self.max_interval,
        }
    }
}

/// Maximum pairwise distance inside a set of stamps.
pub fn spread<I>(stamps: I) -> Duration
where
    I: IntoIterator<Item = Stamp>,
{
    let mut bounds: Option<(Stamp, Stamp)> = None;
    for stamp in stamps {
        bounds = Some(match bounds {
            None => (stamp, stamp),
            Some((lo, hi)) => (lo.min(stamp), hi.max(stamp)),
        });
    }
    bounds.map_or(Duration::ZERO, |(lo, hi)| hi.abs_diff(lo))
}

/// Pick one candidate per channel forming the best acceptable group.
///
/// Best means minimum spread; ties go to the lexicographically smallest
/// tuple of arrival sequences in channel order. Returns the chosen arrival
/// sequence per channel, or `None` when no combination is acceptable.
pub fn best_match(policy: &MatchPolicy, channels: &[Vec<Candidate>]) -> Option<Vec<u64>> {
    if channels.is_empty() || channels.iter().any(Vec::is_empty) {
        return None;
    }

    let mut best: Option<(Duration, Vec<u64>)> = None;
    let mut picked: Vec<Candidate> = Vec::with_capacity(channels.len());
    search(policy, channels, &mut picked, &mut best);
    best.map(|(_, seqs)| seqs)
}

fn search(
    policy: &MatchPolicy,
    channels: &[Vec<Candidate>],
    picked: &mut Vec<Candidate>,
    best: &mut Option<(Duration, Vec<u64>)>,
) {
    let depth = picked.len();
    if depth == channels.len() {
        let group_spread = spread(picked.iter().map(|c| c.stamp));
        if !policy.accepts(group_spread) {
            return;
        }
        let seqs: Vec<u64> = picked.iter().map(|c| c.seq).collect();
        let better = match best {
            None => true,
            Some((best_spread, best_seqs)) => {
                (group_spread, &seqs) < (*best_spread, &*best_seqs)
            }
        };
        if better {
            *best = Some((group_spread, seqs));
        }
        return;
    }

    for candidate in &channels[depth] {
        // Prune partial tuples that already exceed the tolerance
        let partial = spread(picked.iter().map(|c| c.stamp).chain([candidate.stamp]));
        if !policy.accepts(partial) {
            continue;
        }
        picked.push(*candidate);
        search(policy, channels, picked, best);
        picked.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(seq: u64, secs: f64) -> Candidate {
        Candidate {
            seq,
            stamp: Stamp::from_secs_f64(secs),
        }
    }

    #[test]
    fn test_exact_requires_identical_stamps() {
        let policy = MatchPolicy::exact();
        let channels = vec![vec![cand(0, 1.0)], vec![cand(0, 1.000_000_001)]];
        assert_eq!(best_match(&policy, &channels), None);

        let channels = vec![vec![cand(4, 1.0)], vec![cand(7, 1.0)]];
        assert_eq!(best_match(&policy, &channels), Some(vec![4, 7]));
    }

    #[test]
    fn test_approximate_within_tolerance() {
        let policy = MatchPolicy::approximate(Duration::from_millis(10));
        let channels = vec![vec![cand(0, 10.000)], vec![cand(0, 10.005)]];
        assert_eq!(best_match(&policy, &channels), Some(vec![0, 0]));

        let channels = vec![vec![cand(0, 10.000)], vec![cand(0, 10.020)]];
        assert_eq!(best_match(&policy, &channels), None);
    }

    #[test]
    fn test_minimum_spread_wins() {
        let policy = MatchPolicy::approximate(Duration::from_millis(50));
        let channels = vec![
            vec![cand(0, 1.000), cand(1, 1.030)],
            vec![cand(0, 1.031)],
        ];
        assert_eq!(best_match(&policy, &channels), Some(vec![1, 0]));
    }

    #[test]
    fn test_tie_goes_to_earliest_arrival() {
        let policy = MatchPolicy::approximate(Duration::from_millis(10));
        // Both 0.995 and 1.005 are 5ms away from the newest arrival at 1.0
        let channels = vec![vec![cand(0, 1.005), cand(1, 0.995)], vec![cand(3, 1.0)]];
        assert_eq!(best_match(&policy, &channels), Some(vec![0, 3]));
    }

    #[test]
    fn test_three_channels() {
        let policy = MatchPolicy::approximate(Duration::from_millis(10));
        let channels = vec![
            vec![cand(0, 2.000), cand(1, 2.100)],
            vec![cand(0, 2.104)],
            vec![cand(0, 1.999), cand(1, 2.102)],
        ];
        assert_eq!(best_match(&policy, &channels), Some(vec![1, 0, 1]));
    }

    #[test]
    fn test_empty_channel_never_matches() {
        let policy = MatchPolicy::approximate(Duration::from_secs(1));
        assert_eq!(best_match(&policy, &[vec![cand(0, 1.0)], vec![]]), None);
        assert_eq!(best_match(&policy, &[]), None);
    }

    #[test]
    fn test_spread() {
        let stamps = [1.0, 1.2, 0.9].map(Stamp::from_secs_f64);
        assert_eq!(spread(stamps), Duration::from_millis(300));
        assert_eq!(spread(std::iter::empty()), Duration::ZERO);
    }
}
