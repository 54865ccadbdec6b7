//! Proposal cycle: a weighted, randomized schedule over the active
//! kernel set, with dynamic addition after burn-in.

use crate::error::{Result, SamplerError};
use crate::kernels::KernelKind;
use rand::Rng;
use rand::RngCore;

/// `propCycle` (an ordered multiset, each kernel repeated `weight` times)
/// plus `randomizedCycle` (the shuffled traversal order actually consumed).
#[derive(Debug, Clone, Default)]
pub struct ProposalCycle {
    entries: Vec<KernelKind>,
    randomized: Vec<KernelKind>,
}

impl ProposalCycle {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            randomized: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, kind: KernelKind) -> bool {
        self.entries.contains(&kind)
    }

    /// Append `weight` copies of `kind` and re-randomize. A weight of zero
    /// is a fatal configuration error.
    pub fn add(&mut self, kind: KernelKind, weight: u32, rng: &mut dyn RngCore) -> Result<()> {
        if weight == 0 {
            return Err(SamplerError::ZeroCycleWeight);
        }
        for _ in 0..weight {
            self.entries.push(kind);
        }
        self.randomize(rng);
        Ok(())
    }

    /// Draw a fresh bootstrapped traversal order: `L` indices sampled
    /// uniformly from `{0,...,L-1}` *with replacement*. This is
    /// deliberately not a permutation.
    pub fn randomize(&mut self, rng: &mut dyn RngCore) {
        let len = self.entries.len();
        if len == 0 {
            self.randomized.clear();
            return;
        }
        self.randomized = (0..len)
            .map(|_| self.entries[rng.random_range(0..len)])
            .collect();
    }

    /// Select the kernel for iteration `iter`, re-randomizing whenever a
    /// full traversal completes (`iter mod len == 0`).
    pub fn select(&mut self, iter: u64, rng: &mut dyn RngCore) -> KernelKind {
        let len = self.randomized.len() as u64;
        debug_assert!(len > 0, "proposal cycle must be non-empty before selection");
        let kind = self.randomized[(iter % len) as usize];
        if iter % len == 0 {
            self.randomize(rng);
        }
        kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn add_rejects_zero_weight() {
        let mut cycle = ProposalCycle::new();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(cycle.add(KernelKind::Scam, 0, &mut rng).is_err());
    }

    #[test]
    fn cycle_length_equals_sum_of_weights() {
        let mut cycle = ProposalCycle::new();
        let mut rng = StdRng::seed_from_u64(1);
        cycle.add(KernelKind::Scam, 20, &mut rng).unwrap();
        cycle.add(KernelKind::Am, 20, &mut rng).unwrap();
        cycle.add(KernelKind::De, 20, &mut rng).unwrap();
        assert_eq!(cycle.len(), 60);
    }

    #[test]
    fn select_never_panics_across_many_iterations() {
        let mut cycle = ProposalCycle::new();
        let mut rng = StdRng::seed_from_u64(2);
        cycle.add(KernelKind::Scam, 5, &mut rng).unwrap();
        for i in 0..1000u64 {
            let _ = cycle.select(i, &mut rng);
        }
    }

    #[test]
    fn dynamic_addition_keeps_previous_kernels_reachable() {
        let mut cycle = ProposalCycle::new();
        let mut rng = StdRng::seed_from_u64(3);
        cycle.add(KernelKind::Scam, 20, &mut rng).unwrap();
        cycle.add(KernelKind::Am, 20, &mut rng).unwrap();
        assert!(cycle.contains(KernelKind::Scam));
        cycle.add(KernelKind::De, 20, &mut rng).unwrap();
        assert!(cycle.contains(KernelKind::Scam) && cycle.contains(KernelKind::De));
    }
}
