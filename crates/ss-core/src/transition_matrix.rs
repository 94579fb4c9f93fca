//! Empirical state-change matrix.
//!
//! Only changes of state count: a run of identical labels contributes no
//! transitions, so the diagonal is always zero. Each row with outgoing
//! transitions sums to 1; a state never left keeps an all-zero row.

use rand::Rng;
use serde::Serialize;
use ss_common::{Error, Label, Result};
use ss_math::argmax;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionMatrix {
    n_states: usize,
    counts: Vec<Vec<u64>>,
    probabilities: Vec<Vec<f64>>,
}

impl TransitionMatrix {
    /// Count state changes in `labels` (in time order) over `n_states` states.
    pub fn from_labels(labels: &[Label], n_states: usize) -> Result<Self> {
        if let Some(&bad) = labels.iter().find(|&&l| l >= n_states) {
            return Err(Error::InvalidState {
                state: bad,
                n_states,
            });
        }

        let mut counts = vec![vec![0u64; n_states]; n_states];
        for pair in labels.windows(2) {
            let (prev, curr) = (pair[0], pair[1]);
            if prev != curr {
                counts[prev][curr] += 1;
            }
        }

        let probabilities = counts
            .iter()
            .map(|row| {
                let total: u64 = row.iter().sum();
                if total == 0 {
                    vec![0.0; n_states]
                } else {
                    row.iter().map(|&c| c as f64 / total as f64).collect()
                }
            })
            .collect();

        Ok(TransitionMatrix {
            n_states,
            counts,
            probabilities,
        })
    }

    pub fn n_states(&self) -> usize {
        self.n_states
    }

    /// P(next = j | current = i); 0.0 for out-of-range states.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.probabilities
            .get(i)
            .and_then(|row| row.get(j))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn row(&self, i: usize) -> Result<&[f64]> {
        self.check(i)?;
        Ok(&self.probabilities[i])
    }

    pub fn probabilities(&self) -> &[Vec<f64>] {
        &self.probabilities
    }

    /// Raw change counts.
    pub fn counts(&self) -> &[Vec<u64>] {
        &self.counts
    }

    pub fn total_transitions(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    /// True when state `i` was never left.
    pub fn is_absorbing(&self, i: usize) -> Result<bool> {
        self.check(i)?;
        Ok(self.counts[i].iter().all(|&c| c == 0))
    }

    /// Most frequent successor of `i`, lowest id on ties; `None` if `i` was never left.
    pub fn most_likely_next(&self, i: usize) -> Result<Option<Label>> {
        if self.is_absorbing(i)? {
            return Ok(None);
        }
        Ok(argmax(&self.probabilities[i]))
    }

    /// Draw a successor of `i`; `None` if `i` was never left.
    pub fn sample_next<R: Rng>(&self, i: usize, rng: &mut R) -> Result<Option<Label>> {
        if self.is_absorbing(i)? {
            return Ok(None);
        }
        let row = &self.counts[i];
        let total: u64 = row.iter().sum();
        let mut target = rng.random_range(0..total);
        for (j, &c) in row.iter().enumerate() {
            if target < c {
                return Ok(Some(j));
            }
            target -= c;
        }
        Ok(None)
    }

    fn check(&self, i: usize) -> Result<()> {
        if i >= self.n_states {
            return Err(Error::InvalidState {
                state: i,
                n_states: self.n_states,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_alternating_labels() {
        let tm = TransitionMatrix::from_labels(&[0, 1, 0, 1, 0, 1], 2).unwrap();
        assert_eq!(tm.probabilities(), &[vec![0.0, 1.0], vec![1.0, 0.0]]);
        assert_eq!(tm.total_transitions(), 5);
    }

    #[test]
    fn test_self_loops_are_not_counted() {
        let tm = TransitionMatrix::from_labels(&[0, 0, 0, 1, 1, 2, 2, 0], 3).unwrap();
        assert_eq!(tm.counts(), &[vec![0, 1, 0], vec![0, 0, 1], vec![1, 0, 0]]);
        for i in 0..3 {
            assert_eq!(tm.get(i, i), 0.0);
        }
    }

    #[test]
    fn test_rows_sum_to_one_or_zero() {
        let tm = TransitionMatrix::from_labels(&[0, 1, 2, 1, 0, 2, 2, 1], 4).unwrap();
        for i in 0..4 {
            let sum: f64 = tm.row(i).unwrap().iter().sum();
            if tm.is_absorbing(i).unwrap() {
                assert_eq!(sum, 0.0);
            } else {
                assert!((sum - 1.0).abs() < 1e-12);
            }
        }
        assert!(tm.is_absorbing(3).unwrap());
    }

    #[test]
    fn test_label_out_of_range() {
        let err = TransitionMatrix::from_labels(&[0, 3], 2).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidState {
                state: 3,
                n_states: 2
            }
        ));
    }

    #[test]
    fn test_most_likely_next() {
        let tm = TransitionMatrix::from_labels(&[0, 1, 0, 2, 0, 2], 3).unwrap();
        assert_eq!(tm.most_likely_next(0).unwrap(), Some(2));
        assert_eq!(tm.most_likely_next(1).unwrap(), Some(0));
        let single = TransitionMatrix::from_labels(&[1, 1], 2).unwrap();
        assert_eq!(single.most_likely_next(1).unwrap(), None);
    }

    #[test]
    fn test_sample_next_respects_zero_entries() {
        let tm = TransitionMatrix::from_labels(&[0, 1, 0, 1, 2], 3).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..200 {
            assert_eq!(tm.sample_next(0, &mut rng).unwrap(), Some(1));
            let next = tm.sample_next(1, &mut rng).unwrap().unwrap();
            assert!(next == 0 || next == 2);
        }
        assert_eq!(tm.sample_next(2, &mut rng).unwrap(), None);
    }

    #[test]
    fn test_empty_and_single_label() {
        let tm = TransitionMatrix::from_labels(&[], 2).unwrap();
        assert_eq!(tm.total_transitions(), 0);
        let tm = TransitionMatrix::from_labels(&[1], 2).unwrap();
        assert_eq!(tm.total_transitions(), 0);
    }
}
