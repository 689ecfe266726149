use serde::{Deserialize, Serialize};

/// Result of offering a collectible value to the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Collection {
    /// The value was the expected next one. `remaining` counts what is left.
    Accepted { value: u32, remaining: usize },
    /// Out of order (or the sequence is already complete). Nothing changed.
    Rejected { expected: Option<u32> },
}

/// Enforces that collectibles are picked up in a prescribed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceValidator {
    sequence: Vec<u32>,
    next_index: usize,
    total: u64,
    complete: bool,
}

impl SequenceValidator {
    pub fn new(sequence: Vec<u32>) -> Self {
        Self {
            complete: sequence.is_empty(),
            sequence,
            next_index: 0,
            total: 0,
        }
    }

    /// Accept `value` only if it is the next one in the sequence.
    pub fn attempt_collect(&mut self, value: u32) -> Collection {
        match self.expected() {
            Some(expected) if expected == value => {
                self.next_index += 1;
                self.total += u64::from(value);
                if self.next_index == self.sequence.len() {
                    self.complete = true;
                }
                Collection::Accepted {
                    value,
                    remaining: self.remaining(),
                }
            },
            expected => Collection::Rejected { expected },
        }
    }

    /// The value that will be accepted next, `None` once complete.
    pub fn expected(&self) -> Option<u32> {
        self.sequence.get(self.next_index).copied()
    }

    pub fn next_index(&self) -> usize {
        self.next_index
    }

    pub fn remaining(&self) -> usize {
        self.sequence.len() - self.next_index
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn sequence(&self) -> &[u32] {
        &self.sequence
    }

    /// Back to the first value with nothing collected.
    pub fn reset(&mut self) {
        self.next_index = 0;
        self.total = 0;
        self.complete = self.sequence.is_empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_order_sequence_completes_with_target_total() {
        let mut v = SequenceValidator::new(vec![1, 2, 3, 4]);
        for value in 1..=4 {
            assert!(matches!(
                v.attempt_collect(value),
                Collection::Accepted { .. }
            ));
        }
        assert!(v.is_complete());
        assert_eq!(v.total(), 10);
        assert_eq!(v.remaining(), 0);
        assert_eq!(v.expected(), None);
    }

    #[test]
    fn second_level_total() {
        let mut v = SequenceValidator::new(vec![5, 6, 7, 8]);
        for value in [5, 6, 7, 8] {
            v.attempt_collect(value);
        }
        assert!(v.is_complete());
        assert_eq!(v.total(), 26);
    }

    #[test]
    fn out_of_order_is_rejected_without_state_change() {
        let mut v = SequenceValidator::new(vec![1, 2, 3, 4]);
        let before = v.clone();
        assert_eq!(
            v.attempt_collect(2),
            Collection::Rejected { expected: Some(1) }
        );
        assert_eq!(v, before, "rejection must not change the validator");
        assert_eq!(v.next_index(), 0);
        assert_eq!(v.total(), 0);
    }

    #[test]
    fn accepted_reports_remaining() {
        let mut v = SequenceValidator::new(vec![1, 2, 3]);
        assert_eq!(
            v.attempt_collect(1),
            Collection::Accepted {
                value: 1,
                remaining: 2
            }
        );
    }

    #[test]
    fn complete_validator_rejects_everything() {
        let mut v = SequenceValidator::new(vec![7]);
        v.attempt_collect(7);
        assert_eq!(v.attempt_collect(7), Collection::Rejected { expected: None });
        assert_eq!(v.total(), 7);
    }

    #[test]
    fn duplicate_values_are_consumed_in_turn() {
        let mut v = SequenceValidator::new(vec![3, 3, 4]);
        assert!(matches!(v.attempt_collect(3), Collection::Accepted { .. }));
        assert!(matches!(v.attempt_collect(4), Collection::Rejected { .. }));
        assert!(matches!(v.attempt_collect(3), Collection::Accepted { .. }));
        assert!(matches!(v.attempt_collect(4), Collection::Accepted { .. }));
        assert!(v.is_complete());
        assert_eq!(v.total(), 10);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut v = SequenceValidator::new(vec![1, 2]);
        v.attempt_collect(1);
        v.attempt_collect(2);
        v.reset();
        assert_eq!(v, SequenceValidator::new(vec![1, 2]));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        /// Reference check: does `calls` contain `target` as an in-order subsequence?
        fn contains_subsequence(calls: &[u32], target: &[u32]) -> bool {
            let mut it = target.iter().peekable();
            for c in calls {
                if it.peek() == Some(&c) {
                    it.next();
                }
            }
            it.peek().is_none()
        }

        proptest! {
            #[test]
            fn completes_iff_subsequence_consumed(
                target in proptest::collection::vec(1u32..6, 1..6),
                calls in proptest::collection::vec(1u32..6, 0..40),
            ) {
                let mut v = SequenceValidator::new(target.clone());
                for &c in &calls {
                    let before = v.next_index();
                    match v.attempt_collect(c) {
                        Collection::Accepted { .. } => {
                            prop_assert_eq!(v.next_index(), before + 1);
                        },
                        Collection::Rejected { .. } => {
                            prop_assert_eq!(v.next_index(), before);
                        },
                    }
                }
                prop_assert_eq!(v.is_complete(), contains_subsequence(&calls, &target));
                if v.is_complete() {
                    let sum: u64 = target.iter().map(|&x| u64::from(x)).sum();
                    prop_assert_eq!(v.total(), sum);
                }
            }
        }
    }
}
