/// Outcome counts of a best-effort bulk operation.
///
/// A non-zero `failed` count is not an error by itself; callers decide
/// whether partial failure matters to them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl TransferSummary {
    pub fn new(succeeded: usize, failed: usize) -> Self {
        Self { succeeded, failed }
    }

    pub fn success() -> Self {
        Self::new(1, 0)
    }

    pub fn failure() -> Self {
        Self::new(0, 1)
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }

    /// Nothing was attempted
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl std::ops::Add for TransferSummary {
    type Output = TransferSummary;

    fn add(self, other: TransferSummary) -> TransferSummary {
        TransferSummary::new(self.succeeded + other.succeeded, self.failed + other.failed)
    }
}

impl std::iter::Sum for TransferSummary {
    fn sum<I: Iterator<Item = TransferSummary>>(iter: I) -> Self {
        iter.fold(TransferSummary::default(), |acc, s| acc + s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summaries_add_up() {
        let total: TransferSummary = vec![
            TransferSummary::success(),
            TransferSummary::failure(),
            TransferSummary::success(),
        ]
        .into_iter()
        .sum();

        assert_eq!(total, TransferSummary::new(2, 1));
        assert_eq!(total.total(), 3);
        assert!(!total.is_complete());
        assert!(TransferSummary::default().is_empty());
    }

    #[test]
    fn test_failed_only_summary_is_not_empty() {
        let summary = TransferSummary::failure();
        assert!(!summary.is_empty());
        assert_eq!(summary.succeeded, 0);
    }
}
