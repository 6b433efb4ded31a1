//! Shared `base + extra` sharding rule used by both fan-out specializations:
//! split a total count as evenly as possible across a worker count.

/// Split `total` units across `workers` shares as evenly as possible:
/// `base = total / workers`, and the first `total % workers` shares get one
/// extra unit. Shares of zero are kept in the output; callers skip them.
pub fn even_shares(total: u64, workers: usize) -> Vec<u64> {
    if workers == 0 {
        return Vec::new();
    }
    let workers = workers as u64;
    let base = total / workers;
    let extra = total % workers;
    (0..workers)
        .map(|i| base + if i < extra { 1 } else { 0 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evenly_divisible() {
        assert_eq!(even_shares(9, 3), vec![3, 3, 3]);
    }

    #[test]
    fn remainder_goes_to_the_first_shares() {
        assert_eq!(even_shares(1000, 2), vec![500, 500]);
        assert_eq!(even_shares(2, 3), vec![1, 1, 0]);
        assert_eq!(even_shares(1, 3), vec![1, 0, 0]);
    }

    #[test]
    fn zero_workers_yields_no_shares() {
        assert_eq!(even_shares(10, 0), Vec::<u64>::new());
    }

    #[test]
    fn shares_always_sum_to_total() {
        for total in [0u64, 1, 2, 6, 1000, 12345] {
            for workers in 1..=7usize {
                let shares = even_shares(total, workers);
                assert_eq!(shares.iter().sum::<u64>(), total);
            }
        }
    }
}
