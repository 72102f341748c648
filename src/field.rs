//! Deterministic pseudo-random field: a pure scalar hash that the scene
//! renderers use to lay out petals, streaks and glows without any stored
//! per-element state. The same seed always yields the same value, which is
//! what makes whole frames reproducible from `(variant, t, size)` alone.

/// Maps an integer seed to a value in `[0, 1)` via `frac(sin(n) * 10000)`.
pub fn hash(n: i64) -> f64 {
    let x = (n as f64).sin() * 10_000.0;
    x - x.floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_in_unit_interval() {
        for seed in (-1_000_000..=1_000_000).step_by(7919) {
            let value = hash(seed);
            assert!((0.0..1.0).contains(&value), "hash({seed}) = {value}");
        }
    }

    #[test]
    fn same_seed_same_value() {
        for seed in [0, 1, -1, 999_983, 92_821 * 4, 81_173 * 9] {
            assert_eq!(hash(seed).to_bits(), hash(seed).to_bits());
        }
    }

    #[test]
    fn adjacent_seeds_decorrelate() {
        // Consecutive seeds should not cluster; a coarse spread check.
        let mut distinct_buckets = std::collections::HashSet::new();
        for seed in 0..100 {
            distinct_buckets.insert((hash(seed) * 10.0) as u32);
        }
        assert!(distinct_buckets.len() >= 8);
    }
}
