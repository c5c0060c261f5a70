// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Randomly shuffles rows and splits them into two sets:
//   - Training set:   used to fit the pipeline and both models
//   - Validation set: used to measure performance on unseen data
//
// Why shuffle before splitting?
//   Sales datasets are often ordered (e.g. by brand or by year of
//   listing). Without shuffling, the validation set would only
//   contain one slice of the market. Shuffling ensures both sets
//   have a representative mix.
//
// Why a caller-supplied seed instead of thread_rng?
//   The forest must be reproducible: the same dataset and the
//   same seed have to yield the same trees, and that starts with
//   the same train/validation membership.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom
// which is the standard unbiased shuffle algorithm.
//
// Reference: Rust Book §8 (Vectors)
//            rand crate documentation

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Shuffle `rows` with a seeded rng and split into (train, validation).
///
/// # Arguments
/// * `rows`           - All available rows (consumed by this function)
/// * `train_fraction` - Proportion for training, e.g. 0.8 = 80%
/// * `seed`           - Shuffle seed; same seed → same split
///
/// # Returns
/// A tuple (train_rows, val_rows)
pub fn split_train_val<T>(mut rows: Vec<T>, train_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);

    // Fisher-Yates shuffle — every permutation is equally likely
    rows.shuffle(&mut rng);

    // e.g. 100 rows * 0.8 = 80 → first 80 are training
    let total    = rows.len();
    let split_at = ((total as f64) * train_fraction).round() as usize;

    // Clamp to valid range to avoid panics on tiny datasets
    let split_at = split_at.min(total);

    // split_off(n) removes elements [n..] from the Vec and returns them
    let val = rows.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} validation",
        rows.len(),
        val.len(),
    );

    (rows, val)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_split_sizes() {
        let items: Vec<usize> = (0..100).collect();
        let (train, val)      = split_train_val(items, 0.8, 42);
        assert_eq!(train.len(), 80);
        assert_eq!(val.len(),   20);
    }

    #[test]
    fn test_all_items_preserved() {
        // No items should be lost in the split
        let items: Vec<usize> = (0..50).collect();
        let (mut train, val)  = split_train_val(items, 0.7, 7);
        train.extend(val);
        train.sort_unstable();
        assert_eq!(train, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_split() {
        let a = split_train_val((0..200).collect::<Vec<usize>>(), 0.8, 42);
        let b = split_train_val((0..200).collect::<Vec<usize>>(), 0.8, 42);
        assert_eq!(a.0, b.0);
        assert_eq!(a.1, b.1);
    }

    #[test]
    fn test_different_seed_different_shuffle() {
        let a = split_train_val((0..200).collect::<Vec<usize>>(), 0.8, 1);
        let b = split_train_val((0..200).collect::<Vec<usize>>(), 0.8, 2);
        assert_ne!(a.0, b.0);
    }

    #[test]
    fn test_empty_dataset() {
        let items: Vec<usize> = Vec::new();
        let (train, val)      = split_train_val(items, 0.8, 42);
        assert!(train.is_empty());
        assert!(val.is_empty());
    }

    #[test]
    fn test_full_training_split() {
        // 1.0 fraction means everything goes to training
        let items: Vec<usize> = (0..10).collect();
        let (train, val)      = split_train_val(items, 1.0, 42);
        assert_eq!(train.len(), 10);
        assert!(val.is_empty());
    }
}
