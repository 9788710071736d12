//! Hold-out splitting
//!
//! Shuffles sample indices with a seeded generator and cuts them into a
//! training and a test part. With stratification each class contributes to
//! the test part in proportion to its size.

use model_api::SplitConfig;
use model_spi::{ModelError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Split sample indices `0..labels.len()` into `(train, test)`.
///
/// `labels` are class ids; they are only consulted when
/// `config.stratify` is set.
pub fn train_test_split(labels: &[usize], config: &SplitConfig) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(config.test_size > 0.0 && config.test_size < 1.0) {
        return Err(ModelError::invalid_parameter(
            "test_size",
            "must be in (0, 1)",
        ));
    }
    let n = labels.len();
    if n < 2 {
        return Err(ModelError::InsufficientData {
            required: 2,
            actual: n,
        });
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let (mut train, mut test) = if config.stratify {
        let n_classes = labels.iter().copied().max().map_or(0, |m| m + 1);
        let mut by_class: Vec<Vec<usize>> = vec![Vec::new(); n_classes];
        for (i, &label) in labels.iter().enumerate() {
            by_class[label].push(i);
        }
        if by_class.iter().any(|members| members.len() == 1) {
            return Err(ModelError::InvalidData(
                "the least populated class has only 1 member, which is too few to stratify"
                    .to_string(),
            ));
        }

        let mut train = Vec::with_capacity(n);
        let mut test = Vec::new();
        for mut members in by_class.into_iter().filter(|m| !m.is_empty()) {
            members.shuffle(&mut rng);
            let n_test = ((members.len() as f64 * config.test_size).round() as usize)
                .clamp(1, members.len() - 1);
            test.extend_from_slice(&members[..n_test]);
            train.extend_from_slice(&members[n_test..]);
        }
        (train, test)
    } else {
        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(&mut rng);
        let n_test = ((n as f64 * config.test_size).ceil() as usize).clamp(1, n - 1);
        let train = indices.split_off(n_test);
        (train, indices)
    };

    train.shuffle(&mut rng);
    test.shuffle(&mut rng);
    Ok((train, test))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_is_a_partition() {
        let labels: Vec<usize> = (0..50).map(|i| i % 2).collect();
        let (train, test) = train_test_split(&labels, &SplitConfig::default()).unwrap();
        assert_eq!(train.len() + test.len(), 50);
        let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
        all.sort();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_stratified_keeps_proportions() {
        let labels: Vec<usize> = (0..100).map(|i| usize::from(i < 20)).collect();
        let (_, test) = train_test_split(&labels, &SplitConfig::default()).unwrap();
        assert_eq!(test.len(), 20);
        let minority = test.iter().filter(|&&i| labels[i] == 1).count();
        assert_eq!(minority, 4);
    }

    #[test]
    fn test_same_seed_same_split() {
        let labels: Vec<usize> = (0..30).map(|i| i % 3).collect();
        let a = train_test_split(&labels, &SplitConfig::new(0.3, 9)).unwrap();
        let b = train_test_split(&labels, &SplitConfig::new(0.3, 9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unstratified_size() {
        let labels = vec![0; 10];
        let config = SplitConfig::new(0.25, 1).without_stratify();
        let (train, test) = train_test_split(&labels, &config).unwrap();
        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 7);
    }

    #[test]
    fn test_singleton_class_cannot_stratify() {
        let labels = vec![0, 0, 0, 1];
        assert!(train_test_split(&labels, &SplitConfig::default()).is_err());
    }

    #[test]
    fn test_invalid_test_size() {
        let labels = vec![0, 1, 0, 1];
        assert!(train_test_split(&labels, &SplitConfig::new(1.0, 0)).is_err());
    }
}
