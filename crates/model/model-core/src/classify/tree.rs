//! CART decision tree classifier
//!
//! Binary splits of the form `x[feature] <= threshold`, chosen to minimise
//! weighted Gini impurity. Sample weights let the forest express bootstrap
//! multiplicity and class weighting without copying rows.

use model_api::MaxFeatures;
use model_spi::{ClassProbabilities, Classifier, ModelError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

const IMPURITY_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        distribution: Vec<f64>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Decision tree classifier.
///
/// @algorithm CART
/// @category MachineLearning
/// @complexity O(m * n log n * depth) fit, O(depth) predict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    max_depth: Option<usize>,
    min_samples_split: usize,
    max_features: MaxFeatures,
    seed: u64,
    nodes: Vec<Node>,
    n_classes: usize,
    n_features: usize,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

/// Borrowed training data for one fit.
struct TrainingSet<'a> {
    x: &'a [Vec<f64>],
    y: &'a [usize],
    weights: &'a [f64],
}

impl DecisionTree {
    pub fn new(max_depth: Option<usize>) -> Self {
        Self {
            max_depth,
            min_samples_split: 2,
            max_features: MaxFeatures::All,
            seed: 0,
            nodes: Vec::new(),
            n_classes: 0,
            n_features: 0,
        }
    }

    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split.max(2);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Number of nodes (splits and leaves).
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    /// Fit with per-sample weights.
    ///
    /// Rows with zero weight are ignored. `n_classes` fixes the length of the
    /// leaf distributions so trees fitted on different bootstrap samples agree.
    pub fn fit_weighted(
        &mut self,
        x: &[Vec<f64>],
        y: &[usize],
        weights: &[f64],
        n_classes: usize,
    ) -> Result<()> {
        let width = crate::matrix_width(x)?;
        if x.len() != y.len() || x.len() != weights.len() {
            return Err(ModelError::InvalidData(format!(
                "{} feature rows, {} labels, {} weights",
                x.len(),
                y.len(),
                weights.len()
            )));
        }
        if let Some(&bad) = y.iter().find(|&&label| label >= n_classes) {
            return Err(ModelError::InvalidData(format!(
                "class id {} out of range for {} classes",
                bad, n_classes
            )));
        }

        let indices: Vec<usize> = (0..x.len()).filter(|&i| weights[i] > 0.0).collect();
        if indices.is_empty() {
            return Err(ModelError::InvalidData(
                "all sample weights are zero".to_string(),
            ));
        }

        self.n_features = width;
        self.n_classes = n_classes;
        self.nodes.clear();

        let data = TrainingSet { x, y, weights };
        let mut rng = StdRng::seed_from_u64(self.seed);
        self.build(&data, indices, 0, &mut rng);
        Ok(())
    }

    fn build(&mut self, data: &TrainingSet<'_>, indices: Vec<usize>, depth: usize, rng: &mut StdRng) -> usize {
        let totals = self.class_weights(data, &indices);
        let total_weight: f64 = totals.iter().sum();
        let node_id = self.nodes.len();

        let is_pure = totals.iter().filter(|&&w| w > 0.0).count() <= 1;
        let depth_reached = self.max_depth.is_some_and(|max| depth >= max);
        if is_pure || depth_reached || indices.len() < self.min_samples_split {
            self.nodes.push(leaf(totals, total_weight));
            return node_id;
        }

        let parent_impurity = gini(&totals, total_weight);
        let split = match self.best_split(data, &indices, &totals, total_weight, rng) {
            Some(split) if split.impurity < parent_impurity - IMPURITY_EPSILON => split,
            _ => {
                self.nodes.push(leaf(totals, total_weight));
                return node_id;
            }
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| data.x[i][split.feature] <= split.threshold);

        // Placeholder, patched once both children exist
        self.nodes.push(Node::Leaf {
            distribution: Vec::new(),
        });
        let left = self.build(data, left_idx, depth + 1, rng);
        let right = self.build(data, right_idx, depth + 1, rng);
        self.nodes[node_id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node_id
    }

    fn class_weights(&self, data: &TrainingSet<'_>, indices: &[usize]) -> Vec<f64> {
        let mut totals = vec![0.0; self.n_classes];
        for &i in indices {
            totals[data.y[i]] += data.weights[i];
        }
        totals
    }

    fn best_split(
        &self,
        data: &TrainingSet<'_>,
        indices: &[usize],
        totals: &[f64],
        total_weight: f64,
        rng: &mut StdRng,
    ) -> Option<SplitCandidate> {
        let mut features: Vec<usize> = (0..self.n_features).collect();
        features.shuffle(rng);
        let budget = self.max_features.resolve(self.n_features);

        let mut best: Option<SplitCandidate> = None;
        let mut visited = 0;
        let mut sorted = indices.to_vec();

        for feature in features {
            if visited >= budget {
                break;
            }
            sorted.sort_by(|&a, &b| {
                data.x[a][feature]
                    .partial_cmp(&data.x[b][feature])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            let first = data.x[sorted[0]][feature];
            let last = data.x[sorted[sorted.len() - 1]][feature];
            // Constant features within the node do not count against the budget
            if first == last {
                continue;
            }
            visited += 1;

            let mut left = vec![0.0; self.n_classes];
            let mut left_weight = 0.0;
            for pos in 0..sorted.len() - 1 {
                let i = sorted[pos];
                left[data.y[i]] += data.weights[i];
                left_weight += data.weights[i];

                let value = data.x[i][feature];
                let next = data.x[sorted[pos + 1]][feature];
                if value == next {
                    continue;
                }
                let right_weight = total_weight - left_weight;
                if left_weight <= 0.0 || right_weight <= 0.0 {
                    continue;
                }

                let right: Vec<f64> = totals.iter().zip(left.iter()).map(|(t, l)| t - l).collect();
                let impurity = (left_weight * gini(&left, left_weight)
                    + right_weight * gini(&right, right_weight))
                    / total_weight;

                if best.as_ref().map_or(true, |b| impurity < b.impurity - IMPURITY_EPSILON) {
                    let mut threshold = value + (next - value) / 2.0;
                    if threshold >= next {
                        threshold = value;
                    }
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        impurity,
                    });
                }
            }
        }
        best
    }
}

fn gini(counts: &[f64], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    1.0 - counts.iter().map(|c| (c / total).powi(2)).sum::<f64>()
}

fn leaf(totals: Vec<f64>, total_weight: f64) -> Node {
    let distribution = if total_weight > 0.0 {
        totals.into_iter().map(|w| w / total_weight).collect()
    } else {
        totals
    };
    Node::Leaf { distribution }
}

impl Classifier for DecisionTree {
    fn fit(&mut self, x: &[Vec<f64>], y: &[usize]) -> Result<()> {
        let n_classes = y.iter().copied().max().map_or(0, |m| m + 1);
        let weights = vec![1.0; x.len()];
        self.fit_weighted(x, y, &weights, n_classes)
    }

    fn predict_proba(&self, row: &[f64]) -> Result<ClassProbabilities> {
        if !self.is_fitted() {
            return Err(ModelError::NotFitted);
        }
        crate::check_row(row, self.n_features)?;

        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { distribution } => {
                    return Ok(ClassProbabilities::new(distribution.clone()));
                }
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn is_fitted(&self) -> bool {
        !self.nodes.is_empty()
    }
}
