//! Regression trees — the members of the random-forest ensemble.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Per-tree growth limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Number of candidate features per split; `None` considers all.
    pub max_features: Option<usize>,
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_samples_split: 5,
            min_samples_leaf: 2,
            max_features: None,
            seed: 42,
        }
    }
}

/// A split node or leaf. Leaves carry the mean label of their samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TreeNode {
    feature_idx: Option<usize>,
    threshold: Option<f64>,
    value: f64,
    left: Option<Box<TreeNode>>,
    right: Option<Box<TreeNode>>,
}

impl TreeNode {
    fn leaf(value: f64) -> Self {
        Self {
            feature_idx: None,
            threshold: None,
            value,
            left: None,
            right: None,
        }
    }

    fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// A single regression tree, grown greedily by variance reduction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    config: TreeConfig,
    root: Option<TreeNode>,
}

impl RegressionTree {
    pub fn new(config: TreeConfig) -> Self {
        Self { config, root: None }
    }

    /// Grow the tree over `rows` (samples × features) and `labels`.
    pub fn fit(&mut self, rows: &[Vec<f64>], labels: &[f64]) {
        let indices: Vec<usize> = (0..rows.len()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.root = Some(self.build(rows, labels, &indices, 0, &mut rng));
    }

    fn build(
        &self,
        rows: &[Vec<f64>],
        labels: &[f64],
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let subset: Vec<f64> = indices.iter().map(|&i| labels[i]).collect();
        let impurity = variance(&subset);

        if depth >= self.config.max_depth
            || indices.len() < self.config.min_samples_split
            || impurity < 1e-10
        {
            return TreeNode::leaf(mean(&subset));
        }

        let Some(split) = self.best_split(rows, labels, indices, impurity, rng) else {
            return TreeNode::leaf(mean(&subset));
        };
        let (feature_idx, threshold, left_indices, right_indices) = split;

        if left_indices.len() < self.config.min_samples_leaf
            || right_indices.len() < self.config.min_samples_leaf
        {
            return TreeNode::leaf(mean(&subset));
        }

        let left = self.build(rows, labels, &left_indices, depth + 1, rng);
        let right = self.build(rows, labels, &right_indices, depth + 1, rng);
        TreeNode {
            feature_idx: Some(feature_idx),
            threshold: Some(threshold),
            value: mean(&subset),
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        }
    }

    fn best_split(
        &self,
        rows: &[Vec<f64>],
        labels: &[f64],
        indices: &[usize],
        parent_impurity: f64,
        rng: &mut ChaCha8Rng,
    ) -> Option<(usize, f64, Vec<usize>, Vec<usize>)> {
        let n_features = rows.first().map(Vec::len).unwrap_or(0);
        let max_features = self.config.max_features.unwrap_or(n_features);
        let mut feature_indices: Vec<usize> = (0..n_features).collect();
        feature_indices.shuffle(rng);
        feature_indices.truncate(max_features);

        let mut best_gain = 0.0;
        let mut best: Option<(usize, f64, Vec<usize>, Vec<usize>)> = None;

        for &feature_idx in &feature_indices {
            let mut values: Vec<f64> = indices.iter().map(|&i| rows[i][feature_idx]).collect();
            values.sort_by(f64::total_cmp);
            values.dedup();

            for window in values.windows(2) {
                let threshold = (window[0] + window[1]) / 2.0;
                let (left, right): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .partition(|&&i| rows[i][feature_idx] <= threshold);
                if left.is_empty() || right.is_empty() {
                    continue;
                }

                let left_labels: Vec<f64> = left.iter().map(|&i| labels[i]).collect();
                let right_labels: Vec<f64> = right.iter().map(|&i| labels[i]).collect();
                let n_left = left.len() as f64;
                let n_right = right.len() as f64;
                let weighted = (n_left * variance(&left_labels)
                    + n_right * variance(&right_labels))
                    / (n_left + n_right);
                let gain = parent_impurity - weighted;

                if gain > best_gain {
                    best_gain = gain;
                    best = Some((feature_idx, threshold, left, right));
                }
            }
        }

        best
    }

    /// Predict one sample.
    pub fn predict_one(&self, features: &[f64]) -> f64 {
        let mut node = match &self.root {
            Some(root) => root,
            None => return 0.0,
        };
        loop {
            if node.is_leaf() {
                return node.value;
            }
            let (Some(feature_idx), Some(threshold)) = (node.feature_idx, node.threshold) else {
                return node.value;
            };
            let go_left = features
                .get(feature_idx)
                .map(|&v| v <= threshold)
                .unwrap_or(false);
            let child = if go_left { &node.left } else { &node.right };
            match child {
                Some(next) => node = next,
                None => return node.value,
            }
        }
    }

    pub fn depth(&self) -> usize {
        fn depth_of(node: &TreeNode) -> usize {
            if node.is_leaf() {
                1
            } else {
                let left = node.left.as_deref().map(depth_of).unwrap_or(0);
                let right = node.right.as_deref().map(depth_of).unwrap_or(0);
                1 + left.max(right)
            }
        }
        self.root.as_ref().map(depth_of).unwrap_or(0)
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}
