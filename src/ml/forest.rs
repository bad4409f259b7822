//! Random forest binary classifier
//!
//! Bootstrap-sampled CART trees split on Gini impurity. Class
//! probabilities are the mean of per-tree leaf frequencies, so the forest
//! returns soft probabilities rather than vote counts. Each tree gets its
//! own RNG seeded from `seed + tree_index`, which makes training
//! reproducible.

use crate::error::{PredictorError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features tried per split; `None` = ceil(sqrt(n_features))
    pub max_features: Option<usize>,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 200,
            max_depth: 8,
            min_samples_split: 4,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        prob_up: f64,
        n_samples: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn prob_up(&self, row: &[f64]) -> f64 {
        let mut node = self;
        loop {
            match node {
                Node::Leaf { prob_up, .. } => return *prob_up,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { &**left } else { &**right };
                }
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Node,
}

impl DecisionTree {
    pub fn prob_up(&self, row: &[f64]) -> f64 {
        self.root.prob_up(row)
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }
}

/// Gini impurity of a binary node with `pos` positives out of `count`
fn gini(pos: usize, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let p = pos as f64 / count as f64;
    2.0 * p * (1.0 - p)
}

struct TreeBuilder<'a> {
    rows: &'a [Vec<f64>],
    targets: &'a [u8],
    params: &'a ForestParams,
    n_features: usize,
    max_features: usize,
}

impl TreeBuilder<'_> {
    fn build(&self, indices: &[usize], depth: usize, rng: &mut StdRng) -> Node {
        let count = indices.len();
        let pos = indices.iter().filter(|&&i| self.targets[i] == 1).count();
        let impurity = gini(pos, count);

        let leaf = Node::Leaf {
            prob_up: if count == 0 { 0.5 } else { pos as f64 / count as f64 },
            n_samples: count,
        };

        if depth >= self.params.max_depth
            || count < self.params.min_samples_split
            || impurity <= f64::EPSILON
        {
            return leaf;
        }

        let Some((feature, threshold)) = self.best_split(indices, pos, impurity, rng) else {
            return leaf;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.rows[i][feature] <= threshold);
        if left.is_empty() || right.is_empty() {
            return leaf;
        }

        Node::Split {
            feature,
            threshold,
            left: Box::new(self.build(&left, depth + 1, rng)),
            right: Box::new(self.build(&right, depth + 1, rng)),
        }
    }

    fn best_split(
        &self,
        indices: &[usize],
        total_pos: usize,
        parent_impurity: f64,
        rng: &mut StdRng,
    ) -> Option<(usize, f64)> {
        let n = indices.len();
        let min_leaf = self.params.min_samples_leaf.max(1);

        let mut candidates: Vec<usize> = (0..self.n_features).collect();
        candidates.shuffle(rng);
        candidates.truncate(self.max_features);

        let mut best_gain = 0.0;
        let mut best: Option<(usize, f64)> = None;

        for &feature in &candidates {
            let mut column: Vec<(f64, u8)> = indices
                .iter()
                .map(|&i| (self.rows[i][feature], self.targets[i]))
                .collect();
            column.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_pos = 0usize;
            for i in 0..n - 1 {
                left_pos += column[i].1 as usize;
                let left_count = i + 1;
                let right_count = n - left_count;

                if column[i].0 == column[i + 1].0
                    || left_count < min_leaf
                    || right_count < min_leaf
                {
                    continue;
                }

                let weighted = (gini(left_pos, left_count) * left_count as f64
                    + gini(total_pos - left_pos, right_count) * right_count as f64)
                    / n as f64;
                let gain = parent_impurity - weighted;
                if gain > best_gain + 1e-12 {
                    best_gain = gain;
                    best = Some((feature, (column[i].0 + column[i + 1].0) / 2.0));
                }
            }
        }

        best
    }
}

/// Ensemble of decision trees predicting P(next candle up)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    params: ForestParams,
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForestClassifier {
    /// Fit on rows with binary targets (0 = down, 1 = up)
    pub fn fit(params: ForestParams, rows: &[Vec<f64>], targets: &[u8]) -> Result<Self> {
        if rows.is_empty() {
            return Err(PredictorError::InvalidInput(
                "cannot fit forest on zero rows".to_string(),
            ));
        }
        if rows.len() != targets.len() {
            return Err(PredictorError::InvalidInput(format!(
                "{} rows but {} targets",
                rows.len(),
                targets.len()
            )));
        }
        if params.n_trees == 0 {
            return Err(PredictorError::InvalidInput("n_trees must be > 0".to_string()));
        }
        let n_features = rows[0].len();
        if n_features == 0 || rows.iter().any(|r| r.len() != n_features) {
            return Err(PredictorError::InvalidInput(
                "forest rows must share a non-zero width".to_string(),
            ));
        }

        let max_features = params
            .max_features
            .unwrap_or_else(|| (n_features as f64).sqrt().ceil() as usize)
            .clamp(1, n_features);

        let builder = TreeBuilder {
            rows,
            targets,
            params: &params,
            n_features,
            max_features,
        };

        let n = rows.len();
        let trees: Vec<DecisionTree> = (0..params.n_trees)
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(i as u64));
                let sample: Vec<usize> = if params.bootstrap {
                    (0..n).map(|_| rng.random_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                DecisionTree {
                    root: builder.build(&sample, 0, &mut rng),
                }
            })
            .collect();

        debug!(
            "Fitted forest: {} trees, {} features, {} rows, max depth {}",
            trees.len(),
            n_features,
            n,
            trees.iter().map(DecisionTree::depth).max().unwrap_or(0)
        );

        Ok(Self {
            params,
            n_features,
            trees,
        })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    /// Mean leaf probability of the up class across trees
    pub fn predict_proba(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.n_features {
            return Err(PredictorError::InvalidInput(format!(
                "forest expects {} features, got {}",
                self.n_features,
                row.len()
            )));
        }
        if self.trees.is_empty() {
            return Ok(0.5);
        }
        let sum: f64 = self.trees.iter().map(|t| t.prob_up(row)).sum();
        Ok(sum / self.trees.len() as f64)
    }

    /// Fraction of rows whose thresholded prediction matches the target
    pub fn accuracy(&self, rows: &[Vec<f64>], targets: &[u8]) -> Result<f64> {
        if rows.is_empty() {
            return Ok(0.0);
        }
        let mut correct = 0usize;
        for (row, &target) in rows.iter().zip(targets) {
            let predicted = u8::from(self.predict_proba(row)? >= 0.5);
            if predicted == target {
                correct += 1;
            }
        }
        Ok(correct as f64 / rows.len() as f64)
    }
}
