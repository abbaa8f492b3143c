//! Random forest of CART classification trees.
//!
//! Trees are grown sequentially from one seeded generator so that identical
//! training data always yields an identical forest.

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

/// Hyperparameters of the forest
#[derive(Debug, Clone, PartialEq)]
pub struct ForestConfig {
    /// Number of trees in the ensemble
    pub n_estimators: usize,
    /// Maximum tree depth; `None` grows until leaves are pure
    pub max_depth: Option<usize>,
    /// Minimum node size eligible for splitting
    pub min_samples_split: usize,
    /// Seed for bootstrap and feature sampling
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

/// Bagged ensemble of Gini decision trees
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_classes: usize,
}

impl RandomForest {
    /// Fits the forest on encoded samples with class indices `0..n_classes`.
    pub fn fit(samples: &[Vec<f64>], labels: &[usize], n_classes: usize, config: &ForestConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let n_features = samples.first().map(Vec::len).unwrap_or(0);
        let max_features = ((n_features as f64).sqrt().floor() as usize).max(1);

        let trees = (0..config.n_estimators)
            .map(|_| {
                let bootstrap: Vec<usize> = (0..samples.len())
                    .map(|_| rng.random_range(0..samples.len()))
                    .collect();

                let builder = TreeBuilder {
                    samples,
                    labels,
                    n_classes,
                    n_features,
                    max_features,
                    config,
                };
                DecisionTree {
                    root: builder.grow(bootstrap, 0, &mut rng),
                }
            })
            .collect();

        Self { trees, n_classes }
    }

    /// Mean of the per-tree leaf class distributions
    pub fn predict_proba(&self, sample: &[f64]) -> Vec<f64> {
        let mut proba = vec![0.0; self.n_classes];
        if self.trees.is_empty() {
            return proba;
        }

        for tree in &self.trees {
            for (acc, p) in proba.iter_mut().zip(tree.distribution(sample)) {
                *acc += p;
            }
        }

        let n = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n);
        proba
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

#[derive(Debug, Clone)]
struct DecisionTree {
    root: TreeNode,
}

#[derive(Debug, Clone)]
enum TreeNode {
    Leaf {
        distribution: Vec<f64>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl DecisionTree {
    fn distribution(&self, sample: &[f64]) -> &[f64] {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { distribution } => return distribution,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if sample[*feature] <= *threshold {
                        left.as_ref()
                    } else {
                        right.as_ref()
                    };
                }
            }
        }
    }
}

struct TreeBuilder<'a> {
    samples: &'a [Vec<f64>],
    labels: &'a [usize],
    n_classes: usize,
    n_features: usize,
    max_features: usize,
    config: &'a ForestConfig,
}

/// Best partition found for a node
struct Split {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

impl TreeBuilder<'_> {
    fn class_counts(&self, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0; self.n_classes];
        for &i in indices {
            counts[self.labels[i]] += 1;
        }
        counts
    }

    fn leaf(&self, counts: &[usize], total: usize) -> TreeNode {
        let total = total.max(1) as f64;
        TreeNode::Leaf {
            distribution: counts.iter().map(|&c| c as f64 / total).collect(),
        }
    }

    /// Recursively grows a node. Stops on purity, the depth limit, too few
    /// samples, or when no feature separates the node.
    fn grow(&self, indices: Vec<usize>, depth: usize, rng: &mut StdRng) -> TreeNode {
        let counts = self.class_counts(&indices);
        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let depth_reached = self.config.max_depth.is_some_and(|max| depth >= max);

        if pure || depth_reached || indices.len() < self.config.min_samples_split {
            return self.leaf(&counts, indices.len());
        }

        let Some(split) = self.find_split(&indices, rng) else {
            return self.leaf(&counts, indices.len());
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.samples[i][split.feature] <= split.threshold);
        if left.is_empty() || right.is_empty() {
            return self.leaf(&counts, indices.len());
        }

        TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(self.grow(left, depth + 1, rng)),
            right: Box::new(self.grow(right, depth + 1, rng)),
        }
    }

    /// Evaluates `max_features` random features, continuing past that budget
    /// only while no valid partition has been found.
    fn find_split(&self, indices: &[usize], rng: &mut StdRng) -> Option<Split> {
        let mut features: Vec<usize> = (0..self.n_features).collect();
        features.shuffle(rng);

        let mut best: Option<Split> = None;
        for (visited, &feature) in features.iter().enumerate() {
            if visited >= self.max_features && best.is_some() {
                break;
            }
            if let Some(candidate) = self.best_threshold(indices, feature) {
                if best.as_ref().map_or(true, |b| candidate.impurity < b.impurity) {
                    best = Some(candidate);
                }
            }
        }
        best
    }

    /// Sweeps sorted values of one feature and returns the threshold with the
    /// lowest weighted Gini impurity.
    fn best_threshold(&self, indices: &[usize], feature: usize) -> Option<Split> {
        let mut ordered: Vec<(f64, usize)> = indices
            .iter()
            .map(|&i| (self.samples[i][feature], self.labels[i]))
            .collect();
        ordered.sort_by(|a, b| a.0.total_cmp(&b.0));

        let total = ordered.len();
        let mut right_counts = vec![0usize; self.n_classes];
        for &(_, label) in &ordered {
            right_counts[label] += 1;
        }
        let mut left_counts = vec![0usize; self.n_classes];

        let mut best: Option<Split> = None;
        for pos in 1..total {
            let label = ordered[pos - 1].1;
            left_counts[label] += 1;
            right_counts[label] -= 1;

            let (prev, next) = (ordered[pos - 1].0, ordered[pos].0);
            if prev >= next {
                continue;
            }

            let impurity = (pos as f64 * gini(&left_counts, pos)
                + (total - pos) as f64 * gini(&right_counts, total - pos))
                / total as f64;

            if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                best = Some(Split {
                    feature,
                    threshold: prev + (next - prev) / 2.0,
                    impurity,
                });
            }
        }
        best
    }
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}
