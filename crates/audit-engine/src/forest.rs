//! Seeded isolation forest over a dense numeric matrix.
//!
//! Implements the ensemble of Liu et al. 2008: each tree recursively
//! partitions a subsample on a random feature at a random split value, and
//! anomalous points are the ones isolated after unusually short paths. The
//! RNG is seeded, so scores for a fixed input are reproducible across runs.

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};

/// Euler-Mascheroni constant, used by the average path length normalizer.
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// Average path length of an unsuccessful BST search over `n` points.
///
/// This is the `c(n)` normalizer from the paper; it is also the expected
/// depth credited to a leaf that still holds `n` unseparated points.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// An ensemble of isolation trees with a fixed seed.
pub struct IsolationForest {
    num_trees: usize,
    max_samples: usize,
    seed: u64,
}

impl IsolationForest {
    pub fn new(num_trees: usize, max_samples: usize, seed: u64) -> Self {
        Self {
            num_trees,
            max_samples,
            seed,
        }
    }

    /// Anomaly score per row of the matrix, each in `(0.0, 1.0)`.
    ///
    /// Scores near 1.0 mean easily isolated (anomalous); a point that is
    /// never separated earlier than average lands near 0.5 or below. Rows
    /// must be finite and of equal width.
    pub fn score(&self, data: &[Vec<f64>]) -> Vec<f64> {
        let n = data.len();
        if n == 0 || data[0].is_empty() {
            return Vec::new();
        }

        let psi = self.max_samples.min(n);
        let height_limit = ((psi as f64).log2().ceil() as usize).max(1);
        let normalizer = average_path_length(psi);
        if normalizer <= 0.0 {
            // degenerate subsample of one point; nothing is anomalous
            return vec![0.5; n];
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut path_sums = vec![0.0; n];

        for _ in 0..self.num_trees {
            let indices: Vec<usize> = if psi < n {
                sample(&mut rng, n, psi).into_vec()
            } else {
                (0..n).collect()
            };

            let tree = build_tree(data, indices, 0, height_limit, &mut rng);
            for (i, row) in data.iter().enumerate() {
                path_sums[i] += path_length(&tree, row, 0);
            }
        }

        path_sums
            .iter()
            .map(|sum| {
                let mean_path = sum / self.num_trees as f64;
                2f64.powf(-mean_path / normalizer)
            })
            .collect()
    }
}

fn build_tree(
    data: &[Vec<f64>],
    indices: Vec<usize>,
    depth: usize,
    height_limit: usize,
    rng: &mut StdRng,
) -> Node {
    if depth >= height_limit || indices.len() <= 1 {
        return Node::Leaf {
            size: indices.len(),
        };
    }

    // only features with an actual spread can separate points
    let num_features = data[indices[0]].len();
    let mut candidates = Vec::new();
    for feature in 0..num_features {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &i in &indices {
            let v = data[i][feature];
            min = min.min(v);
            max = max.max(v);
        }
        if min < max {
            candidates.push((feature, min, max));
        }
    }
    if candidates.is_empty() {
        return Node::Leaf {
            size: indices.len(),
        };
    }

    let (feature, min, max) = candidates[rng.gen_range(0..candidates.len())];
    let threshold = rng.gen_range(min..max);

    let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
        .into_iter()
        .partition(|&i| data[i][feature] < threshold);

    Node::Split {
        feature,
        threshold,
        left: Box::new(build_tree(data, left_idx, depth + 1, height_limit, rng)),
        right: Box::new(build_tree(data, right_idx, depth + 1, height_limit, rng)),
    }
}

fn path_length(node: &Node, row: &[f64], depth: usize) -> f64 {
    match node {
        Node::Leaf { size } => depth as f64 + average_path_length(*size),
        Node::Split {
            feature,
            threshold,
            left,
            right,
        } => {
            if row[*feature] < *threshold {
                path_length(left, row, depth + 1)
            } else {
                path_length(right, row, depth + 1)
            }
        }
    }
}
