//! Decision tree structure shown in the tree explorer.
//!
//! A tree is either an internal [`DecisionTree::Node`] with exactly two
//! children or a [`DecisionTree::Leaf`]. Recursion always ends at leaves.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Recursive binary decision tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DecisionTree {
    /// Internal split node
    Node {
        /// Splitting feature
        feature: String,
        /// Samples with `feature <= threshold` go left
        threshold: f64,
        /// Impurity at this node
        impurity: f64,
        /// Training samples reaching this node
        samples: usize,
        /// Left subtree
        left: Box<DecisionTree>,
        /// Right subtree
        right: Box<DecisionTree>,
    },
    /// Terminal node
    Leaf {
        /// Value distribution: class proportions for classification, a
        /// single mean for regression
        value: Vec<f64>,
        /// Training samples reaching this leaf
        samples: usize,
    },
}

impl DecisionTree {
    /// Build a split node
    pub fn node(
        feature: impl Into<String>,
        threshold: f64,
        impurity: f64,
        samples: usize,
        left: DecisionTree,
        right: DecisionTree,
    ) -> Self {
        DecisionTree::Node {
            feature: feature.into(),
            threshold,
            impurity,
            samples,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Build a leaf
    pub fn leaf(value: Vec<f64>, samples: usize) -> Self {
        DecisionTree::Leaf { value, samples }
    }

    /// Whether this is a leaf
    pub fn is_leaf(&self) -> bool {
        matches!(self, DecisionTree::Leaf { .. })
    }

    /// Samples reaching this subtree
    pub fn samples(&self) -> usize {
        match self {
            DecisionTree::Node { samples, .. } | DecisionTree::Leaf { samples, .. } => *samples,
        }
    }

    /// Depth of the tree; a lone leaf has depth 0
    pub fn depth(&self) -> usize {
        match self {
            DecisionTree::Leaf { .. } => 0,
            DecisionTree::Node { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Number of leaves
    pub fn num_leaves(&self) -> usize {
        match self {
            DecisionTree::Leaf { .. } => 1,
            DecisionTree::Node { left, right, .. } => left.num_leaves() + right.num_leaves(),
        }
    }

    /// Number of internal nodes
    pub fn num_splits(&self) -> usize {
        match self {
            DecisionTree::Leaf { .. } => 0,
            DecisionTree::Node { left, right, .. } => 1 + left.num_splits() + right.num_splits(),
        }
    }

    /// Splitting features in pre-order, duplicates removed
    pub fn split_features(&self) -> Vec<&str> {
        let mut features = Vec::new();
        self.collect_features(&mut features);
        features
    }

    fn collect_features<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let DecisionTree::Node {
            feature,
            left,
            right,
            ..
        } = self
        {
            if !out.contains(&feature.as_str()) {
                out.push(feature);
            }
            left.collect_features(out);
            right.collect_features(out);
        }
    }

    /// Follow the splits for one instance and return the leaf value.
    /// Features missing from `lookup` send the instance left.
    pub fn route<F>(&self, lookup: F) -> &[f64]
    where
        F: Fn(&str) -> Option<f64>,
    {
        let mut current = self;
        loop {
            match current {
                DecisionTree::Leaf { value, .. } => return value,
                DecisionTree::Node {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    current = match lookup(feature) {
                        Some(v) if v > *threshold => right.as_ref(),
                        _ => left.as_ref(),
                    };
                }
            }
        }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = "  ".repeat(indent);
        match self {
            DecisionTree::Leaf { value, samples } => {
                let value: Vec<String> = value.iter().map(|v| format!("{:.3}", v)).collect();
                writeln!(f, "{}leaf: value=[{}] samples={}", pad, value.join(", "), samples)
            }
            DecisionTree::Node {
                feature,
                threshold,
                impurity,
                samples,
                left,
                right,
            } => {
                writeln!(
                    f,
                    "{}{} <= {:.3} (impurity={:.3}, samples={})",
                    pad, feature, threshold, impurity, samples
                )?;
                left.fmt_indented(f, indent + 1)?;
                right.fmt_indented(f, indent + 1)
            }
        }
    }
}

impl fmt::Display for DecisionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> DecisionTree {
        DecisionTree::node(
            "glucose",
            120.0,
            0.45,
            100,
            DecisionTree::leaf(vec![0.8, 0.2], 60),
            DecisionTree::node(
                "bmi",
                30.0,
                0.3,
                40,
                DecisionTree::leaf(vec![0.5, 0.5], 15),
                DecisionTree::leaf(vec![0.1, 0.9], 25),
            ),
        )
    }

    #[test]
    fn test_shape() {
        let tree = sample_tree();
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.num_leaves(), 3);
        assert_eq!(tree.num_splits(), 2);
        assert_eq!(tree.samples(), 100);
        assert_eq!(tree.split_features(), vec!["glucose", "bmi"]);
        assert!(!tree.is_leaf());
    }

    #[test]
    fn test_route() {
        let tree = sample_tree();
        let value = tree.route(|f| match f {
            "glucose" => Some(150.0),
            "bmi" => Some(35.0),
            _ => None,
        });
        assert_eq!(value, &[0.1, 0.9]);
        assert_eq!(tree.route(|_| None), &[0.8, 0.2]);
    }

    #[test]
    fn test_serde_tags() {
        let json = serde_json::to_value(sample_tree()).unwrap();
        assert_eq!(json["type"], "node");
        assert_eq!(json["left"]["type"], "leaf");
        let back: DecisionTree = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample_tree());
    }

    #[test]
    fn test_display() {
        let text = sample_tree().to_string();
        assert!(text.starts_with("glucose <= 120.000"));
        assert!(text.contains("    leaf: value=[0.500, 0.500] samples=15"));
    }
}
