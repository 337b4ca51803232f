//! Decision tree representation for the tree explorer.

pub mod node;

pub use node::DecisionTree;
