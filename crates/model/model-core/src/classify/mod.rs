//! Classifiers
//!
//! - [`KnnClassifier`]: uniform-vote k-nearest-neighbours
//! - [`DecisionTree`]: CART tree with Gini impurity and sample weights
//! - [`RandomForest`]: bagged decision trees

mod forest;
mod knn;
mod tree;

pub use forest::RandomForest;
pub use knn::KnnClassifier;
pub use tree::DecisionTree;
