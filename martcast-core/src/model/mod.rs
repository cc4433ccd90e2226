//! Regressor — random-forest ensemble and its evaluation metrics.

pub mod forest;
pub mod metrics;
pub mod tree;

pub use forest::{ForestConfig, RandomForestRegressor};
pub use metrics::{RegressionMetrics, evaluate};
pub use tree::{RegressionTree, TreeConfig};
