//! Topic clustering: greedy single-pass grouping of items into story
//! clusters, plus per-cluster scoring and labeling.

pub mod assignment;
pub mod scoring;
pub mod types;

pub use assignment::{cluster_items, extract_keys, jaccard, tokenize, OVERLAP_THRESHOLD};
pub use scoring::{label_cluster, score_cluster};
pub use types::TopicCluster;
